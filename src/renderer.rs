//! Invocation of the external draw.io renderer
//!
//! The renderer is a black box: it gets a source file, a target file and a
//! handful of export flags, and reports back an exit code. This module owns
//! the flag selection and the policy for what a non-zero exit means.

use crate::error::ExportError;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Default location of the draw.io desktop executable
#[cfg(target_os = "macos")]
pub const DEFAULT_DRAW_IO: &str = "/Applications/draw.io.app/Contents/MacOS/draw.io";
#[cfg(windows)]
pub const DEFAULT_DRAW_IO: &str = r"C:\Program Files\draw.io\draw.io.exe";
#[cfg(not(any(target_os = "macos", windows)))]
pub const DEFAULT_DRAW_IO: &str = "drawio";

/// One headless export the renderer should perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// `--crop`: crop the page to the diagram content
    pub crop: bool,
    /// `--transparent`: transparent background
    pub transparent: bool,
    /// `--width N`
    pub width: Option<u32>,
    /// `--format xml --uncompressed`
    pub uncompressed_xml: bool,
}

impl ExportRequest {
    pub fn new(input: &Path, output: &Path) -> Self {
        Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            crop: false,
            transparent: false,
            width: None,
            uncompressed_xml: false,
        }
    }

    pub fn with_crop(mut self) -> Self {
        self.crop = true;
        self
    }

    pub fn with_transparent(mut self) -> Self {
        self.transparent = true;
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_uncompressed_xml(mut self) -> Self {
        self.uncompressed_xml = true;
        self
    }

    /// Command-line arguments, excluding the executable itself
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.input.clone().into(),
            "--export".into(),
            "--output".into(),
            self.output.clone().into(),
        ];
        if self.crop {
            args.push("--crop".into());
        }
        if let Some(width) = self.width {
            args.push("--width".into());
            args.push(width.to_string().into());
        }
        if self.transparent {
            args.push("--transparent".into());
        }
        if self.uncompressed_xml {
            args.push("--format".into());
            args.push("xml".into());
            args.push("--uncompressed".into());
        }
        args
    }
}

/// What came back from one renderer invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutput {
    /// `None` if the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Captured stdout followed by stderr
    pub log: String,
}

impl RenderOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Something that can carry out an [`ExportRequest`]
pub trait Renderer {
    /// Run one export and block until it finishes
    ///
    /// Only failing to start the renderer is an `Err`; a non-zero exit is
    /// reported in the returned [`RenderOutput`] and judged by a
    /// [`FailurePolicy`].
    fn export(&self, request: &ExportRequest) -> Result<RenderOutput>;
}

/// The draw.io desktop application run as a child process
#[derive(Debug, Clone)]
pub struct DrawIo {
    executable: PathBuf,
}

impl DrawIo {
    pub fn new(executable: PathBuf) -> Self {
        Self { executable }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl Renderer for DrawIo {
    fn export(&self, request: &ExportRequest) -> Result<RenderOutput> {
        tracing::debug!(
            "Running {} {:?}",
            self.executable.display(),
            request.args()
        );

        let output = Command::new(&self.executable)
            .args(request.args())
            .output()
            .with_context(|| format!("Failed to start renderer: {}", self.executable.display()))?;

        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        log.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(RenderOutput {
            exit_code: output.status.code(),
            log,
        })
    }
}

/// Find the renderer executable
///
/// Accepts an existing file, or a bare program name looked up on `PATH`.
pub fn resolve_executable(path: &Path) -> std::result::Result<PathBuf, ExportError> {
    if path.is_file() {
        return Ok(std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()));
    }

    if path.components().count() == 1 {
        if let Ok(found) = which::which(path) {
            return Ok(found);
        }
    }

    Err(ExportError::RendererNotFound(path.to_path_buf()))
}

/// How a non-zero renderer exit is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log and carry on (conversion)
    Ignore,
    /// Abort the batch with the renderer's log (normalization)
    Abort,
}

impl FailurePolicy {
    pub fn check(
        self,
        request: &ExportRequest,
        output: &RenderOutput,
    ) -> std::result::Result<(), ExportError> {
        if output.success() {
            return Ok(());
        }

        match self {
            FailurePolicy::Ignore => {
                tracing::warn!(
                    "Renderer exited with {:?} exporting {} to {}",
                    output.exit_code,
                    request.input.display(),
                    request.output.display()
                );
                Ok(())
            }
            FailurePolicy::Abort => Err(ExportError::RendererFailed {
                input: request.input.clone(),
                exit_code: output.exit_code,
                log: output.log.clone(),
            }),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_pdf_args() {
        let request =
            ExportRequest::new(Path::new("a/d.drawio"), Path::new("dist/a/d.pdf")).with_crop();

        assert_eq!(
            strings(request.args()),
            vec!["a/d.drawio", "--export", "--output", "dist/a/d.pdf", "--crop"]
        );
    }

    #[test]
    fn test_width_png_args_order() {
        let request = ExportRequest::new(Path::new("d.drawio"), Path::new("dist/d_50.png"))
            .with_width(50)
            .with_transparent();

        assert_eq!(
            strings(request.args()),
            vec![
                "d.drawio",
                "--export",
                "--output",
                "dist/d_50.png",
                "--width",
                "50",
                "--transparent"
            ]
        );
    }

    #[test]
    fn test_uncompressed_xml_args() {
        let request = ExportRequest::new(Path::new("d.drawio"), Path::new("d.drawio"))
            .with_uncompressed_xml();

        assert_eq!(
            strings(request.args()),
            vec![
                "d.drawio",
                "--export",
                "--output",
                "d.drawio",
                "--format",
                "xml",
                "--uncompressed"
            ]
        );
    }

    #[test]
    fn test_ignore_policy_swallows_failure() {
        let request = ExportRequest::new(Path::new("d.drawio"), Path::new("d.pdf"));
        let output = RenderOutput {
            exit_code: Some(1),
            log: "error".to_string(),
        };

        assert!(FailurePolicy::Ignore.check(&request, &output).is_ok());
    }

    #[test]
    fn test_abort_policy_surfaces_log() {
        let request = ExportRequest::new(Path::new("d.drawio"), Path::new("d.drawio"));
        let output = RenderOutput {
            exit_code: Some(2),
            log: "cannot parse file".to_string(),
        };

        let err = FailurePolicy::Abort.check(&request, &output).unwrap_err();
        match err {
            ExportError::RendererFailed { exit_code, log, .. } => {
                assert_eq!(exit_code, Some(2));
                assert_eq!(log, "cannot parse file");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_abort_policy_accepts_success() {
        let request = ExportRequest::new(Path::new("d.drawio"), Path::new("d.drawio"));
        let output = RenderOutput {
            exit_code: Some(0),
            log: String::new(),
        };

        assert!(FailurePolicy::Abort.check(&request, &output).is_ok());
    }

    #[test]
    fn test_resolve_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let exe = temp_dir.path().join("draw.io");
        fs::write(&exe, "").unwrap();

        let resolved = resolve_executable(&exe).unwrap();
        assert_eq!(resolved, fs::canonicalize(&exe).unwrap());
    }

    #[test]
    fn test_resolve_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope").join("draw.io");

        assert!(matches!(
            resolve_executable(&missing),
            Err(ExportError::RendererNotFound(_))
        ));
    }

    // `/bin/sh` runs the "input" as a script, which echoes the export flags back.
    #[cfg(unix)]
    #[test]
    fn test_drawio_captures_output_and_exit_code() {
        let temp_dir = TempDir::new().unwrap();
        let script = temp_dir.path().join("fake.sh");
        fs::write(&script, "echo \"$@\"\necho oops >&2\nexit 3\n").unwrap();

        let renderer = DrawIo::new(PathBuf::from("/bin/sh"));
        let request = ExportRequest::new(&script, Path::new("out.pdf")).with_crop();
        let output = renderer.export(&request).unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
        assert!(output.log.contains("--export --output out.pdf --crop"));
        assert!(output.log.contains("oops"));
    }

    #[test]
    fn test_drawio_missing_executable_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = DrawIo::new(temp_dir.path().join("no-such-renderer"));
        let request = ExportRequest::new(Path::new("d.drawio"), Path::new("d.pdf"));

        assert!(renderer.export(&request).is_err());
    }
}
