//! Export targets and the mapping from one input file to its artifacts

use crate::renderer::ExportRequest;
use std::path::{Path, PathBuf};

/// Output kinds the renderer can produce for a diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

/// Run-scoped choice of what to export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTargets {
    pub pdf: bool,
    pub png: bool,
    pub jpeg: bool,
    /// Extra pixel widths for PNG / JPEG variants
    pub widths: Vec<u32>,
}

impl Default for ExportTargets {
    fn default() -> Self {
        Self {
            pdf: true,
            png: false,
            jpeg: false,
            widths: Vec::new(),
        }
    }
}

impl ExportTargets {
    /// True if at least one output kind is enabled
    ///
    /// Width variants only exist for enabled PNG / JPEG, so they don't count
    /// on their own.
    pub fn any_enabled(&self) -> bool {
        self.pdf || self.png || self.jpeg
    }

    /// Renderer requests for one input file, in execution order
    ///
    /// `output_subdir` mirrors the input's directory under the output root;
    /// width variants are flattened directly under `output_root`.
    pub fn plan(
        &self,
        input: &Path,
        output_subdir: &Path,
        output_root: &Path,
    ) -> Vec<ExportRequest> {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut requests = Vec::new();

        if self.pdf {
            let output = sibling(output_subdir, &stem, ExportFormat::Pdf);
            requests.push(ExportRequest::new(input, &output).with_crop());
        }
        if self.png {
            let output = sibling(output_subdir, &stem, ExportFormat::Png);
            requests.push(ExportRequest::new(input, &output).with_transparent());
        }
        if self.jpeg {
            let output = sibling(output_subdir, &stem, ExportFormat::Jpeg);
            requests.push(ExportRequest::new(input, &output).with_transparent());
        }

        for &width in &self.widths {
            if self.png {
                let output = width_variant(output_root, &stem, width, ExportFormat::Png);
                requests.push(
                    ExportRequest::new(input, &output)
                        .with_width(width)
                        .with_transparent(),
                );
            }
            if self.jpeg {
                // JPEG width variants have always been exported without the
                // width and transparency flags; kept as is.
                requests.push(ExportRequest::new(
                    input,
                    &width_variant(output_root, &stem, width, ExportFormat::Jpeg),
                ));
            }
        }

        requests
    }
}

fn sibling(dir: &Path, stem: &str, format: ExportFormat) -> PathBuf {
    dir.join(format!("{}.{}", stem, format.extension()))
}

fn width_variant(root: &Path, stem: &str, width: u32, format: ExportFormat) -> PathBuf {
    root.join(format!("{}_{}.{}", stem, width, format.extension()))
}
