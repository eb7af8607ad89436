//! Normalize command feature.
//!
//! This module owns and handles the "drawio-batch normalize" command behavior.

use crate::config::Config;
use crate::discovery;
use crate::error::ExportError;
use crate::fingerprint_cache::{FingerprintCache, NORMALIZE_CACHE_FILE};
use crate::normalizer::Normalizer;
use crate::output::{self, OutputMode};
use std::path::Path;

pub(crate) fn handle_normalize(
    input_directory: &Path,
    config: &Config,
    in_place: bool,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    let renderer = super::renderer_from(config.renderer.as_ref())?;
    let cache = FingerprintCache::open(input_directory, NORMALIZE_CACHE_FILE)?;
    let mut normalizer = Normalizer::new(renderer, in_place, cache);

    let files = discovery::discover(input_directory, config.include_xml)?;
    match normalizer.normalize_all(&files, output_mode) {
        Ok(summary) => {
            output::print_summary(&summary, output_mode);
            Ok(())
        }
        Err(e) => {
            // The renderer's own output is the only useful diagnostic here
            if let Some(log) = e.downcast_ref::<ExportError>().and_then(|err| err.log()) {
                output::print_renderer_log(log);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sh_config() -> Config {
        Config {
            renderer: Some(PathBuf::from("/bin/sh")),
            ..Config::default()
        }
    }

    // The "diagram" is a script; `$3` is the `--output` target.
    #[cfg(unix)]
    #[test]
    fn test_handle_normalize_writes_cleaned_file() {
        let temp_dir = TempDir::new().unwrap();
        let diagram = temp_dir.path().join("d.drawio");
        fs::write(&diagram, "printf '<mxfile><diagram/></mxfile>' > \"$3\"\n").unwrap();

        handle_normalize(temp_dir.path(), &sh_config(), false, OutputMode::Quiet).unwrap();

        let cleaned = fs::read_to_string(temp_dir.path().join("d.drawio.cleaned")).unwrap();
        assert_eq!(cleaned, "<mxfile>\n  <diagram/>\n</mxfile>\n");
        assert!(temp_dir.path().join(NORMALIZE_CACHE_FILE).is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_handle_normalize_renderer_failure_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("d.drawio"), "echo cannot open >&2\nexit 4\n").unwrap();

        let err = handle_normalize(temp_dir.path(), &sh_config(), false, OutputMode::Quiet)
            .unwrap_err();

        match err.downcast_ref::<ExportError>() {
            Some(ExportError::RendererFailed { exit_code, log, .. }) => {
                assert_eq!(*exit_code, Some(4));
                assert!(log.contains("cannot open"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!temp_dir.path().join(NORMALIZE_CACHE_FILE).exists());
    }
}
