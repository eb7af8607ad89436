//! Typed errors callers need to tell apart

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised around renderer invocations
#[derive(Error, Debug)]
pub enum ExportError {
    /// The renderer ran but exited unsuccessfully
    #[error("Renderer failed on {} (exit code {})", .input.display(), describe_exit(.exit_code))]
    RendererFailed {
        input: PathBuf,
        exit_code: Option<i32>,
        /// Captured stdout and stderr of the renderer
        log: String,
    },

    /// The renderer executable could not be located
    #[error("Renderer executable not found: {}", .0.display())]
    RendererNotFound(PathBuf),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

impl ExportError {
    /// Captured renderer output, if this error carries any
    pub fn log(&self) -> Option<&str> {
        match self {
            ExportError::RendererFailed { log, .. } => Some(log),
            ExportError::RendererNotFound(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderer_failed_message() {
        let err = ExportError::RendererFailed {
            input: PathBuf::from("a/diagram.drawio"),
            exit_code: Some(3),
            log: "boom".to_string(),
        };

        let message = err.to_string();
        assert!(message.contains("a/diagram.drawio"));
        assert!(message.contains("exit code 3"));
        assert_eq!(err.log(), Some("boom"));
    }

    #[test]
    fn test_renderer_killed_by_signal_message() {
        let err = ExportError::RendererFailed {
            input: PathBuf::from("x.drawio"),
            exit_code: None,
            log: String::new(),
        };

        assert!(err.to_string().contains("exit code none"));
    }

    #[test]
    fn test_not_found_has_no_log() {
        let err = ExportError::RendererNotFound(PathBuf::from("/opt/draw.io"));

        assert!(err.to_string().contains("/opt/draw.io"));
        assert!(err.log().is_none());
    }
}
