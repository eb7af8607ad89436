//! Handlers for each subcommand.

pub(crate) mod convert_command;
pub(crate) mod normalize_command;

use crate::renderer::{resolve_executable, DrawIo, DEFAULT_DRAW_IO};
use std::path::PathBuf;

fn renderer_from(configured: Option<&PathBuf>) -> anyhow::Result<DrawIo> {
    let requested = configured.cloned().unwrap_or_else(|| PathBuf::from(DEFAULT_DRAW_IO));
    let executable = resolve_executable(&requested)?;
    tracing::debug!("Using renderer {}", executable.display());
    Ok(DrawIo::new(executable))
}
