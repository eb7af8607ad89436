//! Convert command feature.
//!
//! This module owns and handles the "drawio-batch convert" command behavior.

use crate::config::Config;
use crate::converter::Converter;
use crate::discovery;
use crate::fingerprint_cache::{FingerprintCache, CONVERT_CACHE_FILE};
use crate::output::{self, OutputMode};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Output directory used when neither the CLI nor the config names one
const DEFAULT_OUTPUT_DIRECTORY: &str = "dist";

pub(crate) fn handle_convert(
    input_directory: &Path,
    config: &Config,
    ignore_cache: bool,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    let output_directory = config
        .output_directory
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIRECTORY));
    std::fs::create_dir_all(&output_directory).with_context(|| {
        format!("Failed to create output directory: {}", output_directory.display())
    })?;

    let renderer = super::renderer_from(config.renderer.as_ref())?;
    let cache = FingerprintCache::open(input_directory, CONVERT_CACHE_FILE)?;
    let mut converter = Converter::new(
        renderer,
        config.export_targets(),
        input_directory,
        &output_directory,
        cache,
    );
    if ignore_cache {
        tracing::info!("Ignoring cached fingerprints");
        converter.clear_cache();
    }

    let files = discovery::discover(input_directory, config.include_xml)?;
    let summary = converter.convert_all(&files, output_mode)?;
    output::print_summary(&summary, output_mode);
    Ok(())
}
