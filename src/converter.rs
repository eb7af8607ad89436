//! Incremental batch conversion of diagrams
//!
//! Each input file is fingerprinted and compared against the conversion
//! cache. Unchanged files are skipped; everything else is exported to every
//! enabled target and recorded in the cache. The cache file itself is only
//! written once, after the whole batch.

use crate::fingerprint_cache::{fingerprint, FingerprintCache, RunSummary};
use crate::output::{self, OutputMode};
use crate::progress;
use crate::renderer::{FailurePolicy, Renderer};
use crate::targets::{ExportFormat, ExportTargets};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Fingerprint matched the cache; nothing was run
    Skipped,
    /// Every export target is disabled; cache left untouched
    Untargeted,
    /// Exports were issued and the cache updated
    Converted { exports: usize, failed: usize },
}

/// Conversion orchestrator
pub struct Converter<R: Renderer> {
    renderer: R,
    targets: ExportTargets,
    input_root: PathBuf,
    output_root: PathBuf,
    cache: FingerprintCache,
    policy: FailurePolicy,
}

impl<R: Renderer> Converter<R> {
    /// Renderer failures are ignored by default; see [`Converter::with_failure_policy`]
    pub fn new(
        renderer: R,
        targets: ExportTargets,
        input_root: &Path,
        output_root: &Path,
        cache: FingerprintCache,
    ) -> Self {
        Self {
            renderer,
            targets,
            input_root: input_root.to_path_buf(),
            output_root: output_root.to_path_buf(),
            cache,
            policy: FailurePolicy::Ignore,
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn targets(&self) -> &ExportTargets {
        &self.targets
    }

    pub fn cache(&self) -> &FingerprintCache {
        &self.cache
    }

    /// Forget all cached fingerprints so every file is converted again
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn persist_cache(&self) -> Result<()> {
        self.cache.persist()
    }

    /// Output directory for a file's regular exports
    ///
    /// Mirrors the file's directory relative to the input root. Files outside
    /// the input root land directly in the output root.
    pub fn output_subdir(&self, file: &Path) -> PathBuf {
        let relative = file.strip_prefix(&self.input_root).unwrap_or(file);
        match relative.parent() {
            Some(parent) if parent.is_relative() => self.output_root.join(parent),
            _ => self.output_root.clone(),
        }
    }

    /// Convert one file unless it is unchanged since its last conversion
    pub fn convert_file(&mut self, file: &Path) -> Result<FileOutcome> {
        let file_fingerprint = fingerprint(file);
        if self.cache.is_current(file, &file_fingerprint) {
            tracing::info!(
                "The file {} has not changed since the last conversion.",
                file.display()
            );
            return Ok(FileOutcome::Skipped);
        }

        let output_subdir = self.output_subdir(file);
        fs::create_dir_all(&output_subdir).with_context(|| {
            format!("Failed to create output directory: {}", output_subdir.display())
        })?;

        for (format, enabled) in [
            (ExportFormat::Pdf, self.targets.pdf),
            (ExportFormat::Png, self.targets.png),
            (ExportFormat::Jpeg, self.targets.jpeg),
        ] {
            if !enabled {
                tracing::info!("{:?} conversion skipped for {}", format, file.display());
            }
        }

        let requests = self.targets.plan(file, &output_subdir, &self.output_root);
        let mut failed = 0;
        for request in &requests {
            tracing::info!("Convert {} to {}", file.display(), request.output.display());
            let result = self.renderer.export(request)?;
            if !result.success() {
                failed += 1;
            }
            self.policy.check(request, &result)?;
        }

        if !self.targets.any_enabled() {
            return Ok(FileOutcome::Untargeted);
        }

        // An unreadable file has no content to vouch for
        if !file_fingerprint.is_empty() {
            self.cache.record(file, file_fingerprint);
        }
        Ok(FileOutcome::Converted {
            exports: requests.len(),
            failed,
        })
    }

    /// Convert a batch in order, then persist the cache once
    pub fn convert_all(&mut self, files: &[PathBuf], mode: OutputMode) -> Result<RunSummary> {
        let mut summary = RunSummary::new("convert");
        summary.stats.discovered = files.len();

        let pb = progress::batch_bar(files.len(), "Converting", mode);
        for file in files {
            let shown = file.strip_prefix(&self.input_root).unwrap_or(file).to_path_buf();
            pb.set_message(shown.display().to_string());

            match self.convert_file(file)? {
                FileOutcome::Skipped => {
                    summary.stats.skipped += 1;
                    if mode == OutputMode::Verbose {
                        progress::println(&pb, mode, output::skipped_line(&shown));
                    }
                }
                FileOutcome::Untargeted => {
                    summary.stats.untargeted += 1;
                }
                FileOutcome::Converted { exports, failed } => {
                    summary.stats.processed += 1;
                    summary.stats.exports += exports;
                    summary.stats.failed_exports += failed;
                    progress::println(&pb, mode, output::file_line("Converting", &shown, true));
                }
            }
            pb.inc(1);
        }
        progress::finish_and_clear(&pb);

        self.persist_cache()?;
        Ok(summary.finish())
    }
}
