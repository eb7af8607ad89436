//! Uncompressing diagrams into formatted XML
//!
//! The renderer rewrites each changed diagram as uncompressed XML, which is
//! then re-indented so the files diff cleanly. Unlike conversion, a renderer
//! failure here aborts the whole batch: the target may be the source file.

use crate::fingerprint_cache::{fingerprint, FingerprintCache, RunSummary};
use crate::output::{self, OutputMode};
use crate::pretty_xml;
use crate::progress;
use crate::renderer::{ExportRequest, FailurePolicy, Renderer};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Suffix appended to the file name when not normalizing in place
pub const CLEANED_SUFFIX: &str = ".cleaned";

/// Where the normalized version of `file` is written
pub fn normalized_path(file: &Path, in_place: bool) -> PathBuf {
    if in_place {
        return file.to_path_buf();
    }
    let mut name = file.as_os_str().to_owned();
    name.push(CLEANED_SUFFIX);
    PathBuf::from(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeOutcome {
    Skipped,
    Normalized,
}

pub struct Normalizer<R: Renderer> {
    renderer: R,
    in_place: bool,
    cache: FingerprintCache,
    policy: FailurePolicy,
}

impl<R: Renderer> Normalizer<R> {
    pub fn new(renderer: R, in_place: bool, cache: FingerprintCache) -> Self {
        Self {
            renderer,
            in_place,
            cache,
            policy: FailurePolicy::Abort,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn cache(&self) -> &FingerprintCache {
        &self.cache
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn normalize_file(&mut self, file: &Path) -> Result<NormalizeOutcome> {
        let before = fingerprint(file);
        if self.cache.is_current(file, &before) {
            tracing::info!(
                "The file {} has not changed since the last normalization.",
                file.display()
            );
            return Ok(NormalizeOutcome::Skipped);
        }

        let target = normalized_path(file, self.in_place);
        let request = ExportRequest::new(file, &target).with_uncompressed_xml();
        tracing::info!("Uncompress {} to {}", file.display(), target.display());

        let result = self.renderer.export(&request)?;
        self.policy.check(&request, &result)?;

        pretty_xml::reformat_file(&target)?;

        // In place, the source itself changed; record what the next run will see.
        let recorded = if self.in_place { fingerprint(file) } else { before };
        if !recorded.is_empty() {
            self.cache.record(file, recorded);
        }
        Ok(NormalizeOutcome::Normalized)
    }

    /// Normalize a batch in order, then persist the cache once
    ///
    /// The first renderer failure ends the batch; the cache is not written.
    pub fn normalize_all(&mut self, files: &[PathBuf], mode: OutputMode) -> Result<RunSummary> {
        let mut summary = RunSummary::new("normalize");
        summary.stats.discovered = files.len();

        let pb = progress::batch_bar(files.len(), "Normalizing", mode);
        for file in files {
            pb.set_message(file.display().to_string());
            let outcome = match self.normalize_file(file) {
                Ok(outcome) => outcome,
                Err(e) => {
                    progress::finish_and_clear(&pb);
                    return Err(e);
                }
            };
            match outcome {
                NormalizeOutcome::Skipped => {
                    summary.stats.skipped += 1;
                    if mode == OutputMode::Verbose {
                        progress::println(&pb, mode, output::skipped_line(file));
                    }
                }
                NormalizeOutcome::Normalized => {
                    summary.stats.processed += 1;
                    summary.stats.exports += 1;
                    progress::println(&pb, mode, output::file_line("Normalizing", file, true));
                }
            }
            pb.inc(1);
        }
        progress::finish_and_clear(&pb);

        self.cache.persist()?;
        Ok(summary.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use crate::fingerprint_cache::NORMALIZE_CACHE_FILE;
    use crate::renderer::testing::RecordingRenderer;
    use std::fs;
    use tempfile::TempDir;

    const UNCOMPRESSED: &str = "<mxfile><diagram id=\"x\"><mxGraphModel/></diagram></mxfile>";

    fn setup() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("d.drawio");
        fs::write(&file, "<mxfile><diagram>compressed==</diagram></mxfile>").unwrap();
        (temp_dir, file)
    }

    fn normalizer(
        dir: &Path,
        renderer: RecordingRenderer,
        in_place: bool,
    ) -> Normalizer<RecordingRenderer> {
        let cache = FingerprintCache::open(dir, NORMALIZE_CACHE_FILE).unwrap();
        Normalizer::new(renderer, in_place, cache)
    }

    #[test]
    fn test_normalized_path() {
        let file = Path::new("dir/d.drawio");
        assert_eq!(normalized_path(file, true), PathBuf::from("dir/d.drawio"));
        assert_eq!(normalized_path(file, false), PathBuf::from("dir/d.drawio.cleaned"));
    }

    #[test]
    fn test_default_policy_is_abort() {
        let (temp_dir, _file) = setup();
        let norm = normalizer(temp_dir.path(), RecordingRenderer::new(), true);
        assert_eq!(norm.policy(), FailurePolicy::Abort);
    }

    #[test]
    fn test_in_place_rewrites_source_and_caches_result() {
        let (temp_dir, file) = setup();
        let mut norm = normalizer(temp_dir.path(), RecordingRenderer::writing(UNCOMPRESSED), true);

        assert_eq!(norm.normalize_file(&file).unwrap(), NormalizeOutcome::Normalized);

        let requests = norm.renderer().requests.borrow().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].output, file);
        assert!(requests[0].uncompressed_xml);

        let content = fs::read_to_string(&file).unwrap();
        assert_eq!(content, pretty_xml::reformat(UNCOMPRESSED).unwrap());
        assert!(norm.cache().is_current(&file, &fingerprint(&file)));

        assert_eq!(norm.normalize_file(&file).unwrap(), NormalizeOutcome::Skipped);
        assert_eq!(norm.renderer().count(), 1);
    }

    #[test]
    fn test_sibling_output_caches_source_fingerprint() {
        let (temp_dir, file) = setup();
        let original = fs::read_to_string(&file).unwrap();
        let before = fingerprint(&file);
        let mut norm = normalizer(temp_dir.path(), RecordingRenderer::writing(UNCOMPRESSED), false);

        norm.normalize_file(&file).unwrap();

        let cleaned = temp_dir.path().join("d.drawio.cleaned");
        assert!(cleaned.is_file());
        assert_eq!(
            fs::read_to_string(&cleaned).unwrap(),
            pretty_xml::reformat(UNCOMPRESSED).unwrap()
        );
        assert_eq!(fs::read_to_string(&file).unwrap(), original);
        assert_eq!(norm.cache().get(&file), Some(&before));
    }

    #[test]
    fn test_renderer_failure_aborts_with_log() {
        let (temp_dir, file) = setup();
        let second = temp_dir.path().join("e.drawio");
        fs::write(&second, "<mxfile/>").unwrap();
        let mut norm = normalizer(temp_dir.path(), RecordingRenderer::failing(1), true);

        let err = norm
            .normalize_all(&[file.clone(), second], OutputMode::Quiet)
            .unwrap_err();

        let export_err = err.downcast_ref::<ExportError>().unwrap();
        assert!(export_err.log().unwrap().contains("exported"));
        assert_eq!(norm.renderer().count(), 1);
        assert!(norm.cache().get(&file).is_none());
        assert!(!temp_dir.path().join(NORMALIZE_CACHE_FILE).exists());
    }

    #[test]
    fn test_malformed_renderer_output_is_error() {
        let (temp_dir, file) = setup();
        let mut norm = normalizer(temp_dir.path(), RecordingRenderer::writing("<a><b></a>"), false);

        assert!(norm.normalize_file(&file).is_err());
        assert!(norm.cache().get(&file).is_none());
    }

    #[test]
    fn test_normalize_all_persists_cache() {
        let (temp_dir, file) = setup();
        let files = vec![file.clone()];

        let mut norm = normalizer(temp_dir.path(), RecordingRenderer::writing(UNCOMPRESSED), true);
        let summary = norm.normalize_all(&files, OutputMode::Quiet).unwrap();
        assert_eq!(summary.stats.processed, 1);

        let mut rerun = normalizer(temp_dir.path(), RecordingRenderer::writing(UNCOMPRESSED), true);
        let summary = rerun.normalize_all(&files, OutputMode::Quiet).unwrap();
        assert_eq!(summary.stats.skipped, 1);
        assert_eq!(rerun.renderer().count(), 0);
    }
}
