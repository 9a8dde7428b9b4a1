use anyhow::Result;
use sorter_core::config::AppConfig;
use sorter_core::pipeline::{BatchProgress, Pipeline};
use sorter_core::scanner::{self, HashMode};
use sorter_core::SampleLibrary;
use std::path::PathBuf;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Paths given on the command line, else `scan.include`, else the current
/// directory.
pub fn roots(cfg: &AppConfig, paths: &[PathBuf]) -> Vec<PathBuf> {
    if !paths.is_empty() {
        return paths.to_vec();
    }
    let mut roots: Vec<PathBuf> = cfg.scan.include.iter().map(PathBuf::from).collect();
    if roots.is_empty() {
        roots.push(PathBuf::from("."));
    }
    roots
}

pub fn hash_mode(cfg: &AppConfig) -> HashMode {
    cfg.scan
        .hash_mode
        .as_deref()
        .map(HashMode::from)
        .unwrap_or_default()
}

/// Scans `roots`, classifies everything found as one batch and commits it to
/// `library`. A cancelled batch leaves `library` as it was.
pub async fn import(
    cfg: &AppConfig,
    roots: &[PathBuf],
    library: &mut SampleLibrary,
    cancel: &CancellationToken,
    progress: Option<&watch::Sender<BatchProgress>>,
) -> Result<usize> {
    let files = scanner::scan(roots, &cfg.scan.exclude, &hash_mode(cfg)).await?;
    info!(roots = roots.len(), files = files.len(), "Scan complete");
    let batch = Pipeline::from_config(&cfg.pipeline)
        .run_at(files, library.samples().len(), cancel, progress)
        .await?;
    let added = batch.len();
    library.commit(batch);
    Ok(added)
}
