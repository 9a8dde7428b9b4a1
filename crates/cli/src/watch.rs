use crate::report;
use anyhow::Result;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use sorter_core::config::AppConfig;
use sorter_core::models::is_supported_audio;
use sorter_core::pipeline::Pipeline;
use sorter_core::scanner::{self, HashMode};
use sorter_core::{CategoryId, SampleLibrary};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Classifies files that appear under watched roots, one single-file batch
/// per file.
pub struct FolderWatch {
    roots: Vec<PathBuf>,
    hash_mode: HashMode,
    pipeline: Pipeline,
    seen: HashSet<PathBuf>,
    pub library: SampleLibrary,
}

impl FolderWatch {
    pub fn new(cfg: &AppConfig, roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            hash_mode: crate::ingest::hash_mode(cfg),
            pipeline: Pipeline::from_config(&cfg.pipeline),
            seen: HashSet::new(),
            library: SampleLibrary::new(),
        }
    }

    /// Imports any new supported audio files among `paths`. Paths already
    /// imported, directories and other file types are ignored.
    pub async fn ingest(
        &mut self,
        paths: &[PathBuf],
        cancel: &CancellationToken,
    ) -> Result<Vec<(PathBuf, CategoryId)>> {
        let mut added = Vec::new();
        for path in paths {
            if !path.is_file() || !is_supported_audio(path) || self.seen.contains(path) {
                continue;
            }
            let Some(root) = self.root_for(path) else {
                debug!(path = %path.display(), "Event outside watched roots");
                continue;
            };
            let candidate = match scanner::candidate_at(path, &root, &self.hash_mode) {
                Ok(c) => c,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping file");
                    continue;
                }
            };
            let batch = self
                .pipeline
                .run_at(vec![candidate], self.library.samples().len(), cancel, None)
                .await?;
            if let Some(record) = batch.records.first() {
                added.push((path.clone(), record.category));
            }
            self.library.commit(batch);
            self.seen.insert(path.clone());
        }
        Ok(added)
    }

    /// Deepest watched root containing `path`.
    fn root_for(&self, path: &Path) -> Option<PathBuf> {
        self.roots
            .iter()
            .filter(|r| path.starts_with(r))
            .max_by_key(|r| r.components().count())
            .cloned()
    }
}

pub async fn watch_paths(cfg: AppConfig, paths: Vec<PathBuf>, cancel: CancellationToken) -> Result<()> {
    let roots = crate::ingest::roots(&cfg, &paths);
    let mut state = FolderWatch::new(&cfg, roots.clone());

    let (tx, rx) = channel();
    let mut watcher: RecommendedWatcher = Watcher::new(
        tx,
        notify::Config::default().with_poll_interval(Duration::from_secs(2)),
    )?;
    for p in &roots {
        let mode = if p.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(p, mode)?;
    }

    println!("Watching {} path(s)...", roots.len());
    while !cancel.is_cancelled() {
        match rx.recv_timeout(Duration::from_millis(250)) {
            Ok(Ok(event)) => {
                if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                    continue;
                }
                let added = match state.ingest(&event.paths, &cancel).await {
                    Ok(added) => added,
                    Err(e) => {
                        eprintln!("import error: {}", e);
                        continue;
                    }
                };
                for (path, category) in &added {
                    println!("{} -> {}", path.display(), category.display_name());
                }
                if !added.is_empty() {
                    print!("{}", report::counts_text(state.library.categories()));
                }
            }
            Ok(Err(e)) => eprintln!("watch error: {:?}", e),
            Err(RecvTimeoutError::Timeout) => tokio::task::yield_now().await,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(())
}
