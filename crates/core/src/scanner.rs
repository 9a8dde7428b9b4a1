//! Walks dropped folders, keeps supported audio files, and turns them into
//! classification candidates.

use crate::models::{is_supported_audio, CandidateFile};
use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Clone, Default)]
pub enum HashMode {
    #[default]
    None,
    Fast, // first 64 KiB only
    Full, // full-file blake3
}

impl From<&str> for HashMode {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "fast" => HashMode::Fast,
            "full" => HashMode::Full,
            _ => HashMode::None,
        }
    }
}

/// Collects audio files under `roots` in a stable, name-sorted order.
pub async fn scan(
    roots: &[PathBuf],
    excludes: &[String],
    hash_mode: &HashMode,
) -> anyhow::Result<Vec<CandidateFile>> {
    let (tx, mut rx) = mpsc::channel(100);
    let exclude_set = build_globset(excludes)?;
    let hash_mode = hash_mode.clone();
    let roots = roots.to_vec();

    // Walker task
    let walker_handle = task::spawn_blocking(move || {
        for root in roots {
            let base = root.parent().map(Path::to_path_buf).unwrap_or_default();
            let root_is_file = root.is_file();
            for entry in WalkDir::new(&root)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || should_descend(e.path(), &exclude_set))
            {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        warn!(error = %e, "Skipping unreadable entry");
                        continue;
                    }
                };

                let path = entry.path();
                if path.is_dir() || !is_supported_audio(path) {
                    continue;
                }

                let relative = if root_is_file {
                    None
                } else {
                    relative_path(path, &base)
                };
                let candidate = match candidate_for(path, relative, &hash_mode) {
                    Ok(c) => c,
                    Err(e) => {
                        warn!(file = %path.display(), error = %e, "Skipping file");
                        continue;
                    }
                };

                if tx.blocking_send(candidate).is_err() {
                    // Receiver dropped, stop walking.
                    return;
                }
            }
        }
    });

    let mut files = Vec::new();
    while let Some(candidate) = rx.recv().await {
        files.push(candidate);
    }

    walker_handle.await.context("scanner task panicked")?;
    Ok(files)
}

/// Candidate for one file found under `root`, with the same relative path a
/// full scan of `root` would give it.
pub fn candidate_at(path: &Path, root: &Path, hash_mode: &HashMode) -> anyhow::Result<CandidateFile> {
    let relative = if root.is_file() {
        None
    } else {
        let base = root.parent().map(Path::to_path_buf).unwrap_or_default();
        relative_path(path, &base)
    };
    candidate_for(path, relative, hash_mode)
}

fn candidate_for(
    path: &Path,
    relative: Option<String>,
    hash_mode: &HashMode,
) -> anyhow::Result<CandidateFile> {
    let meta = fs::metadata(path).with_context(|| format!("metadata for {:?}", path))?;
    let mtime = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let fingerprint = match hash_mode {
        HashMode::None => None,
        HashMode::Fast => fast_hash(path).ok(),
        HashMode::Full => full_hash(path).ok(),
    };

    Ok(CandidateFile::new(file_name, relative, meta.len(), mtime)?
        .with_location(path.to_path_buf())
        .with_fingerprint(fingerprint))
}

/// Path from the dropped root's parent, '/'-separated: a dropped `Kicks`
/// folder yields `Kicks/Heavy/x.wav`.
fn relative_path(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

fn should_descend(path: &Path, excludes: &GlobSet) -> bool {
    !is_excluded(path, excludes) && !is_hidden(path)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.') && s.len() > 1 && s != "..")
        .unwrap_or(false)
}

fn is_excluded(path: &Path, excludes: &GlobSet) -> bool {
    excludes.is_match(path)
}

fn fast_hash(path: &Path) -> anyhow::Result<String> {
    use std::io::Read;
    const BYTES: usize = 64 * 1024;
    let mut file = fs::File::open(path)?;
    let mut buf = vec![0u8; BYTES];
    let n = file.read(&mut buf)?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(&buf[..n]);
    Ok(hasher.finalize().to_hex().to_string())
}

fn full_hash(path: &Path) -> anyhow::Result<String> {
    use std::io::Read;
    let mut file = fs::File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}
