use anyhow::{bail, Context, Result};
use serde::Serialize;
use sorter_core::export::ExportPlan;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    #[default]
    Rename,
    Skip,
    Overwrite,
}

impl FromStr for ConflictPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "rename" => Ok(ConflictPolicy::Rename),
            "skip" => Ok(ConflictPolicy::Skip),
            "overwrite" => Ok(ConflictPolicy::Overwrite),
            other => bail!("unknown conflict policy {:?} (rename|skip|overwrite)", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    Planned,
    Copied,
    Skipped,
    Missing,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    pub sample_id: String,
    pub folder: String,
    pub target: PathBuf,
    pub status: ExportStatus,
}

/// Copies every planned entry to `<root>/<folder>/<file_name>`. With
/// `dry_run` nothing touches the disk and every entry reports `Planned`.
pub fn write_plan(
    plan: &ExportPlan,
    root: &Path,
    policy: ConflictPolicy,
    dry_run: bool,
) -> Result<Vec<ExportOutcome>> {
    let mut outcomes = Vec::with_capacity(plan.len());
    for entry in &plan.entries {
        let dest = root.join(&entry.folder).join(&entry.file_name);
        let outcome = |target: PathBuf, status| ExportOutcome {
            sample_id: entry.sample_id.clone(),
            folder: entry.folder.clone(),
            target,
            status,
        };

        if dry_run {
            outcomes.push(outcome(dest, ExportStatus::Planned));
            continue;
        }

        let Some(source) = entry.source.as_deref() else {
            warn!(sample = %entry.sample_id, "No source file recorded, skipping");
            outcomes.push(outcome(dest, ExportStatus::Missing));
            continue;
        };

        let target = if dest.exists() {
            match policy {
                ConflictPolicy::Skip => {
                    outcomes.push(outcome(dest, ExportStatus::Skipped));
                    continue;
                }
                ConflictPolicy::Overwrite => dest,
                ConflictPolicy::Rename => resolve_conflict(&dest),
            }
        } else {
            dest
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating folder {:?}", parent))?;
        }
        fs::copy(source, &target)
            .with_context(|| format!("copying {:?} to {:?}", source, target))?;
        outcomes.push(outcome(target, ExportStatus::Copied));
    }

    let copied = outcomes
        .iter()
        .filter(|o| o.status == ExportStatus::Copied)
        .count();
    info!(root = %root.display(), planned = plan.len(), copied, dry_run, "Export finished");
    Ok(outcomes)
}

/// First free `<stem>_<n>.<ext>` next to `dest`.
pub fn resolve_conflict(dest: &Path) -> PathBuf {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    let stem = dest
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sample")
        .to_string();
    let ext = dest
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_string();
    let mut counter = 1;
    loop {
        let name = if ext.is_empty() {
            format!("{}_{}", stem, counter)
        } else {
            format!("{}_{}.{}", stem, counter, ext)
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_policies() {
        assert_eq!("Skip".parse::<ConflictPolicy>().unwrap(), ConflictPolicy::Skip);
        assert_eq!(
            "overwrite".parse::<ConflictPolicy>().unwrap(),
            ConflictPolicy::Overwrite
        );
        assert!("merge".parse::<ConflictPolicy>().is_err());
    }

    #[test]
    fn rename_picks_first_free_suffix() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("kick.wav");
        fs::write(&dest, b"a").unwrap();
        fs::write(dir.path().join("kick_1.wav"), b"b").unwrap();
        assert_eq!(resolve_conflict(&dest), dir.path().join("kick_2.wav"));

        let bare = dir.path().join("README");
        fs::write(&bare, b"c").unwrap();
        assert_eq!(resolve_conflict(&bare), dir.path().join("README_1"));
    }
}
