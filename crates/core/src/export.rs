//! Folder-per-category export layout. Writing the files (or an archive) is up
//! to the caller.

use crate::models::CategoryId;
use crate::state::SampleLibrary;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct ExportEntry {
    pub sample_id: String,
    pub category: CategoryId,
    /// Sanitized category display name.
    pub folder: String,
    pub file_name: String,
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportPlan {
    pub entries: Vec<ExportEntry>,
}

impl ExportPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct folders in taxonomy order.
    pub fn folders(&self) -> Vec<&str> {
        let mut folders: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !folders.contains(&entry.folder.as_str()) {
                folders.push(&entry.folder);
            }
        }
        folders
    }
}

/// Samples in selected categories, grouped by category in taxonomy order and
/// in import order within a category.
pub fn plan(library: &SampleLibrary) -> ExportPlan {
    let table = library.categories();
    let mut entries = Vec::new();
    for category in table.categories().iter().filter(|c| c.selected) {
        let folder = sanitize_folder(&category.display_name);
        entries.extend(
            library
                .samples()
                .iter()
                .filter(|s| s.category == category.id)
                .map(|s| ExportEntry {
                    sample_id: s.id.clone(),
                    category: category.id,
                    folder: folder.clone(),
                    file_name: s.file_name.clone(),
                    source: s.location.clone(),
                }),
        );
    }
    ExportPlan { entries }
}

/// Replaces characters that are unsafe in folder names with `_`.
pub fn sanitize_folder(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' => '_',
            other => other,
        })
        .collect()
}

pub fn archive_name(date: NaiveDate) -> String {
    format!("samples_export_{}", date.format("%Y-%m-%d"))
}
