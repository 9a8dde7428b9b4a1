//! Owned application state: the category table and the imported samples.

use crate::error::SorterError;
use crate::models::{Category, CategoryId, SampleRecord};
use crate::pipeline::Batch;
use serde::Serialize;

/// The fixed, ordered category list. Counts can only move through
/// [`CategoryTable::increment`], which is crate-internal.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryTable {
    pub fn new() -> Self {
        Self {
            categories: CategoryId::ALL.iter().map(|id| Category::new(*id)).collect(),
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: CategoryId) -> &Category {
        &self.categories[id.index()]
    }

    pub fn count(&self, id: CategoryId) -> usize {
        self.get(id).member_count
    }

    pub fn total(&self) -> usize {
        self.categories.iter().map(|c| c.member_count).sum()
    }

    pub(crate) fn increment(&mut self, id: CategoryId) {
        self.categories[id.index()].member_count += 1;
    }

    pub fn toggle(&mut self, id: CategoryId) {
        let cat = &mut self.categories[id.index()];
        cat.selected = !cat.selected;
    }

    pub fn select_all(&mut self) {
        self.categories.iter_mut().for_each(|c| c.selected = true);
    }

    pub fn unselect_all(&mut self) {
        self.categories.iter_mut().for_each(|c| c.selected = false);
    }

    /// Selects exactly `ids`; an empty slice selects everything.
    pub fn set_selected(&mut self, ids: &[CategoryId]) {
        if ids.is_empty() {
            self.select_all();
            return;
        }
        for cat in self.categories.iter_mut() {
            cat.selected = ids.contains(&cat.id);
        }
    }

    /// Parses comma-separated style ids (`"kicks"`, `"hihats"`) and selects them.
    pub fn set_selected_by_name<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), SorterError> {
        let ids = names
            .iter()
            .map(|n| n.as_ref().parse::<CategoryId>())
            .collect::<Result<Vec<_>, _>>()?;
        self.set_selected(&ids);
        Ok(())
    }

    pub fn is_selected(&self, id: CategoryId) -> bool {
        self.get(id).selected
    }

    pub fn selected_ids(&self) -> Vec<CategoryId> {
        self.categories
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.id)
            .collect()
    }

    pub fn selected_sample_count(&self) -> usize {
        self.categories
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.member_count)
            .sum()
    }

    /// Zeroes every count and selects every category again. Only the owning
    /// library may do this, together with dropping its samples.
    pub(crate) fn reset(&mut self) {
        for cat in self.categories.iter_mut() {
            cat.member_count = 0;
            cat.selected = true;
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct SampleLibrary {
    samples: Vec<SampleRecord>,
    categories: CategoryTable,
    playing: Option<String>,
}

impl SampleLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    // Selection passes through; counts only move with `commit` and `reset`.

    pub fn toggle(&mut self, id: CategoryId) {
        self.categories.toggle(id);
    }

    pub fn select_all(&mut self) {
        self.categories.select_all();
    }

    pub fn unselect_all(&mut self) {
        self.categories.unselect_all();
    }

    pub fn set_selected(&mut self, ids: &[CategoryId]) {
        self.categories.set_selected(ids);
    }

    pub fn set_selected_by_name<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), SorterError> {
        self.categories.set_selected_by_name(names)
    }

    pub fn samples(&self) -> &[SampleRecord] {
        &self.samples
    }

    /// Appends a finished batch and applies its counts in one step.
    pub fn commit(&mut self, batch: Batch) {
        for record in &batch.records {
            self.categories.increment(record.category);
        }
        self.samples.extend(batch.records);
    }

    /// Samples whose category is currently selected.
    pub fn visible_samples(&self) -> impl Iterator<Item = &SampleRecord> + '_ {
        self.samples
            .iter()
            .filter(|s| self.categories.is_selected(s.category))
    }

    /// Marks `id` as the only playing sample. Returns false for unknown ids.
    pub fn play(&mut self, id: &str) -> bool {
        if !self.samples.iter().any(|s| s.id == id) {
            return false;
        }
        for sample in self.samples.iter_mut() {
            sample.playing = sample.id == id;
        }
        self.playing = Some(id.to_string());
        true
    }

    pub fn stop(&mut self) {
        self.samples.iter_mut().for_each(|s| s.playing = false);
        self.playing = None;
    }

    pub fn currently_playing(&self) -> Option<&str> {
        self.playing.as_deref()
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.categories.reset();
        self.playing = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_all_categories_selected_and_empty() {
        let table = CategoryTable::new();
        assert_eq!(table.categories().len(), 8);
        assert_eq!(table.total(), 0);
        assert_eq!(table.selected_ids().len(), 8);
        assert_eq!(table.get(CategoryId::Snares).display_name, "Snares/Claps");
    }

    #[test]
    fn selected_sample_count_follows_selection() {
        let mut table = CategoryTable::new();
        table.increment(CategoryId::Kicks);
        table.increment(CategoryId::Kicks);
        table.increment(CategoryId::Bass);
        assert_eq!(table.selected_sample_count(), 3);
        table.toggle(CategoryId::Kicks);
        assert_eq!(table.selected_sample_count(), 1);
        table.unselect_all();
        assert_eq!(table.selected_sample_count(), 0);
        table.set_selected(&[CategoryId::Kicks]);
        assert_eq!(table.selected_sample_count(), 2);
        table.reset();
        assert_eq!(table.total(), 0);
        assert!(table.is_selected(CategoryId::Other));
    }

    #[test]
    fn selecting_by_name_rejects_unknown() {
        let mut table = CategoryTable::new();
        assert!(table.set_selected_by_name(&["kicks", "Vocals"]).is_ok());
        assert_eq!(
            table.selected_ids(),
            vec![CategoryId::Kicks, CategoryId::Vocals]
        );
        assert!(matches!(
            table.set_selected_by_name(&["cowbells"]),
            Err(SorterError::UnknownCategory(_))
        ));
    }

    fn record(id: &str, category: CategoryId) -> SampleRecord {
        SampleRecord {
            id: id.to_string(),
            file_name: format!("{id}.wav"),
            relative_path: None,
            size: 1,
            mtime: 0,
            location: None,
            category,
            metadata: crate::metadata::generate_with(&mut rand::thread_rng()),
            playing: false,
        }
    }

    #[test]
    fn counts_track_samples_through_selection_and_reset() {
        let mut lib = SampleLibrary::new();
        lib.commit(Batch {
            records: vec![record("a", CategoryId::Kicks), record("b", CategoryId::Bass)],
        });
        lib.toggle(CategoryId::Kicks);
        lib.unselect_all();
        lib.select_all();
        lib.set_selected(&[CategoryId::Bass]);
        lib.set_selected_by_name(&["kicks"]).unwrap();
        assert_eq!(lib.categories().total(), lib.samples().len());
        assert_eq!(lib.visible_samples().count(), 1);

        lib.reset();
        assert_eq!(lib.categories().total(), 0);
        assert!(lib.samples().is_empty());
    }
}
