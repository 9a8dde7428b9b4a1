use crate::classifier;
use crate::config::PipelineConfig;
use crate::error::SorterError;
use crate::metadata;
use crate::models::{CandidateFile, CategoryId, SampleRecord};
use crate::state::SampleLibrary;
use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const DEFAULT_CHUNK_SIZE: usize = 32;

/// Records produced by one import, not yet visible to anyone else.
#[derive(Debug, Default)]
pub struct Batch {
    pub records: Vec<SampleRecord>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Per-category totals for this batch only.
    pub fn counts(&self) -> BTreeMap<CategoryId, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.category).or_insert(0) += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub analyzed: usize,
    pub total: usize,
}

pub struct Pipeline {
    chunk_size: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl Pipeline {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.chunk_size)
    }

    /// Classifies `files` in order and commits them to `library`, which
    /// bumps each category once per file. Returns the new records.
    pub fn assign_and_count(
        &self,
        files: &[CandidateFile],
        library: &mut SampleLibrary,
    ) -> Vec<SampleRecord> {
        let stamp = batch_stamp();
        let first = library.samples().len();
        let records: Vec<SampleRecord> = files
            .iter()
            .enumerate()
            .map(|(offset, file)| assign(file, stamp, first + offset))
            .collect();
        library.commit(Batch {
            records: records.clone(),
        });
        records
    }

    /// Classifies `files` a chunk at a time, yielding to the runtime between
    /// chunks. Nothing is published on cancellation; the partial batch is
    /// dropped and [`SorterError::Cancelled`] is returned.
    pub async fn run(
        &self,
        files: Vec<CandidateFile>,
        cancel: &CancellationToken,
        progress: Option<&watch::Sender<BatchProgress>>,
    ) -> Result<Batch, SorterError> {
        self.run_at(files, 0, cancel, progress).await
    }

    /// Like [`Pipeline::run`], numbering records from `first_index` so ids
    /// stay distinct when the batch extends a library that already holds
    /// `first_index` samples.
    pub async fn run_at(
        &self,
        files: Vec<CandidateFile>,
        first_index: usize,
        cancel: &CancellationToken,
        progress: Option<&watch::Sender<BatchProgress>>,
    ) -> Result<Batch, SorterError> {
        let total = files.len();
        let stamp = batch_stamp();
        let mut batch = Batch {
            records: Vec::with_capacity(total),
        };
        info!(total, chunk_size = self.chunk_size, "Starting classification batch");
        report(progress, 0, total);

        for (chunk_index, chunk) in files.chunks(self.chunk_size).enumerate() {
            for (offset, file) in chunk.iter().enumerate() {
                if cancel.is_cancelled() {
                    info!(processed = batch.len(), total, "Batch cancelled, discarding");
                    return Err(SorterError::Cancelled {
                        processed: batch.len(),
                        total,
                    });
                }
                let index = first_index + chunk_index * self.chunk_size + offset;
                batch.records.push(assign(file, stamp, index));
                report(progress, batch.len(), total);
            }
            tokio::task::yield_now().await;
        }

        info!(total, "Classification batch complete");
        Ok(batch)
    }
}

fn assign(file: &CandidateFile, stamp: i64, index: usize) -> SampleRecord {
    let decision = classifier::explain(&file.file_name, file.relative_path.as_deref());
    debug!(
        file = %file.file_name,
        category = %decision.category,
        stage = ?decision.stage,
        rule = decision.rule.unwrap_or("-"),
        "Classified sample"
    );
    SampleRecord {
        id: format!("sample-{}-{}", stamp, index),
        file_name: file.file_name.clone(),
        relative_path: file.relative_path.clone(),
        size: file.size,
        mtime: file.mtime,
        location: file.location.clone(),
        category: decision.category,
        metadata: metadata::generate(file),
        playing: false,
    }
}

fn batch_stamp() -> i64 {
    chrono::Utc::now().timestamp_micros()
}

fn report(progress: Option<&watch::Sender<BatchProgress>>, analyzed: usize, total: usize) {
    if let Some(tx) = progress {
        tx.send_replace(BatchProgress { analyzed, total });
    }
}
