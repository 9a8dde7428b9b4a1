//! Core library: taxonomy, classification, batch pipeline, state, scanning, export planning.

pub mod classifier;
pub mod config;
pub mod error;
pub mod export;
pub mod metadata;
pub mod models;
pub mod pipeline;
pub mod scanner;
pub mod spectral;
pub mod state;
pub mod taxonomy;

pub use classifier::{classify, explain, Classification, Stage};
pub use error::SorterError;
pub use models::{CandidateFile, Category, CategoryId, SampleRecord};
pub use pipeline::{Batch, BatchProgress, Pipeline};
pub use state::{CategoryTable, SampleLibrary};
