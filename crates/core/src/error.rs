use thiserror::Error;

#[derive(Debug, Error)]
pub enum SorterError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("unsupported audio file: {0}")]
    UnsupportedFile(String),
    #[error("batch cancelled after {processed} of {total} files")]
    Cancelled { processed: usize, total: usize },
}
