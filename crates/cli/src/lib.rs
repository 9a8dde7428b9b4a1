//! Public library modules for the CLI crate
pub mod export;
pub mod ingest;
pub mod report;
pub mod watch;
