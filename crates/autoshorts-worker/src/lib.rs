//! Replay-moment harvesting pipeline.
//!
//! This crate provides:
//! - The per-video download pipeline with skip/resume against the database
//! - Batch downloads over channels, id lists, searches and charts
//! - Category sync and dataset export
//! - Shared context, configuration and structured logging for the binary

pub mod batch;
pub mod categories;
pub mod config;
pub mod context;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod video_download;

#[cfg(test)]
mod testing;

pub use batch::{BatchDownloader, BatchOptions, BatchReport};
pub use categories::sync_categories;
pub use config::WorkerConfig;
pub use context::AppContext;
pub use dataset::{export_dataset, exported_ids, DatasetExport, DatasetSelection};
pub use error::{WorkerError, WorkerResult};
pub use logging::{init_tracing, VideoLogger};
pub use video_download::{DownloadOutcome, VideoDownloader};
