//! Object storage for harvested video artifacts.
//!
//! This crate provides:
//! - The [`ObjectStore`] seam used by the orchestrators
//! - An S3 API client that also talks to R2 and MinIO endpoints

pub mod client;
pub mod error;

pub use client::{content_type_for, ObjectStore, S3Client, S3Config};
pub use error::{StorageError, StorageResult};
