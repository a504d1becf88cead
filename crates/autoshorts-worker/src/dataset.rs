//! Dataset export from object storage.
//!
//! Selects persisted videos from the database and downloads their sidecar
//! and media into `{out_dir}/{name}/{video_id}/`, then writes a
//! `manifest.json` describing the export.

use std::path::{Path, PathBuf};

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, Instrument};

use autoshorts_models::layout::{self, MEDIA_FILE, SIDECAR_FILE};
use autoshorts_models::{DatasetFilter, DatasetManifest};

use crate::context::AppContext;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::VideoLogger;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Which persisted videos go into the dataset.
#[derive(Debug, Clone)]
pub enum DatasetSelection {
    Filter(DatasetFilter),
    /// Everything except these video ids.
    Excluding(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct DatasetExport {
    pub name: String,
    pub out_dir: PathBuf,
    pub bucket: String,
    pub selection: DatasetSelection,
    pub chunk_size: usize,
}

impl DatasetExport {
    pub fn dataset_dir(&self) -> PathBuf {
        self.out_dir.join(&self.name)
    }
}

/// Video ids listed in an earlier manifest, for building a disjoint export.
pub async fn exported_ids(manifest_path: &Path) -> WorkerResult<Vec<String>> {
    let raw = tokio::fs::read(manifest_path).await?;
    let manifest: DatasetManifest = serde_json::from_slice(&raw)?;
    Ok(manifest
        .exported
        .iter()
        .filter_map(|prefix| layout::video_id_from_prefix(prefix))
        .map(str::to_string)
        .collect())
}

pub async fn export_dataset(ctx: &AppContext, export: &DatasetExport) -> WorkerResult<DatasetManifest> {
    let name = export.name.trim();
    if name.is_empty() || name == "." || name == ".." || export.name.contains(['/', '\\']) {
        return Err(WorkerError::invalid_config(format!(
            "invalid dataset name '{}'",
            export.name
        )));
    }

    let (filter, excluded_ids, prefixes) = match &export.selection {
        DatasetSelection::Filter(filter) => {
            (filter.clone(), Vec::new(), ctx.store.storage_paths(filter).await?)
        }
        DatasetSelection::Excluding(ids) => (
            DatasetFilter::default(),
            ids.clone(),
            ctx.store.storage_paths_excluding(ids).await?,
        ),
    };

    let dataset_dir = export.dataset_dir();
    tokio::fs::create_dir_all(&dataset_dir).await?;
    info!(dataset = %export.name, videos = prefixes.len(), "Exporting dataset");

    let mut exported = Vec::new();
    let mut failed = Vec::new();
    for chunk in prefixes.chunks(export.chunk_size.max(1)) {
        let results = join_all(
            chunk
                .iter()
                .map(|prefix| export_video(ctx, &export.bucket, prefix, &dataset_dir)),
        )
        .await;

        for (prefix, result) in chunk.iter().zip(results) {
            match result {
                Ok(()) => exported.push(prefix.clone()),
                Err(_) => failed.push(prefix.clone()),
            }
        }
    }

    let manifest = DatasetManifest {
        name: export.name.clone(),
        exported_at: Utc::now(),
        filter,
        excluded_ids,
        exported,
        failed,
    };
    tokio::fs::write(
        dataset_dir.join(MANIFEST_FILE),
        serde_json::to_vec_pretty(&manifest)?,
    )
    .await?;

    info!(
        dataset = %export.name,
        exported = manifest.exported.len(),
        failed = manifest.failed.len(),
        "Dataset exported"
    );
    Ok(manifest)
}

async fn export_video(
    ctx: &AppContext,
    bucket: &str,
    prefix: &str,
    dataset_dir: &Path,
) -> WorkerResult<()> {
    let video_id = layout::video_id_from_prefix(prefix)
        .ok_or_else(|| WorkerError::export_failed(format!("malformed storage prefix '{prefix}'")))?;
    let logger = VideoLogger::new(video_id, "dataset_export");
    let target = dataset_dir.join(video_id);

    let result = async {
        for file in [SIDECAR_FILE, MEDIA_FILE] {
            ctx.storage
                .download_file(bucket, &layout::storage_key(prefix, file), &target.join(file))
                .await?;
        }
        Ok::<_, WorkerError>(())
    }
    .instrument(logger.create_span())
    .await;

    if let Err(e) = &result {
        logger.log_error(&e.to_string());
    }
    result
}
