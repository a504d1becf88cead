//! Worker configuration.

use std::path::PathBuf;

use autoshorts_models::{DownloadConfig, DEFAULT_RESOLUTION};

/// Pipeline settings shared by every batch command.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Local root for sidecars and media
    pub save_path: PathBuf,
    /// Object storage bucket
    pub bucket: String,
    /// Upload artifacts and record them in the database
    pub upload: bool,
    /// Keep local files after a successful upload
    pub keep_local: bool,
    /// Media resolution cap, e.g. "480p"
    pub resolution: String,
    /// Videos downloaded concurrently; the next chunk waits for the previous one
    pub chunk_size: usize,
    /// Page size for playlist listing
    pub page_size: u32,
    /// Upper bound on playlist items listed per channel
    pub info_limit: usize,
    /// Skip videos no longer than this many seconds
    pub short_form_max_secs: Option<u64>,
    /// Regions for category sync and the popular chart
    pub region_codes: Vec<String>,
    /// Root directory for dataset exports
    pub dataset_dir: PathBuf,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        let download = DownloadConfig::default();
        Self {
            save_path: download.save_path,
            bucket: download.bucket,
            upload: download.upload,
            keep_local: download.keep_local,
            resolution: DEFAULT_RESOLUTION.to_string(),
            chunk_size: 5,
            page_size: 50,
            info_limit: 500,
            short_form_max_secs: None,
            region_codes: vec!["US".to_string()],
            dataset_dir: PathBuf::from("datasets"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            save_path: std::env::var("AUTOSHORTS_SAVE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.save_path),
            bucket: std::env::var("AUTOSHORTS_BUCKET").unwrap_or(defaults.bucket),
            upload: env_flag("AUTOSHORTS_UPLOAD").unwrap_or(defaults.upload),
            keep_local: env_flag("AUTOSHORTS_KEEP_LOCAL").unwrap_or(defaults.keep_local),
            resolution: std::env::var("AUTOSHORTS_RESOLUTION").unwrap_or(defaults.resolution),
            chunk_size: env_parse::<usize>("AUTOSHORTS_CHUNK_SIZE")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.chunk_size),
            page_size: env_parse("AUTOSHORTS_PAGE_SIZE").unwrap_or(defaults.page_size),
            info_limit: env_parse("AUTOSHORTS_INFO_LIMIT").unwrap_or(defaults.info_limit),
            short_form_max_secs: env_parse("AUTOSHORTS_SHORT_FORM_MAX_SECS"),
            region_codes: std::env::var("AUTOSHORTS_REGIONS")
                .ok()
                .map(|v| {
                    v.split(',')
                        .map(|r| r.trim().to_uppercase())
                        .filter(|r| !r.is_empty())
                        .collect::<Vec<_>>()
                })
                .filter(|regions| !regions.is_empty())
                .unwrap_or(defaults.region_codes),
            dataset_dir: std::env::var("AUTOSHORTS_DATASET_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.dataset_dir),
        }
    }

    /// The per-video download settings.
    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig {
            save_path: self.save_path.clone(),
            bucket: self.bucket.clone(),
            upload: self.upload,
            keep_local: self.keep_local,
        }
    }
}
