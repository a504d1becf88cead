//! AutoShorts harvester binary.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use autoshorts_models::{resolve_video_id, DatasetFilter, DateWindow};
use autoshorts_worker::{
    export_dataset, exported_ids, init_tracing, sync_categories, AppContext, BatchDownloader,
    BatchOptions, BatchReport, DatasetExport, DatasetSelection, WorkerConfig,
};
use autoshorts_youtube::{SearchOrder, SearchQuery};

#[derive(Parser)]
#[command(name = "autoshorts")]
#[command(about = "Harvest YouTube videos with most-replayed moments", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the uploads of the channel that published a video
    Channel {
        /// Seed video id or URL
        video: String,
        #[command(flatten)]
        download: DownloadArgs,
    },
    /// Download specific videos
    Videos {
        /// Video ids or URLs
        #[arg(required = true)]
        videos: Vec<String>,
        #[command(flatten)]
        download: DownloadArgs,
    },
    /// Download the results of a search query
    Search {
        query: String,
        #[arg(long, default_value_t = 50)]
        max_results: usize,
        /// One of date, rating, relevance, title or viewCount
        #[arg(long, default_value = "relevance")]
        order: SearchOrder,
        #[arg(long)]
        region: Option<String>,
        /// RFC 3339 lower bound on publication time
        #[arg(long)]
        published_after: Option<String>,
        #[command(flatten)]
        download: DownloadArgs,
    },
    /// Download videos from the most-popular chart
    Popular {
        #[arg(long, default_value = "US")]
        region: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 50)]
        max_results: usize,
        #[command(flatten)]
        download: DownloadArgs,
    },
    /// Sync video categories for the configured or given regions
    Categories {
        #[arg(long = "region")]
        regions: Vec<String>,
    },
    /// Export persisted videos from object storage into a local dataset
    Dataset {
        name: String,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        channel: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description_contains: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        /// Export every video not listed in this manifest instead of filtering
        #[arg(long, conflicts_with_all = ["channel", "category", "description_contains", "limit"])]
        exclude_manifest: Option<PathBuf>,
        #[arg(long)]
        bucket: Option<String>,
    },
}

/// Overrides for the environment-provided download settings.
#[derive(Args, Debug)]
struct DownloadArgs {
    #[arg(long)]
    save_path: Option<PathBuf>,
    #[arg(long)]
    bucket: Option<String>,
    /// Upload to object storage and record in the database
    #[arg(long)]
    upload: bool,
    /// Delete local files after upload
    #[arg(long, requires = "upload")]
    discard_local: bool,
    #[arg(long)]
    resolution: Option<String>,
    #[arg(long)]
    chunk_size: Option<usize>,
    #[arg(long)]
    page_size: Option<u32>,
    /// Playlist items listed before filtering
    #[arg(long)]
    info_limit: Option<usize>,
    /// Videos downloaded after filtering
    #[arg(long)]
    limit: Option<usize>,
    /// Inclusive lower bound, YYYY-MM-DD
    #[arg(long)]
    from_date: Option<String>,
    /// Inclusive upper bound, YYYY-MM-DD
    #[arg(long)]
    to_date: Option<String>,
    /// Skip videos no longer than this many seconds
    #[arg(long)]
    short_form_max_secs: Option<u64>,
}

impl DownloadArgs {
    fn apply(&self, mut config: WorkerConfig) -> Result<(WorkerConfig, BatchOptions)> {
        if let Some(path) = &self.save_path {
            config.save_path = path.clone();
        }
        if let Some(bucket) = &self.bucket {
            config.bucket = bucket.clone();
        }
        if self.upload {
            config.upload = true;
        }
        if self.discard_local {
            config.keep_local = false;
        }
        if let Some(resolution) = &self.resolution {
            config.resolution = resolution.clone();
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size.max(1);
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(info_limit) = self.info_limit {
            config.info_limit = info_limit;
        }
        if self.short_form_max_secs.is_some() {
            config.short_form_max_secs = self.short_form_max_secs;
        }

        let mut options = BatchOptions::from_config(&config);
        options.limit = self.limit;
        options.window = DateWindow::from_dates(self.from_date.as_deref(), self.to_date.as_deref())?;
        Ok((config, options))
    }
}

fn log_report(report: &BatchReport) {
    info!(
        selected = report.selected,
        completed = report.completed,
        already_persisted = report.already_persisted,
        no_replay_signal = report.no_replay_signal,
        skipped_short_form = report.skipped_short_form,
        failed = report.failed.len(),
        "Batch finished"
    );
    if !report.failed.is_empty() {
        info!(failed = ?report.failed, "Failed videos");
    }
}

async fn run(cli: Cli, config: WorkerConfig) -> Result<()> {
    let ctx = AppContext::from_env()
        .await
        .context("failed to initialize collaborators")?;

    match cli.command {
        Commands::Channel { video, download } => {
            let video_id = resolve_video_id(&video)?;
            let (config, options) = download.apply(config)?;
            let batch = BatchDownloader::new(ctx, config.short_form_max_secs);
            let report = batch
                .download_channel(&video_id, &config.download_config(), &options)
                .await?;
            log_report(&report);
        }

        Commands::Videos { videos, download } => {
            let ids = videos
                .iter()
                .map(|v| resolve_video_id(v))
                .collect::<Result<Vec<_>, _>>()?;
            let (config, options) = download.apply(config)?;
            let batch = BatchDownloader::new(ctx, config.short_form_max_secs);
            let report = batch
                .download_videos(&ids, &config.download_config(), &options)
                .await?;
            log_report(&report);
        }

        Commands::Search {
            query,
            max_results,
            order,
            region,
            published_after,
            download,
        } => {
            let (config, options) = download.apply(config)?;
            let mut search = SearchQuery::new(query);
            search.order = order;
            search.region_code = region;
            search.published_after = published_after;
            let batch = BatchDownloader::new(ctx, config.short_form_max_secs);
            let report = batch
                .download_search(&search, max_results, &config.download_config(), &options)
                .await?;
            log_report(&report);
        }

        Commands::Popular {
            region,
            category,
            max_results,
            download,
        } => {
            let (config, options) = download.apply(config)?;
            let batch = BatchDownloader::new(ctx, config.short_form_max_secs);
            let report = batch
                .download_most_popular(
                    &region,
                    category.as_deref(),
                    max_results,
                    &config.download_config(),
                    &options,
                )
                .await?;
            log_report(&report);
        }

        Commands::Categories { regions } => {
            let regions = if regions.is_empty() {
                config.region_codes.clone()
            } else {
                regions
            };
            let written = sync_categories(&ctx, &regions).await?;
            info!(regions = ?regions, written, "Categories synced");
        }

        Commands::Dataset {
            name,
            out_dir,
            channel,
            category,
            description_contains,
            limit,
            exclude_manifest,
            bucket,
        } => {
            let selection = match exclude_manifest {
                Some(path) => DatasetSelection::Excluding(
                    exported_ids(&path)
                        .await
                        .with_context(|| format!("failed to read manifest {}", path.display()))?,
                ),
                None => DatasetSelection::Filter(DatasetFilter {
                    channel_id: channel,
                    category_id: category,
                    description_contains,
                    limit,
                }),
            };
            let export = DatasetExport {
                name,
                out_dir: out_dir.unwrap_or_else(|| config.dataset_dir.clone()),
                bucket: bucket.unwrap_or_else(|| config.bucket.clone()),
                selection,
                chunk_size: config.chunk_size,
            };
            let manifest = export_dataset(&ctx, &export).await?;
            info!(
                dir = %export.dataset_dir().display(),
                exported = manifest.exported.len(),
                failed = manifest.failed.len(),
                "Dataset written"
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = WorkerConfig::from_env();
    info!(?config, "Starting autoshorts");

    run(cli, config).await
}
