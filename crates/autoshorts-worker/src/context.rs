//! Collaborators shared by the pipeline, built once at startup.

use std::sync::Arc;

use autoshorts_db::{PgVideoStore, VideoStore};
use autoshorts_media::{MediaDownloader, YtDlpDownloader};
use autoshorts_storage::{ObjectStore, S3Client};
use autoshorts_youtube::{
    InnertubeTranscriptClient, LemnosLifeReplayClient, PlatformApi, ReplayProbe,
    TranscriptSource, YoutubeConfig, YoutubeDataClient,
};

use crate::error::WorkerResult;

/// Handles to every external collaborator. Clones share the underlying
/// HTTP client, S3 client and connection pool.
#[derive(Clone)]
pub struct AppContext {
    pub api: Arc<dyn PlatformApi>,
    pub replay: Arc<dyn ReplayProbe>,
    pub transcripts: Arc<dyn TranscriptSource>,
    pub media: Arc<dyn MediaDownloader>,
    pub storage: Arc<dyn ObjectStore>,
    pub store: Arc<dyn VideoStore>,
}

impl AppContext {
    /// Build production collaborators from environment variables.
    pub async fn from_env() -> WorkerResult<Self> {
        let youtube = YoutubeConfig::from_env()?;
        let http = youtube.http_client()?;

        Ok(Self {
            api: Arc::new(YoutubeDataClient::with_http(http.clone(), &youtube)),
            replay: Arc::new(LemnosLifeReplayClient::with_http(http.clone(), &youtube)),
            transcripts: Arc::new(InnertubeTranscriptClient::with_http(http, &youtube)),
            media: Arc::new(YtDlpDownloader::from_env()),
            storage: Arc::new(S3Client::from_env().await?),
            store: Arc::new(PgVideoStore::from_env().await?),
        })
    }
}
