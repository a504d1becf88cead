//! Video, channel and category persistence.

use std::future::Future;
use std::time::Instant;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, info};

use autoshorts_models::{ChannelRecord, DatasetFilter, PersistedVideoRow, VideoCategory};

use crate::config::DbConfig;
use crate::error::DbResult;
use crate::metrics::record_query;

/// Rows per multi-value insert; keeps bind counts far below the
/// Postgres limit of 65535 parameters.
const CATEGORY_BATCH: usize = 500;

/// Persistence operations used by the orchestrators.
///
/// A row in `videos` is the record of a completed download; its presence
/// is what makes reruns skip a video.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn channel_exists(&self, channel_id: &str) -> DbResult<bool>;

    /// Insert or refresh a channel row.
    async fn upsert_channel(&self, channel: &ChannelRecord) -> DbResult<()>;

    async fn video_exists(&self, video_id: &str) -> DbResult<bool>;

    /// Insert the row unless a row with the same id exists.
    /// Returns whether a row was written.
    async fn insert_video_if_absent(&self, row: &PersistedVideoRow) -> DbResult<bool>;

    /// Insert or refresh categories, returning the number of rows touched.
    async fn upsert_categories(&self, categories: &[VideoCategory]) -> DbResult<u64>;

    /// Storage prefixes of persisted videos matching `filter`, ordered by id.
    async fn storage_paths(&self, filter: &DatasetFilter) -> DbResult<Vec<String>>;

    /// Storage prefixes of all persisted videos except `video_ids`.
    async fn storage_paths_excluding(&self, video_ids: &[String]) -> DbResult<Vec<String>>;
}

async fn timed<T, F>(operation: &'static str, query: F) -> DbResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    let start = Instant::now();
    let result = query.await;
    record_query(operation, result.is_ok(), start.elapsed().as_secs_f64() * 1000.0);
    Ok(result?)
}

fn to_column(count: Option<u64>) -> Option<i64> {
    count.and_then(|c| i64::try_from(c).ok())
}

/// sqlx-backed store. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct PgVideoStore {
    pool: PgPool,
}

impl PgVideoStore {
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and, when configured, apply embedded migrations.
    pub async fn connect(config: &DbConfig) -> DbResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await?;

        let store = Self::from_pool(pool);
        if config.run_migrations {
            store.migrate().await?;
        }
        Ok(store)
    }

    pub async fn from_env() -> DbResult<Self> {
        Self::connect(&DbConfig::from_env()?).await
    }

    pub async fn migrate(&self) -> DbResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn channel_exists(&self, channel_id: &str) -> DbResult<bool> {
        timed(
            "channel_exists",
            sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM channels WHERE channel_id = $1)",
            )
            .bind(channel_id)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn upsert_channel(&self, channel: &ChannelRecord) -> DbResult<()> {
        timed(
            "upsert_channel",
            sqlx::query(
                "INSERT INTO channels (channel_id, title, description, custom_url, views, subscribers)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 ON CONFLICT (channel_id) DO UPDATE SET
                     title = EXCLUDED.title,
                     description = EXCLUDED.description,
                     custom_url = EXCLUDED.custom_url,
                     views = EXCLUDED.views,
                     subscribers = EXCLUDED.subscribers,
                     updated_at = now()",
            )
            .bind(&channel.channel_id)
            .bind(&channel.title)
            .bind(&channel.description)
            .bind(&channel.custom_url)
            .bind(to_column(channel.views))
            .bind(to_column(channel.subscribers))
            .execute(&self.pool),
        )
        .await?;

        debug!(channel_id = %channel.channel_id, "Channel upserted");
        Ok(())
    }

    async fn video_exists(&self, video_id: &str) -> DbResult<bool> {
        timed(
            "video_exists",
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1)")
                .bind(video_id)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn insert_video_if_absent(&self, row: &PersistedVideoRow) -> DbResult<bool> {
        let result = timed(
            "insert_video",
            sqlx::query(
                "INSERT INTO videos (id, audio_language, licensed, description, published_at, tags,
                                     title, category_id, channel_id, storage_path, comments, likes, views)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(&row.id)
            .bind(&row.audio_language)
            .bind(row.licensed)
            .bind(&row.description)
            .bind(row.published_at)
            .bind(&row.tags)
            .bind(&row.title)
            .bind(&row.category_id)
            .bind(&row.channel_id)
            .bind(&row.storage_path)
            .bind(row.comments)
            .bind(row.likes)
            .bind(row.views)
            .execute(&self.pool),
        )
        .await?;

        let inserted = result.rows_affected() > 0;
        debug!(video_id = %row.id, inserted, "Video row written");
        Ok(inserted)
    }

    async fn upsert_categories(&self, categories: &[VideoCategory]) -> DbResult<u64> {
        let mut touched = 0;
        for batch in categories.chunks(CATEGORY_BATCH) {
            let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
                "INSERT INTO categories (region_code, category_id, category_title, assignable) ",
            );
            builder.push_values(batch, |mut b, category| {
                b.push_bind(category.region_code.clone())
                    .push_bind(category.category_id.clone())
                    .push_bind(category.category_title.clone())
                    .push_bind(category.assignable);
            });
            builder.push(
                " ON CONFLICT (region_code, category_id) DO UPDATE SET
                     category_title = EXCLUDED.category_title,
                     assignable = EXCLUDED.assignable,
                     updated_at = now()",
            );

            let result = timed("upsert_categories", builder.build().execute(&self.pool)).await?;
            touched += result.rows_affected();
        }
        Ok(touched)
    }

    async fn storage_paths(&self, filter: &DatasetFilter) -> DbResult<Vec<String>> {
        timed(
            "storage_paths",
            sqlx::query_scalar::<_, String>(
                "SELECT storage_path FROM videos
                 WHERE ($1::text IS NULL OR channel_id = $1)
                   AND ($2::text IS NULL OR category_id = $2)
                   AND ($3::text IS NULL OR strpos(lower(description), lower($3)) > 0)
                 ORDER BY id
                 LIMIT $4",
            )
            .bind(&filter.channel_id)
            .bind(&filter.category_id)
            .bind(&filter.description_contains)
            .bind(filter.limit.map(i64::from))
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn storage_paths_excluding(&self, video_ids: &[String]) -> DbResult<Vec<String>> {
        timed(
            "storage_paths_excluding",
            sqlx::query_scalar::<_, String>(
                "SELECT storage_path FROM videos WHERE NOT (id = ANY($1)) ORDER BY id",
            )
            .bind(video_ids.to_vec())
            .fetch_all(&self.pool),
        )
        .await
    }
}
