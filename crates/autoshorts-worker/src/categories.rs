//! Video category sync.

use tracing::info;

use crate::context::AppContext;
use crate::error::WorkerResult;

/// Fetch the categories of each region and upsert them. Returns the number
/// of rows written.
pub async fn sync_categories(ctx: &AppContext, region_codes: &[String]) -> WorkerResult<u64> {
    let mut written = 0;
    for region in region_codes {
        let categories = ctx.api.list_categories(region).await?;
        let rows = ctx.store.upsert_categories(&categories).await?;
        info!(region = %region, categories = categories.len(), "Categories synced");
        written += rows;
    }
    Ok(written)
}
