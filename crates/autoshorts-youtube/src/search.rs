//! Paging helpers over search and chart endpoints.

use std::collections::HashSet;

use tracing::debug;

use autoshorts_models::VideoRecordWithStats;

use crate::client::{PlatformApi, SearchQuery, MAX_IDS_PER_REQUEST};
use crate::error::YoutubeResult;

fn page_size_for(remaining: usize) -> u32 {
    remaining.min(MAX_IDS_PER_REQUEST) as u32
}

/// Collect up to `max_results` distinct video ids for a search query.
///
/// Paging stops when the platform stops returning a continuation token.
pub async fn collect_search_ids(
    api: &dyn PlatformApi,
    query: &SearchQuery,
    max_results: usize,
) -> YoutubeResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    let mut token: Option<String> = None;

    while ids.len() < max_results {
        let page = api
            .search_page(query, page_size_for(max_results - ids.len()), token.as_deref())
            .await?;

        for id in page.video_ids {
            if ids.len() < max_results && seen.insert(id.clone()) {
                ids.push(id);
            }
        }

        debug!(query = %query.query, collected = ids.len(), "Fetched search page");
        match page.next_page_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    Ok(ids)
}

/// Collect up to `max_results` records from the `mostPopular` chart.
pub async fn collect_most_popular(
    api: &dyn PlatformApi,
    region_code: &str,
    category_id: Option<&str>,
    max_results: usize,
) -> YoutubeResult<Vec<VideoRecordWithStats>> {
    let mut videos = Vec::new();
    let mut token: Option<String> = None;

    while videos.len() < max_results {
        let page = api
            .most_popular_page(
                region_code,
                category_id,
                page_size_for(max_results - videos.len()),
                token.as_deref(),
            )
            .await?;
        videos.extend(page.items);

        match page.next_page_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    videos.truncate(max_results);
    Ok(videos)
}
