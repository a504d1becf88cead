//! Channel and playlist models.

use serde::{Deserialize, Serialize};

use crate::video::VideoRecord;

/// Normalized channel metadata, keyed by `channel_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub channel_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub custom_url: Option<String>,
    pub views: Option<u64>,
    pub subscribers: Option<u64>,
}

/// One page of `playlistItems.list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistPage {
    pub items: Vec<VideoRecord>,
    pub next_page_token: Option<String>,
}

/// Derive a channel's uploads playlist id from its channel id.
///
/// Channel ids start with `UC`; the uploads playlist shares the suffix
/// under the `UU` prefix. Ids shorter than two characters are returned
/// with the prefix only.
pub fn uploads_playlist_id(channel_id: &str) -> String {
    let suffix = channel_id.get(2..).unwrap_or("");
    format!("UU{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uploads_playlist_id_replaces_prefix() {
        assert_eq!(
            uploads_playlist_id("UCX6OQ3DkcsbYNE6H8uQQuVA"),
            "UUX6OQ3DkcsbYNE6H8uQQuVA"
        );
        assert_eq!(uploads_playlist_id("UC"), "UU");
        assert_eq!(uploads_playlist_id("U"), "UU");
    }
}
