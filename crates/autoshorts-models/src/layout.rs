//! Artifact layout shared by the local filesystem and object storage.
//!
//! Both sides partition by `{category_id}/{channel_id}/{video_id}`:
//! locally under the configured save path, remotely under `data/videos`.

use std::path::{Path, PathBuf};

use crate::video::VideoRecord;

/// JSON sidecar file name.
pub const SIDECAR_FILE: &str = "video_data.json";

/// Media file name.
pub const MEDIA_FILE: &str = "video.mp4";

/// Root prefix for uploaded videos.
pub const STORAGE_ROOT: &str = "data/videos";

/// Directory segment used when a video has no channel id.
pub const UNKNOWN_CHANNEL: &str = "unknown-channel";

fn channel_segment(record: &VideoRecord) -> &str {
    record
        .channel_id
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(UNKNOWN_CHANNEL)
}

/// Local working directory of one video.
pub fn local_video_dir(save_path: &Path, record: &VideoRecord) -> PathBuf {
    save_path
        .join(&record.category_id)
        .join(channel_segment(record))
        .join(record.id.as_str())
}

/// Object storage prefix of one video, without a trailing slash.
pub fn storage_prefix(record: &VideoRecord) -> String {
    format!(
        "{STORAGE_ROOT}/{}/{}/{}",
        record.category_id,
        channel_segment(record),
        record.id
    )
}

/// Object key of a file under a video's storage prefix.
pub fn storage_key(prefix: &str, file_name: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), file_name)
}

/// Video id encoded as the last segment of a storage prefix.
pub fn video_id_from_prefix(prefix: &str) -> Option<&str> {
    prefix
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
}
