//! Dataset export selection and manifest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which persisted videos to export. Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFilter {
    pub channel_id: Option<String>,
    pub category_id: Option<String>,
    /// Case-insensitive substring of the description.
    pub description_contains: Option<String>,
    pub limit: Option<u32>,
}

/// Written as `manifest.json` at the root of an exported dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub name: String,
    pub exported_at: DateTime<Utc>,
    pub filter: DatasetFilter,
    /// Video ids left out on request, e.g. those of an earlier dataset.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_ids: Vec<String>,
    /// Storage prefixes that were exported successfully.
    pub exported: Vec<String>,
    /// Storage prefixes that failed to download.
    #[serde(default)]
    pub failed: Vec<String>,
}
