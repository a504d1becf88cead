//! Video category models.

use serde::{Deserialize, Serialize};

/// A platform video category for one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCategory {
    pub region_code: String,
    pub category_id: String,
    pub category_title: Option<String>,
    pub assignable: Option<bool>,
}
