use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A free-form checklist track. Edited on its own page and persisted
/// through the Track Store, but carried in the unified snapshot for
/// export/import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTrack {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub items: Vec<TrackItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackItem {
    pub id: Uuid,
    pub label: String,
    pub checked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTrackInput {
    pub name: String,
    pub color: String,
    /// Number of checklist items to synthesize; minimum 1.
    pub item_count: usize,
}

/// Name/color patch; items are edited one at a time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackMetaPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackItemPatch {
    pub label: Option<String>,
    pub checked: Option<bool>,
}
