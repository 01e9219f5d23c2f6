use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The singleton campaign header. Exactly one exists at a time; created
/// from built-in defaults on first run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub short_code: String,
    pub location: String,
    pub status: CampaignStatus,
    pub style_tags: Vec<String>,
    pub content_warnings: Vec<String>,
    pub default_rules: Vec<String>,
    pub next_mission_id: Option<Uuid>,
    pub duty_manager: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Built-in defaults used to seed a brand-new database.
    pub fn first_run() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: "Untitled Campaign".to_string(),
            short_code: "HQ-01".to_string(),
            location: "Headquarters".to_string(),
            status: CampaignStatus::Active,
            style_tags: Vec::new(),
            content_warnings: Vec::new(),
            default_rules: Vec::new(),
            next_mission_id: None,
            duty_manager: None,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Active,
    Paused,
    Ended,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Ended => "ended",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            "ended" => Some(Self::Ended),
            _ => None,
        }
    }
}

/// Partial patch for the campaign header. Every applied patch refreshes
/// `updated_at`. The doubled `Option` on nullable fields distinguishes
/// "leave alone" from "clear".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignPatch {
    pub name: Option<String>,
    pub short_code: Option<String>,
    pub location: Option<String>,
    pub status: Option<CampaignStatus>,
    pub style_tags: Option<Vec<String>>,
    pub content_warnings: Option<Vec<String>>,
    pub default_rules: Option<Vec<String>>,
    pub next_mission_id: Option<Option<Uuid>>,
    pub duty_manager: Option<Option<String>>,
}
