use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub kind: MissionKind,
    pub status: MissionStatus,
    /// Clamped at 0; adjusted only through `adjust_chaos`, which logs
    /// the delta alongside.
    #[serde(default)]
    pub chaos: i64,
    #[serde(default)]
    pub loose_ends: i64,
    #[serde(default)]
    pub reality_requests_failed: i64,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub hints: Option<String>,
    pub goals: Option<String>,
    pub expected_roster: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissionKind {
    Containment,
    Cleanup,
    Disruption,
    Other,
}

impl MissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Containment => "containment",
            Self::Cleanup => "cleanup",
            Self::Disruption => "disruption",
            Self::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "containment" => Some(Self::Containment),
            "cleanup" => Some(Self::Cleanup),
            "disruption" => Some(Self::Disruption),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Planning,
    Active,
    Debrief,
    Archived,
}

impl MissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Active => "active",
            Self::Debrief => "debrief",
            Self::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "planning" => Some(Self::Planning),
            "active" => Some(Self::Active),
            "debrief" => Some(Self::Debrief),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Whole-record input for mission create and update (replace, not merge).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionInput {
    pub code: String,
    pub name: String,
    pub kind: MissionKind,
    pub status: MissionStatus,
    #[serde(default)]
    pub chaos: i64,
    #[serde(default)]
    pub loose_ends: i64,
    #[serde(default)]
    pub reality_requests_failed: i64,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub hints: Option<String>,
    pub goals: Option<String>,
    pub expected_roster: Option<String>,
}

/// Append-only mission log. Entries are removed only as a cascade when
/// the owning mission is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionLogEntry {
    pub id: Uuid,
    pub mission_id: Uuid,
    pub at: DateTime<Utc>,
    pub kind: LogKind,
    pub detail: String,
    pub delta: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Log,
    Chaos,
    LooseEnd,
    RealityFailure,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Chaos => "chaos",
            Self::LooseEnd => "loose_end",
            Self::RealityFailure => "reality_failure",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "log" => Some(Self::Log),
            "chaos" => Some(Self::Chaos),
            "loose_end" => Some(Self::LooseEnd),
            "reality_failure" => Some(Self::RealityFailure),
            _ => None,
        }
    }
}
