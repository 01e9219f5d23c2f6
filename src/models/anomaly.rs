use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub id: Uuid,
    pub codename: String,
    pub focus: String,
    pub domain: String,
    pub status: AnomalyStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyStatus {
    Active,
    Contained,
    Neutralized,
    Escaped,
}

impl AnomalyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Contained => "contained",
            Self::Neutralized => "neutralized",
            Self::Escaped => "escaped",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "contained" => Some(Self::Contained),
            "neutralized" => Some(Self::Neutralized),
            "escaped" => Some(Self::Escaped),
            _ => None,
        }
    }
}

/// Whole-record input for anomaly create and update (replace, not merge).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyInput {
    pub codename: String,
    pub focus: String,
    pub domain: String,
    pub status: AnomalyStatus,
}
