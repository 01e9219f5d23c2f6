use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    pub codename: String,
    pub arc_origin: String,
    pub arc_current: String,
    pub arc_ambition: String,
    pub qa: QaProfile,
    pub awards: i64,
    pub reprimands: i64,
    /// Per-mission delta, folded into `awards` by `settle_agent_deltas`.
    /// May be negative (a correction).
    #[serde(default)]
    pub awards_delta: i64,
    #[serde(default)]
    pub reprimands_delta: i64,
    pub status: AgentStatus,
    #[serde(default)]
    pub equipment_claims: Vec<EquipmentClaim>,
}

/// A `{current, max}` stat pair, both bounded 0-9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatPair {
    pub current: u8,
    pub max: u8,
}

impl StatPair {
    pub fn new(current: u8, max: u8) -> Self {
        Self {
            current: current.min(9),
            max: max.min(9),
        }
    }

    fn clamped(self) -> Self {
        Self::new(self.current, self.max)
    }
}

impl Default for StatPair {
    fn default() -> Self {
        Self { current: 5, max: 5 }
    }
}

/// The fixed QA profile: nine named stat categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaProfile {
    pub vigor: StatPair,
    pub agility: StatPair,
    pub resolve: StatPair,
    pub wits: StatPair,
    pub charm: StatPair,
    pub weirdness: StatPair,
    pub clearance: StatPair,
    pub fieldcraft: StatPair,
    pub paperwork: StatPair,
}

impl QaProfile {
    /// Returns the profile with every pair clamped into 0-9.
    pub fn clamped(self) -> Self {
        Self {
            vigor: self.vigor.clamped(),
            agility: self.agility.clamped(),
            resolve: self.resolve.clamped(),
            wits: self.wits.clamped(),
            charm: self.charm.clamped(),
            weirdness: self.weirdness.clamped(),
            clearance: self.clearance.clamped(),
            fieldcraft: self.fieldcraft.clamped(),
            paperwork: self.paperwork.clamped(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Active,
    Resting,
    Retired,
    Dead,
    Pending,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Resting => "resting",
            Self::Retired => "retired",
            Self::Dead => "dead",
            Self::Pending => "pending",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "resting" => Some(Self::Resting),
            "retired" => Some(Self::Retired),
            "dead" => Some(Self::Dead),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentClaim {
    pub id: Uuid,
    pub item: String,
    pub category: String,
    pub reason: String,
    pub claimed_at: DateTime<Utc>,
    pub status: ClaimStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Denied,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "denied" => Some(Self::Denied),
            _ => None,
        }
    }
}

/// Whole-record input for agent create and update. Update replaces the
/// stored record with exactly this (last write wins over the whole
/// record) — it is not a merge, so callers must pass every field they
/// want kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInput {
    pub codename: String,
    #[serde(default)]
    pub arc_origin: String,
    #[serde(default)]
    pub arc_current: String,
    #[serde(default)]
    pub arc_ambition: String,
    #[serde(default)]
    pub qa: QaProfile,
    #[serde(default)]
    pub awards: i64,
    #[serde(default)]
    pub reprimands: i64,
    #[serde(default)]
    pub awards_delta: i64,
    #[serde(default)]
    pub reprimands_delta: i64,
    pub status: AgentStatus,
    #[serde(default)]
    pub equipment_claims: Vec<EquipmentClaim>,
}
