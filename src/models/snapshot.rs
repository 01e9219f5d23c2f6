use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    Agent, Anomaly, Campaign, CustomTrack, EmergencyState, Mission, MissionLogEntry, Note,
};

/// Current export envelope version.
pub const EXPORT_VERSION: u32 = 1;

/// The aggregate of all campaign data: the unit of export, import, and
/// full-state hydration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencySnapshot {
    pub campaign: Campaign,
    pub agents: Vec<Agent>,
    pub missions: Vec<Mission>,
    pub anomalies: Vec<Anomaly>,
    #[serde(default)]
    pub logs: Vec<MissionLogEntry>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub tracks: Vec<CustomTrack>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency: Option<EmergencyState>,
    #[serde(default)]
    pub settings: AppSettings,
}

impl AgencySnapshot {
    /// The in-memory default used to seed a brand-new database.
    pub fn first_run() -> Self {
        Self {
            campaign: Campaign::first_run(),
            agents: Vec::new(),
            missions: Vec::new(),
            anomalies: Vec::new(),
            logs: Vec::new(),
            notes: Vec::new(),
            tracks: Vec::new(),
            emergency: Some(EmergencyState::default()),
            settings: AppSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub notes_allow_html: Option<bool>,
}

/// File export framing: `{version, exported_at, data}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub data: AgencySnapshot,
}

/// Serializes the snapshot into a downloadable export envelope.
pub fn export_envelope(snapshot: &AgencySnapshot) -> Result<String> {
    let envelope = SnapshotEnvelope {
        version: EXPORT_VERSION,
        exported_at: Utc::now(),
        data: snapshot.clone(),
    };
    serde_json::to_string_pretty(&envelope).context("failed to serialize export envelope")
}

/// Parses an import payload: either a full envelope or a bare snapshot
/// object (older exports). Structural validation happens before any
/// deserialization so a malformed file is rejected without touching
/// storage: `campaign` must be an object and `agents`/`missions`/
/// `anomalies` must be arrays. Absent `logs`/`tracks`/`notes` default
/// to empty.
pub fn parse_import(raw: &str) -> Result<AgencySnapshot> {
    let value: serde_json::Value =
        serde_json::from_str(raw).context("import file is not valid JSON")?;

    let data = match value {
        serde_json::Value::Object(ref map) if map.contains_key("data") && map.contains_key("version") => {
            map["data"].clone()
        }
        other => other,
    };

    validate_snapshot_value(&data)?;
    serde_json::from_value(data).context("import file does not match the snapshot shape")
}

fn validate_snapshot_value(data: &serde_json::Value) -> Result<()> {
    let Some(map) = data.as_object() else {
        bail!("import rejected: payload is not an object");
    };
    if !map.get("campaign").map_or(false, |v| v.is_object()) {
        bail!("import rejected: 'campaign' must be an object");
    }
    for key in ["agents", "missions", "anomalies"] {
        if !map.get(key).map_or(false, |v| v.is_array()) {
            bail!("import rejected: '{key}' must be an array");
        }
    }
    Ok(())
}
