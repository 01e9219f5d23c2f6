//! Persistence repository: bidirectional mapping between the in-memory
//! snapshot and the multi-table on-device database.

mod schema;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{
    Agent, AgencySnapshot, Anomaly, AppSettings, Campaign, CustomTrack, EmergencyAction,
    EmergencyMessage, EmergencySettings, EmergencyState, Mission, MissionLogEntry, Note,
};

/// The save/load contract the coordinator depends on. `Database` is the
/// production implementation; tests substitute counting fakes.
pub trait SnapshotRepository: Send + Sync + 'static {
    fn load(&self) -> Result<Option<AgencySnapshot>>;
    fn save(&self, snapshot: &AgencySnapshot) -> Result<()>;
}

const TABLES: [&str; 10] = [
    "logs",
    "missions",
    "agents",
    "anomalies",
    "campaigns",
    "tracks",
    "notes",
    "emergency_settings",
    "emergency_actions",
    "emergency_messages",
];

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open database file")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "agency-desk")
            .context("could not determine a data directory")?;
        std::fs::create_dir_all(dirs.data_dir()).context("failed to create data directory")?;
        Self::open(dirs.data_dir().join("agency.db"))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Applies any pending schema versions. Safe to call on every open;
    /// versions already applied are skipped.
    pub fn migrate(&self) -> Result<()> {
        let mut conn = self.lock_conn();
        let tx = conn.transaction()?;
        let current: i64 = tx.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        for (idx, (name, sql)) in schema::MIGRATIONS.iter().enumerate() {
            let version = idx as i64 + 1;
            if version <= current {
                continue;
            }
            debug!(version, name, "applying schema migration");
            tx.execute_batch(sql)
                .with_context(|| format!("migration v{version} ({name}) failed"))?;
        }
        let target = schema::MIGRATIONS.len() as i64;
        if current < target {
            tx.pragma_update(None, "user_version", target)?;
            info!(from = current, to = target, "database schema upgraded");
        }
        tx.commit()?;
        Ok(())
    }

    /// Reads the whole database back into one snapshot. An empty
    /// campaigns table means first run and yields `None`.
    pub fn load(&self) -> Result<Option<AgencySnapshot>> {
        let conn = self.lock_conn();
        let Some((campaign, settings)) = read_campaign(&conn)? else {
            return Ok(None);
        };
        let snapshot = AgencySnapshot {
            campaign,
            agents: read_agents(&conn)?,
            missions: read_missions(&conn)?,
            anomalies: read_anomalies(&conn)?,
            logs: read_logs(&conn)?,
            notes: read_notes(&conn)?,
            tracks: read_tracks(&conn)?,
            emergency: read_emergency(&conn)?,
            settings,
        };
        Ok(Some(snapshot))
    }

    /// Writes the snapshot in a single transaction spanning every
    /// table: clear the table, then bulk-insert the snapshot's rows.
    /// In-memory deletions therefore need no tombstones, and a
    /// concurrent `load` can never observe a partial write.
    pub fn save(&self, snapshot: &AgencySnapshot) -> Result<()> {
        let mut conn = self.lock_conn();
        let tx = conn.transaction()?;

        for table in TABLES {
            tx.execute(&format!("DELETE FROM {table}"), [])
                .with_context(|| format!("failed to clear table {table}"))?;
        }

        insert_campaign(&tx, &snapshot.campaign, &snapshot.settings)?;
        insert_agents(&tx, &snapshot.agents)?;
        insert_missions(&tx, &snapshot.missions)?;
        insert_logs(&tx, &snapshot.logs)?;
        insert_anomalies(&tx, &snapshot.anomalies)?;
        insert_tracks(&tx, &snapshot.tracks)?;
        insert_notes(&tx, &snapshot.notes)?;
        if let Some(emergency) = &snapshot.emergency {
            insert_emergency(&tx, emergency)?;
        }

        tx.commit().context("snapshot save transaction failed")?;
        debug!(
            agents = snapshot.agents.len(),
            missions = snapshot.missions.len(),
            logs = snapshot.logs.len(),
            "snapshot persisted"
        );
        Ok(())
    }
}

impl SnapshotRepository for Database {
    fn load(&self) -> Result<Option<AgencySnapshot>> {
        Database::load(self)
    }

    fn save(&self, snapshot: &AgencySnapshot) -> Result<()> {
        Database::save(self, snapshot)
    }
}

// column helpers

fn conversion_err(idx: usize, err: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn uuid_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_err(idx, e))
}

fn opt_uuid_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| Uuid::parse_str(&s).map_err(|e| conversion_err(idx, e)))
        .transpose()
}

fn ts_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, e))
}

fn opt_ts_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| conversion_err(idx, e))
    })
    .transpose()
}

fn json_col<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_err(idx, e))
}

fn enum_col<T>(
    row: &Row<'_>,
    idx: usize,
    parse: impl Fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unrecognized value '{raw}'").into(),
        )
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("failed to serialize JSON column")
}

// per-table readers

fn read_campaign(conn: &Connection) -> Result<Option<(Campaign, AppSettings)>> {
    conn.query_row(
        "SELECT id, name, short_code, location, status, style_tags, content_warnings,
                default_rules, next_mission_id, duty_manager, updated_at, notes_allow_html
         FROM campaigns LIMIT 1",
        [],
        |row| {
            Ok((
                Campaign {
                    id: uuid_col(row, 0)?,
                    name: row.get(1)?,
                    short_code: row.get(2)?,
                    location: row.get(3)?,
                    status: enum_col(row, 4, crate::models::CampaignStatus::from_str)?,
                    style_tags: json_col(row, 5)?,
                    content_warnings: json_col(row, 6)?,
                    default_rules: json_col(row, 7)?,
                    next_mission_id: opt_uuid_col(row, 8)?,
                    duty_manager: row.get(9)?,
                    updated_at: ts_col(row, 10)?,
                },
                AppSettings {
                    notes_allow_html: row.get(11)?,
                },
            ))
        },
    )
    .optional()
    .context("failed to read campaign row")
}

fn read_agents(conn: &Connection) -> Result<Vec<Agent>> {
    let mut stmt = conn.prepare(
        "SELECT id, codename, arc_origin, arc_current, arc_ambition, qa, awards, reprimands,
                awards_delta, reprimands_delta, status, equipment_claims
         FROM agents ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Agent {
            id: uuid_col(row, 0)?,
            codename: row.get(1)?,
            arc_origin: row.get(2)?,
            arc_current: row.get(3)?,
            arc_ambition: row.get(4)?,
            qa: json_col(row, 5)?,
            awards: row.get(6)?,
            reprimands: row.get(7)?,
            awards_delta: row.get(8)?,
            reprimands_delta: row.get(9)?,
            status: enum_col(row, 10, crate::models::AgentStatus::from_str)?,
            equipment_claims: json_col(row, 11)?,
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read agents")
}

fn read_missions(conn: &Connection) -> Result<Vec<Mission>> {
    let mut stmt = conn.prepare(
        "SELECT id, code, name, kind, status, chaos, loose_ends, reality_requests_failed,
                scheduled_for, hints, goals, expected_roster
         FROM missions ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Mission {
            id: uuid_col(row, 0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            kind: enum_col(row, 3, crate::models::MissionKind::from_str)?,
            status: enum_col(row, 4, crate::models::MissionStatus::from_str)?,
            chaos: row.get(5)?,
            loose_ends: row.get(6)?,
            reality_requests_failed: row.get(7)?,
            scheduled_for: opt_ts_col(row, 8)?,
            hints: row.get(9)?,
            goals: row.get(10)?,
            expected_roster: row.get(11)?,
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read missions")
}

fn read_logs(conn: &Connection) -> Result<Vec<MissionLogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, mission_id, at, kind, detail, delta FROM logs ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(MissionLogEntry {
            id: uuid_col(row, 0)?,
            mission_id: uuid_col(row, 1)?,
            at: ts_col(row, 2)?,
            kind: enum_col(row, 3, crate::models::LogKind::from_str)?,
            detail: row.get(4)?,
            delta: row.get(5)?,
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read mission logs")
}

fn read_anomalies(conn: &Connection) -> Result<Vec<Anomaly>> {
    let mut stmt =
        conn.prepare("SELECT id, codename, focus, domain, status FROM anomalies ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok(Anomaly {
            id: uuid_col(row, 0)?,
            codename: row.get(1)?,
            focus: row.get(2)?,
            domain: row.get(3)?,
            status: enum_col(row, 4, crate::models::AnomalyStatus::from_str)?,
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read anomalies")
}

fn read_tracks(conn: &Connection) -> Result<Vec<CustomTrack>> {
    let mut stmt = conn.prepare("SELECT id, name, color, items FROM tracks ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok(CustomTrack {
            id: uuid_col(row, 0)?,
            name: row.get(1)?,
            color: row.get(2)?,
            items: json_col(row, 3)?,
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read tracks")
}

fn read_notes(conn: &Connection) -> Result<Vec<Note>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, summary, body, created_at, updated_at FROM notes ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Note {
            id: uuid_col(row, 0)?,
            title: row.get(1)?,
            summary: row.get(2)?,
            body: row.get(3)?,
            created_at: ts_col(row, 4)?,
            updated_at: ts_col(row, 5)?,
        })
    })?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read notes")
}

/// The emergency sub-object exists only when the singleton settings row
/// does; the histories are attached from their own tables.
fn read_emergency(conn: &Connection) -> Result<Option<EmergencyState>> {
    let settings = conn
        .query_row(
            "SELECT enabled, chat_open, poll_interval_secs, permissions, llm
             FROM emergency_settings WHERE id = 'singleton'",
            [],
            |row| {
                Ok(EmergencySettings {
                    enabled: row.get(0)?,
                    chat_open: row.get(1)?,
                    poll_interval_secs: row.get::<_, i64>(2)? as u64,
                    permissions: json_col(row, 3)?,
                    llm: json_col(row, 4)?,
                })
            },
        )
        .optional()
        .context("failed to read emergency settings")?;
    let Some(settings) = settings else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT id, at, command, original_state, reverted FROM emergency_actions ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(EmergencyAction {
            id: uuid_col(row, 0)?,
            at: ts_col(row, 1)?,
            command: json_col(row, 2)?,
            original_state: json_col(row, 3)?,
            reverted: row.get(4)?,
        })
    })?;
    let actions = rows
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read emergency actions")?;

    let mut stmt =
        conn.prepare("SELECT id, role, content, at FROM emergency_messages ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok(EmergencyMessage {
            id: uuid_col(row, 0)?,
            role: enum_col(row, 1, crate::models::MessageRole::from_str)?,
            content: row.get(2)?,
            at: ts_col(row, 3)?,
        })
    })?;
    let messages = rows
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read emergency messages")?;

    Ok(Some(EmergencyState {
        settings,
        actions,
        messages,
    }))
}

// per-table writers

fn insert_campaign(
    tx: &rusqlite::Transaction<'_>,
    campaign: &Campaign,
    settings: &AppSettings,
) -> Result<()> {
    tx.execute(
        "INSERT INTO campaigns (id, name, short_code, location, status, style_tags,
                                content_warnings, default_rules, next_mission_id, duty_manager,
                                updated_at, notes_allow_html)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            campaign.id.to_string(),
            campaign.name,
            campaign.short_code,
            campaign.location,
            campaign.status.as_str(),
            to_json(&campaign.style_tags)?,
            to_json(&campaign.content_warnings)?,
            to_json(&campaign.default_rules)?,
            campaign.next_mission_id.map(|id| id.to_string()),
            campaign.duty_manager,
            campaign.updated_at.to_rfc3339(),
            settings.notes_allow_html,
        ],
    )?;
    Ok(())
}

fn insert_agents(tx: &rusqlite::Transaction<'_>, agents: &[Agent]) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO agents (id, codename, arc_origin, arc_current, arc_ambition, qa, awards,
                             reprimands, awards_delta, reprimands_delta, status, equipment_claims)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )?;
    for agent in agents {
        stmt.execute(params![
            agent.id.to_string(),
            agent.codename,
            agent.arc_origin,
            agent.arc_current,
            agent.arc_ambition,
            to_json(&agent.qa)?,
            agent.awards,
            agent.reprimands,
            agent.awards_delta,
            agent.reprimands_delta,
            agent.status.as_str(),
            to_json(&agent.equipment_claims)?,
        ])?;
    }
    Ok(())
}

fn insert_missions(tx: &rusqlite::Transaction<'_>, missions: &[Mission]) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO missions (id, code, name, kind, status, chaos, loose_ends,
                               reality_requests_failed, scheduled_for, hints, goals,
                               expected_roster)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )?;
    for mission in missions {
        stmt.execute(params![
            mission.id.to_string(),
            mission.code,
            mission.name,
            mission.kind.as_str(),
            mission.status.as_str(),
            mission.chaos,
            mission.loose_ends,
            mission.reality_requests_failed,
            mission.scheduled_for.map(|dt| dt.to_rfc3339()),
            mission.hints,
            mission.goals,
            mission.expected_roster,
        ])?;
    }
    Ok(())
}

fn insert_logs(tx: &rusqlite::Transaction<'_>, logs: &[MissionLogEntry]) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO logs (id, mission_id, at, kind, detail, delta)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for entry in logs {
        stmt.execute(params![
            entry.id.to_string(),
            entry.mission_id.to_string(),
            entry.at.to_rfc3339(),
            entry.kind.as_str(),
            entry.detail,
            entry.delta,
        ])?;
    }
    Ok(())
}

fn insert_anomalies(tx: &rusqlite::Transaction<'_>, anomalies: &[Anomaly]) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO anomalies (id, codename, focus, domain, status)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for anomaly in anomalies {
        stmt.execute(params![
            anomaly.id.to_string(),
            anomaly.codename,
            anomaly.focus,
            anomaly.domain,
            anomaly.status.as_str(),
        ])?;
    }
    Ok(())
}

fn insert_tracks(tx: &rusqlite::Transaction<'_>, tracks: &[CustomTrack]) -> Result<()> {
    let mut stmt =
        tx.prepare("INSERT INTO tracks (id, name, color, items) VALUES (?1, ?2, ?3, ?4)")?;
    for track in tracks {
        stmt.execute(params![
            track.id.to_string(),
            track.name,
            track.color,
            to_json(&track.items)?,
        ])?;
    }
    Ok(())
}

fn insert_notes(tx: &rusqlite::Transaction<'_>, notes: &[Note]) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO notes (id, title, summary, body, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for note in notes {
        stmt.execute(params![
            note.id.to_string(),
            note.title,
            note.summary,
            note.body,
            note.created_at.to_rfc3339(),
            note.updated_at.to_rfc3339(),
        ])?;
    }
    Ok(())
}

fn insert_emergency(tx: &rusqlite::Transaction<'_>, emergency: &EmergencyState) -> Result<()> {
    tx.execute(
        "INSERT INTO emergency_settings (id, enabled, chat_open, poll_interval_secs,
                                         permissions, llm)
         VALUES ('singleton', ?1, ?2, ?3, ?4, ?5)",
        params![
            emergency.settings.enabled,
            emergency.settings.chat_open,
            emergency.settings.poll_interval_secs as i64,
            to_json(&emergency.settings.permissions)?,
            to_json(&emergency.settings.llm)?,
        ],
    )?;

    let mut stmt = tx.prepare(
        "INSERT INTO emergency_actions (id, at, command, original_state, reverted)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for action in &emergency.actions {
        stmt.execute(params![
            action.id.to_string(),
            action.at.to_rfc3339(),
            to_json(&action.command)?,
            to_json(&action.original_state)?,
            action.reverted,
        ])?;
    }

    let mut stmt = tx.prepare(
        "INSERT INTO emergency_messages (id, role, content, at) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for message in &emergency.messages {
        stmt.execute(params![
            message.id.to_string(),
            message.role.as_str(),
            message.content,
            message.at.to_rfc3339(),
        ])?;
    }
    Ok(())
}
