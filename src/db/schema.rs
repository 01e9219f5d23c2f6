//! Versioned schema for the on-device database.
//!
//! Each entry is additive only (new tables, new columns, new indexes);
//! existing tables are never dropped or renamed in place, so upgrading
//! a device with existing data always preserves it. `user_version`
//! tracks how far the chain has been applied.

pub(crate) const MIGRATIONS: &[(&str, &str)] = &[
    ("campaign_core", V1_CAMPAIGN_CORE),
    ("custom_tracks", V2_CUSTOM_TRACKS),
    ("notes", V3_NOTES),
    ("emergency", V4_EMERGENCY),
];

const V1_CAMPAIGN_CORE: &str = r#"
CREATE TABLE IF NOT EXISTS campaigns (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    short_code TEXT NOT NULL,
    location TEXT NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('active', 'paused', 'ended')),
    style_tags JSON NOT NULL,
    content_warnings JSON NOT NULL,
    default_rules JSON NOT NULL,
    next_mission_id TEXT,
    duty_manager TEXT,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS agents (
    id TEXT PRIMARY KEY,
    codename TEXT NOT NULL,
    arc_origin TEXT NOT NULL,
    arc_current TEXT NOT NULL,
    arc_ambition TEXT NOT NULL,
    qa JSON NOT NULL,
    awards INTEGER NOT NULL DEFAULT 0,
    reprimands INTEGER NOT NULL DEFAULT 0,
    awards_delta INTEGER NOT NULL DEFAULT 0,
    reprimands_delta INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL CHECK (status IN ('active', 'resting', 'retired', 'dead', 'pending')),
    equipment_claims JSON NOT NULL
);

CREATE TABLE IF NOT EXISTS missions (
    id TEXT PRIMARY KEY,
    code TEXT NOT NULL,
    name TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('containment', 'cleanup', 'disruption', 'other')),
    status TEXT NOT NULL CHECK (status IN ('planning', 'active', 'debrief', 'archived')),
    chaos INTEGER NOT NULL DEFAULT 0,
    loose_ends INTEGER NOT NULL DEFAULT 0,
    reality_requests_failed INTEGER NOT NULL DEFAULT 0,
    scheduled_for TEXT,
    hints TEXT,
    goals TEXT,
    expected_roster TEXT
);

CREATE TABLE IF NOT EXISTS logs (
    id TEXT PRIMARY KEY,
    mission_id TEXT NOT NULL REFERENCES missions(id) ON DELETE CASCADE,
    at TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('log', 'chaos', 'loose_end', 'reality_failure')),
    detail TEXT NOT NULL,
    delta INTEGER
);

CREATE TABLE IF NOT EXISTS anomalies (
    id TEXT PRIMARY KEY,
    codename TEXT NOT NULL,
    focus TEXT NOT NULL,
    domain TEXT NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('active', 'contained', 'neutralized', 'escaped'))
);

CREATE INDEX IF NOT EXISTS idx_logs_mission ON logs(mission_id);
"#;

const V2_CUSTOM_TRACKS: &str = r#"
CREATE TABLE IF NOT EXISTS tracks (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    color TEXT NOT NULL,
    items JSON NOT NULL
);
"#;

const V3_NOTES: &str = r#"
CREATE TABLE IF NOT EXISTS notes (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    summary TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

ALTER TABLE campaigns ADD COLUMN notes_allow_html INTEGER;
"#;

const V4_EMERGENCY: &str = r#"
CREATE TABLE IF NOT EXISTS emergency_settings (
    id TEXT PRIMARY KEY CHECK (id = 'singleton'),
    enabled INTEGER NOT NULL DEFAULT 0,
    chat_open INTEGER NOT NULL DEFAULT 0,
    poll_interval_secs INTEGER NOT NULL DEFAULT 30,
    permissions JSON NOT NULL,
    llm JSON NOT NULL
);

CREATE TABLE IF NOT EXISTS emergency_actions (
    id TEXT PRIMARY KEY,
    at TEXT NOT NULL,
    command JSON NOT NULL,
    original_state JSON NOT NULL,
    reverted INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS emergency_messages (
    id TEXT PRIMARY KEY,
    role TEXT NOT NULL CHECK (role IN ('user', 'assistant')),
    content TEXT NOT NULL,
    at TEXT NOT NULL
);
"#;
