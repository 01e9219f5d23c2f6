use agency_core::models::{
    Agent, AgencySnapshot, AgentStatus, Anomaly, AnomalyStatus, ClaimStatus, CustomTrack,
    EmergencyAction, EmergencyCommand, EmergencyMessage, EmergencyState, EquipmentClaim, LogKind,
    MessageRole, Mission, MissionKind, MissionLogEntry, MissionStatus, Note, Permissions,
    TrackItem,
};
use agency_core::Database;
use chrono::Utc;
use uuid::Uuid;

fn rich_snapshot() -> AgencySnapshot {
    let mut snapshot = AgencySnapshot::first_run();
    snapshot.campaign.name = "Operation Night Ledger".to_string();
    snapshot.campaign.style_tags = vec!["paranoia".to_string(), "bureaucracy".to_string()];
    snapshot.campaign.duty_manager = Some("Desk Officer Crane".to_string());
    snapshot.settings.notes_allow_html = Some(true);

    let mission_id = Uuid::new_v4();
    snapshot.campaign.next_mission_id = Some(mission_id);
    snapshot.missions.push(Mission {
        id: mission_id,
        code: "OP-LANTERN".to_string(),
        name: "Lantern".to_string(),
        kind: MissionKind::Containment,
        status: MissionStatus::Active,
        chaos: 3,
        loose_ends: 1,
        reality_requests_failed: 2,
        scheduled_for: Some(Utc::now()),
        hints: Some("bring salt".to_string()),
        goals: None,
        expected_roster: Some("KESTREL, MAGPIE".to_string()),
    });
    snapshot.logs.push(MissionLogEntry {
        id: Uuid::new_v4(),
        mission_id,
        at: Utc::now(),
        kind: LogKind::Chaos,
        detail: "sirens across the river".to_string(),
        delta: Some(2),
    });
    snapshot.logs.push(MissionLogEntry {
        id: Uuid::new_v4(),
        mission_id,
        at: Utc::now(),
        kind: LogKind::Log,
        detail: "checked in from the safehouse".to_string(),
        delta: None,
    });

    snapshot.agents.push(Agent {
        id: Uuid::new_v4(),
        codename: "KESTREL".to_string(),
        arc_origin: "recruited from accounting".to_string(),
        arc_current: "learning to trust the desk".to_string(),
        arc_ambition: "a quiet retirement".to_string(),
        qa: Default::default(),
        awards: 4,
        reprimands: 1,
        awards_delta: 2,
        reprimands_delta: -1,
        status: AgentStatus::Active,
        equipment_claims: vec![EquipmentClaim {
            id: Uuid::new_v4(),
            item: "thermal goggles".to_string(),
            category: "optics".to_string(),
            reason: "night work on the bridge".to_string(),
            claimed_at: Utc::now(),
            status: ClaimStatus::Approved,
        }],
    });

    snapshot.anomalies.push(Anomaly {
        id: Uuid::new_v4(),
        codename: "HUMMING DOOR".to_string(),
        focus: "threshold".to_string(),
        domain: "acoustic".to_string(),
        status: AnomalyStatus::Contained,
    });

    snapshot.notes.push(Note {
        id: Uuid::new_v4(),
        title: "Safehouse".to_string(),
        summary: "laundromat basement".to_string(),
        body: "<p>Key under the third dryer.</p>".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    });

    snapshot.tracks.push(CustomTrack {
        id: Uuid::new_v4(),
        name: "Doom clock".to_string(),
        color: "#aa0044".to_string(),
        items: vec![
            TrackItem {
                id: Uuid::new_v4(),
                label: "First chime".to_string(),
                checked: true,
            },
            TrackItem {
                id: Uuid::new_v4(),
                label: "Second chime".to_string(),
                checked: false,
            },
        ],
    });

    let mut emergency = EmergencyState::default();
    emergency.settings.enabled = true;
    emergency.settings.permissions = Permissions {
        style: true,
        ..Default::default()
    };
    emergency.actions.push(EmergencyAction {
        id: Uuid::new_v4(),
        at: Utc::now(),
        command: EmergencyCommand::SetStyle {
            target: "#desktop".to_string(),
            property: "background".to_string(),
            value: "red".to_string(),
        },
        original_state: serde_json::json!({"background": "teal"}),
        reverted: false,
    });
    emergency.messages.push(EmergencyMessage {
        id: Uuid::new_v4(),
        role: MessageRole::User,
        content: "is the door humming again".to_string(),
        at: Utc::now(),
    });
    snapshot.emergency = Some(emergency);

    snapshot
}

#[test]
fn snapshot_survives_close_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agency.db");
    let snapshot = rich_snapshot();

    {
        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();
        db.save(&snapshot).unwrap();
    }

    let db = Database::open(&path).unwrap();
    db.migrate().unwrap();
    let loaded = db.load().unwrap().expect("snapshot should exist");
    assert_eq!(loaded, snapshot);
}

#[test]
fn save_reflects_in_memory_deletions() {
    let db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();

    let mut snapshot = rich_snapshot();
    db.save(&snapshot).unwrap();

    snapshot.agents.clear();
    snapshot.anomalies.clear();
    db.save(&snapshot).unwrap();

    let loaded = db.load().unwrap().unwrap();
    assert!(loaded.agents.is_empty());
    assert!(loaded.anomalies.is_empty());
    assert_eq!(loaded.missions.len(), 1);
}

#[test]
fn emergency_stays_absent_without_a_settings_row() {
    let db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();

    let mut snapshot = rich_snapshot();
    snapshot.emergency = None;
    db.save(&snapshot).unwrap();

    let loaded = db.load().unwrap().unwrap();
    assert!(loaded.emergency.is_none());
}

#[test]
fn latest_save_wins_wholesale() {
    let db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();

    let mut snapshot = rich_snapshot();
    db.save(&snapshot).unwrap();
    snapshot.campaign.name = "Renamed Between Saves".to_string();
    snapshot.missions[0].chaos = 9;
    db.save(&snapshot).unwrap();

    let loaded = db.load().unwrap().unwrap();
    assert_eq!(loaded.campaign.name, "Renamed Between Saves");
    assert_eq!(loaded.missions[0].chaos, 9);
}
