use chrono::Utc;
use uuid::Uuid;

use crate::models::{LogKind, Mission, MissionInput, MissionLogEntry};

/// Retention cap for the append-only mission log. Oldest entries are
/// evicted first once the cap is reached, keeping the clear-and-rewrite
/// persistence cost bounded for long campaigns.
pub const MISSION_LOG_CAP: usize = 1000;

fn from_input(id: Uuid, input: MissionInput) -> Mission {
    Mission {
        id,
        code: input.code,
        name: input.name,
        kind: input.kind,
        status: input.status,
        chaos: input.chaos.max(0),
        loose_ends: input.loose_ends.max(0),
        reality_requests_failed: input.reality_requests_failed.max(0),
        scheduled_for: input.scheduled_for,
        hints: input.hints,
        goals: input.goals,
        expected_roster: input.expected_roster,
    }
}

pub(super) fn create(missions: &mut Vec<Mission>, input: MissionInput) -> Uuid {
    let id = Uuid::new_v4();
    missions.push(from_input(id, input));
    id
}

pub(super) fn update(missions: &mut [Mission], id: Uuid, input: MissionInput) {
    if let Some(mission) = missions.iter_mut().find(|m| m.id == id) {
        *mission = from_input(id, input);
    }
}

pub(super) fn delete(missions: &mut Vec<Mission>, id: Uuid) {
    missions.retain(|m| m.id != id);
}

/// Cascade half of mission deletion; runs in the same mutation as
/// `delete` so subscribers see both or neither.
pub(super) fn purge_logs_for(logs: &mut Vec<MissionLogEntry>, mission_id: Uuid) {
    logs.retain(|entry| entry.mission_id != mission_id);
}

fn append_log(
    logs: &mut Vec<MissionLogEntry>,
    mission_id: Uuid,
    kind: LogKind,
    detail: &str,
    delta: Option<i64>,
) {
    logs.push(MissionLogEntry {
        id: Uuid::new_v4(),
        mission_id,
        at: Utc::now(),
        kind,
        detail: detail.to_string(),
        delta,
    });
    if logs.len() > MISSION_LOG_CAP {
        let excess = logs.len() - MISSION_LOG_CAP;
        logs.drain(..excess);
    }
}

fn adjust_counter(
    missions: &mut [Mission],
    logs: &mut Vec<MissionLogEntry>,
    id: Uuid,
    kind: LogKind,
    delta: i64,
    note: &str,
    field: impl Fn(&mut Mission) -> &mut i64,
) {
    let Some(mission) = missions.iter_mut().find(|m| m.id == id) else {
        return;
    };
    let counter = field(mission);
    *counter = (*counter + delta).max(0);
    append_log(logs, id, kind, note, Some(delta));
}

pub(super) fn adjust_chaos(
    missions: &mut [Mission],
    logs: &mut Vec<MissionLogEntry>,
    id: Uuid,
    delta: i64,
    note: &str,
) {
    adjust_counter(missions, logs, id, LogKind::Chaos, delta, note, |m| {
        &mut m.chaos
    });
}

pub(super) fn adjust_loose_ends(
    missions: &mut [Mission],
    logs: &mut Vec<MissionLogEntry>,
    id: Uuid,
    delta: i64,
    note: &str,
) {
    adjust_counter(missions, logs, id, LogKind::LooseEnd, delta, note, |m| {
        &mut m.loose_ends
    });
}

pub(super) fn adjust_reality_requests_failed(
    missions: &mut [Mission],
    logs: &mut Vec<MissionLogEntry>,
    id: Uuid,
    delta: i64,
    note: &str,
) {
    adjust_counter(
        missions,
        logs,
        id,
        LogKind::RealityFailure,
        delta,
        note,
        |m| &mut m.reality_requests_failed,
    );
}

pub(super) fn log_event(
    missions: &mut [Mission],
    logs: &mut Vec<MissionLogEntry>,
    id: Uuid,
    detail: &str,
) {
    if missions.iter().any(|m| m.id == id) {
        append_log(logs, id, LogKind::Log, detail, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MissionKind, MissionStatus};

    fn input(code: &str) -> MissionInput {
        MissionInput {
            code: code.to_string(),
            name: code.to_string(),
            kind: MissionKind::Containment,
            status: MissionStatus::Active,
            chaos: 0,
            loose_ends: 0,
            reality_requests_failed: 0,
            scheduled_for: None,
            hints: None,
            goals: None,
            expected_roster: None,
        }
    }

    #[test]
    fn chaos_never_goes_negative() {
        let mut missions = Vec::new();
        let mut logs = Vec::new();
        let id = create(&mut missions, input("OP-A"));

        adjust_chaos(&mut missions, &mut logs, id, 3, "ritual went loud");
        adjust_chaos(&mut missions, &mut logs, id, -10, "cover story held");
        adjust_chaos(&mut missions, &mut logs, id, -1, "overcorrection");

        assert_eq!(missions[0].chaos, 0);
    }

    #[test]
    fn loose_ends_clamp_matches_chaos() {
        let mut missions = Vec::new();
        let mut logs = Vec::new();
        let id = create(&mut missions, input("OP-A"));

        adjust_loose_ends(&mut missions, &mut logs, id, -5, "tidy from the start");

        assert_eq!(missions[0].loose_ends, 0);
    }

    #[test]
    fn every_adjustment_appends_exactly_one_matching_log_entry() {
        let mut missions = Vec::new();
        let mut logs = Vec::new();
        let id = create(&mut missions, input("OP-A"));

        adjust_chaos(&mut missions, &mut logs, id, 2, "sirens");
        adjust_loose_ends(&mut missions, &mut logs, id, 1, "witness");
        adjust_reality_requests_failed(&mut missions, &mut logs, id, 1, "denied");

        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].kind, LogKind::Chaos);
        assert_eq!(logs[0].delta, Some(2));
        assert_eq!(logs[0].detail, "sirens");
        assert_eq!(logs[1].kind, LogKind::LooseEnd);
        assert_eq!(logs[1].delta, Some(1));
        assert_eq!(logs[2].kind, LogKind::RealityFailure);
    }

    #[test]
    fn adjusting_an_unknown_mission_logs_nothing() {
        let mut missions = Vec::new();
        let mut logs = Vec::new();
        create(&mut missions, input("OP-A"));

        adjust_chaos(&mut missions, &mut logs, Uuid::new_v4(), 2, "phantom");

        assert!(logs.is_empty());
    }

    #[test]
    fn deleting_a_mission_purges_only_its_logs() {
        let mut missions = Vec::new();
        let mut logs = Vec::new();
        let a = create(&mut missions, input("OP-A"));
        let b = create(&mut missions, input("OP-B"));
        adjust_chaos(&mut missions, &mut logs, a, 1, "a");
        adjust_chaos(&mut missions, &mut logs, b, 1, "b");
        adjust_loose_ends(&mut missions, &mut logs, a, 1, "a again");

        delete(&mut missions, a);
        purge_logs_for(&mut logs, a);

        assert_eq!(missions.len(), 1);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].mission_id, b);
    }

    #[test]
    fn log_cap_evicts_oldest_first() {
        let mut missions = Vec::new();
        let mut logs = Vec::new();
        let id = create(&mut missions, input("OP-A"));

        for i in 0..(MISSION_LOG_CAP + 5) {
            log_event(&mut missions, &mut logs, id, &format!("entry {i}"));
        }

        assert_eq!(logs.len(), MISSION_LOG_CAP);
        assert_eq!(logs[0].detail, "entry 5");
    }
}
