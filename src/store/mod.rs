//! In-memory reactive state containers.
//!
//! [`AgencyStore`] holds all campaign-scoped state; [`TrackStore`] is an
//! independent container for checklist tracks so the notes/tracks pages
//! can subscribe without seeing unrelated campaign churn. Every mutation
//! applies a pure slice function under the state lock, then notifies all
//! subscribers synchronously with a copy of the post-mutation state.

mod agents;
mod anomalies;
mod campaign;
mod emergency;
mod missions;
mod notes;
mod settings;
mod tracks;

pub use tracks::TrackStore;

use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use uuid::Uuid;

use crate::models::{
    AgencySnapshot, AgentInput, AnomalyInput, AppSettings, CampaignPatch, CustomTrack,
    EmergencyCommand, EmergencySettingsPatch, MessageRole, MissionInput, NoteInput,
};

/// Handle returned by `subscribe`; pass back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub(crate) struct SubscriberSet<S> {
    next_id: u64,
    entries: Vec<(u64, Box<dyn Fn(&S) + Send>)>,
}

impl<S> SubscriberSet<S> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, f: Box<dyn Fn(&S) + Send>) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, f));
        SubscriptionId(id)
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) {
        self.entries.retain(|(entry_id, _)| *entry_id != id.0);
    }

    pub(crate) fn notify(&self, state: &S) {
        for (_, f) in &self.entries {
            f(state);
        }
    }
}

/// The full campaign-scoped state, partitioned into slices. Each slice
/// module mutates only its own fields; the one cross-slice effect
/// (mission delete cascading to its log entries) runs as two sequenced
/// slice calls inside a single mutation, so subscribers never observe a
/// half-applied cascade.
#[derive(Debug, Clone)]
pub struct AgencyState {
    pub campaign: crate::models::Campaign,
    pub agents: Vec<crate::models::Agent>,
    pub missions: Vec<crate::models::Mission>,
    pub logs: Vec<crate::models::MissionLogEntry>,
    pub anomalies: Vec<crate::models::Anomaly>,
    pub notes: Vec<crate::models::Note>,
    pub emergency: crate::models::EmergencyState,
    pub settings: AppSettings,
}

impl AgencyState {
    fn first_run() -> Self {
        let snapshot = AgencySnapshot::first_run();
        let mut state = Self {
            campaign: snapshot.campaign.clone(),
            agents: Vec::new(),
            missions: Vec::new(),
            logs: Vec::new(),
            anomalies: Vec::new(),
            notes: Vec::new(),
            emergency: Default::default(),
            settings: AppSettings::default(),
        };
        state.apply_snapshot(&snapshot);
        state
    }

    /// Assembles this store's slices into a snapshot, merging in the
    /// Track Store's current tracks (supplied by the coordinator layer).
    pub fn to_snapshot(&self, tracks: Vec<CustomTrack>) -> AgencySnapshot {
        AgencySnapshot {
            campaign: self.campaign.clone(),
            agents: self.agents.clone(),
            missions: self.missions.clone(),
            anomalies: self.anomalies.clone(),
            logs: self.logs.clone(),
            notes: self.notes.clone(),
            tracks,
            emergency: Some(self.emergency.clone()),
            settings: self.settings.clone(),
        }
    }

    fn apply_snapshot(&mut self, snapshot: &AgencySnapshot) {
        self.campaign = snapshot.campaign.clone();
        self.agents = snapshot.agents.clone();
        self.missions = snapshot.missions.clone();
        self.logs = snapshot.logs.clone();
        self.anomalies = snapshot.anomalies.clone();
        self.notes = snapshot.notes.clone();
        self.emergency = snapshot.emergency.clone().unwrap_or_default();
        self.settings = snapshot.settings.clone();
    }
}

/// The domain store. Constructed explicitly and injected; there is no
/// module-level instance.
pub struct AgencyStore {
    state: Mutex<AgencyState>,
    subscribers: Mutex<SubscriberSet<AgencyState>>,
}

impl Default for AgencyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AgencyStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AgencyState::first_run()),
            subscribers: Mutex::new(SubscriberSet::new()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, AgencyState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, SubscriberSet<AgencyState>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers a subscriber invoked synchronously after every
    /// mutation. Subscribers must not subscribe or unsubscribe from
    /// within a notification.
    pub fn subscribe(&self, f: impl Fn(&AgencyState) + Send + 'static) -> SubscriptionId {
        self.lock_subscribers().add(Box::new(f))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock_subscribers().remove(id);
    }

    /// A copy of the current state.
    pub fn state(&self) -> AgencyState {
        self.lock_state().clone()
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut AgencyState) -> R) -> R {
        let (result, after) = {
            let mut state = self.lock_state();
            let result = f(&mut state);
            (result, state.clone())
        };
        self.lock_subscribers().notify(&after);
        result
    }

    /// Like `mutate`, but rolls the notification back entirely when the
    /// closure fails: a rejected operation leaves the state untouched
    /// and subscribers unaware.
    fn try_mutate<R>(&self, f: impl FnOnce(&mut AgencyState) -> Result<R>) -> Result<R> {
        let (result, after) = {
            let mut state = self.lock_state();
            match f(&mut state) {
                Ok(result) => (result, state.clone()),
                Err(e) => return Err(e),
            }
        };
        self.lock_subscribers().notify(&after);
        Ok(result)
    }

    // campaign slice

    pub fn patch_campaign(&self, patch: CampaignPatch) {
        self.mutate(|state| campaign::patch(&mut state.campaign, patch));
    }

    // agents slice

    pub fn create_agent(&self, input: AgentInput) -> Uuid {
        self.mutate(|state| agents::create(&mut state.agents, input))
    }

    /// Wholesale replace: the stored agent becomes exactly `input`.
    /// Unknown ids are a silent no-op.
    pub fn update_agent(&self, id: Uuid, input: AgentInput) {
        self.mutate(|state| agents::update(&mut state.agents, id, input));
    }

    pub fn delete_agent(&self, id: Uuid) {
        self.mutate(|state| agents::delete(&mut state.agents, id));
    }

    /// Folds every agent's per-mission deltas into the lifetime counts
    /// and zeroes the deltas, all in one state transition.
    pub fn settle_agent_deltas(&self) {
        self.mutate(|state| agents::settle_deltas(&mut state.agents));
    }

    // missions slice (owns both missions and their log entries)

    pub fn create_mission(&self, input: MissionInput) -> Uuid {
        self.mutate(|state| missions::create(&mut state.missions, input))
    }

    pub fn update_mission(&self, id: Uuid, input: MissionInput) {
        self.mutate(|state| missions::update(&mut state.missions, id, input));
    }

    /// Deletes the mission and cascades to its log entries in the same
    /// transition.
    pub fn delete_mission(&self, id: Uuid) {
        self.mutate(|state| {
            missions::delete(&mut state.missions, id);
            missions::purge_logs_for(&mut state.logs, id);
        });
    }

    pub fn adjust_chaos(&self, id: Uuid, delta: i64, note: &str) {
        self.mutate(|state| {
            missions::adjust_chaos(&mut state.missions, &mut state.logs, id, delta, note)
        });
    }

    pub fn adjust_loose_ends(&self, id: Uuid, delta: i64, note: &str) {
        self.mutate(|state| {
            missions::adjust_loose_ends(&mut state.missions, &mut state.logs, id, delta, note)
        });
    }

    pub fn adjust_reality_requests_failed(&self, id: Uuid, delta: i64, note: &str) {
        self.mutate(|state| {
            missions::adjust_reality_requests_failed(
                &mut state.missions,
                &mut state.logs,
                id,
                delta,
                note,
            )
        });
    }

    /// Appends a plain log entry with no counter change.
    pub fn log_mission_event(&self, id: Uuid, detail: &str) {
        self.mutate(|state| {
            missions::log_event(&mut state.missions, &mut state.logs, id, detail)
        });
    }

    // anomalies slice

    pub fn create_anomaly(&self, input: AnomalyInput) -> Uuid {
        self.mutate(|state| anomalies::create(&mut state.anomalies, input))
    }

    pub fn update_anomaly(&self, id: Uuid, input: AnomalyInput) {
        self.mutate(|state| anomalies::update(&mut state.anomalies, id, input));
    }

    pub fn delete_anomaly(&self, id: Uuid) {
        self.mutate(|state| anomalies::delete(&mut state.anomalies, id));
    }

    // notes slice

    pub fn create_note(&self, input: NoteInput) -> Uuid {
        self.mutate(|state| notes::create(&mut state.notes, input))
    }

    pub fn update_note(&self, id: Uuid, input: NoteInput) {
        self.mutate(|state| notes::update(&mut state.notes, id, input));
    }

    pub fn delete_note(&self, id: Uuid) {
        self.mutate(|state| notes::delete(&mut state.notes, id));
    }

    // emergency slice

    pub fn update_emergency_settings(&self, patch: EmergencySettingsPatch) {
        self.mutate(|state| emergency::patch_settings(&mut state.emergency, patch));
    }

    pub fn add_emergency_message(&self, role: MessageRole, content: &str) -> Uuid {
        self.mutate(|state| emergency::add_message(&mut state.emergency, role, content))
    }

    /// Interprets one emergency command. The permission gate for the
    /// command's category is enforced here, not by the caller; a denied
    /// command changes nothing and notifies no one.
    pub fn apply_emergency_command(
        &self,
        command: EmergencyCommand,
        original_state: serde_json::Value,
    ) -> Result<Uuid> {
        self.try_mutate(|state| {
            emergency::apply_command(&mut state.emergency, command, original_state)
        })
    }

    pub fn mark_emergency_action_reverted(&self, id: Uuid) {
        self.mutate(|state| emergency::mark_reverted(&mut state.emergency, id));
    }

    // settings slice

    pub fn set_notes_allow_html(&self, allow: bool) {
        self.mutate(|state| settings::set_notes_allow_html(&mut state.settings, allow));
    }

    /// Replaces every slice wholesale from a validated snapshot. Only
    /// the coordinator's hydration path (startup and import) calls
    /// this; ordinary mutations never cross slices this way.
    pub fn hydrate(&self, snapshot: &AgencySnapshot) {
        self.mutate(|state| state.apply_snapshot(snapshot));
    }
}
