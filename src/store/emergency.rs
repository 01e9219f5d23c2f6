use anyhow::{bail, Result};
use chrono::Utc;
use uuid::Uuid;

use crate::models::{
    EmergencyAction, EmergencyCommand, EmergencyMessage, EmergencySettingsPatch, EmergencyState,
    MessageRole,
};

/// Retention caps for the append-only histories.
pub const MESSAGE_CAP: usize = 200;
pub const ACTION_CAP: usize = 500;

pub(super) fn patch_settings(state: &mut EmergencyState, patch: EmergencySettingsPatch) {
    if let Some(enabled) = patch.enabled {
        state.settings.enabled = enabled;
    }
    if let Some(chat_open) = patch.chat_open {
        state.settings.chat_open = chat_open;
    }
    if let Some(poll_interval_secs) = patch.poll_interval_secs {
        state.settings.poll_interval_secs = poll_interval_secs;
    }
    if let Some(permissions) = patch.permissions {
        state.settings.permissions = permissions;
    }
    if let Some(llm) = patch.llm {
        state.settings.llm = llm;
    }
}

pub(super) fn add_message(state: &mut EmergencyState, role: MessageRole, content: &str) -> Uuid {
    let id = Uuid::new_v4();
    state.messages.push(EmergencyMessage {
        id,
        role,
        content: content.to_string(),
        at: Utc::now(),
    });
    if state.messages.len() > MESSAGE_CAP {
        let excess = state.messages.len() - MESSAGE_CAP;
        state.messages.drain(..excess);
    }
    id
}

/// The sandboxed interpreter step: refuses any command whose permission
/// category is disabled, then records the action with its revert state.
pub(super) fn apply_command(
    state: &mut EmergencyState,
    command: EmergencyCommand,
    original_state: serde_json::Value,
) -> Result<Uuid> {
    if !state.settings.enabled {
        bail!("emergency feature is disabled");
    }
    if !command.permitted(&state.settings.permissions) {
        bail!(
            "emergency command denied: '{}' permission is not granted",
            command.category()
        );
    }
    let id = Uuid::new_v4();
    state.actions.push(EmergencyAction {
        id,
        at: Utc::now(),
        command,
        original_state,
        reverted: false,
    });
    if state.actions.len() > ACTION_CAP {
        let excess = state.actions.len() - ACTION_CAP;
        state.actions.drain(..excess);
    }
    Ok(id)
}

pub(super) fn mark_reverted(state: &mut EmergencyState, id: Uuid) {
    if let Some(action) = state.actions.iter_mut().find(|a| a.id == id) {
        action.reverted = true;
    }
}
