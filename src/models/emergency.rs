use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State for the optional "emergency AI" subsystem: a settings
/// singleton plus two append-only histories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmergencyState {
    pub settings: EmergencySettings,
    #[serde(default)]
    pub actions: Vec<EmergencyAction>,
    #[serde(default)]
    pub messages: Vec<EmergencyMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencySettings {
    pub enabled: bool,
    pub chat_open: bool,
    pub poll_interval_secs: u64,
    pub permissions: Permissions,
    pub llm: LlmConfig,
}

impl Default for EmergencySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            chat_open: false,
            poll_interval_secs: 30,
            permissions: Permissions::default(),
            llm: LlmConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmergencySettingsPatch {
    pub enabled: Option<bool>,
    pub chat_open: Option<bool>,
    pub poll_interval_secs: Option<u64>,
    pub permissions: Option<Permissions>,
    pub llm: Option<LlmConfig>,
}

/// Capability gates for externally-triggered mutations. All denied by
/// default; the command interpreter enforces these itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub style: bool,
    pub text: bool,
    pub elements: bool,
    pub animation: bool,
    pub data: bool,
    pub navigation: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// One interpreted mutation command, recorded with enough original
/// state to be reverted later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyAction {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    pub command: EmergencyCommand,
    pub original_state: serde_json::Value,
    #[serde(default)]
    pub reverted: bool,
}

/// The closed instruction set the emergency interpreter understands.
/// Free-form model output must be mapped into one of these before it
/// reaches the store; anything else is rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmergencyCommand {
    SetStyle {
        target: String,
        property: String,
        value: String,
    },
    UpdateText {
        target: String,
        text: String,
    },
    AddElement {
        parent: String,
        markup: String,
    },
    RemoveElement {
        target: String,
    },
    Animate {
        target: String,
        animation: String,
    },
    UpdateData {
        key: String,
        value: serde_json::Value,
    },
    Navigate {
        route: String,
    },
}

impl EmergencyCommand {
    /// The permission category this command falls under.
    pub fn category(&self) -> &'static str {
        match self {
            Self::SetStyle { .. } => "style",
            Self::UpdateText { .. } => "text",
            Self::AddElement { .. } | Self::RemoveElement { .. } => "elements",
            Self::Animate { .. } => "animation",
            Self::UpdateData { .. } => "data",
            Self::Navigate { .. } => "navigation",
        }
    }

    pub fn permitted(&self, permissions: &Permissions) -> bool {
        match self {
            Self::SetStyle { .. } => permissions.style,
            Self::UpdateText { .. } => permissions.text,
            Self::AddElement { .. } | Self::RemoveElement { .. } => permissions.elements,
            Self::Animate { .. } => permissions.animation,
            Self::UpdateData { .. } => permissions.data,
            Self::Navigate { .. } => permissions.navigation,
        }
    }
}
