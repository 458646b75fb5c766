use serde::{Deserialize, Serialize};

// ============================================================================
// DEFAULT INPUT SETTINGS - Single source of truth for orchestrator defaults
// ============================================================================

/// Default input mode
pub const DEFAULT_INPUT_MODE: InputModeKind = InputModeKind::PushToTalk;

/// Default STT engine key
pub const DEFAULT_ENGINE: &str = "local";

/// Default wake words for voice-activated mode
pub const DEFAULT_WAKE_WORDS: &[&str] = &["hey assistant"];

// ============================================================================

/// The three mutually-exclusive listening modes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum InputModeKind {
    /// Listening only while explicitly started; one recognition turn per press
    PushToTalk,
    /// Open-ended recognition that resumes after the assistant responds
    Continuous,
    /// Wake-word listening with a bounded command-capture phase
    VoiceActivated,
}

impl InputModeKind {
    /// Whether the orchestrator should restart this mode automatically
    /// (after the assistant finishes responding, after reinitialization, etc.)
    pub fn prefers_auto_start(&self) -> bool {
        matches!(
            self,
            InputModeKind::Continuous | InputModeKind::VoiceActivated
        )
    }
}

/// Snapshot of the user's STT input preferences.
///
/// The settings provider owns persistence; the orchestrator only consumes
/// snapshots of this struct and reconciles against its current state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputSettings {
    /// Which listening mode is active
    pub input_mode: InputModeKind,
    /// Preferred STT engine key (e.g., "local", "remote")
    pub engine: String,
    /// Backend input device name (CPAL device name). None means system default.
    #[serde(default)]
    pub input_device_name: Option<String>,
    /// Wake words for voice-activated mode
    #[serde(default = "default_wake_words")]
    pub wake_words: Vec<String>,
}

fn default_wake_words() -> Vec<String> {
    DEFAULT_WAKE_WORDS.iter().map(|s| s.to_string()).collect()
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            input_mode: DEFAULT_INPUT_MODE,
            engine: DEFAULT_ENGINE.to_string(),
            input_device_name: None,
            wake_words: default_wake_words(),
        }
    }
}
