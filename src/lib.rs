//! Speech-to-text input orchestration for voice assistants.
//!
//! The crate coordinates microphone access, swappable STT backends, and
//! three listening strategies (push-to-talk, continuous, voice-activated)
//! behind a single [`SttOrchestrator`] handle. The host application wires
//! orchestrator events into its UI, pushes settings and assistant-busy
//! changes in, and registers one [`SttHandler`] per speech engine.

mod microphone;
mod modes;
mod notify;
mod orchestrator;
mod settings;
mod stt;

#[cfg(test)]
mod tests;

pub use microphone::{
    default_input_device_name, list_input_devices, ActivitySnapshot, MicrophoneControl,
    MicrophoneError, MicrophoneManager, PermissionState, SharedActivityMeter,
};
pub use modes::{
    ContinuousMode, ErrorDisposition, InputMode, ModeContext, ModeError, PushToTalkMode,
    VadPhase, VoiceActivatedMode,
};
pub use notify::{LogNotifier, Notifier};
pub use orchestrator::{
    OrchestratorError, OrchestratorEvent, SttOrchestrator, BUSY_DEBOUNCE, REINIT_MIN_INTERVAL,
    REINIT_SETTLE_DELAY, VAD_COMMAND_TIMEOUT,
};
pub use settings::{InputModeKind, InputSettings, DEFAULT_ENGINE, DEFAULT_WAKE_WORDS};
pub use stt::{HandlerError, HandlerRegistry, RecognitionError, SttEvent, SttHandler};
