//! Input mode state machines.
//!
//! The three listening strategies (push-to-talk, continuous, voice-activated)
//! share one lifecycle contract over the active STT handler. Exactly one mode
//! instance is live at a time; the orchestrator stops and cleans up the old
//! instance before constructing the next one.

mod continuous;
mod push_to_talk;
mod voice_activated;

pub use continuous::ContinuousMode;
pub use push_to_talk::PushToTalkMode;
pub use voice_activated::{VadPhase, VoiceActivatedMode};

use crate::settings::InputModeKind;
use crate::stt::{HandlerError, RecognitionError};
use async_trait::async_trait;

/// Errors that can occur inside a mode state machine
#[derive(Debug, thiserror::Error)]
pub enum ModeError {
    #[error("No STT handler available")]
    NoHandler,

    #[error("Mode is already listening")]
    AlreadyActive,

    #[error(transparent)]
    Handler(#[from] HandlerError),
}

/// External signals a mode consults when deciding whether it may start.
///
/// Built fresh by the orchestrator for every check; modes never cache it.
#[derive(Debug, Clone, Copy)]
pub struct ModeContext {
    pub permission_granted: bool,
    pub reinitializing: bool,
    pub handler_present: bool,
    pub assistant_busy: bool,
    /// A wake word was heard and a command is being awaited
    pub awaiting_command: bool,
}

/// What a mode did with a forwarded recognition error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDisposition {
    /// The mode recovered on its own (e.g., re-armed a phase)
    HandledLocally,
    /// No local recovery; the orchestrator should notify the user
    SurfaceToUser,
}

/// Common lifecycle contract for the three listening strategies.
///
/// Transitions happen only through `start()`/`stop()`; transcription, error,
/// and wake-word events may re-arm internal phases but never resurrect a
/// stopped mode.
#[async_trait]
pub trait InputMode: Send {
    /// Which strategy this instance implements
    fn kind(&self) -> InputModeKind;

    /// Whether a listening session is currently active
    fn is_active(&self) -> bool;

    /// Whether `start()` is currently allowed given the external signals.
    ///
    /// Voice-activated mode overrides this to stay startable while the
    /// assistant is busy (wake-word listening permits interruption).
    fn can_start(&self, ctx: &ModeContext) -> bool {
        ctx.permission_granted
            && !ctx.reinitializing
            && ctx.handler_present
            && !ctx.assistant_busy
            && !self.is_active()
    }

    /// Whether the orchestrator should restart this mode automatically
    fn prefers_auto_start(&self) -> bool {
        self.kind().prefers_auto_start()
    }

    /// Human-readable state description for the UI
    fn status_text(&self) -> String;

    /// Human-readable input placeholder for the UI
    fn placeholder_text(&self) -> String;

    /// Begin listening
    async fn start(&mut self) -> Result<(), ModeError>;

    /// Stop listening. Idempotent; safe to call in any state.
    async fn stop(&mut self) -> Result<(), ModeError>;

    /// A final transcription arrived for the current turn
    async fn handle_transcription(&mut self, text: &str);

    /// A recognition error arrived; the mode may recover locally
    async fn handle_error(&mut self, error: &RecognitionError) -> ErrorDisposition;

    /// A wake word was detected.
    ///
    /// Returns true when the mode entered its command-capture phase and the
    /// orchestrator should arm the command timeout. The default ignores the
    /// event; only voice-activated mode reacts.
    async fn handle_wake_word(&mut self) -> Result<bool, ModeError> {
        Ok(false)
    }

    /// Release everything the mode holds. Called exactly once, after `stop()`,
    /// before the instance is dropped. Idempotent.
    async fn cleanup(&mut self);
}
