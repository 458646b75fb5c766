//! Voice-activated mode: wake-word listening with a bounded command phase.

use super::{ErrorDisposition, InputMode, ModeContext, ModeError};
use crate::settings::InputModeKind;
use crate::stt::{RecognitionError, SttHandler};
use async_trait::async_trait;
use std::sync::Arc;

/// Phase of the voice-activated state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadPhase {
    /// Not listening at all
    Inactive,
    /// Passively listening for a wake word
    WakeWordListening,
    /// Wake word heard; capturing the follow-up command
    AwaitingCommand,
}

/// Two-phase listening. `start()` enters wake-word listening; a detected wake
/// word arms the command phase. The command timeout itself is owned by the
/// orchestrator, which feeds its expiry back in as a
/// [`RecognitionError::VadCommandTimeout`].
pub struct VoiceActivatedMode {
    handler: Option<Arc<dyn SttHandler>>,
    wake_words: Vec<String>,
    phase: VadPhase,
}

impl VoiceActivatedMode {
    pub fn new(handler: Option<Arc<dyn SttHandler>>, wake_words: Vec<String>) -> Self {
        Self {
            handler,
            wake_words,
            phase: VadPhase::Inactive,
        }
    }

    /// Current phase (inspectable for tests and UI)
    pub fn phase(&self) -> VadPhase {
        self.phase
    }

    fn first_wake_word(&self) -> &str {
        self.wake_words
            .first()
            .map(String::as_str)
            .unwrap_or("the wake word")
    }

    /// Fall back from the command phase to wake-word listening
    async fn rearm_wake_listening(&mut self) {
        let Some(handler) = self.handler.clone() else {
            self.phase = VadPhase::Inactive;
            return;
        };

        match handler.start(false).await {
            Ok(()) => {
                self.phase = VadPhase::WakeWordListening;
                log::debug!("VoiceActivated: back to wake-word listening");
            }
            Err(e) => {
                log::warn!("VoiceActivated: failed to re-arm wake listening: {}", e);
                self.phase = VadPhase::Inactive;
            }
        }
    }
}

#[async_trait]
impl InputMode for VoiceActivatedMode {
    fn kind(&self) -> InputModeKind {
        InputModeKind::VoiceActivated
    }

    fn is_active(&self) -> bool {
        self.phase != VadPhase::Inactive
    }

    // Wake-word listening is deliberately not suspended while the assistant is
    // busy: the user must be able to interrupt a response. Command capture is
    // still gated by the orchestrator's busy check.
    fn can_start(&self, ctx: &ModeContext) -> bool {
        ctx.permission_granted && !ctx.reinitializing && ctx.handler_present && !self.is_active()
    }

    fn status_text(&self) -> String {
        match self.phase {
            VadPhase::Inactive => "Voice activation off".to_string(),
            VadPhase::WakeWordListening => {
                format!("Waiting for \"{}\"", self.first_wake_word())
            }
            VadPhase::AwaitingCommand => "Listening for your command...".to_string(),
        }
    }

    fn placeholder_text(&self) -> String {
        match self.phase {
            VadPhase::Inactive => "Voice activation is off".to_string(),
            VadPhase::WakeWordListening => {
                format!("Say \"{}\" to begin", self.first_wake_word())
            }
            VadPhase::AwaitingCommand => "Speak your command".to_string(),
        }
    }

    async fn start(&mut self) -> Result<(), ModeError> {
        if self.is_active() {
            return Err(ModeError::AlreadyActive);
        }
        let handler = self.handler.as_ref().ok_or(ModeError::NoHandler)?;

        handler.start(false).await?;
        self.phase = VadPhase::WakeWordListening;
        log::debug!("VoiceActivated: wake-word listening started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), ModeError> {
        if !self.is_active() {
            return Ok(());
        }
        self.phase = VadPhase::Inactive;

        if let Some(handler) = &self.handler {
            // Both the wake-word session and any command capture must end.
            handler.stop_all(true).await?;
        }
        log::debug!("VoiceActivated: stopped");
        Ok(())
    }

    async fn handle_transcription(&mut self, text: &str) {
        log::debug!("VoiceActivated: command transcript ({} chars)", text.len());
        if self.phase == VadPhase::AwaitingCommand {
            self.rearm_wake_listening().await;
        }
    }

    async fn handle_error(&mut self, error: &RecognitionError) -> ErrorDisposition {
        match self.phase {
            VadPhase::AwaitingCommand => {
                log::debug!("VoiceActivated: command phase error: {}", error);
                self.rearm_wake_listening().await;
                match error {
                    RecognitionError::VadCommandTimeout
                    | RecognitionError::NoSpeech
                    | RecognitionError::Aborted => ErrorDisposition::HandledLocally,
                    _ => ErrorDisposition::SurfaceToUser,
                }
            }
            VadPhase::WakeWordListening => {
                log::warn!("VoiceActivated: wake-word listening error: {}", error);
                self.phase = VadPhase::Inactive;
                ErrorDisposition::SurfaceToUser
            }
            VadPhase::Inactive => ErrorDisposition::HandledLocally,
        }
    }

    async fn handle_wake_word(&mut self) -> Result<bool, ModeError> {
        if self.phase != VadPhase::WakeWordListening {
            log::debug!("VoiceActivated: wake word ignored in phase {:?}", self.phase);
            return Ok(false);
        }
        let handler = self.handler.as_ref().ok_or(ModeError::NoHandler)?;

        handler.start(true).await?;
        self.phase = VadPhase::AwaitingCommand;
        log::info!("VoiceActivated: wake word detected, awaiting command");
        Ok(true)
    }

    async fn cleanup(&mut self) {
        if self.is_active() {
            if let Some(handler) = &self.handler {
                if let Err(e) = handler.stop_all(true).await {
                    log::warn!("VoiceActivated: cleanup stop failed: {}", e);
                }
            }
            self.phase = VadPhase::Inactive;
        }
        self.handler = None;
    }
}
