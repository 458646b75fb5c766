//! Push-to-talk mode: one recognition turn per explicit start.

use super::{ErrorDisposition, InputMode, ModeError};
use crate::settings::InputModeKind;
use crate::stt::{RecognitionError, SttHandler};
use async_trait::async_trait;
use std::sync::Arc;

/// Listening is active only between an explicit `start()` and either a
/// `stop()`, a transcription, or an error. Never auto-restarts.
pub struct PushToTalkMode {
    handler: Option<Arc<dyn SttHandler>>,
    active: bool,
}

impl PushToTalkMode {
    pub fn new(handler: Option<Arc<dyn SttHandler>>) -> Self {
        Self {
            handler,
            active: false,
        }
    }
}

#[async_trait]
impl InputMode for PushToTalkMode {
    fn kind(&self) -> InputModeKind {
        InputModeKind::PushToTalk
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn status_text(&self) -> String {
        if self.active {
            "Listening...".to_string()
        } else {
            "Hold to talk".to_string()
        }
    }

    fn placeholder_text(&self) -> String {
        if self.active {
            "Speak now".to_string()
        } else {
            "Press the microphone button and speak".to_string()
        }
    }

    async fn start(&mut self) -> Result<(), ModeError> {
        if self.active {
            return Err(ModeError::AlreadyActive);
        }
        let handler = self.handler.as_ref().ok_or(ModeError::NoHandler)?;

        handler.start(false).await?;
        self.active = true;
        log::debug!("PushToTalk: recognition turn started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), ModeError> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        if let Some(handler) = &self.handler {
            handler.stop(false).await?;
        }
        log::debug!("PushToTalk: recognition turn stopped");
        Ok(())
    }

    async fn handle_transcription(&mut self, text: &str) {
        // Terminal per press: the turn is over once a transcript lands.
        log::debug!("PushToTalk: transcript received ({} chars)", text.len());
        self.active = false;
    }

    async fn handle_error(&mut self, error: &RecognitionError) -> ErrorDisposition {
        log::warn!("PushToTalk: recognition error: {}", error);
        self.active = false;

        match error {
            // A silent press is not worth a toast.
            RecognitionError::NoSpeech | RecognitionError::Aborted => {
                ErrorDisposition::HandledLocally
            }
            _ => ErrorDisposition::SurfaceToUser,
        }
    }

    async fn cleanup(&mut self) {
        if self.active {
            if let Some(handler) = &self.handler {
                if let Err(e) = handler.stop(true).await {
                    log::warn!("PushToTalk: cleanup stop failed: {}", e);
                }
            }
            self.active = false;
        }
        self.handler = None;
    }
}
