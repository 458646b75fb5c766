//! Continuous mode: open-ended recognition with orchestrator-driven resume.

use super::{ErrorDisposition, InputMode, ModeError};
use crate::settings::InputModeKind;
use crate::stt::{RecognitionError, SttHandler};
use async_trait::async_trait;
use std::sync::Arc;

/// Open-ended listening. The mode itself never restarts anything: when the
/// assistant finishes responding, the orchestrator's busy-state watcher
/// re-evaluates auto-start and calls `start()` again if eligible.
pub struct ContinuousMode {
    handler: Option<Arc<dyn SttHandler>>,
    active: bool,
}

impl ContinuousMode {
    pub fn new(handler: Option<Arc<dyn SttHandler>>) -> Self {
        Self {
            handler,
            active: false,
        }
    }
}

#[async_trait]
impl InputMode for ContinuousMode {
    fn kind(&self) -> InputModeKind {
        InputModeKind::Continuous
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn status_text(&self) -> String {
        if self.active {
            "Listening...".to_string()
        } else {
            "Continuous listening paused".to_string()
        }
    }

    fn placeholder_text(&self) -> String {
        if self.active {
            "Speak anytime".to_string()
        } else {
            "Waiting to resume listening".to_string()
        }
    }

    async fn start(&mut self) -> Result<(), ModeError> {
        if self.active {
            return Err(ModeError::AlreadyActive);
        }
        let handler = self.handler.as_ref().ok_or(ModeError::NoHandler)?;

        handler.start(false).await?;
        self.active = true;
        log::debug!("Continuous: listening started");
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
        log::debug!("Continuous: listening stopped");
        Ok(())
    }

    async fn handle_transcription(&mut self, text: &str) {
        // The turn is delivered; the assistant will go busy and the
        // orchestrator resumes listening after the busy-state debounce.
        log::debug!("Continuous: transcript received ({} chars)", text.len());
        self.active = false;
    }

    async fn handle_error(&mut self, error: &RecognitionError) -> ErrorDisposition {
        log::warn!("Continuous: recognition error: {}", error);
        self.active = false;

        match error {
            // Quiet stretches are expected in continuous listening; the
            // auto-start watcher will re-arm without bothering the user.
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
                    log::warn!("Continuous: cleanup stop failed: {}", e);
                }
            }
            self.active = false;
        }
        self.handler = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::ModeContext;
    use crate::stt::HandlerError;

    struct NoopHandler;

    #[async_trait]
    impl SttHandler for NoopHandler {
        async fn start(&self, _for_command: bool) -> Result<(), HandlerError> {
            Ok(())
        }
        async fn stop(&self, _abort: bool) -> Result<(), HandlerError> {
            Ok(())
        }
        async fn stop_all(&self, _abort: bool) -> Result<(), HandlerError> {
            Ok(())
        }
        async fn reinitialize(&self) -> Result<(), HandlerError> {
            Ok(())
        }
        fn is_processing_audio(&self) -> bool {
            false
        }
        fn is_listening_for_wake_word(&self) -> bool {
            false
        }
        fn engine_key(&self) -> &str {
            "noop"
        }
    }

    #[tokio::test]
    async fn test_prefers_auto_start() {
        let mode = ContinuousMode::new(None);
        assert!(mode.prefers_auto_start());
    }

    #[tokio::test]
    async fn test_busy_blocks_can_start() {
        let mode = ContinuousMode::new(Some(Arc::new(NoopHandler)));
        let ctx = ModeContext {
            permission_granted: true,
            reinitializing: false,
            handler_present: true,
            assistant_busy: true,
            awaiting_command: false,
        };
        assert!(!mode.can_start(&ctx));
    }

    #[tokio::test]
    async fn test_transcription_pauses_until_restart() {
        let mut mode = ContinuousMode::new(Some(Arc::new(NoopHandler)));
        mode.start().await.expect("start");
        mode.handle_transcription("turn text").await;
        assert!(!mode.is_active());

        // The orchestrator restarts; the mode accepts a fresh start.
        mode.start().await.expect("restart");
        assert!(mode.is_active());
    }

    #[tokio::test]
    async fn test_no_speech_is_handled_locally() {
        let mut mode = ContinuousMode::new(Some(Arc::new(NoopHandler)));
        mode.start().await.expect("start");
        let disposition = mode.handle_error(&RecognitionError::NoSpeech).await;
        assert_eq!(disposition, ErrorDisposition::HandledLocally);
    }

    #[tokio::test]
    async fn test_service_error_surfaces() {
        let mut mode = ContinuousMode::new(Some(Arc::new(NoopHandler)));
        mode.start().await.expect("start");
        let disposition = mode
            .handle_error(&RecognitionError::Service("engine crashed".to_string()))
            .await;
        assert_eq!(disposition, ErrorDisposition::SurfaceToUser);
    }
}
