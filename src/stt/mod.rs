//! Speech-to-Text (STT) handler abstraction and registry.
//!
//! This module provides a trait-based abstraction for STT backends,
//! allowing easy switching between different speech recognition engines.
//! Backends are registered externally (e.g., "local", "remote") and the
//! orchestrator keeps exactly one of them active at a time.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Errors that can occur during handler control operations
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Failed to start recognition: {0}")]
    StartFailed(String),

    #[error("Failed to stop recognition: {0}")]
    StopFailed(String),

    #[error("Failed to reinitialize engine: {0}")]
    ReinitializeFailed(String),
}

/// Recognition-level errors reported through the event stream.
///
/// These are offered to the current input mode for local handling first;
/// only unhandled errors are surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognitionError {
    /// No command arrived within the wake-word command window. Non-fatal;
    /// voice-activated mode returns to wake-word listening.
    #[error("No command heard after the wake word")]
    VadCommandTimeout,

    #[error("No speech detected")]
    NoSpeech,

    #[error("Audio capture failed: {0}")]
    AudioCapture(String),

    #[error("Recognition service error: {0}")]
    Service(String),

    #[error("Recognition aborted")]
    Aborted,
}

/// Events emitted by an STT handler back to the orchestrator
#[derive(Debug, Clone)]
pub enum SttEvent {
    /// A final transcription for the current recognition turn
    Transcription(String),
    /// The handler started/stopped processing captured audio
    Processing(bool),
    /// A configured wake word was heard
    WakeWordDetected,
    /// A recognition error occurred
    Error(RecognitionError),
}

/// Capability contract for a registered STT backend.
///
/// Handlers own their recognition sessions; the orchestrator only drives
/// start/stop/reinitialize and reads the activity flags when deciding
/// whether another listening session may begin.
#[async_trait]
pub trait SttHandler: Send + Sync {
    /// Begin a recognition session.
    ///
    /// # Arguments
    /// * `for_command` - true when capturing a voice-activated command
    ///   (as opposed to wake-word listening or a plain dictation turn)
    async fn start(&self, for_command: bool) -> Result<(), HandlerError>;

    /// End the current recognition session.
    ///
    /// # Arguments
    /// * `abort` - discard any in-flight audio instead of finalizing it
    async fn stop(&self, abort: bool) -> Result<(), HandlerError>;

    /// End every session this handler owns (wake-word listening included)
    async fn stop_all(&self, abort: bool) -> Result<(), HandlerError>;

    /// Tear down and rebuild the engine (e.g., after a device change)
    async fn reinitialize(&self) -> Result<(), HandlerError>;

    /// Whether captured audio is currently being processed
    fn is_processing_audio(&self) -> bool;

    /// Whether a wake-word listening session is currently running
    fn is_listening_for_wake_word(&self) -> bool;

    /// Get the engine key of this handler
    fn engine_key(&self) -> &str;
}

/// Registry for managing multiple STT handlers.
///
/// This is a plain lookup table; promotion of a newly registered handler and
/// forced stops on removal are orchestrator decisions.
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn SttHandler>>,
}

impl HandlerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Store a handler under the given engine key, replacing any previous one
    pub fn insert(&mut self, engine_key: &str, handler: Arc<dyn SttHandler>) {
        self.handlers.insert(engine_key.to_string(), handler);
    }

    /// Remove and return the handler for the given engine key
    pub fn remove(&mut self, engine_key: &str) -> Option<Arc<dyn SttHandler>> {
        self.handlers.remove(engine_key)
    }

    /// Get a handler by engine key
    pub fn get(&self, engine_key: &str) -> Option<Arc<dyn SttHandler>> {
        self.handlers.get(engine_key).cloned()
    }

    /// List all registered engine keys
    pub fn engine_keys(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
