//! Test doubles shared by the orchestrator scenarios.

use crate::microphone::{ActivitySnapshot, MicrophoneControl, MicrophoneError, PermissionState};
use crate::notify::Notifier;
use crate::stt::{HandlerError, SttHandler};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared knobs and counters for a [`FakeMicrophone`], held by the test
/// after the fake itself moves into the orchestrator.
#[derive(Clone)]
pub struct FakeMicHandle {
    permission: Arc<Mutex<PermissionState>>,
    acquisitions: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
}

impl FakeMicHandle {
    pub fn set_permission(&self, state: PermissionState) {
        *self.permission.lock().unwrap() = state;
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

/// Microphone double that grants or denies according to its shared
/// permission state and never touches real audio hardware.
pub struct FakeMicrophone {
    handle: FakeMicHandle,
    preferred_device: Option<String>,
}

impl FakeMicrophone {
    pub fn granted() -> (Self, FakeMicHandle) {
        Self::with_permission(PermissionState::Granted)
    }

    pub fn with_permission(state: PermissionState) -> (Self, FakeMicHandle) {
        let handle = FakeMicHandle {
            permission: Arc::new(Mutex::new(state)),
            acquisitions: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
        };
        (
            Self {
                handle: handle.clone(),
                preferred_device: None,
            },
            handle,
        )
    }
}

#[async_trait]
impl MicrophoneControl for FakeMicrophone {
    fn permission(&self) -> PermissionState {
        *self.handle.permission.lock().unwrap()
    }

    fn set_preferred_device(&mut self, name: Option<String>) {
        self.preferred_device = name;
    }

    async fn request_permission_and_acquire(
        &mut self,
        _close_existing: bool,
    ) -> Result<(), MicrophoneError> {
        let state = *self.handle.permission.lock().unwrap();
        match state {
            PermissionState::Denied => Err(MicrophoneError::Denied),
            PermissionState::Error => Err(MicrophoneError::Unknown("fake failure".to_string())),
            _ => {
                *self.handle.permission.lock().unwrap() = PermissionState::Granted;
                self.handle.acquisitions.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }
    }

    async fn ensure_access(&mut self) -> bool {
        *self.handle.permission.lock().unwrap() == PermissionState::Granted
    }

    fn release_all(&mut self) {
        self.handle.releases.fetch_add(1, Ordering::SeqCst);
    }

    fn activity_snapshot(&self) -> ActivitySnapshot {
        ActivitySnapshot::default()
    }
}

/// Handler double that records every lifecycle call.
///
/// `start(false)` and `start(true)` are counted separately so the
/// voice-activated scenarios can distinguish wake-word listening from
/// command capture. The activity flags are settable so scenarios can model
/// a handler with sessions of its own still running.
pub struct ScriptedHandler {
    key: String,
    wake_starts: AtomicUsize,
    command_starts: AtomicUsize,
    stops: AtomicUsize,
    stop_alls: AtomicUsize,
    reinits: AtomicUsize,
    processing: AtomicBool,
    wake_listening: AtomicBool,
}

impl ScriptedHandler {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            wake_starts: AtomicUsize::new(0),
            command_starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            stop_alls: AtomicUsize::new(0),
            reinits: AtomicUsize::new(0),
            processing: AtomicBool::new(false),
            wake_listening: AtomicBool::new(false),
        }
    }

    pub fn set_processing(&self, on: bool) {
        self.processing.store(on, Ordering::SeqCst);
    }

    pub fn set_wake_listening(&self, on: bool) {
        self.wake_listening.store(on, Ordering::SeqCst);
    }

    pub fn wake_starts(&self) -> usize {
        self.wake_starts.load(Ordering::SeqCst)
    }

    pub fn command_starts(&self) -> usize {
        self.command_starts.load(Ordering::SeqCst)
    }

    pub fn total_starts(&self) -> usize {
        self.wake_starts() + self.command_starts()
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn stop_alls(&self) -> usize {
        self.stop_alls.load(Ordering::SeqCst)
    }

    pub fn reinits(&self) -> usize {
        self.reinits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SttHandler for ScriptedHandler {
    async fn start(&self, for_command: bool) -> Result<(), HandlerError> {
        if for_command {
            self.command_starts.fetch_add(1, Ordering::SeqCst);
        } else {
            self.wake_starts.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn stop(&self, _abort: bool) -> Result<(), HandlerError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_all(&self, _abort: bool) -> Result<(), HandlerError> {
        self.stop_alls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn reinitialize(&self) -> Result<(), HandlerError> {
        self.reinits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_processing_audio(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    fn is_listening_for_wake_word(&self) -> bool {
        self.wake_listening.load(Ordering::SeqCst)
    }

    fn engine_key(&self) -> &str {
        &self.key
    }
}

/// Notifier double capturing user-facing error messages
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    errors: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, _message: &str) {}

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}
