//! STT orchestration: the coordination core for voice input.
//!
//! Holds exactly one live mode instance and one active handler reference,
//! and reacts to four external signal streams: input-mode preference,
//! engine preference, assistant-busy, and microphone permission. The
//! invariants enforced here prevent resource leaks and duplicate listening
//! sessions:
//! - the old mode is fully stopped and cleaned up before a new one exists
//! - `should_auto_start` is the sole gate for every automatic restart path
//! - the busy-debounce and wake-word-command timers are always cancelled on
//!   their terminating events

use crate::microphone::{MicrophoneControl, MicrophoneError, PermissionState};
use crate::modes::{
    ContinuousMode, ErrorDisposition, InputMode, ModeContext, ModeError, PushToTalkMode,
    VoiceActivatedMode,
};
use crate::notify::Notifier;
use crate::settings::{InputModeKind, InputSettings};
use crate::stt::{HandlerRegistry, RecognitionError, SttEvent, SttHandler};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Delay before restarting listening after the assistant stops being busy.
/// Absorbs rapid busy toggling (e.g., multi-part responses).
pub const BUSY_DEBOUNCE: Duration = Duration::from_millis(300);

/// How long voice-activated mode waits for a command after the wake word
pub const VAD_COMMAND_TIMEOUT: Duration = Duration::from_millis(7000);

/// Minimum interval between engine reinitializations
pub const REINIT_MIN_INTERVAL: Duration = Duration::from_millis(2000);

/// Settle delay after a reinitialize before auto-start is re-evaluated
pub const REINIT_SETTLE_DELAY: Duration = Duration::from_millis(250);

/// Errors surfaced from orchestrator entry points
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Mode(#[from] ModeError),

    #[error(transparent)]
    Microphone(#[from] MicrophoneError),

    #[error("Microphone is not available")]
    MicrophoneUnavailable,
}

/// Events emitted to the UI layer
#[derive(Debug, Clone)]
pub enum OrchestratorEvent {
    /// A final transcription is ready for the input field
    Transcription(String),
    /// A wake word was detected; command capture begins
    WakeWordDetected,
    /// Listening started or stopped
    ListeningChanged(bool),
    /// The active handler started/stopped processing audio
    ProcessingChanged(bool),
    /// A recognition error occurred (includes the non-fatal command timeout)
    Error(RecognitionError),
}

struct OrchestratorInner {
    settings: InputSettings,
    registry: HandlerRegistry,
    active_handler: Option<Arc<dyn SttHandler>>,
    mode: Box<dyn InputMode>,
    microphone: Box<dyn MicrophoneControl>,
    notifier: Arc<dyn Notifier>,
    events: UnboundedSender<OrchestratorEvent>,

    permission: PermissionState,
    assistant_busy: bool,
    reinitializing: bool,
    awaiting_command: bool,
    explicitly_stopped: bool,
    last_reinit: Option<Instant>,

    debounce_token: Option<CancellationToken>,
    command_timeout_token: Option<CancellationToken>,
}

/// Thread-safe handle to the orchestrator.
///
/// Clones share one state; external signal sources (settings provider,
/// assistant-busy watcher, registered handlers) each hold a clone and push
/// into it. Timer tasks spawned internally hold clones as well.
#[derive(Clone)]
pub struct SttOrchestrator {
    inner: Arc<Mutex<OrchestratorInner>>,
}

impl SttOrchestrator {
    /// Create an orchestrator and the event stream the UI consumes.
    ///
    /// The initial mode instance is built from the settings snapshot; no
    /// listening starts until a handler registers and permission is granted.
    pub fn new(
        settings: InputSettings,
        microphone: Box<dyn MicrophoneControl>,
        notifier: Arc<dyn Notifier>,
    ) -> (Self, UnboundedReceiver<OrchestratorEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let permission = microphone.permission();
        let mode = build_mode(settings.input_mode, None, &settings.wake_words);

        let inner = OrchestratorInner {
            settings,
            registry: HandlerRegistry::new(),
            active_handler: None,
            mode,
            microphone,
            notifier,
            events: events_tx,
            permission,
            assistant_busy: false,
            reinitializing: false,
            awaiting_command: false,
            explicitly_stopped: false,
            last_reinit: None,
            debounce_token: None,
            command_timeout_token: None,
        };

        (
            Self {
                inner: Arc::new(Mutex::new(inner)),
            },
            events_rx,
        )
    }

    // ------------------------------------------------------------------
    // UI surface
    // ------------------------------------------------------------------

    /// Human-readable status line for the current mode
    pub async fn status_text(&self) -> String {
        self.inner.lock().await.mode.status_text()
    }

    /// Human-readable input placeholder for the current mode
    pub async fn placeholder_text(&self) -> String {
        self.inner.lock().await.mode.placeholder_text()
    }

    /// Whether a listening session is currently active
    pub async fn is_active(&self) -> bool {
        self.inner.lock().await.mode.is_active()
    }

    /// Whether the mic button would start listening right now
    pub async fn can_start(&self) -> bool {
        let inner = self.inner.lock().await;
        let ctx = mode_context(&inner);
        inner.mode.can_start(&ctx)
    }

    /// Current input mode preference
    pub async fn input_mode(&self) -> InputModeKind {
        self.inner.lock().await.settings.input_mode
    }

    /// Current microphone permission as seen by the orchestrator
    pub async fn permission(&self) -> PermissionState {
        self.inner.lock().await.permission
    }

    /// Configured wake words (for handler configuration and UI hints)
    pub async fn wake_words(&self) -> Vec<String> {
        self.inner.lock().await.settings.wake_words.clone()
    }

    /// Latest microphone activity snapshot for level display
    pub async fn audio_activity(&self) -> crate::microphone::ActivitySnapshot {
        self.inner.lock().await.microphone.activity_snapshot()
    }

    /// Single entry point for the microphone button.
    ///
    /// Toggles between an explicit stop (which suppresses auto-start until
    /// the user acts again) and an explicit start (which may re-request a
    /// previously denied permission).
    pub async fn handle_mic_button_click(&self) -> Result<(), OrchestratorError> {
        let mut inner = self.inner.lock().await;

        if inner.mode.is_active() {
            log::info!("Orchestrator: listening stopped by user");
            inner.explicitly_stopped = true;
            clear_debounce(&mut inner);
            clear_command_timeout(&mut inner);
            inner.awaiting_command = false;
            inner.mode.stop().await?;
            emit_listening(&inner);
            return Ok(());
        }

        inner.explicitly_stopped = false;

        // A fresh user gesture is the only thing that may retry a denied or
        // errored permission.
        if inner.permission != PermissionState::Granted {
            match inner.microphone.request_permission_and_acquire(true).await {
                Ok(()) => inner.permission = PermissionState::Granted,
                Err(e) => {
                    inner.permission = inner.microphone.permission();
                    inner.notifier.error(e.user_message());
                    return Err(OrchestratorError::Microphone(e));
                }
            }
        } else if !inner.microphone.ensure_access().await {
            inner.permission = inner.microphone.permission();
            inner
                .notifier
                .error("Microphone is not available. Check your audio input settings.");
            return Err(OrchestratorError::MicrophoneUnavailable);
        }

        let ctx = mode_context(&inner);
        if !inner.mode.can_start(&ctx) {
            log::debug!("Orchestrator: start blocked (ctx {:?})", ctx);
            return Ok(());
        }

        inner.mode.start().await?;
        log::info!("Orchestrator: listening started by user");
        emit_listening(&inner);
        Ok(())
    }

    // ------------------------------------------------------------------
    // External signal streams
    // ------------------------------------------------------------------

    /// Reconcile against a full settings snapshot.
    ///
    /// Device first (so any rebuild binds the right input), then wake words,
    /// then engine, then mode.
    pub async fn apply_settings(&self, settings: &InputSettings) {
        {
            let mut inner = self.inner.lock().await;

            if inner.settings.input_device_name != settings.input_device_name {
                log::info!(
                    "Orchestrator: input device preference -> {:?}",
                    settings.input_device_name
                );
                inner.settings.input_device_name = settings.input_device_name.clone();
                inner
                    .microphone
                    .set_preferred_device(settings.input_device_name.clone());
                if inner.permission == PermissionState::Granted
                    && !inner.microphone.ensure_access().await
                {
                    inner.permission = inner.microphone.permission();
                }
            }

            if inner.settings.wake_words != settings.wake_words {
                inner.settings.wake_words = settings.wake_words.clone();
                if inner.settings.input_mode == InputModeKind::VoiceActivated {
                    replace_mode(&mut inner, InputModeKind::VoiceActivated).await;
                    maybe_auto_start(&mut inner).await;
                }
            }
        }

        self.set_engine(&settings.engine).await;
        self.set_input_mode(settings.input_mode).await;
    }

    /// Input-mode preference changed.
    ///
    /// Mode switch protocol: the old instance is stopped and cleaned up
    /// before the new one is constructed; only then is auto-start evaluated.
    pub async fn set_input_mode(&self, kind: InputModeKind) {
        let mut inner = self.inner.lock().await;
        if inner.settings.input_mode == kind {
            return;
        }

        log::info!(
            "Orchestrator: input mode {:?} -> {:?}",
            inner.settings.input_mode,
            kind
        );
        inner.settings.input_mode = kind;
        // A mode switch clears explicit-stop suppression.
        inner.explicitly_stopped = false;

        replace_mode(&mut inner, kind).await;
        maybe_auto_start(&mut inner).await;
    }

    /// Engine preference changed: hot-swap the active handler.
    ///
    /// No in-flight recognition state is preserved; the old handler is
    /// aborted, the engine reinitialized, and auto-start resumes listening.
    pub async fn set_engine(&self, engine_key: &str) {
        let mut inner = self.inner.lock().await;
        if inner.settings.engine == engine_key {
            return;
        }

        log::info!(
            "Orchestrator: engine '{}' -> '{}'",
            inner.settings.engine,
            engine_key
        );
        inner.settings.engine = engine_key.to_string();
        inner.explicitly_stopped = false;

        if let Some(old) = inner.active_handler.clone() {
            if let Err(e) = old.stop_all(true).await {
                log::warn!("Orchestrator: failed to abort old handler: {}", e);
            }
        }
        inner.active_handler = inner.registry.get(engine_key);

        let kind = inner.settings.input_mode;
        replace_mode(&mut inner, kind).await;
        self.try_reinitialize(&mut inner).await;
    }

    /// Assistant busy-state changed.
    ///
    /// Busy stops listening immediately (voice-activated phases excepted so
    /// the user can interrupt); not-busy restarts only after the debounce.
    pub async fn set_assistant_busy(&self, busy: bool) {
        let mut inner = self.inner.lock().await;
        if inner.assistant_busy == busy {
            return;
        }
        inner.assistant_busy = busy;
        log::debug!("Orchestrator: assistant busy = {}", busy);

        if busy {
            clear_debounce(&mut inner);
            let exempt = inner.mode.kind() == InputModeKind::VoiceActivated;
            if inner.mode.is_active() && !exempt {
                if let Err(e) = inner.mode.stop().await {
                    log::warn!("Orchestrator: stop on busy failed: {}", e);
                }
                emit_listening(&inner);
            }
        } else {
            self.arm_busy_debounce(&mut inner);
        }
    }

    /// Microphone permission changed externally.
    ///
    /// Any loss forces a stop equivalent to an explicit user stop; recovery
    /// to granted triggers a (rate-limited) reinitialization.
    pub async fn on_permission_changed(&self, state: PermissionState) {
        let mut inner = self.inner.lock().await;
        if inner.permission == state {
            return;
        }

        let lost =
            inner.permission == PermissionState::Granted && state != PermissionState::Granted;
        let recovered =
            inner.permission != PermissionState::Granted && state == PermissionState::Granted;
        inner.permission = state;

        if lost {
            log::warn!("Orchestrator: microphone permission lost, forcing stop");
            clear_debounce(&mut inner);
            clear_command_timeout(&mut inner);
            inner.awaiting_command = false;
            inner.explicitly_stopped = true;
            if let Err(e) = inner.mode.stop().await {
                log::warn!("Orchestrator: forced stop failed: {}", e);
            }
            inner.microphone.release_all();
            if state == PermissionState::Denied {
                inner.notifier.error(MicrophoneError::Denied.user_message());
            }
            emit_listening(&inner);
        } else if recovered {
            log::info!("Orchestrator: microphone permission restored");
            inner.explicitly_stopped = false;
            self.try_reinitialize(&mut inner).await;
        }
    }

    // ------------------------------------------------------------------
    // Handler registration
    // ------------------------------------------------------------------

    /// Register an STT backend.
    ///
    /// If it matches the preferred engine and no handler is active, it is
    /// promoted immediately and auto-start is evaluated.
    pub async fn register_handler(&self, engine_key: &str, handler: Arc<dyn SttHandler>) {
        let mut inner = self.inner.lock().await;
        inner.registry.insert(engine_key, handler.clone());
        log::info!("Orchestrator: handler '{}' registered", engine_key);

        if engine_key == inner.settings.engine && inner.active_handler.is_none() {
            inner.active_handler = Some(handler);
            let kind = inner.settings.input_mode;
            replace_mode(&mut inner, kind).await;
            maybe_auto_start(&mut inner).await;
        }
    }

    /// Unregister an STT backend, aborting all its activity.
    ///
    /// If it was the active handler, the current mode is forced to stop so no
    /// activity dangles against a removed backend.
    pub async fn unregister_handler(&self, engine_key: &str) {
        let mut inner = self.inner.lock().await;
        let Some(handler) = inner.registry.remove(engine_key) else {
            return;
        };
        log::info!("Orchestrator: handler '{}' unregistered", engine_key);

        if let Err(e) = handler.stop_all(true).await {
            log::warn!("Orchestrator: abort of unregistered handler failed: {}", e);
        }

        if inner.settings.engine == engine_key && inner.active_handler.is_some() {
            inner.active_handler = None;
            let kind = inner.settings.input_mode;
            // replace_mode stops the old instance first, so nothing keeps
            // running against the removed handler.
            replace_mode(&mut inner, kind).await;
            emit_listening(&inner);
        }
    }

    // ------------------------------------------------------------------
    // Handler event entry points
    // ------------------------------------------------------------------

    /// Route a raw handler event to the matching entry point. Handlers that
    /// expose an event stream can forward it here wholesale.
    pub async fn on_stt_event(&self, event: SttEvent) {
        match event {
            SttEvent::Transcription(text) => self.on_transcription(&text).await,
            SttEvent::Processing(processing) => self.on_processing_changed(processing).await,
            SttEvent::WakeWordDetected => self.on_wake_word().await,
            SttEvent::Error(error) => self.on_handler_error(error).await,
        }
    }

    /// A final transcription arrived from the active handler
    pub async fn on_transcription(&self, text: &str) {
        let mut inner = self.inner.lock().await;
        clear_command_timeout(&mut inner);
        inner.awaiting_command = false;

        inner.mode.handle_transcription(text).await;
        let _ = inner
            .events
            .send(OrchestratorEvent::Transcription(text.to_string()));
        emit_listening(&inner);
    }

    /// A wake word was detected by the active handler
    pub async fn on_wake_word(&self) {
        let mut inner = self.inner.lock().await;

        match inner.mode.handle_wake_word().await {
            Ok(true) => {
                inner.awaiting_command = true;
                let _ = inner.events.send(OrchestratorEvent::WakeWordDetected);
                self.arm_command_timeout(&mut inner);
                emit_listening(&inner);
            }
            Ok(false) => {}
            Err(e) => {
                log::error!("Orchestrator: failed to enter command capture: {}", e);
                inner
                    .notifier
                    .error("Could not start listening for your command.");
            }
        }
    }

    /// The active handler's processing state changed
    pub async fn on_processing_changed(&self, processing: bool) {
        let inner = self.inner.lock().await;
        let _ = inner
            .events
            .send(OrchestratorEvent::ProcessingChanged(processing));
    }

    /// A recognition error arrived from the active handler.
    ///
    /// Offered to the current mode first; surfaced to the user only when the
    /// mode reports no local recovery.
    pub async fn on_handler_error(&self, error: RecognitionError) {
        let mut inner = self.inner.lock().await;
        clear_command_timeout(&mut inner);
        inner.awaiting_command = false;

        let disposition = inner.mode.handle_error(&error).await;
        if disposition == ErrorDisposition::SurfaceToUser {
            inner.notifier.error(&error.to_string());
        }
        let _ = inner.events.send(OrchestratorEvent::Error(error));
        emit_listening(&inner);

        if disposition == ErrorDisposition::HandledLocally {
            maybe_auto_start(&mut inner).await;
        }
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Stop everything and release every resource. Safe from any state.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        clear_debounce(&mut inner);
        clear_command_timeout(&mut inner);
        inner.awaiting_command = false;

        if let Err(e) = inner.mode.stop().await {
            log::warn!("Orchestrator: stop during shutdown failed: {}", e);
        }
        inner.mode.cleanup().await;

        if let Some(handler) = inner.active_handler.take() {
            if let Err(e) = handler.stop_all(true).await {
                log::warn!("Orchestrator: handler abort during shutdown failed: {}", e);
            }
        }
        inner.microphone.release_all();
        log::info!("Orchestrator: shut down");
    }

    // ------------------------------------------------------------------
    // Timers and reinitialization
    // ------------------------------------------------------------------

    /// Rate-limited engine reinitialization with a settle delay.
    ///
    /// Auto-start stays disabled from here until the settle task runs.
    async fn try_reinitialize(&self, inner: &mut OrchestratorInner) {
        if let Some(last) = inner.last_reinit {
            if last.elapsed() < REINIT_MIN_INTERVAL {
                log::warn!(
                    "Orchestrator: reinitialize requested {:?} after the last one, dropping",
                    last.elapsed()
                );
                return;
            }
        }
        inner.last_reinit = Some(Instant::now());
        inner.reinitializing = true;
        log::info!("Orchestrator: reinitializing engine '{}'", inner.settings.engine);

        if let Some(handler) = inner.active_handler.clone() {
            if let Err(e) = handler.reinitialize().await {
                log::error!("Orchestrator: engine reinitialize failed: {}", e);
                inner
                    .notifier
                    .error("The speech engine failed to restart. Try switching engines.");
            }
        }

        let orchestrator = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(REINIT_SETTLE_DELAY).await;
            orchestrator.finish_reinitialize().await;
        });
    }

    async fn finish_reinitialize(&self) {
        let mut inner = self.inner.lock().await;
        if !inner.reinitializing {
            return;
        }
        inner.reinitializing = false;
        log::debug!("Orchestrator: reinitialize settled");
        maybe_auto_start(&mut inner).await;
    }

    /// Arm the busy-state debounce, canceling any prior pending one
    fn arm_busy_debounce(&self, inner: &mut OrchestratorInner) {
        clear_debounce(inner);

        let token = CancellationToken::new();
        inner.debounce_token = Some(token.clone());

        let orchestrator = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;

                _ = token.cancelled() => {}

                _ = tokio::time::sleep(BUSY_DEBOUNCE) => {
                    orchestrator.busy_debounce_fired(token.clone()).await;
                }
            }
        });
    }

    async fn busy_debounce_fired(&self, token: CancellationToken) {
        let mut inner = self.inner.lock().await;
        // The token may have been cancelled between the timer firing and the
        // lock being acquired; a cancelled timer must never act.
        if token.is_cancelled() {
            return;
        }
        inner.debounce_token = None;
        log::debug!("Orchestrator: busy debounce elapsed");
        maybe_auto_start(&mut inner).await;
    }

    /// Arm the wake-word command timeout; any previous timeout is cleared
    /// before the new one exists.
    fn arm_command_timeout(&self, inner: &mut OrchestratorInner) {
        clear_command_timeout(inner);

        let token = CancellationToken::new();
        inner.command_timeout_token = Some(token.clone());

        let orchestrator = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;

                _ = token.cancelled() => {}

                _ = tokio::time::sleep(VAD_COMMAND_TIMEOUT) => {
                    orchestrator.command_timeout_fired(token.clone()).await;
                }
            }
        });
    }

    async fn command_timeout_fired(&self, token: CancellationToken) {
        let mut inner = self.inner.lock().await;
        if token.is_cancelled() {
            return;
        }
        inner.command_timeout_token = None;

        if !inner.awaiting_command {
            return;
        }
        inner.awaiting_command = false;
        log::info!("Orchestrator: wake-word command timed out");

        // Non-fatal: the mode falls back to wake-word listening.
        let error = RecognitionError::VadCommandTimeout;
        let disposition = inner.mode.handle_error(&error).await;
        if disposition == ErrorDisposition::SurfaceToUser {
            inner.notifier.error(&error.to_string());
        }
        let _ = inner.events.send(OrchestratorEvent::Error(error));
        emit_listening(&inner);
    }
}

// ----------------------------------------------------------------------
// Locked helpers
// ----------------------------------------------------------------------

fn build_mode(
    kind: InputModeKind,
    handler: Option<Arc<dyn SttHandler>>,
    wake_words: &[String],
) -> Box<dyn InputMode> {
    match kind {
        InputModeKind::PushToTalk => Box::new(PushToTalkMode::new(handler)),
        InputModeKind::Continuous => Box::new(ContinuousMode::new(handler)),
        InputModeKind::VoiceActivated => {
            Box::new(VoiceActivatedMode::new(handler, wake_words.to_vec()))
        }
    }
}

/// Swap in a freshly built mode instance.
///
/// Ordering guarantee: the old instance is fully stopped and cleaned up
/// before the new one is constructed, so two modes never hold the
/// microphone at once. Both timers are cleared along the way.
async fn replace_mode(inner: &mut OrchestratorInner, kind: InputModeKind) {
    if let Err(e) = inner.mode.stop().await {
        log::warn!("Orchestrator: stop of outgoing mode failed: {}", e);
    }
    inner.mode.cleanup().await;

    clear_debounce(inner);
    clear_command_timeout(inner);
    inner.awaiting_command = false;

    inner.mode = build_mode(
        kind,
        inner.active_handler.clone(),
        &inner.settings.wake_words,
    );
    log::debug!("Orchestrator: mode instance replaced ({:?})", kind);
}

/// The sole gate for every automatic restart path
fn should_auto_start(inner: &OrchestratorInner) -> bool {
    if inner.reinitializing || inner.explicitly_stopped {
        return false;
    }
    if inner.permission != PermissionState::Granted {
        return false;
    }
    // Busy suspends auto-start except while a wake-word command is awaited.
    if inner.assistant_busy && !inner.awaiting_command {
        return false;
    }
    if !inner.mode.prefers_auto_start() {
        return false;
    }
    match &inner.active_handler {
        Some(handler) => {
            !handler.is_processing_audio() && !handler.is_listening_for_wake_word()
        }
        None => false,
    }
}

/// Start listening if and only if every auto-start condition holds
async fn maybe_auto_start(inner: &mut OrchestratorInner) {
    if !should_auto_start(inner) {
        return;
    }
    let ctx = mode_context(inner);
    if !inner.mode.can_start(&ctx) {
        return;
    }
    if !inner.microphone.ensure_access().await {
        inner.permission = inner.microphone.permission();
        return;
    }

    match inner.mode.start().await {
        Ok(()) => {
            log::info!("Orchestrator: listening auto-started");
            emit_listening(inner);
        }
        Err(e) => {
            log::error!("Orchestrator: auto-start failed: {}", e);
        }
    }
}

fn mode_context(inner: &OrchestratorInner) -> ModeContext {
    ModeContext {
        permission_granted: inner.permission == PermissionState::Granted,
        reinitializing: inner.reinitializing,
        handler_present: inner.active_handler.is_some(),
        assistant_busy: inner.assistant_busy,
        awaiting_command: inner.awaiting_command,
    }
}

fn emit_listening(inner: &OrchestratorInner) {
    let _ = inner
        .events
        .send(OrchestratorEvent::ListeningChanged(inner.mode.is_active()));
}

fn clear_debounce(inner: &mut OrchestratorInner) {
    if let Some(token) = inner.debounce_token.take() {
        token.cancel();
    }
}

fn clear_command_timeout(inner: &mut OrchestratorInner) {
    if let Some(token) = inner.command_timeout_token.take() {
        token.cancel();
    }
}
