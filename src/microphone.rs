//! Microphone resource manager using cpal for cross-platform audio input.
//!
//! Owns the audio hardware handle, its processing graph (capture stream +
//! activity meter), and the permission state machine. The invariant this
//! module enforces: at most one audio resource bundle is live at any time,
//! and every acquisition failure leaves the system fully released.

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use std::sync::mpsc;
use std::sync::{Arc, Mutex as StdMutex};
use std::thread::{self, JoinHandle};
use tokio::sync::oneshot;

// Activity-analysis parameters: fixed small window, moderate smoothing,
// fixed decibel range. The analysis graph is capture-only; nothing is
// connected to an output sink, so no audio feedback is possible.
const ACTIVITY_WINDOW_SAMPLES: usize = 256;
const ACTIVITY_SMOOTHING: f32 = 0.8;
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

/// OS-level microphone permission state.
///
/// Transitions only through [`MicrophoneManager::request_permission_and_acquire`];
/// `Denied` and `Error` are terminal until a fresh user-initiated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// Permission has not been requested yet
    Prompt,
    /// Permission granted and usable
    Granted,
    /// Permission denied by the user or OS
    Denied,
    /// Acquisition failed for a non-permission reason
    Error,
}

/// Errors that can occur while acquiring the microphone
#[derive(Debug, Clone, thiserror::Error)]
pub enum MicrophoneError {
    #[error("Microphone access denied")]
    Denied,

    #[error("No matching input device found")]
    DeviceNotFound,

    #[error("Input device is busy or unreadable")]
    DeviceBusy,

    #[error("Requested audio configuration is not supported: {0}")]
    ConstraintUnsatisfiable(String),

    #[error("Audio capture is not supported in this environment")]
    Unsupported,

    #[error("Microphone error: {0}")]
    Unknown(String),
}

impl MicrophoneError {
    /// User-facing, actionable message for the notification service
    pub fn user_message(&self) -> &'static str {
        match self {
            MicrophoneError::Denied => {
                "Microphone access was denied. Enable microphone permissions to use voice input."
            }
            MicrophoneError::DeviceNotFound => {
                "No microphone was found. Connect a microphone or pick another input device."
            }
            MicrophoneError::DeviceBusy => {
                "The microphone is in use by another application. Close it and try again."
            }
            MicrophoneError::ConstraintUnsatisfiable(_) => {
                "The selected microphone does not support the required audio settings. Try the default device."
            }
            MicrophoneError::Unsupported => {
                "Audio capture is not supported in this environment."
            }
            MicrophoneError::Unknown(_) => {
                "The microphone could not be started. Check your audio settings and try again."
            }
        }
    }

    /// Which permission state an acquisition failure leaves behind
    fn permission_after_failure(&self) -> PermissionState {
        match self {
            MicrophoneError::Denied | MicrophoneError::Unsupported => PermissionState::Denied,
            _ => PermissionState::Error,
        }
    }
}

/// Snapshot of the activity-analysis node's current levels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivitySnapshot {
    /// Smoothed level mapped onto the fixed decibel range, in [0, 1]
    pub level: f32,
    /// Raw RMS amplitude of the latest analysis window, in [0, 1]
    pub rms: f32,
    /// Peak amplitude of the latest analysis window, in [0, 1]
    pub peak: f32,
}

struct MeterState {
    smoothed_level: f32,
    snapshot: ActivitySnapshot,
    window: Vec<f32>,
}

/// Activity-analysis node fed by the capture callback.
///
/// Cheap enough to update from the real-time thread: accumulates a fixed
/// small window, computes RMS/peak, and applies exponential smoothing.
#[derive(Clone)]
pub struct SharedActivityMeter {
    state: Arc<StdMutex<MeterState>>,
}

impl SharedActivityMeter {
    fn new() -> Self {
        Self {
            state: Arc::new(StdMutex::new(MeterState {
                smoothed_level: 0.0,
                snapshot: ActivitySnapshot::default(),
                window: Vec::with_capacity(ACTIVITY_WINDOW_SAMPLES),
            })),
        }
    }

    fn push_samples(&self, samples: &[f32]) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };

        for &sample in samples {
            state.window.push(sample);
            if state.window.len() < ACTIVITY_WINDOW_SAMPLES {
                continue;
            }

            let mut peak: f32 = 0.0;
            let mut sum_sq: f32 = 0.0;
            for &s in &state.window {
                peak = peak.max(s.abs());
                sum_sq += s * s;
            }
            let rms = (sum_sq / state.window.len() as f32).sqrt();
            state.window.clear();

            let dbfs = if rms > 0.0 {
                20.0 * rms.log10()
            } else {
                f32::NEG_INFINITY
            };
            let normalized = ((dbfs - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS)).clamp(0.0, 1.0);

            state.smoothed_level = ACTIVITY_SMOOTHING * state.smoothed_level
                + (1.0 - ACTIVITY_SMOOTHING) * normalized;
            state.snapshot = ActivitySnapshot {
                level: state.smoothed_level,
                rms,
                peak,
            };
        }
    }

    /// Latest activity snapshot (non-blocking best effort)
    pub fn snapshot(&self) -> ActivitySnapshot {
        self.state
            .lock()
            .map(|s| s.snapshot)
            .unwrap_or_default()
    }
}

/// Commands sent to the capture thread
enum CaptureCommand {
    Stop,
}

/// A live capture session. Dropping it stops capture and releases the device.
trait CaptureSession: Send {}

/// Seam between the manager's bundle lifecycle and the audio backend.
/// [`CpalBackend`] is the production implementation; the unit tests inject a
/// scripted one so the one-bundle invariant is checkable without hardware.
#[async_trait]
trait CaptureBackend: Send {
    /// The device name the given selection resolves to (None means default)
    fn resolve_device_name(&self, preferred: Option<&str>) -> Result<String, MicrophoneError>;

    /// Open a capture session on the selected device, feeding the meter.
    /// Must not return until capture has actually started or failed.
    async fn open_capture(
        &self,
        preferred: Option<&str>,
        meter: SharedActivityMeter,
    ) -> Result<Box<dyn CaptureSession>, MicrophoneError>;
}

/// The live audio resources: capture session plus the activity meter it
/// feeds. Exclusively owned by [`MicrophoneManager`].
struct AudioResourceBundle {
    device_name: String,
    session: Box<dyn CaptureSession>,
    meter: SharedActivityMeter,
}

/// Seam the orchestrator consumes. A fake implementation backs the
/// orchestrator tests; [`MicrophoneManager`] is the cpal-backed one.
#[async_trait]
pub trait MicrophoneControl: Send {
    /// Current permission state
    fn permission(&self) -> PermissionState;

    /// Select the preferred input device (None means system default).
    /// Takes effect on the next acquisition or `ensure_access` check.
    fn set_preferred_device(&mut self, name: Option<String>);

    /// Request OS access and build the capture graph.
    ///
    /// Any previously live bundle is fully torn down before the new one is
    /// created. On failure the permission state is updated per the error
    /// taxonomy and no partial resources remain.
    async fn request_permission_and_acquire(
        &mut self,
        close_existing: bool,
    ) -> Result<(), MicrophoneError>;

    /// Idempotent access check; re-acquires when the selected device changed.
    /// Returns false without attempting when permission is denied/errored.
    async fn ensure_access(&mut self) -> bool;

    /// Stop the capture session and drop every audio resource. Idempotent.
    fn release_all(&mut self);

    /// Latest activity-analysis snapshot (zeros when nothing is live)
    fn activity_snapshot(&self) -> ActivitySnapshot {
        ActivitySnapshot::default()
    }
}

/// Owns the microphone hardware handle and permission state machine
pub struct MicrophoneManager {
    backend: Box<dyn CaptureBackend>,
    preferred_device: Option<String>,
    permission: PermissionState,
    bundle: Option<AudioResourceBundle>,
}

impl MicrophoneManager {
    /// Create a new manager; nothing is acquired until requested
    pub fn new() -> Self {
        Self::with_backend(Box::new(CpalBackend))
    }

    fn with_backend(backend: Box<dyn CaptureBackend>) -> Self {
        Self {
            backend,
            preferred_device: None,
            permission: PermissionState::Prompt,
            bundle: None,
        }
    }

    /// Whether a resource bundle is currently live
    pub fn has_live_bundle(&self) -> bool {
        self.bundle.is_some()
    }

    /// Name of the device the live bundle was opened against
    pub fn active_device_name(&self) -> Option<&str> {
        self.bundle.as_ref().map(|b| b.device_name.as_str())
    }

    async fn acquire(&mut self) -> Result<AudioResourceBundle, MicrophoneError> {
        let preferred = self.preferred_device.as_deref();
        let device_name = self.backend.resolve_device_name(preferred)?;
        let meter = SharedActivityMeter::new();

        let session = self.backend.open_capture(preferred, meter.clone()).await?;
        Ok(AudioResourceBundle {
            device_name,
            session,
            meter,
        })
    }
}

#[async_trait]
impl MicrophoneControl for MicrophoneManager {
    fn permission(&self) -> PermissionState {
        self.permission
    }

    fn set_preferred_device(&mut self, name: Option<String>) {
        self.preferred_device = name;
    }

    async fn request_permission_and_acquire(
        &mut self,
        close_existing: bool,
    ) -> Result<(), MicrophoneError> {
        // At most one bundle may be live: tear down before building, whether
        // or not the caller asked for it explicitly.
        if close_existing || self.bundle.is_some() {
            self.release_all();
        }

        match self.acquire().await {
            Ok(bundle) => {
                self.permission = PermissionState::Granted;
                self.bundle = Some(bundle);
                log::info!("Microphone: acquisition complete, permission granted");
                Ok(())
            }
            Err(e) => {
                // acquire() never leaves partial resources behind, but be
                // explicit: nothing may survive a failed acquisition.
                self.release_all();
                self.permission = e.permission_after_failure();
                log::warn!("Microphone: acquisition failed: {}", e);
                Err(e)
            }
        }
    }

    async fn ensure_access(&mut self) -> bool {
        match self.permission {
            PermissionState::Denied | PermissionState::Error => return false,
            PermissionState::Prompt | PermissionState::Granted => {}
        }

        if self.permission == PermissionState::Granted {
            if let Some(bundle) = &self.bundle {
                let preferred = self.preferred_device.as_deref();
                match self.backend.resolve_device_name(preferred) {
                    Ok(wanted) if wanted == bundle.device_name => return true,
                    Ok(wanted) => {
                        log::info!(
                            "Microphone: selected device changed ('{}' -> '{}'), re-acquiring",
                            bundle.device_name,
                            wanted
                        );
                    }
                    Err(e) => {
                        log::warn!("Microphone: device resolution failed: {}", e);
                        return false;
                    }
                }
            }
        }

        self.request_permission_and_acquire(true).await.is_ok()
    }

    fn release_all(&mut self) {
        if let Some(bundle) = self.bundle.take() {
            log::info!(
                "Microphone: releasing audio resources ('{}')",
                bundle.device_name
            );
            drop(bundle.session);
        }
    }

    fn activity_snapshot(&self) -> ActivitySnapshot {
        self.bundle
            .as_ref()
            .map(|b| b.meter.snapshot())
            .unwrap_or_default()
    }
}

impl Default for MicrophoneManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MicrophoneManager {
    fn drop(&mut self) {
        self.release_all();
    }
}

/// cpal-backed capture. The stream lives on a dedicated thread because
/// `cpal::Stream` is not `Send`; readiness comes back over a oneshot so the
/// async caller never blocks a runtime worker on stream startup.
struct CpalBackend;

/// Handle to the dedicated capture thread; dropping it stops the stream
struct CpalSession {
    command_tx: mpsc::Sender<CaptureCommand>,
    thread_handle: Option<JoinHandle<()>>,
}

impl CaptureSession for CpalSession {}

impl Drop for CpalSession {
    fn drop(&mut self) {
        // Ignore send errors: the thread may already have stopped.
        let _ = self.command_tx.send(CaptureCommand::Stop);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl CpalBackend {
    fn open_device(&self, preferred: Option<&str>) -> Result<cpal::Device, MicrophoneError> {
        let host = cpal::default_host();

        if let Some(name) = preferred {
            let mut devices = host
                .input_devices()
                .map_err(|e| classify_devices_error(&e))?;
            devices
                .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                .ok_or(MicrophoneError::DeviceNotFound)
        } else {
            host.default_input_device()
                .ok_or(MicrophoneError::DeviceNotFound)
        }
    }
}

#[async_trait]
impl CaptureBackend for CpalBackend {
    fn resolve_device_name(&self, preferred: Option<&str>) -> Result<String, MicrophoneError> {
        if let Some(name) = preferred {
            return Ok(name.to_string());
        }
        default_input_device_name().ok_or(MicrophoneError::DeviceNotFound)
    }

    async fn open_capture(
        &self,
        preferred: Option<&str>,
        meter: SharedActivityMeter,
    ) -> Result<Box<dyn CaptureSession>, MicrophoneError> {
        let device = self.open_device(preferred)?;

        let config = device
            .default_input_config()
            .map_err(classify_config_error)?;

        log::info!(
            "Microphone: opening '{}' ({} Hz, {} channels, {:?})",
            device.name().unwrap_or_else(|_| "unknown".to_string()),
            config.sample_rate().0,
            config.channels(),
            config.sample_format()
        );

        let (command_tx, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        let sample_format = config.sample_format();
        let stream_config: cpal::StreamConfig = config.into();

        let thread_handle = thread::spawn(move || {
            run_capture_thread(
                device,
                stream_config,
                sample_format,
                meter,
                command_rx,
                ready_tx,
            );
        });

        // Wait for the stream to actually start so acquisition failures are
        // reported synchronously and leave no half-initialized session.
        match ready_rx.await {
            Ok(Ok(())) => Ok(Box::new(CpalSession {
                command_tx,
                thread_handle: Some(thread_handle),
            })),
            Ok(Err(e)) => {
                let _ = thread_handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread_handle.join();
                Err(MicrophoneError::Unknown(
                    "capture thread exited before startup".to_string(),
                ))
            }
        }
    }
}

/// Run the capture stream on a dedicated thread, feeding the activity meter
fn run_capture_thread(
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_format: SampleFormat,
    meter: SharedActivityMeter,
    command_rx: mpsc::Receiver<CaptureCommand>,
    ready_tx: oneshot::Sender<Result<(), MicrophoneError>>,
) {
    use cpal::Sample;

    let err_fn = |err| {
        log::error!("Microphone: stream error: {}", err);
    };

    let stream = match sample_format {
        SampleFormat::F32 => {
            let meter = meter.clone();
            device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    meter.push_samples(data);
                },
                err_fn,
                None,
            )
        }
        SampleFormat::I16 => {
            let meter = meter.clone();
            device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let samples: Vec<f32> = data.iter().map(|&s| s.to_float_sample()).collect();
                    meter.push_samples(&samples);
                },
                err_fn,
                None,
            )
        }
        SampleFormat::U16 => {
            let meter = meter.clone();
            device.build_input_stream(
                &config,
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    let samples: Vec<f32> = data.iter().map(|&s| s.to_float_sample()).collect();
                    meter.push_samples(&samples);
                },
                err_fn,
                None,
            )
        }
        other => {
            let _ = ready_tx.send(Err(MicrophoneError::ConstraintUnsatisfiable(format!(
                "unsupported sample format: {:?}",
                other
            ))));
            return;
        }
    };

    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            let _ = ready_tx.send(Err(classify_build_error(e)));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(classify_play_error(e)));
        return;
    }

    let _ = ready_tx.send(Ok(()));

    // Hold the stream until told to stop.
    loop {
        match command_rx.recv_timeout(std::time::Duration::from_millis(100)) {
            Ok(CaptureCommand::Stop) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    // Stream is dropped here, stopping capture.
}

fn classify_devices_error(e: &cpal::DevicesError) -> MicrophoneError {
    let msg = e.to_string();
    if looks_like_denial(&msg) {
        MicrophoneError::Denied
    } else {
        MicrophoneError::Unsupported
    }
}

fn classify_config_error(e: cpal::DefaultStreamConfigError) -> MicrophoneError {
    match e {
        cpal::DefaultStreamConfigError::DeviceNotAvailable => MicrophoneError::DeviceNotFound,
        cpal::DefaultStreamConfigError::StreamTypeNotSupported => {
            MicrophoneError::ConstraintUnsatisfiable("stream type not supported".to_string())
        }
        cpal::DefaultStreamConfigError::BackendSpecific { err } => {
            if looks_like_denial(&err.description) {
                MicrophoneError::Denied
            } else {
                MicrophoneError::Unknown(err.description)
            }
        }
    }
}

fn classify_build_error(e: cpal::BuildStreamError) -> MicrophoneError {
    match e {
        cpal::BuildStreamError::DeviceNotAvailable => MicrophoneError::DeviceNotFound,
        cpal::BuildStreamError::StreamConfigNotSupported => {
            MicrophoneError::ConstraintUnsatisfiable("stream config not supported".to_string())
        }
        cpal::BuildStreamError::InvalidArgument => {
            MicrophoneError::ConstraintUnsatisfiable("invalid stream argument".to_string())
        }
        cpal::BuildStreamError::StreamIdOverflow => {
            MicrophoneError::Unknown("stream id overflow".to_string())
        }
        cpal::BuildStreamError::BackendSpecific { err } => {
            if looks_like_denial(&err.description) {
                MicrophoneError::Denied
            } else {
                MicrophoneError::DeviceBusy
            }
        }
    }
}

/// Best-effort detection of OS permission denials surfaced as backend errors
fn looks_like_denial(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("denied") || lower.contains("permission") || lower.contains("not permitted")
}

fn classify_play_error(e: cpal::PlayStreamError) -> MicrophoneError {
    match e {
        cpal::PlayStreamError::DeviceNotAvailable => MicrophoneError::DeviceNotFound,
        cpal::PlayStreamError::BackendSpecific { err } => {
            if looks_like_denial(&err.description) {
                MicrophoneError::Denied
            } else {
                MicrophoneError::DeviceBusy
            }
        }
    }
}

/// Get the list of available input device names
pub fn list_input_devices() -> Vec<String> {
    let host = cpal::default_host();
    host.input_devices()
        .map(|devices| devices.filter_map(|d| d.name().ok()).collect())
        .unwrap_or_default()
}

/// Name of the system default input device, if any
pub fn default_input_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_input_device().and_then(|d| d.name().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_activity_meter_silence() {
        let meter = SharedActivityMeter::new();
        meter.push_samples(&[0.0; ACTIVITY_WINDOW_SAMPLES * 2]);

        let snapshot = meter.snapshot();
        assert_eq!(snapshot.rms, 0.0);
        assert_eq!(snapshot.peak, 0.0);
        assert!(snapshot.level < 0.001);
    }

    #[test]
    fn test_activity_meter_loud_signal() {
        let meter = SharedActivityMeter::new();
        // Full-scale square wave sits well above the decibel ceiling.
        for _ in 0..8 {
            meter.push_samples(&[1.0; ACTIVITY_WINDOW_SAMPLES]);
        }

        let snapshot = meter.snapshot();
        assert!(snapshot.rms > 0.9);
        assert!((snapshot.peak - 1.0).abs() < f32::EPSILON);
        assert!(snapshot.level > 0.5, "smoothing should converge upward");
    }

    #[test]
    fn test_activity_meter_partial_window_pending() {
        let meter = SharedActivityMeter::new();
        // Less than one analysis window: no snapshot update yet.
        meter.push_samples(&[0.5; ACTIVITY_WINDOW_SAMPLES - 1]);
        let snapshot = meter.snapshot();
        assert_eq!(snapshot.peak, 0.0);
    }

    #[test]
    fn test_error_permission_mapping() {
        assert_eq!(
            MicrophoneError::Denied.permission_after_failure(),
            PermissionState::Denied
        );
        assert_eq!(
            MicrophoneError::Unsupported.permission_after_failure(),
            PermissionState::Denied
        );
        assert_eq!(
            MicrophoneError::DeviceBusy.permission_after_failure(),
            PermissionState::Error
        );
        assert_eq!(
            MicrophoneError::DeviceNotFound.permission_after_failure(),
            PermissionState::Error
        );
    }

    #[test]
    fn test_denial_detection() {
        assert!(looks_like_denial("Access denied by user"));
        assert!(looks_like_denial("Operation not permitted"));
        assert!(!looks_like_denial("device disconnected"));
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let errors = [
            MicrophoneError::Denied,
            MicrophoneError::DeviceNotFound,
            MicrophoneError::DeviceBusy,
            MicrophoneError::ConstraintUnsatisfiable("x".to_string()),
            MicrophoneError::Unsupported,
            MicrophoneError::Unknown("x".to_string()),
        ];

        let mut messages: Vec<&str> = errors.iter().map(|e| e.user_message()).collect();
        messages.sort_unstable();
        messages.dedup();
        assert_eq!(messages.len(), errors.len());
    }

    #[test]
    fn test_release_all_is_idempotent() {
        let mut manager = MicrophoneManager::new();
        manager.release_all();
        manager.release_all();
        assert!(!manager.has_live_bundle());
        assert_eq!(manager.permission(), PermissionState::Prompt);
    }

    /// Backend double: opens succeed unless a failure is scripted, and live
    /// sessions are counted so the one-bundle invariant is observable.
    #[derive(Clone)]
    struct ScriptedBackend {
        default_device: String,
        fail_next: Arc<StdMutex<Option<MicrophoneError>>>,
        opens: Arc<AtomicUsize>,
        live: Arc<AtomicUsize>,
    }

    impl ScriptedBackend {
        fn new(default_device: &str) -> Self {
            Self {
                default_device: default_device.to_string(),
                fail_next: Arc::new(StdMutex::new(None)),
                opens: Arc::new(AtomicUsize::new(0)),
                live: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn fail_next_open(&self, error: MicrophoneError) {
            *self.fail_next.lock().unwrap() = Some(error);
        }

        fn opens(&self) -> usize {
            self.opens.load(Ordering::SeqCst)
        }

        fn live_sessions(&self) -> usize {
            self.live.load(Ordering::SeqCst)
        }
    }

    struct ScriptedSession {
        live: Arc<AtomicUsize>,
    }

    impl CaptureSession for ScriptedSession {}

    impl Drop for ScriptedSession {
        fn drop(&mut self) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl CaptureBackend for ScriptedBackend {
        fn resolve_device_name(&self, preferred: Option<&str>) -> Result<String, MicrophoneError> {
            Ok(preferred.unwrap_or(&self.default_device).to_string())
        }

        async fn open_capture(
            &self,
            _preferred: Option<&str>,
            _meter: SharedActivityMeter,
        ) -> Result<Box<dyn CaptureSession>, MicrophoneError> {
            if let Some(error) = self.fail_next.lock().unwrap().take() {
                return Err(error);
            }
            self.opens.fetch_add(1, Ordering::SeqCst);
            self.live.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(ScriptedSession {
                live: self.live.clone(),
            }))
        }
    }

    fn scripted_manager() -> (MicrophoneManager, ScriptedBackend) {
        let backend = ScriptedBackend::new("built-in mic");
        let manager = MicrophoneManager::with_backend(Box::new(backend.clone()));
        (manager, backend)
    }

    #[tokio::test]
    async fn test_at_most_one_bundle_across_reacquisitions() {
        let (mut manager, backend) = scripted_manager();

        manager
            .request_permission_and_acquire(false)
            .await
            .expect("first acquire");
        assert!(manager.has_live_bundle());
        assert_eq!(backend.live_sessions(), 1);

        // A second acquisition must tear down the first session first.
        manager
            .request_permission_and_acquire(false)
            .await
            .expect("second acquire");
        assert_eq!(backend.opens(), 2);
        assert_eq!(backend.live_sessions(), 1, "old session must be released");
        assert_eq!(manager.permission(), PermissionState::Granted);
    }

    #[tokio::test]
    async fn test_failed_acquisition_leaves_no_resources() {
        let (mut manager, backend) = scripted_manager();

        manager
            .request_permission_and_acquire(false)
            .await
            .expect("acquire");
        assert_eq!(backend.live_sessions(), 1);

        backend.fail_next_open(MicrophoneError::DeviceBusy);
        let result = manager.request_permission_and_acquire(true).await;
        assert!(matches!(result, Err(MicrophoneError::DeviceBusy)));
        assert!(!manager.has_live_bundle());
        assert_eq!(backend.live_sessions(), 0, "failure must release everything");
        assert_eq!(manager.permission(), PermissionState::Error);
    }

    #[tokio::test]
    async fn test_denied_acquisition_sets_denied_permission() {
        let (mut manager, backend) = scripted_manager();

        backend.fail_next_open(MicrophoneError::Denied);
        let result = manager.request_permission_and_acquire(false).await;
        assert!(matches!(result, Err(MicrophoneError::Denied)));
        assert!(!manager.has_live_bundle());
        assert_eq!(manager.permission(), PermissionState::Denied);

        // Denied is terminal for the passive path.
        assert!(!manager.ensure_access().await);
        assert_eq!(backend.opens(), 0);
    }

    #[tokio::test]
    async fn test_ensure_access_reacquires_on_device_change() {
        let (mut manager, backend) = scripted_manager();

        manager
            .request_permission_and_acquire(false)
            .await
            .expect("acquire");
        assert_eq!(manager.active_device_name(), Some("built-in mic"));

        // Same selection: no rebuild.
        assert!(manager.ensure_access().await);
        assert_eq!(backend.opens(), 1);

        manager.set_preferred_device(Some("usb mic".to_string()));
        assert!(manager.ensure_access().await);
        assert_eq!(backend.opens(), 2);
        assert_eq!(backend.live_sessions(), 1);
        assert_eq!(manager.active_device_name(), Some("usb mic"));
    }

    #[tokio::test]
    async fn test_release_all_drops_live_session() {
        let (mut manager, backend) = scripted_manager();

        manager
            .request_permission_and_acquire(false)
            .await
            .expect("acquire");
        assert_eq!(backend.live_sessions(), 1);

        manager.release_all();
        assert!(!manager.has_live_bundle());
        assert_eq!(backend.live_sessions(), 0);
        // Permission survives a release; only acquisition failures change it.
        assert_eq!(manager.permission(), PermissionState::Granted);
    }
}
