//! Notification seam for user-facing messages.
//!
//! The surrounding UI owns toast rendering; this crate only needs a
//! fire-and-forget sink. Failure to deliver a notification is never fatal.

/// Fire-and-forget sink for user-facing messages.
pub trait Notifier: Send + Sync {
    /// Informational message (e.g., "listening resumed")
    fn info(&self, message: &str);

    /// Error message with an actionable description
    fn error(&self, message: &str);
}

/// Default notifier that forwards messages to the log.
///
/// Useful for headless operation and tests; real deployments supply a
/// toast-backed implementation.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn info(&self, message: &str) {
        log::info!("Notify: {}", message);
    }

    fn error(&self, message: &str) {
        log::warn!("Notify (error): {}", message);
    }
}
