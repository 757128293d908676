//! Transient user notifications ("toasts").
//!
//! DESIGN
//! ======
//! Components never print. They push toasts into an injected [`Notifier`]
//! so the terminal front end can render them and tests can assert on them.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use std::sync::Mutex;

/// Severity of a toast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single user-visible notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// Sink for user-visible notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);

    fn info(&self, message: &str) {
        self.notify(Toast { level: ToastLevel::Info, message: message.to_owned() });
    }

    fn success(&self, message: &str) {
        self.notify(Toast { level: ToastLevel::Success, message: message.to_owned() });
    }

    fn warning(&self, message: &str) {
        self.notify(Toast { level: ToastLevel::Warning, message: message.to_owned() });
    }

    fn error(&self, message: &str) {
        self.notify(Toast { level: ToastLevel::Error, message: message.to_owned() });
    }
}

/// Forwards toasts to `tracing`. Used when no UI is attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Info | ToastLevel::Success => tracing::info!(message = %toast.message, "toast"),
            ToastLevel::Warning => tracing::warn!(message = %toast.message, "toast"),
            ToastLevel::Error => tracing::error!(message = %toast.message, "toast"),
        }
    }
}

/// Buffers toasts until drained.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every buffered toast.
    pub fn drain(&self) -> Vec<Toast> {
        match self.toasts.lock() {
            Ok(mut toasts) => std::mem::take(&mut *toasts),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    /// Copy of the buffered toasts at `level`.
    #[must_use]
    pub fn of_level(&self, level: ToastLevel) -> Vec<Toast> {
        let toasts = match self.toasts.lock() {
            Ok(toasts) => toasts,
            Err(poisoned) => poisoned.into_inner(),
        };
        toasts.iter().filter(|t| t.level == level).cloned().collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        tracing::debug!(level = ?toast.level, message = %toast.message, "toast recorded");
        match self.toasts.lock() {
            Ok(mut toasts) => toasts.push(toast),
            Err(poisoned) => poisoned.into_inner().push(toast),
        }
    }
}
