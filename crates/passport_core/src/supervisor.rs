//! Failure isolation for optional subsystems.
//!
//! # Responsibility
//! - Run an optional feature and substitute a fallback when it fails.
//! - Keep one failing feature from taking down the surrounding view.
//!
//! # Invariants
//! - Both `Err` results and panics inside the attempt are contained.
//! - Every contained failure is logged once with its subsystem name.

use crate::logging::sanitize_message;
use log::error;
use std::any::Any;
use std::fmt::{Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};

const MAX_FAILURE_CHARS: usize = 160;

/// Subsystem name of the notification settings panel.
pub const NOTIFICATION_SETTINGS_SUBSYSTEM: &str = "notification_settings";
/// Fallback text shown when the notification settings panel fails.
pub const NOTIFICATION_SETTINGS_FALLBACK_TEXT: &str = "Notification settings are not enabled. \
Please enable at least one channel and kind in the collaboration service dashboard.";

/// Why a supervised subsystem fell back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubsystemFailure {
    Failed(String),
    Panicked(String),
}

impl Display for SubsystemFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed(message) => write!(f, "subsystem failed: {message}"),
            Self::Panicked(message) => write!(f, "subsystem panicked: {message}"),
        }
    }
}

impl std::error::Error for SubsystemFailure {}

/// Result of a supervised run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Supervised<T> {
    Ready(T),
    Fallback {
        subsystem: String,
        failure: SubsystemFailure,
        value: T,
    },
}

impl<T> Supervised<T> {
    /// Returns the produced value, whichever branch produced it.
    pub fn into_value(self) -> T {
        match self {
            Self::Ready(value) | Self::Fallback { value, .. } => value,
        }
    }
}

/// Runs `attempt` for `subsystem`, falling back on error or panic.
pub fn supervise<T, E, A, F>(subsystem: &str, attempt: A, fallback: F) -> Supervised<T>
where
    E: Display,
    A: FnOnce() -> Result<T, E>,
    F: FnOnce(&SubsystemFailure) -> T,
{
    let failure = match catch_unwind(AssertUnwindSafe(attempt)) {
        Ok(Ok(value)) => return Supervised::Ready(value),
        Ok(Err(err)) => {
            SubsystemFailure::Failed(sanitize_message(&err.to_string(), MAX_FAILURE_CHARS))
        }
        Err(payload) => SubsystemFailure::Panicked(panic_message(&*payload)),
    };

    error!(
        "event=subsystem_failed module=supervisor status=error subsystem={} failure={}",
        subsystem, failure
    );
    let value = fallback(&failure);
    Supervised::Fallback {
        subsystem: subsystem.to_string(),
        failure,
        value,
    }
}

/// Fallback content for the notification settings panel.
pub fn notification_settings_fallback(_failure: &SubsystemFailure) -> String {
    NOTIFICATION_SETTINGS_FALLBACK_TEXT.to_string()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };
    sanitize_message(&message, MAX_FAILURE_CHARS)
}
