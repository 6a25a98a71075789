use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A human-readable message for the person using the planner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Receives user-facing notices. Purely informational.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: String);

    fn info(&self, message: String) {
        self.notify(NoticeLevel::Info, message);
    }

    fn success(&self, message: String) {
        self.notify(NoticeLevel::Success, message);
    }

    fn warning(&self, message: String) {
        self.notify(NoticeLevel::Warning, message);
    }

    fn error(&self, message: String) {
        self.notify(NoticeLevel::Error, message);
    }
}

/// Writes notices to the log only.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: String) {
        log_notice(level, &message);
    }
}

/// Keeps notices until they are drained, for the HTTP layer and tests.
#[derive(Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, level: NoticeLevel, message: String) {
        log_notice(level, &message);
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notice { level, message });
    }
}

fn log_notice(level: NoticeLevel, message: &str) {
    match level {
        NoticeLevel::Info | NoticeLevel::Success => info!("notice: {}", message),
        NoticeLevel::Warning => warn!("notice: {}", message),
        NoticeLevel::Error => error!("notice: {}", message),
    }
}

/// Tell the user why a planner action was refused or failed.
pub fn notify_failure(notifier: &dyn Notifier, err: &AppError) {
    let message = match err {
        AppError::MissingBaseDate => "Pick a base date before generating dates".to_string(),
        AppError::EmptySelection => "Select at least one row".to_string(),
        AppError::ValidationFailed(n) => format!("Fix the errors in {} row(s) before creating dates", n),
        AppError::SubmitInProgress => "Dates are already being created, please wait".to_string(),
        AppError::NoCreatedRows => "There are no created dates to update".to_string(),
        AppError::InvalidFlyerTransition { .. } => "The flyer cannot change to that state".to_string(),
        AppError::RowNotFound(_) => "That row is no longer in the planner".to_string(),
        other => format!("Something went wrong: {}", other),
    };
    match err {
        AppError::EmptySelection | AppError::MissingBaseDate | AppError::NoCreatedRows => {
            notifier.warning(message)
        }
        _ => notifier.error(message),
    }
}
