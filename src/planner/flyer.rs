//! Flyer lifecycle of a planner row.
//!
//! The upload itself happens elsewhere; the collaborator reports progress with
//! [`FlyerReport`] and the row keeps the resulting [`FlyerStatus`]. Within one
//! attempt the status only moves forward (`PENDING -> UPLOADING -> DONE|ERROR`).
//! A failed or finished attempt is restarted by clearing back to `PENDING`.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlyerStatus {
    #[default]
    Pending,
    Uploading,
    Done,
    Error,
}

/// Status report from the upload collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum FlyerReport {
    Uploading,
    Done { url: String },
    Error { message: Option<String> },
    /// Explicit clear, also used to reset after an error.
    Pending,
}

impl FlyerReport {
    pub fn target_status(&self) -> FlyerStatus {
        match self {
            FlyerReport::Uploading => FlyerStatus::Uploading,
            FlyerReport::Done { .. } => FlyerStatus::Done,
            FlyerReport::Error { .. } => FlyerStatus::Error,
            FlyerReport::Pending => FlyerStatus::Pending,
        }
    }
}

impl FlyerStatus {
    /// Next status for a collaborator report, or an error if the report would
    /// skip a step of the lifecycle.
    pub fn next(self, report: &FlyerReport) -> Result<FlyerStatus, AppError> {
        let to = report.target_status();
        let allowed = match (self, to) {
            (_, FlyerStatus::Pending) => true,
            (FlyerStatus::Pending, FlyerStatus::Uploading) => true,
            // repeated progress reports for the same attempt
            (FlyerStatus::Uploading, FlyerStatus::Uploading) => true,
            (FlyerStatus::Uploading, FlyerStatus::Done) => true,
            (FlyerStatus::Uploading, FlyerStatus::Error) => true,
            _ => false,
        };

        if allowed {
            Ok(to)
        } else {
            Err(AppError::InvalidFlyerTransition { from: self, to })
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self, FlyerStatus::Done)
    }
}

/// What the upload collaborator needs to know about a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlyerTarget {
    pub row_id: String,
    /// Persisted date id once the row has been created remotely.
    pub persisted_id: Option<String>,
    pub current_url: Option<String>,
    pub status: FlyerStatus,
}
