use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{info, warn};

use crate::cache::{QueryCache, QueryFamily, QueryKey};
use crate::error::AppError;
use crate::models::DatePatch;
use crate::planner::{MappedTarget, PlannerSession};
use crate::services::notifier::{Notifier, notify_failure};
use crate::store::DateStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkPatchReport {
    /// Row ids whose persisted date accepted the patch.
    pub patched: Vec<String>,
    /// Row ids whose persisted date rejected it.
    pub failed: Vec<String>,
}

/// Applies one patch to every created date of a planner.
pub struct BulkPatcher {
    store: Arc<dyn DateStore>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl BulkPatcher {
    pub fn new(store: Arc<dyn DateStore>, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            cache,
            notifier,
        }
    }

    /// Patch each target in turn. A rejected record does not stop the others.
    pub async fn patch_targets(
        &self,
        targets: &[MappedTarget],
        patch: &DatePatch,
    ) -> Result<BulkPatchReport, AppError> {
        if targets.is_empty() {
            notify_failure(self.notifier.as_ref(), &AppError::NoCreatedRows);
            return Err(AppError::NoCreatedRows);
        }

        let mut report = BulkPatchReport::default();
        for target in targets {
            match self.store.update_date(&target.persisted_id, patch).await {
                Ok(_) => {
                    self.cache.invalidate(&QueryKey::date(&target.persisted_id));
                    report.patched.push(target.row_id.clone());
                }
                Err(e) => {
                    warn!("failed to patch date {}: {}", target.persisted_id, e);
                    report.failed.push(target.row_id.clone());
                }
            }
        }

        for family in QueryFamily::DATE_AGGREGATES {
            self.cache.invalidate_family(family);
        }

        info!(
            "bulk patch applied to {} of {} dates",
            report.patched.len(),
            targets.len()
        );
        if report.failed.is_empty() {
            self.notifier
                .success(format!("Updated {} date(s)", report.patched.len()));
        } else {
            self.notifier.warning(format!(
                "Updated {} date(s); {} could not be updated",
                report.patched.len(),
                report.failed.len()
            ));
        }

        Ok(report)
    }

    /// Write the general flyer to every created date and mark those rows
    /// `DONE`. The rows do not pass through `UPLOADING`: the asset already
    /// exists. Without an explicit `url` the template's flyer is used.
    ///
    /// The session lock is only taken to read targets and to record the
    /// result, never across the store calls.
    pub async fn apply_general_flyer(
        &self,
        session: &Mutex<PlannerSession>,
        url: Option<String>,
    ) -> Result<BulkPatchReport, AppError> {
        let (url, targets) = {
            let session = lock(session);
            (
                url.or_else(|| session.template().general_flyer()),
                session.mapped_targets(),
            )
        };
        let url = url.ok_or_else(|| AppError::BadRequest("no general flyer to apply".to_string()))?;

        let report = self.patch_targets(&targets, &DatePatch::flyer(&url)).await?;
        lock(session).mark_flyer_applied(&report.patched, &url);
        Ok(report)
    }

    pub async fn publish_created(
        &self,
        session: &Mutex<PlannerSession>,
    ) -> Result<BulkPatchReport, AppError> {
        let targets = lock(session).mapped_targets();
        let report = self.patch_targets(&targets, &DatePatch::publish()).await?;
        lock(session).mark_published(&report.patched);
        Ok(report)
    }
}

fn lock(session: &Mutex<PlannerSession>) -> MutexGuard<'_, PlannerSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}
