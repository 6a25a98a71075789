use std::sync::Arc;

use tracing::{error, info, warn};

use crate::cache::{QueryCache, QueryFamily};
use crate::error::AppError;
use crate::planner::{
    CompositeKeyMatcher, MatchOutcome, PlannerSession, RecordMatcher, SubmitReport, SubmitTicket,
};
use crate::services::notifier::{Notifier, notify_failure};
use crate::store::DateStore;

/// Persists the selected planner rows in one batch and maps the created
/// records back onto them.
///
/// A submit runs in three phases so the session does not need to be borrowed
/// across the remote call: [`prepare`](Self::prepare) validates and marks the
/// session busy, [`persist`](Self::persist) performs the batch create and the
/// matching, [`finish`](Self::finish) merges the result. [`submit`](Self::submit)
/// chains the three for callers that own the session outright.
pub struct BatchReconciler {
    store: Arc<dyn DateStore>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
    matcher: Arc<dyn RecordMatcher>,
}

impl BatchReconciler {
    pub fn new(store: Arc<dyn DateStore>, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            cache,
            notifier,
            matcher: Arc::new(CompositeKeyMatcher),
        }
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn RecordMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn prepare(&self, session: &mut PlannerSession) -> Result<SubmitTicket, AppError> {
        session.begin_submit().inspect_err(|e| {
            warn!("batch submit refused: {}", e);
            notify_failure(self.notifier.as_ref(), e);
        })
    }

    pub async fn persist(&self, ticket: &SubmitTicket) -> Result<MatchOutcome, AppError> {
        let payloads: Vec<_> = ticket.rows().iter().map(|r| r.payload.clone()).collect();
        info!("creating {} dates in one batch (ticket {})", payloads.len(), ticket.id());

        let records = self.store.create_dates(&payloads).await?;
        if records.len() < payloads.len() {
            warn!(
                "store returned {} of {} created dates",
                records.len(),
                payloads.len()
            );
        }

        Ok(self.matcher.match_records(ticket.rows(), records))
    }

    pub fn finish(
        &self,
        session: &mut PlannerSession,
        ticket: SubmitTicket,
        result: Result<MatchOutcome, AppError>,
    ) -> Result<SubmitReport, AppError> {
        let report = match session.complete_submit(ticket, result) {
            Ok(report) => report,
            Err(e) => {
                error!("batch submit failed: {}", e);
                self.notifier.error(format!("Could not create the dates: {}", e));
                return Err(e);
            }
        };

        for family in QueryFamily::DATE_AGGREGATES {
            self.cache.invalidate_family(family);
        }

        info!(
            "batch submit mapped {} of {} rows",
            report.mapped.len(),
            report.requested
        );
        if !report.orphaned_record_ids.is_empty() {
            warn!("created dates with no matching row: {:?}", report.orphaned_record_ids);
        }

        if report.is_complete() {
            self.notifier.success(format!("Created {} date(s)", report.mapped.len()));
        } else {
            self.notifier.warning(format!(
                "Created {} of {} date(s); {} row(s) were not confirmed and stay selected",
                report.mapped.len(),
                report.requested,
                report.unmapped_rows.len()
            ));
        }

        Ok(report)
    }

    /// Precondition: the caller does not start a second submit for the same
    /// session while one is running; the session refuses it if it happens.
    pub async fn submit(&self, session: &mut PlannerSession) -> Result<SubmitReport, AppError> {
        let ticket = self.prepare(session)?;
        let result = self.persist(&ticket).await;
        self.finish(session, ticket, result)
    }
}
