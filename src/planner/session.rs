use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::{DateTemplate, PlannerRow, PublicationState, RowPatch};
use crate::planner::legacy::{LegacyEventFields, prefill_template};
use crate::planner::matching::{MatchOutcome, SubmittedRow};
use crate::planner::recurrence::{RecurrenceRequest, generate_weekly_rows};
use crate::planner::validator::{ValidationErrors, validate_rows};
use crate::planner::{FlyerReport, FlyerTarget, PlannerRowStore};

/// Rows that were sent in one batch. Holding a ticket means the session is
/// busy; it is handed back through [`PlannerSession::complete_submit`].
#[derive(Debug)]
pub struct SubmitTicket {
    id: u64,
    rows: Vec<SubmittedRow>,
}

impl SubmitTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn rows(&self) -> &[SubmittedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Outcome of one batch submit as seen by the planner.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubmitReport {
    pub requested: usize,
    pub returned: usize,
    /// Row id -> persisted id, newly added by this submit.
    pub mapped: BTreeMap<String, String>,
    pub unmapped_rows: Vec<String>,
    pub orphaned_record_ids: Vec<String>,
}

impl SubmitReport {
    pub fn is_complete(&self) -> bool {
        self.unmapped_rows.is_empty()
    }
}

/// A created row paired with its persisted id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedTarget {
    pub row_id: String,
    pub persisted_id: String,
}

/// State of one planner: the shared template, the candidate rows, the last
/// validation pass and what has been created so far.
#[derive(Debug, Default)]
pub struct PlannerSession {
    template: DateTemplate,
    rows: PlannerRowStore,
    errors: ValidationErrors,
    mapping: BTreeMap<String, String>,
    in_flight: Option<u64>,
    next_ticket: u64,
}

impl PlannerSession {
    pub fn new(template: DateTemplate) -> Self {
        Self {
            template,
            ..Self::default()
        }
    }

    pub fn template(&self) -> &DateTemplate {
        &self.template
    }

    pub fn set_template(&mut self, template: DateTemplate) {
        self.template = template;
    }

    pub fn prefill_from_legacy(&mut self, legacy: &LegacyEventFields) {
        prefill_template(&mut self.template, legacy);
    }

    pub fn rows(&self) -> &PlannerRowStore {
        &self.rows
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn mapping(&self) -> &BTreeMap<String, String> {
        &self.mapping
    }

    pub fn persisted_id(&self, row_id: &str) -> Option<&str> {
        self.mapping.get(row_id).map(String::as_str)
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn generate(&mut self, req: &RecurrenceRequest) -> Result<usize, AppError> {
        let rows = generate_weekly_rows(req)?;
        let added = self.rows.append(rows);
        debug!("generated {} weekly rows", added);
        Ok(added)
    }

    pub fn add_row(&mut self, row: PlannerRow) -> &PlannerRow {
        self.rows.add_row(row)
    }

    pub fn update_row(&mut self, id: &str, patch: RowPatch) -> Result<&PlannerRow, AppError> {
        self.rows.update_row(id, patch)
    }

    pub fn remove_row(&mut self, id: &str) -> Result<PlannerRow, AppError> {
        let removed = self.rows.remove_row(id)?;
        self.mapping.remove(id);
        Ok(removed)
    }

    pub fn set_selected(&mut self, id: &str, selected: bool) -> Result<(), AppError> {
        self.rows.set_selected(id, selected)
    }

    pub fn set_all_selected(&mut self, selected: bool) {
        self.rows.set_all_selected(selected);
    }

    pub fn report_flyer(&mut self, id: &str, report: &FlyerReport) -> Result<&PlannerRow, AppError> {
        self.rows.report_flyer(id, report)
    }

    pub fn flyer_target(&self, id: &str) -> Result<FlyerTarget, AppError> {
        let row = self
            .rows
            .get(id)
            .ok_or_else(|| AppError::RowNotFound(id.to_string()))?;
        Ok(FlyerTarget {
            row_id: row.id.clone(),
            persisted_id: self.mapping.get(id).cloned(),
            current_url: row.flyer_url.clone(),
            status: row.flyer_status,
        })
    }

    /// Drop every row, error and mapping. Refused while a submit is out.
    pub fn reset(&mut self) -> Result<(), AppError> {
        if self.in_flight.is_some() {
            return Err(AppError::SubmitInProgress);
        }
        self.rows.clear();
        self.errors = ValidationErrors::default();
        self.mapping.clear();
        Ok(())
    }

    /// Re-run validation over the selected rows, replacing the previous result.
    pub fn validate(&mut self) -> &ValidationErrors {
        self.errors = validate_rows(self.rows.rows());
        &self.errors
    }

    /// Gate a batch submit and mark the session busy.
    ///
    /// Validation runs first and must come back clean; then at least one
    /// selected row that has not been created yet must exist.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, AppError> {
        if self.in_flight.is_some() {
            return Err(AppError::SubmitInProgress);
        }

        let failing = self.validate().len();
        if failing > 0 {
            return Err(AppError::ValidationFailed(failing));
        }

        let rows: Vec<SubmittedRow> = self
            .rows
            .selected()
            .filter(|row| !self.mapping.contains_key(&row.id))
            .map(|row| SubmittedRow {
                row_id: row.id.clone(),
                payload: self.template.to_payload(row),
            })
            .collect();

        if rows.is_empty() {
            return Err(AppError::EmptySelection);
        }

        self.next_ticket += 1;
        self.in_flight = Some(self.next_ticket);
        Ok(SubmitTicket {
            id: self.next_ticket,
            rows,
        })
    }

    /// Hand a ticket back with the result of the batch call.
    ///
    /// On failure nothing but the busy flag changes. On success the new pairs
    /// are merged into the mapping: a row that is already mapped keeps its id,
    /// and an id that already belongs to another row is not reused.
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<MatchOutcome, AppError>,
    ) -> Result<SubmitReport, AppError> {
        if self.in_flight != Some(ticket.id) {
            return Err(AppError::Conflict(format!(
                "submit ticket {} is not the one in flight",
                ticket.id
            )));
        }
        self.in_flight = None;

        let outcome = result?;
        let mut report = SubmitReport {
            requested: ticket.rows.len(),
            returned: outcome.mapped.len() + outcome.orphaned_records.len(),
            unmapped_rows: outcome.unmapped_rows,
            orphaned_record_ids: outcome.orphaned_records.into_iter().map(|r| r.id).collect(),
            ..SubmitReport::default()
        };

        let mut taken: HashSet<String> = self.mapping.values().cloned().collect();
        let flyer = self.template.general_flyer();

        for mapped in outcome.mapped {
            if self.rows.get(&mapped.row_id).is_none() {
                warn!("row {} was removed during submit, record {} left unmapped", mapped.row_id, mapped.record.id);
                report.orphaned_record_ids.push(mapped.record.id);
                continue;
            }
            if self.mapping.contains_key(&mapped.row_id) {
                warn!("row {} already mapped, ignoring record {}", mapped.row_id, mapped.record.id);
                report.orphaned_record_ids.push(mapped.record.id);
                continue;
            }
            if !taken.insert(mapped.record.id.clone()) {
                warn!("record {} already mapped to another row", mapped.record.id);
                report.unmapped_rows.push(mapped.row_id);
                continue;
            }

            self.mapping.insert(mapped.row_id.clone(), mapped.record.id.clone());
            report.mapped.insert(mapped.row_id.clone(), mapped.record.id);

            // created rows leave the next batch
            self.rows.set_selected(&mapped.row_id, false).ok();
            if let Some(url) = &flyer {
                self.rows.attach_flyer(&mapped.row_id, url).ok();
            }
        }

        Ok(report)
    }

    /// Created rows, in row order. Unmapped rows are not part of bulk patches.
    pub fn mapped_targets(&self) -> Vec<MappedTarget> {
        self.rows
            .rows()
            .iter()
            .filter_map(|row| {
                self.mapping.get(&row.id).map(|persisted_id| MappedTarget {
                    row_id: row.id.clone(),
                    persisted_id: persisted_id.clone(),
                })
            })
            .collect()
    }

    /// Record that the general flyer now sits on these created rows.
    pub fn mark_flyer_applied(&mut self, row_ids: &[String], url: &str) {
        for id in row_ids {
            if let Err(e) = self.rows.attach_flyer(id, url) {
                debug!("flyer applied to a row no longer in the planner: {}", e);
            }
        }
    }

    pub fn mark_published(&mut self, row_ids: &[String]) {
        for id in row_ids {
            let patch = RowPatch {
                estado_publicacion: Some(PublicationState::Published),
                ..RowPatch::default()
            };
            if let Err(e) = self.rows.update_row(id, patch) {
                debug!("published a row no longer in the planner: {}", e);
            }
        }
    }
}
