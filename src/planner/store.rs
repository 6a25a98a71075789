use serde::Serialize;

use crate::error::AppError;
use crate::models::{PlannerRow, RowPatch};
use crate::planner::{FlyerReport, FlyerStatus};

/// Ordered collection of planner rows owned by one planner session.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PlannerRowStore {
    rows: Vec<PlannerRow>,
}

impl PlannerRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[PlannerRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PlannerRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut PlannerRow, AppError> {
        self.rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::RowNotFound(id.to_string()))
    }

    pub fn selected(&self) -> impl Iterator<Item = &PlannerRow> {
        self.rows.iter().filter(|r| r.selected)
    }

    pub fn add_row(&mut self, row: PlannerRow) -> &PlannerRow {
        self.rows.push(row);
        &self.rows[self.rows.len() - 1]
    }

    /// Append rows after the existing ones; never replaces what is there.
    pub fn append(&mut self, rows: impl IntoIterator<Item = PlannerRow>) -> usize {
        let before = self.rows.len();
        self.rows.extend(rows);
        self.rows.len() - before
    }

    pub fn update_row(&mut self, id: &str, patch: RowPatch) -> Result<&PlannerRow, AppError> {
        let row = self.get_mut(id)?;
        patch.apply_to(row);
        Ok(row)
    }

    pub fn remove_row(&mut self, id: &str) -> Result<PlannerRow, AppError> {
        let index = self
            .rows
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AppError::RowNotFound(id.to_string()))?;
        Ok(self.rows.remove(index))
    }

    pub fn set_selected(&mut self, id: &str, selected: bool) -> Result<(), AppError> {
        self.get_mut(id)?.selected = selected;
        Ok(())
    }

    pub fn set_all_selected(&mut self, selected: bool) {
        for row in &mut self.rows {
            row.selected = selected;
        }
    }

    /// Feed an upload collaborator report through the flyer lifecycle.
    pub fn report_flyer(&mut self, id: &str, report: &FlyerReport) -> Result<&PlannerRow, AppError> {
        let row = self.get_mut(id)?;
        row.flyer_status = row.flyer_status.next(report)?;
        match report {
            FlyerReport::Done { url } => row.flyer_url = Some(url.clone()),
            FlyerReport::Pending => row.flyer_url = None,
            FlyerReport::Uploading | FlyerReport::Error { .. } => {}
        }
        Ok(row)
    }

    /// Attach an already-uploaded flyer without going through `UPLOADING`.
    /// Only the bulk general-flyer paths use this.
    pub(crate) fn attach_flyer(&mut self, id: &str, url: &str) -> Result<(), AppError> {
        let row = self.get_mut(id)?;
        row.flyer_status = FlyerStatus::Done;
        row.flyer_url = Some(url.to_string());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
