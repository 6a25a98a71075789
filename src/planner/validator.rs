use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::PlannerRow;

pub const REQUIRED: &str = "required";
pub const INVALID: &str = "invalid";

/// Field name -> message for one row.
pub type FieldErrors = BTreeMap<String, String>;

/// Row id -> field errors. Rebuilt from scratch on every validation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(HashMap<String, FieldErrors>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn for_row(&self, row_id: &str) -> Option<&FieldErrors> {
        self.0.get(row_id)
    }

    pub fn row_ids(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

/// Validate the selected rows. Unselected rows are drafts and never block.
///
/// Duplicate dates across rows are allowed: an organizer can run two sessions
/// on the same day.
pub fn validate_rows(rows: &[PlannerRow]) -> ValidationErrors {
    let mut errors = HashMap::new();

    for row in rows.iter().filter(|r| r.selected) {
        let mut fields = FieldErrors::new();

        if row.fecha.trim().is_empty() {
            fields.insert("fecha".to_string(), REQUIRED.to_string());
        }
        if let Some(hora_fin) = &row.hora_fin {
            if hora_fin.chars().count() < 4 {
                fields.insert("hora_fin".to_string(), INVALID.to_string());
            }
        }

        if !fields.is_empty() {
            errors.insert(row.id.clone(), fields);
        }
    }

    ValidationErrors(errors)
}
