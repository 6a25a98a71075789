//! Weekly recurrence expansion for the planner.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{PlannerRow, PublicationState};
use crate::planner::FlyerStatus;

pub const MIN_WEEKS: u32 = 1;
pub const MAX_WEEKS: u32 = 52;

/// Template for a run of weekly dates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecurrenceRequest {
    pub fecha_base: Option<NaiveDate>,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    #[serde(default)]
    pub estado_publicacion: PublicationState,
    pub notas: Option<String>,
    pub flyer_general: Option<String>,
    #[serde(default = "default_weeks")]
    pub weeks: u32,
}

fn default_weeks() -> u32 {
    4
}

impl RecurrenceRequest {
    pub fn weekly(fecha_base: NaiveDate, weeks: u32) -> Self {
        Self {
            fecha_base: Some(fecha_base),
            weeks,
            ..Self::default()
        }
    }

    pub fn clamped_weeks(&self) -> u32 {
        self.weeks.clamp(MIN_WEEKS, MAX_WEEKS)
    }
}

/// Expand `req` into one row per week starting at the base date.
///
/// Every row copies the time template, publication state and notes. Rows start
/// selected; when a general flyer is given they start with the flyer attached.
pub fn generate_weekly_rows(req: &RecurrenceRequest) -> Result<Vec<PlannerRow>, AppError> {
    let base = req.fecha_base.ok_or(AppError::MissingBaseDate)?;
    let flyer = req
        .flyer_general
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty());

    let mut rows = Vec::with_capacity(req.clamped_weeks() as usize);
    for week in 0..req.clamped_weeks() {
        let fecha = base
            .checked_add_days(Days::new(7 * u64::from(week)))
            .ok_or_else(|| AppError::BadRequest(format!("{} weeks from {} is out of range", week, base)))?;
        let mut row = PlannerRow::new(fecha.format("%Y-%m-%d").to_string())
            .with_times(req.hora_inicio.as_deref(), req.hora_fin.as_deref());
        row.estado_publicacion = req.estado_publicacion;
        row.notas = req.notas.clone();
        if let Some(url) = flyer {
            row.flyer_status = FlyerStatus::Done;
            row.flyer_url = Some(url.to_string());
        }
        rows.push(row);
    }

    Ok(rows)
}
