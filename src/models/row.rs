use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::PublicationState;
use crate::planner::FlyerStatus;

/// A candidate event date authored in the planner. Never persisted as-is;
/// `id` is local and is not sent to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerRow {
    pub id: String,
    pub fecha: String,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    pub estado_publicacion: PublicationState,
    pub notas: Option<String>,
    pub selected: bool,
    pub flyer_status: FlyerStatus,
    pub flyer_url: Option<String>,
}

impl PlannerRow {
    pub fn new(fecha: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            fecha: fecha.into(),
            hora_inicio: None,
            hora_fin: None,
            estado_publicacion: PublicationState::Draft,
            notas: None,
            selected: true,
            flyer_status: FlyerStatus::Pending,
            flyer_url: None,
        }
    }

    pub fn with_times(mut self, hora_inicio: Option<&str>, hora_fin: Option<&str>) -> Self {
        self.hora_inicio = non_empty(hora_inicio.map(str::to_string));
        self.hora_fin = non_empty(hora_fin.map(str::to_string));
        self
    }
}

/// Row fields supplied by the user when adding a row by hand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRowRequest {
    #[serde(default)]
    pub fecha: String,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    pub notas: Option<String>,
    #[serde(default)]
    pub estado_publicacion: PublicationState,
}

impl From<NewRowRequest> for PlannerRow {
    fn from(req: NewRowRequest) -> Self {
        let mut row = PlannerRow::new(req.fecha);
        row.hora_inicio = non_empty(req.hora_inicio);
        row.hora_fin = non_empty(req.hora_fin);
        row.notas = non_empty(req.notas);
        row.estado_publicacion = req.estado_publicacion;
        row
    }
}

/// Edit of a planner row. For optional fields an empty string clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowPatch {
    pub fecha: Option<String>,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    pub notas: Option<String>,
    pub estado_publicacion: Option<PublicationState>,
    pub selected: Option<bool>,
}

impl RowPatch {
    pub fn apply_to(self, row: &mut PlannerRow) {
        if let Some(fecha) = self.fecha {
            row.fecha = fecha.trim().to_string();
        }
        if let Some(hora_inicio) = self.hora_inicio {
            row.hora_inicio = non_empty(Some(hora_inicio));
        }
        if let Some(hora_fin) = self.hora_fin {
            row.hora_fin = non_empty(Some(hora_fin));
        }
        if let Some(notas) = self.notas {
            row.notas = non_empty(Some(notas));
        }
        if let Some(estado) = self.estado_publicacion {
            row.estado_publicacion = estado;
        }
        if let Some(selected) = self.selected {
            row.selected = selected;
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
