use serde::{Deserialize, Serialize};

use crate::models::{NewDatePayload, PlannerRow, PublicationState};

/// One entry of a date's schedule (class, social, show...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub tipo: String,
    pub titulo: String,
    pub inicio: Option<String>,
    pub fin: Option<String>,
    pub ritmo: Option<i64>,
}

/// One entry of a date's price list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceItem {
    pub nombre: String,
    pub tipo: String,
    pub precio: Option<f64>,
    pub regla: Option<String>,
}

/// A venue picked from the organizer's saved venues.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueRef {
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    pub ciudad: Option<String>,
}

/// Fields shared by every date created from one planner session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateTemplate {
    pub nombre: Option<String>,
    pub biografia: Option<String>,
    pub venue: Option<VenueRef>,
    pub lugar: Option<String>,
    pub direccion: Option<String>,
    pub ciudad: Option<String>,
    pub referencias: Option<String>,
    pub requisitos: Option<String>,
    #[serde(default)]
    pub ritmos: Vec<i64>,
    #[serde(default)]
    pub zonas: Vec<i64>,
    #[serde(default)]
    pub cronograma: Vec<ScheduleItem>,
    #[serde(default)]
    pub costos: Vec<PriceItem>,
    pub parent_id: Option<String>,
    pub organizer_id: Option<String>,
    pub flyer_general: Option<String>,
    #[serde(default)]
    pub estado_publicacion: PublicationState,
}

impl DateTemplate {
    /// Venue name: the selected venue wins over the free-text field.
    pub fn resolved_lugar(&self) -> Option<String> {
        self.venue
            .as_ref()
            .and_then(|v| present(&v.nombre))
            .or_else(|| present(&self.lugar))
    }

    pub fn resolved_direccion(&self) -> Option<String> {
        self.venue
            .as_ref()
            .and_then(|v| present(&v.direccion))
            .or_else(|| present(&self.direccion))
    }

    pub fn resolved_ciudad(&self) -> Option<String> {
        self.venue
            .as_ref()
            .and_then(|v| present(&v.ciudad))
            .or_else(|| present(&self.ciudad))
    }

    pub fn general_flyer(&self) -> Option<String> {
        present(&self.flyer_general)
    }

    /// Insert payload for one row. Batch-created dates are always drafts,
    /// whatever the template's own publication flag says.
    pub fn to_payload(&self, row: &PlannerRow) -> NewDatePayload {
        NewDatePayload {
            nombre: present(&self.nombre),
            biografia: present(&self.biografia),
            lugar: self.resolved_lugar(),
            direccion: self.resolved_direccion(),
            ciudad: self.resolved_ciudad(),
            referencias: present(&self.referencias),
            requisitos: present(&self.requisitos),
            ritmos: self.ritmos.clone(),
            zonas: self.zonas.clone(),
            cronograma: self.cronograma.clone(),
            costos: self.costos.clone(),
            parent_id: present(&self.parent_id),
            organizer_id: present(&self.organizer_id),
            fecha: row.fecha.trim().to_string(),
            hora_inicio: row.hora_inicio.clone(),
            hora_fin: row.hora_fin.clone(),
            flyer_url: self.general_flyer(),
            estado_publicacion: PublicationState::Draft,
        }
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
