use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{PriceItem, ScheduleItem};

/// Publication flag shared by planner rows and persisted dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublicationState {
    #[default]
    #[serde(rename = "borrador")]
    Draft,
    #[serde(rename = "publicado")]
    Published,
}

impl PublicationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationState::Draft => "borrador",
            PublicationState::Published => "publicado",
        }
    }
}

/// Insert payload for one date in a batch create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDatePayload {
    pub nombre: Option<String>,
    pub biografia: Option<String>,
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
    pub fecha: String,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    pub flyer_url: Option<String>,
    pub estado_publicacion: PublicationState,
}

/// A date row as stored by the remote store. Only `id` is authoritative for
/// reconciliation; the remaining fields are the stored values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CreatedDateRecord {
    pub id: String,
    pub fecha: String,
    #[serde(default)]
    pub hora_inicio: Option<String>,
    #[serde(default)]
    pub hora_fin: Option<String>,
    #[serde(default)]
    pub lugar: Option<String>,
    #[serde(default)]
    pub ciudad: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub organizer_id: Option<String>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub flyer_url: Option<String>,
    #[serde(default = "default_estado")]
    pub estado_publicacion: String,
}

fn default_estado() -> String {
    PublicationState::Draft.as_str().to_string()
}

/// Partial update for a persisted date. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hora_inicio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hora_fin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flyer_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado_publicacion: Option<PublicationState>,
}

impl DatePatch {
    pub fn flyer(url: impl Into<String>) -> Self {
        Self {
            flyer_url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn publish() -> Self {
        Self {
            estado_publicacion: Some(PublicationState::Published),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fecha.is_none()
            && self.hora_inicio.is_none()
            && self.hora_fin.is_none()
            && self.flyer_url.is_none()
            && self.estado_publicacion.is_none()
    }

    /// Apply the patch to a cached JSON document of a date.
    pub fn merge_into(&self, value: &mut serde_json::Value) {
        let Some(object) = value.as_object_mut() else {
            return;
        };
        if let Some(fecha) = &self.fecha {
            object.insert("fecha".into(), fecha.clone().into());
        }
        if let Some(hora_inicio) = &self.hora_inicio {
            object.insert("hora_inicio".into(), hora_inicio.clone().into());
        }
        if let Some(hora_fin) = &self.hora_fin {
            object.insert("hora_fin".into(), hora_fin.clone().into());
        }
        if let Some(flyer_url) = &self.flyer_url {
            object.insert("flyer_url".into(), flyer_url.clone().into());
        }
        if let Some(estado) = &self.estado_publicacion {
            object.insert("estado_publicacion".into(), estado.as_str().into());
        }
    }
}
