//! Best-effort import of schedule and price data stored by older versions of
//! the platform, used to pre-fill a template. Anything unreadable is logged and
//! dropped; the planner starts from empty lists instead.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::{DateTemplate, PriceItem, ScheduleItem};

/// Schedule/price columns as an older event row carries them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyEventFields {
    /// Either a JSON array or a JSON document serialized into a string.
    pub horario: Option<Value>,
    pub costos: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct LegacyScheduleEntry {
    #[serde(alias = "actividad", alias = "titulo")]
    descripcion: String,
    #[serde(alias = "inicio")]
    hora: Option<String>,
    fin: Option<String>,
    tipo: Option<String>,
    ritmo: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct LegacyPriceEntry {
    nombre: String,
    tipo: Option<String>,
    #[serde(alias = "precio")]
    costo: Option<Value>,
    regla: Option<String>,
}

/// Fill the template's schedule and prices from legacy fields when the
/// template does not already have structured ones.
pub fn prefill_template(template: &mut DateTemplate, legacy: &LegacyEventFields) {
    if template.cronograma.is_empty() {
        template.cronograma = import_schedule(legacy.horario.as_ref());
    }
    if template.costos.is_empty() {
        template.costos = import_prices(legacy.costos.as_ref());
    }
}

pub fn import_schedule(raw: Option<&Value>) -> Vec<ScheduleItem> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match parse_schedule(raw) {
        Ok(items) => items,
        Err(e) => {
            warn!("failed to import legacy schedule: {}", e);
            Vec::new()
        }
    }
}

pub fn import_prices(raw: Option<&Value>) -> Vec<PriceItem> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match parse_prices(raw) {
        Ok(items) => items,
        Err(e) => {
            warn!("failed to import legacy prices: {}", e);
            Vec::new()
        }
    }
}

fn unwrap_encoded(raw: &Value) -> Result<Value, serde_json::Error> {
    match raw {
        Value::String(text) if text.trim().is_empty() => Ok(Value::Array(Vec::new())),
        Value::String(text) => serde_json::from_str(text),
        other => Ok(other.clone()),
    }
}

fn parse_schedule(raw: &Value) -> Result<Vec<ScheduleItem>, serde_json::Error> {
    let value = unwrap_encoded(raw)?;
    if let Ok(items) = serde_json::from_value::<Vec<ScheduleItem>>(value.clone()) {
        return Ok(items);
    }

    let entries: Vec<LegacyScheduleEntry> = serde_json::from_value(value)?;
    Ok(entries
        .into_iter()
        .map(|entry| ScheduleItem {
            tipo: entry.tipo.unwrap_or_else(|| "clase".to_string()),
            titulo: entry.descripcion,
            inicio: entry.hora,
            fin: entry.fin,
            ritmo: entry.ritmo,
        })
        .collect())
}

fn parse_prices(raw: &Value) -> Result<Vec<PriceItem>, serde_json::Error> {
    let value = unwrap_encoded(raw)?;
    if let Ok(items) = serde_json::from_value::<Vec<PriceItem>>(value.clone()) {
        return Ok(items);
    }

    let entries: Vec<LegacyPriceEntry> = serde_json::from_value(value)?;
    Ok(entries
        .into_iter()
        .map(|entry| PriceItem {
            nombre: entry.nombre,
            tipo: entry.tipo.unwrap_or_else(|| "general".to_string()),
            precio: entry.costo.as_ref().and_then(parse_amount),
            regla: entry.regla,
        })
        .collect())
}

/// Amounts were stored as numbers or as text like `"$150"` / `"150.50"`.
fn parse_amount(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => {
            let cleaned: String = text
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            cleaned.parse().ok()
        }
        _ => None,
    }
}
