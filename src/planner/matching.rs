//! Row/record reconciliation for batch creates.
//!
//! The store returns created dates without any token tying them to the rows
//! that produced them, in no particular order and possibly fewer than asked
//! for. Records are matched back to rows through a composite key built from the
//! stored fields; records sharing a key are drained one per row so a persisted
//! id never lands on two rows.

use std::collections::{HashMap, VecDeque};

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::models::{CreatedDateRecord, NewDatePayload};

/// A row as it was sent in a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittedRow {
    pub row_id: String,
    pub payload: NewDatePayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    fecha: String,
    hora_inicio: Option<String>,
    hora_fin: Option<String>,
    lugar: Option<String>,
    ciudad: Option<String>,
    parent_id: Option<String>,
}

impl CompositeKey {
    pub fn from_payload(payload: &NewDatePayload) -> Self {
        Self {
            fecha: normalize_fecha(&payload.fecha),
            hora_inicio: normalize_time(payload.hora_inicio.as_deref()),
            hora_fin: normalize_time(payload.hora_fin.as_deref()),
            lugar: normalize_text(payload.lugar.as_deref()),
            ciudad: normalize_text(payload.ciudad.as_deref()),
            parent_id: normalize_text(payload.parent_id.as_deref()),
        }
    }

    pub fn from_record(record: &CreatedDateRecord) -> Self {
        Self {
            fecha: normalize_fecha(&record.fecha),
            hora_inicio: normalize_time(record.hora_inicio.as_deref()),
            hora_fin: normalize_time(record.hora_fin.as_deref()),
            lugar: normalize_text(record.lugar.as_deref()),
            ciudad: normalize_text(record.ciudad.as_deref()),
            parent_id: normalize_text(record.parent_id.as_deref()),
        }
    }
}

/// Date-only component: stores may hand back `2025-03-03T00:00:00+00:00`.
fn normalize_fecha(raw: &str) -> String {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split(['T', ' '])
        .next()
        .unwrap_or(trimmed);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => date_part.to_string(),
    }
}

/// `HH:MM`: SQL time columns come back as `HH:MM:SS` and zero-padded, while
/// typed values may be `8:00`. Unparseable values are compared as typed.
fn normalize_time(raw: Option<&str>) -> Option<String> {
    let value = raw.map(str::trim).filter(|v| !v.is_empty())?;
    let parsed = NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S%.f"))
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"));
    match parsed {
        Ok(time) => Some(time.format("%H:%M").to_string()),
        Err(_) => Some(value.to_string()),
    }
}

fn normalize_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedRow {
    pub row_id: String,
    pub record: CreatedDateRecord,
}

/// Result of matching one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub mapped: Vec<MappedRow>,
    /// Rows whose bucket was empty, in submit order.
    pub unmapped_rows: Vec<String>,
    /// Records nobody claimed, in returned order.
    pub orphaned_records: Vec<CreatedDateRecord>,
}

/// Strategy for pairing created records with submitted rows. A store that
/// echoes a correlation id can supply its own implementation.
pub trait RecordMatcher: Send + Sync {
    fn match_records(&self, rows: &[SubmittedRow], records: Vec<CreatedDateRecord>) -> MatchOutcome;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeKeyMatcher;

impl RecordMatcher for CompositeKeyMatcher {
    fn match_records(&self, rows: &[SubmittedRow], records: Vec<CreatedDateRecord>) -> MatchOutcome {
        let mut buckets: HashMap<CompositeKey, VecDeque<(usize, CreatedDateRecord)>> = HashMap::new();
        for (index, record) in records.into_iter().enumerate() {
            buckets
                .entry(CompositeKey::from_record(&record))
                .or_default()
                .push_back((index, record));
        }

        let mut outcome = MatchOutcome::default();
        for row in rows {
            let key = CompositeKey::from_payload(&row.payload);
            match buckets.get_mut(&key).and_then(VecDeque::pop_front) {
                Some((_, record)) => outcome.mapped.push(MappedRow {
                    row_id: row.row_id.clone(),
                    record,
                }),
                None => outcome.unmapped_rows.push(row.row_id.clone()),
            }
        }

        let mut leftovers: Vec<(usize, CreatedDateRecord)> =
            buckets.into_values().flatten().collect();
        leftovers.sort_by_key(|(index, _)| *index);
        outcome.orphaned_records = leftovers.into_iter().map(|(_, record)| record).collect();

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fecha_keeps_only_the_date() {
        assert_eq!(normalize_fecha("2025-03-03T00:00:00+00:00"), "2025-03-03");
        assert_eq!(normalize_fecha(" 2025-03-03 "), "2025-03-03");
        assert_eq!(normalize_fecha("2025-03-03 20:00:00"), "2025-03-03");
    }

    #[test]
    fn test_time_drops_seconds() {
        assert_eq!(normalize_time(Some("20:00:00")), Some("20:00".to_string()));
        assert_eq!(normalize_time(Some("20:00")), Some("20:00".to_string()));
        assert_eq!(normalize_time(Some("8:00")), Some("08:00".to_string()));
        assert_eq!(normalize_time(Some("08:00:00")), Some("08:00".to_string()));
        assert_eq!(normalize_time(Some("late")), Some("late".to_string()));
        assert_eq!(normalize_time(Some("  ")), None);
        assert_eq!(normalize_time(None), None);
    }
}
