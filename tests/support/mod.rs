#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use dance_planner::error::AppError;
use dance_planner::models::{CreatedDateRecord, DatePatch, DateTemplate, NewDatePayload};
use dance_planner::planner::{PlannerSession, RecurrenceRequest};
use dance_planner::services::MemoryNotifier;
use dance_planner::store::DateStore;

/// In-memory store that can shuffle, drop or reject what it is asked to do.
#[derive(Default)]
pub struct MockDateStore {
    records: Mutex<Vec<CreatedDateRecord>>,
    next_id: AtomicUsize,
    reverse: bool,
    truncate_to: Option<usize>,
    fail_create: AtomicBool,
    fail_update: AtomicBool,
    fail_delete: AtomicBool,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl MockDateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return created records in reverse order.
    pub fn reversed() -> Self {
        Self {
            reverse: true,
            ..Self::default()
        }
    }

    /// Persist everything but return only the first `n` records.
    pub fn truncated(n: usize) -> Self {
        Self {
            truncate_to: Some(n),
            ..Self::default()
        }
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_update(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> Vec<CreatedDateRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn seed(&self, record: CreatedDateRecord) {
        self.records.lock().unwrap().push(record);
    }
}

pub fn record_from(id: String, payload: &NewDatePayload) -> CreatedDateRecord {
    CreatedDateRecord {
        id,
        fecha: payload.fecha.clone(),
        hora_inicio: payload.hora_inicio.clone(),
        hora_fin: payload.hora_fin.clone(),
        lugar: payload.lugar.clone(),
        ciudad: payload.ciudad.clone(),
        parent_id: payload.parent_id.clone(),
        organizer_id: payload.organizer_id.clone(),
        nombre: payload.nombre.clone(),
        flyer_url: payload.flyer_url.clone(),
        estado_publicacion: payload.estado_publicacion.as_str().to_string(),
    }
}

#[async_trait]
impl DateStore for MockDateStore {
    async fn create_dates(&self, payloads: &[NewDatePayload]) -> Result<Vec<CreatedDateRecord>, AppError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AppError::Remote("batch insert rejected".to_string()));
        }

        let mut created: Vec<CreatedDateRecord> = payloads
            .iter()
            .map(|payload| {
                let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                record_from(format!("date-{}", n), payload)
            })
            .collect();
        self.records.lock().unwrap().extend(created.iter().cloned());

        if self.reverse {
            created.reverse();
        }
        if let Some(n) = self.truncate_to {
            created.truncate(n);
        }
        Ok(created)
    }

    async fn update_date(&self, id: &str, patch: &DatePatch) -> Result<CreatedDateRecord, AppError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(AppError::Remote("update rejected".to_string()));
        }

        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AppError::NotFound)?;
        if let Some(fecha) = &patch.fecha {
            record.fecha = fecha.clone();
        }
        if let Some(hora_inicio) = &patch.hora_inicio {
            record.hora_inicio = Some(hora_inicio.clone());
        }
        if let Some(hora_fin) = &patch.hora_fin {
            record.hora_fin = Some(hora_fin.clone());
        }
        if let Some(flyer_url) = &patch.flyer_url {
            record.flyer_url = Some(flyer_url.clone());
        }
        if let Some(estado) = patch.estado_publicacion {
            record.estado_publicacion = estado.as_str().to_string();
        }
        Ok(record.clone())
    }

    async fn delete_date(&self, id: &str) -> Result<(), AppError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::Remote("delete rejected".to_string()));
        }

        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn fetch_date(&self, id: &str) -> Result<Option<CreatedDateRecord>, AppError> {
        Ok(self.records().into_iter().find(|r| r.id == id))
    }

    async fn fetch_dates_by_parent(&self, parent_id: &str) -> Result<Vec<CreatedDateRecord>, AppError> {
        Ok(self
            .records()
            .into_iter()
            .filter(|r| r.parent_id.as_deref() == Some(parent_id))
            .collect())
    }

    async fn fetch_dates_by_organizer(&self, organizer_id: &str) -> Result<Vec<CreatedDateRecord>, AppError> {
        Ok(self
            .records()
            .into_iter()
            .filter(|r| r.organizer_id.as_deref() == Some(organizer_id))
            .collect())
    }
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

pub fn template() -> DateTemplate {
    DateTemplate {
        nombre: Some("Social de salsa".to_string()),
        lugar: Some("Salón Caribe".to_string()),
        ciudad: Some("Guadalajara".to_string()),
        parent_id: Some("event-1".to_string()),
        organizer_id: Some("org-1".to_string()),
        ritmos: vec![1, 3],
        ..DateTemplate::default()
    }
}

/// A session holding `weeks` weekly rows from 2025-03-03 at 20:00.
pub fn session_with_weeks(weeks: u32) -> PlannerSession {
    let mut session = PlannerSession::new(template());
    let mut req = RecurrenceRequest::weekly(date("2025-03-03"), weeks);
    req.hora_inicio = Some("20:00".to_string());
    session.generate(&req).unwrap();
    session
}

pub fn notifier() -> Arc<MemoryNotifier> {
    Arc::new(MemoryNotifier::new())
}
