mod support;

use std::sync::{Arc, Mutex};
use std::sync::atomic::Ordering;

use dance_planner::cache::{QueryCache, QueryKey};
use dance_planner::error::AppError;
use dance_planner::models::PublicationState;
use dance_planner::planner::{FlyerReport, FlyerStatus, PlannerSession};
use dance_planner::services::{BatchReconciler, BulkPatcher, NoticeLevel};
use serde_json::json;
use support::{MockDateStore, notifier, session_with_weeks};

const GENERAL: &str = "https://cdn.example.com/general.png";

async fn created_session(store: &Arc<MockDateStore>, weeks: u32) -> Mutex<PlannerSession> {
    let reconciler = BatchReconciler::new(store.clone(), QueryCache::new(), notifier());
    let mut session = session_with_weeks(weeks);
    reconciler.submit(&mut session).await.expect("Submit failed");
    Mutex::new(session)
}

#[tokio::test]
async fn test_general_flyer_skips_uploading() {
    let store = Arc::new(MockDateStore::new());
    let session = created_session(&store, 2).await;
    {
        let mut session = session.lock().unwrap();
        let id = session.rows().rows()[0].id.clone();

        // one row had a failed upload attempt
        session.report_flyer(&id, &FlyerReport::Uploading).unwrap();
        session
            .report_flyer(&id, &FlyerReport::Error { message: None })
            .unwrap();
    }

    let patcher = BulkPatcher::new(store.clone(), QueryCache::new(), notifier());
    let report = patcher
        .apply_general_flyer(&session, Some(GENERAL.to_string()))
        .await
        .expect("Failed to apply flyer");

    assert_eq!(report.patched.len(), 2);
    assert!(report.failed.is_empty());
    for row in session.lock().unwrap().rows().rows() {
        assert_eq!(row.flyer_status, FlyerStatus::Done);
        assert_eq!(row.flyer_url.as_deref(), Some(GENERAL));
    }
    assert!(store.records().iter().all(|r| r.flyer_url.as_deref() == Some(GENERAL)));
}

#[tokio::test]
async fn test_general_flyer_needs_created_rows() {
    let store = Arc::new(MockDateStore::new());
    let notices = notifier();
    let patcher = BulkPatcher::new(store.clone(), QueryCache::new(), notices.clone());
    let session = Mutex::new(session_with_weeks(2));

    let result = patcher
        .apply_general_flyer(&session, Some(GENERAL.to_string()))
        .await;

    assert!(matches!(result, Err(AppError::NoCreatedRows)));
    assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);
    assert!(session
        .lock()
        .unwrap()
        .rows()
        .rows()
        .iter()
        .all(|r| r.flyer_status == FlyerStatus::Pending));
    assert_eq!(notices.drain()[0].level, NoticeLevel::Warning);
}

#[tokio::test]
async fn test_unmapped_rows_are_not_patched() {
    let store = Arc::new(MockDateStore::truncated(1));
    let session = created_session(&store, 2).await;
    assert_eq!(session.lock().unwrap().mapping().len(), 1);

    let patcher = BulkPatcher::new(store.clone(), QueryCache::new(), notifier());
    let report = patcher
        .apply_general_flyer(&session, Some(GENERAL.to_string()))
        .await
        .unwrap();

    assert_eq!(report.patched.len(), 1);
    let session = session.lock().unwrap();
    let untouched = session
        .rows()
        .rows()
        .iter()
        .find(|r| session.persisted_id(&r.id).is_none())
        .unwrap();
    assert_eq!(untouched.flyer_status, FlyerStatus::Pending);
}

#[tokio::test]
async fn test_publish_created_dates() {
    let store = Arc::new(MockDateStore::new());
    let session = created_session(&store, 3).await;
    let cache = QueryCache::new();
    let key = QueryKey::dates_by_organizer("org-1");
    cache.set(key.clone(), json!([]));

    let patcher = BulkPatcher::new(store.clone(), cache.clone(), notifier());
    let report = patcher.publish_created(&session).await.unwrap();

    assert_eq!(report.patched.len(), 3);
    assert!(store.records().iter().all(|r| r.estado_publicacion == "publicado"));
    assert!(session
        .lock()
        .unwrap()
        .rows()
        .rows()
        .iter()
        .all(|r| r.estado_publicacion == PublicationState::Published));
    assert!(cache.is_stale(&key));
}

#[tokio::test]
async fn test_rejected_records_are_collected() {
    let store = Arc::new(MockDateStore::new());
    let session = created_session(&store, 2).await;
    store.set_fail_update(true);
    let notices = notifier();

    let patcher = BulkPatcher::new(store.clone(), QueryCache::new(), notices.clone());
    let report = patcher.publish_created(&session).await.unwrap();

    assert!(report.patched.is_empty());
    assert_eq!(report.failed.len(), 2);
    assert!(session
        .lock()
        .unwrap()
        .rows()
        .rows()
        .iter()
        .all(|r| r.estado_publicacion == PublicationState::Draft));
    assert_eq!(notices.drain().last().unwrap().level, NoticeLevel::Warning);
}

#[tokio::test]
async fn test_general_flyer_falls_back_to_template() {
    let store = Arc::new(MockDateStore::new());
    let session = created_session(&store, 1).await;
    let patcher = BulkPatcher::new(store.clone(), QueryCache::new(), notifier());

    let missing = patcher.apply_general_flyer(&session, None).await;
    assert!(matches!(missing, Err(AppError::BadRequest(_))));
    assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);

    let mut template = session.lock().unwrap().template().clone();
    template.flyer_general = Some(GENERAL.to_string());
    session.lock().unwrap().set_template(template);

    let report = patcher.apply_general_flyer(&session, None).await.unwrap();
    assert_eq!(report.patched.len(), 1);
    assert_eq!(store.records()[0].flyer_url.as_deref(), Some(GENERAL));
}
