use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::AppError;
use crate::models::*;
use crate::planner::legacy::LegacyEventFields;
use crate::planner::{
    FlyerReport, FlyerTarget, PlannerSession, RecurrenceRequest, SubmitReport, ValidationErrors,
};
use crate::services::notifier::notify_failure;
use crate::services::{BulkPatchReport, Notice, Notifier};
use crate::state::AppState;

/// Every successful response carries the notices raised while handling it.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Serialize)]
pub struct PlannerView {
    pub template: DateTemplate,
    pub rows: Vec<PlannerRow>,
    pub errors: ValidationErrors,
    pub mapping: BTreeMap<String, String>,
    pub submitting: bool,
}

impl PlannerView {
    fn of(session: &PlannerSession) -> Self {
        Self {
            template: session.template().clone(),
            rows: session.rows().rows().to_vec(),
            errors: session.errors().clone(),
            mapping: session.mapping().clone(),
            submitting: session.is_submitting(),
        }
    }
}

#[derive(Deserialize)]
struct SelectRequest {
    selected: bool,
}

#[derive(Deserialize, Default)]
struct ApplyFlyerRequest {
    url: Option<String>,
}

#[derive(Deserialize)]
struct DatesQueryParams {
    parent_id: Option<String>,
    organizer_id: Option<String>,
}

#[derive(Deserialize)]
struct CountQueryParams {
    parent_id: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/planner", get(get_planner))
        .route("/planner/template", get(get_template).put(put_template))
        .route("/planner/template/legacy", post(import_legacy))
        .route("/planner/generate", post(generate))
        .route("/planner/rows", post(add_row))
        .route("/planner/rows/select", post(select_all))
        .route("/planner/rows/{id}", patch(update_row).delete(remove_row))
        .route("/planner/rows/{id}/select", post(select_row))
        .route("/planner/rows/{id}/flyer", get(flyer_target).post(report_flyer))
        .route("/planner/validate", post(validate))
        .route("/planner/submit", post(submit))
        .route("/planner/flyer/apply-general", post(apply_general_flyer))
        .route("/planner/publish", post(publish))
        .route("/planner/reset", post(reset))
        .route("/dates", get(list_dates))
        .route("/dates/count", get(count_dates))
        .route("/dates/{id}", get(get_date).patch(update_date).delete(delete_date))
        .with_state(state)
}

fn reply<T>(state: &AppState, result: Result<T, AppError>) -> Result<Json<ApiResponse<T>>, AppError> {
    let notices = state.take_notices();
    let data = result?;
    Ok(Json(ApiResponse { data, notices }))
}

/// Run a synchronous step against the session, telling the user when it is refused.
fn with_session<T>(
    state: &AppState,
    step: impl FnOnce(&mut PlannerSession) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut session = state.lock_session();
    step(&mut session).inspect_err(|e| notify_failure(&*state.notices, e))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn get_planner(State(state): State<AppState>) -> Result<Json<ApiResponse<PlannerView>>, AppError> {
    let view = PlannerView::of(&state.lock_session());
    reply(&state, Ok(view))
}

async fn get_template(State(state): State<AppState>) -> Result<Json<ApiResponse<DateTemplate>>, AppError> {
    let template = state.lock_session().template().clone();
    reply(&state, Ok(template))
}

async fn put_template(
    State(state): State<AppState>,
    Json(template): Json<DateTemplate>,
) -> Result<Json<ApiResponse<DateTemplate>>, AppError> {
    let result = with_session(&state, |session| {
        session.set_template(template);
        Ok(session.template().clone())
    });
    reply(&state, result)
}

async fn import_legacy(
    State(state): State<AppState>,
    Json(legacy): Json<LegacyEventFields>,
) -> Result<Json<ApiResponse<DateTemplate>>, AppError> {
    let result = with_session(&state, |session| {
        session.prefill_from_legacy(&legacy);
        Ok(session.template().clone())
    });
    reply(&state, result)
}

async fn generate(
    State(state): State<AppState>,
    Json(req): Json<RecurrenceRequest>,
) -> Result<Json<ApiResponse<PlannerView>>, AppError> {
    let result = with_session(&state, |session| {
        let added = session.generate(&req)?;
        state.notices.info(format!("Added {} weekly date(s)", added));
        Ok(PlannerView::of(session))
    });
    reply(&state, result)
}

async fn add_row(
    State(state): State<AppState>,
    Json(req): Json<NewRowRequest>,
) -> Result<Json<ApiResponse<PlannerRow>>, AppError> {
    let result = with_session(&state, |session| Ok(session.add_row(req.into()).clone()));
    reply(&state, result)
}

async fn update_row(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<RowPatch>,
) -> Result<Json<ApiResponse<PlannerRow>>, AppError> {
    let result = with_session(&state, |session| session.update_row(&id, patch).cloned());
    reply(&state, result)
}

async fn remove_row(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PlannerRow>>, AppError> {
    let result = with_session(&state, |session| session.remove_row(&id));
    reply(&state, result)
}

async fn select_row(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<ApiResponse<PlannerView>>, AppError> {
    let result = with_session(&state, |session| {
        session.set_selected(&id, req.selected)?;
        Ok(PlannerView::of(session))
    });
    reply(&state, result)
}

async fn select_all(
    State(state): State<AppState>,
    Json(req): Json<SelectRequest>,
) -> Result<Json<ApiResponse<PlannerView>>, AppError> {
    let result = with_session(&state, |session| {
        session.set_all_selected(req.selected);
        Ok(PlannerView::of(session))
    });
    reply(&state, result)
}

async fn validate(State(state): State<AppState>) -> Result<Json<ApiResponse<ValidationErrors>>, AppError> {
    let result = with_session(&state, |session| Ok(session.validate().clone()));
    reply(&state, result)
}

async fn report_flyer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(report): Json<FlyerReport>,
) -> Result<Json<ApiResponse<PlannerRow>>, AppError> {
    let result = with_session(&state, |session| session.report_flyer(&id, &report).cloned());
    reply(&state, result)
}

async fn flyer_target(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FlyerTarget>>, AppError> {
    let result = state.lock_session().flyer_target(&id);
    reply(&state, result)
}

/// The batch create runs on its own task: once issued it completes and is
/// reconciled even if the client goes away.
async fn submit(State(state): State<AppState>) -> Result<Json<ApiResponse<SubmitReport>>, AppError> {
    let prepared = {
        let mut session = state.lock_session();
        state.reconciler.prepare(&mut session)
    };
    let ticket = match prepared {
        Ok(ticket) => ticket,
        Err(e) => return reply(&state, Err(e)),
    };

    let worker = state.clone();
    let handle = tokio::spawn(async move {
        let result = worker.reconciler.persist(&ticket).await;
        let mut session = worker.lock_session();
        worker.reconciler.finish(&mut session, ticket, result)
    });

    let result = match handle.await {
        Ok(result) => result,
        Err(e) => {
            error!("submit task failed: {}", e);
            Err(AppError::InternalServerError)
        }
    };
    reply(&state, result)
}

async fn apply_general_flyer(
    State(state): State<AppState>,
    body: Option<Json<ApplyFlyerRequest>>,
) -> Result<Json<ApiResponse<BulkPatchReport>>, AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let result = state.bulk.apply_general_flyer(&state.session, req.url).await;
    reply(&state, result)
}

async fn publish(State(state): State<AppState>) -> Result<Json<ApiResponse<BulkPatchReport>>, AppError> {
    let result = state.bulk.publish_created(&state.session).await;
    reply(&state, result)
}

async fn reset(State(state): State<AppState>) -> Result<Json<ApiResponse<PlannerView>>, AppError> {
    let result = with_session(&state, |session| {
        session.reset()?;
        info!("planner reset");
        Ok(PlannerView::of(session))
    });
    reply(&state, result)
}

async fn list_dates(
    State(state): State<AppState>,
    Query(params): Query<DatesQueryParams>,
) -> Result<Json<ApiResponse<Vec<CreatedDateRecord>>>, AppError> {
    let result = match (params.parent_id, params.organizer_id) {
        (Some(parent_id), _) => state.queries.dates_by_parent(&parent_id).await,
        (None, Some(organizer_id)) => state.queries.dates_by_organizer(&organizer_id).await,
        (None, None) => Err(AppError::BadRequest(
            "parent_id or organizer_id is required".to_string(),
        )),
    };
    reply(&state, result)
}

async fn count_dates(
    State(state): State<AppState>,
    Query(params): Query<CountQueryParams>,
) -> Result<Json<ApiResponse<usize>>, AppError> {
    let result = state.queries.date_count(&params.parent_id).await;
    reply(&state, result)
}

async fn get_date(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CreatedDateRecord>>, AppError> {
    let result = state
        .queries
        .date(&id)
        .await
        .and_then(|record| record.ok_or(AppError::NotFound));
    reply(&state, result)
}

async fn update_date(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<DatePatch>,
) -> Result<Json<ApiResponse<CreatedDateRecord>>, AppError> {
    let result = state.mutations.update_date(&id, &patch).await;
    reply(&state, result)
}

async fn delete_date(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let result = state.mutations.delete_date(&id).await;
    reply(&state, result)
}
