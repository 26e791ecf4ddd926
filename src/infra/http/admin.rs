//! Write surface. Bound to a separate listener; authentication is left to the
//! network boundary in front of it.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::application::{repos::HealthRepo, timeline::TimelineService, voices::VoiceService};
use crate::domain::entities::{DynamicContent, LiveContent};

use super::{
    db_health_response,
    error::ApiError,
    middleware::{log_responses, set_request_context},
    models::{TimelineEntryRequest, VoiceRequest},
};

#[derive(Clone)]
pub struct AdminState {
    pub timeline: Arc<TimelineService>,
    pub voices: Arc<VoiceService>,
    pub health: Arc<dyn HealthRepo>,
}

pub fn build_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/memory/dynamics", post(create_dynamic))
        .route("/memory/dynamics/{id}", put(update_dynamic))
        .route("/memory/lives", post(create_live))
        .route("/memory/lives/{id}", put(update_live))
        .route("/voices", post(create_voice))
        .route("/voices/{id}", put(update_voice).delete(delete_voice))
        .route("/_health/db", get(admin_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn create_dynamic(
    State(state): State<AdminState>,
    Json(request): Json<TimelineEntryRequest<DynamicContent>>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.timeline.add_dynamic(request.into()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_dynamic(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TimelineEntryRequest<DynamicContent>>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.timeline.update_dynamic(id, request.into()).await?;
    Ok(Json(record))
}

async fn create_live(
    State(state): State<AdminState>,
    Json(request): Json<TimelineEntryRequest<LiveContent>>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.timeline.add_live(request.into()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_live(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TimelineEntryRequest<LiveContent>>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.timeline.update_live(id, request.into()).await?;
    Ok(Json(record))
}

async fn create_voice(
    State(state): State<AdminState>,
    Json(request): Json<VoiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let voice = state.voices.add_voice(request.into()).await?;
    Ok((StatusCode::CREATED, Json(voice)))
}

async fn update_voice(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
    Json(request): Json<VoiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let voice = state.voices.update_voice(id, request.into()).await?;
    Ok(Json(voice))
}

async fn delete_voice(
    State(state): State<AdminState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.voices.delete_voice(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn admin_health(State(state): State<AdminState>) -> Response {
    db_health_response(state.health.ping().await)
}
