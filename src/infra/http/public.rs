use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use crate::application::{repos::HealthRepo, timeline::TimelineService, voices::VoiceService};

use super::{
    conditional::{CACHE_DAY_PINNED, CACHE_REVALIDATE, CACHE_VOICES, versioned_response},
    db_health_response,
    error::ApiError,
    middleware::{log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub timeline: Arc<TimelineService>,
    pub voices: Arc<VoiceService>,
    pub health: Arc<dyn HealthRepo>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/memory/days", get(day_index))
        .route("/memory/days/{day}", get(day_detail))
        .route("/voices/{liver}", get(voice_groups))
        .route("/_health/db", get(public_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DayQuery {
    /// Version the client learned from the day index; pins the response.
    v: Option<String>,
}

async fn day_index(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    match state.timeline.day_index().await {
        Ok(index) => versioned_response(&headers, index, CACHE_REVALIDATE),
        Err(err) => ApiError::from(err).into_response(),
    }
}

async fn day_detail(
    State(state): State<HttpState>,
    Path(day): Path<String>,
    Query(query): Query<DayQuery>,
    headers: HeaderMap,
) -> Response {
    let cache_control = match query.v.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => CACHE_DAY_PINNED,
        _ => CACHE_REVALIDATE,
    };

    match state.timeline.day(&day).await {
        Ok(items) => versioned_response(&headers, items, cache_control),
        Err(err) => ApiError::from(err).into_response(),
    }
}

async fn voice_groups(
    State(state): State<HttpState>,
    Path(liver): Path<String>,
    headers: HeaderMap,
) -> Response {
    match state.voices.voice_groups(&liver).await {
        Ok(groups) => versioned_response(&headers, groups, CACHE_VOICES),
        Err(err) => ApiError::from(err).into_response(),
    }
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.health.ping().await)
}
