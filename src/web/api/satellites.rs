use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::parse_duration;
use crate::elements::ElementSummary;
use crate::sampler::{GroundPoint, Track};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TrackQuery {
    /// RFC 3339; defaults to now.
    pub start: Option<DateTime<Utc>>,
    pub duration: Option<String>,
    pub step: Option<String>,
    pub ground_every: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackResponse {
    pub track: Track,
    pub ground_track: Vec<GroundPoint>,
    pub skipped: usize,
}

#[utoipa::path(
    get,
    path = "/api/satellites",
    responses(
        (status = 200, description = "Loaded element sets", body = Vec<ElementSummary>)
    ),
    tag = "satellites"
)]
pub async fn list_satellites(State(state): State<AppState>) -> Json<Vec<ElementSummary>> {
    Json(state.source.catalog())
}

#[utoipa::path(
    get,
    path = "/api/satellites/{norad_id}/track",
    params(
        ("norad_id" = u64, Path, description = "NORAD catalog number"),
        ("start" = Option<String>, Query, description = "Window start (RFC3339), defaults to now"),
        ("duration" = Option<String>, Query, description = "Window length, e.g. 90m"),
        ("step" = Option<String>, Query, description = "Sampling step, e.g. 30s"),
        ("ground_every" = Option<usize>, Query, description = "Keep every Nth sample in the ground track")
    ),
    responses(
        (status = 200, description = "Sampled track", body = TrackResponse),
        (status = 400, description = "Invalid window", body = ErrorResponse),
        (status = 404, description = "Unknown satellite", body = ErrorResponse),
        (status = 503, description = "No position could be computed", body = ErrorResponse)
    ),
    tag = "satellites"
)]
pub async fn get_track(
    State(state): State<AppState>,
    Path(norad_id): Path<u64>,
    Query(query): Query<TrackQuery>,
) -> ApiResult<Json<TrackResponse>> {
    let elements = state
        .source
        .lookup(norad_id)
        .ok_or_else(|| ApiError::NotFound(format!("no elements for satellite {norad_id}")))?;

    let defaults = state.sampler.config();
    let duration = match query.duration.as_deref() {
        Some(s) => parse_duration(s).map_err(ApiError::Validation)?,
        None => defaults.duration,
    };
    let step = match query.step.as_deref() {
        Some(s) => parse_duration(s).map_err(ApiError::Validation)?,
        None => defaults.step,
    };
    let ground_every = query.ground_every.unwrap_or(defaults.ground_track_every);
    if ground_every == 0 {
        return Err(ApiError::Validation("ground_every must be at least 1".into()));
    }
    let start = query.start.unwrap_or_else(|| state.clock.now());

    let track = state.sampler.sample(&elements, start, duration, step)?;
    if track.all_failed() {
        let reason = track
            .last_failure()
            .map(|e| e.to_string())
            .unwrap_or_default();
        return Err(ApiError::Unavailable(reason));
    }

    Ok(Json(TrackResponse {
        ground_track: track.ground_track(ground_every),
        skipped: track.skipped(),
        track,
    }))
}
