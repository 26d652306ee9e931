use std::collections::hash_map::Entry;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::tracker::{PositionFeed, TrackerSnapshot};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::server::AppState;

#[utoipa::path(
    get,
    path = "/api/tracker",
    responses(
        (status = 200, description = "Snapshots of every running tracker", body = Vec<TrackerSnapshot>)
    ),
    tag = "tracker"
)]
pub async fn list_trackers(State(state): State<AppState>) -> Json<Vec<TrackerSnapshot>> {
    Json(state.registry.snapshots())
}

#[utoipa::path(
    post,
    path = "/api/tracker/{norad_id}",
    params(
        ("norad_id" = u64, Path, description = "NORAD catalog number")
    ),
    responses(
        (status = 200, description = "Satellite is being tracked", body = TrackerSnapshot),
        (status = 500, description = "Tracker could not be started", body = ErrorResponse)
    ),
    tag = "tracker"
)]
pub async fn watch(
    State(state): State<AppState>,
    Path(norad_id): Path<u64>,
) -> ApiResult<Json<TrackerSnapshot>> {
    let mut watches = state.lock_watches();
    let snapshot = match watches.entry(norad_id) {
        Entry::Occupied(entry) => entry.get().snapshot(),
        Entry::Vacant(entry) => {
            let subscription = state.registry.subscribe(norad_id)?;
            log::info!("Watching satellite {}", norad_id);
            entry.insert(subscription).snapshot()
        }
    };
    Ok(Json(snapshot))
}

#[utoipa::path(
    delete,
    path = "/api/tracker/{norad_id}",
    params(
        ("norad_id" = u64, Path, description = "NORAD catalog number")
    ),
    responses(
        (status = 204, description = "Watch released"),
        (status = 404, description = "Satellite not watched", body = ErrorResponse)
    ),
    tag = "tracker"
)]
pub async fn release(
    State(state): State<AppState>,
    Path(norad_id): Path<u64>,
) -> ApiResult<StatusCode> {
    let removed = state.lock_watches().remove(&norad_id);
    match removed {
        Some(_) => {
            log::info!("Released satellite {}", norad_id);
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::NotFound(format!(
            "satellite {norad_id} is not watched"
        ))),
    }
}

#[utoipa::path(
    get,
    path = "/api/tracker/{norad_id}/position",
    params(
        ("norad_id" = u64, Path, description = "NORAD catalog number")
    ),
    responses(
        (status = 200, description = "Latest position feed", body = PositionFeed),
        (status = 404, description = "Satellite not watched", body = ErrorResponse)
    ),
    tag = "tracker"
)]
pub async fn position(
    State(state): State<AppState>,
    Path(norad_id): Path<u64>,
) -> ApiResult<Json<PositionFeed>> {
    state
        .registry
        .snapshot(norad_id)
        .map(|snapshot| Json(snapshot.feed()))
        .ok_or_else(|| ApiError::NotFound(format!("satellite {norad_id} is not watched")))
}
