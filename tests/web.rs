mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{iss, ISS_ID};
use sat_track::clock::ManualClock;
use sat_track::config::Config;
use sat_track::source::MemorySource;
use sat_track::tracker::{PositionFeed, TrackerPhase};
use sat_track::web::api::error::ApiError;
use sat_track::web::api::satellites::{get_track, list_satellites, TrackQuery};
use sat_track::web::api::tracker::{list_trackers, position, release, watch};
use sat_track::web::api_doc::ApiDoc;
use sat_track::web::AppState;
use utoipa::OpenApi;

fn state() -> AppState {
    let source = Arc::new(MemorySource::new());
    source.insert(iss());
    AppState::new(
        Config::default(),
        source,
        Arc::new(ManualClock::new(iss().epoch())),
    )
    .unwrap()
}

fn query(duration: &str, step: &str) -> TrackQuery {
    TrackQuery {
        duration: Some(duration.to_string()),
        step: Some(step.to_string()),
        ..TrackQuery::default()
    }
}

#[tokio::test]
async fn lists_the_catalog() {
    let catalog = list_satellites(State(state())).await.0;
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].norad_id, ISS_ID);
    assert_eq!(catalog[0].name, "ISS (ZARYA)");
}

#[tokio::test]
async fn track_defaults_to_clock_time_and_configured_ground_step() {
    let response = get_track(State(state()), Path(ISS_ID), Query(query("90m", "1m")))
        .await
        .ok()
        .unwrap()
        .0;

    assert_eq!(response.track.len(), 91);
    assert_eq!(response.skipped, 0);
    assert_eq!(response.track.start(), iss().epoch());
    assert_eq!(response.ground_track.len(), 10);
}

#[tokio::test]
async fn track_rejects_bad_requests() {
    let result = get_track(State(state()), Path(1), Query(query("90m", "1m"))).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));

    let result = get_track(State(state()), Path(ISS_ID), Query(query("90m", "soon"))).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));

    let result = get_track(State(state()), Path(ISS_ID), Query(query("90m", "0s"))).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));

    let result = get_track(
        State(state()),
        Path(ISS_ID),
        Query(query("300000years", "300000years")),
    )
    .await;
    assert!(matches!(result, Err(ApiError::Validation(_))));

    let zero_ground = TrackQuery {
        ground_every: Some(0),
        ..query("90m", "1m")
    };
    let result = get_track(State(state()), Path(ISS_ID), Query(zero_ground)).await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test(start_paused = true)]
async fn watch_position_and_release() {
    let state = state();

    let result = position(State(state.clone()), Path(ISS_ID)).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));

    let snapshot = watch(State(state.clone()), Path(ISS_ID)).await.ok().unwrap().0;
    assert_eq!(snapshot.norad_id, ISS_ID);
    assert!(watch(State(state.clone()), Path(ISS_ID)).await.is_ok());
    assert_eq!(state.registry.observers(ISS_ID), 1);

    tokio::time::sleep(Duration::from_millis(1)).await;
    let feed = position(State(state.clone()), Path(ISS_ID)).await.ok().unwrap().0;
    assert!(matches!(feed, PositionFeed::Tracking { .. }));

    let trackers = list_trackers(State(state.clone())).await.0;
    assert_eq!(trackers.len(), 1);
    assert_eq!(trackers[0].phase, TrackerPhase::Tracking);

    let status = release(State(state.clone()), Path(ISS_ID)).await.ok().unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(state.registry.is_empty());

    let result = release(State(state.clone()), Path(ISS_ID)).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn errors_map_to_status_codes() {
    let cases = [
        (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
        (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
        (ApiError::Unavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (error, status) in cases {
        assert_eq!(error.into_response().status(), status);
    }
}

#[test]
fn openapi_document_lists_every_route() {
    let doc = ApiDoc::openapi();
    for path in [
        "/api/satellites",
        "/api/satellites/{norad_id}/track",
        "/api/tracker",
        "/api/tracker/{norad_id}",
        "/api/tracker/{norad_id}/position",
    ] {
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
