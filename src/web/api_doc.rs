use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::satellites::TrackResponse;
use crate::elements::ElementSummary;
use crate::frame::GeodeticSample;
use crate::sampler::{GroundPoint, Track};
use crate::tracker::{PositionFeed, TrackerPhase, TrackerSnapshot};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::satellites::list_satellites,
        super::api::satellites::get_track,
        super::api::tracker::list_trackers,
        super::api::tracker::watch,
        super::api::tracker::release,
        super::api::tracker::position,
    ),
    components(
        schemas(
            ElementSummary,
            GeodeticSample,
            Track,
            GroundPoint,
            TrackResponse,
            TrackerPhase,
            TrackerSnapshot,
            PositionFeed,
            ErrorResponse,
        )
    ),
    info(
        title = "sat-track API",
        description = "Satellite position tracks and live position feeds",
        version = "0.1.0"
    ),
    tags(
        (name = "satellites", description = "Element catalog and sampled tracks"),
        (name = "tracker", description = "Live per-satellite trackers")
    )
)]
pub struct ApiDoc;
