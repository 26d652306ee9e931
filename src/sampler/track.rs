use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use super::trajectory::PositionError;
use crate::elements::OrbitalElementSet;
use crate::frame::GeodeticSample;

/// Time-ascending samples over one window. Rebuilt for every request.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Track {
    name: String,
    norad_id: u64,
    start: DateTime<Utc>,
    #[serde(rename = "step_seconds", serialize_with = "serialize_seconds")]
    #[schema(value_type = f64)]
    step: Duration,
    samples: Vec<GeodeticSample>,
    skipped: usize,
    #[serde(serialize_with = "serialize_failure")]
    #[schema(value_type = Option<String>)]
    last_failure: Option<PositionError>,
}

/// One point of a ground track: where the satellite is overhead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GroundPoint {
    pub timestamp: DateTime<Utc>,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl From<&GeodeticSample> for GroundPoint {
    fn from(sample: &GeodeticSample) -> Self {
        Self {
            timestamp: sample.timestamp,
            latitude_deg: sample.latitude_deg,
            longitude_deg: sample.longitude_deg,
        }
    }
}

impl Track {
    pub(crate) fn new(
        elements: &OrbitalElementSet,
        start: DateTime<Utc>,
        step: Duration,
        samples: Vec<GeodeticSample>,
        skipped: usize,
        last_failure: Option<PositionError>,
    ) -> Self {
        Self {
            name: elements.name().to_string(),
            norad_id: elements.norad_id(),
            start,
            step,
            samples,
            skipped,
            last_failure,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn norad_id(&self) -> u64 {
        self.norad_id
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn samples(&self) -> &[GeodeticSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of steps whose position could not be computed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn last_failure(&self) -> Option<&PositionError> {
        self.last_failure.as_ref()
    }

    /// True when no step produced a sample although some were attempted.
    pub fn all_failed(&self) -> bool {
        self.samples.is_empty() && self.skipped > 0
    }

    /// Every `every`-th sample projected onto the surface. `0` is treated as 1.
    pub fn ground_track(&self, every: usize) -> Vec<GroundPoint> {
        self.samples
            .iter()
            .step_by(every.max(1))
            .map(GroundPoint::from)
            .collect()
    }
}

fn serialize_seconds<S: Serializer>(step: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(step.num_seconds() as f64 + f64::from(step.subsec_nanos()) / 1e9)
}

fn serialize_failure<S: Serializer>(
    failure: &Option<PositionError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match failure {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}
