use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Position over the reference ellipsoid. Degrees and kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeodeticSample {
    pub timestamp: DateTime<Utc>,
    /// [-90, 90]
    pub latitude_deg: f64,
    /// [-180, 180)
    pub longitude_deg: f64,
    pub altitude_km: f64,
    /// Inertial speed, when the propagator supplied a velocity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_km_s: Option<f64>,
}
