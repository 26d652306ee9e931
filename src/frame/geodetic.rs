use std::f64::consts::{PI, TAU};

use thiserror::Error;

use super::gmst::gmst;
use super::sample::GeodeticSample;
use crate::propagate::EciVector;

/// WGS-84 semi-major axis, km.
pub const WGS84_A_KM: f64 = 6378.137;
/// WGS-84 semi-minor axis, km.
pub const WGS84_B_KM: f64 = 6356.7523142;

const SOLVER_ITERATIONS: usize = 10;
/// Below this distance from the rotation axis the point is treated as polar.
const POLAR_AXIS_EPSILON_KM: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameConversionSingularity {
    #[error("position vector has a non-finite component")]
    NonFinite,
    #[error("position vector is at the centre of the Earth")]
    Origin,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub semi_major_km: f64,
    pub semi_minor_km: f64,
}

pub const WGS84: Ellipsoid = Ellipsoid {
    semi_major_km: WGS84_A_KM,
    semi_minor_km: WGS84_B_KM,
};

impl Ellipsoid {
    pub fn flattening(&self) -> f64 {
        (self.semi_major_km - self.semi_minor_km) / self.semi_major_km
    }

    pub fn eccentricity_squared(&self) -> f64 {
        let f = self.flattening();
        2.0 * f - f * f
    }

    /// Geodetic latitude (rad) and height (km) of an Earth-fixed point.
    fn latitude_height(&self, r: f64, z: f64) -> (f64, f64) {
        let a = self.semi_major_km;
        let e2 = self.eccentricity_squared();

        let mut latitude = z.atan2(r * (1.0 - e2));
        let mut height = 0.0;
        for _ in 0..SOLVER_ITERATIONS {
            let sin_lat = latitude.sin();
            let c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
            height = r * latitude.cos() + z * sin_lat - a / c;
            latitude = (z + a * c * e2 * sin_lat).atan2(r);
        }
        (latitude, height)
    }

    /// Converts an inertial vector to latitude, longitude and altitude,
    /// rotating by GMST at the vector's timestamp.
    pub fn eci_to_geodetic(
        &self,
        eci: &EciVector,
    ) -> Result<GeodeticSample, FrameConversionSingularity> {
        if !eci.position_km.iter().all(|c| c.is_finite()) {
            return Err(FrameConversionSingularity::NonFinite);
        }

        let [x, y, z] = eci.position_km;
        let r = (x * x + y * y).sqrt();

        if r < POLAR_AXIS_EPSILON_KM {
            if z == 0.0 {
                return Err(FrameConversionSingularity::Origin);
            }
            // longitude is undefined on the axis; report 0
            return Ok(GeodeticSample {
                timestamp: eci.timestamp,
                latitude_deg: 90.0 * z.signum(),
                longitude_deg: 0.0,
                altitude_km: z.abs() - self.semi_minor_km,
                speed_km_s: eci.speed_km_s(),
            });
        }

        let longitude = normalize_longitude(y.atan2(x) - gmst(eci.timestamp));
        let (latitude, height) = self.latitude_height(r, z);

        Ok(GeodeticSample {
            timestamp: eci.timestamp,
            latitude_deg: latitude.to_degrees().clamp(-90.0, 90.0),
            longitude_deg: wrap_degrees(longitude.to_degrees()),
            altitude_km: height,
            speed_km_s: eci.speed_km_s(),
        })
    }
}

/// ECI to geodetic on WGS-84.
pub fn eci_to_geodetic(eci: &EciVector) -> Result<GeodeticSample, FrameConversionSingularity> {
    WGS84.eci_to_geodetic(eci)
}

/// Brings a longitude in radians into [-π, π) by whole turns. Values already
/// in range are returned unchanged; non-finite values are returned as is.
pub fn normalize_longitude(longitude: f64) -> f64 {
    if !longitude.is_finite() {
        return longitude;
    }
    let mut longitude = longitude;
    while longitude < -PI {
        longitude += TAU;
    }
    while longitude >= PI {
        longitude -= TAU;
    }
    longitude
}

// radian-to-degree rounding can land exactly on 180
fn wrap_degrees(longitude_deg: f64) -> f64 {
    if longitude_deg >= 180.0 {
        longitude_deg - 360.0
    } else {
        longitude_deg
    }
}
