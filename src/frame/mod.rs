//! Inertial to geodetic frame conversion.
//!
//! Altitudes leave this module in kilometres; every other interface in the
//! crate uses the same unit.

mod geodetic;
mod gmst;
mod sample;

pub use geodetic::{
    eci_to_geodetic, normalize_longitude, Ellipsoid, FrameConversionSingularity, WGS84,
    WGS84_A_KM, WGS84_B_KM,
};
pub use gmst::{gmst, julian_centuries_since_j2000, julian_date};
pub use sample::GeodeticSample;
