use chrono::{DateTime, Utc};
use std::f64::consts::TAU;

/// Julian date of the Unix epoch.
pub const UNIX_EPOCH_JULIAN_DATE: f64 = 2_440_587.5;
/// Julian date of J2000.0 (2000-01-01T12:00:00).
pub const J2000_JULIAN_DATE: f64 = 2_451_545.0;

const J2000_UNIX_SECONDS: f64 = 946_728_000.0;
const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_CENTURY: f64 = 36_525.0;

fn unix_seconds(t: DateTime<Utc>) -> f64 {
    t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) * 1e-9
}

pub fn julian_date(t: DateTime<Utc>) -> f64 {
    UNIX_EPOCH_JULIAN_DATE + unix_seconds(t) / SECONDS_PER_DAY
}

/// Julian centuries of UT1 (taken as UTC) elapsed since J2000.0.
pub fn julian_centuries_since_j2000(t: DateTime<Utc>) -> f64 {
    (unix_seconds(t) - J2000_UNIX_SECONDS) / SECONDS_PER_DAY / DAYS_PER_CENTURY
}

/// Greenwich mean sidereal time in radians, in [0, 2π).
///
/// IAU-82 expression evaluated on continuous elapsed time, so there is no
/// step at day or year boundaries.
pub fn gmst(t: DateTime<Utc>) -> f64 {
    let tut1 = julian_centuries_since_j2000(t);
    let seconds = -6.2e-6 * tut1 * tut1 * tut1
        + 0.093104 * tut1 * tut1
        + (876_600.0 * 3600.0 + 8_640_184.812866) * tut1
        + 67_310.54841;
    (seconds * TAU / SECONDS_PER_DAY).rem_euclid(TAU)
}
