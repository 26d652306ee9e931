use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use super::track::Track;
use super::SamplerError;
use crate::elements::OrbitalElementSet;
use crate::frame::{eci_to_geodetic, FrameConversionSingularity, GeodeticSample};
use crate::propagate::{PropagationFailure, Propagator};

/// Why a single instant could not be located.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PositionError {
    #[error(transparent)]
    Propagation(#[from] PropagationFailure),
    #[error("frame conversion failed: {0}")]
    Frame(#[from] FrameConversionSingularity),
}

/// Propagates `elements` to `at` and converts the result to geodetic
/// coordinates.
pub fn position_at(
    propagator: &dyn Propagator,
    elements: &OrbitalElementSet,
    at: DateTime<Utc>,
) -> Result<GeodeticSample, PositionError> {
    let eci = propagator.propagate(elements, at)?;
    Ok(eci_to_geodetic(&eci)?)
}

/// Samples `[start, start + duration]` every `step`. Failing instants are
/// skipped and counted on the returned track.
pub fn build_trajectory(
    propagator: &dyn Propagator,
    elements: &OrbitalElementSet,
    start: DateTime<Utc>,
    duration: Duration,
    step: Duration,
    max_steps: usize,
) -> Result<Track, SamplerError> {
    let step_ns = total_nanos(step);
    if step_ns <= 0 {
        return Err(SamplerError::InvalidWindow(format!(
            "step must be positive, got {step}"
        )));
    }
    if duration < Duration::zero() {
        return Err(SamplerError::InvalidWindow(format!(
            "duration must not be negative, got {duration}"
        )));
    }
    if start.checked_add_signed(duration).is_none() {
        return Err(SamplerError::InvalidWindow(format!(
            "window of {duration} from {start} ends outside the supported date range"
        )));
    }

    let count = total_nanos(duration) / step_ns + 1;
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    if count > max_steps {
        return Err(SamplerError::TooManySteps {
            requested: count,
            limit: max_steps,
        });
    }

    let mut samples = Vec::with_capacity(count);
    let mut skipped = 0;
    let mut last_failure = None;

    for i in 0..count {
        // never past start + duration, which was checked above
        let Some(timestamp) = start.checked_add_signed(from_nanos(step_ns * i as i128)) else {
            break;
        };
        match position_at(propagator, elements, timestamp) {
            Ok(sample) => samples.push(sample),
            Err(e) => {
                log::debug!("{}: skipping {}: {}", elements.name(), timestamp, e);
                skipped += 1;
                last_failure = Some(e);
            }
        }
    }

    if skipped > 0 {
        log::warn!(
            "{}: {} of {} steps failed to propagate",
            elements.name(),
            skipped,
            count
        );
    }

    Ok(Track::new(
        elements,
        start,
        step,
        samples,
        skipped,
        last_failure,
    ))
}

fn total_nanos(d: Duration) -> i128 {
    i128::from(d.num_seconds()) * 1_000_000_000 + i128::from(d.subsec_nanos())
}

/// Inverse of `total_nanos` for offsets no larger than a valid `Duration`.
fn from_nanos(nanos: i128) -> Duration {
    let secs = (nanos / 1_000_000_000) as i64;
    let subsec = (nanos % 1_000_000_000) as i64;
    Duration::seconds(secs) + Duration::nanoseconds(subsec)
}
