//! Propagator adapter: elements + instant to an inertial state vector.

mod adapter;
mod eci;
mod error;

use chrono::{DateTime, Utc};

use crate::elements::OrbitalElementSet;

pub use adapter::Sgp4Propagator;
pub use eci::EciVector;
pub use error::PropagationFailure;

/// An orbit propagation capability.
///
/// Implementations must be deterministic, must not mutate `elements`, and
/// must return an error instead of a non-finite vector.
pub trait Propagator: Send + Sync {
    fn propagate(
        &self,
        elements: &OrbitalElementSet,
        at: DateTime<Utc>,
    ) -> Result<EciVector, PropagationFailure>;
}
