//! Live per-satellite position tracking.

mod error;
mod registry;
mod state;
mod tracker;

pub use error::TrackerError;
pub use registry::{Subscription, TrackerRegistry};
pub use state::{PositionFeed, TrackerConfig, TrackerPhase, TrackerSnapshot};
pub use tracker::{CancelHandle, Tracker, TrackerContext};
