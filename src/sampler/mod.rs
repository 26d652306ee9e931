//! Fixed-step position sampling over a time window.

mod track;
mod trajectory;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::config::deserialize_time_delta;
use crate::elements::OrbitalElementSet;
use crate::propagate::Propagator;

pub use track::{GroundPoint, Track};
pub use trajectory::{build_trajectory, position_at, PositionError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplerError {
    #[error("invalid window: {0}")]
    InvalidWindow(String),
    #[error("window needs {requested} steps, limit is {limit}")]
    TooManySteps { requested: usize, limit: usize },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    #[serde(deserialize_with = "deserialize_time_delta")]
    pub step: Duration,
    #[serde(deserialize_with = "deserialize_time_delta")]
    pub duration: Duration,
    pub ground_track_every: usize,
    pub max_steps: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            step: Duration::seconds(60),
            duration: Duration::hours(6),
            ground_track_every: 10,
            max_steps: 100_000,
        }
    }
}

/// Drives a propagator over time windows.
#[derive(Clone)]
pub struct Sampler {
    propagator: Arc<dyn Propagator>,
    config: SamplerConfig,
}

impl Sampler {
    pub fn new(propagator: Arc<dyn Propagator>, config: SamplerConfig) -> Self {
        Self { propagator, config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn sample(
        &self,
        elements: &OrbitalElementSet,
        start: DateTime<Utc>,
        duration: Duration,
        step: Duration,
    ) -> Result<Track, SamplerError> {
        build_trajectory(
            self.propagator.as_ref(),
            elements,
            start,
            duration,
            step,
            self.config.max_steps,
        )
    }

    /// Samples with the configured step and duration.
    pub fn sample_default(
        &self,
        elements: &OrbitalElementSet,
        start: DateTime<Utc>,
    ) -> Result<Track, SamplerError> {
        self.sample(elements, start, self.config.duration, self.config.step)
    }
}
