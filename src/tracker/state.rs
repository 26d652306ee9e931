use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

use super::error::TrackerError;
use crate::config::{deserialize_optional_std_duration, deserialize_std_duration};
use crate::elements::{ElementSummary, OrbitalElementSet};
use crate::frame::GeodeticSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrackerPhase {
    /// No element set available yet.
    Idle,
    Tracking,
    /// The last `failure_threshold` updates all failed.
    Degraded,
    Stopped,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    #[serde(deserialize_with = "deserialize_std_duration")]
    pub cadence: Duration,
    pub failure_threshold: u32,
    /// How often to ask the element source for fresher elements.
    #[serde(deserialize_with = "deserialize_optional_std_duration")]
    pub refresh: Option<Duration>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            cadence: Duration::from_secs(5),
            failure_threshold: 3,
            refresh: Some(Duration::from_secs(600)),
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.cadence.is_zero() {
            return Err(TrackerError::InvalidConfig(
                "tracker.cadence must be positive".into(),
            ));
        }
        if self.failure_threshold == 0 {
            return Err(TrackerError::InvalidConfig(
                "tracker.failure_threshold must be at least 1".into(),
            ));
        }
        if self.refresh.is_some_and(|r| r.is_zero()) {
            return Err(TrackerError::InvalidConfig(
                "tracker.refresh must be positive or off".into(),
            ));
        }
        Ok(())
    }
}

/// What a tracker's task owns. Every mutation is a no-op once stopped.
#[derive(Debug)]
pub(crate) struct TrackerState {
    norad_id: u64,
    elements: Option<OrbitalElementSet>,
    last_sample: Option<GeodeticSample>,
    last_error: Option<String>,
    consecutive_failures: u32,
    phase: TrackerPhase,
    cadence: Duration,
    failure_threshold: u32,
}

impl TrackerState {
    pub(crate) fn new(norad_id: u64, config: &TrackerConfig) -> Self {
        Self {
            norad_id,
            elements: None,
            last_sample: None,
            last_error: None,
            consecutive_failures: 0,
            phase: TrackerPhase::Idle,
            cadence: config.cadence,
            failure_threshold: config.failure_threshold.max(1),
        }
    }

    pub(crate) fn phase(&self) -> TrackerPhase {
        self.phase
    }

    pub(crate) fn elements(&self) -> Option<&OrbitalElementSet> {
        self.elements.as_ref()
    }

    pub(crate) fn supply(&mut self, elements: OrbitalElementSet) {
        if self.phase == TrackerPhase::Stopped {
            return;
        }
        self.elements = Some(elements);
        self.last_error = None;
        self.consecutive_failures = 0;
        self.phase = TrackerPhase::Tracking;
    }

    pub(crate) fn record_success(&mut self, sample: GeodeticSample) {
        if self.phase == TrackerPhase::Stopped {
            return;
        }
        self.last_sample = Some(sample);
        self.last_error = None;
        self.consecutive_failures = 0;
        self.phase = TrackerPhase::Tracking;
    }

    pub(crate) fn record_failure(&mut self, error: String) {
        if self.phase == TrackerPhase::Stopped {
            return;
        }
        self.last_error = Some(error);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if self.consecutive_failures >= self.failure_threshold {
            self.phase = TrackerPhase::Degraded;
        }
    }

    pub(crate) fn stop(&mut self) {
        self.phase = TrackerPhase::Stopped;
    }

    pub(crate) fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            norad_id: self.norad_id,
            phase: self.phase,
            elements: self.elements.as_ref().map(OrbitalElementSet::summary),
            last_sample: self.last_sample,
            last_error: self.last_error.clone(),
            consecutive_failures: self.consecutive_failures,
            cadence_seconds: self.cadence.as_secs_f64(),
        }
    }
}

/// Read-only copy of a tracker's state as published to observers.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TrackerSnapshot {
    pub norad_id: u64,
    pub phase: TrackerPhase,
    pub elements: Option<ElementSummary>,
    pub last_sample: Option<GeodeticSample>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    pub cadence_seconds: f64,
}

impl TrackerSnapshot {
    pub fn feed(&self) -> PositionFeed {
        match (self.phase, self.last_sample) {
            (TrackerPhase::Stopped, _) => PositionFeed::Stopped,
            (TrackerPhase::Idle, _) => PositionFeed::NoData,
            (TrackerPhase::Tracking, Some(sample)) => PositionFeed::Tracking { sample },
            (TrackerPhase::Tracking, None) => match &self.last_error {
                Some(error) => PositionFeed::Unavailable {
                    error: error.clone(),
                    last_known: None,
                },
                None => PositionFeed::NoData,
            },
            (TrackerPhase::Degraded, last_known) => PositionFeed::Unavailable {
                error: self.last_error.clone().unwrap_or_default(),
                last_known,
            },
        }
    }
}

/// The single-position feed handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PositionFeed {
    NoData,
    Tracking {
        sample: GeodeticSample,
    },
    Unavailable {
        error: String,
        last_known: Option<GeodeticSample>,
    },
    Stopped,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const ISS_LINE1: &str =
        "1 25544U 98067A   25304.12345678  .00016717  00000-0  10270-3 0  9995";
    const ISS_LINE2: &str =
        "2 25544  51.6456 123.4567 0003456  87.6543 272.3456 15.72112345678908";

    fn sample() -> GeodeticSample {
        GeodeticSample {
            timestamp: Utc.with_ymd_and_hms(2025, 10, 31, 3, 0, 0).unwrap(),
            latitude_deg: 12.5,
            longitude_deg: -40.0,
            altitude_km: 365.0,
            speed_km_s: Some(7.68),
        }
    }

    fn tracking_state(threshold: u32) -> TrackerState {
        let config = TrackerConfig {
            failure_threshold: threshold,
            ..TrackerConfig::default()
        };
        let mut state = TrackerState::new(25544, &config);
        state.supply(OrbitalElementSet::parse(None, ISS_LINE1, ISS_LINE2).unwrap());
        state
    }

    #[test]
    fn degrades_only_at_threshold() {
        let mut state = tracking_state(3);
        state.record_failure("one".into());
        state.record_failure("two".into());
        assert_eq!(state.phase(), TrackerPhase::Tracking);
        state.record_failure("three".into());
        assert_eq!(state.phase(), TrackerPhase::Degraded);

        state.record_success(sample());
        let snapshot = state.snapshot();
        assert_eq!(snapshot.phase, TrackerPhase::Tracking);
        assert_eq!(snapshot.consecutive_failures, 0);
        assert_eq!(snapshot.last_error, None);
    }

    #[test]
    fn stopped_state_ignores_mutation() {
        let mut state = tracking_state(1);
        state.stop();
        state.record_success(sample());
        state.record_failure("late".into());

        let snapshot = state.snapshot();
        assert_eq!(snapshot.phase, TrackerPhase::Stopped);
        assert_eq!(snapshot.last_sample, None);
        assert_eq!(snapshot.last_error, None);
        assert_eq!(snapshot.feed(), PositionFeed::Stopped);
    }

    #[test]
    fn feed_reflects_phase() {
        let idle = TrackerState::new(25544, &TrackerConfig::default());
        assert_eq!(idle.snapshot().feed(), PositionFeed::NoData);

        let mut state = tracking_state(1);
        state.record_success(sample());
        assert_eq!(
            state.snapshot().feed(),
            PositionFeed::Tracking { sample: sample() }
        );

        state.record_failure("decayed".into());
        assert_eq!(
            state.snapshot().feed(),
            PositionFeed::Unavailable {
                error: "decayed".into(),
                last_known: Some(sample()),
            }
        );
    }

    #[test]
    fn feed_serializes_with_status_tag() {
        let json = serde_json::to_value(PositionFeed::NoData).unwrap();
        assert_eq!(json["status"], "no_data");

        let json = serde_json::to_value(PositionFeed::Tracking { sample: sample() }).unwrap();
        assert_eq!(json["status"], "tracking");
        assert_eq!(json["sample"]["altitude_km"], 365.0);
    }

    #[test]
    fn phase_displays_snake_case() {
        assert_eq!(TrackerPhase::Degraded.to_string(), "degraded");
    }

    #[test]
    fn rejects_zero_cadence() {
        let config = TrackerConfig {
            cadence: Duration::ZERO,
            ..TrackerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TrackerError::InvalidConfig(_))
        ));
    }
}
