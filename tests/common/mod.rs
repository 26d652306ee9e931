#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use sat_track::clock::ManualClock;
use sat_track::elements::{checksum, OrbitalElementSet};
use sat_track::propagate::{EciVector, PropagationFailure, Propagator};
use sat_track::source::MemorySource;
use sat_track::tracker::{CancelHandle, TrackerConfig, TrackerContext};

pub const ISS_NAME: &str = "ISS (ZARYA)";
pub const ISS_LINE1: &str =
    "1 25544U 98067A   25304.12345678  .00016717  00000-0  10270-3 0  9995";
pub const ISS_LINE2: &str =
    "2 25544  51.6456 123.4567 0003456  87.6543 272.3456 15.72112345678908";
pub const ISS_ID: u64 = 25544;

pub fn iss() -> OrbitalElementSet {
    OrbitalElementSet::parse(Some(ISS_NAME), ISS_LINE1, ISS_LINE2).unwrap()
}

/// The ISS elements with line 1's epoch field replaced, e.g. `25305.12345678`.
pub fn iss_with_epoch(epoch: &str) -> OrbitalElementSet {
    let body = ISS_LINE1[..68].replace("25304.12345678", epoch);
    let line1 = format!("{body}{}", checksum(&body));
    OrbitalElementSet::parse(Some(ISS_NAME), &line1, ISS_LINE2).unwrap()
}

/// Answers each call from a script of outcomes, then from a fallback.
pub struct ScriptedPropagator {
    script: Mutex<VecDeque<bool>>,
    fallback: bool,
    calls: AtomicUsize,
    cancel_on_call: Mutex<Option<CancelHandle>>,
}

impl ScriptedPropagator {
    pub fn succeeding() -> Self {
        Self::scripted(&[], true)
    }

    pub fn failing() -> Self {
        Self::scripted(&[], false)
    }

    pub fn scripted(outcomes: &[bool], fallback: bool) -> Self {
        Self {
            script: Mutex::new(outcomes.iter().copied().collect()),
            fallback,
            calls: AtomicUsize::new(0),
            cancel_on_call: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Cancels `handle` from inside the next propagation, before it returns.
    pub fn cancel_during_next_call(&self, handle: CancelHandle) {
        *self.cancel_on_call.lock().unwrap() = Some(handle);
    }
}

impl Propagator for ScriptedPropagator {
    fn propagate(
        &self,
        _elements: &OrbitalElementSet,
        at: DateTime<Utc>,
    ) -> Result<EciVector, PropagationFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.cancel_on_call.lock().unwrap().take() {
            handle.cancel();
        }

        let succeed = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);
        if succeed {
            Ok(EciVector::new(at, [6778.137, 0.0, 0.0]).with_velocity([0.0, 7.67, 0.0]))
        } else {
            Err(PropagationFailure::Model("scripted failure".into()))
        }
    }
}

pub struct Harness {
    pub source: Arc<MemorySource>,
    pub propagator: Arc<ScriptedPropagator>,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new(propagator: ScriptedPropagator) -> Self {
        Self {
            source: Arc::new(MemorySource::new()),
            propagator: Arc::new(propagator),
            clock: ManualClock::new(iss().epoch()),
        }
    }

    pub fn with_iss(propagator: ScriptedPropagator) -> Self {
        let harness = Self::new(propagator);
        harness.source.insert(iss());
        harness
    }

    pub fn context(&self, config: TrackerConfig) -> TrackerContext {
        TrackerContext {
            source: self.source.clone(),
            propagator: self.propagator.clone(),
            clock: Arc::new(self.clock.clone()),
            config,
        }
    }
}

pub fn config(failure_threshold: u32) -> TrackerConfig {
    TrackerConfig {
        cadence: std::time::Duration::from_secs(5),
        failure_threshold,
        refresh: None,
    }
}
