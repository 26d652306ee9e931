use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::error::TrackerError;
use super::state::{PositionFeed, TrackerSnapshot};
use super::tracker::{Tracker, TrackerContext};
use crate::elements::OrbitalElementSet;

struct Watched {
    tracker: Tracker,
    observers: usize,
}

struct Inner {
    context: TrackerContext,
    trackers: Mutex<HashMap<u64, Watched>>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<u64, Watched>> {
        self.trackers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, norad_id: u64) {
        let removed = {
            let mut trackers = self.lock();
            let Some(watched) = trackers.get_mut(&norad_id) else {
                return;
            };
            watched.observers -= 1;
            if watched.observers > 0 {
                return;
            }
            trackers.remove(&norad_id)
        };
        // Dropping the tracker outside the lock cancels it.
        if let Some(watched) = removed {
            log::info!("Last observer of {} detached", watched.tracker.norad_id());
        }
    }
}

/// One tracker per satellite, alive while at least one [`Subscription`]
/// for it exists.
#[derive(Clone)]
pub struct TrackerRegistry {
    inner: Arc<Inner>,
}

impl TrackerRegistry {
    pub fn new(context: TrackerContext) -> Result<Self, TrackerError> {
        context.config.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                context,
                trackers: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Attaches an observer, starting the satellite's tracker if it is the
    /// first one.
    pub fn subscribe(&self, norad_id: u64) -> Result<Subscription, TrackerError> {
        let mut trackers = self.inner.lock();
        let watched = match trackers.entry(norad_id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let tracker = Tracker::spawn(norad_id, self.inner.context.clone())?;
                entry.insert(Watched {
                    tracker,
                    observers: 0,
                })
            }
        };
        watched.observers += 1;

        Ok(Subscription {
            norad_id,
            receiver: watched.tracker.subscribe(),
            registry: Arc::clone(&self.inner),
        })
    }

    pub fn supply(&self, elements: OrbitalElementSet) -> Result<(), TrackerError> {
        let norad_id = elements.norad_id();
        match self.inner.lock().get(&norad_id) {
            Some(watched) => watched.tracker.supply(elements),
            None => Err(TrackerError::NotWatched(norad_id)),
        }
    }

    pub fn snapshot(&self, norad_id: u64) -> Option<TrackerSnapshot> {
        self.inner
            .lock()
            .get(&norad_id)
            .map(|watched| watched.tracker.snapshot())
    }

    pub fn snapshots(&self) -> Vec<TrackerSnapshot> {
        let mut snapshots: Vec<_> = self
            .inner
            .lock()
            .values()
            .map(|watched| watched.tracker.snapshot())
            .collect();
        snapshots.sort_by_key(|s| s.norad_id);
        snapshots
    }

    pub fn observers(&self, norad_id: u64) -> usize {
        self.inner
            .lock()
            .get(&norad_id)
            .map_or(0, |watched| watched.observers)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An observer's hold on a tracker. Dropping the last one for a satellite
/// stops its tracker.
pub struct Subscription {
    norad_id: u64,
    receiver: watch::Receiver<TrackerSnapshot>,
    registry: Arc<Inner>,
}

impl Subscription {
    pub fn norad_id(&self) -> u64 {
        self.norad_id
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        self.receiver.borrow().clone()
    }

    pub fn feed(&self) -> PositionFeed {
        self.receiver.borrow().feed()
    }

    /// Waits for the next published snapshot. Returns `false` once the
    /// tracker has exited.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    /// A receiver that outlives this subscription without keeping the
    /// tracker alive.
    pub fn receiver(&self) -> watch::Receiver<TrackerSnapshot> {
        self.receiver.clone()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.release(self.norad_id);
    }
}
