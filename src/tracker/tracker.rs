use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use super::error::TrackerError;
use super::state::{TrackerConfig, TrackerPhase, TrackerSnapshot, TrackerState};
use crate::clock::Clock;
use crate::elements::OrbitalElementSet;
use crate::propagate::Propagator;
use crate::sampler::position_at;
use crate::source::ElementSource;

/// The collaborators every tracker runs against.
#[derive(Clone)]
pub struct TrackerContext {
    pub source: Arc<dyn ElementSource>,
    pub propagator: Arc<dyn Propagator>,
    pub clock: Arc<dyn Clock>,
    pub config: TrackerConfig,
}

/// Cooperative cancellation flag shared between a tracker and anyone
/// holding a clone.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { tx: Arc::new(tx) }, rx)
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

#[derive(Debug)]
enum Command {
    Supply(OrbitalElementSet),
}

/// Handle to one satellite's polling task. Dropping it cancels the task.
pub struct Tracker {
    norad_id: u64,
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<TrackerSnapshot>,
    cancel: CancelHandle,
    join: Option<JoinHandle<()>>,
}

impl Tracker {
    /// Starts tracking `norad_id`. Must be called from within a tokio runtime.
    pub fn spawn(norad_id: u64, context: TrackerContext) -> Result<Self, TrackerError> {
        context.config.validate()?;

        let state = TrackerState::new(norad_id, &context.config);
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (cancel, cancel_rx) = CancelHandle::new();

        let worker = Worker {
            norad_id,
            last_phase: state.phase(),
            state,
            context,
            cancel: cancel.clone(),
            snapshots: snapshot_tx,
        };
        let join = tokio::spawn(worker.run(command_rx, cancel_rx));

        Ok(Self {
            norad_id,
            commands: command_tx,
            snapshots: snapshot_rx,
            cancel,
            join: Some(join),
        })
    }

    pub fn norad_id(&self) -> u64 {
        self.norad_id
    }

    /// Hands the tracker a new element set. It is applied on the tracker's
    /// own task, followed by an immediate update.
    pub fn supply(&self, elements: OrbitalElementSet) -> Result<(), TrackerError> {
        if elements.norad_id() != self.norad_id {
            return Err(TrackerError::WrongSatellite {
                expected: self.norad_id,
                got: elements.norad_id(),
            });
        }
        if self.cancel.is_cancelled() {
            return Err(TrackerError::Stopped(self.norad_id));
        }
        self.commands
            .send(Command::Supply(elements))
            .map_err(|_| TrackerError::Stopped(self.norad_id))
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot> {
        self.snapshots.clone()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancels the task, waits for it to exit and returns the final snapshot.
    pub async fn stop(mut self) -> TrackerSnapshot {
        self.cancel.cancel();
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                log::error!("Tracker task for {} failed: {}", self.norad_id, e);
            }
        }
        self.snapshot()
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Worker {
    norad_id: u64,
    state: TrackerState,
    last_phase: TrackerPhase,
    context: TrackerContext,
    cancel: CancelHandle,
    snapshots: watch::Sender<TrackerSnapshot>,
}

impl Worker {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut cancel_rx: watch::Receiver<bool>,
    ) {
        log::info!("Tracker for {} started", self.norad_id);

        let cadence = self.context.config.cadence;
        let mut ticker = interval_at(Instant::now() + cadence, cadence);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut refresh = self.context.config.refresh.map(|period| {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        self.lookup();

        while !self.cancel.is_cancelled() {
            tokio::select! {
                biased;

                changed = cancel_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                command = commands.recv() => match command {
                    Some(Command::Supply(elements)) => {
                        if self.apply(elements) {
                            ticker.reset();
                        }
                    }
                    None => break,
                },
                _ = ticker.tick() => self.tick(),
                _ = next_refresh(&mut refresh) => {
                    if self.refresh() {
                        ticker.reset();
                    }
                }
            }
        }

        self.state.stop();
        self.publish();
        log::info!("Tracker for {} stopped", self.norad_id);
    }

    fn tick(&mut self) {
        match self.state.phase() {
            TrackerPhase::Idle => {
                self.lookup();
            }
            TrackerPhase::Tracking | TrackerPhase::Degraded => self.update(),
            TrackerPhase::Stopped => {}
        }
    }

    fn lookup(&mut self) -> bool {
        match self.context.source.lookup(self.norad_id) {
            Some(elements) => self.apply(elements),
            None => {
                log::debug!("No elements for {} yet", self.norad_id);
                false
            }
        }
    }

    /// Applies elements from the source only if their epoch is strictly
    /// newer than what is held.
    fn refresh(&mut self) -> bool {
        let Some(fresh) = self.context.source.lookup(self.norad_id) else {
            return false;
        };
        let newer = self
            .state
            .elements()
            .map_or(true, |held| fresh.is_newer_than(held));
        newer && self.apply(fresh)
    }

    fn apply(&mut self, elements: OrbitalElementSet) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        log::info!(
            "Tracker for {} using elements '{}' with epoch {}",
            self.norad_id,
            elements.name(),
            elements.epoch()
        );
        self.state.supply(elements);
        self.publish();
        self.update();
        true
    }

    fn update(&mut self) {
        let Some(elements) = self.state.elements() else {
            return;
        };
        let now = self.context.clock.now();
        let result = position_at(self.context.propagator.as_ref(), elements, now);

        if self.cancel.is_cancelled() {
            log::debug!("Discarding update for {} after cancellation", self.norad_id);
            return;
        }
        match result {
            Ok(sample) => self.state.record_success(sample),
            Err(e) => {
                log::debug!("Update for {} failed: {}", self.norad_id, e);
                self.state.record_failure(e.to_string());
            }
        }
        self.publish();
    }

    fn publish(&mut self) {
        let phase = self.state.phase();
        if phase != self.last_phase {
            match phase {
                TrackerPhase::Degraded => log::warn!(
                    "Tracker for {}: {} -> {}",
                    self.norad_id,
                    self.last_phase,
                    phase
                ),
                _ => log::info!(
                    "Tracker for {}: {} -> {}",
                    self.norad_id,
                    self.last_phase,
                    phase
                ),
            }
            self.last_phase = phase;
        }
        self.snapshots.send_replace(self.state.snapshot());
    }
}

async fn next_refresh(refresh: &mut Option<Interval>) {
    match refresh {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
