use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("tracker for {0} has stopped")]
    Stopped(u64),
    #[error("invalid tracker configuration: {0}")]
    InvalidConfig(String),
    #[error("elements for {got} supplied to the tracker of {expected}")]
    WrongSatellite { expected: u64, got: u64 },
    #[error("satellite {0} is not being tracked")]
    NotWatched(u64),
}
