use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropagationFailure {
    #[error("degenerate elements: {0}")]
    Degenerate(String),
    #[error("{offset_days:.1} days from element epoch exceeds the {window_days:.1} day validity window")]
    OutsideValidity { offset_days: f64, window_days: f64 },
    #[error("propagation error: {0}")]
    Model(String),
    #[error("propagation produced a non-finite state vector")]
    NonFinite,
}
