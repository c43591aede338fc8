// src/error.rs

use thiserror::Error;

/// Result alias used across the solver.
pub type MdpResult<T> = Result<T, MdpError>;

/// Everything that can go wrong while building or solving an inventory MDP.
///
/// Input problems are detected before any matrix is built, so a solve either
/// returns a complete `Solution` or one of these.
#[derive(Debug, Error)]
pub enum MdpError {
    #[error("invalid capacity {capacity}: {reason}")]
    InvalidCapacity { capacity: i64, reason: String },

    #[error("invalid horizon {horizon}: the horizon must be a positive number of periods")]
    InvalidHorizon { horizon: i64 },

    #[error("malformed demand distribution: {0}")]
    MalformedDistribution(String),

    /// Internal invariant: the solver must only ever enumerate feasible actions.
    #[error("infeasible action: ordering {inbound} units on top of {before} exceeds capacity {capacity}")]
    InfeasibleAction {
        before: usize,
        inbound: usize,
        capacity: usize,
    },

    #[error("dimension mismatch for {what}: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    DimensionMismatch {
        what: &'static str,
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("invalid transition matrix at row {row}: {reason}")]
    InvalidTransition { row: usize, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("demand sampling error: {0}")]
    Sampling(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
