//! Planning error types.

use thiserror::Error;

/// Errors that can occur while processing a perturbation event.
///
/// Recoverable per-entry problems (an unknown flight or gate id in a list)
/// are not errors; they are collected as warnings on the event outcome and
/// surfaced in the response message.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A delay carried a time that does not parse as `HH:MM`. Fails the
    /// entire event before any state is touched.
    #[error("invalid time format: '{0}', expected 'HH:MM'")]
    InvalidTimeFormat(String),

    /// Backing flight or distance data is missing or inconsistent at
    /// startup. Fatal for the engine; never retried silently.
    #[error("schedule data unavailable: {0}")]
    DataUnavailable(String),

    /// The distance matrix is not square, or references are inconsistent
    /// with the gate set.
    #[error("invalid distance matrix: {0}")]
    InvalidDistanceMatrix(String),

    /// The optimizer proved that no assignment satisfies every hard
    /// constraint.
    #[error("no feasible assignment: {0}")]
    Infeasible(String),

    /// A flight failed constructor-time validation.
    #[error("invalid flight '{no}': {reason}")]
    InvalidFlight { no: String, reason: String },
}

pub type PlanResult<T> = Result<T, PlanError>;
