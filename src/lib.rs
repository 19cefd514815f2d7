//! Real-time flight gate reassignment engine.
//!
//! Given a snapshot of flights bound to airport gates and a stream of
//! perturbation events (gate closures, flight delays), the engine computes
//! a new flight-to-gate assignment that never co-locates time-overlapping
//! flights, avoids closed gates, and minimizes total relocation cost
//! against the distance matrix.
//!
//! The pipeline per event: the event processor mutates a working copy of
//! the schedule, the conflict detector drives the pairwise exclusion
//! constraints, the model builder produces a global assignment problem,
//! an [`solver::Optimizer`] backend solves it under a time budget, the
//! repair heuristic validates and fixes the outcome if needed, and the
//! projector emits the externally visible diff before the new schedule is
//! committed.

pub mod conflict;
pub mod domain;
pub mod engine;
pub mod error;
pub mod event;
pub mod model;
pub mod projection;
pub mod repair;
pub mod solver;

pub use domain::{
    DistanceMatrix, Flight, FlightDelay, Gate, PerturbationEvent, ScheduleState,
};
pub use engine::ReassignmentEngine;
pub use error::{PlanError, PlanResult};
pub use projection::{AssignmentRecord, PlanStatus, ReassignResponse};
pub use solver::{Optimizer, SolveLimits, SolveOutcome};
