//! Optimizer capability interface.
//!
//! The engine consumes any backend satisfying this contract; the bundled
//! [`bnb::BranchAndBoundSolver`] is one conforming implementation.

pub mod bnb;

use std::fmt;
use std::time::Duration;

use crate::model::AssignmentModel;

/// Default wall-clock budget for a single solve.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
pub struct SolveLimits {
    pub time_limit: Duration,
}

impl Default for SolveLimits {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
        }
    }
}

/// A complete gate choice produced by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Gate index (distance-matrix order) per flight, model order.
    pub gates: Vec<usize>,
    /// Total relocation cost in scaled units.
    pub objective: i64,
}

/// Outcome of a solve attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// A solution with proven optimality.
    Optimal(Solution),
    /// A feasible solution without an optimality proof.
    Feasible(Solution),
    /// No assignment satisfies every hard constraint.
    Infeasible,
    /// The time budget ran out; carries the best feasible solution found,
    /// if any.
    Timeout(Option<Solution>),
}

impl SolveOutcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Optimal(s) | SolveOutcome::Feasible(s) => Some(s),
            SolveOutcome::Timeout(s) => s.as_ref(),
            SolveOutcome::Infeasible => None,
        }
    }

    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveOutcome::Optimal(_))
    }
}

impl fmt::Display for SolveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveOutcome::Optimal(s) => write!(f, "Optimal(objective={})", s.objective),
            SolveOutcome::Feasible(s) => write!(f, "Feasible(objective={})", s.objective),
            SolveOutcome::Infeasible => write!(f, "Infeasible"),
            SolveOutcome::Timeout(Some(s)) => write!(f, "Timeout(best={})", s.objective),
            SolveOutcome::Timeout(None) => write!(f, "Timeout(no solution)"),
        }
    }
}

/// Anything that can turn an [`AssignmentModel`] into an assignment within
/// a time budget. Exact solvers, ILP backends, and heuristics all fit.
pub trait Optimizer {
    fn solve(&self, model: &AssignmentModel, limits: &SolveLimits) -> SolveOutcome;
}
