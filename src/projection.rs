//! Result projection: the externally visible diff.
//!
//! Every record carries the pre-plan gate and the new gate, so the
//! aggregate diff and per-flight transitions are reproducible from the
//! result alone.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{format_hhmm, ScheduleState};
use crate::model::{AssignmentModel, COST_SCALE};

/// One flight's transition in the final plan.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentRecord {
    pub flight: String,
    pub original_gate: String,
    pub new_gate: String,
    /// Departure estimate after the event, `HH:MM`.
    pub time: String,
}

impl AssignmentRecord {
    pub fn is_change(&self) -> bool {
        self.original_gate != self.new_gate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Success,
    Warning,
    Failed,
}

/// The response envelope returned for every processed event.
#[derive(Debug, Clone, Serialize)]
pub struct ReassignResponse {
    pub plan_id: Uuid,
    pub status: PlanStatus,
    pub assignment: Vec<AssignmentRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Total relocation cost in original (unscaled) units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective_value: Option<f64>,
}

impl ReassignResponse {
    pub fn success(assignment: Vec<AssignmentRecord>, objective_value: f64) -> Self {
        Self {
            plan_id: Uuid::new_v4(),
            status: PlanStatus::Success,
            assignment,
            message: None,
            objective_value: Some(objective_value),
        }
    }

    pub fn warning(
        assignment: Vec<AssignmentRecord>,
        message: String,
        objective_value: Option<f64>,
    ) -> Self {
        Self {
            plan_id: Uuid::new_v4(),
            status: PlanStatus::Warning,
            assignment,
            message: Some(message),
            objective_value,
        }
    }

    pub fn failed(message: String) -> Self {
        Self {
            plan_id: Uuid::new_v4(),
            status: PlanStatus::Failed,
            assignment: Vec::new(),
            message: Some(message),
            objective_value: None,
        }
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }

    /// Number of flights whose gate changed.
    pub fn changes(&self) -> usize {
        self.assignment.iter().filter(|r| r.is_change()).count()
    }
}

/// Project a solved gate choice against the working schedule.
pub fn project(
    state: &ScheduleState,
    model: &AssignmentModel,
    gates: &[usize],
) -> Vec<AssignmentRecord> {
    state
        .flights
        .iter()
        .enumerate()
        .map(|(i, flight)| AssignmentRecord {
            flight: flight.no.clone(),
            original_gate: model.gate_ids[model.original_gate[i]].clone(),
            new_gate: model.gate_ids[gates[i]].clone(),
            time: format_hhmm(flight.departure),
        })
        .collect()
}

/// Identity projection: every flight keeps its current gate. Used by the
/// no-op shortcuts that bypass the optimizer.
pub fn project_identity(state: &ScheduleState) -> Vec<AssignmentRecord> {
    state
        .flights
        .iter()
        .map(|flight| AssignmentRecord {
            flight: flight.no.clone(),
            original_gate: flight.gate.clone(),
            new_gate: flight.gate.clone(),
            time: format_hhmm(flight.departure),
        })
        .collect()
}

/// Relocation cost of the identity assignment in original units. Zero for
/// any matrix with a zero diagonal.
pub fn identity_cost(state: &ScheduleState) -> f64 {
    state
        .flights
        .iter()
        .filter_map(|f| state.distances.index_of(&f.gate))
        .map(|j| state.distances.cost(j, j))
        .sum()
}

/// Descale a fixed-point objective back to original units.
pub fn descale_objective(objective: i64) -> f64 {
    objective as f64 / COST_SCALE as f64
}
