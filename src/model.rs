//! Assignment model construction.
//!
//! The model covers every flight, not only the flagged subset: global
//! reassignment keeps the search space simple and makes the optimum global.
//! Costs are scaled to fixed-point integers so backend arithmetic stays
//! exact.

use tracing::{debug, info};

use crate::conflict::gate_conflict;
use crate::domain::{GateWindow, ScheduleState, BUFFER_TIME_MIN};
use crate::error::PlanResult;

/// Fixed-point scale applied to distance costs before solving.
pub const COST_SCALE: i64 = 100;

/// A constraint/optimization problem over all flights.
///
/// Gate indices refer to the distance-matrix ordering, which is the full
/// gate universe; `open` marks the selectable subset.
#[derive(Debug, Clone)]
pub struct AssignmentModel {
    pub flight_nos: Vec<String>,
    pub windows: Vec<GateWindow>,
    /// Matrix index of each flight's cost-reference gate.
    pub original_gate: Vec<usize>,
    pub gate_ids: Vec<String>,
    /// Selectability per gate index. Closed gates are excluded from every
    /// flight's domain.
    pub open: Vec<bool>,
    /// Flight index pairs whose windows conflict under the buffer; they
    /// must not share a gate.
    pub conflicts: Vec<(usize, usize)>,
    /// Scaled relocation cost per `[flight][gate]`.
    pub cost: Vec<Vec<i64>>,
    /// Minimum required gap between windows on a shared gate, minutes.
    pub buffer: i32,
}

impl AssignmentModel {
    pub fn num_flights(&self) -> usize {
        self.flight_nos.len()
    }

    pub fn num_gates(&self) -> usize {
        self.gate_ids.len()
    }

    /// Gate indices a flight may select, ascending.
    pub fn open_gates(&self) -> impl Iterator<Item = usize> + '_ {
        self.open
            .iter()
            .enumerate()
            .filter(|(_, o)| **o)
            .map(|(j, _)| j)
    }

    /// Whether flights `i` and `k` may not share a gate.
    pub fn in_conflict(&self, i: usize, k: usize) -> bool {
        gate_conflict(self.windows[i], self.windows[k], self.buffer).is_some()
    }

    /// Objective value of a complete gate choice, in scaled units.
    pub fn objective_of(&self, gates: &[usize]) -> i64 {
        gates
            .iter()
            .enumerate()
            .map(|(i, &j)| self.cost[i][j])
            .sum()
    }
}

/// Translate the working schedule into an [`AssignmentModel`].
pub fn build_model(state: &ScheduleState) -> PlanResult<AssignmentModel> {
    let matrix = &state.distances;
    let gate_ids: Vec<String> = matrix.gate_ids().to_vec();

    // A gate is selectable when the schedule knows it and it is open.
    let mut open = vec![false; gate_ids.len()];
    for gate in &state.gates {
        if gate.open {
            if let Some(j) = matrix.index_of(&gate.id) {
                open[j] = true;
            }
        }
    }

    let mut flight_nos = Vec::with_capacity(state.flights.len());
    let mut windows = Vec::with_capacity(state.flights.len());
    let mut original_gate = Vec::with_capacity(state.flights.len());
    for flight in &state.flights {
        let orig = matrix.index_of(&flight.original_gate).ok_or_else(|| {
            crate::error::PlanError::DataUnavailable(format!(
                "flight {} references gate {} absent from distance matrix",
                flight.no, flight.original_gate
            ))
        })?;
        flight_nos.push(flight.no.clone());
        windows.push(flight.window);
        original_gate.push(orig);
    }

    let mut conflicts = Vec::new();
    for i in 0..windows.len() {
        for k in i + 1..windows.len() {
            if let Some(c) = gate_conflict(windows[i], windows[k], BUFFER_TIME_MIN) {
                debug!(
                    first = %flight_nos[i],
                    second = %flight_nos[k],
                    magnitude = c.magnitude,
                    "Exclusion constraint"
                );
                conflicts.push((i, k));
            }
        }
    }

    let cost: Vec<Vec<i64>> = original_gate
        .iter()
        .map(|&orig| {
            (0..gate_ids.len())
                .map(|j| (matrix.cost(orig, j) * COST_SCALE as f64).round() as i64)
                .collect()
        })
        .collect();

    info!(
        flights = flight_nos.len(),
        gates = gate_ids.len(),
        open = open.iter().filter(|o| **o).count(),
        exclusions = conflicts.len(),
        "Model built"
    );

    Ok(AssignmentModel {
        flight_nos,
        windows,
        original_gate,
        gate_ids,
        open,
        conflicts,
        cost,
        buffer: BUFFER_TIME_MIN,
    })
}
