//! Greedy repair fallback.
//!
//! Invoked when the optimizer produces nothing usable, or when a returned
//! assignment breaks an invariant (a backend assigning a closed gate is a
//! backend bug and is not trusted). Repair trades optimality for
//! termination: offending flights are re-seated first-fit; anything that
//! cannot be seated keeps its invalid gate and is reported as degraded,
//! never dropped.

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::model::AssignmentModel;

/// What the repair pass did.
#[derive(Debug, Default)]
pub struct RepairReport {
    /// Flights moved to a new gate by the repair pass.
    pub moved: Vec<String>,
    /// Flights left on an invariant-violating gate.
    pub degraded: Vec<String>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.degraded.is_empty()
    }
}

/// Flights whose current gate choice violates an invariant: a closed gate,
/// or a same-gate conflict. For a conflicting pair the later flight (by
/// model index) is the offender, so repair is deterministic.
pub fn offending_flights(model: &AssignmentModel, gates: &[usize]) -> BTreeSet<usize> {
    let mut offending = BTreeSet::new();
    for (i, &gate) in gates.iter().enumerate() {
        if !model.open[gate] {
            offending.insert(i);
        }
    }
    for &(i, k) in &model.conflicts {
        if gates[i] == gates[k] {
            offending.insert(i.max(k));
        }
    }
    offending
}

/// Re-seat every offending flight onto the first open gate with no
/// conflicting neighbor among flights already finalized there.
pub fn repair_assignment(model: &AssignmentModel, gates: &mut [usize]) -> RepairReport {
    let offending = offending_flights(model, gates);
    let mut report = RepairReport::default();
    if offending.is_empty() {
        return report;
    }

    // Non-offending flights are finalized where they stand.
    let mut occupancy: Vec<Vec<usize>> = vec![Vec::new(); model.num_gates()];
    for (i, &gate) in gates.iter().enumerate() {
        if !offending.contains(&i) {
            occupancy[gate].push(i);
        }
    }

    let open: Vec<usize> = model.open_gates().collect();
    for &flight in &offending {
        let seat = open.iter().copied().find(|&gate| {
            !occupancy[gate]
                .iter()
                .any(|&other| model.in_conflict(flight, other))
        });
        match seat {
            Some(gate) => {
                info!(
                    flight = %model.flight_nos[flight],
                    from = %model.gate_ids[gates[flight]],
                    to = %model.gate_ids[gate],
                    "Repaired"
                );
                gates[flight] = gate;
                occupancy[gate].push(flight);
                report.moved.push(model.flight_nos[flight].clone());
            }
            None => {
                warn!(
                    flight = %model.flight_nos[flight],
                    gate = %model.gate_ids[gates[flight]],
                    "No conflict-free gate, assignment left degraded"
                );
                // The flight still physically holds its gate.
                occupancy[gates[flight]].push(flight);
                report.degraded.push(model.flight_nos[flight].clone());
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DistanceMatrix, Flight, Gate, ScheduleState};
    use crate::model::build_model;

    fn model(flights: Vec<Flight>, gate_ids: &[&str], closed: &[&str]) -> AssignmentModel {
        let ids: Vec<String> = gate_ids.iter().map(|s| s.to_string()).collect();
        let n = ids.len();
        let costs: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| (i as f64 - j as f64).abs()).collect())
            .collect();
        let gates = ids
            .iter()
            .map(|id| Gate {
                id: id.clone(),
                open: !closed.contains(&id.as_str()),
            })
            .collect();
        let state =
            ScheduleState::new(flights, gates, DistanceMatrix::new(ids, costs).unwrap()).unwrap();
        build_model(&state).unwrap()
    }

    #[test]
    fn moves_flight_off_closed_gate() {
        let m = model(
            vec![
                Flight::new("F1", "08:00", "G1").unwrap(),
                Flight::new("F2", "12:00", "G2").unwrap(),
            ],
            &["G1", "G2", "G3"],
            &["G1"],
        );
        let mut gates = m.original_gate.clone();
        let report = repair_assignment(&m, &mut gates);
        assert_eq!(report.moved, vec!["F1".to_string()]);
        assert!(report.is_clean());
        assert_ne!(gates[0], 0);
        assert!(m.open[gates[0]]);
    }

    #[test]
    fn separates_conflicting_pair() {
        let m = model(
            vec![
                Flight::new("F1", "08:00", "G1").unwrap(),
                Flight::new("F2", "08:15", "G1").unwrap(),
            ],
            &["G1", "G2"],
            &[],
        );
        let mut gates = vec![0, 0];
        let report = repair_assignment(&m, &mut gates);
        assert!(report.is_clean());
        assert_ne!(gates[0], gates[1]);
    }

    #[test]
    fn unseatable_flight_is_degraded_not_dropped() {
        // Three mutually conflicting flights, two open gates.
        let m = model(
            vec![
                Flight::new("F1", "08:00", "G1").unwrap(),
                Flight::new("F2", "08:05", "G2").unwrap(),
                Flight::new("F3", "08:10", "G1").unwrap(),
            ],
            &["G1", "G2"],
            &[],
        );
        let mut gates = vec![0, 1, 0];
        let report = repair_assignment(&m, &mut gates);
        assert_eq!(report.degraded, vec!["F3".to_string()]);
        assert_eq!(gates.len(), 3);
    }

    #[test]
    fn clean_assignment_is_untouched() {
        let m = model(
            vec![
                Flight::new("F1", "08:00", "G1").unwrap(),
                Flight::new("F2", "12:00", "G1").unwrap(),
            ],
            &["G1", "G2"],
            &[],
        );
        let mut gates = vec![0, 0];
        let report = repair_assignment(&m, &mut gates);
        assert!(report.moved.is_empty() && report.degraded.is_empty());
        assert_eq!(gates, vec![0, 0]);
    }

    #[test]
    fn offender_detection_prefers_later_flight() {
        let m = model(
            vec![
                Flight::new("F1", "08:00", "G1").unwrap(),
                Flight::new("F2", "08:10", "G1").unwrap(),
            ],
            &["G1", "G2"],
            &[],
        );
        let offending = offending_flights(&m, &[0, 0]);
        assert_eq!(offending.into_iter().collect::<Vec<_>>(), vec![1]);
    }
}
