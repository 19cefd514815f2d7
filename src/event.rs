//! Perturbation event validation and application.
//!
//! Events are applied to a working copy of the schedule before replanning.
//! Malformed time strings fail the whole event up front; unknown flight or
//! gate ids in list context are dropped with a recorded warning.

use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::conflict::gate_conflict;
use crate::domain::{format_hhmm, parse_hhmm, PerturbationEvent, ScheduleState, BUFFER_TIME_MIN};
use crate::error::PlanResult;

/// What applying an event did to the working copy.
#[derive(Debug, Default)]
pub struct EventOutcome {
    /// Gate ids closed by this event, filtered to known gates.
    pub closed_gates: Vec<String>,
    /// Recoverable problems: unknown flight/gate ids, pre-existing
    /// conflicts found in the baseline data.
    pub warnings: Vec<String>,
    /// Flights that must be replanned: on closed gates, delayed, or party
    /// to a pre-existing same-gate conflict.
    pub flagged: BTreeSet<String>,
    /// Number of delay entries actually applied.
    pub delays_applied: usize,
}

/// Apply `event` to `state`, mutating departure estimates, windows, and
/// gate availability. All-or-nothing for malformed input: every `new_time`
/// is validated before any mutation.
pub fn apply_event(state: &mut ScheduleState, event: &PerturbationEvent) -> PlanResult<EventOutcome> {
    // Validate every time string first so a malformed entry cannot leave
    // the working copy half-updated.
    let mut parsed_delays = Vec::with_capacity(event.delayed_flights.len());
    for delay in &event.delayed_flights {
        let minutes = parse_hhmm(&delay.new_time)?;
        parsed_delays.push((delay.no.clone(), minutes));
    }

    let mut outcome = EventOutcome::default();

    for gate_id in &event.closed_gates {
        match state.gates.iter_mut().find(|g| &g.id == gate_id) {
            Some(gate) => {
                gate.open = false;
                outcome.closed_gates.push(gate_id.clone());
                info!(gate = %gate_id, "Gate closed");
            }
            None => {
                warn!(gate = %gate_id, "Unknown gate in closure list, skipping");
                outcome
                    .warnings
                    .push(format!("unknown gate '{gate_id}' in closed_gates"));
            }
        }
    }

    for (no, minutes) in &parsed_delays {
        match state.flight_mut(no) {
            Some(flight) => {
                let old = flight.departure;
                flight.set_departure(*minutes);
                info!(
                    flight = %no,
                    from = %format_hhmm(old),
                    to = %format_hhmm(*minutes),
                    "Departure updated"
                );
                outcome.flagged.insert(no.clone());
                outcome.delays_applied += 1;
            }
            None => {
                warn!(flight = %no, "Unknown flight in delay list, skipping");
                outcome
                    .warnings
                    .push(format!("unknown flight '{no}' in delayed_flights"));
            }
        }
    }

    // Flights sitting on a gate that is now closed must move.
    for flight in &state.flights {
        if state
            .gates
            .iter()
            .any(|g| g.id == flight.gate && !g.open)
        {
            outcome.flagged.insert(flight.no.clone());
        }
    }

    flag_existing_conflicts(state, &mut outcome);

    Ok(outcome)
}

/// Scan the working copy for same-gate conflicts that exist independently
/// of any event. Every flight on an affected gate is flagged, so a
/// conflicted baseline always triggers replanning.
fn flag_existing_conflicts(state: &ScheduleState, outcome: &mut EventOutcome) {
    for gate in &state.gates {
        let at_gate = state.flights_at(&gate.id);
        let mut conflicted = false;
        for (i, a) in at_gate.iter().enumerate() {
            for b in &at_gate[i + 1..] {
                if gate_conflict(a.window, b.window, BUFFER_TIME_MIN).is_some() {
                    warn!(
                        gate = %gate.id,
                        first = %a.no,
                        second = %b.no,
                        "Existing conflict on gate"
                    );
                    outcome.warnings.push(format!(
                        "existing conflict on gate {}: {} and {}",
                        gate.id, a.no, b.no
                    ));
                    conflicted = true;
                }
            }
        }
        if conflicted {
            for f in at_gate {
                outcome.flagged.insert(f.no.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DistanceMatrix, Flight, FlightDelay, Gate};

    fn state() -> ScheduleState {
        let ids: Vec<String> = ["G1", "G2", "G3"].iter().map(|s| s.to_string()).collect();
        let costs = vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 1.0],
            vec![2.0, 1.0, 0.0],
        ];
        let gates = ids
            .iter()
            .map(|id| Gate {
                id: id.clone(),
                open: true,
            })
            .collect();
        let flights = vec![
            Flight::new("F1", "08:00", "G1").unwrap(),
            Flight::new("F2", "12:00", "G1").unwrap(),
            Flight::new("F3", "08:30", "G2").unwrap(),
        ];
        ScheduleState::new(flights, gates, DistanceMatrix::new(ids, costs).unwrap()).unwrap()
    }

    #[test]
    fn malformed_time_rejects_whole_event() {
        let mut s = state();
        let event = PerturbationEvent {
            closed_gates: vec!["G2".into()],
            delayed_flights: vec![
                FlightDelay {
                    no: "F1".into(),
                    new_time: "09:00".into(),
                },
                FlightDelay {
                    no: "F2".into(),
                    new_time: "24:61".into(),
                },
            ],
        };
        assert!(apply_event(&mut s, &event).is_err());
        // Nothing mutated: gate still open, F1 unchanged.
        assert!(s.gate("G2").unwrap().open);
        assert_eq!(s.flight("F1").unwrap().departure, 480);
    }

    #[test]
    fn unknown_ids_warn_but_continue() {
        let mut s = state();
        let event = PerturbationEvent {
            closed_gates: vec!["NOPE".into(), "G2".into()],
            delayed_flights: vec![
                FlightDelay {
                    no: "GHOST".into(),
                    new_time: "10:00".into(),
                },
                FlightDelay {
                    no: "F1".into(),
                    new_time: "10:00".into(),
                },
            ],
        };
        let out = apply_event(&mut s, &event).unwrap();
        assert_eq!(out.closed_gates, vec!["G2".to_string()]);
        assert_eq!(out.delays_applied, 1);
        assert_eq!(out.warnings.len(), 2);
        assert_eq!(s.flight("F1").unwrap().departure, 600);
        assert!(!s.gate("G2").unwrap().open);
    }

    #[test]
    fn closure_flags_resident_flights() {
        let mut s = state();
        let event = PerturbationEvent {
            closed_gates: vec!["G1".into()],
            delayed_flights: vec![],
        };
        let out = apply_event(&mut s, &event).unwrap();
        assert!(out.flagged.contains("F1"));
        assert!(out.flagged.contains("F2"));
        assert!(!out.flagged.contains("F3"));
    }

    #[test]
    fn delay_recomputes_window_and_flags() {
        let mut s = state();
        let event = PerturbationEvent {
            closed_gates: vec![],
            delayed_flights: vec![FlightDelay {
                no: "F3".into(),
                new_time: "14:30".into(),
            }],
        };
        let out = apply_event(&mut s, &event).unwrap();
        let f = s.flight("F3").unwrap();
        assert_eq!(f.departure, 870);
        assert_eq!(f.window.start, 840);
        assert_eq!(f.window.end, 900);
        assert!(out.flagged.contains("F3"));
    }

    #[test]
    fn preexisting_conflict_flags_whole_gate() {
        let mut s = state();
        // Move F2 onto F1's time at the same gate via the baseline itself.
        s.flight_mut("F2").unwrap().set_departure(490);
        let out = apply_event(&mut s, &PerturbationEvent::default()).unwrap();
        assert!(out.flagged.contains("F1"));
        assert!(out.flagged.contains("F2"));
        assert!(out.warnings.iter().any(|w| w.contains("existing conflict")));
    }
}
