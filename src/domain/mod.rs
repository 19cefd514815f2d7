use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::PlanError;

/// Minimum required gap between two occupation windows on the same gate.
pub const BUFFER_TIME_MIN: i32 = 30;
/// Minutes a flight holds its gate before the departure estimate.
pub const OCCUPATION_BEFORE_MIN: i32 = 30;
/// Minutes a flight holds its gate after the departure estimate.
pub const OCCUPATION_AFTER_MIN: i32 = 30;

/// Parse a strict `HH:MM` clock time into minutes since midnight.
///
/// `0 <= HH <= 23`, `0 <= MM <= 59`, both zero-padded to two digits.
pub fn parse_hhmm(s: &str) -> Result<i32, PlanError> {
    let t = NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| PlanError::InvalidTimeFormat(s.to_string()))?;
    // chrono accepts "7:05"; the wire contract requires zero padding.
    if s.len() != 5 {
        return Err(PlanError::InvalidTimeFormat(s.to_string()));
    }
    Ok(t.signed_duration_since(NaiveTime::MIN).num_minutes() as i32)
}

/// Format minutes since midnight back into `HH:MM`.
pub fn format_hhmm(minutes: i32) -> String {
    format!("{:02}:{:02}", minutes.div_euclid(60), minutes.rem_euclid(60))
}

/// The time interval during which a flight is considered to hold a gate,
/// in minutes since midnight. The buffer requirement between two windows
/// is enforced by the conflict predicate, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateWindow {
    pub start: i32,
    pub end: i32,
}

impl GateWindow {
    /// Window for a departure estimate: `dep - 30` to `dep + 30`.
    pub fn for_departure(departure: i32) -> Self {
        Self {
            start: departure - OCCUPATION_BEFORE_MIN,
            end: departure + OCCUPATION_AFTER_MIN,
        }
    }
}

impl fmt::Display for GateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", format_hhmm(self.start), format_hhmm(self.end))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    /// Flight number, unique within a schedule.
    pub no: String,
    /// Published schedule time, minutes since midnight.
    pub scheduled: i32,
    /// Current departure estimate, minutes since midnight.
    pub departure: i32,
    /// Occupation window derived from `departure`.
    pub window: GateWindow,
    /// Currently assigned gate.
    pub gate: String,
    /// Gate held at the start of the current planning cycle; the cost
    /// reference point. Updated to the committed gate after each plan.
    pub original_gate: String,
}

impl Flight {
    pub fn new(no: &str, deptime: &str, gate: &str) -> Result<Self, PlanError> {
        if no.trim().is_empty() {
            return Err(PlanError::InvalidFlight {
                no: no.to_string(),
                reason: "empty flight number".into(),
            });
        }
        if gate.trim().is_empty() {
            return Err(PlanError::InvalidFlight {
                no: no.to_string(),
                reason: "empty gate".into(),
            });
        }
        let departure = parse_hhmm(deptime)?;
        let window = GateWindow::for_departure(departure);
        if window.start >= window.end {
            return Err(PlanError::InvalidFlight {
                no: no.to_string(),
                reason: format!("degenerate occupation window {}", window),
            });
        }
        Ok(Self {
            no: no.to_string(),
            scheduled: departure,
            departure,
            window,
            gate: gate.to_string(),
            original_gate: gate.to_string(),
        })
    }

    /// Move the departure estimate and recompute the occupation window.
    pub fn set_departure(&mut self, departure: i32) {
        self.scheduled = departure;
        self.departure = departure;
        self.window = GateWindow::for_departure(departure);
    }
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} dep {} {} @ {}",
            self.no,
            format_hhmm(self.departure),
            self.window,
            self.gate
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    pub id: String,
    pub open: bool,
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = if self.open { "OPEN" } else { "CLOSED" };
        write!(f, "{} [{}]", self.id, s)
    }
}

/// Square relocation-cost matrix indexed by gate id. Symmetry is not
/// assumed; only `(original_gate, candidate_gate)` lookups are made.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    gate_ids: Vec<String>,
    index: HashMap<String, usize>,
    costs: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    pub fn new(gate_ids: Vec<String>, costs: Vec<Vec<f64>>) -> Result<Self, PlanError> {
        let n = gate_ids.len();
        if n == 0 {
            return Err(PlanError::InvalidDistanceMatrix("no gates".into()));
        }
        if costs.len() != n || costs.iter().any(|row| row.len() != n) {
            return Err(PlanError::InvalidDistanceMatrix(format!(
                "expected {n}x{n} entries"
            )));
        }
        if costs.iter().flatten().any(|c| *c < 0.0 || !c.is_finite()) {
            return Err(PlanError::InvalidDistanceMatrix(
                "negative or non-finite cost".into(),
            ));
        }
        let index = gate_ids
            .iter()
            .enumerate()
            .map(|(i, g)| (g.clone(), i))
            .collect::<HashMap<_, _>>();
        if index.len() != n {
            return Err(PlanError::InvalidDistanceMatrix("duplicate gate id".into()));
        }
        Ok(Self {
            gate_ids,
            index,
            costs,
        })
    }

    pub fn len(&self) -> usize {
        self.gate_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gate_ids.is_empty()
    }

    pub fn gate_ids(&self) -> &[String] {
        &self.gate_ids
    }

    pub fn index_of(&self, gate: &str) -> Option<usize> {
        self.index.get(gate).copied()
    }

    pub fn cost(&self, from: usize, to: usize) -> f64 {
        self.costs[from][to]
    }
}

/// One delayed flight inside a perturbation event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightDelay {
    pub no: String,
    pub new_time: String,
}

/// External disruption input: gates to close and/or flights to delay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerturbationEvent {
    #[serde(default)]
    pub closed_gates: Vec<String>,
    #[serde(default)]
    pub delayed_flights: Vec<FlightDelay>,
}

impl PerturbationEvent {
    /// An event with neither closures nor delays is a no-op.
    pub fn is_empty(&self) -> bool {
        self.closed_gates.is_empty() && self.delayed_flights.is_empty()
    }
}

/// Authoritative snapshot of flights, gates, and the current assignment.
/// Cloned per incoming event; the committed copy after a successful plan is
/// the baseline for the next event.
#[derive(Debug, Clone)]
pub struct ScheduleState {
    pub flights: Vec<Flight>,
    pub gates: Vec<Gate>,
    pub distances: DistanceMatrix,
}

impl ScheduleState {
    pub fn new(
        flights: Vec<Flight>,
        gates: Vec<Gate>,
        distances: DistanceMatrix,
    ) -> Result<Self, PlanError> {
        if flights.is_empty() {
            return Err(PlanError::DataUnavailable("no flights loaded".into()));
        }
        if gates.is_empty() {
            return Err(PlanError::DataUnavailable("no gates loaded".into()));
        }
        for gate in &gates {
            if distances.index_of(&gate.id).is_none() {
                return Err(PlanError::DataUnavailable(format!(
                    "gate {} missing from distance matrix",
                    gate.id
                )));
            }
        }
        for flight in &flights {
            if !gates.iter().any(|g| g.id == flight.gate) {
                return Err(PlanError::DataUnavailable(format!(
                    "flight {} assigned to unknown gate {}",
                    flight.no, flight.gate
                )));
            }
        }
        Ok(Self {
            flights,
            gates,
            distances,
        })
    }

    pub fn flight(&self, no: &str) -> Option<&Flight> {
        self.flights.iter().find(|f| f.no == no)
    }

    pub fn flight_mut(&mut self, no: &str) -> Option<&mut Flight> {
        self.flights.iter_mut().find(|f| f.no == no)
    }

    pub fn gate(&self, id: &str) -> Option<&Gate> {
        self.gates.iter().find(|g| g.id == id)
    }

    /// Flights currently assigned to the given gate.
    pub fn flights_at(&self, gate: &str) -> Vec<&Flight> {
        self.flights.iter().filter(|f| f.gate == gate).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_times() {
        assert_eq!(parse_hhmm("00:00").unwrap(), 0);
        assert_eq!(parse_hhmm("01:30").unwrap(), 90);
        assert_eq!(parse_hhmm("23:59").unwrap(), 1439);
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["24:00", "12:60", "7:05", "12:5", "ab:cd", "1230", ""] {
            assert!(parse_hhmm(bad).is_err(), "accepted '{bad}'");
        }
    }

    #[test]
    fn round_trips_formatting() {
        assert_eq!(format_hhmm(parse_hhmm("09:05").unwrap()), "09:05");
        assert_eq!(format_hhmm(0), "00:00");
    }

    #[test]
    fn window_brackets_departure() {
        let w = GateWindow::for_departure(600);
        assert_eq!(w.start, 600 - OCCUPATION_BEFORE_MIN);
        assert_eq!(w.end, 600 + OCCUPATION_AFTER_MIN);
    }

    #[test]
    fn flight_requires_valid_fields() {
        assert!(Flight::new("CX 675", "14:30", "G12").is_ok());
        assert!(Flight::new("", "14:30", "G12").is_err());
        assert!(Flight::new("CX 675", "25:00", "G12").is_err());
        assert!(Flight::new("CX 675", "14:30", " ").is_err());
    }

    #[test]
    fn distance_matrix_must_be_square() {
        let ids = vec!["A".to_string(), "B".to_string()];
        assert!(DistanceMatrix::new(ids.clone(), vec![vec![0.0, 1.0]]).is_err());
        assert!(DistanceMatrix::new(ids.clone(), vec![vec![0.0, -1.0], vec![1.0, 0.0]]).is_err());
        let m = DistanceMatrix::new(ids, vec![vec![0.0, 1.5], vec![2.5, 0.0]]).unwrap();
        assert_eq!(m.cost(1, 0), 2.5);
        assert_eq!(m.index_of("B"), Some(1));
    }

    #[test]
    fn state_rejects_unknown_gate_reference() {
        let m = DistanceMatrix::new(vec!["G1".to_string()], vec![vec![0.0]]).unwrap();
        let gates = vec![Gate {
            id: "G1".into(),
            open: true,
        }];
        let bad = vec![Flight::new("F1", "10:00", "G9").unwrap()];
        assert!(ScheduleState::new(bad, gates, m).is_err());
    }

    #[test]
    fn empty_event_is_noop() {
        let e: PerturbationEvent = serde_json::from_str("{}").unwrap();
        assert!(e.is_empty());
        let e: PerturbationEvent = serde_json::from_str(r#"{"closed_gates":["G1"]}"#).unwrap();
        assert!(!e.is_empty());
    }
}
