use gate_reassignment_engine::{
    DistanceMatrix, Flight, FlightDelay, Gate, PerturbationEvent, ReassignmentEngine,
    ScheduleState,
};

fn seed_state() -> ScheduleState {
    let gate_ids: Vec<String> = ["G1", "G2", "G3", "G4", "G12", "G15"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    // Walking distances between gates, metres; asymmetry is allowed.
    let distances = vec![
        vec![0.0, 50.0, 90.0, 140.0, 210.0, 260.0],
        vec![50.0, 0.0, 45.0, 95.0, 170.0, 220.0],
        vec![90.0, 45.0, 0.0, 55.0, 130.0, 180.0],
        vec![140.0, 95.0, 55.0, 0.0, 80.0, 130.0],
        vec![210.0, 170.0, 130.0, 80.0, 0.0, 60.0],
        vec![260.0, 220.0, 180.0, 130.0, 60.0, 0.0],
    ];
    let gates = gate_ids
        .iter()
        .map(|id| Gate {
            id: id.clone(),
            open: true,
        })
        .collect();
    let flights = vec![
        Flight::new("CX 675", "08:15", "G12").expect("seed flight"),
        Flight::new("KA 893", "08:40", "G1").expect("seed flight"),
        Flight::new("CX 261", "09:30", "G2").expect("seed flight"),
        Flight::new("UO 625", "10:05", "G3").expect("seed flight"),
        Flight::new("HX 253", "10:45", "G12").expect("seed flight"),
        Flight::new("CX 880", "11:20", "G15").expect("seed flight"),
        Flight::new("BA 028", "12:10", "G4").expect("seed flight"),
    ];
    let matrix = DistanceMatrix::new(gate_ids, distances).expect("seed matrix");
    ScheduleState::new(flights, gates, matrix).expect("seed state")
}

fn print_response(label: &str, response: &gate_reassignment_engine::ReassignResponse) {
    println!("\n--- {label} ---");
    println!(
        "{}",
        serde_json::to_string_pretty(response).expect("response is serializable")
    );
    println!("  ({} gate change(s))", response.changes());
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    println!("=====================================================================");
    println!("  Gate Reassignment Engine -- Disruption Replanning Demo");
    println!("=====================================================================");

    let mut engine = ReassignmentEngine::new(seed_state());

    // A quiet morning: nothing to do.
    let r = engine.process_event(&PerturbationEvent::default());
    print_response("Empty event", &r);

    // G12 loses its jetbridge; CX 675 and HX 253 must move.
    let r = engine.process_event(&PerturbationEvent {
        closed_gates: vec!["G12".into()],
        delayed_flights: vec![],
    });
    print_response("G12 closed", &r);

    // Fog pushes CX 261 back; the replan confirms everyone can stay put.
    let r = engine.process_event(&PerturbationEvent {
        closed_gates: vec![],
        delayed_flights: vec![FlightDelay {
            no: "CX 261".into(),
            new_time: "08:45".into(),
        }],
    });
    print_response("CX 261 delayed to 08:45", &r);

    // A closure that touches no flights plus a typo in the gate name.
    let r = engine.process_event(&PerturbationEvent {
        closed_gates: vec!["G15X".into()],
        delayed_flights: vec![],
    });
    print_response("Unknown gate closure", &r);
}
