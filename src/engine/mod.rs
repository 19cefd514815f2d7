//! Planning orchestration.
//!
//! [`ReassignmentEngine`] is the session object owning the committed
//! schedule. One perturbation event is fully processed before the next is
//! accepted; `&mut self` on [`ReassignmentEngine::process_event`] gives the
//! single-writer discipline the commit step relies on. The solve runs
//! against an immutable model built from a cloned snapshot, and the commit
//! at the end is a single state swap.

use tracing::{error, info, warn};

use crate::domain::{PerturbationEvent, ScheduleState};
use crate::error::PlanResult;
use crate::event::apply_event;
use crate::model::build_model;
use crate::projection::{
    descale_objective, identity_cost, project, project_identity, ReassignResponse,
};
use crate::repair::{offending_flights, repair_assignment, RepairReport};
use crate::solver::bnb::BranchAndBoundSolver;
use crate::solver::{Optimizer, SolveLimits, SolveOutcome};

pub struct ReassignmentEngine<O: Optimizer = BranchAndBoundSolver> {
    state: ScheduleState,
    optimizer: O,
    limits: SolveLimits,
}

impl ReassignmentEngine<BranchAndBoundSolver> {
    /// Engine with the bundled branch-and-bound backend and the default
    /// 60 second solve budget.
    pub fn new(state: ScheduleState) -> Self {
        Self::with_optimizer(state, BranchAndBoundSolver::new(), SolveLimits::default())
    }
}

impl<O: Optimizer> ReassignmentEngine<O> {
    pub fn with_optimizer(state: ScheduleState, optimizer: O, limits: SolveLimits) -> Self {
        Self {
            state,
            optimizer,
            limits,
        }
    }

    /// The committed schedule: baseline for the next event.
    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    /// Process one perturbation event end to end: validate, flag, model,
    /// solve, repair, project, commit. Every failure is converted into a
    /// `failed` response; this never panics the host.
    pub fn process_event(&mut self, event: &PerturbationEvent) -> ReassignResponse {
        info!(
            closures = event.closed_gates.len(),
            delays = event.delayed_flights.len(),
            "Processing event"
        );
        let response = match self.plan(event) {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Plan failed");
                ReassignResponse::failed(e.to_string())
            }
        };
        info!(
            plan_id = %response.plan_id,
            status = ?response.status,
            changes = response.changes(),
            "Plan finished"
        );
        response
    }

    fn plan(&mut self, event: &PerturbationEvent) -> PlanResult<ReassignResponse> {
        let mut working = self.state.clone();
        let outcome = apply_event(&mut working, event)?;
        let mut notes = outcome.warnings.clone();

        // No flight needs replanning: identity assignment, optimizer never
        // invoked. Gate closures still commit so they bind future events.
        if outcome.flagged.is_empty() {
            let records = project_identity(&working);
            let cost = identity_cost(&working);
            self.state = working;
            if event.is_empty() && notes.is_empty() {
                return Ok(ReassignResponse::success(records, cost));
            }
            if notes.is_empty() {
                info!("Event affects no flights, schedule unchanged");
                return Ok(ReassignResponse::success(records, cost)
                    .with_message("event affects no flights; nothing to plan".into()));
            }
            return Ok(ReassignResponse::warning(records, notes.join("; "), Some(cost)));
        }

        let model = build_model(&working)?;
        let solve_outcome = self.optimizer.solve(&model, &self.limits);
        info!(outcome = %solve_outcome, "Solver finished");

        let mut heuristic = false;
        let mut gates = match solve_outcome {
            SolveOutcome::Optimal(s) | SolveOutcome::Feasible(s) => s.gates,
            SolveOutcome::Infeasible => {
                let mut msg =
                    String::from("optimizer proved infeasibility: no assignment satisfies all hard constraints");
                if !notes.is_empty() {
                    msg = format!("{msg}; {}", notes.join("; "));
                }
                return Ok(ReassignResponse::failed(msg));
            }
            SolveOutcome::Timeout(Some(s)) => {
                notes.push("time limit reached; best feasible solution used".into());
                heuristic = true;
                s.gates
            }
            SolveOutcome::Timeout(None) => {
                notes.push("time limit reached with no solution; greedy repair applied".into());
                heuristic = true;
                // Repair starts from where the flights currently stand.
                working
                    .flights
                    .iter()
                    .map(|f| {
                        working
                            .distances
                            .index_of(&f.gate)
                            .expect("validated at load")
                    })
                    .collect()
            }
        };

        // Never trust the backend blindly: a closed-gate assignment or a
        // residual conflict is repaired, not returned as success.
        let mut report = RepairReport::default();
        let offending = offending_flights(&model, &gates);
        if !offending.is_empty() {
            if !heuristic {
                warn!(count = offending.len(), "Backend returned invariant-violating assignment");
                notes.push("backend result violated invariants; greedy repair applied".into());
            }
            report = repair_assignment(&model, &mut gates);
            heuristic = true;
        }

        let records = project(&working, &model, &gates);
        let objective = descale_objective(model.objective_of(&gates));

        if !report.is_clean() {
            notes.push(format!(
                "degraded flights without a conflict-free gate: {}; state not committed",
                report.degraded.join(", ")
            ));
            return Ok(ReassignResponse::warning(records, notes.join("; "), None));
        }

        // Commit: the new assignment becomes the baseline for the next
        // event, including the cost reference gates.
        for (i, flight) in working.flights.iter_mut().enumerate() {
            let gate = model.gate_ids[gates[i]].clone();
            flight.original_gate = gate.clone();
            flight.gate = gate;
        }
        self.state = working;

        if heuristic || !notes.is_empty() {
            Ok(ReassignResponse::warning(
                records,
                notes.join("; "),
                Some(objective),
            ))
        } else {
            Ok(ReassignResponse::success(records, objective))
        }
    }
}
