//! Branch-and-bound assignment backend.
//!
//! Depth-first search over flights in most-constrained-first order.
//! Candidate gates are visited in ascending cost order, so the incumbent
//! bound lets a whole candidate tail be cut as soon as the optimistic
//! bound is no better than the best known solution. The deadline is
//! checked at every node; on expiry the best incumbent found so far is
//! returned as a timeout result.

use std::cmp::Reverse;
use std::time::Instant;

use tracing::debug;

use crate::model::AssignmentModel;
use crate::solver::{Optimizer, SolveLimits, SolveOutcome, Solution};

#[derive(Debug, Default, Clone, Copy)]
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    pub fn new() -> Self {
        Self
    }
}

struct Search<'a> {
    model: &'a AssignmentModel,
    /// Flight indices in branching order.
    order: Vec<usize>,
    /// Candidate gates per depth, ascending (cost, index).
    candidates: Vec<Vec<usize>>,
    /// Optimistic remaining cost from each depth to the leaves.
    suffix_bound: Vec<i64>,
    deadline: Instant,
    /// Flights finalized per gate during the descent.
    occupancy: Vec<Vec<usize>>,
    chosen: Vec<usize>,
    best: Option<Solution>,
    nodes: u64,
    timed_out: bool,
}

impl<'a> Search<'a> {
    fn run(&mut self, depth: usize, cost: i64) {
        if self.timed_out {
            return;
        }
        if Instant::now() >= self.deadline {
            self.timed_out = true;
            return;
        }
        self.nodes += 1;

        if depth == self.order.len() {
            let better = self
                .best
                .as_ref()
                .map(|b| cost < b.objective)
                .unwrap_or(true);
            if better {
                self.best = Some(Solution {
                    gates: self.chosen.clone(),
                    objective: cost,
                });
            }
            return;
        }

        let flight = self.order[depth];

        for idx in 0..self.candidates[depth].len() {
            let gate = self.candidates[depth][idx];
            let incumbent = self.best.as_ref().map(|b| b.objective).unwrap_or(i64::MAX);
            let optimistic = cost + self.model.cost[flight][gate] + self.suffix_bound[depth + 1];
            // Candidates are cost-sorted, so the rest of the tail can only
            // be worse once the bound fails.
            if optimistic >= incumbent {
                break;
            }
            if self.occupancy[gate]
                .iter()
                .any(|&other| self.model.in_conflict(flight, other))
            {
                continue;
            }
            self.occupancy[gate].push(flight);
            self.chosen[flight] = gate;
            self.run(depth + 1, cost + self.model.cost[flight][gate]);
            self.occupancy[gate].pop();
            if self.timed_out {
                return;
            }
        }
    }
}

impl Optimizer for BranchAndBoundSolver {
    fn solve(&self, model: &AssignmentModel, limits: &SolveLimits) -> SolveOutcome {
        let started = Instant::now();
        let n = model.num_flights();
        if n == 0 {
            return SolveOutcome::Optimal(Solution {
                gates: Vec::new(),
                objective: 0,
            });
        }
        let open: Vec<usize> = model.open_gates().collect();
        if open.is_empty() {
            return SolveOutcome::Infeasible;
        }

        // Branch on the most conflict-constrained flights first.
        let mut degree = vec![0usize; n];
        for &(i, k) in &model.conflicts {
            degree[i] += 1;
            degree[k] += 1;
        }
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&i| (Reverse(degree[i]), i));

        let candidates: Vec<Vec<usize>> = order
            .iter()
            .map(|&i| {
                let mut gates = open.clone();
                gates.sort_by_key(|&j| (model.cost[i][j], j));
                gates
            })
            .collect();

        // Lower bound: each remaining flight pays at least its cheapest
        // open gate, conflicts ignored.
        let mut suffix_bound = vec![0i64; n + 1];
        for depth in (0..n).rev() {
            let i = order[depth];
            let min_cost = open
                .iter()
                .map(|&j| model.cost[i][j])
                .min()
                .unwrap_or(0);
            suffix_bound[depth] = suffix_bound[depth + 1] + min_cost;
        }

        let mut search = Search {
            model,
            order,
            candidates,
            suffix_bound,
            deadline: started + limits.time_limit,
            occupancy: vec![Vec::new(); model.num_gates()],
            chosen: vec![usize::MAX; n],
            best: None,
            nodes: 0,
            timed_out: false,
        };
        search.run(0, 0);

        debug!(
            nodes = search.nodes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            timed_out = search.timed_out,
            "Search finished"
        );

        if search.timed_out {
            return SolveOutcome::Timeout(search.best);
        }
        match search.best {
            // The tree was exhausted, so the incumbent is optimal.
            Some(solution) => SolveOutcome::Optimal(solution),
            None => SolveOutcome::Infeasible,
        }
    }
}
