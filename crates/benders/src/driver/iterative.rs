use std::time::Instant;

use benders_solver::SolverModel;
use tracing::info;

use super::{Termination, relative_gap, solve_all};
use crate::config::IterativeParams;
use crate::error::Result;
use crate::master::MasterProblem;
use crate::result::{MasterResult, SolutionStats, SolveResult, SubproblemResult};
use crate::subproblem::CutOracle;

/// Solve master and subproblems in turn, adding one cut per block each
/// round, until the bounds meet or a limit is hit.
///
/// The master objective is the lower bound. Whenever every block is
/// feasible, `master objective + Σ(block objective - theta)` is an upper
/// bound; the round with the lowest one is reported.
#[derive(Debug, Clone)]
pub struct IterativeDriver {
    params: IterativeParams,
}

impl IterativeDriver {
    pub fn new(params: IterativeParams) -> Self {
        Self { params }
    }

    pub fn run<M, O>(&self, master: &mut MasterProblem<M>, subproblems: &mut [O]) -> Result<SolveResult>
    where
        M: SolverModel,
        O: CutOracle,
    {
        let start = Instant::now();
        let mut upper = f64::INFINITY;
        let mut best: Option<(MasterResult, Vec<SubproblemResult>)> = None;
        let mut iteration = 0;

        info!("{:>9} {:>16} {:>16} {:>12}", "iteration", "lower", "upper", "gap");
        loop {
            iteration += 1;
            let candidate = master.optimize(None)?;
            let lower = candidate.objective;
            let results = solve_all(subproblems, &candidate)?;

            if results.iter().all(|r| !r.infeasible) {
                let value = candidate.objective
                    + results
                        .iter()
                        .zip(&candidate.thetas)
                        .map(|(r, theta)| r.objective - theta)
                        .sum::<f64>();
                if value < upper {
                    upper = value;
                    best = Some((candidate.clone(), results.clone()));
                }
            }

            let gap = relative_gap(upper, lower);
            info!("{:>9} {:>16.6} {:>16.6} {:>12.3e}", iteration, lower, upper, gap);

            let elapsed = start.elapsed().as_secs_f64();
            let termination = if gap < self.params.optimality_gap {
                Some(Termination::OptimalityGap)
            } else if self.params.timelimit.is_some_and(|limit| elapsed > limit) {
                Some(Termination::TimeLimit)
            } else if iteration >= self.params.max_iterations {
                Some(Termination::IterationLimit)
            } else {
                None
            };

            if let Some(termination) = termination {
                info!(%termination, iterations = iteration, "iterative decomposition finished");
                let stats = SolutionStats {
                    runtime: elapsed,
                    obj_val: upper,
                    obj_bound: lower,
                    mip_gap: gap,
                };
                let (master_result, results) = best.unwrap_or((candidate, results));
                return Ok(SolveResult::new(master_result, results, stats, termination));
            }

            for result in &results {
                master.add_constraint(result)?;
            }
        }
    }
}
