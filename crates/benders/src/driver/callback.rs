use benders_solver::{CallbackAction, Incumbent, IncumbentCallback, SolverModel};
use tracing::{debug, info};

use super::{Termination, solve_all};
use crate::error::{BendersError, Result};
use crate::master::{MasterLayout, MasterProblem};
use crate::result::SolveResult;
use crate::subproblem::CutOracle;

/// Run one branch-and-bound search on the master and separate every
/// incumbent against all blocks, returning the cuts as lazy constraints
#[derive(Debug, Clone, Copy, Default)]
pub struct CallbackDriver;

/// Incumbent handler: solves the blocks and keeps the first error, which
/// aborts the search
struct CutHandler<'a, O> {
    layout: MasterLayout,
    subproblems: &'a mut [O],
    error: Option<BendersError>,
    incumbents: u64,
}

impl<O: CutOracle> IncumbentCallback for CutHandler<'_, O> {
    fn on_incumbent(&mut self, incumbent: &Incumbent<'_>) -> CallbackAction {
        self.incumbents += 1;
        let candidate = self.layout.callback_result(incumbent);
        match solve_all(self.subproblems, &candidate) {
            Ok(results) => {
                debug!(
                    objective = incumbent.objective,
                    nodes = incumbent.node_count,
                    "separating incumbent"
                );
                CallbackAction::Continue(
                    results
                        .iter()
                        .map(|result| self.layout.cut_constraint(result))
                        .collect(),
                )
            }
            Err(err) => {
                self.error = Some(err);
                CallbackAction::Abort
            }
        }
    }
}

impl CallbackDriver {
    pub fn new() -> Self {
        Self
    }

    pub fn run<M, O>(&self, master: &mut MasterProblem<M>, subproblems: &mut [O]) -> Result<SolveResult>
    where
        M: SolverModel,
        O: CutOracle,
    {
        master.ensure_mip();

        let mut handler = CutHandler {
            layout: master.layout().clone(),
            subproblems,
            error: None,
            incumbents: 0,
        };
        let outcome = master.optimize(Some(&mut handler));
        let CutHandler {
            subproblems,
            error,
            incumbents,
            ..
        } = handler;
        if let Some(err) = error {
            return Err(err);
        }
        let candidate = outcome?;

        let results = solve_all(subproblems, &candidate)?;
        let termination = Termination::MasterStatus(master.status());
        info!(%termination, incumbents, "callback decomposition finished");
        Ok(SolveResult::new(candidate, results, master.solution_stats(), termination))
    }
}
