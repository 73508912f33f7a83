use benders_solver::Backend;
use tracing::info;

use crate::config::{Config, Framework};
use crate::driver::{CallbackDriver, IterativeDriver};
use crate::error::Result;
use crate::master::MasterProblem;
use crate::result::SolveResult;
use crate::staging::ProblemSpec;
use crate::subproblem::{Formulation, Subproblem, SubproblemOptions};

/// Decompose and solve `spec` with `backend`.
///
/// Finalizes `spec`. The returned result is already resolved against it,
/// so `x()` is in the original variable order and objective values are in
/// the original sense.
///
/// # Errors
///
/// Returns a `BendersError` for an invalid configuration or partition, a
/// failed master or subproblem solve, or a backend error.
pub fn solve<B: Backend>(spec: &mut ProblemSpec, config: &Config, backend: &B) -> Result<SolveResult> {
    config.validate()?;
    let data = spec.make_problem_data()?;

    let formulation = Formulation::new(config.lp_form, config.sub_return);
    info!(
        backend = backend.name(),
        framework = ?config.framework,
        %formulation,
        subproblems = data.subproblems.len(),
        complicating = spec.complicating_vars().len(),
        "starting Benders decomposition"
    );

    let mut master = MasterProblem::new(backend, &data.master, config.theta_lb, &config.master_params)?;
    let options = SubproblemOptions::from_config(config);
    let mut subproblems = data
        .subproblems
        .into_iter()
        .map(|sub| Subproblem::new(formulation, sub, backend, &options))
        .collect::<Result<Vec<_>>>()?;

    let mut result = match config.framework {
        Framework::Iterative => {
            IterativeDriver::new(config.iterative.clone()).run(&mut master, &mut subproblems)?
        }
        Framework::Callback => CallbackDriver::new().run(&mut master, &mut subproblems)?,
    };
    result.resolve(spec);

    info!(
        obj_val = result.obj_val(),
        obj_bound = result.obj_bound(),
        mip_gap = result.mip_gap(),
        runtime = result.runtime(),
        "solve finished"
    );

    master.close();
    subproblems.into_iter().for_each(Subproblem::close);
    Ok(result)
}
