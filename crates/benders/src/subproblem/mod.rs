//! Subproblem formulations that turn a master candidate into a cut.
//!
//! Every block can be posed four ways: as the block LP or its dual, with the
//! cut read either from row multipliers ("duals") or from the reduced costs
//! of the complicating variables ("subgradient"). The choice is made once per
//! run and fixed in [`Subproblem`].

mod dual;
mod primal;

use benders_solver::{Backend, SolverModel, SolverParams, Status};
use tracing::debug;

use crate::config::{Config, LpForm, SubproblemReturn};
use crate::error::{BendersError, Result};
use crate::result::{CutRhs, MasterResult, SubproblemResult};
use crate::staging::SubproblemData;

pub use dual::{DualDuals, DualSubgradient};
pub use primal::{PrimalDuals, PrimalSubgradient};

/// Coefficients below this magnitude are treated as zero when a cut is read
/// off a certificate
pub(crate) const CERTIFICATE_TOL: f64 = 1e-9;

/// Solves one block against a master candidate and returns the cut
pub trait CutOracle {
    /// Position of the block in the partition
    fn index(&self) -> usize;

    fn solve(&mut self, candidate: &MasterResult) -> Result<SubproblemResult>;
}

/// Per-subproblem solver settings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubproblemOptions {
    /// Discard solver state before every solve
    pub reset: bool,
    pub params: SolverParams,
}

impl SubproblemOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            reset: config.reset_subproblem,
            params: config.subproblem_params.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formulation {
    PrimalDuals,
    PrimalSubgradient,
    DualDuals,
    DualSubgradient,
}

impl Formulation {
    pub fn new(lp_form: LpForm, sub_return: SubproblemReturn) -> Self {
        match (lp_form, sub_return) {
            (LpForm::Primal, SubproblemReturn::Duals) => Formulation::PrimalDuals,
            (LpForm::Primal, SubproblemReturn::Subgradient) => Formulation::PrimalSubgradient,
            (LpForm::Dual, SubproblemReturn::Duals) => Formulation::DualDuals,
            (LpForm::Dual, SubproblemReturn::Subgradient) => Formulation::DualSubgradient,
        }
    }

    pub fn all() -> [Formulation; 4] {
        [
            Formulation::PrimalDuals,
            Formulation::PrimalSubgradient,
            Formulation::DualDuals,
            Formulation::DualSubgradient,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Formulation::PrimalDuals => "primal/duals",
            Formulation::PrimalSubgradient => "primal/subgradient",
            Formulation::DualDuals => "dual/duals",
            Formulation::DualSubgradient => "dual/subgradient",
        }
    }
}

impl std::fmt::Display for Formulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One block posed in the selected formulation
#[derive(Debug)]
pub enum Subproblem<M> {
    PrimalDuals(PrimalDuals<M>),
    PrimalSubgradient(PrimalSubgradient<M>),
    DualDuals(DualDuals<M>),
    DualSubgradient(DualSubgradient<M>),
}

impl<M: SolverModel> Subproblem<M> {
    pub fn new<B>(
        formulation: Formulation,
        data: SubproblemData,
        backend: &B,
        options: &SubproblemOptions,
    ) -> Result<Self>
    where
        B: Backend<Model = M>,
    {
        Ok(match formulation {
            Formulation::PrimalDuals => {
                Subproblem::PrimalDuals(PrimalDuals::new(data, backend, options)?)
            }
            Formulation::PrimalSubgradient => {
                Subproblem::PrimalSubgradient(PrimalSubgradient::new(data, backend, options)?)
            }
            Formulation::DualDuals => Subproblem::DualDuals(DualDuals::new(data, backend, options)?),
            Formulation::DualSubgradient => {
                Subproblem::DualSubgradient(DualSubgradient::new(data, backend, options)?)
            }
        })
    }

    pub fn formulation(&self) -> Formulation {
        match self {
            Subproblem::PrimalDuals(_) => Formulation::PrimalDuals,
            Subproblem::PrimalSubgradient(_) => Formulation::PrimalSubgradient,
            Subproblem::DualDuals(_) => Formulation::DualDuals,
            Subproblem::DualSubgradient(_) => Formulation::DualSubgradient,
        }
    }

    /// Release the solver handle
    pub fn close(self) {}
}

impl<M: SolverModel> CutOracle for Subproblem<M> {
    fn index(&self) -> usize {
        match self {
            Subproblem::PrimalDuals(sub) => sub.index(),
            Subproblem::PrimalSubgradient(sub) => sub.index(),
            Subproblem::DualDuals(sub) => sub.index(),
            Subproblem::DualSubgradient(sub) => sub.index(),
        }
    }

    fn solve(&mut self, candidate: &MasterResult) -> Result<SubproblemResult> {
        let result = match self {
            Subproblem::PrimalDuals(sub) => sub.solve(candidate),
            Subproblem::PrimalSubgradient(sub) => sub.solve(candidate),
            Subproblem::DualDuals(sub) => sub.solve(candidate),
            Subproblem::DualSubgradient(sub) => sub.solve(candidate),
        }?;
        debug!(
            subproblem = result.index,
            objective = result.objective,
            cut = if result.infeasible { "feasibility" } else { "optimality" },
            intercept = result.cut.intercept,
            "subproblem solved"
        );
        Ok(result)
    }
}

/// A feasible block: optimality cut plus the block solution
fn optimality_result(
    data: &SubproblemData,
    objective: f64,
    cut: CutRhs,
    solution: Vec<f64>,
) -> SubproblemResult {
    SubproblemResult {
        infeasible: false,
        objective,
        cut,
        index: data.index,
        solution,
        offset: offset(data),
    }
}

/// An infeasible block: feasibility cut, infinite objective and a zero
/// solution
fn feasibility_result(data: &SubproblemData, cut: CutRhs) -> SubproblemResult {
    SubproblemResult {
        infeasible: true,
        objective: f64::INFINITY,
        cut,
        index: data.index,
        solution: vec![0.0; data.num_continuous_vars()],
        offset: offset(data),
    }
}

fn offset(data: &SubproblemData) -> Option<Vec<f64>> {
    data.offset.then(|| data.lb.clone())
}

/// Error for a status no formulation can turn into a cut
fn unexpected_status(data: &SubproblemData, status: Status) -> BendersError {
    if status == Status::Unbounded {
        BendersError::UnboundedSubproblem {
            subproblem: data.index,
        }
    } else {
        BendersError::SubproblemFailed {
            subproblem: data.index,
            status,
        }
    }
}

/// `b - A · x`
fn residual_rhs(data: &SubproblemData, x: &[f64]) -> Vec<f64> {
    let ax = crate::slicing::mul_vec(&data.a, x);
    data.rhs.iter().zip(ax).map(|(b, ax)| b - ax).collect()
}

/// `-(y · A)`
fn negated_coupling(data: &SubproblemData, y: &[f64]) -> Vec<f64> {
    crate::slicing::vec_mul(y, &data.a)
        .into_iter()
        .map(|v| -v)
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use benders_solver::{ConstraintSense, Model, SimplexBackend, SimplexModel, Variable};

    use super::*;
    use crate::staging::{ProblemData, ProblemSpec};

    /// Capacity expansion with one block:
    ///   min 4x + y
    ///   y + 10x >= 8     (demand, met by the plant or by buying y)
    ///   y <= 6
    ///   x binary
    ///
    /// Block value function: v(x) = max(8 - 10x, 0) for y in [0, 6], and
    /// infeasible for x < 0.2.
    pub fn expansion() -> ProblemData {
        let mut model = Model::new("expansion");
        model.add_var(Variable::binary("x").with_obj(4.0));
        model.add_var(Variable::continuous("y").with_bounds(0.0, 6.0).with_obj(1.0));
        model.add_constraint("demand", vec![(1, 1.0), (0, 10.0)], ConstraintSense::Ge, 8.0);
        let mut spec = ProblemSpec::new(model);
        spec.set_complicating_vars([0]).unwrap();
        spec.make_problem_data().unwrap()
    }

    /// Same block with a zero objective: pure feasibility check
    pub fn expansion_feasibility() -> ProblemData {
        let mut data = expansion();
        data.subproblems[0].c = vec![0.0];
        data
    }

    pub fn candidate(x: f64) -> MasterResult {
        MasterResult {
            objective: 0.0,
            thetas: vec![0.0],
            solution: vec![x],
        }
    }

    pub fn build(formulation: Formulation, data: ProblemData) -> Subproblem<SimplexModel> {
        let data = data.subproblems.into_iter().next().unwrap();
        Subproblem::new(formulation, data, &SimplexBackend, &SubproblemOptions::default()).unwrap()
    }
}
