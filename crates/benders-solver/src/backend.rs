//! Capability set the decomposition engine needs from an LP/MIP solver.

use crate::error::SolverResult;
use crate::model::{Constraint, Model, Variable};
use crate::params::SolverParams;
use crate::status::Status;

/// Factory for solver model handles
pub trait Backend {
    type Model: SolverModel;

    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Load a copy of `model` into a new solver handle.
    ///
    /// # Errors
    ///
    /// Returns a `SolverError` if the model is malformed or the parameters
    /// are out of range.
    fn load(&self, model: &Model, params: &SolverParams) -> SolverResult<Self::Model>;
}

/// A model loaded into a solver.
///
/// Sign conventions for the solution accessors, all in the model's own
/// objective sense:
///
/// - `duals()[i]` is the derivative of the optimal objective with respect to
///   the right-hand side of row `i`.
/// - `reduced_costs()` is `c - A^T * duals()`.
/// - `farkas_duals()` is a row vector `λ` such that `λ^T A x <= λ^T b` is
///   implied by the rows (`λ_i >= 0` on `<=` rows, `λ_i <= 0` on `>=` rows)
///   and violated by every point inside the variable bounds.
/// - `unbounded_ray()` is a direction over the variables that stays feasible
///   and strictly improves the objective.
pub trait SolverModel {
    fn num_vars(&self) -> usize;
    fn num_constrs(&self) -> usize;

    fn add_var(&mut self, var: Variable) -> usize;
    fn add_constr(&mut self, constraint: Constraint) -> SolverResult<usize>;
    fn set_var_bounds(&mut self, index: usize, lb: f64, ub: f64) -> SolverResult<()>;
    fn set_obj_coeff(&mut self, index: usize, coeff: f64) -> SolverResult<()>;
    fn set_rhs(&mut self, index: usize, rhs: f64) -> SolverResult<()>;

    /// Discard any solution state so the next solve starts from scratch
    fn reset(&mut self);

    fn optimize(&mut self) -> SolverResult<Status>;

    /// Branch-and-bound solve that reports every new integer-feasible
    /// candidate to `callback` before accepting it.
    ///
    /// Constraints returned by the callback are added to the model as lazy
    /// constraints; a candidate that violates any of them is rejected.
    fn optimize_with_callback(
        &mut self,
        callback: &mut dyn IncumbentCallback,
    ) -> SolverResult<Status>;

    fn status(&self) -> Status;
    fn obj_val(&self) -> SolverResult<f64>;
    fn obj_bound(&self) -> SolverResult<f64>;
    fn mip_gap(&self) -> SolverResult<f64>;
    /// Wall-clock seconds spent in the last optimize call
    fn runtime(&self) -> f64;

    fn values(&self) -> SolverResult<&[f64]>;
    fn duals(&self) -> SolverResult<&[f64]>;
    fn reduced_costs(&self) -> SolverResult<&[f64]>;
    fn farkas_duals(&self) -> SolverResult<&[f64]>;
    fn unbounded_ray(&self) -> SolverResult<&[f64]>;
}

/// A new integer-feasible solution found during branch-and-bound
#[derive(Debug, Clone, Copy)]
pub struct Incumbent<'a> {
    pub objective: f64,
    pub values: &'a [f64],
    /// Nodes explored so far
    pub node_count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallbackAction {
    /// Keep searching after registering these lazy constraints
    Continue(Vec<Constraint>),
    /// Stop the search; the solve ends with `Status::Interrupted`
    Abort,
}

pub trait IncumbentCallback {
    fn on_incumbent(&mut self, incumbent: &Incumbent<'_>) -> CallbackAction;
}

impl<F> IncumbentCallback for F
where
    F: FnMut(&Incumbent<'_>) -> CallbackAction,
{
    fn on_incumbent(&mut self, incumbent: &Incumbent<'_>) -> CallbackAction {
        self(incumbent)
    }
}
