use std::time::Instant;

use crate::backend::{Backend, IncumbentCallback, SolverModel};
use crate::branch::BranchAndBound;
use crate::error::{SolverError, SolverResult};
use crate::model::{Constraint, Model, Variable};
use crate::params::SolverParams;
use crate::simplex::Simplex;
use crate::solution::{LpSolution, MipSolution};
use crate::status::Status;

/// In-process backend: dense simplex for LPs, branch-and-bound for MIPs
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplexBackend;

impl Backend for SimplexBackend {
    type Model = SimplexModel;

    fn name(&self) -> &str {
        "simplex"
    }

    fn load(&self, model: &Model, params: &SolverParams) -> SolverResult<SimplexModel> {
        model.validate()?;
        if let Some(reason) = params.invalid_reason() {
            return Err(SolverError::InvalidParameter(reason));
        }
        Ok(SimplexModel {
            model: model.clone(),
            params: params.clone(),
            state: SolveState::default(),
        })
    }
}

/// A model owned by [`SimplexBackend`]
#[derive(Debug, Clone)]
pub struct SimplexModel {
    model: Model,
    params: SolverParams,
    state: SolveState,
}

#[derive(Debug, Clone, Default)]
struct SolveState {
    status: Status,
    objective: Option<f64>,
    bound: Option<f64>,
    gap: Option<f64>,
    values: Option<Vec<f64>>,
    duals: Option<Vec<f64>>,
    reduced_costs: Option<Vec<f64>>,
    farkas: Option<Vec<f64>>,
    ray: Option<Vec<f64>>,
    runtime: f64,
}

impl From<LpSolution> for SolveState {
    fn from(solution: LpSolution) -> Self {
        let optimal = solution.status.is_optimal();
        let non_empty = |v: Vec<f64>, keep: bool| keep.then_some(v);
        Self {
            status: solution.status,
            objective: optimal.then_some(solution.objective_value),
            bound: optimal.then_some(solution.objective_value),
            gap: optimal.then_some(0.0),
            values: non_empty(solution.values, optimal),
            duals: non_empty(solution.duals, optimal),
            reduced_costs: non_empty(solution.reduced_costs, optimal),
            farkas: non_empty(solution.farkas, solution.status == Status::Infeasible),
            ray: non_empty(solution.ray, solution.status == Status::Unbounded),
            runtime: 0.0,
        }
    }
}

impl From<MipSolution> for SolveState {
    fn from(solution: MipSolution) -> Self {
        Self {
            status: solution.status,
            gap: solution.gap(),
            objective: solution.objective_value,
            bound: solution.bound,
            values: solution.values,
            ..Self::default()
        }
    }
}

impl SimplexModel {
    /// The model as currently loaded, lazy constraints included
    pub fn model(&self) -> &Model {
        &self.model
    }

    fn simplex(&self) -> Simplex {
        Simplex::new()
            .with_max_iterations(self.params.iteration_limit)
            .with_feasibility_tol(self.params.feasibility_tol)
    }

    fn branch_and_bound(&self) -> BranchAndBound {
        BranchAndBound::new(self.simplex())
            .with_int_tol(self.params.int_feas_tol)
            .with_feasibility_tol(self.params.feasibility_tol)
            .with_mip_gap(self.params.mip_gap)
            .with_node_limit(self.params.node_limit)
            .with_time_limit(self.params.time_limit)
    }

    fn check_var(&self, index: usize) -> SolverResult<()> {
        if index < self.model.num_variables() {
            Ok(())
        } else {
            Err(SolverError::InvalidIndex(format!(
                "variable {} out of range ({} variables)",
                index,
                self.model.num_variables()
            )))
        }
    }

    fn vector<'a>(
        &self,
        value: &'a Option<Vec<f64>>,
        attribute: &'static str,
    ) -> SolverResult<&'a [f64]> {
        value.as_deref().ok_or(SolverError::AttributeUnavailable {
            attribute,
            status: self.state.status,
        })
    }

    fn scalar(&self, value: Option<f64>, attribute: &'static str) -> SolverResult<f64> {
        value.ok_or(SolverError::AttributeUnavailable {
            attribute,
            status: self.state.status,
        })
    }
}

impl SolverModel for SimplexModel {
    fn num_vars(&self) -> usize {
        self.model.num_variables()
    }

    fn num_constrs(&self) -> usize {
        self.model.num_constraints()
    }

    fn add_var(&mut self, var: Variable) -> usize {
        self.reset();
        self.model.add_var(var)
    }

    fn add_constr(&mut self, constraint: Constraint) -> SolverResult<usize> {
        for &(j, _) in &constraint.coeffs {
            self.check_var(j)?;
        }
        self.reset();
        Ok(self.model.add_constr(constraint))
    }

    fn set_var_bounds(&mut self, index: usize, lb: f64, ub: f64) -> SolverResult<()> {
        self.check_var(index)?;
        self.reset();
        let var = &mut self.model.variables[index];
        var.lb = lb;
        var.ub = ub;
        Ok(())
    }

    fn set_obj_coeff(&mut self, index: usize, coeff: f64) -> SolverResult<()> {
        self.check_var(index)?;
        self.reset();
        self.model.variables[index].obj = coeff;
        Ok(())
    }

    fn set_rhs(&mut self, index: usize, rhs: f64) -> SolverResult<()> {
        let num_constrs = self.model.num_constraints();
        let constraint = self.model.constraints.get_mut(index).ok_or_else(|| {
            SolverError::InvalidIndex(format!(
                "constraint {} out of range ({} constraints)",
                index, num_constrs
            ))
        })?;
        constraint.rhs = rhs;
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.state = SolveState::default();
    }

    fn optimize(&mut self) -> SolverResult<Status> {
        let start = Instant::now();
        self.state = if self.model.is_continuous() {
            self.simplex().solve(&self.model).into()
        } else {
            let search = self.branch_and_bound();
            search.solve(&mut self.model, None).into()
        };
        self.state.runtime = start.elapsed().as_secs_f64();
        Ok(self.state.status)
    }

    fn optimize_with_callback(
        &mut self,
        callback: &mut dyn IncumbentCallback,
    ) -> SolverResult<Status> {
        if self.model.is_continuous() {
            return Err(SolverError::CallbackRequiresMip);
        }
        let start = Instant::now();
        let search = self.branch_and_bound();
        self.state = search.solve(&mut self.model, Some(callback)).into();
        self.state.runtime = start.elapsed().as_secs_f64();
        Ok(self.state.status)
    }

    fn status(&self) -> Status {
        self.state.status
    }

    fn obj_val(&self) -> SolverResult<f64> {
        self.scalar(self.state.objective, "ObjVal")
    }

    fn obj_bound(&self) -> SolverResult<f64> {
        self.scalar(self.state.bound, "ObjBound")
    }

    fn mip_gap(&self) -> SolverResult<f64> {
        self.scalar(self.state.gap, "MIPGap")
    }

    fn runtime(&self) -> f64 {
        self.state.runtime
    }

    fn values(&self) -> SolverResult<&[f64]> {
        self.vector(&self.state.values, "X")
    }

    fn duals(&self) -> SolverResult<&[f64]> {
        self.vector(&self.state.duals, "Pi")
    }

    fn reduced_costs(&self) -> SolverResult<&[f64]> {
        self.vector(&self.state.reduced_costs, "RC")
    }

    fn farkas_duals(&self) -> SolverResult<&[f64]> {
        self.vector(&self.state.farkas, "FarkasDual")
    }

    fn unbounded_ray(&self) -> SolverResult<&[f64]> {
        self.vector(&self.state.ray, "UnbdRay")
    }
}
