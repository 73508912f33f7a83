use benders_solver::{
    Backend, ConstraintSense, Model, ObjectiveSense, SolverModel, Status, Variable,
};

use super::{
    SubproblemOptions, feasibility_result, negated_coupling, optimality_result, residual_rhs,
    unexpected_status,
};
use crate::error::{BendersError, Result};
use crate::result::{CutRhs, MasterResult, SubproblemResult};
use crate::slicing;
use crate::staging::SubproblemData;

/// Rows `y · B <= c`, one per block variable
fn add_dual_rows(model: &mut Model, data: &SubproblemData) {
    for (j, column) in slicing::columns(&data.b).into_iter().enumerate() {
        model.add_constraint(format!("d{}", j), column, ConstraintSense::Le, data.c[j]);
    }
}

/// A dual that is infeasible means the block itself is unbounded
fn unbounded_block(data: &SubproblemData) -> BendersError {
    BendersError::UnboundedSubproblem {
        subproblem: data.index,
    }
}

/// Dual of the block LP, `max (b - A·x̄)·y + c_const` over `y·B <= c`,
/// `y >= 0`. The candidate only moves the objective; an unbounded ray gives
/// a feasibility cut.
#[derive(Debug)]
pub struct DualDuals<M> {
    solver: M,
    data: SubproblemData,
    reset: bool,
}

impl<M: SolverModel> DualDuals<M> {
    pub fn new<B>(mut data: SubproblemData, backend: &B, options: &SubproblemOptions) -> Result<Self>
    where
        B: Backend<Model = M>,
    {
        data.transform(true, true)?;

        let mut model = Model::new(format!("dual_subproblem_{}", data.index));
        for (i, &b) in data.rhs.iter().enumerate() {
            model.add_var(Variable::continuous(format!("pi{}", i)).with_obj(b));
        }
        add_dual_rows(&mut model, &data);
        model.sense = ObjectiveSense::Maximize;
        model.obj_const = data.c_const;

        Ok(Self {
            solver: backend.load(&model, &options.params)?,
            data,
            reset: options.reset,
        })
    }

    pub fn index(&self) -> usize {
        self.data.index
    }

    pub fn solve(&mut self, candidate: &MasterResult) -> Result<SubproblemResult> {
        if self.reset {
            self.solver.reset();
        }
        for (i, coeff) in residual_rhs(&self.data, &candidate.solution).into_iter().enumerate() {
            self.solver.set_obj_coeff(i, coeff)?;
        }

        match self.solver.optimize()? {
            Status::Optimal => {
                let y = self.solver.values()?;
                let cut = CutRhs {
                    intercept: slicing::dot(&self.data.rhs, y) + self.data.c_const,
                    coeffs: negated_coupling(&self.data, y),
                };
                // Multipliers of the dual rows are the block variables
                let solution = self.solver.duals()?.to_vec();
                Ok(optimality_result(&self.data, self.solver.obj_val()?, cut, solution))
            }
            Status::Unbounded | Status::InfeasibleOrUnbounded => {
                let ray = self.solver.unbounded_ray()?;
                let cut = CutRhs {
                    intercept: slicing::dot(&self.data.rhs, ray),
                    coeffs: negated_coupling(&self.data, ray),
                };
                Ok(feasibility_result(&self.data, cut))
            }
            Status::Infeasible => Err(unbounded_block(&self.data)),
            status => Err(unexpected_status(&self.data, status)),
        }
    }
}

/// Dual of the block LP with one free variable `u_k` per complicating
/// variable, `max b·y + x̄·u + c_const` over `y·B <= c`, `y·A + u <= 0`.
/// At the optimum `u = -y·A` is the cut slope. Cuts are valid for
/// non-negative complicating variables.
///
/// With a zero block objective `y` is capped at one so the dual stays
/// bounded and a positive objective marks the candidate infeasible.
#[derive(Debug)]
pub struct DualSubgradient<M> {
    solver: M,
    data: SubproblemData,
    reset: bool,
    zero_objective: bool,
}

impl<M: SolverModel> DualSubgradient<M> {
    pub fn new<B>(mut data: SubproblemData, backend: &B, options: &SubproblemOptions) -> Result<Self>
    where
        B: Backend<Model = M>,
    {
        data.transform(true, true)?;
        let zero_objective = data.is_zero_objective();
        let num_rows = data.num_rows();
        let y_ub = if zero_objective { 1.0 } else { f64::INFINITY };

        let mut model = Model::new(format!("dual_subproblem_{}", data.index));
        for (i, &b) in data.rhs.iter().enumerate() {
            model.add_var(
                Variable::continuous(format!("pi{}", i))
                    .with_bounds(0.0, y_ub)
                    .with_obj(b),
            );
        }
        for k in 0..data.num_complicating_vars() {
            model.add_var(
                Variable::continuous(format!("g{}", k))
                    .with_bounds(f64::NEG_INFINITY, f64::INFINITY),
            );
        }
        add_dual_rows(&mut model, &data);
        for (k, column) in slicing::columns(&data.a).into_iter().enumerate() {
            let mut coeffs = column;
            coeffs.push((num_rows + k, 1.0));
            model.add_constraint(format!("s{}", k), coeffs, ConstraintSense::Le, 0.0);
        }
        model.sense = ObjectiveSense::Maximize;
        model.obj_const = data.c_const;

        Ok(Self {
            solver: backend.load(&model, &options.params)?,
            data,
            reset: options.reset,
            zero_objective,
        })
    }

    pub fn index(&self) -> usize {
        self.data.index
    }

    pub fn solve(&mut self, candidate: &MasterResult) -> Result<SubproblemResult> {
        if self.reset {
            self.solver.reset();
        }
        // Noise below zero would make the free slope variables unbounded
        let x: Vec<f64> = candidate.solution.iter().map(|v| v.max(0.0)).collect();
        let num_rows = self.data.num_rows();
        for (k, &value) in x.iter().enumerate() {
            self.solver.set_obj_coeff(num_rows + k, value)?;
        }

        match self.solver.optimize()? {
            Status::Optimal => {
                let objective = self.solver.obj_val()?;
                let slope = self.solver.values()?[num_rows..].to_vec();
                let cut = CutRhs {
                    intercept: objective - slicing::dot(&x, &slope),
                    coeffs: slope,
                };
                if self.zero_objective && objective > 0.0 {
                    return Ok(feasibility_result(&self.data, cut));
                }
                let num_y = self.data.num_continuous_vars();
                let solution = self.solver.duals()?[..num_y].to_vec();
                Ok(optimality_result(&self.data, objective, cut, solution))
            }
            Status::Unbounded | Status::InfeasibleOrUnbounded => {
                let ray = self.solver.unbounded_ray()?;
                let cut = CutRhs {
                    intercept: slicing::dot(&self.data.rhs, &ray[..num_rows]),
                    coeffs: ray[num_rows..].to_vec(),
                };
                Ok(feasibility_result(&self.data, cut))
            }
            Status::Infeasible => Err(unbounded_block(&self.data)),
            status => Err(unexpected_status(&self.data, status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::super::{CutOracle, Formulation};
    use benders_solver::{ConstraintSense, Model, Variable};

    use crate::error::BendersError;
    use crate::staging::ProblemSpec;

    /// Block whose cost is unbounded below once the plant is open
    fn unbounded_block() -> crate::staging::ProblemData {
        let mut model = Model::new("unbounded");
        model.add_var(Variable::binary("x"));
        model.add_var(Variable::continuous("y").with_obj(-1.0));
        model.add_constraint("demand", vec![(1, 1.0), (0, 10.0)], ConstraintSense::Ge, 8.0);
        let mut spec = ProblemSpec::new(model);
        spec.set_complicating_vars([0]).unwrap();
        spec.make_problem_data().unwrap()
    }

    #[test]
    fn test_unbounded_block_is_an_error_in_every_form() {
        for formulation in Formulation::all() {
            let mut sub = build(formulation, unbounded_block());
            let err = sub.solve(&candidate(1.0)).unwrap_err();
            assert!(
                matches!(err, BendersError::UnboundedSubproblem { subproblem: 0 }),
                "{}: {}",
                formulation,
                err
            );
        }
    }

    #[test]
    fn test_dual_duals_solution_matches_primal() {
        let mut dual = build(Formulation::DualDuals, expansion());
        let mut primal = build(Formulation::PrimalDuals, expansion());
        for x in [0.3, 0.6, 0.9] {
            let d = dual.solve(&candidate(x)).unwrap();
            let p = primal.solve(&candidate(x)).unwrap();
            assert!((d.objective - p.objective).abs() < 1e-6, "x = {}", x);
            assert!((d.x()[0] - p.x()[0]).abs() < 1e-6, "x = {}", x);
        }
    }

    #[test]
    fn test_dual_subgradient_slope_is_negated_coupling() {
        let mut sub = build(Formulation::DualSubgradient, expansion());
        let result = sub.solve(&candidate(0.3)).unwrap();
        // v(x) = 8 - 10x on [0.2, 0.8]
        assert!((result.objective - 5.0).abs() < 1e-6);
        assert!((result.cut.coeffs[0] + 10.0).abs() < 1e-6);
        assert!((result.cut.intercept - 8.0).abs() < 1e-6);
    }
}
