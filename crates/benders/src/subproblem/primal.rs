use benders_solver::{
    Backend, Constraint, ConstraintSense, Model, SolverModel, Status, Variable,
};

use super::{
    CERTIFICATE_TOL, SubproblemOptions, feasibility_result, negated_coupling, optimality_result,
    residual_rhs, unexpected_status,
};
use crate::error::{BendersError, Result};
use crate::result::{CutRhs, MasterResult, SubproblemResult};
use crate::slicing;
use crate::staging::SubproblemData;

/// Block LP `min c·y + c_const` over `B·y >= b - A·x̄`, `y >= 0`; the cut is
/// read from the row duals, or from a Farkas certificate when infeasible
#[derive(Debug)]
pub struct PrimalDuals<M> {
    solver: M,
    data: SubproblemData,
    reset: bool,
}

impl<M: SolverModel> PrimalDuals<M> {
    pub fn new<B>(mut data: SubproblemData, backend: &B, options: &SubproblemOptions) -> Result<Self>
    where
        B: Backend<Model = M>,
    {
        data.transform(true, true)?;

        let mut model = Model::new(format!("subproblem_{}", data.index));
        for (j, &c) in data.c.iter().enumerate() {
            model.add_var(Variable::continuous(format!("y{}", j)).with_obj(c));
        }
        for (i, row) in slicing::rows(&data.b).into_iter().enumerate() {
            model.add_constraint(format!("r{}", i), row, ConstraintSense::Ge, data.rhs[i]);
        }
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
        for (i, rhs) in residual_rhs(&self.data, &candidate.solution).into_iter().enumerate() {
            self.solver.set_rhs(i, rhs)?;
        }

        match self.solver.optimize()? {
            Status::Optimal => {
                let duals = self.solver.duals()?;
                let cut = CutRhs {
                    intercept: slicing::dot(&self.data.rhs, duals) + self.data.c_const,
                    coeffs: negated_coupling(&self.data, duals),
                };
                let solution = self.solver.values()?.to_vec();
                Ok(optimality_result(&self.data, self.solver.obj_val()?, cut, solution))
            }
            Status::Infeasible | Status::InfeasibleOrUnbounded => {
                let multipliers: Vec<f64> =
                    self.solver.farkas_duals()?.iter().map(|l| -l).collect();
                let cut = CutRhs {
                    intercept: slicing::dot(&self.data.rhs, &multipliers),
                    coeffs: negated_coupling(&self.data, &multipliers),
                };
                Ok(feasibility_result(&self.data, cut))
            }
            status => Err(unexpected_status(&self.data, status)),
        }
    }
}

/// Block LP with the complicating variables copied in and fixed to the
/// candidate; the cut slope is the reduced cost of those copies.
///
/// A block with a zero objective gets one slack per row and minimizes their
/// sum, so a positive objective means the candidate is infeasible.
#[derive(Debug)]
pub struct PrimalSubgradient<M> {
    solver: M,
    data: SubproblemData,
    reset: bool,
    zero_objective: bool,
}

impl<M: SolverModel> PrimalSubgradient<M> {
    pub fn new<B>(data: SubproblemData, backend: &B, options: &SubproblemOptions) -> Result<Self>
    where
        B: Backend<Model = M>,
    {
        let zero_objective = data.is_zero_objective();
        let num_x = data.num_complicating_vars();
        let num_y = data.num_continuous_vars();

        let mut model = Model::new(format!("subproblem_{}", data.index));
        for k in 0..num_x {
            model.add_var(Variable::continuous(format!("x{}", k)).with_bounds(0.0, 0.0));
        }
        for j in 0..num_y {
            model.add_var(
                Variable::continuous(format!("y{}", j))
                    .with_bounds(data.lb[j], data.ub[j])
                    .with_obj(data.c[j]),
            );
        }
        let slacks: Vec<usize> = if zero_objective {
            (0..data.num_rows())
                .map(|i| model.add_var(Variable::continuous(format!("s{}", i)).with_obj(1.0)))
                .collect()
        } else {
            Vec::new()
        };

        let coupling = slicing::rows(&data.a);
        let block = slicing::rows(&data.b);
        for (i, (a_row, b_row)) in coupling.into_iter().zip(block).enumerate() {
            let mut coeffs = a_row;
            coeffs.extend(b_row.into_iter().map(|(j, v)| (num_x + j, v)));
            coeffs.extend(slacks.iter().map(|&s| (s, 1.0)));
            model.add_constr(Constraint::new(
                format!("r{}", i),
                coeffs,
                ConstraintSense::Ge,
                data.rhs[i],
            ));
        }
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
        let x = &candidate.solution;
        for (k, &value) in x.iter().enumerate() {
            self.solver.set_var_bounds(k, value, value)?;
        }

        let num_x = self.data.num_complicating_vars();
        match self.solver.optimize()? {
            Status::Optimal => {
                let objective = self.solver.obj_val()?;
                let slope = self.solver.reduced_costs()?[..num_x].to_vec();
                let cut = CutRhs {
                    intercept: objective - slicing::dot(x, &slope),
                    coeffs: slope,
                };
                if self.zero_objective && objective > 0.0 {
                    return Ok(feasibility_result(&self.data, cut));
                }
                let num_y = self.data.num_continuous_vars();
                let solution = self.solver.values()?[num_x..num_x + num_y].to_vec();
                Ok(optimality_result(&self.data, objective, cut, solution))
            }
            Status::Infeasible | Status::InfeasibleOrUnbounded => {
                let cut = self.farkas_cut()?;
                Ok(feasibility_result(&self.data, cut))
            }
            status => Err(unexpected_status(&self.data, status)),
        }
    }

    /// Feasibility cut `0 >= μ·b - h - μ·A·x` from the row certificate `μ`,
    /// where `h` is the largest value `μ·B·y` takes inside the block bounds
    fn farkas_cut(&self) -> Result<CutRhs> {
        let multipliers: Vec<f64> = self.solver.farkas_duals()?.iter().map(|l| -l).collect();
        let weights = slicing::vec_mul(&multipliers, &self.data.b);

        let mut support = 0.0;
        for ((&w, &lb), &ub) in weights.iter().zip(&self.data.lb).zip(&self.data.ub) {
            if w.abs() <= CERTIFICATE_TOL {
                continue;
            }
            let bound = if w > 0.0 { ub } else { lb };
            if !bound.is_finite() {
                return Err(BendersError::InvalidCertificate {
                    subproblem: self.data.index,
                });
            }
            support += w * bound;
        }

        Ok(CutRhs {
            intercept: slicing::dot(&self.data.rhs, &multipliers) - support,
            coeffs: negated_coupling(&self.data, &multipliers),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::super::{CutOracle, Formulation};
    use benders_solver::{ConstraintSense, Model, SimplexBackend, Variable};

    use super::*;
    use crate::staging::ProblemSpec;

    #[test]
    fn test_primal_duals_translates_lower_bounds() {
        // y in [2, 6]: the solution is reported in original coordinates
        let mut model = Model::new("shifted");
        model.add_var(Variable::binary("x"));
        model.add_var(Variable::continuous("y").with_bounds(2.0, 6.0).with_obj(1.0));
        model.add_constraint("demand", vec![(1, 1.0), (0, 10.0)], ConstraintSense::Ge, 8.0);
        let mut spec = ProblemSpec::new(model);
        spec.set_complicating_vars([0]).unwrap();
        let data = spec.make_problem_data().unwrap();

        let mut sub = build(Formulation::PrimalDuals, data);
        let result = sub.solve(&candidate(0.7)).unwrap();
        assert!(!result.infeasible);
        assert_eq!(result.offset, Some(vec![2.0]));
        assert!((result.x()[0] - 2.0).abs() < 1e-6, "y = {:?}", result.x());
        // v(0.7) = max(8 - 7, 2) = 2 with a flat cut
        assert!((result.objective - 2.0).abs() < 1e-6);
        assert!(result.cut.coeffs[0].abs() < 1e-6);
    }

    #[test]
    fn test_primal_subgradient_keeps_original_coordinates() {
        let mut sub = build(Formulation::PrimalSubgradient, expansion());
        let result = sub.solve(&candidate(0.5)).unwrap();
        assert_eq!(result.offset, None);
        assert_eq!(result.solution.len(), 1);
    }

    #[test]
    fn test_primal_subgradient_farkas_cut_uses_finite_bound() {
        // y has no upper bound, so the certificate must lean on y >= 0
        let mut model = Model::new("open");
        model.add_var(Variable::binary("x"));
        model.add_var(Variable::continuous("y").with_obj(1.0));
        model.add_constraint("cap", vec![(1, 1.0), (0, 1.0)], ConstraintSense::Le, -1.0);
        let mut spec = ProblemSpec::new(model);
        spec.set_complicating_vars([0]).unwrap();
        let data = spec.make_problem_data().unwrap();
        let block = data.subproblems.into_iter().next().unwrap();

        let mut sub =
            PrimalSubgradient::new(block, &SimplexBackend, &SubproblemOptions::default()).unwrap();
        let result = sub.solve(&candidate(0.0)).unwrap();
        // y >= 0 with y <= -1 - x: certificate weight on y is negative, so
        // the support uses the finite lower bound
        assert!(result.infeasible);
        assert!(result.cut.evaluate(&[0.0]) > 1e-6, "{:?}", result.cut);
    }
}
