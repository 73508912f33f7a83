//! The master problem: complicating variables plus one theta per block.

use benders_solver::{
    Backend, Constraint, ConstraintSense, Incumbent, IncumbentCallback, SolverModel,
    SolverParams, Status, Variable,
};
use tracing::{debug, warn};

use crate::error::{BendersError, Result};
use crate::result::{MasterResult, SolutionStats, SubproblemResult};
use crate::staging::MasterData;

/// Column positions inside the master model.
///
/// Complicating variables come first, then one theta per subproblem, then
/// the dummy binary if one was added.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterLayout {
    num_vars: usize,
    thetas: Vec<usize>,
}

impl MasterLayout {
    pub fn num_complicating_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_subproblems(&self) -> usize {
        self.thetas.len()
    }

    pub fn theta(&self, subproblem: usize) -> usize {
        self.thetas[subproblem]
    }

    /// Split a master point into thetas and complicating values
    pub fn result(&self, objective: f64, values: &[f64]) -> MasterResult {
        MasterResult {
            objective,
            thetas: self.thetas.iter().map(|&j| values[j]).collect(),
            solution: values[..self.num_vars].to_vec(),
        }
    }

    /// Candidate reported by branch-and-bound before it is accepted
    pub fn callback_result(&self, incumbent: &Incumbent<'_>) -> MasterResult {
        self.result(incumbent.objective, incumbent.values)
    }

    /// The cut as a master row.
    ///
    /// Optimality: `theta_i - coeffs · x >= intercept`.
    /// Feasibility: `-coeffs · x >= intercept`.
    pub fn cut_constraint(&self, cut: &SubproblemResult) -> Constraint {
        let mut coeffs: Vec<(usize, f64)> = cut
            .cut
            .coeffs
            .iter()
            .enumerate()
            .filter(|&(_, &g)| g != 0.0)
            .map(|(k, &g)| (k, -g))
            .collect();
        let name = if cut.infeasible {
            format!("feas_cut_{}", cut.index)
        } else {
            coeffs.push((self.thetas[cut.index], 1.0));
            format!("opt_cut_{}", cut.index)
        };
        Constraint::new(name, coeffs, ConstraintSense::Ge, cut.cut.intercept)
    }
}

/// The loaded master model
#[derive(Debug)]
pub struct MasterProblem<M> {
    solver: M,
    layout: MasterLayout,
    is_continuous: bool,
    dummy_binary: Option<usize>,
}

impl<M: SolverModel> MasterProblem<M> {
    pub fn new<B>(backend: &B, data: &MasterData, theta_lb: f64, params: &SolverParams) -> Result<Self>
    where
        B: Backend<Model = M>,
    {
        let mut model = data.model.clone();
        let num_vars = model.num_variables();
        let thetas = (0..data.num_subproblems)
            .map(|i| {
                model.add_var(
                    Variable::continuous(format!("theta_{}", i))
                        .with_bounds(theta_lb, f64::INFINITY)
                        .with_obj(1.0),
                )
            })
            .collect();

        Ok(Self {
            solver: backend.load(&model, params)?,
            layout: MasterLayout { num_vars, thetas },
            is_continuous: data.is_continuous,
            dummy_binary: None,
        })
    }

    pub fn layout(&self) -> &MasterLayout {
        &self.layout
    }

    pub fn status(&self) -> Status {
        self.solver.status()
    }

    pub fn is_continuous(&self) -> bool {
        self.is_continuous
    }

    /// Solve the master, optionally reporting incumbents to `callback`.
    ///
    /// A limit status is accepted when the solver still has a point;
    /// anything else that is not optimal fails with `MasterFailed`.
    pub fn optimize(&mut self, callback: Option<&mut dyn IncumbentCallback>) -> Result<MasterResult> {
        let status = match callback {
            Some(callback) => self.solver.optimize_with_callback(callback)?,
            None => self.solver.optimize()?,
        };
        match status {
            Status::Optimal => {}
            status if status.is_limit() && self.solver.values().is_ok() => {
                warn!(%status, "master stopped at a limit, using the best point found");
            }
            status => return Err(BendersError::MasterFailed(status)),
        }

        let result = self.layout.result(self.solver.obj_val()?, self.solver.values()?);
        debug!(objective = result.objective, thetas = ?result.thetas, "master solved");
        Ok(result)
    }

    pub fn callback_result(&self, incumbent: &Incumbent<'_>) -> MasterResult {
        self.layout.callback_result(incumbent)
    }

    /// Add a cut to the master model
    pub fn add_constraint(&mut self, cut: &SubproblemResult) -> Result<()> {
        let constraint = self.layout.cut_constraint(cut);
        debug!(name = %constraint.name, rhs = constraint.rhs, "adding cut");
        self.solver.add_constr(constraint)?;
        Ok(())
    }

    /// The same inequality as [`add_constraint`](Self::add_constraint), for
    /// registration as a lazy constraint
    pub fn lazy_constraint(&self, cut: &SubproblemResult) -> Constraint {
        self.layout.cut_constraint(cut)
    }

    /// Branch-and-bound callbacks need a MIP; a continuous master gets one
    /// unused binary
    pub fn ensure_mip(&mut self) {
        if self.is_continuous && self.dummy_binary.is_none() {
            self.dummy_binary = Some(self.solver.add_var(Variable::binary("dummy_mip")));
            self.is_continuous = false;
            debug!("added dummy binary to continuous master");
        }
    }

    pub fn solution_stats(&self) -> SolutionStats {
        SolutionStats {
            runtime: self.solver.runtime(),
            obj_val: self.solver.obj_val().unwrap_or(f64::NAN),
            obj_bound: self.solver.obj_bound().unwrap_or(f64::NAN),
            mip_gap: self.solver.mip_gap().unwrap_or(f64::NAN),
        }
    }

    /// Release the solver handle
    pub fn close(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::CutRhs;
    use crate::staging::ProblemSpec;
    use benders_solver::{Model, SimplexBackend, SimplexModel};

    fn master(is_mip: bool) -> MasterProblem<SimplexModel> {
        // min 4x + y, y + 10x >= 8, y <= 6
        let mut model = Model::new("expansion");
        model.add_var(if is_mip {
            Variable::binary("x").with_obj(4.0)
        } else {
            Variable::continuous("x").with_bounds(0.0, 1.0).with_obj(4.0)
        });
        model.add_var(Variable::continuous("y").with_bounds(0.0, 6.0).with_obj(1.0));
        model.add_constraint("demand", vec![(1, 1.0), (0, 10.0)], ConstraintSense::Ge, 8.0);
        let mut spec = ProblemSpec::new(model);
        spec.set_complicating_vars([0]).unwrap();
        let data = spec.make_problem_data().unwrap();
        MasterProblem::new(&SimplexBackend, &data.master, -100.0, &SolverParams::default()).unwrap()
    }

    fn cut(infeasible: bool, intercept: f64, slope: f64) -> SubproblemResult {
        SubproblemResult {
            infeasible,
            objective: if infeasible { f64::INFINITY } else { intercept },
            cut: CutRhs {
                intercept,
                coeffs: vec![slope],
            },
            index: 0,
            solution: vec![0.0],
            offset: None,
        }
    }

    #[test]
    fn test_thetas_start_at_their_lower_bound() {
        let mut master = master(true);
        let result = master.optimize(None).unwrap();
        assert_eq!(result.thetas, vec![-100.0]);
        assert_eq!(result.solution, vec![0.0]);
        assert!((result.objective + 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_cuts_move_the_master() {
        let mut master = master(true);
        // x >= 0.2 from the feasibility cut, theta >= 8 - 10x
        master.add_constraint(&cut(true, 2.0, -10.0)).unwrap();
        master.add_constraint(&cut(false, 8.0, -10.0)).unwrap();
        master.add_constraint(&cut(false, 0.0, 0.0)).unwrap();
        let result = master.optimize(None).unwrap();

        assert_eq!(result.solution, vec![1.0]);
        assert!(result.thetas[0].abs() < 1e-6, "theta = {}", result.thetas[0]);
        assert!((result.objective - 4.0).abs() < 1e-6);

        let stats = master.solution_stats();
        assert!((stats.obj_val - 4.0).abs() < 1e-6);
        assert_eq!(stats.mip_gap, 0.0);
    }

    #[test]
    fn test_cut_constraint_shape() {
        let master = master(true);
        let optimality = master.lazy_constraint(&cut(false, 8.0, -10.0));
        assert_eq!(optimality.coeffs, vec![(0, 10.0), (1, 1.0)]);
        assert_eq!(optimality.sense, ConstraintSense::Ge);
        assert_eq!(optimality.rhs, 8.0);

        let feasibility = master.lazy_constraint(&cut(true, 2.0, -10.0));
        assert_eq!(feasibility.coeffs, vec![(0, 10.0)]);
    }

    #[test]
    fn test_ensure_mip_hides_dummy_binary() {
        let mut master = master(false);
        assert!(master.is_continuous());
        master.ensure_mip();
        master.ensure_mip();
        assert!(!master.is_continuous());

        let result = master.optimize(None).unwrap();
        assert_eq!(result.solution.len(), 1);
        assert_eq!(result.thetas.len(), 1);
    }

    #[test]
    fn test_infeasible_master_is_an_error() {
        let mut master = master(true);
        master.add_constraint(&cut(true, 2.0, 0.0)).unwrap();
        let err = master.optimize(None).unwrap_err();
        assert!(matches!(err, BendersError::MasterFailed(Status::Infeasible)));
    }
}
