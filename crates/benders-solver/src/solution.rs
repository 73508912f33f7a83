use crate::status::Status;

/// The result of solving an LP relaxation with the simplex method.
///
/// Vectors that do not apply to the final status are empty: `values`,
/// `duals` and `reduced_costs` are filled when optimal, `farkas` when
/// infeasible and `ray` when unbounded.
#[derive(Debug, Clone)]
pub struct LpSolution {
    pub status: Status,
    pub values: Vec<f64>,
    pub objective_value: f64,
    /// Row duals, one per constraint
    pub duals: Vec<f64>,
    /// Reduced costs, one per variable
    pub reduced_costs: Vec<f64>,
    /// Infeasibility certificate, one multiplier per constraint
    pub farkas: Vec<f64>,
    /// Improving direction, one entry per variable
    pub ray: Vec<f64>,
    /// Simplex pivots performed
    pub iterations: usize,
}

impl LpSolution {
    fn empty(status: Status, objective_value: f64, iterations: usize) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective_value,
            duals: Vec::new(),
            reduced_costs: Vec::new(),
            farkas: Vec::new(),
            ray: Vec::new(),
            iterations,
        }
    }

    pub fn infeasible(farkas: Vec<f64>, iterations: usize) -> Self {
        Self {
            farkas,
            ..Self::empty(Status::Infeasible, f64::INFINITY, iterations)
        }
    }

    pub fn unbounded(ray: Vec<f64>, iterations: usize) -> Self {
        Self {
            ray,
            ..Self::empty(Status::Unbounded, f64::NEG_INFINITY, iterations)
        }
    }

    pub fn iteration_limit(iterations: usize) -> Self {
        Self::empty(Status::IterationLimit, f64::NAN, iterations)
    }
}

/// The result of a branch-and-bound search
#[derive(Debug, Clone)]
pub struct MipSolution {
    pub status: Status,
    /// Best integer-feasible point found
    pub values: Option<Vec<f64>>,
    pub objective_value: Option<f64>,
    /// Best proven bound on the optimal objective
    pub bound: Option<f64>,
    pub node_count: u64,
}

impl MipSolution {
    /// Relative gap between incumbent and bound, `|obj - bound| / |obj|`
    pub fn gap(&self) -> Option<f64> {
        let objective = self.objective_value?;
        let bound = self.bound?;
        let diff = (objective - bound).abs();
        if diff == 0.0 {
            Some(0.0)
        } else if objective == 0.0 {
            Some(f64::INFINITY)
        } else {
            Some(diff / objective.abs())
        }
    }
}
