use crate::model::{ConstraintSense, Model};
use crate::solution::LpSolution;
use crate::status::Status;

/// Two-phase bounded simplex for LP relaxations.
///
/// Integrality is ignored. Duals, reduced costs, Farkas certificates and
/// unbounded rays are reported in the conventions of
/// [`SolverModel`](crate::SolverModel).
#[derive(Debug, Clone)]
pub struct Simplex {
    /// Maximum pivots before giving up
    max_iterations: usize,
    /// Tolerance for pivot selection and bound snapping
    tolerance: f64,
    /// Phase-one infeasibility above which the LP is declared infeasible
    feasibility_tol: f64,
}

impl Default for Simplex {
    fn default() -> Self {
        Self {
            max_iterations: 100_000,
            tolerance: 1e-9,
            feasibility_tol: 1e-7,
        }
    }
}

impl Simplex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_feasibility_tol(mut self, tol: f64) -> Self {
        self.feasibility_tol = tol;
        self
    }

    /// Solve the LP relaxation of `model` within its own variable bounds
    pub fn solve(&self, model: &Model) -> LpSolution {
        let bounds: Vec<(f64, f64)> = model.variables.iter().map(|v| (v.lb, v.ub)).collect();
        self.solve_with_bounds(model, &bounds)
    }

    /// Solve the LP relaxation of `model` with `bounds` replacing the
    /// variable bounds
    pub fn solve_with_bounds(&self, model: &Model, bounds: &[(f64, f64)]) -> LpSolution {
        let num_rows = model.constraints.len();
        let Some(form) = StandardForm::build(model, bounds, self.tolerance) else {
            // Crossed bounds: no row combination is needed to prove it
            return LpSolution::infeasible(vec![0.0; num_rows], 0);
        };
        let mut tableau = form.tableau();
        let mut iterations = 0;

        // Phase 1: minimize the sum of artificials
        match self.iterate(&mut tableau, &mut iterations) {
            Pass::Optimal => {}
            Pass::IterationLimit => return LpSolution::iteration_limit(iterations),
            // Phase one is bounded below by zero
            Pass::Unbounded(_) => return LpSolution::iteration_limit(iterations),
        }

        // Sum of the artificials left at the phase-one optimum
        let infeasibility = tableau.objective_value();
        if infeasibility > self.feasibility_tol * (1.0 + form.rhs_scale()) {
            let farkas = (0..num_rows)
                .map(|i| -form.row_sign[i] * (1.0 - tableau.reduced_cost(tableau.artificial_start + i)))
                .collect();
            return LpSolution::infeasible(farkas, iterations);
        }

        self.drive_out_artificials(&mut tableau);
        tableau.set_objective(&form.cost);

        // Phase 2: optimize the real objective
        match self.iterate(&mut tableau, &mut iterations) {
            Pass::Optimal => {}
            Pass::IterationLimit => return LpSolution::iteration_limit(iterations),
            Pass::Unbounded(entering) => {
                let direction = tableau.ray(entering);
                return LpSolution::unbounded(form.map_direction(&direction), iterations);
            }
        }

        self.extract_solution(&tableau, &form, model, bounds, iterations)
    }

    fn iterate(&self, tableau: &mut Tableau, iterations: &mut usize) -> Pass {
        loop {
            let Some(col) = self.find_pivot_column(tableau) else {
                return Pass::Optimal;
            };
            let Some(row) = self.find_pivot_row(tableau, col) else {
                return Pass::Unbounded(col);
            };
            if *iterations >= self.max_iterations {
                return Pass::IterationLimit;
            }
            tableau.pivot(row, col);
            *iterations += 1;
        }
    }

    /// Bland's rule: lowest-index column with a negative reduced cost.
    /// Artificial columns never re-enter.
    fn find_pivot_column(&self, tableau: &Tableau) -> Option<usize> {
        (0..tableau.artificial_start).find(|&j| tableau.reduced_cost(j) < -self.tolerance)
    }

    /// Minimum ratio test, ties broken by the lowest basic index
    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let rhs_col = tableau.rhs_col();
        let mut best: Option<(usize, f64)> = None;

        for (i, row) in tableau.data[..tableau.num_rows()].iter().enumerate() {
            let entry = row[col];
            if entry <= self.tolerance {
                continue;
            }
            let ratio = row[rhs_col].max(0.0) / entry;
            best = match best {
                None => Some((i, ratio)),
                Some((r, best_ratio)) => {
                    if ratio < best_ratio - 1e-12
                        || ((ratio - best_ratio).abs() <= 1e-12
                            && tableau.basic_vars[i] < tableau.basic_vars[r])
                    {
                        Some((i, ratio))
                    } else {
                        Some((r, best_ratio))
                    }
                }
            };
        }

        best.map(|(i, _)| i)
    }

    /// Pivot zero-valued artificials out of the basis where a structural or
    /// slack column can replace them. Rows where none can are redundant.
    fn drive_out_artificials(&self, tableau: &mut Tableau) {
        for row in 0..tableau.num_rows() {
            if tableau.basic_vars[row] < tableau.artificial_start {
                continue;
            }
            let replacement = (0..tableau.artificial_start)
                .filter(|&j| tableau.data[row][j].abs() > self.tolerance)
                .max_by(|&a, &b| {
                    tableau.data[row][a]
                        .abs()
                        .total_cmp(&tableau.data[row][b].abs())
                });
            if let Some(col) = replacement {
                tableau.pivot(row, col);
            }
        }
    }

    fn extract_solution(
        &self,
        tableau: &Tableau,
        form: &StandardForm,
        model: &Model,
        bounds: &[(f64, f64)],
        iterations: usize,
    ) -> LpSolution {
        let mut point = vec![0.0; tableau.artificial_start];
        for (row, &basic) in tableau.basic_vars.iter().enumerate() {
            if basic < tableau.artificial_start {
                point[basic] = tableau.data[row][tableau.rhs_col()].max(0.0);
            }
        }

        let values: Vec<f64> = form
            .map_point(&point)
            .into_iter()
            .zip(bounds)
            .map(|(x, &(lb, ub))| self.snap(x, lb, ub))
            .collect();

        let sign = model.sense.sign();
        let duals: Vec<f64> = (0..model.constraints.len())
            .map(|i| {
                let y = -tableau.reduced_cost(tableau.artificial_start + i);
                sign * form.row_sign[i] * y
            })
            .collect();

        let mut reduced_costs = model.objective();
        for (constraint, &pi) in model.constraints.iter().zip(&duals) {
            for &(j, a) in &constraint.coeffs {
                reduced_costs[j] -= pi * a;
            }
        }

        // Cancellation noise on a zero objective reads as exactly zero
        let objective_value = model.objective_value(&values);
        let scale = model.obj_const.abs()
            + model
                .variables
                .iter()
                .zip(&values)
                .map(|(v, x)| (v.obj * x).abs())
                .sum::<f64>();
        let objective_value = if objective_value.abs() <= self.tolerance * (1.0 + scale) {
            0.0
        } else {
            objective_value
        };

        LpSolution {
            status: Status::Optimal,
            objective_value,
            values,
            duals,
            reduced_costs,
            farkas: Vec::new(),
            ray: Vec::new(),
            iterations,
        }
    }

    /// Values within tolerance of a bound land exactly on it
    fn snap(&self, x: f64, lb: f64, ub: f64) -> f64 {
        let tol = self.tolerance * 10.0;
        if lb.is_finite() && (x - lb).abs() <= tol * (1.0 + lb.abs()) {
            lb
        } else if ub.is_finite() && (x - ub).abs() <= tol * (1.0 + ub.abs()) {
            ub
        } else {
            x
        }
    }
}

enum Pass {
    Optimal,
    Unbounded(usize),
    IterationLimit,
}

/// How an original variable maps onto non-negative standard-form columns
#[derive(Debug, Clone, Copy)]
enum Column {
    /// `x = value`, no column
    Fixed(f64),
    /// `x = lb + z`
    Shifted { col: usize, lb: f64 },
    /// `x = ub - z`
    Mirrored { col: usize, ub: f64 },
    /// `x = z_pos - z_neg`
    Split { pos: usize, neg: usize },
}

/// `A' z = b'`, `z >= 0`, `b' >= 0`: bounds turned into shifts and extra
/// rows, inequalities into slacks, negative rows flipped
struct StandardForm {
    columns: Vec<Column>,
    /// Dense rows over structural and slack columns
    rows: Vec<Vec<f64>>,
    rhs: Vec<f64>,
    /// -1 where the row was negated to make its right-hand side non-negative
    row_sign: Vec<f64>,
    /// Minimization cost over structural and slack columns
    cost: Vec<f64>,
    num_cols: usize,
}

impl StandardForm {
    fn build(model: &Model, bounds: &[(f64, f64)], tol: f64) -> Option<Self> {
        let mut columns = Vec::with_capacity(bounds.len());
        let mut caps = Vec::new();
        let mut next = 0;

        for &(lb, ub) in bounds {
            if lb > ub + tol {
                return None;
            }
            let column = if lb.is_finite() && ub.is_finite() && ub - lb <= tol {
                Column::Fixed(lb)
            } else if lb.is_finite() {
                if ub.is_finite() {
                    caps.push((next, ub - lb));
                }
                next += 1;
                Column::Shifted { col: next - 1, lb }
            } else if ub.is_finite() {
                next += 1;
                Column::Mirrored { col: next - 1, ub }
            } else {
                next += 2;
                Column::Split {
                    pos: next - 2,
                    neg: next - 1,
                }
            };
            columns.push(column);
        }

        let num_structural = next;
        let num_inequalities = model
            .constraints
            .iter()
            .filter(|c| c.sense != ConstraintSense::Eq)
            .count();
        let num_cols = num_structural + num_inequalities + caps.len();
        let num_rows = model.constraints.len() + caps.len();

        let mut rows = vec![vec![0.0; num_cols]; num_rows];
        let mut rhs = vec![0.0; num_rows];
        let mut slack = num_structural;

        for (i, constraint) in model.constraints.iter().enumerate() {
            let mut b = constraint.rhs;
            for &(j, a) in &constraint.coeffs {
                match columns[j] {
                    Column::Fixed(value) => b -= a * value,
                    Column::Shifted { col, lb } => {
                        rows[i][col] += a;
                        b -= a * lb;
                    }
                    Column::Mirrored { col, ub } => {
                        rows[i][col] -= a;
                        b -= a * ub;
                    }
                    Column::Split { pos, neg } => {
                        rows[i][pos] += a;
                        rows[i][neg] -= a;
                    }
                }
            }
            match constraint.sense {
                ConstraintSense::Le => {
                    rows[i][slack] = 1.0;
                    slack += 1;
                }
                ConstraintSense::Ge => {
                    rows[i][slack] = -1.0;
                    slack += 1;
                }
                ConstraintSense::Eq => {}
            }
            rhs[i] = b;
        }

        for (k, &(col, cap)) in caps.iter().enumerate() {
            let i = model.constraints.len() + k;
            rows[i][col] = 1.0;
            rows[i][slack] = 1.0;
            slack += 1;
            rhs[i] = cap;
        }

        let mut row_sign = vec![1.0; num_rows];
        for i in 0..num_rows {
            if rhs[i] < 0.0 {
                row_sign[i] = -1.0;
                rhs[i] = -rhs[i];
                for value in &mut rows[i] {
                    *value = -*value;
                }
            }
        }

        let sign = model.sense.sign();
        let mut cost = vec![0.0; num_cols];
        for (var, column) in model.variables.iter().zip(&columns) {
            let c = sign * var.obj;
            match *column {
                Column::Fixed(_) => {}
                Column::Shifted { col, .. } => cost[col] = c,
                Column::Mirrored { col, .. } => cost[col] = -c,
                Column::Split { pos, neg } => {
                    cost[pos] = c;
                    cost[neg] = -c;
                }
            }
        }

        Some(Self {
            columns,
            rows,
            rhs,
            row_sign,
            cost,
            num_cols,
        })
    }

    fn rhs_scale(&self) -> f64 {
        self.rhs.iter().fold(0.0, |acc: f64, b| acc.max(b.abs()))
    }

    /// Phase-one tableau: one artificial per row, all artificials basic
    fn tableau(&self) -> Tableau {
        let num_rows = self.rows.len();
        let width = self.num_cols + num_rows + 1;
        let mut data = Vec::with_capacity(num_rows + 1);

        for (i, row) in self.rows.iter().enumerate() {
            let mut full = row.clone();
            full.resize(width, 0.0);
            full[self.num_cols + i] = 1.0;
            full[width - 1] = self.rhs[i];
            data.push(full);
        }

        let mut objective = vec![0.0; width];
        for row in &data {
            for j in 0..self.num_cols {
                objective[j] -= row[j];
            }
            objective[width - 1] -= row[width - 1];
        }
        data.push(objective);

        Tableau {
            data,
            basic_vars: (self.num_cols..self.num_cols + num_rows).collect(),
            artificial_start: self.num_cols,
        }
    }

    fn map_point(&self, z: &[f64]) -> Vec<f64> {
        self.columns
            .iter()
            .map(|column| match *column {
                Column::Fixed(value) => value,
                Column::Shifted { col, lb } => lb + z[col],
                Column::Mirrored { col, ub } => ub - z[col],
                Column::Split { pos, neg } => z[pos] - z[neg],
            })
            .collect()
    }

    fn map_direction(&self, dz: &[f64]) -> Vec<f64> {
        self.columns
            .iter()
            .map(|column| match *column {
                Column::Fixed(_) => 0.0,
                Column::Shifted { col, .. } => dz[col],
                Column::Mirrored { col, .. } => -dz[col],
                Column::Split { pos, neg } => dz[pos] - dz[neg],
            })
            .collect()
    }
}

/// Dense tableau. The last row holds reduced costs and `-objective`, the
/// last column holds the basic values.
struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    artificial_start: usize,
}

impl Tableau {
    fn num_rows(&self) -> usize {
        self.basic_vars.len()
    }

    fn rhs_col(&self) -> usize {
        self.data[0].len() - 1
    }

    fn reduced_cost(&self, col: usize) -> f64 {
        self.data[self.num_rows()][col]
    }

    fn objective_value(&self) -> f64 {
        -self.data[self.num_rows()][self.rhs_col()]
    }

    /// Install a new cost vector (artificials cost nothing) and price out
    /// the current basis
    fn set_objective(&mut self, cost: &[f64]) {
        let num_rows = self.num_rows();
        let width = self.data[num_rows].len();
        let mut objective = vec![0.0; width];
        objective[..cost.len()].copy_from_slice(cost);

        for row in 0..num_rows {
            let basic = self.basic_vars[row];
            let c = if basic < cost.len() { cost[basic] } else { 0.0 };
            if c != 0.0 {
                for (value, entry) in objective.iter_mut().zip(&self.data[row]) {
                    *value -= c * entry;
                }
            }
        }
        self.data[num_rows] = objective;
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let n_rows = self.data.len();
        let n_cols = self.data[0].len();

        self.basic_vars[row] = col;

        let pivot_val = self.data[row][col];
        for j in 0..n_cols {
            self.data[row][j] /= pivot_val;
        }

        let pivot_row = self.data[row].clone();
        for i in 0..n_rows {
            if i != row {
                let factor = self.data[i][col];
                if factor != 0.0 {
                    for j in 0..n_cols {
                        self.data[i][j] -= factor * pivot_row[j];
                    }
                }
            }
        }
    }

    /// Edge direction along which `entering` grows without bound
    fn ray(&self, entering: usize) -> Vec<f64> {
        let mut direction = vec![0.0; self.artificial_start];
        direction[entering] = 1.0;
        for (row, &basic) in self.basic_vars.iter().enumerate() {
            if basic < self.artificial_start {
                direction[basic] = -self.data[row][entering];
            }
        }
        direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ObjectiveSense, Variable};

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y
        // Subject to:
        //   x + y <= 4
        //   x <= 3
        //   y <= 3
        //   x, y >= 0
        // Optimal: x=3, y=1, obj=11
        let mut model = Model::new("max");
        model.add_var(Variable::continuous("x").with_obj(3.0));
        model.add_var(Variable::continuous("y").with_obj(2.0));
        model.sense = ObjectiveSense::Maximize;
        model.add_constraint("sum", vec![(0, 1.0), (1, 1.0)], ConstraintSense::Le, 4.0);
        model.add_constraint("x_max", vec![(0, 1.0)], ConstraintSense::Le, 3.0);
        model.add_constraint("y_max", vec![(1, 1.0)], ConstraintSense::Le, 3.0);

        let solution = Simplex::new().solve(&model);

        assert_eq!(solution.status, Status::Optimal);
        assert!((solution.values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", solution.values[0]);
        assert!((solution.values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", solution.values[1]);
        assert!((solution.objective_value - 11.0).abs() < 1e-6, "obj = {} (expected 11)", solution.objective_value);

        // Raising "sum" by one unit buys one more y: +2
        assert!((solution.duals[0] - 2.0).abs() < 1e-6, "pi_sum = {}", solution.duals[0]);
        assert!((solution.duals[1] - 1.0).abs() < 1e-6, "pi_x_max = {}", solution.duals[1]);
        assert!(solution.duals[2].abs() < 1e-6, "pi_y_max = {}", solution.duals[2]);
    }

    #[test]
    fn test_minimization_with_ge() {
        // Minimize: 2x + 3y
        // Subject to:
        //   x + y >= 10
        //   x >= 2
        //   y >= 3
        // Optimal: x=7, y=3, obj=23
        let mut model = Model::new("min");
        model.add_var(Variable::continuous("x").with_obj(2.0));
        model.add_var(Variable::continuous("y").with_obj(3.0));
        model.add_constraint("sum", vec![(0, 1.0), (1, 1.0)], ConstraintSense::Ge, 10.0);
        model.add_constraint("x_min", vec![(0, 1.0)], ConstraintSense::Ge, 2.0);
        model.add_constraint("y_min", vec![(1, 1.0)], ConstraintSense::Ge, 3.0);

        let solution = Simplex::new().solve(&model);

        assert_eq!(solution.status, Status::Optimal);
        assert!((solution.values[0] - 7.0).abs() < 1e-6, "x = {} (expected 7)", solution.values[0]);
        assert!((solution.values[1] - 3.0).abs() < 1e-6, "y = {} (expected 3)", solution.values[1]);
        assert!((solution.objective_value - 23.0).abs() < 1e-6);

        assert!((solution.duals[0] - 2.0).abs() < 1e-6, "pi_sum = {}", solution.duals[0]);
        assert!((solution.duals[2] - 1.0).abs() < 1e-6, "pi_y_min = {}", solution.duals[2]);
        // Reduced costs vanish on basic variables
        assert!(solution.reduced_costs[0].abs() < 1e-6);
        assert!(solution.reduced_costs[1].abs() < 1e-6);
    }

    #[test]
    fn test_bounds_and_reduced_costs() {
        // min -x - 2y, x in [1, 2], y in [-inf, 5], x + y <= 4
        // y is cheaper to raise, so x stays at its lower bound: x=1, y=3
        let mut model = Model::new("bounds");
        model.add_var(Variable::continuous("x").with_bounds(1.0, 2.0).with_obj(-1.0));
        model.add_var(Variable::continuous("y").with_bounds(f64::NEG_INFINITY, 5.0).with_obj(-2.0));
        model.add_constraint("cap", vec![(0, 1.0), (1, 1.0)], ConstraintSense::Le, 4.0);

        let solution = Simplex::new().solve(&model);
        assert_eq!(solution.status, Status::Optimal);
        assert!((solution.values[0] - 1.0).abs() < 1e-9, "x = {}", solution.values[0]);
        assert!((solution.values[1] - 3.0).abs() < 1e-9, "y = {}", solution.values[1]);
        assert!((solution.duals[0] + 2.0).abs() < 1e-9);
        // rc_x = -1 - (-2)(1) = 1 > 0 at its lower bound
        assert!((solution.reduced_costs[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_infeasible_farkas_certificate() {
        // x >= 5 and x <= 3
        let mut model = Model::new("infeasible");
        model.add_var(Variable::continuous("x").with_obj(1.0));
        model.add_constraint("low", vec![(0, 1.0)], ConstraintSense::Ge, 5.0);
        model.add_constraint("high", vec![(0, 1.0)], ConstraintSense::Le, 3.0);

        let solution = Simplex::new().solve(&model);
        assert_eq!(solution.status, Status::Infeasible);
        assert_eq!(solution.farkas.len(), 2);

        let lambda = &solution.farkas;
        assert!(lambda[0] < 0.0, "ge row multiplier {} must be <= 0", lambda[0]);
        assert!(lambda[1] > 0.0, "le row multiplier {} must be >= 0", lambda[1]);
        // lambda^T A x = (lambda_0 + lambda_1) x must exceed lambda^T b for x >= 0
        let lhs_coeff = lambda[0] + lambda[1];
        let rhs = 5.0 * lambda[0] + 3.0 * lambda[1];
        assert!(lhs_coeff >= -1e-9);
        assert!(rhs < -1e-9, "lambda^T b = {}", rhs);
    }

    #[test]
    fn test_unbounded_ray() {
        // max x + y, x - y <= 1
        let mut model = Model::new("unbounded");
        model.add_var(Variable::continuous("x").with_obj(1.0));
        model.add_var(Variable::continuous("y").with_obj(1.0));
        model.sense = ObjectiveSense::Maximize;
        model.add_constraint("diff", vec![(0, 1.0), (1, -1.0)], ConstraintSense::Le, 1.0);

        let solution = Simplex::new().solve(&model);
        assert_eq!(solution.status, Status::Unbounded);
        let ray = &solution.ray;
        assert!(ray[0] >= -1e-9 && ray[1] >= -1e-9);
        assert!(ray[0] - ray[1] <= 1e-9, "ray leaves the feasible region");
        assert!(ray[0] + ray[1] > 1e-9, "ray does not improve the objective");
    }

    #[test]
    fn test_equality_and_fixed_variable() {
        // min x + y + z, x + y = 3, y - z >= 1, z fixed at 2
        let mut model = Model::new("fixed");
        model.add_var(Variable::continuous("x").with_obj(1.0));
        model.add_var(Variable::continuous("y").with_obj(1.0));
        model.add_var(Variable::continuous("z").with_bounds(2.0, 2.0).with_obj(1.0));
        model.add_constraint("sum", vec![(0, 1.0), (1, 1.0)], ConstraintSense::Eq, 3.0);
        model.add_constraint("gap", vec![(1, 1.0), (2, -1.0)], ConstraintSense::Ge, 1.0);

        let solution = Simplex::new().solve(&model);
        assert_eq!(solution.status, Status::Optimal);
        assert_eq!(solution.values[2], 2.0);
        assert!(solution.values[1] >= 3.0 - 1e-9);
        assert!((solution.objective_value - 5.0).abs() < 1e-9);
        // z's reduced cost: 1 - (pi_gap)(-1)
        let expected = 1.0 + solution.duals[1];
        assert!((solution.reduced_costs[2] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_objective_snaps_to_zero() {
        // A feasibility LP whose slacks must report exactly zero
        let mut model = Model::new("slacks");
        model.add_var(Variable::continuous("y").with_bounds(0.0, 4.0));
        model.add_var(Variable::continuous("s").with_obj(1.0));
        model.add_constraint("row", vec![(0, 1.0), (1, 1.0)], ConstraintSense::Ge, 2.5);
        model.add_constraint("cap", vec![(0, 3.0), (1, 1.0)], ConstraintSense::Le, 9.0);

        let solution = Simplex::new().solve(&model);
        assert_eq!(solution.status, Status::Optimal);
        assert_eq!(solution.values[1], 0.0);
        assert_eq!(solution.objective_value, 0.0);
    }

    #[test]
    fn test_infeasible_equality_never_reaches_phase_two() {
        // x + y = 10 against x + y <= 4; phase one ends with artificials at 6
        let mut model = Model::new("conflict");
        model.add_var(Variable::continuous("x").with_obj(-1.0));
        model.add_var(Variable::continuous("y").with_obj(-1.0));
        model.add_constraint("total", vec![(0, 1.0), (1, 1.0)], ConstraintSense::Eq, 10.0);
        model.add_constraint("cap", vec![(0, 1.0), (1, 1.0)], ConstraintSense::Le, 4.0);

        let solution = Simplex::new().solve(&model);
        assert_eq!(solution.status, Status::Infeasible);
        assert_eq!(solution.farkas.len(), 2);
        // Both columns are (1, 1), so lambda^T A = (lambda_0 + lambda_1) (1, 1)
        let lambda = &solution.farkas;
        assert!(lambda[1] > 0.0, "le row multiplier {} must be >= 0", lambda[1]);
        assert!(lambda[0] + lambda[1] >= -1e-9, "farkas = {:?}", lambda);
        let rhs = 10.0 * lambda[0] + 4.0 * lambda[1];
        assert!(rhs < -1e-9, "lambda^T b = {}", rhs);
    }
}
