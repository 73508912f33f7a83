use sprs::{CsMat, TriMat};

use crate::error::{SolverError, SolverResult};

/// Variable domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VarType {
    Continuous,
    Binary,
    Integer,
}

impl VarType {
    pub fn is_continuous(self) -> bool {
        matches!(self, VarType::Continuous)
    }

    /// Single-letter code used in result files and logs (`C`, `B`, `I`)
    pub fn code(self) -> char {
        match self {
            VarType::Continuous => 'C',
            VarType::Binary => 'B',
            VarType::Integer => 'I',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintSense {
    /// Less than or equal (<=)
    #[cfg_attr(feature = "serde", serde(rename = "<="))]
    Le,
    /// Greater than or equal (>=)
    #[cfg_attr(feature = "serde", serde(rename = ">="))]
    Ge,
    /// Equal (=)
    #[cfg_attr(feature = "serde", serde(rename = "="))]
    Eq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

impl ObjectiveSense {
    /// +1 for minimization, -1 for maximization. Multiplying an objective by
    /// this value turns it into a minimization objective.
    pub fn sign(self) -> f64 {
        match self {
            ObjectiveSense::Minimize => 1.0,
            ObjectiveSense::Maximize => -1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    pub name: String,
    /// Lower bound; `null` in JSON means unbounded below
    #[cfg_attr(feature = "serde", serde(default, with = "lower_bound"))]
    pub lb: f64,
    /// Upper bound; `null` or missing in JSON means unbounded above
    #[cfg_attr(feature = "serde", serde(default = "unbounded_above", with = "upper_bound"))]
    pub ub: f64,
    /// Objective coefficient
    #[cfg_attr(feature = "serde", serde(default))]
    pub obj: f64,
    #[cfg_attr(feature = "serde", serde(default = "continuous"))]
    pub vtype: VarType,
}

impl Variable {
    /// A continuous variable in `[0, +inf)` with zero cost
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lb: 0.0,
            ub: f64::INFINITY,
            obj: 0.0,
            vtype: VarType::Continuous,
        }
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lb: 0.0,
            ub: 1.0,
            obj: 0.0,
            vtype: VarType::Binary,
        }
    }

    pub fn integer(name: impl Into<String>, lb: f64, ub: f64) -> Self {
        Self {
            name: name.into(),
            lb,
            ub,
            obj: 0.0,
            vtype: VarType::Integer,
        }
    }

    pub fn with_bounds(mut self, lb: f64, ub: f64) -> Self {
        self.lb = lb;
        self.ub = ub;
        self
    }

    pub fn with_obj(mut self, obj: f64) -> Self {
        self.obj = obj;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Sparse row: (variable index, coefficient)
    pub coeffs: Vec<(usize, f64)>,
    pub sense: ConstraintSense,
    /// Right-hand side value
    pub rhs: f64,
}

impl Constraint {
    pub fn new(
        name: impl Into<String>,
        coeffs: Vec<(usize, f64)>,
        sense: ConstraintSense,
        rhs: f64,
    ) -> Self {
        Self {
            name: name.into(),
            coeffs,
            sense,
            rhs,
        }
    }

    /// Left-hand side value at `x`
    pub fn activity(&self, x: &[f64]) -> f64 {
        self.coeffs.iter().map(|&(j, a)| a * x[j]).sum()
    }

    /// How far `x` is from satisfying the row (zero when satisfied)
    pub fn violation(&self, x: &[f64]) -> f64 {
        let lhs = self.activity(x);
        match self.sense {
            ConstraintSense::Le => (lhs - self.rhs).max(0.0),
            ConstraintSense::Ge => (self.rhs - lhs).max(0.0),
            ConstraintSense::Eq => (lhs - self.rhs).abs(),
        }
    }

    pub fn is_satisfied(&self, x: &[f64], tol: f64) -> bool {
        self.violation(x) <= tol * (1.0 + self.rhs.abs())
    }
}

/// A linear (mixed-integer) optimization model
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Model {
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    pub variables: Vec<Variable>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub constraints: Vec<Constraint>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sense: ObjectiveSense,
    /// Objective constant
    #[cfg_attr(feature = "serde", serde(default))]
    pub obj_const: f64,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_var(&mut self, var: Variable) -> usize {
        self.variables.push(var);
        self.variables.len() - 1
    }

    pub fn add_constr(&mut self, constraint: Constraint) -> usize {
        self.constraints.push(constraint);
        self.constraints.len() - 1
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        coeffs: Vec<(usize, f64)>,
        sense: ConstraintSense,
        rhs: f64,
    ) -> usize {
        self.add_constr(Constraint::new(name, coeffs, sense, rhs))
    }

    /// Replace the objective with `coefficients · x + constant`
    pub fn set_objective(&mut self, coefficients: &[f64], constant: f64, sense: ObjectiveSense) {
        for (var, &c) in self.variables.iter_mut().zip(coefficients) {
            var.obj = c;
        }
        for var in self.variables.iter_mut().skip(coefficients.len()) {
            var.obj = 0.0;
        }
        self.obj_const = constant;
        self.sense = sense;
    }

    /// Rewrite a maximization objective as the equivalent minimization of its
    /// negation. No-op for minimization models.
    pub fn to_minimization(&mut self) {
        if self.sense == ObjectiveSense::Maximize {
            for var in &mut self.variables {
                var.obj = -var.obj;
            }
            self.obj_const = -self.obj_const;
            self.sense = ObjectiveSense::Minimize;
        }
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// True when no variable is integer or binary
    pub fn is_continuous(&self) -> bool {
        self.variables.iter().all(|v| v.vtype.is_continuous())
    }

    pub fn objective(&self) -> Vec<f64> {
        self.variables.iter().map(|v| v.obj).collect()
    }

    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(x)
            .map(|(v, &xj)| v.obj * xj)
            .sum::<f64>()
            + self.obj_const
    }

    /// Remove the given variables and drop their coefficients from every row.
    /// Remaining variables keep their relative order.
    pub fn remove_vars(&mut self, indices: &[usize]) {
        let n = self.variables.len();
        let mut removed = vec![false; n];
        for &j in indices {
            if j < n {
                removed[j] = true;
            }
        }
        let mut new_index = vec![usize::MAX; n];
        let mut next = 0;
        for j in 0..n {
            if !removed[j] {
                new_index[j] = next;
                next += 1;
            }
        }

        let mut j = 0;
        self.variables.retain(|_| {
            let keep = !removed[j];
            j += 1;
            keep
        });
        for constraint in &mut self.constraints {
            constraint.coeffs = constraint
                .coeffs
                .iter()
                .filter(|&&(col, _)| !removed[col])
                .map(|&(col, a)| (new_index[col], a))
                .collect();
        }
    }

    /// Remove the given rows. Remaining rows keep their relative order.
    pub fn remove_constrs(&mut self, indices: &[usize]) {
        let m = self.constraints.len();
        let mut removed = vec![false; m];
        for &i in indices {
            if i < m {
                removed[i] = true;
            }
        }
        let mut i = 0;
        self.constraints.retain(|_| {
            let keep = !removed[i];
            i += 1;
            keep
        });
    }

    /// Constraint matrix in CSR form (rows = constraints, cols = variables).
    /// Repeated entries for the same variable in a row are summed.
    pub fn constraint_matrix(&self) -> CsMat<f64> {
        let mut tri = TriMat::new((self.constraints.len(), self.variables.len()));
        for (i, constraint) in self.constraints.iter().enumerate() {
            for &(j, a) in &constraint.coeffs {
                tri.add_triplet(i, j, a);
            }
        }
        tri.to_csr()
    }

    /// Check every row index refers to an existing variable and every bound
    /// pair is ordered
    pub fn validate(&self) -> SolverResult<()> {
        let n = self.variables.len();
        for (i, constraint) in self.constraints.iter().enumerate() {
            if let Some(&(j, _)) = constraint.coeffs.iter().find(|&&(j, _)| j >= n) {
                return Err(SolverError::InvalidIndex(format!(
                    "constraint {} ({}) references variable {} but the model has {}",
                    i, constraint.name, j, n
                )));
            }
            if !constraint.rhs.is_finite() {
                return Err(SolverError::InvalidModel(format!(
                    "constraint {} ({}) has a non-finite right-hand side",
                    i, constraint.name
                )));
            }
        }
        for (j, var) in self.variables.iter().enumerate() {
            if var.lb.is_nan() || var.ub.is_nan() || var.lb > var.ub {
                return Err(SolverError::InvalidModel(format!(
                    "variable {} ({}) has invalid bounds [{}, {}]",
                    j, var.name, var.lb, var.ub
                )));
            }
        }
        Ok(())
    }

    /// Check bounds, rows and integrality of `x`
    pub fn is_feasible(&self, x: &[f64], tol: f64) -> bool {
        if x.len() != self.variables.len() {
            return false;
        }
        let bounds_ok = self.variables.iter().zip(x).all(|(v, &xj)| {
            let integral = v.vtype.is_continuous() || (xj - xj.round()).abs() <= tol;
            integral && xj >= v.lb - tol && xj <= v.ub + tol
        });
        bounds_ok && self.constraints.iter().all(|c| c.is_satisfied(x, tol))
    }
}

#[cfg(feature = "serde")]
fn unbounded_above() -> f64 {
    f64::INFINITY
}

#[cfg(feature = "serde")]
fn continuous() -> VarType {
    VarType::Continuous
}

/// JSON has no infinity; infinite bounds travel as `null`
#[cfg(feature = "serde")]
mod lower_bound {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NEG_INFINITY))
    }
}

#[cfg(feature = "serde")]
mod upper_bound {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}
