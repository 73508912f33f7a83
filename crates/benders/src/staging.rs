//! Partitioning a model into master data and independent subproblem data.

use std::collections::BTreeSet;

use benders_solver::{ConstraintSense, Model, ObjectiveSense};
use sprs::CsMat;
use tracing::debug;

use crate::error::{BendersError, Result};
use crate::slicing;

/// A model plus the caller's variable partition
#[derive(Debug, Clone)]
pub struct ProblemSpec {
    model: Model,
    complicating_vars: Vec<usize>,
    non_complicating_vars: Vec<Vec<usize>>,
    finalized: bool,
    is_continuous: bool,
}

/// Everything the master problem is built from
#[derive(Debug, Clone)]
pub struct MasterData {
    /// Original model without subproblem rows and variables, as a
    /// minimization
    pub model: Model,
    pub num_subproblems: usize,
    /// True when the original model has no integer variables
    pub is_continuous: bool,
    /// Objective sense of the original model
    pub sense: ObjectiveSense,
}

/// One block in canonical form `a · x + b · y >= rhs`
#[derive(Debug, Clone)]
pub struct SubproblemData {
    /// Coupling matrix over the complicating variables
    pub a: CsMat<f64>,
    /// Block matrix over the block's own variables
    pub b: CsMat<f64>,
    pub rhs: Vec<f64>,
    /// Block objective, minimization sense
    pub c: Vec<f64>,
    pub c_const: f64,
    /// Original lower bounds; never modified
    pub lb: Vec<f64>,
    pub ub: Vec<f64>,
    pub index: usize,
    /// Set once lower bounds have been translated to zero
    pub offset: bool,
}

#[derive(Debug, Clone)]
pub struct ProblemData {
    pub master: MasterData,
    pub subproblems: Vec<SubproblemData>,
}

impl ProblemSpec {
    pub fn new(model: Model) -> Self {
        let is_continuous = model.is_continuous();
        Self {
            model,
            complicating_vars: Vec::new(),
            non_complicating_vars: Vec::new(),
            finalized: false,
            is_continuous,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Complicating variable indices, ascending
    pub fn complicating_vars(&self) -> &[usize] {
        &self.complicating_vars
    }

    pub fn non_complicating_vars(&self) -> &[Vec<usize>] {
        &self.non_complicating_vars
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn is_continuous(&self) -> bool {
        self.is_continuous
    }

    pub fn set_complicating_vars(&mut self, vars: impl IntoIterator<Item = usize>) -> Result<()> {
        self.check_not_finalized()?;
        let mut vars: Vec<usize> = vars.into_iter().collect();
        vars.sort_unstable();
        self.complicating_vars = vars;
        Ok(())
    }

    /// Add one explicit block of non-complicating variables
    pub fn add_non_complicating_vars(&mut self, vars: impl IntoIterator<Item = usize>) -> Result<()> {
        self.check_not_finalized()?;
        self.non_complicating_vars.push(vars.into_iter().collect());
        Ok(())
    }

    fn check_not_finalized(&self) -> Result<()> {
        if self.finalized {
            Err(BendersError::Finalized)
        } else {
            Ok(())
        }
    }

    /// Validate the partition and split the model; variables in no set are
    /// gathered into one trailing block. Marks `self` finalized on success
    /// and leaves it untouched on error.
    pub fn make_problem_data(&mut self) -> Result<ProblemData> {
        self.check_not_finalized()?;
        self.check_indices()?;
        let blocks = self.blocks_with_missing_indices();
        self.check_non_complicating_vars(&blocks)?;

        let matrix = self.model.constraint_matrix();
        let constraint_sets: Vec<BTreeSet<usize>> = blocks
            .iter()
            .map(|vars| slicing::row_support(&matrix, vars))
            .collect();
        check_independent_subproblems(&constraint_sets)?;

        self.non_complicating_vars = blocks;
        self.finalized = true;
        debug!(
            blocks = constraint_sets.len(),
            complicating = self.complicating_vars.len(),
            "partition validated"
        );

        let master = MasterData {
            model: self.make_master_model(&constraint_sets),
            num_subproblems: self.non_complicating_vars.len(),
            is_continuous: self.is_continuous,
            sense: self.model.sense,
        };
        let subproblems = constraint_sets
            .iter()
            .enumerate()
            .map(|(index, rows)| self.make_subproblem_data(&matrix, index, rows))
            .collect();

        Ok(ProblemData {
            master,
            subproblems,
        })
    }

    fn check_indices(&self) -> Result<()> {
        let n = self.model.num_variables();
        let mut seen = vec![false; n];
        let all = self
            .complicating_vars
            .iter()
            .chain(self.non_complicating_vars.iter().flatten());
        for &index in all {
            if index >= n {
                return Err(BendersError::InvalidPartition(format!(
                    "variable index {} out of range ({} variables)",
                    index, n
                )));
            }
            if seen[index] {
                return Err(BendersError::InvalidPartition(format!(
                    "variable {} ({}) is listed more than once",
                    index, self.model.variables[index].name
                )));
            }
            seen[index] = true;
        }
        Ok(())
    }

    /// The explicit blocks plus a trailing block of unassigned variables
    fn blocks_with_missing_indices(&self) -> Vec<Vec<usize>> {
        let mut blocks = self.non_complicating_vars.clone();
        let mut assigned = vec![false; self.model.num_variables()];
        let all = self
            .complicating_vars
            .iter()
            .chain(self.non_complicating_vars.iter().flatten());
        for &index in all {
            assigned[index] = true;
        }
        let missing: Vec<usize> = (0..assigned.len()).filter(|&j| !assigned[j]).collect();
        if !missing.is_empty() {
            debug!(count = missing.len(), "collecting unassigned variables into a trailing block");
            blocks.push(missing);
        }
        blocks
    }

    fn check_non_complicating_vars(&self, blocks: &[Vec<usize>]) -> Result<()> {
        match blocks
            .iter()
            .flatten()
            .find(|&&j| !self.model.variables[j].vtype.is_continuous())
        {
            Some(&index) => Err(BendersError::NonContinuousSubproblem {
                index,
                name: self.model.variables[index].name.clone(),
            }),
            None => Ok(()),
        }
    }

    fn make_master_model(&self, constraint_sets: &[BTreeSet<usize>]) -> Model {
        let mut master = self.model.clone();
        master.name = format!("{}_master", self.model.name);
        master.to_minimization();

        let rows: Vec<usize> = constraint_sets.iter().flatten().copied().collect();
        let vars: Vec<usize> = self.non_complicating_vars.iter().flatten().copied().collect();
        master.remove_constrs(&rows);
        master.remove_vars(&vars);
        master
    }

    fn make_subproblem_data(
        &self,
        matrix: &CsMat<f64>,
        index: usize,
        rows: &BTreeSet<usize>,
    ) -> SubproblemData {
        let vars = &self.non_complicating_vars[index];
        let rows: Vec<usize> = rows.iter().copied().collect();
        let sign = self.model.sense.sign();

        let constraints: Vec<_> = rows.iter().map(|&i| &self.model.constraints[i]).collect();
        let row_signs: Vec<f64> = constraints
            .iter()
            .map(|c| match c.sense {
                ConstraintSense::Le => -1.0,
                ConstraintSense::Ge | ConstraintSense::Eq => 1.0,
            })
            .collect();
        let equalities: Vec<usize> = constraints
            .iter()
            .enumerate()
            .filter(|(_, c)| c.sense == ConstraintSense::Eq)
            .map(|(k, _)| k)
            .collect();

        let a = slicing::scale_rows(
            &slicing::select(matrix, &rows, &self.complicating_vars),
            &row_signs,
        );
        let b = slicing::scale_rows(&slicing::select(matrix, &rows, vars), &row_signs);
        let mut rhs: Vec<f64> = constraints
            .iter()
            .zip(&row_signs)
            .map(|(c, s)| s * c.rhs)
            .collect();

        // Each equality also appears negated so every row reads `>=`
        let negate = vec![-1.0; equalities.len()];
        let a = slicing::vstack(
            &a,
            &slicing::scale_rows(&slicing::select_rows(&a, &equalities), &negate),
        );
        let b = slicing::vstack(
            &b,
            &slicing::scale_rows(&slicing::select_rows(&b, &equalities), &negate),
        );
        let mirrored: Vec<f64> = equalities.iter().map(|&k| -rhs[k]).collect();
        rhs.extend(mirrored);

        SubproblemData {
            a,
            b,
            rhs,
            c: vars.iter().map(|&j| sign * self.model.variables[j].obj).collect(),
            c_const: 0.0,
            lb: vars.iter().map(|&j| self.model.variables[j].lb).collect(),
            ub: vars.iter().map(|&j| self.model.variables[j].ub).collect(),
            index,
            offset: false,
        }
    }
}

fn check_independent_subproblems(constraint_sets: &[BTreeSet<usize>]) -> Result<()> {
    for second in 1..constraint_sets.len() {
        for first in 0..second {
            if !constraint_sets[first].is_disjoint(&constraint_sets[second]) {
                return Err(BendersError::OverlappingSubproblems { first, second });
            }
        }
    }
    Ok(())
}

impl SubproblemData {
    pub fn num_continuous_vars(&self) -> usize {
        self.b.cols()
    }

    pub fn num_complicating_vars(&self) -> usize {
        self.a.cols()
    }

    pub fn num_rows(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_zero_objective(&self) -> bool {
        self.c.iter().all(|&c| c == 0.0)
    }

    /// Rewrite the block so its variables start at zero and carry no upper
    /// bounds.
    ///
    /// `translate_lb` substitutes `y = y' + lb`: `rhs -= b · lb`,
    /// `c_const += c · lb`, `ub -= lb`. `ub_constraints` appends the row
    /// `-y_j >= -ub_j` for every finite upper bound, with a zero row in `a`.
    pub fn transform(&mut self, translate_lb: bool, ub_constraints: bool) -> Result<()> {
        if translate_lb {
            if let Some(var) = self.lb.iter().position(|lb| !lb.is_finite()) {
                return Err(BendersError::InfiniteLowerBound {
                    subproblem: self.index,
                    var,
                });
            }
            let shift = slicing::mul_vec(&self.b, &self.lb);
            for (r, s) in self.rhs.iter_mut().zip(shift) {
                *r -= s;
            }
            self.c_const += slicing::dot(&self.c, &self.lb);
            for (ub, lb) in self.ub.iter_mut().zip(&self.lb) {
                *ub -= lb;
            }
            self.offset = true;
        }

        if ub_constraints {
            let finite: Vec<usize> = (0..self.ub.len())
                .filter(|&j| self.ub[j].is_finite())
                .collect();
            let mut tri = sprs::TriMat::new((finite.len(), self.b.cols()));
            for (k, &j) in finite.iter().enumerate() {
                tri.add_triplet(k, j, -1.0);
            }
            let bounds: CsMat<f64> = tri.to_csr();
            self.b = slicing::vstack(&self.b, &bounds);
            self.a = slicing::vstack(&self.a, &slicing::zeros(finite.len(), self.a.cols()));
            self.rhs.extend(finite.iter().map(|&j| -self.ub[j]));
        }
        Ok(())
    }

    /// Objective of block point `y` (original coordinates)
    pub fn objective(&self, y: &[f64]) -> f64 {
        slicing::dot(&self.c, y)
    }
}
