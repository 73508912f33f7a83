//! Solve outcomes of the master, the subproblems, and the whole run.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use benders_solver::{ObjectiveSense, VarType};

use crate::driver::Termination;
use crate::error::{BendersError, Result};
use crate::staging::ProblemSpec;

/// A master solve, read either after `optimize` or from an incumbent
#[derive(Debug, Clone, PartialEq)]
pub struct MasterResult {
    pub objective: f64,
    /// One value per subproblem, in partition order
    pub thetas: Vec<f64>,
    /// Complicating variable values, dummy binary excluded
    pub solution: Vec<f64>,
}

/// Right-hand side of a cut, `intercept + coeffs · x`
#[derive(Debug, Clone, PartialEq)]
pub struct CutRhs {
    pub intercept: f64,
    /// One coefficient per complicating variable
    pub coeffs: Vec<f64>,
}

impl CutRhs {
    pub fn evaluate(&self, x: &[f64]) -> f64 {
        self.intercept + self.coeffs.iter().zip(x).map(|(g, x)| g * x).sum::<f64>()
    }
}

/// Outcome of one subproblem solve against a master candidate
#[derive(Debug, Clone, PartialEq)]
pub struct SubproblemResult {
    /// True when the block has no feasible point for the candidate; the cut
    /// is then a feasibility cut
    pub infeasible: bool,
    /// Block objective, `+inf` when infeasible
    pub objective: f64,
    pub cut: CutRhs,
    pub index: usize,
    /// Block variable values in translated coordinates
    pub solution: Vec<f64>,
    /// Lower bounds the solution was translated by, if any
    pub offset: Option<Vec<f64>>,
}

impl SubproblemResult {
    /// Block variable values in original coordinates
    pub fn x(&self) -> Vec<f64> {
        match &self.offset {
            Some(offset) => self
                .solution
                .iter()
                .zip(offset)
                .map(|(y, lb)| y + lb)
                .collect(),
            None => self.solution.clone(),
        }
    }
}

/// Master solver statistics, in the master's minimization sense
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolutionStats {
    pub runtime: f64,
    pub obj_val: f64,
    pub obj_bound: f64,
    pub mip_gap: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct Resolved {
    x: Vec<f64>,
    names: Vec<String>,
    vtypes: Vec<VarType>,
}

/// Everything one decomposition run produced
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    pub master: MasterResult,
    pub subproblems: Vec<SubproblemResult>,
    pub stats: SolutionStats,
    pub termination: Termination,
    sense: ObjectiveSense,
    resolved: Option<Resolved>,
}

impl SolveResult {
    pub fn new(
        master: MasterResult,
        subproblems: Vec<SubproblemResult>,
        stats: SolutionStats,
        termination: Termination,
    ) -> Self {
        Self {
            master,
            subproblems,
            stats,
            termination,
            sense: ObjectiveSense::Minimize,
            resolved: None,
        }
    }

    /// Reassemble the full solution in the original variable order and adopt
    /// the original objective sense
    pub fn resolve(&mut self, spec: &ProblemSpec) {
        let model = spec.model();
        let mut x = vec![0.0; model.num_variables()];
        let order = spec
            .complicating_vars()
            .iter()
            .chain(spec.non_complicating_vars().iter().flatten());
        let values = self
            .master
            .solution
            .iter()
            .copied()
            .chain(self.subproblems.iter().flat_map(|sub| sub.x()));
        for (&j, value) in order.zip(values) {
            x[j] = value;
        }

        self.sense = model.sense;
        self.resolved = Some(Resolved {
            x,
            names: model.variables.iter().map(|v| v.name.clone()).collect(),
            vtypes: model.variables.iter().map(|v| v.vtype).collect(),
        });
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    pub fn obj_val(&self) -> f64 {
        self.sense.sign() * self.stats.obj_val
    }

    pub fn obj_bound(&self) -> f64 {
        self.sense.sign() * self.stats.obj_bound
    }

    pub fn runtime(&self) -> f64 {
        self.stats.runtime
    }

    pub fn mip_gap(&self) -> f64 {
        self.stats.mip_gap
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Full solution in original variable order; `None` before `resolve`
    pub fn x(&self) -> Option<&[f64]> {
        self.resolved.as_ref().map(|r| r.x.as_slice())
    }

    /// Write one `name value` line per variable. `.sol` files list every
    /// variable, `.mst` files only integer and binary ones.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let integral_only = match path.extension().and_then(|e| e.to_str()) {
            Some("sol") => false,
            Some("mst") => true,
            _ => return Err(BendersError::UnsupportedResultFormat(path.display().to_string())),
        };
        let resolved = self.resolved.as_ref().ok_or(BendersError::Unresolved)?;

        let mut out = BufWriter::new(File::create(path)?);
        for ((name, vtype), value) in resolved.names.iter().zip(&resolved.vtypes).zip(&resolved.x) {
            if integral_only && vtype.is_continuous() {
                continue;
            }
            writeln!(out, "{} {}", name, value)?;
        }
        out.flush()?;
        Ok(())
    }
}
