//! Convergence drivers that alternate between master and subproblems.

mod callback;
mod iterative;

use benders_solver::Status;

use crate::error::Result;
use crate::result::{MasterResult, SubproblemResult};
use crate::subproblem::CutOracle;

pub use callback::CallbackDriver;
pub use iterative::IterativeDriver;

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Upper and lower bound met within the configured gap
    OptimalityGap,
    TimeLimit,
    IterationLimit,
    /// The single branch-and-bound run of the callback driver ended with
    /// this master status
    MasterStatus(Status),
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::OptimalityGap => write!(f, "optimality gap reached"),
            Termination::TimeLimit => write!(f, "time limit reached"),
            Termination::IterationLimit => write!(f, "iteration limit reached"),
            Termination::MasterStatus(status) => write!(f, "master {}", status),
        }
    }
}

/// Solve every block against `candidate`, in partition order
pub(crate) fn solve_all<O: CutOracle>(
    subproblems: &mut [O],
    candidate: &MasterResult,
) -> Result<Vec<SubproblemResult>> {
    subproblems
        .iter_mut()
        .map(|sub| sub.solve(candidate))
        .collect()
}

/// `|upper - lower| / |upper|`, infinite while the upper bound is zero or
/// unknown
pub fn relative_gap(upper: f64, lower: f64) -> f64 {
    if upper == 0.0 || !upper.is_finite() {
        f64::INFINITY
    } else {
        (upper - lower).abs() / upper.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_gap() {
        assert_eq!(relative_gap(10.0, 9.0), 0.1);
        assert_eq!(relative_gap(-10.0, -11.0), 0.1);
        assert_eq!(relative_gap(0.0, -1.0), f64::INFINITY);
        assert_eq!(relative_gap(f64::INFINITY, 3.0), f64::INFINITY);
    }

    #[test]
    fn test_termination_display() {
        assert_eq!(Termination::TimeLimit.to_string(), "time limit reached");
        assert_eq!(
            Termination::MasterStatus(Status::Optimal).to_string(),
            "master optimal"
        );
    }
}
