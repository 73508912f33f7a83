use benders_solver::{SolverError, Status};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BendersError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Subproblem variable {index} ({name}) is not continuous")]
    NonContinuousSubproblem { index: usize, name: String },
    #[error("Subproblems {first} and {second} have overlapping constraints")]
    OverlappingSubproblems { first: usize, second: usize },
    #[error("Invalid partition: {0}")]
    InvalidPartition(String),
    #[error("Variable {var} of subproblem {subproblem} has an infinite lower bound")]
    InfiniteLowerBound { subproblem: usize, var: usize },
    #[error("Problem specification is finalized")]
    Finalized,
    #[error("Master problem ended with status {0}")]
    MasterFailed(Status),
    #[error("Subproblem {subproblem} is unbounded")]
    UnboundedSubproblem { subproblem: usize },
    #[error("Subproblem {subproblem} ended with status {status}")]
    SubproblemFailed { subproblem: usize, status: Status },
    #[error("Subproblem {subproblem} returned an unusable infeasibility certificate")]
    InvalidCertificate { subproblem: usize },
    #[error("Result file {0} must have extension .sol or .mst")]
    UnsupportedResultFormat(String),
    #[error("Result has not been resolved against a problem specification")]
    Unresolved,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Solver(#[from] SolverError),
}

pub type Result<T> = std::result::Result<T, BendersError>;
