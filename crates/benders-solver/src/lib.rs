//! LP/MIP model representation, the solver capability traits used by the
//! decomposition engine, and an in-process simplex backend.

mod backend;
mod branch;
mod error;
mod model;
mod params;
mod reference;
mod simplex;
mod solution;
mod status;

pub use backend::{Backend, CallbackAction, Incumbent, IncumbentCallback, SolverModel};
pub use branch::BranchAndBound;
pub use error::{SolverError, SolverResult};
pub use model::{Constraint, ConstraintSense, Model, ObjectiveSense, VarType, Variable};
pub use params::SolverParams;
pub use reference::{SimplexBackend, SimplexModel};
pub use simplex::Simplex;
pub use solution::{LpSolution, MipSolution};
pub use status::Status;
