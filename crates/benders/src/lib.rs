//! Benders decomposition for mixed-integer linear programs whose
//! constraints split into independent blocks once a set of complicating
//! variables is fixed.
//!
//! A [`ProblemSpec`] names the complicating variables and the blocks. The
//! master keeps the complicating variables plus one theta per block; each
//! block becomes a continuous subproblem that answers a master candidate
//! with an optimality or feasibility cut. [`solve`] runs either the
//! [`IterativeDriver`] or the [`CallbackDriver`] and returns a
//! [`SolveResult`] in the caller's variable order.
//!
//! ```no_run
//! use benders::{Config, ProblemSpec, solve};
//! use benders_solver::{Model, SimplexBackend};
//!
//! # fn load() -> Model { Model::new("m") }
//! let mut spec = ProblemSpec::new(load());
//! spec.set_complicating_vars([0, 1])?;
//! let result = solve(&mut spec, &Config::default(), &SimplexBackend)?;
//! println!("objective {}", result.obj_val());
//! # Ok::<(), benders::BendersError>(())
//! ```

mod api;
pub mod config;
pub mod driver;
pub mod error;
pub mod master;
pub mod result;
pub mod slicing;
pub mod staging;
pub mod subproblem;

pub use api::solve;
pub use config::{Config, Framework, IterativeParams, LpForm, SubproblemReturn};
pub use driver::{CallbackDriver, IterativeDriver, Termination};
pub use error::{BendersError, Result};
pub use master::{MasterLayout, MasterProblem};
pub use result::{CutRhs, MasterResult, SolutionStats, SolveResult, SubproblemResult};
pub use staging::{MasterData, ProblemData, ProblemSpec, SubproblemData};
pub use subproblem::{CutOracle, Formulation, Subproblem, SubproblemOptions};
