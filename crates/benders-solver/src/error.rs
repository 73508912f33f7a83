use thiserror::Error;

use crate::status::Status;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Invalid index: {0}")]
    InvalidIndex(String),
    #[error("Invalid model: {0}")]
    InvalidModel(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Attribute {attribute} is not available with status {status}")]
    AttributeUnavailable { attribute: &'static str, status: Status },
    #[error("Incumbent callbacks require a model with at least one integer variable")]
    CallbackRequiresMip,
    #[error("Numerical trouble: {0}")]
    Numerical(String),
}

pub type SolverResult<T> = Result<T, SolverError>;
