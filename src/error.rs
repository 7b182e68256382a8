//! Crate error type.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors surfaced before a run starts.
///
/// Once the catalog is built and the configuration accepted, a run never
/// fails: missing faculty or rooms show up as fitness penalties instead.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The input snapshot failed integrity checks.
    #[error("invalid scheduling input ({} problem(s)): {}", .0.len(), join_messages(.0))]
    InvalidInput(Vec<ValidationError>),
    /// The GA configuration is out of range.
    #[error("invalid GA configuration: {0}")]
    InvalidConfig(String),
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, SchedulerError>;

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ValidationError>> for SchedulerError {
    fn from(errors: Vec<ValidationError>) -> Self {
        SchedulerError::InvalidInput(errors)
    }
}
