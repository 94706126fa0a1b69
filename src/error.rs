//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::cp::OracleError;
use crate::validation::ValidationError;

/// Errors raised before or around a solve.
///
/// An infeasible or timed-out solve is not an error; it yields an empty
/// roster with the corresponding status.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("invalid request: {}", summarize(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("solver oracle failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("malformed request body: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<Vec<ValidationError>> for RosterError {
    fn from(errors: Vec<ValidationError>) -> Self {
        RosterError::Validation(errors)
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for roster operations.
pub type Result<T> = std::result::Result<T, RosterError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmployeeRecord, RosterRequest};
    use crate::validation::validate_request;

    #[test]
    fn test_validation_message_lists_problems() {
        let request = RosterRequest::new(
            vec![EmployeeRecord::new("", 0, 1), EmployeeRecord::new("Ana", 4, 2)],
            7,
        );
        let err = RosterError::from(validate_request(&request).unwrap_err());
        assert_eq!(
            err.to_string(),
            "invalid request: Employee #0 has an empty name; \
             Employee 'Ana' has min 4 greater than max 2"
        );
    }

    #[test]
    fn test_json_error_converts() {
        fn parse() -> Result<RosterRequest> {
            Ok(RosterRequest::from_json_str("not json", 7)?)
        }
        assert!(matches!(parse(), Err(RosterError::Json(_))));
    }
}
