//! Input validation for roster requests.
//!
//! Checks employee records before encoding. Detects:
//! - Empty or duplicate names
//! - Use of the reserved slack name
//! - Negative shift counts and `min > max`
//!
//! Day indices past the horizon are not errors; the model builder drops them.

use std::collections::HashSet;
use std::fmt;

use crate::models::{RosterRequest, UNFILLED};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A record has a blank name.
    EmptyName,
    /// Two records share a name.
    DuplicateName,
    /// A record uses the name reserved for unfilled slots.
    ReservedName,
    /// A shift count is below zero.
    NegativeValue,
    /// `min` exceeds `max`.
    InvalidRange,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates the employee records of a request.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_request(request: &RosterRequest) -> ValidationResult {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for (i, record) in request.employees.iter().enumerate() {
        let name = record.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyName,
                format!("Employee #{i} has an empty name"),
            ));
        } else if name == UNFILLED {
            errors.push(ValidationError::new(
                ValidationErrorKind::ReservedName,
                format!("Employee #{i} uses the reserved name '{UNFILLED}'"),
            ));
        } else if !names.insert(name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate employee name: {name}"),
            ));
        }

        if record.min < 0 || record.max < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeValue,
                format!("Employee '{}' has a negative shift count", record.name),
            ));
        }
        if record.min > record.max {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRange,
                format!(
                    "Employee '{}' has min {} greater than max {}",
                    record.name, record.min, record.max
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmployeeRecord;

    fn request(records: Vec<EmployeeRecord>) -> RosterRequest {
        RosterRequest::new(records, 7)
    }

    #[test]
    fn test_valid_request() {
        let req = request(vec![
            EmployeeRecord::new("Ana", 0, 10).with_preferred(vec![40]),
            EmployeeRecord::new("Ben", 3, 3),
        ]);
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn test_empty_request_is_valid() {
        assert!(validate_request(&RosterRequest::default()).is_ok());
    }

    #[test]
    fn test_duplicate_and_empty_names() {
        let req = request(vec![
            EmployeeRecord::new("Ana", 0, 10),
            EmployeeRecord::new("Ana", 0, 10),
            EmployeeRecord::new("  ", 0, 10),
        ]);
        let errors = validate_request(&req).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateName);
        assert_eq!(errors[1].kind, ValidationErrorKind::EmptyName);
    }

    #[test]
    fn test_reserved_name() {
        let errors =
            validate_request(&request(vec![EmployeeRecord::new("Unfilled", 0, 1)])).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::ReservedName);
    }

    #[test]
    fn test_collects_every_range_problem() {
        let req = request(vec![EmployeeRecord::new("Ana", -1, -3)]);
        let errors = validate_request(&req).unwrap_err();
        let kinds: Vec<_> = errors.iter().map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![ValidationErrorKind::NegativeValue, ValidationErrorKind::InvalidRange]
        );
        assert_eq!(errors[1].to_string(), "Employee 'Ana' has min -1 greater than max -3");
    }
}
