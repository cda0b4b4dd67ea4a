//! # Error Types
//!
//! Domain-specific error types for orderdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  orderdesk-core errors (this file)                                     │
//! │  ├── CoreError         - General domain errors                         │
//! │  ├── ValidationError   - One field failed one rule                     │
//! │  └── ValidationErrors  - Every failure of one submitted form           │
//! │                                                                         │
//! │  orderdesk-db errors (separate crate)                                  │
//! │  └── DbError           - Database operation failures                   │
//! │                                                                         │
//! │  web errors (in app)                                                   │
//! │  └── WebError          - What the browser sees (status + error page)   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → WebError → Browser      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A listing asked for a page before the first one.
    #[error("Page number must be at least 1, got {0}")]
    InvalidPage(i64),

    /// A listing asked to sort by a field the entity does not have.
    #[error("Cannot sort {entity} by '{field}'")]
    UnknownSortField { entity: String, field: String },

    /// Validation error (wraps every failed field of a form).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must contain a maximum of {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid email, unparsable number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., an email already used by another client).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Name of the field this error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Duplicate { field, .. } => field,
        }
    }
}

/// A single failure as shown next to a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMessage {
    pub field: String,
    pub message: String,
}

/// Every validation failure of one submitted form.
///
/// Forms are checked field by field and all failures are collected, so the
/// redisplayed form can mark every offending input at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the error of a failed check, if any.
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(err) = result {
            self.errors.push(err);
        }
    }

    pub fn push(&mut self, err: ValidationError) {
        self.errors.push(err);
    }

    /// Appends every error of `other`.
    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// Appends the errors of `other` for fields that have none yet, so a
    /// value that failed to parse is not also reported as out of range.
    pub fn extend_unseen(&mut self, other: ValidationErrors) {
        for err in other.errors {
            if !self.has_field(err.field()) {
                self.errors.push(err);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// True when at least one error concerns `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field() == field)
    }

    /// Field/message pairs for templates.
    pub fn messages(&self) -> Vec<FieldMessage> {
        self.errors
            .iter()
            .map(|e| FieldMessage {
                field: e.field().to_string(),
                message: e.to_string(),
            })
            .collect()
    }

    /// `Ok(())` when nothing failed, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(err: ValidationError) -> Self {
        ValidationErrors { errors: vec![err] }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", joined.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "postal_code".to_string(),
            max: 8,
        };
        assert_eq!(
            err.to_string(),
            "postal_code must contain a maximum of 8 characters"
        );
    }

    #[test]
    fn test_collects_every_failure() {
        let mut errors = ValidationErrors::new();
        errors.check(Ok(()));
        errors.check(Err(ValidationError::Required {
            field: "name".to_string(),
        }));
        errors.push(ValidationError::Negative {
            field: "price".to_string(),
        });

        assert_eq!(errors.len(), 2);
        assert!(errors.has_field("name"));
        assert!(errors.has_field("price"));
        assert!(!errors.has_field("email"));
        assert_eq!(errors.to_string(), "name is required; price must not be negative");
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_extend_unseen_skips_reported_fields() {
        let mut errors: ValidationErrors = ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "unexpected character 'x'".to_string(),
        }
        .into();

        let mut rules = ValidationErrors::new();
        rules.push(ValidationError::Negative {
            field: "price".to_string(),
        });
        rules.push(ValidationError::Required {
            field: "name".to_string(),
        });

        errors.extend_unseen(rules);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors.errors()[0], ValidationError::InvalidFormat { .. }));
        assert!(errors.has_field("name"));
    }

    #[test]
    fn test_empty_errors_are_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err: ValidationErrors = ValidationError::Required {
            field: "email".to_string(),
        }
        .into();
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_messages_for_templates() {
        let errors: ValidationErrors = ValidationError::Duplicate {
            field: "email".to_string(),
            value: "ana@example.com".to_string(),
        }
        .into();

        let messages = errors.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].field, "email");
        assert_eq!(messages[0].message, "email 'ana@example.com' already exists");
    }
}
