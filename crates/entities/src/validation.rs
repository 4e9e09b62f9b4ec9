//! Schema validation shared by all stores.

use serde::Serialize;
use thiserror::Error;

/// A single rule a document broke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Path of the offending field, e.g. `reviews[2].rating`.
    pub field: String,
    /// Human readable description.
    pub message: String,
}

/// A document failed schema validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity} validation failed: {}", describe(.violations))]
pub struct ValidationError {
    /// Kind of document that was rejected.
    pub entity: &'static str,
    /// Every rule that was broken.
    pub violations: Vec<FieldViolation>,
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collects violations while a document is checked.
#[derive(Debug, Default)]
pub struct Violations {
    items: Vec<FieldViolation>,
}

impl Violations {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.items.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Records a violation unless `value` has non-whitespace content.
    pub fn require_text(&mut self, field: impl Into<String>, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "is required");
        }
    }

    /// Finishes collection.
    pub fn into_result(self, entity: &'static str) -> Result<(), ValidationError> {
        if self.items.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                entity,
                violations: self.items,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_collector_is_ok() {
        assert!(Violations::new().into_result("Location").is_ok());
    }

    #[test]
    fn test_error_lists_every_violation() {
        let mut violations = Violations::new();
        violations.require_text("name", "   ");
        violations.push("rating", "must be between 0 and 5");

        let err = violations.into_result("Location").unwrap_err();
        assert_eq!(err.violations.len(), 2);
        assert_eq!(
            err.to_string(),
            "Location validation failed: name: is required, rating: must be between 0 and 5"
        );
    }
}
