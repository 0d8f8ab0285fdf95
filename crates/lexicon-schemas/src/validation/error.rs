//! Validation error types for lexicon documents
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::nsid::NsidError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A structural problem found in a parsed document
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ValidationError {
    /// The document id is not a valid NSID
    #[error("Invalid identifier '{id}': {reason}")]
    InvalidIdentifier {
        id: String,
        #[source]
        reason: NsidError,
    },

    /// A document rule does not hold
    #[error("Validation error at '{path}': {message}")]
    RuleViolation {
        /// JSON path of the offending definition or field
        path: String,
        /// Stable rule name, e.g. `main-kind`
        rule: String,
        message: String,
    },
}

impl ValidationError {
    pub fn invalid_identifier(id: impl Into<String>, reason: NsidError) -> Self {
        Self::InvalidIdentifier {
            id: id.into(),
            reason,
        }
    }

    pub fn violation<P, R, M>(path: P, rule: R, message: M) -> Self
    where
        P: Into<String>,
        R: Into<String>,
        M: Into<String>,
    {
        Self::RuleViolation {
            path: path.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Location of the problem; the document id sits at `$.id`
    pub fn path(&self) -> &str {
        match self {
            Self::InvalidIdentifier { .. } => "$.id",
            Self::RuleViolation { path, .. } => path,
        }
    }

    /// Name of the rule that failed
    pub fn rule(&self) -> &str {
        match self {
            Self::InvalidIdentifier { .. } => "identifier",
            Self::RuleViolation { rule, .. } => rule,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::InvalidIdentifier { reason, .. } => reason.to_string(),
            Self::RuleViolation { message, .. } => message.clone(),
        }
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Several validation errors, in the order they were found
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multiple validation errors occurred:")?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn first(&self) -> Option<&ValidationError> {
        self.errors.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// `Ok` when nothing was collected
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Default for ValidationErrors {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_violation_display() {
        let error = ValidationError::violation(
            "$.defs.main",
            "main-kind",
            "main must be record/procedure/query/subscription",
        );
        assert_eq!(
            error.to_string(),
            "Validation error at '$.defs.main': main must be record/procedure/query/subscription"
        );
        assert_eq!(error.rule(), "main-kind");
    }

    #[test]
    fn test_invalid_identifier_accessors() {
        let error = ValidationError::invalid_identifier("foo", NsidError::TooFewSegments { count: 1 });
        assert_eq!(error.path(), "$.id");
        assert_eq!(error.rule(), "identifier");
        assert!(error.to_string().starts_with("Invalid identifier 'foo'"));
    }

    #[test]
    fn test_errors_collection() {
        let mut errors = ValidationErrors::new();
        assert!(errors.clone().into_result().is_ok());
        errors.add(ValidationError::violation("$", "a", "first"));
        errors.add(ValidationError::violation("$", "b", "second"));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.first().map(ValidationError::rule), Some("a"));
        assert!(errors.to_string().contains("2. Validation error at '$': second"));
    }

    #[test]
    fn test_serialized_shape() {
        let error = ValidationError::violation("$.defs.a", "bounds", "min > max");
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value["kind"], "rule-violation");
        assert_eq!(value["rule"], "bounds");
    }
}
