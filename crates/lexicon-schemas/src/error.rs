//! Crate-level error type
//!
//! Each layer has its own error enum; [`Error`] joins them for callers that run
//! several layers in one go.
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::loader::LoaderError;
use crate::parser::ParseError;
use crate::validation::{ValidationError, ValidationErrors};
use thiserror::Error;

/// Result type alias for crate-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for lexicon operations
#[derive(Error, Debug)]
pub enum Error {
    /// The document could not be turned into the typed model
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The document breaks a single rule
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The document breaks one or more rules
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Reading documents from disk failed
    #[error(transparent)]
    Loader(#[from] LoaderError),
}

impl Error {
    /// Short machine-readable category
    pub fn category(&self) -> &'static str {
        match self {
            Error::Parse(_) => "parse",
            Error::Invalid(_) | Error::Validation(_) => "validation",
            Error::Loader(_) => "loader",
        }
    }

    /// Every validation error carried, if any
    pub fn validation_errors(&self) -> Vec<&ValidationError> {
        match self {
            Error::Invalid(error) => vec![error],
            Error::Validation(errors) => errors.iter().collect(),
            Error::Loader(LoaderError::ValidationFailed { source, .. }) => source.iter().collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, parse_and_validate, ValidationConfig};
    use serde_json::json;

    #[test]
    fn test_conversions() {
        let err: Error = parse("{").unwrap_err().into();
        assert_eq!(err.category(), "parse");
        assert!(err.validation_errors().is_empty());
    }

    #[test]
    fn test_parse_and_validate_reports_rule() {
        let err = parse_and_validate(
            json!({"lexicon": 1, "id": "com.example.foo", "defs": {"main": {"type": "object"}}}),
            &ValidationConfig::default(),
        )
        .unwrap_err();

        assert_eq!(err.category(), "validation");
        let errors = err.validation_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule(), "main-kind");
    }
}
