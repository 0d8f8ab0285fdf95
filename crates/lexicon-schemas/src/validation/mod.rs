//! Validation of parsed lexicon documents
//!
//! Parsing guarantees that a document is well typed; validation checks the rules that
//! span fields and definitions. Three modes are available:
//!
//! - **Basic**: the document id is an NSID and `main`, if present, is a primary kind
//! - **Partial**: Basic plus the structure of each definition (declared properties,
//!   consistent bounds, parameter and body shapes, union refs, unique error names)
//! - **Strict**: Partial plus placement of primary kinds and reference targets
//!
//! Basic is the default. Validation stops at the first violation unless `fail_fast`
//! is turned off.
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

pub mod base;
pub mod error;
pub mod rules;

pub use base::{SchemaValidator, ValidationContext, ValidationHelpers, ValidationMode};
pub use error::{ValidationError, ValidationErrors, ValidationResult};
pub use rules::{validate, DocumentValidator, MAIN_KIND_MESSAGE};

use crate::document::Document;
use serde::{Deserialize, Serialize};

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Validation mode to use
    pub mode: ValidationMode,
    /// Whether to stop on the first error or collect all errors
    pub fail_fast: bool,
    /// Maximum number of errors to collect (0 = unlimited)
    pub max_errors: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::Basic,
            fail_fast: true,
            max_errors: 0,
        }
    }
}

impl ValidationConfig {
    pub fn strict() -> Self {
        Self {
            mode: ValidationMode::Strict,
            ..Self::default()
        }
    }

    pub fn partial() -> Self {
        Self {
            mode: ValidationMode::Partial,
            ..Self::default()
        }
    }

    pub fn basic() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Stop at the first error
    pub fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Keep going after the first error
    pub fn with_collect_all(mut self) -> Self {
        self.fail_fast = false;
        self
    }

    /// Set maximum number of errors to collect
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }
}

/// Validate several documents, honoring `fail_fast` and `max_errors` across the batch
pub fn validate_documents_batch(
    documents: &[Document],
    config: &ValidationConfig,
) -> Result<(), ValidationErrors> {
    let validator = DocumentValidator::new(config.clone());
    let mut errors = ValidationErrors::new();

    for document in documents {
        if let Err(found) = validator.validate_all(document) {
            errors.extend(found);

            if config.fail_fast {
                break;
            }

            if config.max_errors > 0 && errors.len() >= config.max_errors {
                errors.errors.truncate(config.max_errors);
                break;
            }
        }
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use serde_json::json;

    #[test]
    fn test_validation_config_defaults() {
        let config = ValidationConfig::default();
        assert_eq!(config.mode, ValidationMode::Basic);
        assert!(config.fail_fast);
        assert_eq!(config.max_errors, 0);
    }

    #[test]
    fn test_validation_config_builders() {
        let strict = ValidationConfig::strict().with_collect_all().with_max_errors(5);
        assert_eq!(strict.mode, ValidationMode::Strict);
        assert!(!strict.fail_fast);
        assert_eq!(strict.max_errors, 5);

        assert_eq!(ValidationConfig::partial().mode, ValidationMode::Partial);
        assert_eq!(ValidationConfig::basic().mode, ValidationMode::Basic);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ValidationConfig = serde_json::from_value(json!({"mode": "partial"})).unwrap();
        assert_eq!(config.mode, ValidationMode::Partial);
        assert!(config.fail_fast);
    }

    #[test]
    fn test_batch_validation() {
        let documents = vec![
            parse(json!({
                "lexicon": 1,
                "id": "com.example.ok",
                "defs": {"main": {"type": "query"}}
            }))
            .unwrap(),
            parse(json!({
                "lexicon": 1,
                "id": "com.example.bad",
                "defs": {"main": {"type": "string"}}
            }))
            .unwrap(),
            parse(json!({
                "lexicon": 1,
                "id": "bad",
                "defs": {}
            }))
            .unwrap(),
        ];

        let errors = validate_documents_batch(&documents, &ValidationConfig::strict()).unwrap_err();
        assert_eq!(errors.len(), 1);

        let errors =
            validate_documents_batch(&documents, &ValidationConfig::strict().with_collect_all())
                .unwrap_err();
        assert_eq!(errors.len(), 2);

        assert!(validate_documents_batch(&documents[..1], &ValidationConfig::strict()).is_ok());
    }
}
