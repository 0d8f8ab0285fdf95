//! Error types for lexicon loading operations
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::parser::error::ParseError;
use crate::validation::error::ValidationErrors;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Everything that can go wrong between a path on disk and a validated document
#[derive(Error, Debug)]
pub enum LoaderError {
    /// File I/O errors
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Directory traversal errors
    #[error("Failed to walk directory '{path}': {source}")]
    WalkError {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// YAML parsing errors
    #[error("Failed to parse YAML file '{path}': {source}")]
    YamlParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// JSON parsing errors
    #[error("Failed to parse JSON file '{path}': {source}")]
    JsonParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Unsupported file format
    #[error("Unsupported file format for '{path}'. Expected .yaml, .yml, or .json")]
    UnsupportedFormat { path: PathBuf },

    /// The file decoded but is not a well-formed lexicon document
    #[error("Invalid lexicon document '{path}': {source}")]
    DocumentError {
        path: PathBuf,
        source: ParseError,
    },

    /// The document parsed but breaks document rules
    #[error("Lexicon document '{path}' failed validation: {source}")]
    ValidationFailed {
        path: PathBuf,
        source: ValidationErrors,
    },

    /// Two files declare the same document id
    #[error("Duplicate lexicon id '{id}' in '{path}' (first loaded from '{first}')")]
    DuplicateId {
        id: String,
        path: PathBuf,
        first: PathBuf,
    },
}

impl LoaderError {
    /// Create an I/O error with path context
    pub fn io_error(path: PathBuf, error: std::io::Error) -> Self {
        Self::IoError {
            path,
            source: error,
        }
    }

    pub fn walk_error(path: PathBuf, error: walkdir::Error) -> Self {
        Self::WalkError {
            path,
            source: error,
        }
    }

    /// Create a YAML parsing error with path context
    pub fn yaml_parse_error(path: PathBuf, error: serde_yaml::Error) -> Self {
        Self::YamlParseError {
            path,
            source: error,
        }
    }

    /// Create a JSON parsing error with path context
    pub fn json_parse_error(path: PathBuf, error: serde_json::Error) -> Self {
        Self::JsonParseError {
            path,
            source: error,
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(path: PathBuf) -> Self {
        Self::UnsupportedFormat { path }
    }

    pub fn document_error(path: PathBuf, error: ParseError) -> Self {
        Self::DocumentError {
            path,
            source: error,
        }
    }

    pub fn validation_failed(path: PathBuf, errors: ValidationErrors) -> Self {
        Self::ValidationFailed {
            path,
            source: errors,
        }
    }

    pub fn duplicate_id(id: impl Into<String>, path: PathBuf, first: PathBuf) -> Self {
        Self::DuplicateId {
            id: id.into(),
            path,
            first,
        }
    }

    /// Get the path associated with this error
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::IoError { path, .. }
            | Self::WalkError { path, .. }
            | Self::YamlParseError { path, .. }
            | Self::JsonParseError { path, .. }
            | Self::UnsupportedFormat { path }
            | Self::DocumentError { path, .. }
            | Self::ValidationFailed { path, .. }
            | Self::DuplicateId { path, .. } => path,
        }
    }

    /// Whether the file itself is fine and only its lexicon content is wrong
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            Self::DocumentError { .. } | Self::ValidationFailed { .. } | Self::DuplicateId { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let path = PathBuf::from("test.json");

        let io_err = LoaderError::io_error(
            path.clone(),
            std::io::Error::new(std::io::ErrorKind::NotFound, "File not found"),
        );
        assert!(matches!(io_err, LoaderError::IoError { .. }));
        assert_eq!(io_err.path(), &path);
        assert!(!io_err.is_content_error());

        let dup = LoaderError::duplicate_id("com.example.foo", path.clone(), PathBuf::from("a.json"));
        assert!(dup.is_content_error());
        assert!(dup.to_string().contains("first loaded from 'a.json'"));
    }

    #[test]
    fn test_yaml_error_message() {
        let err = LoaderError::yaml_parse_error(
            PathBuf::from("test.yaml"),
            serde_yaml::from_str::<serde_yaml::Value>("{").unwrap_err(),
        );
        assert!(err.to_string().starts_with("Failed to parse YAML file 'test.yaml'"));
    }
}
