//! Error types for lexicon document parsing
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::value::ValueKind;
use thiserror::Error;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Everything that can abort the construction of a [`Document`](crate::Document)
#[derive(Error, Debug)]
pub enum ParseError {
    /// Raw text could not be decoded into a generic value
    #[error("Malformed lexicon input: {source}")]
    MalformedInput {
        #[source]
        source: serde_json::Error,
    },

    /// The `lexicon` envelope field is absent or not `1`
    #[error("Unsupported lexicon version: expected 1, found {found}")]
    UnsupportedVersion { found: String },

    /// A mandatory field is absent
    #[error("Missing required field '{field}' at '{path}'")]
    MissingRequiredField { path: String, field: String },

    /// A field holds the wrong kind of JSON value
    #[error("Invalid type for field '{field}' at '{path}': expected {expected}, found {found}")]
    InvalidFieldType {
        path: String,
        field: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// A field has the right JSON kind but a value outside its vocabulary
    #[error("Invalid value for field '{field}' at '{path}': {reason}")]
    InvalidFieldValue {
        path: String,
        field: String,
        reason: String,
    },

    /// A `type` tag that no registered node kind answers to
    #[error("Unknown type kind '{tag}' at '{path}'")]
    UnknownTypeKind { path: String, tag: String },

    /// Nested schemas went deeper than the configured limit
    #[error("Schema nesting at '{path}' exceeds the maximum depth of {limit}")]
    RecursionLimit { path: String, limit: usize },
}

impl ParseError {
    /// Create a malformed input error from a decoder failure
    pub fn malformed(source: serde_json::Error) -> Self {
        Self::MalformedInput { source }
    }

    /// Create an unsupported version error, rendering whatever was found
    pub fn unsupported_version(found: Option<&serde_json::Value>) -> Self {
        Self::UnsupportedVersion {
            found: found
                .map(|value| value.to_string())
                .unwrap_or_else(|| "nothing".to_string()),
        }
    }

    /// Create a missing field error
    pub fn missing_field(path: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            path: path.into(),
            field: field.into(),
        }
    }

    /// Create a field type mismatch error
    pub fn invalid_type(
        path: impl Into<String>,
        field: impl Into<String>,
        expected: ValueKind,
        found: ValueKind,
    ) -> Self {
        Self::InvalidFieldType {
            path: path.into(),
            field: field.into(),
            expected,
            found,
        }
    }

    /// Create a field value error
    pub fn invalid_value(
        path: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidFieldValue {
            path: path.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown type kind error
    pub fn unknown_kind(path: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::UnknownTypeKind {
            path: path.into(),
            tag: tag.into(),
        }
    }

    /// Location of the failure inside the document, if the error has one
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::MissingRequiredField { path, .. }
            | Self::InvalidFieldType { path, .. }
            | Self::InvalidFieldValue { path, .. }
            | Self::UnknownTypeKind { path, .. }
            | Self::RecursionLimit { path, .. } => Some(path),
            Self::MalformedInput { .. } | Self::UnsupportedVersion { .. } => None,
        }
    }

    /// Short stable name of the error kind, used in machine-readable output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedInput { .. } => "MalformedInput",
            Self::UnsupportedVersion { .. } => "UnsupportedVersion",
            Self::MissingRequiredField { .. } => "MissingRequiredField",
            Self::InvalidFieldType { .. } => "InvalidFieldType",
            Self::InvalidFieldValue { .. } => "InvalidFieldValue",
            Self::UnknownTypeKind { .. } => "UnknownTypeKind",
            Self::RecursionLimit { .. } => "RecursionLimit",
        }
    }
}
