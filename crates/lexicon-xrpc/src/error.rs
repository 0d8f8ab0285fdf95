//! Errors raised at the dispatch boundary
//!
//! Every error maps to an HTTP status and an XRPC error name, so it can be
//! turned into a response without further context.
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::request::HttpMethod;
use crate::response::XrpcResponse;
use lexicon_schemas::NodeKind;
use thiserror::Error;

/// Result type for dispatch operations
pub type XrpcResult<T> = Result<T, XrpcError>;

#[derive(Error, Debug)]
pub enum XrpcError {
    /// No executor is bound for the requested NSID
    #[error("Method not implemented: {nsid}")]
    MethodNotImplemented { nsid: String },

    /// The HTTP verb does not match the method kind
    #[error("Method {nsid} does not accept {method} requests")]
    MethodNotAllowed { nsid: String, method: HttpMethod },

    /// Parameters or input do not satisfy the method schema
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The executor failed or produced output that breaks the method schema
    #[error("Internal server error: {message}")]
    InternalServerError { message: String },

    /// The document has no `main` query or procedure
    #[error("Lexicon '{nsid}' does not define a method (main is {})", describe_kind(.found))]
    NotAMethod {
        nsid: String,
        found: Option<NodeKind>,
    },

    /// The method kind exists but is served elsewhere
    #[error("Lexicon '{nsid}' defines a {kind}, which cannot be dispatched here")]
    Unsupported { nsid: String, kind: NodeKind },

    /// A catalog lookup found no document
    #[error("No lexicon document for '{nsid}'")]
    UnknownLexicon { nsid: String },

    /// The method document failed to parse or validate
    #[error(transparent)]
    Document(#[from] lexicon_schemas::Error),
}

fn describe_kind(kind: &Option<NodeKind>) -> String {
    match kind {
        Some(kind) => kind.to_string(),
        None => "absent".to_string(),
    }
}

impl XrpcError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalServerError {
            message: message.into(),
        }
    }

    /// HTTP status code for this error
    pub fn status(&self) -> u16 {
        match self {
            XrpcError::MethodNotImplemented { .. } => 501,
            XrpcError::MethodNotAllowed { .. } => 405,
            XrpcError::InvalidRequest { .. } => 400,
            XrpcError::InternalServerError { .. }
            | XrpcError::NotAMethod { .. }
            | XrpcError::Unsupported { .. }
            | XrpcError::UnknownLexicon { .. }
            | XrpcError::Document(_) => 500,
        }
    }

    /// XRPC error name sent in the response body
    pub fn error_name(&self) -> &'static str {
        match self {
            XrpcError::MethodNotImplemented { .. } => "MethodNotImplemented",
            XrpcError::MethodNotAllowed { .. } => "MethodNotAllowed",
            XrpcError::InvalidRequest { .. } => "InvalidRequest",
            _ => "InternalServerError",
        }
    }

    /// Whether the caller is at fault
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }

    /// Error response for this failure; server-side details stay out of the body
    pub fn to_response(&self) -> XrpcResponse {
        let message = match self {
            XrpcError::InvalidRequest { message } => message.clone(),
            XrpcError::MethodNotImplemented { .. } | XrpcError::MethodNotAllowed { .. } => {
                self.to_string()
            }
            _ => "Internal Server Error".to_string(),
        };
        XrpcResponse::error(self.status(), self.error_name(), Some(&message))
    }
}
