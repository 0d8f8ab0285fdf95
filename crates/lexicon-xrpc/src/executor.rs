//! The seam between the dispatcher and method implementations
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::request::Payload;
use serde_json::{Map, Value};
use thiserror::Error;

/// A request that passed every check, as handed to an executor
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub nsid: String,
    /// Parameters coerced to their declared types
    pub params: Map<String, Value>,
    pub input: Option<Payload>,
}

impl Call {
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn input_json(&self) -> Option<&Value> {
        self.input.as_ref().and_then(Payload::as_json)
    }
}

/// Why an executor did not produce output
#[derive(Error, Debug)]
pub enum HandlerError {
    /// One of the errors the method declares
    #[error("{name}{}", .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Declared {
        name: String,
        message: Option<String>,
    },

    /// Anything else; never shown to the caller
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HandlerError {
    pub fn declared(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Declared {
            name: name.into(),
            message: Some(message.into()),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Declared {
            name: name.into(),
            message: None,
        }
    }
}

/// Output body, if the method has one
pub type HandlerOutput = Option<Payload>;

pub type HandlerResult = Result<HandlerOutput, HandlerError>;

/// Runs a validated call
pub trait Executor: Send + Sync {
    fn execute(&self, call: Call) -> HandlerResult;
}

impl<F> Executor for F
where
    F: Fn(Call) -> HandlerResult + Send + Sync,
{
    fn execute(&self, call: Call) -> HandlerResult {
        self(call)
    }
}
