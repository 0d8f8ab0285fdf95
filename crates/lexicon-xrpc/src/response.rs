//! Outgoing XRPC responses
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::request::{Payload, PayloadBody};
use serde_json::json;

/// Status and optional body returned to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct XrpcResponse {
    pub status: u16,
    pub payload: Option<Payload>,
}

impl XrpcResponse {
    /// 200 with a body
    pub fn ok(payload: Payload) -> Self {
        Self {
            status: 200,
            payload: Some(payload),
        }
    }

    /// 200 without a body
    pub fn empty() -> Self {
        Self {
            status: 200,
            payload: None,
        }
    }

    /// An error response with the XRPC `{"error", "message"}` body
    pub fn error(status: u16, name: &str, message: Option<&str>) -> Self {
        let body = match message {
            Some(message) => json!({"error": name, "message": message}),
            None => json!({"error": name}),
        };
        Self {
            status,
            payload: Some(Payload::json(body)),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `error` field of an error body
    pub fn error_name(&self) -> Option<&str> {
        match self.payload.as_ref().map(|p| &p.body) {
            Some(PayloadBody::Json(body)) if !self.is_success() => body.get("error")?.as_str(),
            _ => None,
        }
    }

    /// `message` field of an error body
    pub fn error_message(&self) -> Option<&str> {
        match self.payload.as_ref().map(|p| &p.body) {
            Some(PayloadBody::Json(body)) if !self.is_success() => body.get("message")?.as_str(),
            _ => None,
        }
    }
}
