//! Incoming XRPC requests
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// HTTP verbs used by XRPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            other => Err(format!("unsupported HTTP method '{}'", other)),
        }
    }
}

/// Body content, decoded JSON or raw bytes
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadBody {
    Json(Value),
    Bytes(Vec<u8>),
}

/// A request or response body with its content type
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub encoding: String,
    pub body: PayloadBody,
}

impl Payload {
    /// An `application/json` payload
    pub fn json(value: Value) -> Self {
        Self {
            encoding: "application/json".to_string(),
            body: PayloadBody::Json(value),
        }
    }

    pub fn bytes(encoding: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            encoding: encoding.into(),
            body: PayloadBody::Bytes(bytes),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match &self.body {
            PayloadBody::Json(value) => Some(value),
            PayloadBody::Bytes(_) => None,
        }
    }

    /// Whether the content type names JSON
    pub fn is_json_encoding(&self) -> bool {
        is_json_encoding(&self.encoding)
    }

    /// The body as JSON, decoding raw bytes when the content type is JSON
    pub fn json_value(&self) -> Result<Option<Value>, serde_json::Error> {
        match &self.body {
            PayloadBody::Json(value) => Ok(Some(value.clone())),
            PayloadBody::Bytes(bytes) if self.is_json_encoding() => serde_json::from_slice(bytes).map(Some),
            PayloadBody::Bytes(_) => Ok(None),
        }
    }
}

pub(crate) fn is_json_encoding(encoding: &str) -> bool {
    encoding
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}

/// A call to an XRPC method
#[derive(Debug, Clone, PartialEq)]
pub struct XrpcRequest {
    pub method: HttpMethod,
    /// Method NSID, the path segment after `/xrpc/`
    pub nsid: String,
    /// Query string pairs in order; a repeated name carries an array
    pub params: Vec<(String, String)>,
    pub input: Option<Payload>,
}

impl XrpcRequest {
    pub fn new(method: HttpMethod, nsid: impl Into<String>) -> Self {
        Self {
            method,
            nsid: nsid.into(),
            params: Vec::new(),
            input: None,
        }
    }

    /// A GET request
    pub fn query(nsid: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, nsid)
    }

    /// A POST request
    pub fn procedure(nsid: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, nsid)
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn with_input(mut self, payload: Payload) -> Self {
        self.input = Some(payload);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_method_parsing() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("POST".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert!("PUT".parse::<HttpMethod>().is_err());
        assert_eq!(HttpMethod::Post.to_string(), "POST");
    }

    #[test]
    fn test_json_value_decodes_json_bytes() {
        let payload = Payload::bytes("application/json; charset=utf-8", br#"{"a": 1}"#.to_vec());
        assert_eq!(payload.json_value().unwrap(), Some(json!({"a": 1})));

        let image = Payload::bytes("image/png", vec![0x89, 0x50]);
        assert_eq!(image.json_value().unwrap(), None);

        let broken = Payload::bytes("application/json", b"{".to_vec());
        assert!(broken.json_value().is_err());
    }

    #[test]
    fn test_request_builder() {
        let request = XrpcRequest::query("com.example.ping")
            .with_param("tag", "a")
            .with_param("tag", "b");
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.params.len(), 2);
        assert!(request.input.is_none());
    }
}
