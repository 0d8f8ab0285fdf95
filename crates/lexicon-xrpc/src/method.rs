//! A Lexicon method bound to its document
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::data::DataValidator;
use crate::error::{XrpcError, XrpcResult};
use crate::executor::{Call, HandlerError, HandlerResult};
use crate::request::{HttpMethod, Payload, XrpcRequest};
use crate::response::XrpcResponse;
use lexicon_schemas::nodes::{Body, ErrorDef, ParamsNode};
use lexicon_schemas::{
    parse, Document, DocumentValidator, FieldSchema, LexiconInput, NodeKind, SchemaNode,
    ValidationConfig,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Methods served over request/response HTTP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Query,
    Procedure,
}

impl MethodKind {
    /// The HTTP verb this kind answers to
    pub fn http_method(&self) -> HttpMethod {
        match self {
            MethodKind::Query => HttpMethod::Get,
            MethodKind::Procedure => HttpMethod::Post,
        }
    }
}

/// The `main` query or procedure of a validated document
#[derive(Debug, Clone)]
pub struct XrpcMethod {
    document: Arc<Document>,
    kind: MethodKind,
}

impl XrpcMethod {
    /// Parse and validate `input`, then take its `main` method
    pub fn from_document(input: impl Into<LexiconInput>) -> XrpcResult<Self> {
        let document = parse(input).map_err(lexicon_schemas::Error::from)?;
        Self::from_parsed(Arc::new(document), &ValidationConfig::default())
    }

    /// Validate an already parsed document and take its `main` method
    pub fn from_parsed(document: Arc<Document>, validation: &ValidationConfig) -> XrpcResult<Self> {
        DocumentValidator::new(validation.clone())
            .validate_all(&document)
            .map_err(lexicon_schemas::Error::from)?;

        let kind = match document.main_kind() {
            Some(NodeKind::Query) => MethodKind::Query,
            Some(NodeKind::Procedure) => MethodKind::Procedure,
            Some(NodeKind::Subscription) => {
                return Err(XrpcError::Unsupported {
                    nsid: document.id().to_string(),
                    kind: NodeKind::Subscription,
                })
            }
            found => {
                return Err(XrpcError::NotAMethod {
                    nsid: document.id().to_string(),
                    found,
                })
            }
        };

        Ok(Self { document, kind })
    }

    pub fn nsid(&self) -> &str {
        self.document.id()
    }

    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    pub fn parameters(&self) -> Option<&ParamsNode> {
        match self.document.main() {
            Some(SchemaNode::Query(query)) => query.parameters.as_ref(),
            Some(SchemaNode::Procedure(procedure)) => procedure.parameters.as_ref(),
            _ => None,
        }
    }

    pub fn input(&self) -> Option<&Body> {
        match self.document.main() {
            Some(SchemaNode::Procedure(procedure)) => procedure.input.as_ref(),
            _ => None,
        }
    }

    pub fn output(&self) -> Option<&Body> {
        match self.document.main() {
            Some(SchemaNode::Query(query)) => query.output.as_ref(),
            Some(SchemaNode::Procedure(procedure)) => procedure.output.as_ref(),
            _ => None,
        }
    }

    pub fn errors(&self) -> &[ErrorDef] {
        match self.document.main() {
            Some(SchemaNode::Query(query)) => &query.errors,
            Some(SchemaNode::Procedure(procedure)) => &procedure.errors,
            _ => &[],
        }
    }

    /// Check verb, parameters and input, producing the call an executor receives
    pub fn validate_request(&self, request: XrpcRequest, data: &DataValidator<'_>) -> XrpcResult<Call> {
        if request.method != self.kind.http_method() {
            return Err(XrpcError::MethodNotAllowed {
                nsid: request.nsid,
                method: request.method,
            });
        }

        let params = self.coerce_params(&request.params)?;
        if let Some(schema) = self.parameters() {
            self.validate_params(schema, &params, data)?;
        }

        let input = self.validate_input(request.input, data)?;
        Ok(Call {
            nsid: request.nsid,
            params,
            input,
        })
    }

    /// Turn query-string pairs into typed values following the `parameters` schema
    pub fn coerce_params(&self, raw: &[(String, String)]) -> XrpcResult<Map<String, Value>> {
        let mut params = Map::new();
        let Some(schema) = self.parameters() else {
            return Ok(params);
        };

        for (name, property) in &schema.properties {
            let values: Vec<&str> = raw
                .iter()
                .filter(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
                .collect();
            if values.is_empty() {
                continue;
            }

            let value = match property {
                FieldSchema::Node(SchemaNode::Array(array)) => Value::Array(
                    values
                        .iter()
                        .map(|value| coerce_scalar(name, &array.items, value))
                        .collect::<XrpcResult<_>>()?,
                ),
                scalar => match values.as_slice() {
                    [value] => coerce_scalar(name, scalar, value)?,
                    _ => {
                        return Err(XrpcError::invalid_request(format!(
                            "Parameter '{}' was given more than once",
                            name
                        )))
                    }
                },
            };
            params.insert(name.clone(), value);
        }

        for (name, _) in raw {
            if !schema.properties.contains_key(name) {
                debug!(nsid = self.nsid(), param = %name, "ignoring undeclared parameter");
            }
        }
        Ok(params)
    }

    fn validate_params(
        &self,
        schema: &ParamsNode,
        params: &Map<String, Value>,
        data: &DataValidator<'_>,
    ) -> XrpcResult<()> {
        for name in &schema.required {
            if !params.contains_key(name) {
                return Err(XrpcError::invalid_request(format!(
                    "Params must have the property \"{}\"",
                    name
                )));
            }
        }

        for (name, value) in params {
            if let Some(property) = schema.properties.get(name) {
                data.validate_field(&self.document, property, value, &format!("params.{}", name))
                    .map_err(|e| XrpcError::invalid_request(e.to_string()))?;
            }
        }
        Ok(())
    }

    fn validate_input(&self, input: Option<Payload>, data: &DataValidator<'_>) -> XrpcResult<Option<Payload>> {
        let Some(body) = self.input() else {
            if input.is_some() {
                return Err(XrpcError::invalid_request(
                    "A request body was provided when none was expected",
                ));
            }
            return Ok(None);
        };

        let Some(payload) = input else {
            return Err(XrpcError::invalid_request(
                "A request body is expected but none was provided",
            ));
        };
        if !body.accepts(&payload.encoding) {
            return Err(XrpcError::invalid_request(format!(
                "Wrong request encoding (Content-Type): {}",
                payload.encoding
            )));
        }

        if let Some(schema) = body.schema.as_deref() {
            let value = payload
                .json_value()
                .map_err(|e| XrpcError::invalid_request(format!("Request body is not valid JSON: {}", e)))?
                .ok_or_else(|| XrpcError::invalid_request("Request body must be JSON"))?;
            data.validate_field(&self.document, schema, &value, "input")
                .map_err(|e| XrpcError::invalid_request(e.to_string()))?;
        }
        Ok(Some(payload))
    }

    /// Turn an executor outcome into a response, checking it against `output` and `errors`
    pub fn shape_response(&self, outcome: HandlerResult, data: &DataValidator<'_>) -> XrpcResponse {
        match outcome {
            Ok(output) => match self.validate_output(output, data) {
                Ok(Some(payload)) => XrpcResponse::ok(payload),
                Ok(None) => XrpcResponse::empty(),
                Err(error) => {
                    error!(nsid = self.nsid(), %error, "handler output rejected");
                    error.to_response()
                }
            },
            Err(HandlerError::Declared { name, message }) => {
                if self.errors().iter().any(|declared| declared.name == name) {
                    XrpcResponse::error(400, &name, message.as_deref())
                } else {
                    warn!(nsid = self.nsid(), error = %name, "handler returned an undeclared error");
                    XrpcError::internal(format!("undeclared error '{}'", name)).to_response()
                }
            }
            Err(HandlerError::Internal(cause)) => {
                error!(nsid = self.nsid(), error = %cause, "handler failed");
                XrpcError::internal(cause.to_string()).to_response()
            }
        }
    }

    fn validate_output(&self, output: Option<Payload>, data: &DataValidator<'_>) -> XrpcResult<Option<Payload>> {
        let Some(body) = self.output() else {
            return match output {
                Some(_) => Err(XrpcError::internal("A response body was returned when none was expected")),
                None => Ok(None),
            };
        };

        let Some(payload) = output else {
            return Err(XrpcError::internal("A response body is expected but none was returned"));
        };
        if !body.accepts(&payload.encoding) {
            return Err(XrpcError::internal(format!(
                "Invalid response encoding: {}",
                payload.encoding
            )));
        }

        if let Some(schema) = body.schema.as_deref() {
            let value = payload
                .json_value()
                .map_err(|e| XrpcError::internal(format!("Response body is not valid JSON: {}", e)))?
                .ok_or_else(|| XrpcError::internal("Response body must be JSON"))?;
            data.validate_field(&self.document, schema, &value, "output")
                .map_err(|e| XrpcError::internal(format!("Invalid response: {}", e)))?;
        }
        Ok(Some(payload))
    }
}

/// Coerce one query-string value by its declared kind
fn coerce_scalar(name: &str, schema: &FieldSchema, raw: &str) -> XrpcResult<Value> {
    match schema.as_node().map(SchemaNode::kind) {
        Some(NodeKind::Boolean) => match raw {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(XrpcError::invalid_request(format!(
                "Parameter '{}' must be a boolean",
                name
            ))),
        },
        Some(NodeKind::Integer) => raw.parse::<i64>().map(Value::from).map_err(|_| {
            XrpcError::invalid_request(format!("Parameter '{}' must be an integer", name))
        }),
        _ => Ok(Value::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search() -> XrpcMethod {
        XrpcMethod::from_document(json!({
            "lexicon": 1,
            "id": "com.example.search",
            "defs": {
                "main": {
                    "type": "query",
                    "parameters": {
                        "type": "params",
                        "required": ["q"],
                        "properties": {
                            "q": {"type": "string", "maxLength": 20},
                            "limit": {"type": "integer", "minimum": 1, "maximum": 100},
                            "safe": {"type": "boolean"},
                            "tags": {"type": "array", "items": {"type": "string"}}
                        }
                    },
                    "output": {"encoding": "application/json"}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_method_kinds() {
        let method = search();
        assert_eq!(method.kind(), MethodKind::Query);
        assert_eq!(method.kind().http_method(), HttpMethod::Get);
        assert_eq!(method.nsid(), "com.example.search");
    }

    #[test]
    fn test_non_methods_are_rejected() {
        let err = XrpcMethod::from_document(json!({
            "lexicon": 1,
            "id": "com.example.defs",
            "defs": {"thing": {"type": "string"}}
        }))
        .unwrap_err();
        assert!(matches!(err, XrpcError::NotAMethod { found: None, .. }));

        let err = XrpcMethod::from_document(json!({
            "lexicon": 1,
            "id": "com.example.subscribe",
            "defs": {"main": {"type": "subscription"}}
        }))
        .unwrap_err();
        assert!(matches!(err, XrpcError::Unsupported { kind: NodeKind::Subscription, .. }));

        let err = XrpcMethod::from_document(json!({
            "lexicon": 1,
            "id": "com.example.bad",
            "defs": {"main": {"type": "object"}}
        }))
        .unwrap_err();
        assert!(matches!(err, XrpcError::Document(_)));
    }

    #[test]
    fn test_param_coercion() {
        let params = search()
            .coerce_params(&[
                ("q".into(), "rust".into()),
                ("limit".into(), "25".into()),
                ("safe".into(), "false".into()),
                ("tags".into(), "a".into()),
                ("tags".into(), "b".into()),
                ("extra".into(), "ignored".into()),
            ])
            .unwrap();

        assert_eq!(
            Value::Object(params),
            json!({"q": "rust", "limit": 25, "safe": false, "tags": ["a", "b"]})
        );
    }

    #[test]
    fn test_param_coercion_failures() {
        let method = search();
        assert!(method.coerce_params(&[("limit".into(), "many".into())]).is_err());
        assert!(method.coerce_params(&[("safe".into(), "yes".into())]).is_err());
        assert!(method
            .coerce_params(&[("q".into(), "a".into()), ("q".into(), "b".into())])
            .is_err());
    }

    #[test]
    fn test_undeclared_error_becomes_internal() {
        let response = search().shape_response(
            Err(HandlerError::named("Whatever")),
            &DataValidator::new(None),
        );
        assert_eq!(response.status, 500);
        assert_eq!(response.error_name(), Some("InternalServerError"));
    }
}
