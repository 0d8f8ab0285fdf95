//! Routing requests to bound executors
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::data::DataValidator;
use crate::error::{XrpcError, XrpcResult};
use crate::executor::Executor;
use crate::method::XrpcMethod;
use crate::request::XrpcRequest;
use crate::response::XrpcResponse;
use lexicon_schemas::parser::DEFAULT_MAX_DEPTH;
use lexicon_schemas::{
    DocumentParser, LexiconCatalog, LexiconInput, ParserConfig, TypeRegistry, ValidationConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Configuration for dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Nesting bound when checking request and response data
    pub max_depth: usize,
    /// Rules applied to method documents at bind time
    pub validation: ValidationConfig,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            validation: ValidationConfig::default(),
        }
    }
}

impl DispatchConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

struct Binding {
    method: XrpcMethod,
    executor: Arc<dyn Executor>,
}

/// Collects method bindings before building a [`Dispatcher`]
pub struct DispatcherBuilder {
    config: DispatchConfig,
    catalog: Option<Arc<LexiconCatalog>>,
    bindings: BTreeMap<String, Binding>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            config: DispatchConfig::default(),
            catalog: None,
            bindings: BTreeMap::new(),
        }
    }

    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Catalog used for method lookup by NSID and for cross-document references
    pub fn with_catalog(mut self, catalog: Arc<LexiconCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Bind an executor to a method found in the catalog
    pub fn bind(self, nsid: &str, executor: impl Executor + 'static) -> XrpcResult<Self> {
        let document = self
            .catalog
            .as_ref()
            .and_then(|catalog| catalog.get(nsid))
            .cloned()
            .ok_or_else(|| XrpcError::UnknownLexicon {
                nsid: nsid.to_string(),
            })?;
        let method = XrpcMethod::from_parsed(document, &self.config.validation)?;
        Ok(self.insert(method, Arc::new(executor)))
    }

    /// Bind an executor to the method of a document supplied directly
    pub fn bind_document(
        self,
        input: impl Into<LexiconInput>,
        executor: impl Executor + 'static,
    ) -> XrpcResult<Self> {
        let parser = DocumentParser::with_config(
            Arc::new(TypeRegistry::standard()),
            ParserConfig::default().with_max_depth(self.config.max_depth),
        );
        let document = parser.parse(input).map_err(lexicon_schemas::Error::from)?;
        let method = XrpcMethod::from_parsed(Arc::new(document), &self.config.validation)?;
        Ok(self.insert(method, Arc::new(executor)))
    }

    /// Bind an already constructed method
    pub fn bind_method(self, method: XrpcMethod, executor: Arc<dyn Executor>) -> Self {
        self.insert(method, executor)
    }

    fn insert(mut self, method: XrpcMethod, executor: Arc<dyn Executor>) -> Self {
        debug!(nsid = method.nsid(), kind = ?method.kind(), "binding method");
        self.bindings
            .insert(method.nsid().to_string(), Binding { method, executor });
        self
    }

    pub fn build(self) -> Dispatcher {
        info!(methods = self.bindings.len(), "dispatcher ready");
        Dispatcher {
            config: self.config,
            catalog: self.catalog,
            bindings: self.bindings,
        }
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable table of bound methods
pub struct Dispatcher {
    config: DispatchConfig,
    catalog: Option<Arc<LexiconCatalog>>,
    bindings: BTreeMap<String, Binding>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Bound NSIDs in sorted order
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn method(&self, nsid: &str) -> Option<&XrpcMethod> {
        self.bindings.get(nsid).map(|binding| &binding.method)
    }

    /// Handle one request; every failure becomes an error response
    #[instrument(skip_all, fields(nsid = %request.nsid, method = %request.method))]
    pub fn dispatch(&self, request: XrpcRequest) -> XrpcResponse {
        let response = match self.bindings.get(&request.nsid) {
            None => XrpcError::MethodNotImplemented {
                nsid: request.nsid.clone(),
            }
            .to_response(),
            Some(binding) => {
                let data = self.data_validator();
                match binding.method.validate_request(request, &data) {
                    Ok(call) => {
                        let outcome = binding.executor.execute(call);
                        binding.method.shape_response(outcome, &data)
                    }
                    Err(error) => {
                        debug!(%error, "request rejected");
                        error.to_response()
                    }
                }
            }
        };

        debug!(status = response.status, "request handled");
        response
    }

    /// Validate a request without running its executor
    pub fn check(&self, request: XrpcRequest) -> XrpcResult<()> {
        let binding = self
            .bindings
            .get(&request.nsid)
            .ok_or_else(|| XrpcError::MethodNotImplemented {
                nsid: request.nsid.clone(),
            })?;
        binding
            .method
            .validate_request(request, &self.data_validator())
            .map(|_| ())
    }

    fn data_validator(&self) -> DataValidator<'_> {
        DataValidator::new(self.catalog.as_deref()).with_max_depth(self.config.max_depth)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("methods", &self.bindings.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{Call, HandlerResult};
    use lexicon_schemas::ParseError;
    use serde_json::json;

    fn ping() -> serde_json::Value {
        json!({"lexicon": 1, "id": "com.example.ping", "defs": {"main": {"type": "query"}}})
    }

    #[test]
    fn test_unbound_method() {
        let dispatcher = Dispatcher::builder().build();
        let response = dispatcher.dispatch(XrpcRequest::query("com.example.ping"));
        assert_eq!(response.status, 501);
        assert_eq!(response.error_name(), Some("MethodNotImplemented"));
    }

    #[test]
    fn test_bind_requires_catalog_entry() {
        let result = Dispatcher::builder().bind("com.example.ping", |_: Call| -> HandlerResult { Ok(None) });
        assert!(matches!(result, Err(XrpcError::UnknownLexicon { .. })));
    }

    #[test]
    fn test_dispatcher_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Dispatcher>();

        let dispatcher = Dispatcher::builder()
            .bind_document(ping(), |_: Call| -> HandlerResult { Ok(None) })
            .unwrap()
            .build();
        assert_eq!(dispatcher.methods().collect::<Vec<_>>(), vec!["com.example.ping"]);
        assert!(dispatcher.method("com.example.ping").is_some());
    }

    #[test]
    fn test_bind_document_honors_max_depth() {
        let mut schema = json!({"type": "string"});
        for _ in 0..6 {
            schema = json!({"type": "object", "properties": {"inner": schema}});
        }
        let nested = json!({
            "lexicon": 1,
            "id": "com.example.nested",
            "defs": {
                "main": {
                    "type": "procedure",
                    "input": {"encoding": "application/json", "schema": schema}
                }
            }
        });

        assert!(Dispatcher::builder()
            .bind_document(nested.clone(), |_: Call| -> HandlerResult { Ok(None) })
            .is_ok());

        let result = Dispatcher::builder()
            .with_config(DispatchConfig::default().with_max_depth(3))
            .bind_document(nested, |_: Call| -> HandlerResult { Ok(None) });
        assert!(matches!(
            result,
            Err(XrpcError::Document(lexicon_schemas::Error::Parse(ParseError::RecursionLimit { limit: 3, .. })))
        ));
    }
}
