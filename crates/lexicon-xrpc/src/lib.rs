//! Lexicon XRPC - dispatch boundary for Lexicon-described methods
//!
//! Binds executors to the `main` query or procedure of Lexicon documents, checks
//! every request against the method schema before an executor runs, and checks
//! every executor result before it is returned.
//!
//! ## Request flow
//!
//! 1. Look up the binding by NSID (`MethodNotImplemented`, 501)
//! 2. Match the HTTP verb to the method kind (`MethodNotAllowed`, 405)
//! 3. Coerce and validate query parameters (`InvalidRequest`, 400)
//! 4. Check input presence, encoding and schema (`InvalidRequest`, 400)
//! 5. Run the executor
//! 6. Check output encoding and schema, and that errors are declared
//!    (`InternalServerError`, 500)
//!
//! ## Quick Start
//!
//! ```rust
//! use lexicon_xrpc::{Call, Dispatcher, HandlerResult, Payload, XrpcRequest};
//! use serde_json::json;
//!
//! let dispatcher = Dispatcher::builder()
//!     .bind_document(
//!         json!({
//!             "lexicon": 1,
//!             "id": "com.example.echo",
//!             "defs": {
//!                 "main": {
//!                     "type": "query",
//!                     "parameters": {
//!                         "type": "params",
//!                         "required": ["text"],
//!                         "properties": {"text": {"type": "string"}}
//!                     },
//!                     "output": {"encoding": "application/json"}
//!                 }
//!             }
//!         }),
//!         |call: Call| -> HandlerResult {
//!             Ok(Some(Payload::json(json!({"text": call.param("text")}))))
//!         },
//!     )?
//!     .build();
//!
//! let response = dispatcher.dispatch(XrpcRequest::query("com.example.echo").with_param("text", "hi"));
//! assert_eq!(response.status, 200);
//!
//! let response = dispatcher.dispatch(XrpcRequest::query("com.example.echo"));
//! assert_eq!(response.status, 400);
//! # Ok::<(), lexicon_xrpc::XrpcError>(())
//! ```
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

pub mod data;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod method;
pub mod request;
pub mod response;

pub use data::{DataError, DataValidator};
pub use dispatch::{DispatchConfig, Dispatcher, DispatcherBuilder};
pub use error::{XrpcError, XrpcResult};
pub use executor::{Call, Executor, HandlerError, HandlerOutput, HandlerResult};
pub use method::{MethodKind, XrpcMethod};
pub use request::{HttpMethod, Payload, PayloadBody, XrpcRequest};
pub use response::XrpcResponse;
