//! Core JSON-RPC 2.0 types and stream codec for sockrpc
//!
//! This crate provides the pieces every sockrpc component shares:
//!
//! - **Types**: requests, container parameters, correlation ids, and the
//!   two-variant response
//! - **Codec**: one-JSON-value-at-a-time encoding/decoding on a byte stream
//! - **Error handling**: the client error taxonomy and the wire error object
//! - **Observability**: `tracing` subscriber setup
//!
//! # Architecture
//!
//! The crate is transport-agnostic. The codec works on anything that is
//! `AsyncRead + AsyncWrite`; `sockrpc-client` binds it to Unix-domain and TCP
//! sockets, and `sockrpc-ffi` exposes the client to foreign callers.
//!
//! # Example
//!
//! ```rust
//! use sockrpc_core::{Params, Request, RequestId, Response};
//! use serde_json::json;
//!
//! let params = Params::from_value(json!({"name": "Malloc0"})).unwrap();
//! let request = Request::new("bdev_get_bdevs", params, RequestId::FIRST);
//! assert_eq!(request.jsonrpc, "2.0");
//!
//! let response: Response = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":[]}"#).unwrap();
//! assert_eq!(response.into_result().unwrap(), json!([]));
//! ```

pub mod codec;
pub mod error;
pub mod observability;
pub mod types;

pub use codec::{Codec, CodecError};
pub use error::{ConnectStage, Error, ErrorObject, Result};
pub use observability::{init_observability, ObservabilityConfig};
pub use types::{json_kind, Params, Request, RequestId, Response, JSONRPC_VERSION};
