//! Error types for sockrpc
//!
//! This module provides the error handling shared by every sockrpc crate.
//! It defines two main types:
//!
//! - **Error**: Client-side failures, each tagged with the method being called
//! - **ErrorObject**: The wire-format error object a remote service returns
//!
//! # Error Taxonomy
//!
//! A single call can fail at exactly one stage, and the variant tells you which:
//!
//! | Stage                 | Variant                                  |
//! |-----------------------|------------------------------------------|
//! | parameter validation  | `InvalidParamsType`                      |
//! | transport selection   | `UnsupportedTransport`                   |
//! | dialing               | `Connection`                             |
//! | use after close       | `ConnectionClosed`                       |
//! | writing the request   | `Encode`                                 |
//! | reading the response  | `Decode`                                 |
//! | correlation           | `IdMismatch`                             |
//! | remote failure        | `Remote`                                 |
//! | optional deadline     | `Timeout`                                |
//!
//! None of these are retried internally.
//!
//! # Examples
//!
//! ```rust
//! use sockrpc_core::{Error, ErrorObject};
//!
//! let error = Error::Remote {
//!     method: "bdev_get_bdevs".into(),
//!     error: ErrorObject::new(-32601, "Method not found"),
//! };
//! assert_eq!(error.method(), Some("bdev_get_bdevs"));
//! assert_eq!(error.to_string(), "bdev_get_bdevs: [-32601] Method not found");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type for sockrpc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which half of establishing a connection failed
///
/// Address resolution and the connect itself are both reported as
/// `Error::Connection`; the stage keeps them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStage {
    /// The address could not be resolved (e.g. unknown TCP host)
    Resolve,
    /// The socket could not be connected (e.g. missing socket file, refused)
    Connect,
}

impl fmt::Display for ConnectStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectStage::Resolve => write!(f, "resolve"),
            ConnectStage::Connect => write!(f, "connect"),
        }
    }
}

/// Client-side error type for sockrpc operations
///
/// Every variant raised while executing a call carries the method name, so a
/// log line or a bubbled-up error is self-describing without extra context.
///
/// # Cloning
///
/// Causes are captured as strings so the error stays `Clone`, matching how
/// it is passed around between the client and the boundary adapter.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Params were a scalar (string, number, boolean) instead of a container
    ///
    /// JSON-RPC 2.0 only allows by-position (array) or by-name (object)
    /// parameters. Raised before anything is written to the connection.
    #[error("{method}: params must be an array or an object, got {kind}")]
    InvalidParamsType {
        /// The method being called
        method: String,
        /// JSON kind of the rejected value
        kind: &'static str,
    },

    /// The requested transport kind is not a stream socket we can dial
    #[error("unsupported transport: {0}")]
    UnsupportedTransport(String),

    /// Dialing the remote service failed
    #[error("failed to {stage} {address}: {cause}")]
    Connection {
        /// The address that was dialed
        address: String,
        /// Whether resolution or the connect itself failed
        stage: ConnectStage,
        /// Underlying OS error text
        cause: String,
    },

    /// The client was closed before (or while waiting to start) this call
    #[error("{method}: connection is closed")]
    ConnectionClosed {
        /// The method being called
        method: String,
    },

    /// The request could not be serialized or written
    #[error("{method}: failed to encode request: {cause}")]
    Encode {
        /// The method being called
        method: String,
        /// Serializer or socket error text
        cause: String,
    },

    /// The response could not be read or parsed
    ///
    /// Covers both a peer that closed the connection and malformed JSON.
    #[error("{method}: failed to decode response: {cause}")]
    Decode {
        /// The method being called
        method: String,
        /// Parser or socket error text
        cause: String,
    },

    /// The response id does not echo the request id
    ///
    /// The connection is out of sync after this and is closed by the client.
    #[error("{method}: response id {} does not match request id {expected}", display_id(.actual))]
    IdMismatch {
        /// The method being called
        method: String,
        /// The id that was sent
        expected: u64,
        /// The id that came back (`None` when null or absent)
        actual: Option<u64>,
    },

    /// The remote service answered with a JSON-RPC error object
    #[error("{method}: {error}")]
    Remote {
        /// The method being called
        method: String,
        /// The error object exactly as received
        error: ErrorObject,
    },

    /// No response arrived within the configured deadline
    #[error("{method}: no response within {timeout:?}")]
    Timeout {
        /// The method being called
        method: String,
        /// The configured per-call deadline
        timeout: Duration,
    },
}

fn display_id(id: &Option<u64>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "null".to_string(),
    }
}

impl Error {
    /// The method this error was raised for, if it happened inside a call
    pub fn method(&self) -> Option<&str> {
        match self {
            Error::InvalidParamsType { method, .. }
            | Error::ConnectionClosed { method }
            | Error::Encode { method, .. }
            | Error::Decode { method, .. }
            | Error::IdMismatch { method, .. }
            | Error::Remote { method, .. }
            | Error::Timeout { method, .. } => Some(method),
            Error::UnsupportedTransport(_) | Error::Connection { .. } => None,
        }
    }

    /// True for dial failures and use-after-close
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. } | Error::ConnectionClosed { .. })
    }

    /// The remote error object, if the service reported one
    pub fn remote(&self) -> Option<&ErrorObject> {
        match self {
            Error::Remote { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// JSON-RPC 2.0 error object
///
/// This structure is the exact wire format of the `error` member of a
/// response:
///
/// ```json
/// {"code": -32601, "message": "Method not found", "data": {"method": "x"}}
/// ```
///
/// The client never interprets codes; they are passed through to the caller
/// unchanged inside `Error::Remote`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Numeric error code
    pub code: i64,

    /// Short human-readable description
    pub message: String,

    /// Optional service-defined detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ErrorObject {
    /// Create an error object with code and message
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error object carrying additional data
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sockrpc_core::ErrorObject;
    /// use serde_json::json;
    ///
    /// let error = ErrorObject::with_data(-32602, "Invalid parameters", json!({"name": "Malloc0"}));
    /// assert_eq!(error.data.unwrap()["name"], "Malloc0");
    /// ```
    pub fn with_data(code: i64, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl fmt::Display for ErrorObject {
    /// Formats as "[code] message", e.g. "[-32601] Method not found"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorObject {}
