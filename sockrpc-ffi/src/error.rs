//! Boundary status codes and errors
//!
//! Everything that can go wrong inside one invocation collapses to one of
//! five integer codes at the boundary. The detail lives in [`AdapterError`]
//! and only reaches the foreign caller through diagnostics.

use sockrpc_core::Error;
use std::fmt;
use thiserror::Error;

/// Outcome code returned to the foreign caller
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// A response buffer was produced
    Success = 0,
    /// The request description could not be read
    InvalidParameter = 1,
    /// The service could not be reached
    ConnectionError = 2,
    /// The call itself failed (including remote errors)
    JsonRpcCallError = 3,
    /// The response could not be handed back
    InvalidResponse = 4,
}

impl Status {
    /// The integer code crossing the boundary
    pub fn code(self) -> i32 {
        self as i32
    }

    /// True only for `Success`
    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Success => "success",
            Status::InvalidParameter => "invalid parameter",
            Status::ConnectionError => "connection error",
            Status::JsonRpcCallError => "json-rpc call error",
            Status::InvalidResponse => "invalid response",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

/// Failure of one boundary invocation
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// The request description was missing, not UTF-8, or not a valid
    /// `{"method": ..., "params": {...}}` object
    #[error("invalid request description: {0}")]
    BoundaryParse(String),

    /// No runtime could be started to drive the call
    #[error("failed to start runtime: {0}")]
    Runtime(String),

    /// Dialing the service failed
    #[error(transparent)]
    Connection(Error),

    /// The call failed after the connection was made
    #[error(transparent)]
    Call(Error),

    /// The response envelope could not be serialized or copied out
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The invocation panicked before producing an outcome
    #[error("invocation panicked: {0}")]
    Panic(String),
}

impl AdapterError {
    /// Boundary status for this error
    pub fn status(&self) -> Status {
        match self {
            AdapterError::BoundaryParse(_) => Status::InvalidParameter,
            AdapterError::Runtime(_) | AdapterError::Connection(_) => Status::ConnectionError,
            AdapterError::Call(_) | AdapterError::Panic(_) => Status::JsonRpcCallError,
            AdapterError::InvalidResponse(_) => Status::InvalidResponse,
        }
    }

    /// The method being invoked, when the error happened inside the call
    pub fn method(&self) -> Option<&str> {
        match self {
            AdapterError::Call(error) => error.method(),
            _ => None,
        }
    }
}
