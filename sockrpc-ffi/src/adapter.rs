//! One-shot call adapter
//!
//! [`Adapter::invoke`] performs exactly one JSON-RPC call for a caller that
//! speaks only strings:
//!
//! 1. Parse `{"method": <string>, "params": <object>}`; an empty or missing
//!    `params` object means "no parameters"
//! 2. Dial a fresh client on the Unix socket at `address`
//! 3. Perform the call and close the client, whatever the outcome
//! 4. Serialize the success response into a [`ResponseBuffer`]
//!
//! Each invocation owns its client and its runtime, so invocations from
//! different threads never share state.

use crate::buffer::ResponseBuffer;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::{AdapterError, Status};
use serde::Deserialize;
use serde_json::{Map, Value};
use sockrpc_client::{Error, Response, RpcClient, TransportKind};
use std::sync::Arc;

/// Call description accepted from the foreign side
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallDescription {
    /// Remote method name
    pub method: String,
    /// By-name parameters
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
}

impl CallDescription {
    /// Parse the foreign request text
    pub fn parse(request_json: &str) -> Result<Self, AdapterError> {
        let mut call: CallDescription =
            serde_json::from_str(request_json).map_err(|e| AdapterError::BoundaryParse(e.to_string()))?;

        if call.params.as_ref().is_some_and(Map::is_empty) {
            call.params = None;
        }
        Ok(call)
    }
}

/// Result of one invocation
#[derive(Debug)]
pub struct Invocation {
    /// Outcome code
    pub status: Status,
    /// The envelope; present exactly when `status` is `Success`
    pub response: Option<ResponseBuffer>,
}

impl Invocation {
    fn success(buffer: ResponseBuffer) -> Self {
        Self {
            status: Status::Success,
            response: Some(buffer),
        }
    }

    fn failure(status: Status) -> Self {
        Self {
            status,
            response: None,
        }
    }

    /// The envelope text, if there is one
    pub fn response_str(&self) -> Option<&str> {
        self.response.as_ref().map(ResponseBuffer::as_str)
    }
}

/// Performs single calls on behalf of a foreign caller
#[derive(Clone)]
pub struct Adapter {
    diagnostics: Arc<dyn Diagnostics>,
}

impl Default for Adapter {
    /// Adapter reporting through `tracing`
    fn default() -> Self {
        Self::new(Arc::new(TracingDiagnostics))
    }
}

impl Adapter {
    /// Create an adapter reporting failures to `diagnostics`
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self { diagnostics }
    }

    /// Perform one call, blocking the current thread until it completes
    ///
    /// Must not be called from inside an async runtime; use
    /// [`Adapter::invoke_async`] there.
    pub fn invoke(&self, request_json: &str, address: &str) -> Invocation {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => return self.reject(AdapterError::Runtime(e.to_string())),
        };

        runtime.block_on(self.invoke_async(request_json, address))
    }

    /// Perform one call on the caller's runtime
    #[tracing::instrument(skip(self, request_json))]
    pub async fn invoke_async(&self, request_json: &str, address: &str) -> Invocation {
        match perform(request_json, address).await {
            Ok(buffer) => {
                tracing::debug!(bytes = buffer.len(), "Invocation succeeded");
                Invocation::success(buffer)
            }
            Err(error) => self.reject(error),
        }
    }

    /// Report `error` and build the matching failed invocation
    pub fn reject(&self, error: AdapterError) -> Invocation {
        self.diagnostics.report(&error);
        Invocation::failure(error.status())
    }
}

async fn perform(request_json: &str, address: &str) -> Result<ResponseBuffer, AdapterError> {
    let call = CallDescription::parse(request_json)?;

    let client = RpcClient::connect(TransportKind::Unix, address)
        .await
        .map_err(AdapterError::Connection)?;

    let outcome = client.request(&call.method, call.params).await;
    client.close().await;

    let response = match outcome.map_err(AdapterError::Call)? {
        Response::Failure { error, .. } => {
            return Err(AdapterError::Call(Error::Remote {
                method: call.method,
                error,
            }))
        }
        success => success,
    };

    let json = serde_json::to_string(&response).map_err(|e| AdapterError::InvalidResponse(e.to_string()))?;
    ResponseBuffer::new(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_with_params() {
        let call = CallDescription::parse(r#"{"method":"bdev_get_bdevs","params":{"name":"Malloc0"}}"#).unwrap();
        assert_eq!(call.method, "bdev_get_bdevs");
        assert_eq!(call.params.unwrap()["name"], "Malloc0");
    }

    #[test]
    fn test_parse_empty_or_missing_params_is_absent() {
        for text in [
            r#"{"method":"bdev_get_bdevs","params":{}}"#,
            r#"{"method":"bdev_get_bdevs","params":null}"#,
            r#"{"method":"bdev_get_bdevs"}"#,
        ] {
            assert_eq!(CallDescription::parse(text).unwrap().params, None);
        }
    }

    #[test]
    fn test_parse_keeps_integer_precision() {
        let call = CallDescription::parse(r#"{"method":"m","params":{"big":18446744073709551615,"neg":-9223372036854775808}}"#).unwrap();
        let params = call.params.unwrap();
        assert_eq!(params["big"].as_u64(), Some(u64::MAX));
        assert_eq!(params["neg"].as_i64(), Some(i64::MIN));
    }

    #[test]
    fn test_parse_keeps_integers_beyond_64_bits() {
        let call = CallDescription::parse(
            r#"{"method":"m","params":{"big":18446744073709551616,"small":-9223372036854775809}}"#,
        )
        .unwrap();
        assert_eq!(
            serde_json::to_string(&call.params).unwrap(),
            r#"{"big":18446744073709551616,"small":-9223372036854775809}"#
        );
    }

    #[test]
    fn test_parse_rejects_bad_descriptions() {
        for text in [
            "",
            "not json",
            r#"{"params":{}}"#,
            r#"{"method":7}"#,
            r#"{"method":"m","params":[1,2]}"#,
            r#"{"method":"m","params":"x"}"#,
        ] {
            match CallDescription::parse(text) {
                Err(error) => assert_eq!(error.status(), Status::InvalidParameter),
                Ok(call) => panic!("Expected parse failure for {:?}, got {:?}", text, call),
            }
        }
    }

    #[test]
    fn test_invocation_accessors() {
        let buffer = ResponseBuffer::new(json!({"result": null}).to_string()).unwrap();
        let invocation = Invocation::success(buffer);
        assert!(invocation.status.is_success());
        assert_eq!(invocation.response_str(), Some(r#"{"result":null}"#));

        let invocation = Invocation::failure(Status::ConnectionError);
        assert!(invocation.response_str().is_none());
    }
}
