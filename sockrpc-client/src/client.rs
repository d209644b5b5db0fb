//! JSON-RPC client over a stream socket
//!
//! This module provides [`RpcClient`], which owns one connection to one
//! remote service and performs strictly sequential calls on it.
//!
//! # Client Lifecycle
//!
//! 1. **Connect**: dial the transport (`RpcClient::connect` or `ClientBuilder`)
//! 2. **Use**: `call`, `call_typed` or `request`, one exchange at a time
//! 3. **Close**: `close()` releases the socket; later calls fail with
//!    `Error::ConnectionClosed`
//!
//! A call that fails after something was written (encode, decode, id
//! mismatch, timeout) leaves the stream in an unknown position, so the client
//! closes itself in that case. Remote errors do not close the client.
//!
//! # Cloning
//!
//! `RpcClient` is cheaply cloneable using `Arc` internally. All clones share
//! the same connection and id counter.
//!
//! # Thread Safety
//!
//! An async mutex guards the whole write-then-read sequence of a call.
//! Concurrent callers queue on it and are served one after the other, and
//! `close` waits for an in-flight call to finish before shutting down.

use crate::request::IdGenerator;
use crate::transport::{dial, Transport, TransportKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sockrpc_core::{Codec, CodecError, Error, Params, Request, RequestId, Response, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// JSON-RPC 2.0 client bound to one stream socket
#[derive(Clone)]
pub struct RpcClient {
    inner: Arc<Inner>,
}

struct Inner {
    address: String,
    kind: TransportKind,
    timeout: Option<Duration>,
    ids: IdGenerator,
    /// `None` once the client is closed
    connection: Mutex<Option<Codec<Transport>>>,
}

impl RpcClient {
    /// Dial `address` and return a client with no call timeout
    ///
    /// For a timeout or environment-driven configuration use `ClientBuilder`.
    pub async fn connect(kind: TransportKind, address: &str) -> Result<Self> {
        Self::connect_with_timeout(kind, address, None).await
    }

    #[tracing::instrument(skip(timeout))]
    pub(crate) async fn connect_with_timeout(
        kind: TransportKind,
        address: &str,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        tracing::info!("Connecting to service");
        let transport = dial(kind, address).await.map_err(|e| {
            tracing::warn!(error = %e, "Connection failed");
            e
        })?;

        tracing::info!("Connected successfully");
        Ok(Self {
            inner: Arc::new(Inner {
                address: address.to_string(),
                kind,
                timeout,
                ids: IdGenerator::new(),
                connection: Mutex::new(Some(Codec::new(transport))),
            }),
        })
    }

    /// Call `method` and return its result
    ///
    /// `params` may be anything that serializes to a JSON array or object
    /// (a `Vec`, a map, a `#[derive(Serialize)]` struct, a `serde_json::Value`
    /// container). `()`, `None` and `Value::Null` mean "no parameters" and
    /// omit the member from the request.
    ///
    /// # Errors
    ///
    /// - `InvalidParamsType` for scalar params, before anything is sent
    /// - `ConnectionClosed` after `close`
    /// - `Encode` when `params` cannot be serialized; the id is still
    ///   consumed and the connection stays open
    /// - `Encode` / `Decode` / `IdMismatch` / `Timeout` for a broken exchange
    /// - `Remote` when the service answered with an error object
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sockrpc_client::{RpcClient, TransportKind};
    /// use serde_json::json;
    ///
    /// # async fn example() -> sockrpc_core::Result<()> {
    /// let client = RpcClient::connect(TransportKind::Unix, "/var/tmp/spdk.sock").await?;
    /// let bdevs = client.call("bdev_get_bdevs", json!({"name": "Malloc0"})).await?;
    /// client.close().await;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call<P: Serialize>(&self, method: &str, params: P) -> Result<Value> {
        match self.request(method, params).await? {
            Response::Success { result, .. } => Ok(result),
            Response::Failure { error, .. } => {
                tracing::error!(method = %method, error = %error, "Request failed");
                Err(Error::Remote {
                    method: method.to_string(),
                    error,
                })
            }
        }
    }

    /// Call `method` and deserialize its result into `R`
    ///
    /// A result that does not fit `R` is reported as `Error::Decode`.
    pub async fn call_typed<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let result = self.call(method, params).await?;
        serde_json::from_value(result).map_err(|e| Error::Decode {
            method: method.to_string(),
            cause: e.to_string(),
        })
    }

    /// Send one request and return the correlated response as received
    ///
    /// Unlike `call`, a `Response::Failure` is returned as a value, not as
    /// `Error::Remote`.
    #[tracing::instrument(skip(self, params), fields(address = %self.inner.address))]
    pub async fn request<P: Serialize>(&self, method: &str, params: P) -> Result<Response> {
        let params = match validate_params(method, params) {
            Err(error @ Error::InvalidParamsType { .. }) => return Err(error),
            params => params,
        };

        let mut connection = self.inner.connection.lock().await;
        let codec = connection.as_mut().ok_or_else(|| Error::ConnectionClosed {
            method: method.to_string(),
        })?;

        let id = self.inner.ids.next_id();
        // Nothing was written yet, so the connection stays usable
        let params = params.map_err(|error| {
            tracing::error!(id = %id, error = %error, "Failed to serialize params");
            error
        })?;
        let request = Request::new(method, params, id);

        let outcome = match self.inner.timeout {
            Some(timeout) => tokio::time::timeout(timeout, exchange(codec, &request))
                .await
                .unwrap_or_else(|_| {
                    Err(Error::Timeout {
                        method: method.to_string(),
                        timeout,
                    })
                }),
            None => exchange(codec, &request).await,
        };

        match outcome {
            Ok(response) => {
                tracing::debug!(id = %id, success = response.is_success(), "Response received");
                Ok(response)
            }
            Err(error) => {
                tracing::error!(id = %id, error = %error, "Exchange failed, closing connection");
                if let Some(mut codec) = connection.take() {
                    if let Err(e) = codec.shutdown().await {
                        tracing::debug!(error = %e, "Shutdown after failed exchange");
                    }
                }
                Err(error)
            }
        }
    }

    /// Release the socket
    ///
    /// Waits for an in-flight call to finish first. Closing an already
    /// closed client does nothing.
    pub async fn close(&self) {
        let mut connection = self.inner.connection.lock().await;
        match connection.take() {
            Some(mut codec) => {
                if let Err(e) = codec.shutdown().await {
                    tracing::warn!(address = %self.inner.address, error = %e, "Error shutting down connection");
                }
                tracing::info!(address = %self.inner.address, "Connection closed");
            }
            None => tracing::debug!(address = %self.inner.address, "Connection already closed"),
        }
    }

    /// True once `close` ran or a failed exchange closed the connection
    pub async fn is_closed(&self) -> bool {
        self.inner.connection.lock().await.is_none()
    }

    /// The address this client dialed
    pub fn address(&self) -> &str {
        &self.inner.address
    }

    /// The transport kind this client dialed with
    pub fn kind(&self) -> TransportKind {
        self.inner.kind
    }

    /// The per-call deadline, if one was configured
    pub fn timeout(&self) -> Option<Duration> {
        self.inner.timeout
    }

    /// The id of the most recent request, 0 before the first one
    pub fn last_request_id(&self) -> u64 {
        self.inner.ids.last_issued()
    }
}

/// Write `request` and read the next response, checking the echoed id
async fn exchange(codec: &mut Codec<Transport>, request: &Request) -> Result<Response> {
    let method = &request.method;

    codec.encode(request).await.map_err(|e| codec_error(method, e))?;
    tracing::debug!("Request sent, waiting for response");

    let response: Response = codec.decode().await.map_err(|e| codec_error(method, e))?;
    check_id(method, request.id, &response)?;
    Ok(response)
}

fn check_id(method: &str, expected: RequestId, response: &Response) -> Result<()> {
    match response.id() {
        Some(actual) if actual == expected.get() => Ok(()),
        actual => Err(Error::IdMismatch {
            method: method.to_string(),
            expected: expected.get(),
            actual,
        }),
    }
}

fn codec_error(method: &str, error: CodecError) -> Error {
    match error {
        CodecError::Encode(cause) => Error::Encode {
            method: method.to_string(),
            cause,
        },
        CodecError::Decode(cause) => Error::Decode {
            method: method.to_string(),
            cause,
        },
    }
}

/// Turn caller params into container params or reject them
fn validate_params<P: Serialize>(method: &str, params: P) -> Result<Option<Params>> {
    let value = serde_json::to_value(params).map_err(|e| Error::Encode {
        method: method.to_string(),
        cause: e.to_string(),
    })?;

    Params::from_value(value).map_err(|kind| {
        tracing::warn!(method = %method, kind, "Rejected scalar params");
        Error::InvalidParamsType {
            method: method.to_string(),
            kind,
        }
    })
}
