//! Client builder for transport, address and timeout
//!
//! The `ClientBuilder` provides a fluent API for configuring a client before
//! connecting. It allows you to:
//! - Choose the transport kind, by value or by network name
//! - Take the address from the `SOCKRPC_ADDR` environment variable
//! - Put a deadline on every call
//!
//! # Examples
//!
//! ```rust,no_run
//! use sockrpc_client::{ClientBuilder, TransportKind};
//! use std::time::Duration;
//!
//! # async fn example() -> sockrpc_core::Result<()> {
//! // Default Unix socket, no timeout
//! let client = ClientBuilder::default().connect().await?;
//!
//! // TCP with a per-call deadline
//! let client2 = ClientBuilder::new("127.0.0.1:5260")
//!     .transport(TransportKind::Tcp)
//!     .with_timeout(Duration::from_secs(30))
//!     .connect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::transport::TransportKind;
use crate::RpcClient;
use sockrpc_core::{Error, Result};
use std::time::Duration;

/// Conventional listening socket of the storage service
pub const DEFAULT_SOCKET_PATH: &str = "/var/tmp/spdk.sock";

/// Environment variable read by [`ClientBuilder::from_env`]
pub const ADDRESS_ENV: &str = "SOCKRPC_ADDR";

/// Builder for configuring and creating an RpcClient
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    address: String,
    /// A bad transport name is kept until `connect` so the fluent chain
    /// stays infallible
    transport: std::result::Result<TransportKind, Error>,
    timeout: Option<Duration>,
}

impl Default for ClientBuilder {
    /// Unix socket at [`DEFAULT_SOCKET_PATH`], no timeout
    fn default() -> Self {
        Self::new(DEFAULT_SOCKET_PATH)
    }
}

impl ClientBuilder {
    /// Create a new client builder for `address`
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            transport: Ok(TransportKind::default()),
            timeout: None,
        }
    }

    /// Create a builder whose address comes from `SOCKRPC_ADDR`, falling
    /// back to [`DEFAULT_SOCKET_PATH`] when unset or empty
    pub fn from_env() -> Self {
        let address = std::env::var(ADDRESS_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SOCKET_PATH.to_string());
        Self::new(address)
    }

    /// Set the transport kind
    pub fn transport(mut self, kind: TransportKind) -> Self {
        self.transport = Ok(kind);
        self
    }

    /// Set the transport kind by network name ("unix", "tcp", ...)
    ///
    /// An unsupported name makes `connect` fail with
    /// `Error::UnsupportedTransport` without creating a socket.
    pub fn transport_name(mut self, name: &str) -> Self {
        self.transport = name.parse();
        self
    }

    /// Fail any call that has no response after `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Remove the call deadline (default)
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// The configured address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Build and connect the client
    pub async fn connect(self) -> Result<RpcClient> {
        let kind = self.transport.map_err(|e| {
            tracing::warn!(address = %self.address, error = %e, "Refusing to dial");
            e
        })?;

        RpcClient::connect_with_timeout(kind, &self.address, self.timeout).await
    }
}
