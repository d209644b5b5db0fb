//! JSON-RPC 2.0 client over Unix-domain and TCP stream sockets
//!
//! This crate provides a small, strictly sequential JSON-RPC 2.0 client for
//! services that listen on a stream socket, such as a storage daemon's
//! control socket.
//!
//! # Core Features
//!
//! - **Stream Transports**: Unix-domain sockets and TCP (any, v4-only, v6-only)
//! - **Request-Response**: one request in flight per client, correlated by id
//! - **Parameter Checking**: scalar params are rejected before anything is sent
//! - **Typed Results**: deserialize results into your own types
//! - **Deadlines**: optional per-call timeout via `ClientBuilder`
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sockrpc_client::{RpcClient, TransportKind};
//! use serde_json::Value;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RpcClient::connect(TransportKind::Unix, "/var/tmp/spdk.sock").await?;
//!
//!     let bdevs = client.call("bdev_get_bdevs", ()).await?;
//!     println!("Result: {}", bdevs);
//!
//!     let version: Value = client.call_typed("spdk_get_version", ()).await?;
//!     println!("Version: {}", version["version"]);
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # With Configuration
//!
//! ```rust,no_run
//! use sockrpc_client::ClientBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> sockrpc_core::Result<()> {
//! let client = ClientBuilder::from_env()
//!     .transport_name("unix")
//!     .with_timeout(Duration::from_secs(10))
//!     .connect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod client_builder;
mod request;
mod transport;

pub use client::RpcClient;
pub use client_builder::{ClientBuilder, ADDRESS_ENV, DEFAULT_SOCKET_PATH};
pub use request::IdGenerator;
pub use transport::{dial, Transport, TransportKind};

// Re-export core types for convenience
pub use sockrpc_core::{ConnectStage, Error, ErrorObject, Params, Response, Result};
