//! sockrpc - JSON-RPC 2.0 over stream sockets
//!
//! This is the main convenience crate that re-exports all sockrpc sub-crates.
//! Use this crate if you want a single dependency for the client and the
//! foreign-caller adapter.
//!
//! # Architecture
//!
//! sockrpc is organized into modular crates:
//!
//! - **sockrpc-core**: Wire types, stream codec, error handling, logging setup
//! - **sockrpc-client**: Unix-domain / TCP transport and the sequential client
//! - **sockrpc-ffi**: One-call-per-invocation adapter with a C ABI
//!
//! A call flows strictly downward (adapter → client → codec → transport) and
//! the response comes back up the same path.
//!
//! # Quick Start - Client
//!
//! ```rust,no_run
//! use sockrpc::{RpcClient, TransportKind};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RpcClient::connect(TransportKind::Unix, "/var/tmp/spdk.sock").await?;
//!
//!     let bdevs = client.call("bdev_get_bdevs", json!({"name": "Malloc0"})).await?;
//!     println!("Result: {}", bdevs);
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Quick Start - Adapter
//!
//! ```rust,no_run
//! use sockrpc::Adapter;
//!
//! let invocation = Adapter::default().invoke(r#"{"method":"spdk_get_version"}"#, "/var/tmp/spdk.sock");
//! println!("status {}", invocation.status.code());
//! ```

// Re-export all public APIs from sub-crates
pub use sockrpc_client as client;
pub use sockrpc_core as core;
pub use sockrpc_ffi as ffi;

// Convenience re-exports of the most commonly used types
pub use sockrpc_client::{ClientBuilder, RpcClient, TransportKind};
pub use sockrpc_core::{Error, Result};
pub use sockrpc_ffi::{Adapter, Status};
