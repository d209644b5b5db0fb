//! Foreign-caller adapter for sockrpc
//!
//! This crate lets code outside Rust perform a JSON-RPC call with two
//! strings in and one string out. Each invocation dials a fresh client on a
//! Unix socket, performs one call, closes the client, and returns a status
//! code plus, on success, the response envelope in a caller-owned buffer.
//!
//! # Status Codes
//!
//! | code | meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | success, `response` holds the envelope           |
//! | 1    | the request description could not be read       |
//! | 2    | the service could not be reached                 |
//! | 3    | the call failed, including remote error replies  |
//! |      | and panics caught at the C boundary              |
//! | 4    | the envelope could not be produced               |
//!
//! # Envelope
//!
//! On success the envelope is the response as received, re-serialized as
//! `{"jsonrpc":<version>,"result":<result>,"id":<id>}` with the version the
//! service sent. A null result is kept as a literal `"result":null`, and an
//! `error` member never appears. Integers keep every digit, including ones
//! beyond the 64-bit range.
//!
//! # Rust Usage
//!
//! ```rust,no_run
//! use sockrpc_ffi::{Adapter, Status};
//!
//! let adapter = Adapter::default();
//! let invocation = adapter.invoke(r#"{"method":"bdev_get_bdevs","params":{}}"#, "/var/tmp/spdk.sock");
//! if invocation.status == Status::Success {
//!     println!("{}", invocation.response_str().unwrap_or_default());
//! }
//! ```

mod abi;
mod adapter;
mod buffer;
mod diagnostics;
mod error;

pub use abi::{sockrpc_init_logging, sockrpc_invoke, sockrpc_release, InvokeResult};
pub use adapter::{Adapter, CallDescription, Invocation};
pub use buffer::ResponseBuffer;
pub use diagnostics::{Diagnostics, TracingDiagnostics};
pub use error::{AdapterError, Status};
