//! C ABI entry points
//!
//! ```c
//! typedef struct {
//!     char *response;  /* NULL unless status == 0 */
//!     int status;      /* 0..4 */
//! } sockrpc_invoke_result;
//!
//! sockrpc_invoke_result sockrpc_invoke(const char *request_json, const char *address);
//! void sockrpc_release(char *response);
//! int sockrpc_init_logging(int json);
//! ```
//!
//! Every non-NULL `response` must be passed to `sockrpc_release` exactly
//! once. NULL is accepted and ignored.
//!
//! A panic never unwinds into the caller. `sockrpc_invoke` reports it and
//! returns status 3.

use crate::adapter::{Adapter, Invocation};
use crate::buffer::ResponseBuffer;
use crate::error::AdapterError;
use sockrpc_core::{init_observability, ObservabilityConfig};
use std::any::Any;
use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

/// Result of `sockrpc_invoke`
#[repr(C)]
#[derive(Debug)]
pub struct InvokeResult {
    /// Envelope owned by the caller until released; NULL on failure
    pub response: *mut c_char,
    /// One of the `Status` codes
    pub status: c_int,
}

impl From<Invocation> for InvokeResult {
    fn from(invocation: Invocation) -> Self {
        Self {
            response: invocation
                .response
                .map(ResponseBuffer::into_raw)
                .unwrap_or(ptr::null_mut()),
            status: invocation.status.code(),
        }
    }
}

/// Perform one JSON-RPC call on the Unix socket at `address`
///
/// # Safety
///
/// Both arguments must be NULL or point to NUL-terminated strings that stay
/// valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn sockrpc_invoke(request_json: *const c_char, address: *const c_char) -> InvokeResult {
    let adapter = Adapter::default();

    guarded(&adapter, || {
        let request_json = match borrow_str(request_json, "request_json") {
            Ok(text) => text,
            Err(error) => return adapter.reject(error),
        };
        let address = match borrow_str(address, "address") {
            Ok(text) => text,
            Err(error) => return adapter.reject(error),
        };

        adapter.invoke(request_json, address)
    })
    .into()
}

/// Free a response returned by `sockrpc_invoke`
///
/// # Safety
///
/// `response` must be NULL or a pointer returned by `sockrpc_invoke` that
/// has not been released yet.
#[no_mangle]
pub unsafe extern "C" fn sockrpc_release(response: *mut c_char) {
    if response.is_null() {
        return;
    }
    drop(ResponseBuffer::from_raw(response));
}

/// Install a `tracing` subscriber for the library's logs
///
/// `RUST_LOG` selects the level (default "info"). Non-zero `json` switches to
/// one JSON object per line. Returns 0 on success and 1 if logging was
/// already initialized.
#[no_mangle]
pub extern "C" fn sockrpc_init_logging(json: c_int) -> c_int {
    let config = ObservabilityConfig::new("sockrpc-ffi").with_json(json != 0);
    match init_observability(config) {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

/// Run `body`, turning a panic into a reported failure
fn guarded(adapter: &Adapter, body: impl FnOnce() -> Invocation) -> Invocation {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(invocation) => invocation,
        Err(payload) => adapter.reject(AdapterError::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

unsafe fn borrow_str<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, AdapterError> {
    if ptr.is_null() {
        return Err(AdapterError::BoundaryParse(format!("{} is NULL", name)));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|e| AdapterError::BoundaryParse(format!("{} is not UTF-8: {}", name, e)))
}
