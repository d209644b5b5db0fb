//! Owned response buffers
//!
//! A [`ResponseBuffer`] is a NUL-terminated copy of the response envelope.
//! Ownership moves to the foreign caller with [`ResponseBuffer::into_raw`]
//! and comes back exactly once through [`ResponseBuffer::from_raw`], which
//! `sockrpc_release` calls.

use crate::error::AdapterError;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// NUL-terminated JSON text owned by the adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBuffer(CString);

impl ResponseBuffer {
    /// Copy `json` into a C string
    ///
    /// # Errors
    ///
    /// `AdapterError::InvalidResponse` if the text contains an interior NUL
    /// byte and so cannot be represented.
    pub fn new(json: String) -> Result<Self, AdapterError> {
        CString::new(json)
            .map(ResponseBuffer)
            .map_err(|e| AdapterError::InvalidResponse(e.to_string()))
    }

    /// The JSON text
    pub fn as_str(&self) -> &str {
        // Built from a `String`, so always UTF-8.
        self.0.to_str().unwrap_or_default()
    }

    /// Length in bytes, without the terminating NUL
    pub fn len(&self) -> usize {
        self.0.as_bytes().len()
    }

    /// True for an empty envelope
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hand the buffer to the caller
    ///
    /// The pointer must be given back to [`ResponseBuffer::from_raw`]
    /// exactly once, or the memory leaks.
    pub fn into_raw(self) -> *mut c_char {
        self.0.into_raw()
    }

    /// Take back a buffer previously handed out by `into_raw`
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`ResponseBuffer::into_raw`] and must not have
    /// been reclaimed before. It must not be used after this call.
    pub unsafe fn from_raw(ptr: *mut c_char) -> Self {
        ResponseBuffer(CString::from_raw(ptr))
    }

    /// Borrow the C string
    pub fn as_c_str(&self) -> &CStr {
        &self.0
    }
}
