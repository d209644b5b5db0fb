//! Request id generation
//!
//! Each client owns one [`IdGenerator`]. The counter starts at 0 and is
//! incremented before use, so the first id issued is 1 and every later id is
//! exactly one more than the previous. Ids are never handed out twice, even
//! when the call that consumed one fails.

use sockrpc_core::RequestId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic source of request ids
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    /// Create a generator whose first id is 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next id
    pub fn next_id(&self) -> RequestId {
        let id = self.last.fetch_add(1, Ordering::SeqCst).wrapping_add(1);
        // Only reachable after 2^64 calls on one client.
        RequestId::new(id).unwrap_or(RequestId::FIRST)
    }

    /// The most recently issued id, or 0 if none was issued yet
    pub fn last_issued(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}
