use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

/// Single-slot mailbox for the test-control channel. A write replaces any
/// unconsumed prior document; one consuming read clears it. `arm` and
/// `consume` are atomic, no reader can observe a half-armed state.
#[derive(Debug, Default, Clone)]
pub struct CommandSlot {
    inner: Arc<Mutex<Option<Value>>>,
}

impl CommandSlot {
    pub fn arm(&self, document: Value) {
        *self.inner.lock() = Some(document);
    }

    pub fn consume(&self) -> Option<Value> {
        self.inner.lock().take()
    }

    pub fn peek(&self) -> Option<Value> {
        self.inner.lock().clone()
    }
}
