//! Event emitter port for reconciliation progress.

use crate::events::RuntimeEvent;

/// Receives runtime events. Implementations must not block.
pub trait RuntimeEventEmitter: Send + Sync {
    fn emit(&self, event: RuntimeEvent);
}

/// Discards every event. Used by the CLI and by tests that don't observe
/// progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    pub const fn new() -> Self {
        Self
    }
}

impl RuntimeEventEmitter for NoopEmitter {
    fn emit(&self, _event: RuntimeEvent) {}
}
