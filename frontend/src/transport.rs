//! Outbound transport seam.

use std::cell::RefCell;
use std::rc::Rc;

use mixconsole_types::PatchOp;

/// Fire-and-forget sink for outbound patches.
///
/// Implementations never queue or retry. If the channel is not open the
/// batch is dropped with a warning.
pub trait Transport {
    fn send(&self, ops: Vec<PatchOp>);
}

/// Transport that records every batch in memory.
///
/// Clones share the same log, so a test can keep one handle while the store
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    sent: Rc<RefCell<Vec<Vec<PatchOp>>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every batch sent so far, oldest first.
    pub fn sent(&self) -> Vec<Vec<PatchOp>> {
        self.sent.borrow().clone()
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<Vec<PatchOp>> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.sent.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.borrow().is_empty()
    }
}

impl Transport for MemoryTransport {
    fn send(&self, ops: Vec<PatchOp>) {
        tracing::trace!("Recording outbound patch ({} ops)", ops.len());
        self.sent.borrow_mut().push(ops);
    }
}
