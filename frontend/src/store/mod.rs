//! Mixer state store.
//!
//! Owns the mirrored [`MixerDocument`] and is the single mutator for it.
//! Inbound server updates go through the codec, local writes are applied
//! optimistically and then sent, either immediately or through the
//! per-path [`Dispatcher`].

mod actions;

use std::sync::Arc;
use std::time::Duration;

use instant::Instant;
use mixconsole_types::{ConnectionStatus, MixerDocument, ServerUpdate};

use crate::codec;
use crate::throttle::{Clock, Dispatcher, SystemClock, DEFAULT_WINDOW};
use crate::transport::Transport;

/// Handle returned by [`MixerStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    notify: Box<dyn FnMut(&MixerDocument)>,
}

pub struct MixerStore {
    doc: Arc<MixerDocument>,
    dispatcher: Dispatcher,
    transport: Box<dyn Transport>,
    clock: Box<dyn Clock>,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
}

impl MixerStore {
    /// Store with a default document, the default throttle window and the
    /// wall clock.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            doc: Arc::new(MixerDocument::new()),
            dispatcher: Dispatcher::new(DEFAULT_WINDOW),
            transport: Box::new(transport),
            clock: Box::new(SystemClock),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.dispatcher = Dispatcher::new(window);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// Current document version.
    pub fn document(&self) -> &Arc<MixerDocument> {
        &self.doc
    }

    pub fn select<T>(&self, selector: impl FnOnce(&MixerDocument) -> T) -> T {
        selector(&self.doc)
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.doc.connection_status
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    // ── Subscriptions ───────────────────────────────────────────────

    /// Call `callback` with the selected slice whenever it changes.
    pub fn subscribe<T, S, F>(&mut self, selector: S, mut callback: F) -> SubscriptionId
    where
        T: PartialEq + 'static,
        S: Fn(&MixerDocument) -> T + 'static,
        F: FnMut(&T) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;

        let mut last = selector(&self.doc);
        self.subscribers.push(Subscriber {
            id,
            notify: Box::new(move |doc| {
                let next = selector(doc);
                if next != last {
                    callback(&next);
                    last = next;
                }
            }),
        });
        id
    }

    /// Returns `false` if the handle was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    // ── Inbound ─────────────────────────────────────────────────────

    /// Apply a server update. Returns `true` if the document changed.
    ///
    /// A malformed patch is logged and leaves the document untouched.
    pub fn apply_server_update(&mut self, update: ServerUpdate) -> bool {
        let description = update.description();
        let next = match update {
            ServerUpdate::Patch(ops) => match codec::apply_patch(&self.doc, &ops) {
                Ok(next) => next,
                Err(e) => {
                    tracing::error!("Rejected server {}: {}", description, e);
                    return false;
                }
            },
            ServerUpdate::FullState(payload) => codec::apply_full_state(&self.doc, *payload),
        };

        let changed = self.commit(next);
        if !changed {
            tracing::debug!("Server {} changed nothing", description);
        }
        changed
    }

    /// Record a transport status transition. Never sent to the server.
    pub fn set_connection_status(&mut self, status: ConnectionStatus) {
        if self.doc.connection_status == status {
            return;
        }
        tracing::info!("Connection status: {}", status.description());
        let mut next = MixerDocument::clone(&self.doc);
        next.connection_status = status;
        self.commit(Arc::new(next));
    }

    // ── Timers ──────────────────────────────────────────────────────

    /// Flush throttle timers that are due.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.dispatcher.poll(now, self.transport.as_ref());
    }

    /// When [`MixerStore::tick`] next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.dispatcher.next_deadline()
    }

    /// Cancel every pending throttle flush.
    pub fn reset_session(&mut self) {
        self.dispatcher.reset();
    }

    /// Swap in a new document version and notify subscribers. Returns
    /// `false` when `next` is the current version.
    fn commit(&mut self, next: Arc<MixerDocument>) -> bool {
        if Arc::ptr_eq(&self.doc, &next) {
            return false;
        }
        self.doc = next;
        let doc = Arc::clone(&self.doc);
        for subscriber in self.subscribers.iter_mut() {
            (subscriber.notify)(&doc);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::transport::MemoryTransport;
    use mixconsole_types::{InferencingState, PatchOp};

    fn store() -> (MixerStore, MemoryTransport) {
        let transport = MemoryTransport::new();
        (MixerStore::new(transport.clone()), transport)
    }

    #[test]
    fn test_no_op_update_keeps_version() {
        let (mut store, _) = store();
        let before = Arc::clone(store.document());

        let changed = store.apply_server_update(ServerUpdate::Patch(vec![PatchOp::replace(
            "/channels/1/muted",
            false,
        )]));
        assert!(!changed);
        assert!(Arc::ptr_eq(&before, store.document()));
    }

    #[test]
    fn test_malformed_patch_keeps_document() {
        let (mut store, _) = store();
        let before = Arc::clone(store.document());

        let changed = store.apply_server_update(ServerUpdate::Patch(vec![
            PatchOp::replace("/channels/1/muted", true),
            PatchOp::replace("/channels/1/nope", true),
        ]));
        assert!(!changed);
        assert!(Arc::ptr_eq(&before, store.document()));
    }

    #[test]
    fn test_subscribers_see_only_slice_changes() {
        let (mut store, _) = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = store.subscribe(
            |doc| doc.inferencing_state,
            move |state| sink.borrow_mut().push(*state),
        );

        store.apply_server_update(ServerUpdate::Patch(vec![PatchOp::replace(
            "/channels/4/panning",
            0.1,
        )]));
        store.set_connection_status(ConnectionStatus::Connected);
        assert!(seen.borrow().is_empty());

        store.apply_server_update(ServerUpdate::Patch(vec![PatchOp::replace(
            "/inferencing_state",
            "recording",
        )]));
        assert_eq!(*seen.borrow(), vec![InferencingState::Recording]);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.apply_server_update(ServerUpdate::Patch(vec![PatchOp::replace(
            "/inferencing_state",
            "idle",
        )]));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_connection_status_is_local() {
        let (mut store, transport) = store();
        store.set_connection_status(ConnectionStatus::Connecting);
        store.set_connection_status(ConnectionStatus::Connected);

        assert_eq!(store.connection_status(), ConnectionStatus::Connected);
        assert!(transport.is_empty());

        let mut payload = MixerDocument::new();
        payload.hw_init_ready = true;
        store.apply_server_update(ServerUpdate::FullState(Box::new(payload)));
        assert_eq!(store.connection_status(), ConnectionStatus::Connected);
        assert!(store.document().hw_init_ready);
    }
}
