//! Listener handles.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use crate::view::AggregateView;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// An opaque reference to a remote observer of a user's aggregate view.
///
/// The handle wraps an unbounded channel endpoint; the observer holds the
/// receiving side. Dropping the receiver makes the channel dead, which is
/// detected at delivery time and leads to the handle being pruned from the
/// registry.
#[derive(Debug, Clone)]
pub struct ListenerHandle {
    id: ListenerId,
    tx: mpsc::UnboundedSender<AggregateView>,
}

impl ListenerHandle {
    /// Create a handle and the receiver the observer reads updates from.
    pub fn connect() -> (Self, mpsc::UnboundedReceiver<AggregateView>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = Self {
            id: ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed)),
            tx,
        };
        (handle, rx)
    }

    /// The handle's identity.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Try to push a view to the observer.
    ///
    /// Never blocks. Returns `false` when the observer's channel is dead.
    pub fn try_deliver(&self, view: AggregateView) -> bool {
        self.tx.send(view).is_ok()
    }
}
