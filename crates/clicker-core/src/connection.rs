//! Connection handles held by the registry.
//!
//! A [`Connection`] is the sending half of a bounded outbound queue. The
//! session task that accepted the socket owns the receiving half and
//! writes every value it receives to the peer as a decimal text frame.
//! When the registry drops the last [`Connection`] clone, the session's
//! receiver closes and the session ends.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use crate::error::DeliveryError;

/// Default capacity of a connection's outbound queue.
///
/// A peer that falls this many values behind is treated as dead.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 64;

/// Unique identifier for an accepted connection (UUID v7, time-ordered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to one connected peer.
///
/// Cheap to clone. All clones address the same outbound queue.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    tx: mpsc::Sender<u64>,
}

impl Connection {
    /// Create a connection handle and the receiver its session drains.
    ///
    /// A `capacity` of zero is bumped to one, the minimum `mpsc` allows.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<u64>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                id: ConnectionId::new(),
                tx,
            },
            rx,
        )
    }

    /// This connection's identifier.
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Whether the receiving session is still around.
    pub fn is_alive(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queue a counter value for this peer without waiting.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::Closed`] if the session is gone,
    /// [`DeliveryError::Full`] if it stopped draining its queue.
    pub fn deliver(&self, value: u64) -> Result<(), DeliveryError> {
        self.tx.try_send(value).map_err(|e| match e {
            TrySendError::Closed(_) => DeliveryError::Closed(self.id),
            TrySendError::Full(_) => DeliveryError::Full(self.id),
        })
    }
}
