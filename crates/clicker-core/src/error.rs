//! Error types for the clicker core.
//!
//! None of these ever reach a client. A [`DeliveryError`] turns into a
//! pruned connection, and a [`HubError`] on connect closes the socket.

use crate::connection::ConnectionId;

/// A counter value could not be handed to a connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The session owning the receiving half has gone away.
    #[error("connection {0} is closed")]
    Closed(ConnectionId),

    /// The session stopped draining its outbound queue.
    #[error("connection {0} outbound queue is full")]
    Full(ConnectionId),
}

impl DeliveryError {
    /// The connection the failed delivery was addressed to.
    pub const fn connection_id(&self) -> ConnectionId {
        match self {
            Self::Closed(id) | Self::Full(id) => *id,
        }
    }
}

/// Errors returned by [`ClickerHub`](crate::hub::ClickerHub) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HubError {
    /// The connection is already registered.
    #[error("connection {0} is already registered")]
    Duplicate(ConnectionId),

    /// The initial snapshot could not be delivered, so the connection was
    /// not registered.
    #[error("initial snapshot failed: {0}")]
    Delivery(#[from] DeliveryError),
}
