//! Real-time broadcast counter for the Duck Games clicker.
//!
//! Every connected client shares one global click counter. Clicks are
//! serialized against that counter and the new value is pushed to every
//! live connection.
//!
//! # Modules
//!
//! - [`counter`] -- [`SharedCounter`], the process-wide monotonic counter.
//! - [`connection`] -- [`Connection`] handles and their [`ConnectionId`]s.
//! - [`registry`] -- [`ConnectionRegistry`], the set of live connections.
//! - [`hub`] -- [`ClickerHub`], which owns the counter and registry and
//!   runs the broadcast engine.
//! - [`error`] -- Delivery and hub error types.
//!
//! # Architecture
//!
//! ```text
//! session --connect--> ClickerHub --register--> ConnectionRegistry
//!         --click----> ClickerHub --increment-> SharedCounter
//!                                 --deliver---> every Connection (mpsc)
//! ```
//!
//! A connection is an outbound `mpsc` sender. The session that owns the
//! receiving half writes each value to the socket. Delivery never blocks:
//! a closed or full channel counts as a dead peer and the hub prunes it.

pub mod connection;
pub mod counter;
pub mod error;
pub mod hub;
pub mod registry;

// Re-export primary types for convenience.
pub use connection::{Connection, ConnectionId, DEFAULT_OUTBOUND_CAPACITY};
pub use counter::SharedCounter;
pub use error::{DeliveryError, HubError};
pub use hub::{BroadcastReport, ClickerHub};
pub use registry::ConnectionRegistry;
