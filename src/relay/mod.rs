//! Relay targets and static pull scheduling
//!
//! Dynamic relay targets are queued on their application for the relay
//! subsystem. Static pulls are tracked in the [`StaticRelayRegistry`], each
//! backed by a [`ReconnectTask`] that a [`ReconnectScheduler`] keeps
//! re-attempting until the entry is stopped.

pub mod args;
pub mod reconnect;
pub mod static_pull;
pub mod target;

pub use args::{RelayArgParser, StandardRelayArgs};
pub use reconnect::{
    ReconnectScheduler, ReconnectTask, RelayConnector, StaticPull, TokioReconnectScheduler,
};
pub use static_pull::{EntryId, PendingReconnectEntry, StaticRelayRegistry};
pub use target::{RelayDirection, RelayKind, RelayQueues, RelayTarget, RelayUrl, RelayUrlError};
