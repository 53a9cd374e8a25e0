//! Session state as seen by the control plane

pub mod state;

pub use state::{Session, SessionId, SessionRole};
