//! Live session state
//!
//! One connected client as seen by the control plane. The session is created
//! and destroyed by the RTMP core; the control plane only reads it and asks
//! the host to terminate or rebind it.

use std::fmt;
use std::time::Instant;

use crate::registry::StreamKey;

/// Connection number assigned by the RTMP core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a session on its stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    /// Session is publishing (sending media)
    Publisher,
    /// Session is playing (receiving media)
    Subscriber,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct Session {
    /// Connection number
    pub id: SessionId,

    /// Remote address as text, e.g. `"10.0.0.7"`
    pub addr_text: String,

    /// Connection start time
    pub connected_at: Instant,

    /// Last role the session held; survives close-stream
    pub role: SessionRole,

    /// Stream the session is bound to (None between close-stream and rebind)
    pub stream: Option<StreamKey>,

    /// Session is the local end of a static pull relay
    pub static_relay: bool,
}

impl Session {
    /// Create an unbound session
    pub fn new(id: u64, addr_text: impl Into<String>, role: SessionRole) -> Self {
        Self {
            id: SessionId(id),
            addr_text: addr_text.into(),
            connected_at: Instant::now(),
            role,
            stream: None,
            static_relay: false,
        }
    }

    /// Mark the session as the local end of a static relay
    pub fn with_static_relay(mut self) -> Self {
        self.static_relay = true;
        self
    }

    /// Check if the session is publishing
    pub fn is_publishing(&self) -> bool {
        self.role == SessionRole::Publisher
    }

    /// Check if the session is bound to a stream
    pub fn is_bound(&self) -> bool {
        self.stream.is_some()
    }

    /// Bind to a stream with the given role
    pub fn bind(&mut self, key: StreamKey, role: SessionRole) {
        self.stream = Some(key);
        self.role = role;
    }

    /// Detach from the current stream, keeping the role marker
    pub fn unbind(&mut self) -> Option<StreamKey> {
        self.stream.take()
    }

    /// Get session duration
    pub fn duration(&self) -> std::time::Duration {
        self.connected_at.elapsed()
    }
}
