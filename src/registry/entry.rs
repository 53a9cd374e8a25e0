//! Live stream entry
//!
//! A stream exists only while at least one session references it.

use crate::session::SessionId;

/// Entry for a single live stream in an application's stream table
#[derive(Debug, Clone)]
pub struct LiveStream {
    /// Stream name
    pub name: String,

    /// Member sessions in join order
    members: Vec<SessionId>,
}

impl LiveStream {
    pub(super) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Member sessions in join order
    pub fn members(&self) -> &[SessionId] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(super) fn join(&mut self, id: SessionId) {
        if !self.members.contains(&id) {
            self.members.push(id);
        }
    }

    /// Returns true if the session was a member
    pub(super) fn leave(&mut self, id: SessionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != id);
        self.members.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_order_preserved() {
        let mut stream = LiveStream::new("cam1");
        stream.join(SessionId(3));
        stream.join(SessionId(1));
        stream.join(SessionId(3));

        assert_eq!(stream.members(), &[SessionId(3), SessionId(1)]);
    }

    #[test]
    fn test_leave() {
        let mut stream = LiveStream::new("cam1");
        stream.join(SessionId(1));

        assert!(stream.leave(SessionId(1)));
        assert!(!stream.leave(SessionId(1)));
        assert!(stream.is_empty());
    }
}
