//! Collaborator interfaces the control plane drives
//!
//! Session termination, stream rebinding and recording belong to the RTMP
//! core. All of them complete synchronously relative to the control request.

use crate::error::HostError;
use crate::registry::{AppIdentity, ServerTree, StreamTarget};

use super::walk::SessionMatch;

/// Live session host: the session tree plus stream lifecycle primitives
pub trait StreamHost {
    /// Read-only view walked by control requests
    fn tree(&self) -> &ServerTree;

    /// Mutable view, used to queue dynamic relay targets on an application
    fn tree_mut(&mut self) -> &mut ServerTree;

    /// Clear the session's "keep as static relay source" marker
    fn release_static_relay(&mut self, session: &SessionMatch) {
        if let Some(s) = self
            .tree_mut()
            .server_mut(session.app.server)
            .and_then(|srv| srv.session_mut(session.session))
        {
            s.static_relay = false;
        }
    }

    /// Terminate the session
    fn finalize_session(&mut self, session: &SessionMatch);

    /// Detach the session from its current stream
    fn close_stream(&mut self, session: &SessionMatch);

    /// Publish the session under a new stream name
    fn publish(&mut self, session: &SessionMatch, target: &StreamTarget) -> Result<(), HostError>;

    /// Play a new stream name on the session
    fn play(&mut self, session: &SessionMatch, target: &StreamTarget) -> Result<(), HostError>;
}

/// Index of a configured recorder within an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecorderSlot(pub usize);

/// Recording subsystem
pub trait RecordControl {
    /// Resolve a recorder by name; the empty name is the default recorder
    fn find(&self, app: AppIdentity, name: &str) -> Option<RecorderSlot>;

    /// Start recording; returns the output path if one was opened
    fn open(
        &mut self,
        session: &SessionMatch,
        slot: RecorderSlot,
    ) -> Result<Option<String>, HostError>;

    /// Stop recording; returns the path of the closed file, if any
    fn close(
        &mut self,
        session: &SessionMatch,
        slot: RecorderSlot,
    ) -> Result<Option<String>, HostError>;
}
