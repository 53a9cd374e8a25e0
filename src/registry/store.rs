//! Server tree implementation
//!
//! Servers own applications, applications own a hashed table of live
//! streams, streams list their member sessions in join order. Sessions
//! themselves are owned by their server, keyed by connection number.

use std::collections::HashMap;

use crate::control::hooks::StreamHost;
use crate::control::walk::SessionMatch;
use crate::error::HostError;
use crate::relay::RelayQueues;
use crate::server::ControlConfig;
use crate::session::{Session, SessionId, SessionRole};

use super::entry::LiveStream;
use super::key::{AppIdentity, StreamKey, StreamTarget};

/// Bucket hash for stream names (multiplicative, base 31)
pub fn stream_hash(name: &str) -> usize {
    name.bytes()
        .fold(0usize, |key, c| key.wrapping_mul(31).wrapping_add(c as usize))
}

/// Hashed table of live streams
///
/// Iteration order is bucket order, then insertion order within a bucket.
#[derive(Debug, Clone)]
pub struct StreamTable {
    buckets: Vec<Vec<LiveStream>>,
}

impl StreamTable {
    /// Create a table with the given number of buckets (at least one)
    pub fn new(buckets: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); buckets.max(1)],
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_index(&self, name: &str) -> usize {
        stream_hash(name) % self.buckets.len()
    }

    /// The bucket a name hashes into; entries may carry other names
    pub fn bucket(&self, name: &str) -> &[LiveStream] {
        &self.buckets[self.bucket_index(name)]
    }

    /// All streams in bucket order
    pub fn iter(&self) -> impl Iterator<Item = &LiveStream> {
        self.buckets.iter().flat_map(|bucket| bucket.iter())
    }

    pub fn get(&self, name: &str) -> Option<&LiveStream> {
        self.bucket(name).iter().find(|s| s.name == name)
    }

    fn get_or_create(&mut self, name: &str) -> &mut LiveStream {
        let idx = self.bucket_index(name);
        let bucket = &mut self.buckets[idx];

        let pos = match bucket.iter().position(|s| s.name == name) {
            Some(pos) => pos,
            None => {
                bucket.push(LiveStream::new(name));
                tracing::debug!(stream = name, bucket = idx, "Stream created");
                bucket.len() - 1
            }
        };

        &mut bucket[pos]
    }

    /// Remove a session from a stream, destroying the stream if it empties
    fn leave(&mut self, name: &str, id: SessionId) {
        let idx = self.bucket_index(name);
        let bucket = &mut self.buckets[idx];

        if let Some(pos) = bucket.iter().position(|s| s.name == name) {
            bucket[pos].leave(id);
            if bucket[pos].is_empty() {
                bucket.remove(pos);
                tracing::debug!(stream = name, "Stream destroyed, last session left");
            }
        }
    }

    /// Get total number of streams
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named container of live streams and relay targets
#[derive(Debug)]
pub struct Application {
    /// Application name (e.g., "live")
    pub name: String,

    /// Live streams
    pub streams: StreamTable,

    /// Dynamic relay targets waiting for the relay subsystem
    pub relays: RelayQueues,
}

impl Application {
    pub fn new(name: impl Into<String>, buckets: usize) -> Self {
        Self {
            name: name.into(),
            streams: StreamTable::new(buckets),
            relays: RelayQueues::default(),
        }
    }
}

/// One logical server instance
#[derive(Debug)]
pub struct ServerContext {
    /// Zero-based server index
    pub index: usize,

    /// Applications in configuration order
    pub applications: Vec<Application>,

    sessions: HashMap<SessionId, Session>,

    buckets: usize,
}

impl ServerContext {
    fn new(index: usize, buckets: usize) -> Self {
        Self {
            index,
            applications: Vec::new(),
            sessions: HashMap::new(),
            buckets,
        }
    }

    /// Register an application, returning its identity
    pub fn add_application(&mut self, name: impl Into<String>) -> AppIdentity {
        self.applications.push(Application::new(name, self.buckets));
        AppIdentity::new(self.index, self.applications.len() - 1)
    }

    pub fn application(&self, index: usize) -> Option<&Application> {
        self.applications.get(index)
    }

    pub fn application_mut(&mut self, index: usize) -> Option<&mut Application> {
        self.applications.get_mut(index)
    }

    fn application_by_name_mut(&mut self, name: &str) -> Option<&mut Application> {
        self.applications.iter_mut().find(|a| a.name == name)
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn session_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// Get number of connected sessions (bound or not)
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Register a freshly connected, unbound session
    pub fn connect(&mut self, session: Session) {
        tracing::debug!(server = self.index, session_id = %session.id, "Session connected");
        self.sessions.insert(session.id, session);
    }

    /// Bind a session to `app/stream` with the given role
    pub fn attach(
        &mut self,
        id: SessionId,
        app: &str,
        stream: &str,
        role: SessionRole,
    ) -> Result<(), HostError> {
        if !self.sessions.contains_key(&id) {
            return Err(HostError::SessionNotFound(id.0));
        }

        let key = StreamKey::new(app, stream);

        if role == SessionRole::Publisher && self.has_publisher(&key) {
            return Err(HostError::AlreadyPublishing(key.to_string()));
        }

        let application = self
            .application_by_name_mut(app)
            .ok_or_else(|| HostError::ApplicationNotFound(app.to_string()))?;
        application.streams.get_or_create(stream).join(id);

        if let Some(session) = self.sessions.get_mut(&id) {
            session.bind(key, role);
        }

        Ok(())
    }

    /// Unbind a session from its stream; the session stays connected
    pub fn detach(&mut self, id: SessionId) -> Option<StreamKey> {
        let key = self.sessions.get_mut(&id)?.unbind()?;

        if let Some(application) = self.application_by_name_mut(&key.app) {
            application.streams.leave(&key.name, id);
        }

        Some(key)
    }

    /// Detach and forget a session
    pub fn disconnect(&mut self, id: SessionId) -> Option<Session> {
        self.detach(id);
        let session = self.sessions.remove(&id);

        if session.is_some() {
            tracing::debug!(server = self.index, session_id = %id, "Session disconnected");
        }

        session
    }

    fn has_publisher(&self, key: &StreamKey) -> bool {
        self.applications
            .iter()
            .find(|a| a.name == key.app)
            .and_then(|a| a.streams.get(&key.name))
            .map(|stream| {
                stream.members().iter().any(|id| {
                    self.sessions
                        .get(id)
                        .map(Session::is_publishing)
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false)
    }
}

/// Root of the session registry view: every server instance
#[derive(Debug)]
pub struct ServerTree {
    servers: Vec<ServerContext>,
    buckets: usize,
}

impl ServerTree {
    /// Create an empty tree; applications get `buckets` stream buckets
    pub fn new(buckets: usize) -> Self {
        Self {
            servers: Vec::new(),
            buckets: buckets.max(1),
        }
    }

    /// Create an empty tree sized by `config.stream_buckets`
    pub fn from_config(config: &ControlConfig) -> Self {
        Self::new(config.stream_buckets)
    }

    /// Add a server instance, returning its index
    pub fn add_server(&mut self) -> usize {
        let index = self.servers.len();
        self.servers.push(ServerContext::new(index, self.buckets));
        index
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    pub fn server(&self, index: usize) -> Option<&ServerContext> {
        self.servers.get(index)
    }

    pub fn server_mut(&mut self, index: usize) -> Option<&mut ServerContext> {
        self.servers.get_mut(index)
    }

    pub fn application(&self, id: AppIdentity) -> Option<&Application> {
        self.server(id.server)?.application(id.app)
    }

    pub fn application_mut(&mut self, id: AppIdentity) -> Option<&mut Application> {
        self.server_mut(id.server)?.application_mut(id.app)
    }

    fn rebind(
        &mut self,
        m: &SessionMatch,
        target: &StreamTarget,
        role: SessionRole,
    ) -> Result<(), HostError> {
        let server = self
            .server_mut(m.app.server)
            .ok_or(HostError::SessionNotFound(m.session.0))?;
        let app = server
            .application(m.app.app)
            .map(|a| a.name.clone())
            .ok_or_else(|| HostError::ApplicationNotFound(m.app.to_string()))?;

        server.attach(m.session, &app, &target.name, role)
    }
}

impl Default for ServerTree {
    fn default() -> Self {
        Self::from_config(&ControlConfig::default())
    }
}

impl StreamHost for ServerTree {
    fn tree(&self) -> &ServerTree {
        self
    }

    fn tree_mut(&mut self) -> &mut ServerTree {
        self
    }

    fn finalize_session(&mut self, m: &SessionMatch) {
        if let Some(server) = self.server_mut(m.app.server) {
            server.disconnect(m.session);
        }
    }

    fn close_stream(&mut self, m: &SessionMatch) {
        if let Some(server) = self.server_mut(m.app.server) {
            server.detach(m.session);
        }
    }

    fn publish(&mut self, m: &SessionMatch, target: &StreamTarget) -> Result<(), HostError> {
        self.rebind(m, target, SessionRole::Publisher)
    }

    fn play(&mut self, m: &SessionMatch, target: &StreamTarget) -> Result<(), HostError> {
        self.rebind(m, target, SessionRole::Subscriber)
    }
}
