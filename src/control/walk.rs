//! Session tree walker
//!
//! Descends server → application → stream → session, narrowing by the
//! request's `srv`, `app` and `name` arguments and the session filter.
//! Finding matches is a lazy, read-only pass over the tree; acting on them
//! happens afterwards, against the scratch list in the request context, so
//! handlers can terminate sessions without disturbing the traversal.

use crate::error::{ControlError, Result};
use crate::registry::{AppIdentity, Application, LiveStream, ServerContext, ServerTree};
use crate::session::{SessionId, SessionRole};

use super::context::RequestScope;
use super::filter::SessionFilter;
use super::request::ControlRequest;
use super::{drop, record, redirect, relay};

/// A session selected by a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMatch {
    /// Server and application the session was found under
    pub app: AppIdentity,
    /// Stream the session was found on
    pub stream: String,
    pub session: SessionId,
    /// Role at the time of the walk
    pub role: SessionRole,
}

/// Tree narrowing taken from the request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WalkScope {
    /// Server index; None when `srv` did not parse
    pub server: Option<usize>,
    /// Exact application name; absent or empty visits every application
    pub app: Option<String>,
    /// Exact stream name; only its hash bucket is scanned
    pub name: Option<String>,
}

impl WalkScope {
    pub fn from_request(request: &ControlRequest) -> Self {
        Self {
            server: match request.arg("srv") {
                Some(srv) => srv.parse().ok(),
                None => Some(0),
            },
            app: request
                .arg("app")
                .filter(|app| !app.is_empty())
                .map(str::to_string),
            name: request.arg("name").map(str::to_string),
        }
    }
}

/// One walk over a resolved server
#[derive(Debug, Clone, Copy)]
pub struct Walk<'a> {
    server: &'a ServerContext,
    scope: &'a WalkScope,
    filter: &'a SessionFilter,
}

impl<'a> Walk<'a> {
    /// Resolve the server; fails if the index is out of range
    pub fn new(
        tree: &'a ServerTree,
        scope: &'a WalkScope,
        filter: &'a SessionFilter,
    ) -> Result<Self> {
        let server = scope
            .server
            .and_then(|index| tree.server(index))
            .ok_or(ControlError::ServerIndexOutOfRange)?;

        Ok(Self {
            server,
            scope,
            filter,
        })
    }

    pub fn server(self) -> &'a ServerContext {
        self.server
    }

    /// Applications in scope, in registration order
    pub fn applications(self) -> impl Iterator<Item = (AppIdentity, &'a Application)> + 'a {
        let server = self.server;
        let wanted = self.scope.app.as_deref();

        server
            .applications
            .iter()
            .enumerate()
            .filter(move |(_, app)| wanted.map_or(true, |name| app.name == name))
            .map(move |(index, app)| (AppIdentity::new(server.index, index), app))
    }

    /// The application a request-scoped action binds to: the last one visited
    pub fn resolved_application(self) -> Option<AppIdentity> {
        self.applications().last().map(|(id, _)| id)
    }

    /// Matching sessions in visitation order
    ///
    /// Applications in registration order, streams in bucket then chain
    /// order, sessions in join order. Single pass, not restartable.
    pub fn sessions(self) -> impl Iterator<Item = SessionMatch> + 'a {
        let server = self.server;
        let filter = self.filter;
        let name = self.scope.name.as_deref();

        self.applications().flat_map(move |(id, app)| {
            streams_in_scope(app, name).flat_map(move |stream| {
                stream.members().iter().filter_map(move |sid| {
                    let session = server.session(*sid)?;
                    if !filter.matches(session) {
                        return None;
                    }

                    Some(SessionMatch {
                        app: id,
                        stream: stream.name.clone(),
                        session: *sid,
                        role: session.role,
                    })
                })
            })
        })
    }
}

fn streams_in_scope<'t>(
    app: &'t Application,
    name: Option<&'t str>,
) -> Box<dyn Iterator<Item = &'t LiveStream> + 't> {
    match name {
        // Bucket entries may hash-collide, so confirm the exact name
        Some(name) => Box::new(app.streams.bucket(name).iter().filter(move |s| s.name == name)),
        None => Box::new(app.streams.iter()),
    }
}

/// Action applied to walk results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Record,
    Drop,
    Redirect,
    Relay,
}

impl Action {
    fn apply(self, scope: &mut RequestScope<'_>, session: Option<&SessionMatch>) -> Result<()> {
        match (self, session) {
            (Action::Relay, session) => relay::apply(scope, session),
            (Action::Record, Some(m)) => record::apply(scope, m),
            (Action::Drop, Some(m)) => {
                drop::apply(scope, m);
                Ok(())
            }
            (Action::Redirect, Some(m)) => redirect::apply(scope, m),
            (_, None) => Ok(()),
        }
    }
}

/// Walk the tree and apply `action`
///
/// With `per_session`, the action runs once per match and the first error
/// stops the walk. Otherwise it runs exactly once, with no session, after
/// the application has been resolved.
pub(crate) fn walk(scope: &mut RequestScope<'_>, action: Action, per_session: bool) -> Result<()> {
    let walk_scope = WalkScope::from_request(scope.request);
    let filter = SessionFilter::from_request(scope.request, scope.ctx.filter);

    {
        let walk = Walk::new(scope.host.tree(), &walk_scope, &filter)?;

        scope.ctx.app = walk.resolved_application();
        scope.ctx.sessions.clear();
        scope.ctx.sessions.extend(walk.sessions());
    }

    tracing::debug!(
        action = ?action,
        server = ?walk_scope.server,
        app = ?walk_scope.app,
        name = ?walk_scope.name,
        matched = scope.ctx.sessions.len(),
        "Control walk"
    );

    if !per_session {
        return action.apply(scope, None);
    }

    let matches = std::mem::take(&mut scope.ctx.sessions);
    let result = matches.iter().try_for_each(|m| action.apply(scope, Some(m)));
    scope.ctx.sessions = matches;

    result
}
