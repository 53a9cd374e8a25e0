//! `drop` section: terminate matching sessions

use crate::error::Result;

use super::context::RequestScope;
use super::dispatch::ControlResponse;
use super::filter::FilterRole;
use super::walk::{walk, Action, SessionMatch};

/// `GET .../drop/{publisher|subscriber|client}`
///
/// Returns the number of dropped sessions.
pub(crate) fn run(scope: &mut RequestScope<'_>) -> Result<ControlResponse> {
    scope.ctx.filter = FilterRole::from_method(&scope.ctx.method)?;

    walk(scope, Action::Drop, true)?;

    Ok(ControlResponse::count(scope.ctx.count))
}

pub(crate) fn apply(scope: &mut RequestScope<'_>, session: &SessionMatch) {
    if let Some(state) = scope
        .host
        .tree()
        .server(session.app.server)
        .and_then(|srv| srv.session(session.session))
    {
        tracing::debug!(
            session_id = %session.session,
            stream = %session.stream,
            addr = %state.addr_text,
            static_relay = state.static_relay,
            connected_for = ?state.duration(),
            "Drop session"
        );
    }

    scope.host.release_static_relay(session);
    scope.host.finalize_session(session);

    scope.ctx.count += 1;
}
