//! `redirect` section: move matching sessions to another stream name

use crate::error::{ControlError, Result};
use crate::registry::StreamTarget;
use crate::session::SessionRole;

use super::context::RequestScope;
use super::dispatch::ControlResponse;
use super::filter::FilterRole;
use super::walk::{walk, Action, SessionMatch};

/// `GET .../redirect/{publisher|subscriber|client}?newname=<name>`
///
/// Returns the number of redirected sessions.
pub(crate) fn run(scope: &mut RequestScope<'_>) -> Result<ControlResponse> {
    scope.ctx.filter = FilterRole::from_method(&scope.ctx.method)?;

    walk(scope, Action::Redirect, true)?;

    Ok(ControlResponse::count(scope.ctx.count))
}

pub(crate) fn apply(scope: &mut RequestScope<'_>, session: &SessionMatch) -> Result<()> {
    let request = scope.request;
    let new_name = request
        .arg("newname")
        .ok_or(ControlError::NewNameNotSpecified)?;
    let new_name = truncate_name(new_name, scope.config.max_name_len.saturating_sub(1));

    // Counted even when the rebind below fails
    scope.ctx.count += 1;

    // Role must be read before close_stream
    let role = scope
        .host
        .tree()
        .server(session.app.server)
        .and_then(|srv| srv.session(session.session))
        .map(|s| s.role)
        .unwrap_or(session.role);

    scope.host.close_stream(session);

    let target = StreamTarget::from_name(new_name);

    tracing::info!(
        session_id = %session.session,
        from = %session.stream,
        to = %target.name,
        role = ?role,
        "Redirect session"
    );

    match role {
        SessionRole::Publisher => scope
            .host
            .publish(session, &target)
            .map_err(ControlError::PublishFailed),
        SessionRole::Subscriber => scope
            .host
            .play(session, &target)
            .map_err(ControlError::PlayFailed),
    }
}

/// Cut `name` to at most `max` bytes on a char boundary
fn truncate_name(name: &str, max: usize) -> &str {
    if name.len() <= max {
        return name;
    }

    let mut end = max;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("cam2", 255), "cam2");
        assert_eq!(truncate_name(&"a".repeat(300), 255).len(), 255);
        // 'é' is two bytes; never split it
        assert_eq!(truncate_name("aé", 2), "a");
    }
}
