//! `record` section: start or stop a recorder on matching publishers

use crate::error::{ControlError, Result};

use super::context::RequestScope;
use super::dispatch::ControlResponse;
use super::filter::FilterRole;
use super::walk::{walk, Action, SessionMatch};

/// `GET .../record/{start|stop}?rec=<recorder>`
///
/// Returns the recorded file path, or 204 if no recorder reported one.
pub(crate) fn run(scope: &mut RequestScope<'_>) -> Result<ControlResponse> {
    scope.ctx.filter = FilterRole::Publisher;

    walk(scope, Action::Record, true)?;

    Ok(match scope.ctx.path.take() {
        Some(path) => ControlResponse::ok(path),
        None => ControlResponse::no_content(),
    })
}

pub(crate) fn apply(scope: &mut RequestScope<'_>, session: &SessionMatch) -> Result<()> {
    let request = scope.request;
    let rec = request.arg("rec").unwrap_or("");

    let slot = scope
        .recorder
        .find(session.app, rec)
        .ok_or(ControlError::RecorderNotFound)?;

    let result = match scope.ctx.method.as_str() {
        "start" => scope.recorder.open(session, slot),
        "stop" => scope.recorder.close(session, slot),
        _ => return Err(ControlError::UndefinedMethod),
    };

    let path = result.map_err(ControlError::RecorderError)?;

    tracing::debug!(
        session_id = %session.session,
        stream = %session.stream,
        recorder = rec,
        method = %scope.ctx.method,
        path = ?path,
        "Record control"
    );

    if let Some(path) = path.filter(|p| !p.is_empty()) {
        scope.ctx.path = Some(path);
    }

    Ok(())
}
