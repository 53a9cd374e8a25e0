//! `relay` section: start or stop pull/push relays
//!
//! Static pulls go to the static relay registry and are re-attempted by the
//! reconnect scheduler until stopped. Dynamic targets are queued once on
//! the resolved application.

use std::sync::Arc;

use percent_encoding::percent_decode_str;

use crate::error::{ControlError, Result};
use crate::relay::{
    PendingReconnectEntry, RelayDirection, RelayKind, RelayTarget, RelayUrl, RelayUrlError,
};

use super::context::RequestScope;
use super::dispatch::ControlResponse;
use super::filter::FilterRole;
use super::walk::{walk, Action, SessionMatch};

/// `GET .../relay/{start|stop}?name=<stream>&{pull|push}=<encoded rtmp url>`
pub(crate) fn run(scope: &mut RequestScope<'_>) -> Result<ControlResponse> {
    scope.ctx.filter = FilterRole::Publisher;

    if scope.ctx.method == "stop" {
        // Drop the local end of the relay first; failures here do not stop
        // the registry scan
        if let Err(e) = walk(scope, Action::Drop, true) {
            tracing::debug!(error = %e, "Relay stop: drop walk failed");
        }
    }

    walk(scope, Action::Relay, false)?;

    Ok(match scope.ctx.path.take() {
        Some(path) => ControlResponse::ok(path),
        None => ControlResponse::no_content(),
    })
}

pub(crate) fn apply(scope: &mut RequestScope<'_>, session: Option<&SessionMatch>) -> Result<()> {
    let start = match scope.ctx.method.as_str() {
        "start" => true,
        "stop" => false,
        _ => return Err(ControlError::UndefinedMethod),
    };

    let identity = scope.ctx.app.ok_or(ControlError::ApplicationNotFound)?;
    let request = scope.request;
    let name = request.arg("name").unwrap_or("").to_string();

    if !start {
        if let Some(m) = session {
            super::drop::apply(scope, m);
        }

        let stopped = scope.relays.stop(identity, &name);
        tracing::info!(
            app = %identity,
            name = %name,
            stopped = stopped.len(),
            remaining = scope.relays.len(),
            "Relay stop"
        );
        return Ok(());
    }

    let (direction, raw) = if let Some(raw) = request.arg("push") {
        (RelayDirection::Push, raw)
    } else if let Some(raw) = request.arg("pull") {
        (RelayDirection::Pull, raw)
    } else {
        return Err(ControlError::UnknownRelayType);
    };

    let decoded = percent_decode_str(raw).decode_utf8().map_err(|e| {
        tracing::info!(
            direction = %direction,
            url = raw,
            error = %e,
            "Relay rejected: url is not utf-8"
        );
        ControlError::InvalidRelayUrl
    })?;

    let url = RelayUrl::parse(&decoded, scope.config.default_relay_port).map_err(|e| {
        match e {
            RelayUrlError::Scheme => tracing::info!(
                direction = %direction,
                url = %decoded,
                "Relay rejected: not an rtmp url"
            ),
            RelayUrlError::Malformed(ref reason) => tracing::info!(
                direction = %direction,
                url = %decoded,
                reason = %reason,
                "Relay rejected: url parse failed"
            ),
        }
        ControlError::InvalidRelayUrl
    })?;

    let mut target = RelayTarget::new(name, url, direction, identity);

    if target.url.uri.is_empty() {
        tracing::info!(direction = %direction, url = %decoded, "Relay rejected: no remote url");
        return Err(ControlError::NoRelayUrl);
    }

    let kind = scope.relay_args.decompose(&mut target).map_err(|e| {
        tracing::info!(
            direction = %direction,
            uri = %target.url.uri,
            error = %e,
            "Relay rejected: bad relay args"
        );
        ControlError::InvalidRelayArgs
    })?;

    match (kind, direction) {
        (RelayKind::Static, RelayDirection::Push) => {
            tracing::error!(url = %target.url, "Static push is not allowed");
            Err(ControlError::StaticPushNotAllowed)
        }
        (RelayKind::Static, RelayDirection::Pull) if target.name.is_empty() => {
            tracing::error!(url = %target.url, "Stream name missing in static pull");
            Err(ControlError::StreamNameMissingForStaticPull)
        }
        (RelayKind::Static, RelayDirection::Pull) => {
            scope.relays.compact();

            let entry = PendingReconnectEntry::new(Arc::new(target), identity);
            let task = Arc::clone(&entry.task);

            tracing::info!(
                app = %identity,
                name = %entry.target.name,
                url = %entry.target.url,
                "Static pull started"
            );

            scope.relays.append(entry);
            scope.scheduler.schedule(task);
            Ok(())
        }
        (RelayKind::Dynamic, _) => {
            let application = scope
                .host
                .tree_mut()
                .application_mut(identity)
                .ok_or(ControlError::ApplicationNotFound)?;

            tracing::info!(
                app = %application.name,
                name = %target.name,
                url = %target.url,
                direction = %direction,
                "Dynamic relay queued"
            );

            application.relays.enqueue(Arc::new(target));
            Ok(())
        }
    }
}
