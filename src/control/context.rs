//! Per-request control state
//!
//! Everything a control request resolves or accumulates lives here and is
//! dropped with the response; nothing is recovered from ambient globals.

use crate::registry::AppIdentity;
use crate::relay::{ReconnectScheduler, RelayArgParser, StaticRelayRegistry};
use crate::server::ControlConfig;

use super::filter::FilterRole;
use super::hooks::{RecordControl, StreamHost};
use super::request::ControlRequest;
use super::walk::SessionMatch;

/// Scratch state of one control request
#[derive(Debug, Clone, Default)]
pub struct ControlRequestContext {
    /// Method segment of the path
    pub method: String,

    /// Role filter chosen by the section
    pub filter: FilterRole,

    /// Sessions matched by the most recent walk
    pub sessions: Vec<SessionMatch>,

    /// Sessions affected so far
    pub count: usize,

    /// Path reported back to the caller (recording output)
    pub path: Option<String>,

    /// Application resolved by the most recent walk
    pub app: Option<AppIdentity>,
}

impl ControlRequestContext {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Default::default()
        }
    }
}

/// Request context plus everything a handler may act through
pub(crate) struct RequestScope<'r> {
    pub request: &'r ControlRequest,
    pub ctx: ControlRequestContext,
    pub config: &'r ControlConfig,
    pub host: &'r mut dyn StreamHost,
    pub recorder: &'r mut dyn RecordControl,
    pub relay_args: &'r dyn RelayArgParser,
    pub scheduler: &'r dyn ReconnectScheduler,
    pub relays: &'r mut StaticRelayRegistry,
}
