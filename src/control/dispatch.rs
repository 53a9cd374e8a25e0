//! Control request dispatcher
//!
//! Routes `.../<section>/<method>` to the matching action and turns the
//! outcome into a status and body.

use bytes::Bytes;
use http::StatusCode;

use crate::error::ControlError;
use crate::relay::{ReconnectScheduler, RelayArgParser, StaticRelayRegistry};
use crate::server::{ControlConfig, ControlSections};

use super::context::{ControlRequestContext, RequestScope};
use super::hooks::{RecordControl, StreamHost};
use super::request::ControlRequest;
use super::{drop, record, redirect, relay};

/// Control verb group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSection {
    Record,
    Drop,
    Redirect,
    Relay,
}

impl ControlSection {
    pub fn parse(section: &str) -> Option<Self> {
        match section {
            "record" => Some(ControlSection::Record),
            "drop" => Some(ControlSection::Drop),
            "redirect" => Some(ControlSection::Redirect),
            "relay" => Some(ControlSection::Relay),
            _ => None,
        }
    }

    /// Allow-list bit enabling this section
    pub fn mask(self) -> ControlSections {
        match self {
            ControlSection::Record => ControlSections::RECORD,
            ControlSection::Drop => ControlSections::DROP,
            ControlSection::Redirect => ControlSections::REDIRECT,
            ControlSection::Relay => ControlSections::RELAY,
        }
    }
}

/// Status and body of a handled control request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl ControlResponse {
    /// 200 with a raw body
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
        }
    }

    /// 200 with a decimal count
    pub fn count(count: usize) -> Self {
        Self::ok(count.to_string())
    }

    /// 204, nothing to report
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: Bytes::new(),
        }
    }

    /// Error status; the message is logged, not returned
    pub fn error(err: &ControlError) -> Self {
        Self {
            status: err.status(),
            body: Bytes::new(),
        }
    }

    /// Body as text, for callers and tests that expect UTF-8
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or("")
    }

    /// Convert into an `http` response with a length header
    pub fn into_http(self) -> http::Response<Bytes> {
        let len = self.body.len();
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert(http::header::CONTENT_LENGTH, http::HeaderValue::from(len));
        response
    }
}

/// Control endpoint: configuration, the static relay registry and the
/// collaborators that do not belong to the live session host
pub struct ControlService {
    config: ControlConfig,
    relays: StaticRelayRegistry,
    recorder: Box<dyn RecordControl>,
    relay_args: Box<dyn RelayArgParser>,
    scheduler: Box<dyn ReconnectScheduler>,
}

impl ControlService {
    pub fn new(
        config: ControlConfig,
        recorder: Box<dyn RecordControl>,
        relay_args: Box<dyn RelayArgParser>,
        scheduler: Box<dyn ReconnectScheduler>,
    ) -> Self {
        Self {
            config,
            relays: StaticRelayRegistry::new(),
            recorder,
            relay_args,
            scheduler,
        }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Pending static pulls
    pub fn relays(&self) -> &StaticRelayRegistry {
        &self.relays
    }

    pub fn relays_mut(&mut self) -> &mut StaticRelayRegistry {
        &mut self.relays
    }

    /// Handle one request against the live session host
    ///
    /// Returns None when the request is declined: too few path segments,
    /// an unknown section, or a section not in the allow-list.
    pub fn handle(
        &mut self,
        host: &mut dyn StreamHost,
        request: &ControlRequest,
    ) -> Option<ControlResponse> {
        if self.config.sections.is_empty() {
            return None;
        }

        let (section_name, method) = request.section_method()?;

        tracing::debug!(section = section_name, method = method, "rtmp_control");

        let section = ControlSection::parse(section_name)
            .filter(|section| self.config.sections.contains(section.mask()))?;

        let mut scope = RequestScope {
            request,
            ctx: ControlRequestContext::new(method),
            config: &self.config,
            host,
            recorder: self.recorder.as_mut(),
            relay_args: self.relay_args.as_ref(),
            scheduler: self.scheduler.as_ref(),
            relays: &mut self.relays,
        };

        let result = match section {
            ControlSection::Record => record::run(&mut scope),
            ControlSection::Drop => drop::run(&mut scope),
            ControlSection::Redirect => redirect::run(&mut scope),
            ControlSection::Relay => relay::run(&mut scope),
        };

        Some(match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    section = section_name,
                    method = method,
                    error = %e,
                    "Control request failed"
                );
                ControlResponse::error(&e)
            }
        })
    }
}
