//! HTTP control plane for a live RTMP server
//!
//! Operators issue `GET .../<section>/<method>?args` requests to act on live
//! sessions: drop them, redirect them to another stream, start or stop
//! recording, and start or stop pull/push relays.
//!
//! # Example
//!
//! ```no_run
//! use rtmp_control::{
//!     ControlConfig, ControlRequest, ControlSections, ControlService, ServerTree,
//! };
//! # use rtmp_control::control::{RecordControl, RecorderSlot, SessionMatch};
//! # use rtmp_control::relay::{ReconnectScheduler, ReconnectTask, StandardRelayArgs};
//! # use rtmp_control::{AppIdentity, HostError};
//! # use std::sync::Arc;
//! # struct NoRecorder;
//! # impl RecordControl for NoRecorder {
//! #     fn find(&self, _: AppIdentity, _: &str) -> Option<RecorderSlot> { None }
//! #     fn open(&mut self, _: &SessionMatch, _: RecorderSlot) -> Result<Option<String>, HostError> { Ok(None) }
//! #     fn close(&mut self, _: &SessionMatch, _: RecorderSlot) -> Result<Option<String>, HostError> { Ok(None) }
//! # }
//! # struct Later;
//! # impl ReconnectScheduler for Later { fn schedule(&self, _: Arc<ReconnectTask>) {} }
//!
//! let mut tree = ServerTree::default();
//! let srv = tree.add_server();
//! tree.server_mut(srv).unwrap().add_application("live");
//!
//! let config = ControlConfig::with_sections(ControlSections::ALL);
//! let mut service = ControlService::new(
//!     config,
//!     Box::new(NoRecorder),
//!     Box::new(StandardRelayArgs),
//!     Box::new(Later),
//! );
//!
//! let request = ControlRequest::parse("/control/drop/client?app=live&name=cam1");
//! if let Some(response) = service.handle(&mut tree, &request) {
//!     println!("{} {:?}", response.status, response.body);
//! }
//! ```

pub mod control;
pub mod error;
pub mod registry;
pub mod relay;
pub mod server;
pub mod session;

pub use control::{ControlRequest, ControlResponse, ControlService, StreamHost};
pub use error::{ControlError, HostError, Result};
pub use registry::{AppIdentity, ServerTree};
pub use server::{ControlConfig, ControlSections};
pub use session::{Session, SessionId, SessionRole};
