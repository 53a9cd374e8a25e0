//! HTTP control plane
//!
//! This module provides:
//! - Request parsing and the section/method dispatcher
//! - The session tree walker and its filter
//! - `record`, `drop`, `redirect` and `relay` actions
//!
//! Requests run to completion on the caller's thread against a
//! [`StreamHost`]; nothing here blocks or awaits.

pub mod context;
pub mod dispatch;
mod drop;
pub mod filter;
pub mod hooks;
mod record;
mod redirect;
mod relay;
pub mod request;
pub mod walk;

pub use context::ControlRequestContext;
pub use dispatch::{ControlResponse, ControlSection, ControlService};
pub use filter::{ClientIdFilter, FilterRole, SessionFilter};
pub use hooks::{RecordControl, RecorderSlot, StreamHost};
pub use request::ControlRequest;
pub use walk::{SessionMatch, Walk, WalkScope};
