//! Control endpoint configuration

pub mod config;

pub use config::{ControlConfig, ControlSections, UnknownSection};
