//! Control endpoint configuration

use std::fmt;
use std::time::Duration;

/// Default RTMP port used when a relay URL has none
pub const DEFAULT_RTMP_PORT: u16 = 1935;

/// Maximum stream name length including the terminator
pub const MAX_NAME_LEN: usize = 256;

/// Default number of hash buckets per application stream table
pub const DEFAULT_STREAM_BUCKETS: usize = 1024;

/// Allow-list of control sections accepted by the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ControlSections(u8);

impl ControlSections {
    pub const NONE: Self = Self(0);
    pub const RECORD: Self = Self(0x01);
    pub const DROP: Self = Self(0x02);
    pub const REDIRECT: Self = Self(0x04);
    pub const RELAY: Self = Self(0x08);
    pub const ALL: Self = Self(0xff);

    /// Parse the directive value, e.g. `["record", "drop"]` or `["all"]`
    pub fn from_names<I, S>(names: I) -> Result<Self, UnknownSection>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mask = Self::NONE;

        for name in names {
            mask = mask
                | match name.as_ref() {
                    "all" => Self::ALL,
                    "record" => Self::RECORD,
                    "drop" => Self::DROP,
                    "redirect" => Self::REDIRECT,
                    "relay" => Self::RELAY,
                    other => return Err(UnknownSection(other.to_string())),
                };
        }

        Ok(mask)
    }

    /// Check whether every bit of `other` is enabled
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl std::ops::BitOr for ControlSections {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Unrecognized section name in the allow-list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSection(pub String);

impl fmt::Display for UnknownSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown control section: {}", self.0)
    }
}

impl std::error::Error for UnknownSection {}

/// Control endpoint configuration options
#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// Sections the endpoint accepts (empty = decline everything)
    pub sections: ControlSections,

    /// Maximum stream name length, terminator included
    pub max_name_len: usize,

    /// Port assumed when a relay URL does not carry one
    pub default_relay_port: u16,

    /// Hash buckets per application stream table
    pub stream_buckets: usize,

    /// Delay between static pull reconnect attempts
    pub reconnect_interval: Duration,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            sections: ControlSections::NONE,
            max_name_len: MAX_NAME_LEN,
            default_relay_port: DEFAULT_RTMP_PORT,
            stream_buckets: DEFAULT_STREAM_BUCKETS,
            reconnect_interval: Duration::from_secs(3),
        }
    }
}

impl ControlConfig {
    /// Create a config accepting the given sections
    pub fn with_sections(sections: ControlSections) -> Self {
        Self {
            sections,
            ..Default::default()
        }
    }

    /// Set the accepted sections
    pub fn sections(mut self, sections: ControlSections) -> Self {
        self.sections = sections;
        self
    }

    /// Set maximum stream name length (at least 2: one byte plus terminator)
    pub fn max_name_len(mut self, len: usize) -> Self {
        self.max_name_len = len.max(2);
        self
    }

    /// Set default relay port
    pub fn default_relay_port(mut self, port: u16) -> Self {
        self.default_relay_port = port;
        self
    }

    /// Set number of stream buckets (at least one)
    pub fn stream_buckets(mut self, buckets: usize) -> Self {
        self.stream_buckets = buckets.max(1);
        self
    }

    /// Set static pull reconnect interval
    pub fn reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ControlConfig::default();

        assert!(config.sections.is_empty());
        assert_eq!(config.max_name_len, MAX_NAME_LEN);
        assert_eq!(config.default_relay_port, 1935);
        assert_eq!(config.stream_buckets, DEFAULT_STREAM_BUCKETS);
    }

    #[test]
    fn test_sections_from_names() {
        let mask = ControlSections::from_names(["record", "drop"]).unwrap();

        assert!(mask.contains(ControlSections::RECORD));
        assert!(mask.contains(ControlSections::DROP));
        assert!(!mask.contains(ControlSections::REDIRECT));
        assert!(!mask.contains(ControlSections::RELAY));
    }

    #[test]
    fn test_sections_all() {
        let mask = ControlSections::from_names(["all"]).unwrap();

        for section in [
            ControlSections::RECORD,
            ControlSections::DROP,
            ControlSections::REDIRECT,
            ControlSections::RELAY,
        ] {
            assert!(mask.contains(section));
        }
    }

    #[test]
    fn test_sections_unknown_name() {
        let err = ControlSections::from_names(["drop", "stats"]).unwrap_err();
        assert_eq!(err, UnknownSection("stats".into()));
    }

    #[test]
    fn test_builder_buckets_floor() {
        let config = ControlConfig::default().stream_buckets(0);
        assert_eq!(config.stream_buckets, 1);
    }

    #[test]
    fn test_builder_chaining() {
        let config = ControlConfig::with_sections(ControlSections::RELAY)
            .max_name_len(64)
            .default_relay_port(1936)
            .reconnect_interval(Duration::from_millis(500));

        assert_eq!(config.sections, ControlSections::RELAY);
        assert_eq!(config.max_name_len, 64);
        assert_eq!(config.default_relay_port, 1936);
        assert_eq!(config.reconnect_interval, Duration::from_millis(500));
    }
}
