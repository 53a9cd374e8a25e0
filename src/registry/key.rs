//! Identity types for streams and applications

use std::fmt;

/// Unique identifier for a stream (app + stream name)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamKey {
    /// Application name (e.g., "live")
    pub app: String,
    /// Stream name (e.g., "cam1")
    pub name: String,
}

impl StreamKey {
    /// Create a new stream key
    pub fn new(app: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app, self.name)
    }
}

/// Identity of one application inside one server
///
/// Both indices are positions in configuration order, which never changes
/// while the server runs, so the pair is stable for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppIdentity {
    /// Zero-based server index
    pub server: usize,
    /// Zero-based application index within the server
    pub app: usize,
}

impl AppIdentity {
    pub fn new(server: usize, app: usize) -> Self {
        Self { server, app }
    }
}

impl fmt::Display for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "srv{}/app{}", self.server, self.app)
    }
}

/// Publish or play target: stream name with its argument string split off
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamTarget {
    pub name: String,
    pub args: String,
}

impl StreamTarget {
    /// Split `"name?args"` into name and args
    pub fn from_name(full: &str) -> Self {
        match full.split_once('?') {
            Some((name, args)) => Self {
                name: name.to_string(),
                args: args.to_string(),
            },
            None => Self {
                name: full.to_string(),
                args: String::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_target_with_args() {
        let target = StreamTarget::from_name("cam2?token=abc&x=1");
        assert_eq!(target.name, "cam2");
        assert_eq!(target.args, "token=abc&x=1");
    }

    #[test]
    fn test_stream_target_plain() {
        let target = StreamTarget::from_name("cam2");
        assert_eq!(target.name, "cam2");
        assert!(target.args.is_empty());
    }

    #[test]
    fn test_stream_key_display() {
        assert_eq!(StreamKey::new("live", "cam1").to_string(), "live/cam1");
    }
}
