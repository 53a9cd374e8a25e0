//! Relay target descriptors

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::registry::AppIdentity;

const RTMP_SCHEME: &str = "rtmp://";

/// Direction of a relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayDirection {
    /// Send a local stream to a remote server
    Push,
    /// Fetch a remote stream into a local application
    Pull,
}

impl fmt::Display for RelayDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayDirection::Push => write!(f, "push"),
            RelayDirection::Pull => write!(f, "pull"),
        }
    }
}

/// Scheduling class of a relay target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayKind {
    /// Reconnected periodically through the static relay registry
    Static,
    /// Handed once to the relay subsystem's connection queue
    Dynamic,
}

/// Why a relay URL could not be used
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayUrlError {
    #[error("relay url must start with rtmp://")]
    Scheme,
    #[error("malformed relay url: {0}")]
    Malformed(String),
}

/// Parsed relay URL, scheme stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayUrl {
    /// Everything after `rtmp://`
    pub url: String,
    pub host: String,
    pub port: u16,
    /// Path and query, leading `/` included; empty if the URL has no path
    pub uri: String,
}

impl RelayUrl {
    /// Parse a decoded `rtmp://host[:port][/path[?args]]` URL
    ///
    /// The scheme is matched case-insensitively.
    pub fn parse(decoded: &str, default_port: u16) -> Result<Self, RelayUrlError> {
        let has_scheme = decoded
            .get(..RTMP_SCHEME.len())
            .map(|prefix| prefix.eq_ignore_ascii_case(RTMP_SCHEME))
            .unwrap_or(false);

        if !has_scheme {
            return Err(RelayUrlError::Scheme);
        }

        let rest = &decoded[RTMP_SCHEME.len()..];
        let parsed = Url::parse(&format!("{}{}", RTMP_SCHEME, rest))
            .map_err(|e| RelayUrlError::Malformed(e.to_string()))?;

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| RelayUrlError::Malformed("missing host".into()))?
            .to_string();

        let mut uri = parsed.path().to_string();
        if let Some(query) = parsed.query() {
            uri.push('?');
            uri.push_str(query);
        }

        Ok(Self {
            url: rest.to_string(),
            host,
            port: parsed.port().unwrap_or(default_port),
            uri,
        })
    }
}

impl fmt::Display for RelayUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", RTMP_SCHEME, self.url)
    }
}

/// Relay target, immutable once handed to the relay subsystem
#[derive(Debug, Clone)]
pub struct RelayTarget {
    /// Local stream name to publish/play as
    pub name: String,

    pub url: RelayUrl,

    pub direction: RelayDirection,

    pub kind: RelayKind,

    /// Server and application the target was created under
    pub identity: AppIdentity,

    /// Remote application
    pub app: String,

    /// Remote stream path
    pub play_path: String,

    pub tc_url: Option<String>,
    pub page_url: Option<String>,
    pub swf_url: Option<String>,
    pub flash_ver: Option<String>,

    /// Play the remote stream as live
    pub live: bool,

    /// Start/stop offsets in milliseconds
    pub start: Option<i64>,
    pub stop: Option<i64>,
}

impl RelayTarget {
    /// Create a target; relay arguments are filled in by decomposition
    pub fn new(
        name: impl Into<String>,
        url: RelayUrl,
        direction: RelayDirection,
        identity: AppIdentity,
    ) -> Self {
        Self {
            name: name.into(),
            url,
            direction,
            kind: RelayKind::Static,
            identity,
            app: String::new(),
            play_path: String::new(),
            tc_url: None,
            page_url: None,
            swf_url: None,
            flash_ver: None,
            live: false,
            start: None,
            stop: None,
        }
    }

    pub fn is_static(&self) -> bool {
        self.kind == RelayKind::Static
    }
}

/// Dynamic relay targets queued on an application
///
/// Drained by the relay subsystem's connection establishment.
#[derive(Debug, Default)]
pub struct RelayQueues {
    pub pulls: Vec<Arc<RelayTarget>>,
    pub pushes: Vec<Arc<RelayTarget>>,
}

impl RelayQueues {
    pub fn enqueue(&mut self, target: Arc<RelayTarget>) {
        match target.direction {
            RelayDirection::Pull => self.pulls.push(target),
            RelayDirection::Push => self.pushes.push(target),
        }
    }

    pub fn len(&self) -> usize {
        self.pulls.len() + self.pushes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
