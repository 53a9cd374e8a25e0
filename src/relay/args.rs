//! Relay argument decomposition
//!
//! Turns the path and query of a relay URL into the remote app, play path
//! and connect parameters, and decides whether the target is static.

use crate::error::HostError;

use super::target::{RelayKind, RelayTarget};

/// Decomposes a relay target's URI into relay arguments
pub trait RelayArgParser {
    /// Fill in relay arguments from `target.url.uri` and classify the target
    fn decompose(&self, target: &mut RelayTarget) -> Result<RelayKind, HostError>;
}

/// Default decomposition
///
/// `/app/play/path?key=value&...`: the first path segment is the remote
/// app, the remainder is the play path. Recognized keys are `app`,
/// `playpath`, `name`, `tcurl`, `pageurl`, `swfurl`, `flashver`, `live`,
/// `start`, `stop` and `static`. Targets are static unless `static` is off.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRelayArgs;

impl RelayArgParser for StandardRelayArgs {
    fn decompose(&self, target: &mut RelayTarget) -> Result<RelayKind, HostError> {
        let uri = target.url.uri.clone();
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, query),
            None => (uri.as_str(), ""),
        };

        let path = path.trim_start_matches('/');
        let (app, play_path) = path.split_once('/').unwrap_or((path, ""));
        target.app = app.to_string();
        target.play_path = play_path.to_string();

        let mut kind = RelayKind::Static;

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));

            match key.to_ascii_lowercase().as_str() {
                "app" => target.app = value.to_string(),
                "playpath" => target.play_path = value.to_string(),
                "name" => {
                    if target.name.is_empty() {
                        target.name = value.to_string();
                    }
                }
                "tcurl" => target.tc_url = Some(value.to_string()),
                "pageurl" => target.page_url = Some(value.to_string()),
                "swfurl" => target.swf_url = Some(value.to_string()),
                "flashver" => target.flash_ver = Some(value.to_string()),
                "live" => target.live = parse_flag(key, value)?,
                "start" => target.start = Some(parse_millis(key, value)?),
                "stop" => target.stop = Some(parse_millis(key, value)?),
                "static" => {
                    kind = if parse_flag(key, value)? {
                        RelayKind::Static
                    } else {
                        RelayKind::Dynamic
                    };
                }
                _ => {
                    return Err(HostError::Other(format!("unknown relay argument: {}", key)));
                }
            }
        }

        target.kind = kind;
        Ok(kind)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, HostError> {
    match value.to_ascii_lowercase().as_str() {
        "" | "on" | "1" | "true" => Ok(true),
        "off" | "0" | "false" => Ok(false),
        _ => Err(HostError::Other(format!("invalid {} value: {}", key, value))),
    }
}

fn parse_millis(key: &str, value: &str) -> Result<i64, HostError> {
    value
        .parse()
        .map_err(|_| HostError::Other(format!("invalid {} value: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::AppIdentity;
    use crate::relay::target::{RelayDirection, RelayUrl};

    fn target(url: &str, name: &str) -> RelayTarget {
        let url = RelayUrl::parse(url, 1935).unwrap();
        RelayTarget::new(name, url, RelayDirection::Pull, AppIdentity::new(0, 0))
    }

    #[test]
    fn test_static_by_default() {
        let mut t = target("rtmp://10.0.0.5/live/cam1", "cam1");
        let kind = StandardRelayArgs.decompose(&mut t).unwrap();

        assert_eq!(kind, RelayKind::Static);
        assert_eq!(t.app, "live");
        assert_eq!(t.play_path, "cam1");
    }

    #[test]
    fn test_static_off_is_dynamic() {
        let mut t = target("rtmp://10.0.0.5/live/cam1?static=off&live=1", "cam1");
        let kind = StandardRelayArgs.decompose(&mut t).unwrap();

        assert_eq!(kind, RelayKind::Dynamic);
        assert!(t.live);
        assert!(!t.is_static());
    }

    #[test]
    fn test_overrides() {
        let mut t = target(
            "rtmp://h/live/cam1?app=origin&playpath=main&tcurl=rtmp://h/origin&start=-1000",
            "",
        );
        StandardRelayArgs.decompose(&mut t).unwrap();

        assert_eq!(t.app, "origin");
        assert_eq!(t.play_path, "main");
        assert_eq!(t.tc_url.as_deref(), Some("rtmp://h/origin"));
        assert_eq!(t.start, Some(-1000));
    }

    #[test]
    fn test_name_only_fills_empty() {
        let mut t = target("rtmp://h/live/cam1?name=other", "cam1");
        StandardRelayArgs.decompose(&mut t).unwrap();
        assert_eq!(t.name, "cam1");

        let mut t = target("rtmp://h/live/cam1?name=other", "");
        StandardRelayArgs.decompose(&mut t).unwrap();
        assert_eq!(t.name, "other");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut t = target("rtmp://h/live/cam1?bogus=1", "cam1");
        assert!(StandardRelayArgs.decompose(&mut t).is_err());
    }

    #[test]
    fn test_bad_flag_rejected() {
        let mut t = target("rtmp://h/live/cam1?static=maybe", "cam1");
        assert!(StandardRelayArgs.decompose(&mut t).is_err());
    }
}
