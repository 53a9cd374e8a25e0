//! Inbound control request
//!
//! Only what the control plane needs from an HTTP request: the path and the
//! raw query string.

/// Path and query of one control request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRequest {
    pub path: String,
    pub query: String,
}

impl ControlRequest {
    pub fn new(path: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: query.into(),
        }
    }

    /// Split a request target such as `/control/drop/client?app=live`
    pub fn parse(target: &str) -> Self {
        match target.split_once('?') {
            Some((path, query)) => Self::new(path, query),
            None => Self::new(target, ""),
        }
    }

    /// Raw (still percent-encoded) value of the first `key=` argument
    ///
    /// Keys match ASCII case-insensitively. A bare key without `=` is not
    /// an argument.
    pub fn arg(&self, key: &str) -> Option<&str> {
        self.query.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            k.eq_ignore_ascii_case(key).then_some(v)
        })
    }

    /// The trailing two path segments as `(section, method)`
    ///
    /// `/control/drop/client` yields `("drop", "client")`. Returns None if
    /// the path has fewer than two `/`.
    pub fn section_method(&self) -> Option<(&str, &str)> {
        let (head, method) = self.path.rsplit_once('/')?;
        let (_, section) = head.rsplit_once('/')?;
        Some((section, method))
    }
}

impl From<&http::Uri> for ControlRequest {
    fn from(uri: &http::Uri) -> Self {
        Self::new(uri.path(), uri.query().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_method() {
        let req = ControlRequest::parse("/control/drop/client?app=live");
        assert_eq!(req.section_method(), Some(("drop", "client")));

        let req = ControlRequest::parse("/a/b/control/record/start");
        assert_eq!(req.section_method(), Some(("record", "start")));
    }

    #[test]
    fn test_section_method_short_path() {
        assert_eq!(ControlRequest::parse("/drop").section_method(), None);
        assert_eq!(
            ControlRequest::parse("/drop/").section_method(),
            Some(("drop", ""))
        );
    }

    #[test]
    fn test_first_arg_wins() {
        let req = ControlRequest::parse("/c/drop/client?name=a&NAME=b&flag&empty=");

        assert_eq!(req.arg("name"), Some("a"));
        assert_eq!(req.arg("empty"), Some(""));
        assert_eq!(req.arg("missing"), None);
    }

    #[test]
    fn test_bare_key_is_absent() {
        let req = ControlRequest::parse("/c/redirect/client?newname&addr&name=cam1");

        assert_eq!(req.arg("newname"), None);
        assert_eq!(req.arg("addr"), None);
        assert_eq!(req.arg("name"), Some("cam1"));
    }

    #[test]
    fn test_args_stay_encoded() {
        let req = ControlRequest::parse("/c/relay/start?pull=rtmp%3A%2F%2Fh%2Flive");
        assert_eq!(req.arg("pull"), Some("rtmp%3A%2F%2Fh%2Flive"));
    }

    #[test]
    fn test_from_uri() {
        let uri: http::Uri = "/control/relay/stop?name=cam1".parse().unwrap();
        let req = ControlRequest::from(&uri);

        assert_eq!(req.path, "/control/relay/stop");
        assert_eq!(req.arg("name"), Some("cam1"));
    }
}
