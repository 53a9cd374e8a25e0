//! Session filter predicate

use crate::error::{ControlError, Result};
use crate::session::Session;

use super::request::ControlRequest;

/// Which roles a request visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterRole {
    /// No role restriction
    #[default]
    Client,
    Publisher,
    Subscriber,
}

impl FilterRole {
    /// Parse the method segment of drop/redirect
    pub fn from_method(method: &str) -> Result<Self> {
        match method {
            "client" => Ok(FilterRole::Client),
            "publisher" => Ok(FilterRole::Publisher),
            "subscriber" => Ok(FilterRole::Subscriber),
            _ => Err(ControlError::UndefinedFilter),
        }
    }
}

/// Requested `clientid`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientIdFilter {
    Exact(u64),
    /// Value did not parse as a connection number; matches nothing
    Invalid,
}

/// Conjunction of the request's session criteria
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionFilter {
    pub addr: Option<String>,
    pub client_id: Option<ClientIdFilter>,
    pub role: FilterRole,
}

impl SessionFilter {
    /// Build from the `addr` and `clientid` arguments
    pub fn from_request(request: &ControlRequest, role: FilterRole) -> Self {
        Self {
            addr: request.arg("addr").map(str::to_string),
            client_id: request.arg("clientid").map(|v| match v.parse() {
                Ok(id) => ClientIdFilter::Exact(id),
                Err(_) => ClientIdFilter::Invalid,
            }),
            role,
        }
    }

    /// Check address, then connection number, then role
    pub fn matches(&self, session: &Session) -> bool {
        if let Some(addr) = &self.addr {
            if session.addr_text != *addr {
                return false;
            }
        }

        match self.client_id {
            Some(ClientIdFilter::Exact(id)) if session.id.0 != id => return false,
            Some(ClientIdFilter::Invalid) => return false,
            _ => {}
        }

        match self.role {
            FilterRole::Client => true,
            FilterRole::Publisher => session.is_publishing(),
            FilterRole::Subscriber => !session.is_publishing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionRole;

    fn sessions() -> Vec<Session> {
        vec![
            Session::new(1, "10.0.0.1", SessionRole::Publisher),
            Session::new(2, "10.0.0.2", SessionRole::Subscriber),
            Session::new(3, "10.0.0.2", SessionRole::Subscriber),
            Session::new(4, "10.0.0.1", SessionRole::Subscriber),
        ]
    }

    fn matching(filter: &SessionFilter) -> Vec<u64> {
        sessions()
            .iter()
            .filter(|s| filter.matches(s))
            .map(|s| s.id.0)
            .collect()
    }

    #[test]
    fn test_role_from_method() {
        assert_eq!(FilterRole::from_method("publisher"), Ok(FilterRole::Publisher));
        assert_eq!(FilterRole::from_method("client"), Ok(FilterRole::Client));
        assert_eq!(
            FilterRole::from_method("everyone"),
            Err(ControlError::UndefinedFilter)
        );
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let req = ControlRequest::parse("/c/drop/subscriber?addr=10.0.0.2&clientid=3");
        let full = SessionFilter::from_request(&req, FilterRole::Subscriber);
        assert_eq!(matching(&full), [3]);

        let no_id = SessionFilter {
            client_id: None,
            ..full.clone()
        };
        assert_eq!(matching(&no_id), [2, 3]);

        let no_addr = SessionFilter {
            addr: None,
            ..no_id.clone()
        };
        assert_eq!(matching(&no_addr), [2, 3, 4]);

        let any_role = SessionFilter {
            role: FilterRole::Client,
            ..no_addr
        };
        assert_eq!(matching(&any_role), [1, 2, 3, 4]);
    }

    #[test]
    fn test_publisher_only() {
        let filter = SessionFilter {
            role: FilterRole::Publisher,
            ..Default::default()
        };
        assert_eq!(matching(&filter), [1]);
    }

    #[test]
    fn test_unparseable_clientid_matches_nothing() {
        let req = ControlRequest::parse("/c/drop/client?clientid=abc");
        let filter = SessionFilter::from_request(&req, FilterRole::Client);

        assert_eq!(filter.client_id, Some(ClientIdFilter::Invalid));
        assert!(matching(&filter).is_empty());
    }
}
