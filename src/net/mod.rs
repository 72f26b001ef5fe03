//! Minion authority wire protocol
//!
//! Two endpoints, both returning the full minion list as JSON:
//! - `GET /objects`
//! - `GET /objects/kill/{id}` (list after the kill)
//!
//! The session never performs I/O itself. It queues `Request`s; the host runs
//! them with whatever transport it has and hands back a `Response`.

pub mod local;

#[cfg(target_arch = "wasm32")]
pub mod fetch;

use std::sync::Arc;

use http::uri::{InvalidUri, InvalidUriParts, Uri};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use thiserror::Error;

use crate::sim::minion::{MinionId, ServerSnapshot};

pub use local::LocalAuthority;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetError {
    /// Request never produced a response (DNS, connection, CORS, ...)
    #[error("transport failure: {0}")]
    Transport(String),
    /// Response status outside [200, 300)
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    /// Body was not a minion list
    #[error("malformed response body: {0}")]
    Parse(String),
    /// Request URL could not be built
    #[error("bad request URL: {0}")]
    Url(String),
}

/// Base URL rejected, or a request URL that could not be assembled
#[derive(Debug, Clone, Error)]
pub enum UriError {
    #[error("Unknown URI scheme {scheme}, expected http or https")]
    UnknownUriScheme { scheme: String },

    #[error("Expected an absolute http(s) URI, got {uri}")]
    NotAbsolute { uri: String },

    #[error("Expected a URI without a query part, but found {query}")]
    UnexpectedQuery { query: String },

    #[error(transparent)]
    InvalidUri { source: Arc<InvalidUri> },

    #[error(transparent)]
    InvalidUriParts { source: Arc<InvalidUriParts> },
}

/// Everything but RFC 3986 unreserved characters
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Which endpoint a request targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    List,
    Kill(MinionId),
}

/// An outbound request queued by the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Monotonically increasing per session; orders responses
    pub seq: u64,
    pub kind: RequestKind,
}

impl Request {
    pub fn path(&self) -> String {
        match &self.kind {
            RequestKind::List => "/objects".to_string(),
            RequestKind::Kill(id) => format!(
                "/objects/kill/{}",
                utf8_percent_encode(id.as_str(), PATH_SEGMENT)
            ),
        }
    }
}

/// A completed request, success or failure
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub seq: u64,
    pub kind: RequestKind,
    pub result: Result<ServerSnapshot, NetError>,
}

impl Response {
    /// Build a response from raw HTTP status and body
    pub fn from_http(request: &Request, status: u16, body: &str) -> Self {
        Self {
            seq: request.seq,
            kind: request.kind.clone(),
            result: parse_snapshot(status, body),
        }
    }

    pub fn failed(request: &Request, error: NetError) -> Self {
        Self {
            seq: request.seq,
            kind: request.kind.clone(),
            result: Err(error),
        }
    }
}

/// Base URL of the authority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Uri,
}

impl Endpoint {
    /// Parse and check a base URL: absolute http(s), no query
    pub fn new(base_url: &str) -> Result<Self, UriError> {
        let base: Uri = base_url
            .trim()
            .parse()
            .map_err(|source: InvalidUri| UriError::InvalidUri {
                source: Arc::new(source),
            })?;

        match base.scheme_str() {
            Some("http") | Some("https") => {}
            Some(other) => {
                return Err(UriError::UnknownUriScheme {
                    scheme: other.into(),
                });
            }
            None => {
                return Err(UriError::NotAbsolute {
                    uri: base_url.into(),
                });
            }
        }
        if base.authority().is_none() {
            return Err(UriError::NotAbsolute {
                uri: base_url.into(),
            });
        }
        if let Some(query) = base.query() {
            return Err(UriError::UnexpectedQuery {
                query: query.into(),
            });
        }

        Ok(Self { base })
    }

    /// Full URL for a request, keeping any path prefix on the base
    pub fn url_for(&self, request: &Request) -> Result<Uri, UriError> {
        let mut parts = self.base.clone().into_parts();
        let prefix = parts
            .path_and_query
            .as_ref()
            .map(|pq| pq.path().trim_end_matches('/').to_string())
            .unwrap_or_default();
        let path = format!("{}{}", prefix, request.path());
        parts.path_and_query = Some(path.parse().map_err(|source: InvalidUri| {
            UriError::InvalidUri {
                source: Arc::new(source),
            }
        })?);
        Uri::from_parts(parts).map_err(|source| UriError::InvalidUriParts {
            source: Arc::new(source),
        })
    }
}

/// Check status, then decode the body
pub fn parse_snapshot(status: u16, body: &str) -> Result<ServerSnapshot, NetError> {
    if !(200..300).contains(&status) {
        return Err(NetError::HttpStatus(status));
    }
    serde_json::from_str(body).map_err(|e| NetError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kill(id: MinionId) -> Request {
        Request {
            seq: 2,
            kind: RequestKind::Kill(id),
        }
    }

    #[test]
    fn test_urls() {
        let ep = Endpoint::new("https://minions.test/").unwrap();
        let list = Request {
            seq: 1,
            kind: RequestKind::List,
        };
        assert_eq!(
            ep.url_for(&list).unwrap().to_string(),
            "https://minions.test/objects"
        );
        assert_eq!(
            ep.url_for(&kill(MinionId::from(42u64))).unwrap().to_string(),
            "https://minions.test/objects/kill/42"
        );
    }

    #[test]
    fn test_base_path_prefix_is_kept() {
        let ep = Endpoint::new("http://127.0.0.1:3000/api/").unwrap();
        assert_eq!(
            ep.url_for(&kill(MinionId::from("m-7"))).unwrap().to_string(),
            "http://127.0.0.1:3000/api/objects/kill/m-7"
        );
    }

    #[test]
    fn test_rejects_bad_base_urls() {
        assert!(matches!(
            Endpoint::new("not a url"),
            Err(UriError::InvalidUri { .. })
        ));
        assert!(matches!(
            Endpoint::new("ftp://minions.test"),
            Err(UriError::UnknownUriScheme { .. })
        ));
        assert!(matches!(
            Endpoint::new("/objects"),
            Err(UriError::NotAbsolute { .. })
        ));
        assert!(matches!(
            Endpoint::new("https://minions.test/?x=1"),
            Err(UriError::UnexpectedQuery { .. })
        ));
    }

    #[test]
    fn test_escaped_id_builds_valid_url() {
        let ep = Endpoint::new("https://minions.test").unwrap();
        let url = ep.url_for(&kill(MinionId::from("a b/c?d"))).unwrap();
        assert_eq!(url.path(), "/objects/kill/a%20b%2Fc%3Fd");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_kill_id_is_path_escaped() {
        let kill = Request {
            seq: 1,
            kind: RequestKind::Kill(MinionId::from("a b/c")),
        };
        assert_eq!(kill.path(), "/objects/kill/a%20b%2Fc");
    }

    #[test]
    fn test_non_2xx_is_status_error() {
        assert_eq!(parse_snapshot(404, "{}"), Err(NetError::HttpStatus(404)));
        assert_eq!(parse_snapshot(199, "{}"), Err(NetError::HttpStatus(199)));
        assert_eq!(parse_snapshot(300, "{}"), Err(NetError::HttpStatus(300)));
    }

    #[test]
    fn test_2xx_parses_body() {
        let snap = parse_snapshot(204, r#"{"ts":1,"killed":0,"objects":[]}"#).unwrap();
        assert!(snap.objects.is_empty());
        assert_eq!(snap.ts, 1.0);
    }

    #[test]
    fn test_bad_body_is_parse_error() {
        assert!(matches!(parse_snapshot(200, "<html>"), Err(NetError::Parse(_))));
    }
}
