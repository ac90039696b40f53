//! Request URL reconstruction
//!
//! Mirrors what a front-end proxy sees: scheme, host, port and the full path
//! (path plus query string). Forwarded headers take precedence over the
//! connection's own values.

use axum::http::{HeaderMap, Uri, header::HOST};

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUrl {
    scheme: String,
    host: String,
    port: u16,
    fullpath: String,
}

impl RequestUrl {
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        fullpath: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
            host: host.into().to_ascii_lowercase(),
            port,
            fullpath: fullpath.into(),
        }
    }

    /// Build from an inbound request's URI and headers
    ///
    /// Scheme: `X-Forwarded-Proto`, then the URI scheme, then `http`.
    /// Host and port: `X-Forwarded-Host`, then `Host`, then the URI authority.
    /// A missing port falls back to the scheme's default.
    pub fn from_http(uri: &Uri, headers: &HeaderMap) -> Self {
        let scheme = first_header_value(headers, X_FORWARDED_PROTO)
            .or_else(|| uri.scheme_str().map(str::to_string))
            .unwrap_or_else(|| "http".to_string())
            .to_ascii_lowercase();

        let authority = first_header_value(headers, X_FORWARDED_HOST)
            .or_else(|| first_header_value(headers, HOST.as_str()))
            .or_else(|| uri.authority().map(|authority| authority.as_str().to_string()))
            .unwrap_or_else(|| "localhost".to_string());

        let (host, port) = split_host_port(&authority);
        let port = port.unwrap_or_else(|| default_port(&scheme));

        let fullpath = match uri.query() {
            Some(query) if !query.is_empty() => format!("{}?{}", uri.path(), query),
            _ => uri.path().to_string(),
        };

        Self::new(scheme, host, port, fullpath)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn fullpath(&self) -> &str {
        &self.fullpath
    }

    /// Dot-separated host labels
    pub fn host_labels(&self) -> Vec<&str> {
        self.host.split('.').collect()
    }

    /// The full reconstructed URL of this request
    pub fn url(&self) -> String {
        self.url_with_host(&self.host)
    }

    /// The URL of this request with its host replaced
    ///
    /// The port is omitted when it is the scheme's default (80 for http, 443
    /// for https).
    pub fn url_with_host(&self, host: &str) -> String {
        let mut url = format!("{}://{}", self.scheme, host);
        if !self.is_default_port() {
            url.push_str(&format!(":{}", self.port));
        }
        url.push_str(&self.fullpath);
        url
    }

    fn is_default_port(&self) -> bool {
        matches!((self.scheme.as_str(), self.port), ("http", 80) | ("https", 443))
    }
}

fn default_port(scheme: &str) -> u16 {
    match scheme {
        "https" => 443,
        _ => 80,
    }
}

fn first_header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Split `host[:port]`, keeping IPv6 brackets on the host
fn split_host_port(authority: &str) -> (&str, Option<u16>) {
    if authority.starts_with('[') {
        return match authority.find(']') {
            Some(end) => {
                let port = authority[end + 1..].strip_prefix(':').and_then(|p| p.parse().ok());
                (&authority[..=end], port)
            },
            None => (authority, None),
        };
    }

    match authority.rsplit_once(':') {
        Some((host, port)) => match port.parse() {
            Ok(port) => (host, Some(port)),
            Err(_) => (authority, None),
        },
        None => (authority, None),
    }
}
