//! HTTP request - parsing, serialization and field access

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use super::cookie::Cookie;
use crate::errors::{InjectError, Result};

const DEFAULT_VERSION: &str = "HTTP/1.1";

/// One HTTP/1.x request
///
/// Cloning yields a fully independent value. The `injection_point` and
/// `payload` fields are only ever set on variants produced by the
/// injection engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Request method (GET, POST, ...)
    pub method: String,
    /// Request target as it appears on the request line, query included
    pub url: String,
    /// Protocol version from the request line
    pub version: String,
    /// Ordered header list
    pub headers: Vec<(String, String)>,
    /// Body content
    pub content: String,
    /// Host the request is sent to
    pub hostname: String,
    /// Port the request is sent to
    pub port: u16,
    /// Whether the request is sent over TLS
    pub use_tls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    injection_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<String>,
}

impl Request {
    /// Parse raw request text
    ///
    /// When `hostname` is empty it is taken from the `Host` header. A port
    /// of 0 means "derive from the `Host` header or the TLS flag".
    pub fn parse(raw: &str, hostname: &str, port: u16, use_tls: bool) -> Result<Self> {
        Self::parse_with(raw, hostname, port, use_tls, false)
    }

    /// Parse request text produced by splicing payloads into a request
    ///
    /// Leading blank lines are skipped, the target may be empty and a header
    /// line without a colon is folded into the previous header value (or
    /// kept as a header with an empty value). Only text without a request
    /// line is rejected.
    pub fn parse_lenient(raw: &str, hostname: &str, port: u16, use_tls: bool) -> Result<Self> {
        Self::parse_with(raw, hostname, port, use_tls, true)
    }

    fn parse_with(
        raw: &str,
        hostname: &str,
        port: u16,
        use_tls: bool,
        lenient: bool,
    ) -> Result<Self> {
        let raw = if lenient {
            raw.trim_start_matches(['\r', '\n'])
        } else {
            raw
        };
        let (head, content) = split_head(raw);
        let mut lines = head.lines();

        let request_line = lines
            .next()
            .filter(|line| !line.trim().is_empty())
            .ok_or_else(|| InjectError::malformed("empty request"))?;

        let (method, url, version) = split_request_line(request_line);
        if url.is_empty() && !lenient {
            return Err(InjectError::malformed(format!(
                "request line '{}' has no target",
                request_line
            )));
        }

        let mut headers: Vec<(String, String)> = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            match line.split_once(':') {
                Some((name, value)) => {
                    headers.push((name.trim().to_string(), value.trim().to_string()))
                }
                None if lenient => match headers.last_mut() {
                    Some((_, value)) => {
                        value.push_str("\r\n");
                        value.push_str(line);
                    }
                    None => headers.push((line.trim().to_string(), String::new())),
                },
                None => {
                    return Err(InjectError::malformed(format!(
                        "invalid header line '{}'",
                        line
                    )))
                }
            }
        }

        let mut request = Self {
            method: method.to_string(),
            url: url.to_string(),
            version: version.unwrap_or(DEFAULT_VERSION).to_string(),
            headers,
            content: content.to_string(),
            hostname: hostname.to_string(),
            port,
            use_tls,
            injection_point: None,
            payload: None,
        };
        request.fill_host_from_header();
        Ok(request)
    }

    /// Build a request from an absolute URL
    pub fn from_url(method: &str, url: &str) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| InjectError::malformed(format!("invalid URL '{}': {}", url, e)))?;
        let hostname = parsed
            .host_str()
            .ok_or_else(|| InjectError::malformed(format!("URL '{}' has no host", url)))?
            .to_string();
        let use_tls = parsed.scheme() == "https";
        let port = parsed.port_or_known_default().unwrap_or(if use_tls { 443 } else { 80 });

        let mut target = parsed.path().to_string();
        if let Some(query) = parsed.query() {
            target.push('?');
            target.push_str(query);
        }

        let host_header = match parsed.port() {
            Some(p) => format!("{}:{}", hostname, p),
            None => hostname.clone(),
        };

        Ok(Self {
            method: method.to_uppercase(),
            url: target,
            version: DEFAULT_VERSION.to_string(),
            headers: vec![("Host".to_string(), host_header)],
            content: String::new(),
            hostname,
            port,
            use_tls,
            injection_point: None,
            payload: None,
        })
    }

    fn fill_host_from_header(&mut self) {
        if self.hostname.is_empty() {
            if let Some(host) = self.header("Host").map(str::to_string) {
                match host.rsplit_once(':') {
                    Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => {
                        self.hostname = name.to_string();
                        if self.port == 0 {
                            self.port = port.parse().unwrap_or(0);
                        }
                    }
                    _ => self.hostname = host,
                }
            }
        }
        if self.port == 0 {
            self.port = if self.use_tls { 443 } else { 80 };
        }
    }

    /// Serialize back to raw request text
    pub fn to_raw(&self) -> String {
        let mut raw = format!("{} {} {}\r\n", self.method, self.url, self.version);
        for (name, value) in &self.headers {
            raw.push_str(name);
            raw.push_str(": ");
            raw.push_str(value);
            raw.push_str("\r\n");
        }
        raw.push_str("\r\n");
        raw.push_str(&self.content);
        raw
    }

    /// Get the first header with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// Append a header, keeping any existing one with the same name
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Replace the first header with the given name in place, or append it
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            entry.1 = value;
            return;
        }
        self.headers.push((name.to_string(), value));
    }

    /// Remove every header with the given name
    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    /// Query string of the request target, without `?` and fragment
    pub fn query(&self) -> &str {
        match self.url.split_once('?') {
            Some((_, rest)) => rest.split('#').next().unwrap_or(""),
            None => "",
        }
    }

    /// Replace the query string, keeping path and fragment
    pub fn set_query(&mut self, query: &str) {
        let (without_fragment, fragment) = match self.url.split_once('#') {
            Some((before, frag)) => (before, Some(frag)),
            None => (self.url.as_str(), None),
        };
        let path = without_fragment
            .split_once('?')
            .map_or(without_fragment, |(p, _)| p);

        let mut url = path.to_string();
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        if let Some(frag) = fragment {
            url.push('#');
            url.push_str(frag);
        }
        self.url = url;
    }

    /// All cookies sent with the request, across every `Cookie` header
    pub fn cookies(&self) -> Vec<Cookie> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("Cookie"))
            .flat_map(|(_, v)| Cookie::parse_header(v))
            .collect()
    }

    /// Replace every `Cookie` header with one built from `cookies`
    pub fn set_cookies(&mut self, cookies: &[Cookie]) {
        self.remove_header("Cookie");
        self.add_header("Cookie", Cookie::join(cookies));
    }

    /// Whether the method is one that carries a request body
    pub fn carries_body(&self) -> bool {
        matches!(
            self.method.to_ascii_uppercase().as_str(),
            "POST" | "PUT" | "PATCH"
        )
    }

    /// Replace the body and recompute its declared length
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.update_content_length();
    }

    /// Set `Content-Length` to the byte length of the body
    ///
    /// The header is dropped when there is no body and the method does not
    /// carry one.
    pub fn update_content_length(&mut self) {
        if self.content.is_empty() && !self.carries_body() {
            self.remove_header("Content-Length");
        } else {
            self.set_header("Content-Length", self.content.len().to_string());
        }
    }

    pub fn injection_point(&self) -> Option<&str> {
        self.injection_point.as_deref()
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn set_injection_point(&mut self, point: impl Into<String>) {
        self.injection_point = Some(point.into());
    }

    pub fn set_payload(&mut self, payload: impl Into<String>) {
        self.payload = Some(payload.into());
    }

    /// Whether this request was produced by an injection operation
    pub fn is_variant(&self) -> bool {
        self.injection_point.is_some()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw())
    }
}

/// Split a request line into method, target and version
///
/// The target is everything between the method and a trailing `HTTP/`
/// version token, kept verbatim.
fn split_request_line(line: &str) -> (&str, &str, Option<&str>) {
    let line = line.trim();
    let (method, rest) = match line.split_once(char::is_whitespace) {
        Some((method, rest)) => (method, rest.trim_start()),
        None => (line, ""),
    };
    match rest.rsplit_once(char::is_whitespace) {
        Some((target, version)) if version.starts_with("HTTP/") => {
            (method, target.trim_end(), Some(version))
        }
        _ => (method, rest, None),
    }
}

/// Split raw text at the first empty line
fn split_head(raw: &str) -> (&str, &str) {
    let crlf = raw.find("\r\n\r\n").map(|i| (i, 4));
    let lf = raw.find("\n\n").map(|i| (i, 2));

    let split = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };

    match split {
        Some((idx, sep)) => (&raw[..idx], &raw[idx + sep..]),
        None => (raw, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST: &str = "POST /login?next=%2Fhome HTTP/1.1\r\n\
                        Host: example.org:8080\r\n\
                        Content-Type: application/x-www-form-urlencoded\r\n\
                        Content-Length: 27\r\n\
                        \r\n\
                        user=alice&password=secret1";

    #[test]
    fn parse_request_line_and_headers() {
        let r = Request::parse(POST, "", 0, false).unwrap();
        assert_eq!(r.method, "POST");
        assert_eq!(r.url, "/login?next=%2Fhome");
        assert_eq!(r.version, "HTTP/1.1");
        assert_eq!(r.headers.len(), 3);
        assert_eq!(r.content, "user=alice&password=secret1");
    }

    #[test]
    fn parse_derives_host_and_port() {
        let r = Request::parse(POST, "", 0, false).unwrap();
        assert_eq!(r.hostname, "example.org");
        assert_eq!(r.port, 8080);
    }

    #[test]
    fn parse_keeps_explicit_host() {
        let r = Request::parse(POST, "10.0.0.1", 443, true).unwrap();
        assert_eq!(r.hostname, "10.0.0.1");
        assert_eq!(r.port, 443);
        assert!(r.use_tls);
    }

    #[test]
    fn parse_accepts_bare_newlines() {
        let r = Request::parse("GET /?a=1 HTTP/1.0\nHost: h\n\nbody", "", 0, false).unwrap();
        assert_eq!(r.version, "HTTP/1.0");
        assert_eq!(r.header("host"), Some("h"));
        assert_eq!(r.content, "body");
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!(
            Request::parse("", "", 0, false),
            Err(InjectError::MalformedRequest { .. })
        ));
        assert!(matches!(
            Request::parse("GET\r\n\r\n", "", 0, false),
            Err(InjectError::MalformedRequest { .. })
        ));
        assert!(matches!(
            Request::parse("GET / HTTP/1.1\r\nnot a header\r\n\r\n", "", 0, false),
            Err(InjectError::MalformedRequest { .. })
        ));
    }

    #[test]
    fn target_with_spaces_kept_verbatim() {
        let r = Request::parse("GET /a?q=' OR 1=1-- HTTP/1.1\r\nHost: h\r\n\r\n", "", 0, false)
            .unwrap();
        assert_eq!(r.method, "GET");
        assert_eq!(r.url, "/a?q=' OR 1=1--");
        assert_eq!(r.version, "HTTP/1.1");

        let no_version = Request::parse("GET /a b\r\n\r\n", "h", 80, false).unwrap();
        assert_eq!(no_version.url, "/a b");
        assert_eq!(no_version.version, "HTTP/1.1");
    }

    #[test]
    fn lenient_parse_tolerates_spliced_text() {
        let r = Request::parse_lenient(
            "\r\nX-Injected: 1GET / HTTP/1.1\r\nHost: h\r\n\r\n",
            "",
            0,
            false,
        )
        .unwrap();
        assert_eq!(r.method, "X-Injected:");
        assert_eq!(r.url, "1GET /");
        assert_eq!(r.header("Host"), Some("h"));

        let folded = Request::parse_lenient(
            "GET / HTTP/1.1\r\nX-Test: x\r\nnocolon\r\nHost: h\r\n\r\n",
            "",
            0,
            false,
        )
        .unwrap();
        assert_eq!(folded.header("X-Test"), Some("x\r\nnocolon"));
        assert_eq!(folded.header("Host"), Some("h"));
        assert!(folded.to_raw().contains("X-Test: x\r\nnocolon\r\n"));

        let first = Request::parse_lenient("GET /\r\nnocolon\r\n\r\n", "h", 80, false).unwrap();
        assert_eq!(first.headers, vec![("nocolon".to_string(), String::new())]);

        assert!(Request::parse_lenient("\r\n", "h", 80, false).is_err());
    }

    #[test]
    fn raw_round_trip() {
        let r = Request::parse(POST, "", 0, false).unwrap();
        let again = Request::parse(&r.to_raw(), "", 0, false).unwrap();
        assert_eq!(r, again);
        assert_eq!(r.to_string(), POST);
    }

    #[test]
    fn from_url_builds_request() {
        let r = Request::from_url("get", "https://example.org/search?q=rust").unwrap();
        assert_eq!(r.method, "GET");
        assert_eq!(r.url, "/search?q=rust");
        assert_eq!(r.port, 443);
        assert!(r.use_tls);
        assert_eq!(r.header("Host"), Some("example.org"));
    }

    #[test]
    fn query_and_set_query_keep_fragment() {
        let mut r = Request::from_url("GET", "http://h/p?a=1#frag").unwrap();
        r.url = "/p?a=1#frag".to_string();
        assert_eq!(r.query(), "a=1");
        r.set_query("a=2&b=3");
        assert_eq!(r.url, "/p?a=2&b=3#frag");
        r.set_query("");
        assert_eq!(r.url, "/p#frag");
    }

    #[test]
    fn header_helpers() {
        let mut r = Request::from_url("GET", "http://h/").unwrap();
        r.add_header("X-Test", "1");
        r.add_header("x-test", "2");
        assert_eq!(r.header("X-TEST"), Some("1"));
        r.set_header("X-Test", "3");
        assert_eq!(r.header("x-test"), Some("3"));
        r.remove_header("X-Test");
        assert!(!r.has_header("x-test"));
    }

    #[test]
    fn cookies_span_all_headers() {
        let mut r = Request::from_url("GET", "http://h/").unwrap();
        r.add_header("Cookie", "a=1; b=2");
        r.add_header("cookie", "c=3");
        let names: Vec<_> = r.cookies().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        r.set_cookies(&[Cookie::new("z", "9")]);
        assert_eq!(r.header("Cookie"), Some("z=9"));
        assert_eq!(r.cookies().len(), 1);
    }

    #[test]
    fn content_length_tracks_body() {
        let mut r = Request::parse(POST, "", 0, false).unwrap();
        r.set_content("x=ü");
        assert_eq!(r.header("Content-Length"), Some("4"));

        let mut get = Request::from_url("GET", "http://h/").unwrap();
        get.add_header("Content-Length", "10");
        get.update_content_length();
        assert!(!get.has_header("Content-Length"));
    }

    #[test]
    fn traceability_fields_start_unset() {
        let mut r = Request::parse(POST, "", 0, false).unwrap();
        assert!(!r.is_variant());
        r.set_injection_point("user");
        r.set_payload("'");
        assert_eq!(r.injection_point(), Some("user"));
        assert_eq!(r.payload(), Some("'"));
    }
}
