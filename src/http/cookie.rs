//! Cookie header decoding and rendering

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single `name=value` pair from a `Cookie` request header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Decode the value of a `Cookie` header into ordered pairs
    ///
    /// Pairs are separated by `;` and split on the first `=`. A pair
    /// without `=` becomes a cookie with an empty value.
    pub fn parse_header(value: &str) -> Vec<Cookie> {
        value
            .split(';')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((name, value)) => Cookie::new(name.trim(), value.trim()),
                None => Cookie::new(pair, ""),
            })
            .collect()
    }

    /// Render a list of cookies back into a `Cookie` header value
    pub fn join(cookies: &[Cookie]) -> String {
        cookies
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}
