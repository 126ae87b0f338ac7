//! Payload pre-processing
//!
//! Every payload goes through a pre-processing function before it is
//! substituted into a request. The default passes text through as-is;
//! the other encodings are common filter-evasion transforms.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use url::form_urlencoded;

/// Function applied to every payload before substitution
pub type PreFunc = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Built-in payload encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadEncoding {
    /// Payload text unchanged
    #[default]
    Raw,
    /// Form URL encoding (`+` for spaces)
    Url,
    /// URL encoding applied twice
    DoubleUrl,
    /// Standard base64
    Base64,
    /// HTML entities for markup-significant characters
    Html,
    /// `\xNN` escape for every byte
    Hex,
}

impl PayloadEncoding {
    pub fn all() -> Vec<Self> {
        vec![
            Self::Raw,
            Self::Url,
            Self::DoubleUrl,
            Self::Base64,
            Self::Html,
            Self::Hex,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Url => "url",
            Self::DoubleUrl => "double-url",
            Self::Base64 => "base64",
            Self::Html => "html",
            Self::Hex => "hex",
        }
    }

    /// Encode one payload
    pub fn encode(&self, payload: &str) -> String {
        match self {
            Self::Raw => payload.to_string(),
            Self::Url => url_encode(payload),
            Self::DoubleUrl => url_encode(&url_encode(payload)),
            Self::Base64 => BASE64.encode(payload.as_bytes()),
            Self::Html => html_encode(payload),
            Self::Hex => payload.bytes().map(|b| format!("\\x{:02x}", b)).collect(),
        }
    }

    /// Wrap this encoding as a pre-processing function
    pub fn pre_func(self) -> PreFunc {
        Arc::new(move |payload: &str| self.encode(payload))
    }
}

impl fmt::Display for PayloadEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<_> = Self::all().iter().map(|e| e.as_str()).collect();
                format!("unknown encoding '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

fn url_encode(input: &str) -> String {
    form_urlencoded::byte_serialize(input.as_bytes()).collect()
}

fn html_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '<' => encoded.push_str("&lt;"),
            '>' => encoded.push_str("&gt;"),
            '&' => encoded.push_str("&amp;"),
            '"' => encoded.push_str("&quot;"),
            '\'' => encoded.push_str("&#x27;"),
            _ => encoded.push(ch),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_is_identity() {
        assert_eq!(PayloadEncoding::Raw.encode("' OR 1=1--"), "' OR 1=1--");
    }

    #[test]
    fn url_and_double_url() {
        assert_eq!(PayloadEncoding::Url.encode("a b&c"), "a+b%26c");
        assert_eq!(PayloadEncoding::DoubleUrl.encode("a b&c"), "a%2Bb%2526c");
    }

    #[test]
    fn base64_html_hex() {
        assert_eq!(PayloadEncoding::Base64.encode("abc"), "YWJj");
        assert_eq!(
            PayloadEncoding::Html.encode("<a href='x'>"),
            "&lt;a href=&#x27;x&#x27;&gt;"
        );
        assert_eq!(PayloadEncoding::Hex.encode("AB"), "\\x41\\x42");
    }

    #[test]
    fn parse_names() {
        assert_eq!("double-url".parse(), Ok(PayloadEncoding::DoubleUrl));
        assert_eq!("RAW".parse(), Ok(PayloadEncoding::Raw));
        assert!("rot13".parse::<PayloadEncoding>().is_err());
    }

    #[test]
    fn pre_func_wraps_encoding() {
        let f = PayloadEncoding::Base64.pre_func();
        assert_eq!(f("abc"), "YWJj");
    }
}
