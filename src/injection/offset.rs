//! Raw offset injection - Splice payloads into the serialized request
//!
//! The request is rendered to text, a byte range of that text is replaced
//! by each payload and the result is parsed back into a request.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::stamp;
use crate::errors::{InjectError, Result};
use crate::http::Request;
use crate::payloads::Payloads;

/// Where to splice in the raw request text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Offset {
    /// Replace bytes `begin..end`
    Span(usize, usize),
    /// Insert at a byte position
    Point(usize),
    /// Replace one occurrence of a literal substring
    Pattern(String),
}

impl Offset {
    /// Resolve to a byte range of `text`
    ///
    /// `choice` selects among several occurrences of a pattern and is
    /// 1-based. It is ignored when the pattern occurs exactly once.
    pub fn locate(&self, text: &str, choice: Option<usize>) -> Result<(usize, usize)> {
        let (begin, end) = match self {
            Self::Span(begin, end) => (*begin, *end),
            Self::Point(pos) => (*pos, *pos),
            Self::Pattern(pattern) => return locate_pattern(text, pattern, choice),
        };

        if begin > end
            || end > text.len()
            || !text.is_char_boundary(begin)
            || !text.is_char_boundary(end)
        {
            return Err(InjectError::OffsetOutOfRange {
                begin,
                end,
                len: text.len(),
            });
        }
        Ok((begin, end))
    }
}

fn locate_pattern(text: &str, pattern: &str, choice: Option<usize>) -> Result<(usize, usize)> {
    if pattern.is_empty() {
        return Err(InjectError::no_injection_point(pattern));
    }

    let occurrences: Vec<usize> = text.match_indices(pattern).map(|(i, _)| i).collect();
    let begin = match (occurrences.len(), choice) {
        (0, _) => return Err(InjectError::no_injection_point(pattern)),
        (1, _) => occurrences[0],
        (count, Some(n)) if (1..=count).contains(&n) => occurrences[n - 1],
        (count, _) => return Err(InjectError::non_unique(pattern, count)),
    };
    Ok((begin, begin + pattern.len()))
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Span(begin, end) => write!(f, "({}, {})", begin, end),
            Self::Point(pos) => write!(f, "{}", pos),
            Self::Pattern(pattern) => f.write_str(pattern),
        }
    }
}

/// Parse `BEGIN:END` as a span or `POS` as a point
impl FromStr for Offset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let number = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid offset '{}': expected POS or BEGIN:END", s))
        };
        match s.split_once(':') {
            Some((begin, end)) => Ok(Self::Span(number(begin)?, number(end)?)),
            None => Ok(Self::Point(number(s)?)),
        }
    }
}

impl From<&str> for Offset {
    fn from(pattern: &str) -> Self {
        Self::Pattern(pattern.to_string())
    }
}

impl From<String> for Offset {
    fn from(pattern: String) -> Self {
        Self::Pattern(pattern)
    }
}

impl From<(usize, usize)> for Offset {
    fn from((begin, end): (usize, usize)) -> Self {
        Self::Span(begin, end)
    }
}

impl From<usize> for Offset {
    fn from(pos: usize) -> Self {
        Self::Point(pos)
    }
}

/// Emit one variant per payload with the located range replaced
///
/// Each variant is re-parsed leniently with the original host, port and
/// TLS flag, and its `Content-Length` is recomputed from the new body.
/// A spliced text with no request line left is skipped.
pub fn inject_at(
    request: &Request,
    offset: &Offset,
    payloads: &Payloads,
    choice: Option<usize>,
) -> Result<Vec<Request>> {
    let original = request.to_raw();
    let (begin, end) = offset.locate(&original, choice)?;
    let point = format!("@{}", offset);
    debug!("Injecting at {} (bytes {}..{})", point, begin, end);

    let variants = payloads
        .iter()
        .filter_map(|payload| {
            let text = format!("{}{}{}", &original[..begin], payload, &original[end..]);
            let mut variant = match Request::parse_lenient(
                &text,
                &request.hostname,
                request.port,
                request.use_tls,
            ) {
                Ok(variant) => variant,
                Err(e) => {
                    warn!("Skipping payload {:?} at {}: {}", payload, point, e);
                    return None;
                }
            };
            variant.remove_header("Content-Length");
            variant.update_content_length();
            stamp(&mut variant, &point, payload);
            Some(variant)
        })
        .collect();
    Ok(variants)
}
