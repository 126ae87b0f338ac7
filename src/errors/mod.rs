//! Error handling with miette diagnostics
//!
//! Every failure the injection engine reports to its caller is an
//! [`InjectError`]. Malformed structured bodies are not errors: the locator
//! that cannot decode them simply contributes no variants.

pub mod suggestions;

use miette::Diagnostic;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, InjectError>;

/// Main error type for httpinject with rich diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum InjectError {
    /// Payload specifier names a set that is not loaded
    #[error("Payload set '{name}' not found. Possible values are: {available}")]
    #[diagnostic(code(httpinject::payload::not_found), help("{suggestion}"))]
    PayloadNotFound {
        name: String,
        available: String,
        suggestion: String,
    },

    /// The named field or pattern does not occur in the request
    #[error("No injection point found for '{target}'")]
    #[diagnostic(code(httpinject::target::not_found), help("{suggestion}"))]
    NoInjectionPointFound { target: String, suggestion: String },

    /// An offset pattern occurs more than once and no valid choice was given
    #[error("The pattern '{pattern}' is not unique in the request ({count} occurrences)")]
    #[diagnostic(
        code(httpinject::target::not_unique),
        help("Select one occurrence with a choice between 1 and {count}")
    )]
    NonUniqueInjectionPoint { pattern: String, count: usize },

    /// Neither or both of the `to` / `at` modes were requested
    #[error("Invalid injection target: {message}")]
    #[diagnostic(
        code(httpinject::target::mode),
        help("Inject either to a parameter name or at an offset/pattern, not both")
    )]
    InvalidTargetMode { message: String },

    /// An explicit offset falls outside the serialized request
    #[error("Offset {begin}..{end} is outside the request ({len} bytes)")]
    #[diagnostic(
        code(httpinject::target::offset),
        help("Offsets are byte positions in the raw request text and must fall on character boundaries")
    )]
    OffsetOutOfRange { begin: usize, end: usize, len: usize },

    /// Raw request text could not be parsed
    #[error("Malformed request: {message}")]
    #[diagnostic(code(httpinject::request::malformed))]
    MalformedRequest { message: String },
}

impl InjectError {
    /// Create a payload-not-found error listing the known set names
    pub fn payload_not_found(name: impl Into<String>, known: &[String]) -> Self {
        let name = name.into();
        let suggestion = suggestions::suggest_payload_set(&name, known);

        Self::PayloadNotFound {
            name,
            available: known.join(", "),
            suggestion,
        }
    }

    pub fn no_injection_point(target: impl Into<String>) -> Self {
        Self::NoInjectionPointFound {
            target: target.into(),
            suggestion: "List the available injection points with: httpinject points <request>"
                .to_string(),
        }
    }

    /// Create a no-injection-point error pointing at the closest known point
    pub fn no_injection_point_among(target: impl Into<String>, points: &[String]) -> Self {
        let target = target.into();
        match suggestions::suggest_injection_point(&target, points) {
            Some(suggestion) => Self::NoInjectionPointFound { target, suggestion },
            None => Self::no_injection_point(target),
        }
    }

    pub fn non_unique(pattern: impl Into<String>, count: usize) -> Self {
        Self::NonUniqueInjectionPoint {
            pattern: pattern.into(),
            count,
        }
    }

    pub fn invalid_target_mode(message: impl Into<String>) -> Self {
        Self::InvalidTargetMode {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }
}

/// Add contextual hints to errors surfaced by the command line
pub fn format_error(err: &anyhow::Error) -> String {
    if let Some(inject) = err.downcast_ref::<InjectError>() {
        return match inject {
            InjectError::PayloadNotFound { suggestion, .. } => {
                format!("{}\n\nHint: {}", err, suggestion)
            }
            InjectError::NonUniqueInjectionPoint { count, .. } => {
                format!("{}\n\nHint: pass --choice <1..={}>", err, count)
            }
            InjectError::NoInjectionPointFound { suggestion, .. } => {
                format!("{}\n\nHint: {}", err, suggestion)
            }
            _ => err.to_string(),
        };
    }

    let err_lower = err.to_string().to_lowercase();
    if err_lower.contains("no such file") || err_lower.contains("failed to read") {
        format!("{}\n\nHint: check the request file path", err)
    } else {
        format!("{:#}", err)
    }
}
