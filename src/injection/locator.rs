//! Structured locators - Find a named field in one request region
//!
//! Each locator decodes one region of the request (query string,
//! url-encoded body, JSON body, cookies), checks whether the target
//! name is present and, if so, emits one variant per payload with that
//! single field replaced or appended to.

use serde_json::{Map, Value};
use tracing::debug;

use super::stamp;
use crate::http::{encode_form, parse_form, FormParams, Request};
use crate::payloads::Payloads;

/// Request region scanned by a structured injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locator {
    /// URL query string
    Query,
    /// `application/x-www-form-urlencoded` body
    Body,
    /// Top-level keys of a JSON object body
    Json,
    /// `Cookie` header
    Cookie,
}

impl Locator {
    /// All locators, in dispatch order
    pub fn all() -> Vec<Self> {
        vec![Self::Query, Self::Body, Self::Cookie, Self::Json]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Body => "body",
            Self::Json => "json",
            Self::Cookie => "cookie",
        }
    }

    /// Whether this locator scans the request at all
    pub fn applies_to(&self, request: &Request) -> bool {
        match self {
            Self::Query | Self::Json => true,
            Self::Body => request.carries_body(),
            Self::Cookie => request.has_header("Cookie"),
        }
    }

    /// Field names present in this locator's region, in request order
    pub fn points(&self, request: &Request) -> Vec<String> {
        if !self.applies_to(request) {
            return Vec::new();
        }
        match self {
            Self::Query => parse_form(request.query()).into_keys().collect(),
            Self::Body => form_body(request)
                .map(|params| params.into_keys().collect())
                .unwrap_or_default(),
            Self::Json => json_object(&request.content)
                .map(|object| object.into_iter().map(|(k, _)| k).collect())
                .unwrap_or_default(),
            Self::Cookie => request.cookies().into_iter().map(|c| c.name).collect(),
        }
    }

    /// Emit one variant per payload with `target` mutated
    ///
    /// Returns `None` when the locator does not apply, the region cannot
    /// be decoded, or `target` is not present in it.
    pub fn inject(
        &self,
        request: &Request,
        target: &str,
        payloads: &Payloads,
        append: bool,
    ) -> Option<Vec<Request>> {
        if !self.applies_to(request) {
            return None;
        }
        let variants = match self {
            Self::Query => inject_query(request, target, payloads, append),
            Self::Body => inject_body(request, target, payloads, append),
            Self::Json => inject_json(request, target, payloads, append),
            Self::Cookie => inject_cookie(request, target, payloads, append),
        };
        match &variants {
            Some(v) => debug!(
                "{} locator: {} variants for '{}'",
                self.as_str(),
                v.len(),
                target
            ),
            None => debug!("{} locator: '{}' not present", self.as_str(), target),
        }
        variants
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn mutate(original: &str, payload: &str, append: bool) -> String {
    if append {
        format!("{}{}", original, payload)
    } else {
        payload.to_string()
    }
}

/// Form parameters with `target` set to a single mutated value
///
/// Only the first original value is kept; repeated parameters collapse
/// into one.
fn mutated_form<'a>(
    params: &'a FormParams,
    target: &'a str,
    payloads: &'a Payloads,
    append: bool,
) -> Option<impl Iterator<Item = (&'a String, FormParams)> + 'a> {
    let original = params.get(target)?.first().cloned().unwrap_or_default();
    Some(payloads.iter().map(move |payload| {
        let mut mutated = params.clone();
        mutated.insert(target.to_string(), vec![mutate(&original, payload, append)]);
        (payload, mutated)
    }))
}

fn inject_query(
    request: &Request,
    target: &str,
    payloads: &Payloads,
    append: bool,
) -> Option<Vec<Request>> {
    let params = parse_form(request.query());
    let variants = mutated_form(&params, target, payloads, append)?
        .map(|(payload, mutated)| {
            let mut variant = request.clone();
            variant.set_query(&encode_form(&mutated));
            stamp(&mut variant, target, payload);
            variant
        })
        .collect();
    Some(variants)
}

fn inject_body(
    request: &Request,
    target: &str,
    payloads: &Payloads,
    append: bool,
) -> Option<Vec<Request>> {
    let params = form_body(request)?;
    let variants = mutated_form(&params, target, payloads, append)?
        .map(|(payload, mutated)| {
            let mut variant = request.clone();
            variant.set_content(encode_form(&mutated));
            stamp(&mut variant, target, payload);
            variant
        })
        .collect();
    Some(variants)
}

fn inject_json(
    request: &Request,
    target: &str,
    payloads: &Payloads,
    append: bool,
) -> Option<Vec<Request>> {
    let object = json_object(&request.content)?;
    let original = match object.get(target)? {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let variants = payloads
        .iter()
        .map(|payload| {
            let mut mutated = object.clone();
            mutated.insert(
                target.to_string(),
                Value::String(mutate(&original, payload, append)),
            );
            let mut variant = request.clone();
            variant.set_content(Value::Object(mutated).to_string());
            stamp(&mut variant, target, payload);
            variant
        })
        .collect();
    Some(variants)
}

fn inject_cookie(
    request: &Request,
    target: &str,
    payloads: &Payloads,
    append: bool,
) -> Option<Vec<Request>> {
    let cookies = request.cookies();
    let index = cookies.iter().position(|c| c.name == target)?;
    let original = cookies[index].value.clone();

    let variants = payloads
        .iter()
        .map(|payload| {
            let mut mutated = cookies.clone();
            mutated[index].value = mutate(&original, payload, append);
            let mut variant = request.clone();
            variant.set_cookies(&mutated);
            stamp(&mut variant, target, payload);
            variant
        })
        .collect();
    Some(variants)
}

/// Url-encoded body parameters; JSON bodies are left to the JSON locator
fn form_body(request: &Request) -> Option<FormParams> {
    if request.content.is_empty() || json_object(&request.content).is_some() {
        return None;
    }
    Some(parse_form(&request.content))
}

/// Body decoded as a JSON object, if it is one
fn json_object(content: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(content) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}
