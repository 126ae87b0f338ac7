//! Injection Engine - Turn one request into many payload-carrying variants
//!
//! Two targeting modes are supported:
//!
//! - **to**: a field name, looked up in the query string, url-encoded body,
//!   cookies and JSON body ([`Locator`])
//! - **at**: a byte range or literal pattern of the raw request text
//!   ([`Offset`])
//!
//! Every variant is an independent clone of its template, stamped with the
//! injection point and the payload it carries.

pub mod headers;
pub mod locator;
pub mod offset;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;
use tracing::{debug, info};

pub use self::locator::Locator;
pub use self::offset::Offset;
use crate::errors::{InjectError, Result};
use crate::http::{Request, RequestInput, RequestSet};
use crate::payloads::{PayloadEncoding, PayloadSpec, PayloadStore, Payloads, PreFunc};

/// Record where a variant was injected and with what
pub(crate) fn stamp(variant: &mut Request, point: &str, payload: &str) {
    variant.set_injection_point(point);
    variant.set_payload(payload);
}

/// Every field name the structured locators can inject into
///
/// Names are reported once, in region order: query, body, cookies, JSON.
pub fn find_injection_points(request: &Request) -> Vec<String> {
    let points: IndexSet<String> = Locator::all()
        .into_iter()
        .flat_map(|locator| locator.points(request))
        .collect();
    points.into_iter().collect()
}

/// Parameters of one [`Injector::inject`] call
///
/// Exactly one of the `to` / `at` modes must be used.
#[derive(Clone, Default)]
pub struct InjectSpec {
    to: Vec<String>,
    at: Vec<Offset>,
    payloads: PayloadSpec,
    append: bool,
    choice: Option<usize>,
    pre_func: Option<PreFunc>,
}

impl InjectSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject into a named field
    pub fn to(mut self, target: impl Into<String>) -> Self {
        self.to.push(target.into());
        self
    }

    /// Inject into several named fields, one after the other
    pub fn to_each<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.to.extend(targets.into_iter().map(Into::into));
        self
    }

    /// Inject at an offset or pattern of the raw request
    pub fn at(mut self, offset: impl Into<Offset>) -> Self {
        self.at.push(offset.into());
        self
    }

    /// Inject at several offsets, one after the other
    pub fn at_each<I, O>(mut self, offsets: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<Offset>,
    {
        self.at.extend(offsets.into_iter().map(Into::into));
        self
    }

    pub fn with_payloads(mut self, payloads: impl Into<PayloadSpec>) -> Self {
        self.payloads = payloads.into();
        self
    }

    /// Append payloads to the original value instead of replacing it
    ///
    /// Only meaningful for `to` injections.
    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Select the n-th (1-based) occurrence of a repeated `at` pattern
    pub fn with_choice(mut self, choice: usize) -> Self {
        self.choice = Some(choice);
        self
    }

    /// Override the injector's payload pre-processing for this call
    pub fn with_pre_func(mut self, pre_func: PreFunc) -> Self {
        self.pre_func = Some(pre_func);
        self
    }

    pub fn with_encoding(self, encoding: PayloadEncoding) -> Self {
        self.with_pre_func(encoding.pre_func())
    }

    pub fn targets(&self) -> &[String] {
        &self.to
    }

    pub fn offsets(&self) -> &[Offset] {
        &self.at
    }

    pub fn payloads(&self) -> &PayloadSpec {
        &self.payloads
    }

    fn check_mode(&self) -> Result<()> {
        match (self.to.is_empty(), self.at.is_empty()) {
            (true, true) => Err(InjectError::invalid_target_mode(
                "no injection target given, use 'to' or 'at'",
            )),
            (false, false) => Err(InjectError::invalid_target_mode(
                "both 'to' and 'at' given, use only one",
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for InjectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectSpec")
            .field("to", &self.to)
            .field("at", &self.at)
            .field("payloads", &self.payloads)
            .field("append", &self.append)
            .field("choice", &self.choice)
            .field("pre_func", &self.pre_func.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Injection engine bound to a payload store
#[derive(Clone)]
pub struct Injector {
    store: Arc<PayloadStore>,
    pre_func: PreFunc,
}

impl Default for Injector {
    fn default() -> Self {
        Self::new(PayloadStore::builtin())
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl Injector {
    /// Create an injector over a payload store
    ///
    /// The default pre-processing is [`PayloadEncoding::Raw`]: payloads pass
    /// through unchanged unless [`Injector::with_encoding`] or
    /// [`InjectSpec::with_encoding`] selects another encoding.
    pub fn new(store: PayloadStore) -> Self {
        Self::with_store(Arc::new(store))
    }

    /// Create an injector sharing an existing payload store
    pub fn with_store(store: Arc<PayloadStore>) -> Self {
        Self {
            store,
            pre_func: PayloadEncoding::Raw.pre_func(),
        }
    }

    /// Default pre-processing applied to every payload
    pub fn with_encoding(self, encoding: PayloadEncoding) -> Self {
        self.with_pre_func(encoding.pre_func())
    }

    pub fn with_pre_func(mut self, pre_func: PreFunc) -> Self {
        self.pre_func = pre_func;
        self
    }

    pub fn store(&self) -> &PayloadStore {
        &self.store
    }

    fn prepare(&self, payloads: &PayloadSpec, pre_func: Option<&PreFunc>) -> Result<Payloads> {
        self.store.prepare(payloads, pre_func.unwrap_or(&self.pre_func))
    }

    /// Inject payloads into one request or every request of a set
    ///
    /// Targets form the outer loop and requests the inner one; each
    /// request receives the full payload sequence. Any failing target
    /// fails the whole call.
    pub fn inject<'a>(
        &self,
        input: impl Into<RequestInput<'a>>,
        spec: &InjectSpec,
    ) -> Result<RequestSet> {
        spec.check_mode()?;
        let input: RequestInput<'a> = input.into();
        let requests = input.requests();
        let payloads = self.prepare(&spec.payloads, spec.pre_func.as_ref())?;

        let mut variants = RequestSet::new();
        for target in &spec.to {
            for request in requests {
                variants.extend(inject_to(request, target, &payloads, spec.append)?);
            }
        }
        for at in &spec.at {
            for request in requests {
                variants.extend(offset::inject_at(request, at, &payloads, spec.choice)?);
            }
        }

        info!(
            "Generated {} variants from {} requests",
            variants.len(),
            requests.len()
        );
        Ok(variants)
    }

    /// See [`find_injection_points`]
    pub fn find_injection_points(&self, request: &Request) -> Vec<String> {
        find_injection_points(request)
    }

    /// Inject into every discoverable field, replacing values
    ///
    /// A request without injection points contributes nothing.
    pub fn inject_all<'a>(
        &self,
        input: impl Into<RequestInput<'a>>,
        payloads: &PayloadSpec,
    ) -> Result<RequestSet> {
        let input: RequestInput<'a> = input.into();
        let requests = input.requests();
        let payloads = self.prepare(payloads, None)?;

        let mut variants = RequestSet::new();
        for request in requests {
            let points = find_injection_points(request);
            debug!("Discovered {} injection points", points.len());
            for point in &points {
                variants.extend(inject_to(request, point, &payloads, false)?);
            }
        }
        Ok(variants)
    }

    /// Replace each header value in turn with every payload
    pub fn fuzz_headers(&self, request: &Request, payloads: &PayloadSpec) -> Result<RequestSet> {
        let payloads = self.prepare(payloads, None)?;
        Ok(headers::fuzz_headers(request, &payloads).into())
    }
}

/// Run every applicable locator for one named target
///
/// Fails only when no locator finds the target at all. A present target
/// with an empty payload sequence yields no variants.
fn inject_to(
    request: &Request,
    target: &str,
    payloads: &Payloads,
    append: bool,
) -> Result<Vec<Request>> {
    let mut found = false;
    let mut variants = Vec::new();

    for locator in Locator::all() {
        if let Some(generated) = locator.inject(request, target, payloads, append) {
            found = true;
            variants.extend(generated);
        }
    }

    if !found {
        return Err(InjectError::no_injection_point_among(
            target,
            &find_injection_points(request),
        ));
    }
    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM_POST: &str = "POST /login?next=home HTTP/1.1\r\n\
                             Host: example.org\r\n\
                             Content-Type: application/x-www-form-urlencoded\r\n\
                             Cookie: sid=s1; lang=en\r\n\
                             \r\n\
                             user=alice&next=again";

    fn injector() -> Injector {
        let mut store = PayloadStore::new();
        store.insert("pair", vec!["p1".to_string(), "p2".to_string()]);
        store.insert("empty", Vec::new());
        Injector::new(store)
    }

    fn parse(raw: &str) -> Request {
        Request::parse(raw, "", 0, false).unwrap()
    }

    #[test]
    fn replace_mode_one_variant_per_payload() {
        let r = parse("GET /s?q=v&o=1 HTTP/1.1\r\nHost: h\r\n\r\n");
        let spec = InjectSpec::new().to("q").with_payloads("pair");
        let variants = injector().inject(&r, &spec).unwrap();

        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].query(), "q=p1&o=1");
        assert_eq!(variants[1].query(), "q=p2&o=1");
    }

    #[test]
    fn append_mode_concatenates() {
        let r = parse("GET /s?q=v HTTP/1.1\r\nHost: h\r\n\r\n");
        let spec = InjectSpec::new()
            .to("q")
            .with_payloads(vec!["'".to_string()])
            .with_append(true);
        let variants = injector().inject(&r, &spec).unwrap();
        assert_eq!(variants[0].query(), "q=v%27");
        assert_eq!(variants[0].payload(), Some("'"));
    }

    #[test]
    fn target_found_in_several_regions() {
        let r = parse(FORM_POST);
        let spec = InjectSpec::new().to("next").with_payloads("pair");
        let variants = injector().inject(&r, &spec).unwrap();

        // query then body
        assert_eq!(variants.len(), 4);
        assert_eq!(variants[0].query(), "next=p1");
        assert_eq!(variants[0].content, "user=alice&next=again");
        assert_eq!(variants[2].query(), "next=home");
        assert_eq!(variants[2].content, "user=alice&next=p1");
    }

    #[test]
    fn json_absent_but_query_present() {
        let mut r = parse("POST /api?id=7 HTTP/1.1\r\nHost: h\r\n\r\n");
        r.set_content(r#"{"name":"x"}"#);
        let spec = InjectSpec::new().to("id").with_payloads("pair");
        let variants = injector().inject(&r, &spec).unwrap();
        assert_eq!(variants.len(), 2);
        assert!(variants.iter().all(|v| v.content == r#"{"name":"x"}"#));
    }

    #[test]
    fn missing_everywhere_is_error_with_suggestion() {
        let r = parse(FORM_POST);
        let spec = InjectSpec::new().to("usr").with_payloads("pair");
        match injector().inject(&r, &spec).unwrap_err() {
            InjectError::NoInjectionPointFound { target, suggestion } => {
                assert_eq!(target, "usr");
                assert!(suggestion.contains("user"));
            }
            other => panic!("Expected NoInjectionPointFound, got {:?}", other),
        }
    }

    #[test]
    fn present_target_with_no_payloads_is_empty() {
        let r = parse("GET /?a=1 HTTP/1.1\r\nHost: h\r\n\r\n");
        let spec = InjectSpec::new().to("a").with_payloads("empty");
        assert!(injector().inject(&r, &spec).unwrap().is_empty());
    }

    #[test]
    fn target_mode_must_be_exclusive() {
        let r = parse("GET /?a=1 HTTP/1.1\r\nHost: h\r\n\r\n");
        let inj = injector();

        assert!(matches!(
            inj.inject(&r, &InjectSpec::new()),
            Err(InjectError::InvalidTargetMode { .. })
        ));
        assert!(matches!(
            inj.inject(&r, &InjectSpec::new().to("a").at("1")),
            Err(InjectError::InvalidTargetMode { .. })
        ));
    }

    #[test]
    fn unknown_payload_set_fails_before_injection() {
        let r = parse("GET /?a=1 HTTP/1.1\r\nHost: h\r\n\r\n");
        let spec = InjectSpec::new().to("a").with_payloads("nope");
        assert!(matches!(
            injector().inject(&r, &spec),
            Err(InjectError::PayloadNotFound { .. })
        ));
    }

    #[test]
    fn at_pattern_uniqueness_and_choice() {
        let r = parse("GET /?a=X&b=X HTTP/1.1\r\nHost: h\r\n\r\n");
        let inj = injector();

        let err = inj
            .inject(&r, &InjectSpec::new().at("X").with_payloads("pair"))
            .unwrap_err();
        assert!(matches!(err, InjectError::NonUniqueInjectionPoint { count: 2, .. }));

        let spec = InjectSpec::new().at("X").with_payloads("pair").with_choice(2);
        let variants = inj.inject(&r, &spec).unwrap();
        assert_eq!(variants[0].url, "/?a=X&b=p1");
        assert_eq!(variants[0].injection_point(), Some("@X"));

        let unique = inj
            .inject(&r, &InjectSpec::new().at("a=X").with_payloads("pair"))
            .unwrap();
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn fan_out_over_set_and_targets() {
        let set: RequestSet = (0..3)
            .map(|i| parse(&format!("GET /?a={}&b={} HTTP/1.1\r\nHost: h\r\n\r\n", i, i)))
            .collect();
        let spec = InjectSpec::new().to_each(["a", "b"]).with_payloads("pair");
        let mut variants = injector().inject(&set, &spec).unwrap();

        assert_eq!(variants.len(), 2 * 3 * 2);
        // targets outer, requests inner
        assert_eq!(variants[0].query(), "a=p1&b=0");
        assert_eq!(variants[2].query(), "a=p1&b=1");
        assert_eq!(variants[6].query(), "a=0&b=p1");

        variants.iter_mut().next().unwrap().content = "mutated".to_string();
        assert!(variants.iter().skip(1).all(|v| v.content.is_empty()));
        assert!(set.iter().all(|r| !r.is_variant()));
    }

    #[test]
    fn default_injector_passes_payloads_unchanged() {
        let r = parse("GET /?a=1 HTTP/1.1\r\nHost: h\r\n\r\n");
        let spec = InjectSpec::new()
            .to("a")
            .with_payloads(vec!["' OR 1=1 --".to_string()]);
        let variants = injector().inject(&r, &spec).unwrap();
        assert_eq!(variants[0].payload(), Some("' OR 1=1 --"));
    }

    #[test]
    fn per_call_encoding_overrides_injector() {
        let r = parse("GET /?a=1 HTTP/1.1\r\nHost: h\r\n\r\n");
        let inj = injector().with_encoding(PayloadEncoding::Hex);
        let spec = InjectSpec::new()
            .to("a")
            .with_payloads(vec!["A".to_string()])
            .with_encoding(PayloadEncoding::Base64);
        let variants = inj.inject(&r, &spec).unwrap();
        assert_eq!(variants[0].payload(), Some("QQ=="));

        let spec = InjectSpec::new().to("a").with_payloads(vec!["A".to_string()]);
        let variants = inj.inject(&r, &spec).unwrap();
        assert_eq!(variants[0].payload(), Some("\\x41"));
    }

    #[test]
    fn discovery_is_ordered_deduplicated_and_stable() {
        let r = parse(FORM_POST);
        let points = find_injection_points(&r);
        assert_eq!(points, vec!["next", "user", "sid", "lang"]);
        assert_eq!(points, find_injection_points(&r));
    }

    #[test]
    fn discovery_skips_body_of_get() {
        let r = parse("GET /?q=1 HTTP/1.1\r\nHost: h\r\n\r\nignored=1");
        assert_eq!(find_injection_points(&r), vec!["q"]);
    }

    #[test]
    fn inject_all_covers_every_point() {
        let r = parse(FORM_POST);
        let variants = injector()
            .inject_all(&r, &PayloadSpec::named("pair"))
            .unwrap();
        // next appears in query and body
        assert_eq!(variants.len(), (1 + 1 + 1 + 1 + 1) * 2);
        let points: IndexSet<_> = variants.iter().filter_map(|v| v.injection_point()).collect();
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn inject_all_without_points_is_empty() {
        let r = parse("GET / HTTP/1.1\r\nHost: h\r\n\r\n");
        let variants = injector().inject_all(&r, &PayloadSpec::default()).unwrap();
        assert!(variants.is_empty());
    }

    #[test]
    fn fuzz_headers_uses_store() {
        let r = parse("GET / HTTP/1.1\r\nHost: h\r\nAccept: */*\r\n\r\n");
        let variants = injector()
            .fuzz_headers(&r, &PayloadSpec::named("pair"))
            .unwrap();
        assert_eq!(variants.len(), 4);
        assert_eq!(variants[3].header("Accept"), Some("p2"));
        assert_eq!(variants[3].injection_point(), Some("Accept"));
    }

    #[test]
    fn content_length_matches_changed_bodies() {
        let r = parse(FORM_POST);
        let variants = injector()
            .inject_all(&r, &PayloadSpec::explicit(["ü", "' OR 1=1"]))
            .unwrap();
        for v in variants.iter().filter(|v| v.content != r.content) {
            assert_eq!(
                v.header("Content-Length"),
                Some(v.content.len().to_string().as_str())
            );
        }
    }
}
