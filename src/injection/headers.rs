//! Header fuzzing - Replace each header value in turn

use tracing::debug;

use super::stamp;
use crate::http::Request;
use crate::payloads::Payloads;

/// One variant per header position and payload
///
/// Headers are addressed by position, so repeated names are fuzzed
/// independently. Every other header is left untouched.
pub fn fuzz_headers(request: &Request, payloads: &Payloads) -> Vec<Request> {
    let mut variants = Vec::with_capacity(request.headers.len() * payloads.len());

    for (index, (name, _)) in request.headers.iter().enumerate() {
        for payload in payloads {
            let mut variant = request.clone();
            variant.headers[index].1 = payload.clone();
            stamp(&mut variant, name, payload);
            variants.push(variant);
        }
    }

    debug!(
        "Fuzzed {} headers into {} variants",
        request.headers.len(),
        variants.len()
    );
    variants
}
