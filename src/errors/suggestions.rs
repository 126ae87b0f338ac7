//! "Did you mean?" suggestions using fuzzy string matching
//!
//! Uses Jaro-Winkler similarity to point at the payload set or
//! injection point the user most likely meant.

use strsim::jaro_winkler;

/// Default similarity threshold for suggestions (0.0 to 1.0)
const DEFAULT_THRESHOLD: f64 = 0.6;

/// Find the most similar string from a list of candidates
///
/// Returns the best match if it exceeds the threshold, or None otherwise.
pub fn find_similar<'a>(input: &str, candidates: &[&'a str], threshold: f64) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (jaro_winkler(input, c), *c))
        .filter(|(score, _)| *score > threshold)
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(_, name)| name)
}

/// Generate a suggestion for an unknown payload set name
pub fn suggest_payload_set(unknown: &str, known_sets: &[String]) -> String {
    let candidates: Vec<_> = known_sets.iter().map(|s| s.as_str()).collect();

    if let Some(suggestion) = find_similar(unknown, &candidates, DEFAULT_THRESHOLD) {
        format!(
            "Did you mean '{}'?\n\nList available payload sets with: httpinject payloads",
            suggestion
        )
    } else if known_sets.is_empty() {
        "No payload sets loaded.\n\n\
         Point [payloads] dir at a directory of payload files in your config,\n\
         or pass explicit payloads with --payload."
            .to_string()
    } else {
        format!(
            "Unknown payload set '{}'.\n\nList available payload sets with: httpinject payloads",
            unknown
        )
    }
}

/// Generate a suggestion for a parameter that is not present in a request
pub fn suggest_injection_point(unknown: &str, points: &[String]) -> Option<String> {
    let candidates: Vec<_> = points.iter().map(|s| s.as_str()).collect();
    find_similar(unknown, &candidates, DEFAULT_THRESHOLD)
        .map(|name| format!("Did you mean '{}'?", name))
}
