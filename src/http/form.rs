//! `application/x-www-form-urlencoded` codec
//!
//! Used for both URL query strings and url-encoded request bodies.

use indexmap::IndexMap;
use url::form_urlencoded;

/// Decoded form parameters, in order of first appearance
pub type FormParams = IndexMap<String, Vec<String>>;

/// Decode form text into `name -> [values]`
///
/// Segments without `=` are ignored, blank values are kept. Repeated
/// names collect their values in order.
pub fn parse_form(text: &str) -> FormParams {
    let mut params = FormParams::new();

    for segment in text.split('&') {
        if !segment.contains('=') {
            continue;
        }
        if let Some((name, value)) = form_urlencoded::parse(segment.as_bytes()).next() {
            if name.is_empty() {
                continue;
            }
            params
                .entry(name.into_owned())
                .or_default()
                .push(value.into_owned());
        }
    }

    params
}

/// Encode parameters back into form text
pub fn encode_form(params: &FormParams) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, values) in params {
        for value in values {
            serializer.append_pair(name, value);
        }
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_order_and_blank_values() {
        let params = parse_form("b=2&a=&c=3");
        let names: Vec<_> = params.keys().cloned().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(params["a"], vec![String::new()]);
    }

    #[test]
    fn parse_collects_repeated_names() {
        let params = parse_form("id=1&id=2");
        assert_eq!(params["id"], vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn parse_decodes_percent_and_plus() {
        let params = parse_form("q=hello+world%21");
        assert_eq!(params["q"], vec!["hello world!".to_string()]);
    }

    #[test]
    fn parse_ignores_segments_without_equals() {
        let params = parse_form("{\"json\":true}");
        assert!(params.is_empty());

        let params = parse_form("flag&x=1");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn encode_escapes_payload_characters() {
        let mut params = FormParams::new();
        params.insert("q".to_string(), vec!["' OR 1=1--".to_string()]);
        assert_eq!(encode_form(&params), "q=%27+OR+1%3D1--");
    }
}
