use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

/// Value written for hidden inputs that carry no default.
pub const PLACEHOLDER: &str = "test";

/// Hidden input name to its default value (or [`PLACEHOLDER`]).
pub type HiddenFieldMap = BTreeMap<String, String>;

/// Collect hidden form inputs from an HTML document.
///
/// An input counts as hidden when its `type` is `hidden`, when it carries the
/// `hidden` attribute, or when its markup contains `display:none`. Unnamed
/// inputs are ignored and repeated names keep the last value.
pub fn extract_hidden_fields(html: &str) -> HiddenFieldMap {
    let document = Html::parse_document(html);
    let input_selector = Selector::parse("input").unwrap();

    let mut fields = HiddenFieldMap::new();
    for element in document.select(&input_selector) {
        if !is_hidden(&element) {
            continue;
        }

        let Some(name) = element.value().attr("name").filter(|n| !n.is_empty()) else {
            continue;
        };

        let value = element.value().attr("value").map(str::trim).unwrap_or("");
        let value = if value.is_empty() { PLACEHOLDER } else { value };
        fields.insert(name.to_string(), value.to_string());
    }

    fields
}

fn is_hidden(element: &ElementRef<'_>) -> bool {
    let input = element.value();

    if input
        .attr("type")
        .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
    {
        return true;
    }

    if input.attr("hidden").is_some() {
        return true;
    }

    // Inline style heuristic, not a CSS parse
    element.html().to_lowercase().contains("display:none")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_hidden_is_extracted() {
        let html = r#"<form>
            <input type="hidden" name="csrf" value="abc123">
            <input type="text" name="q" value="visible">
        </form>"#;
        let fields = extract_hidden_fields(html);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("csrf").map(String::as_str), Some("abc123"));
    }

    #[test]
    fn test_type_is_case_insensitive() {
        let html = r#"<input TYPE="HIDDEN" name="step" value="2">"#;
        let fields = extract_hidden_fields(html);
        assert_eq!(fields.get("step").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_hidden_attribute_is_extracted() {
        let html = r#"<input hidden name="debug" value="0">"#;
        let fields = extract_hidden_fields(html);
        assert_eq!(fields.get("debug").map(String::as_str), Some("0"));
    }

    #[test]
    fn test_inline_display_none_is_extracted() {
        let html = r#"<input type="text" name="honeypot" style="DISPLAY:NONE">"#;
        let fields = extract_hidden_fields(html);
        assert_eq!(fields.get("honeypot").map(String::as_str), Some(PLACEHOLDER));
    }

    #[test]
    fn test_spaced_display_none_is_not_matched() {
        let html = r#"<input type="text" name="visible" style="display: none">"#;
        assert!(extract_hidden_fields(html).is_empty());
    }

    #[test]
    fn test_empty_value_uses_placeholder() {
        let html = r#"
            <input type="hidden" name="token" value="   ">
            <input type="hidden" name="nonce">
        "#;
        let fields = extract_hidden_fields(html);
        assert_eq!(fields.get("token").map(String::as_str), Some("test"));
        assert_eq!(fields.get("nonce").map(String::as_str), Some("test"));
    }

    #[test]
    fn test_value_is_trimmed() {
        let html = r#"<input type="hidden" name="page" value="  home  ">"#;
        let fields = extract_hidden_fields(html);
        assert_eq!(fields.get("page").map(String::as_str), Some("home"));
    }

    #[test]
    fn test_unnamed_inputs_are_ignored() {
        let html = r#"
            <input type="hidden" value="orphan">
            <input type="hidden" name="" value="blank">
        "#;
        assert!(extract_hidden_fields(html).is_empty());
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let html = r#"
            <input type="hidden" name="id" value="first">
            <input type="hidden" name="id" value="second">
        "#;
        let fields = extract_hidden_fields(html);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("id").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_non_html_body_yields_nothing() {
        assert!(extract_hidden_fields(r#"{"json": true}"#).is_empty());
        assert!(extract_hidden_fields("").is_empty());
    }
}
