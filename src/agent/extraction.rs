//! Tag extraction - the narrow grammar parsed out of raw model text.
//!
//! The protocol encodes directives as `<tag>...</tag>` spans. Matching is
//! against the literal delimiters including the angle brackets, so a tag
//! name never matches inside a longer tag name (`tool_call` does not match
//! `<tool_call_id>`). An opening tag with no matching close before the end
//! of the text is treated as not found; the extractor never guesses a
//! boundary.

/// Result of scanning for one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagContent {
    pub found: bool,
    pub content: String,
}

impl TagContent {
    fn not_found() -> Self {
        Self {
            found: false,
            content: String::new(),
        }
    }
}

/// Extract the first well-formed `<tag>...</tag>` span from `text`.
///
/// Content is captured verbatim; spans of *other* tags nested inside are
/// not recursively parsed.
pub fn extract_tag_content(text: &str, tag: &str) -> TagContent {
    match first_span(text, tag) {
        Some((start, end)) => TagContent {
            found: true,
            content: text[start..end].to_string(),
        },
        None => TagContent::not_found(),
    }
}

/// Extract the contents of every well-formed `<tag>...</tag>` span, in
/// order of appearance.
pub fn extract_all_tag_content(text: &str, tag: &str) -> Vec<String> {
    let mut contents = Vec::new();
    let mut offset = 0;
    while let Some((start, end)) = first_span(&text[offset..], tag) {
        contents.push(text[offset + start..offset + end].to_string());
        let close = format!("</{tag}>");
        offset += end + close.len();
    }
    contents
}

/// Content byte range of the first well-formed span, or `None`.
fn first_span(text: &str, tag: &str) -> Option<(usize, usize)> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");

    let open_at = text.find(&open)?;
    let content_start = open_at + open.len();
    let close_at = text[content_start..].find(&close)?;
    Some((content_start, content_start + close_at))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_content_of_wellformed_tag() {
        let result = extract_tag_content("before <thought>plan the trip</thought> after", "thought");
        assert!(result.found);
        assert_eq!(result.content, "plan the trip");
    }

    #[test]
    fn absent_tag_is_not_found() {
        let result = extract_tag_content("no tags here at all", "response");
        assert!(!result.found);
        assert_eq!(result.content, "");
    }

    #[test]
    fn unterminated_tag_is_not_found() {
        let result = extract_tag_content("<response>never closed...", "response");
        assert!(!result.found);
    }

    #[test]
    fn tag_name_does_not_match_longer_tag() {
        let text = "<tool_call_id>42</tool_call_id>";
        let result = extract_tag_content(text, "tool_call");
        assert!(!result.found);
    }

    #[test]
    fn nested_foreign_tags_are_captured_verbatim() {
        let text = "<response>see <b>bold</b> text</response>";
        let result = extract_tag_content(text, "response");
        assert!(result.found);
        assert_eq!(result.content, "see <b>bold</b> text");
    }

    #[test]
    fn first_of_multiple_spans_wins() {
        let text = "<thought>one</thought><thought>two</thought>";
        let result = extract_tag_content(text, "thought");
        assert_eq!(result.content, "one");
    }

    #[test]
    fn extract_all_returns_each_span_in_order() {
        let text = r#"<tool_call>{"id":0}</tool_call> and <tool_call>{"id":1}</tool_call>"#;
        let all = extract_all_tag_content(text, "tool_call");
        assert_eq!(all, vec![r#"{"id":0}"#, r#"{"id":1}"#]);
    }

    #[test]
    fn extract_all_is_empty_when_absent() {
        assert!(extract_all_tag_content("nothing", "tool_call").is_empty());
    }
}
