//! Markdown emphasis inside raw HTML.
//!
//! Raw HTML is passed through, but `**strong**` and `*emphasis*` written in
//! the text between tags become `<strong>` and `<em>` elements. Text inside
//! `pre`, `code`, `script` and `style` elements is left alone.

use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{Event, Parser, Tag};
use regex::Regex;

use crate::edits::Edits;

/// HTML comments and tags.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->|</?[A-Za-z][^>]*>").unwrap());

/// Elements whose content is literal.
static LITERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^<(/?)(pre|code|script|style)\b").unwrap());

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Rewrite emphasis in the text content of an HTML block.
pub(crate) fn render_nested_markup(html: &str) -> String {
    let mut edits = Edits::new();
    let mut literal_depth = 0usize;
    let mut cursor = 0;

    for tag in TAG_RE.find_iter(html) {
        if literal_depth == 0 {
            emphasis_edits(html, cursor..tag.start(), &mut edits);
        }
        if let Some(caps) = LITERAL_RE.captures(tag.as_str()) {
            if caps[1].is_empty() {
                literal_depth += 1;
            } else {
                literal_depth = literal_depth.saturating_sub(1);
            }
        }
        cursor = tag.end();
    }
    if literal_depth == 0 {
        emphasis_edits(html, cursor..html.len(), &mut edits);
    }

    edits.apply(html)
}

/// Register replacements for emphasis delimiters in `html[segment]`.
///
/// The segment is parsed as a whole with each line's indentation removed, so
/// that indented HTML content is not taken for a code block and emphasis may
/// span lines.
fn emphasis_edits(html: &str, segment: Range<usize>, edits: &mut Edits) {
    let text = &html[segment.clone()];
    if !text.contains(['*', '_']) {
        return;
    }

    let mut stripped = String::with_capacity(text.len());
    // (offset in `stripped`, offset in `html`) at the start of each line.
    let mut lines = Vec::new();
    let mut offset = segment.start;
    for line in text.split_inclusive('\n') {
        let content = line.trim_start_matches([' ', '\t']);
        lines.push((stripped.len(), offset + (line.len() - content.len())));
        stripped.push_str(content);
        offset += line.len();
    }
    let to_html = |at: usize| {
        let line = lines.partition_point(|&(start, _)| start <= at) - 1;
        let (start, base) = lines[line];
        base + (at - start)
    };

    for (event, range) in Parser::new(&stripped).into_offset_iter() {
        let (width, open, close) = match event {
            Event::Start(Tag::Strong) => (2, "<strong>", "</strong>"),
            Event::Start(Tag::Emphasis) => (1, "<em>", "</em>"),
            _ => continue,
        };
        let start = to_html(range.start);
        let end = to_html(range.end - width);
        edits.replace(start..start + width, open);
        edits.replace(end..end + width, close);
    }
}

/// Change in open element depth caused by an inline HTML fragment.
pub(crate) fn tag_depth_delta(fragment: &str) -> isize {
    let fragment = fragment.trim();
    if fragment.starts_with("</") {
        return -1;
    }
    if !fragment.starts_with('<')
        || fragment.starts_with("<!")
        || fragment.starts_with("<?")
        || fragment.ends_with("/>")
    {
        return 0;
    }

    let name: String = fragment[1..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if name.is_empty() || VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str()) {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strong_in_div() {
        assert_eq!(
            render_nested_markup("<div>\nThis is **markdown** content.\n</div>\n"),
            "<div>\nThis is <strong>markdown</strong> content.\n</div>\n"
        );
    }

    #[test]
    fn test_emphasis_and_strong() {
        assert_eq!(
            render_nested_markup("<p>*a* and __b__</p>"),
            "<p><em>a</em> and <strong>b</strong></p>"
        );
    }

    #[test]
    fn test_indented_content() {
        assert_eq!(
            render_nested_markup("<div>\n    Some **bold** text\n</div>"),
            "<div>\n    Some <strong>bold</strong> text\n</div>"
        );
    }

    #[test]
    fn test_attributes_untouched() {
        let html = r#"<div title="**not markdown**">x</div>"#;
        assert_eq!(render_nested_markup(html), html);
    }

    #[test]
    fn test_literal_elements_skipped() {
        let html = "<pre>\n**x**\n</pre>\n<script>a = b ** c;</script>";
        assert_eq!(render_nested_markup(html), html);
    }

    #[test]
    fn test_comments_skipped() {
        let html = "<!-- **x** -->";
        assert_eq!(render_nested_markup(html), html);
    }

    #[test]
    fn test_tag_depth_delta() {
        assert_eq!(tag_depth_delta("<span class=\"a\">"), 1);
        assert_eq!(tag_depth_delta("</span>"), -1);
        assert_eq!(tag_depth_delta("<br>"), 0);
        assert_eq!(tag_depth_delta("<img src=\"a.png\"/>"), 0);
        assert_eq!(tag_depth_delta("<!-- c -->"), 0);
    }

    #[test]
    fn test_strong_across_lines() {
        assert_eq!(
            render_nested_markup("<div>\n**a\nb**\n</div>"),
            "<div>\n<strong>a\nb</strong>\n</div>"
        );
    }

    #[test]
    fn test_emphasis_across_indented_lines() {
        assert_eq!(
            render_nested_markup("<p>\n  *one\n    two*\n</p>"),
            "<p>\n  <em>one\n    two</em>\n</p>"
        );
    }
}
