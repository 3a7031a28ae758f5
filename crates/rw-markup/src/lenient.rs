//! Whitespace-tolerant link destinations.
//!
//! Older corpora write links like `[text](this is a link)`, which CommonMark
//! does not accept. Before parsing, such destinations are wrapped in pointy
//! brackets (`[text](<this is a link>)`), the CommonMark form that allows
//! spaces, so the parser sees a regular inline link.
//!
//! The offsets of the inserted brackets are kept so that source spans of the
//! parsed text can be mapped back to the input.

use std::sync::LazyLock;

use regex::Regex;

use crate::edits::Edits;
use crate::fence::FenceTracker;

/// Destination followed by an optional quoted or parenthesized title.
static DESTINATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(?P<dest>.*?)(?:\s+(?:"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|\((?:[^)\\]|\\.)*\)))?\s*$"#,
    )
    .unwrap()
});

/// Source text with link destinations wrapped.
#[derive(Debug)]
pub(crate) struct WrappedSource {
    /// Rewritten text.
    pub(crate) text: String,
    /// Ascending offsets, in `text`, of the inserted single-byte brackets.
    pub(crate) inserted: Vec<usize>,
}

/// Wrap whitespace-containing link destinations in pointy brackets.
///
/// Returns `None` when nothing needs wrapping. Fenced code blocks and code
/// spans are skipped.
pub(crate) fn wrap_destinations(source: &str) -> Option<WrappedSource> {
    if !source.contains("](") {
        return None;
    }

    let mut positions = Vec::new();
    let mut fence = FenceTracker::new();
    let mut offset = 0;

    for line in source.split_inclusive('\n') {
        let is_fence_line = fence.update(line);
        if !is_fence_line && !fence.in_fence() {
            scan_line(line, offset, &mut positions);
        }
        offset += line.len();
    }

    if positions.is_empty() {
        return None;
    }

    let mut edits = Edits::new();
    for (i, &at) in positions.iter().enumerate() {
        edits.insert(at, if i % 2 == 0 { "<" } else { ">" });
    }
    let inserted = positions.iter().enumerate().map(|(i, at)| at + i).collect();
    Some(WrappedSource {
        text: edits.apply(source),
        inserted,
    })
}

/// Record the opening and closing bracket offsets for each destination on
/// `line` that needs wrapping.
fn scan_line(line: &str, offset: usize, positions: &mut Vec<usize>) {
    let bytes = line.as_bytes();
    let mut open_brackets = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => i = skip_code_span(bytes, i),
            b'[' => {
                open_brackets += 1;
                i += 1;
            }
            b']' if open_brackets > 0 && bytes.get(i + 1) == Some(&b'(') => {
                open_brackets -= 1;
                let open = i + 2;
                match closing_paren(bytes, open) {
                    Some(close) => {
                        if let Some(dest) = whitespace_destination(&line[open..close]) {
                            let start = offset + open + dest.start;
                            positions.push(start);
                            positions.push(start + dest.len());
                        }
                        i = close + 1;
                    }
                    None => i = open,
                }
            }
            _ => i += 1,
        }
    }
}

/// Skip a backtick code span starting at `start`; returns the index after it.
///
/// An unmatched backtick run is skipped as literal text.
fn skip_code_span(bytes: &[u8], start: usize) -> usize {
    let run = bytes[start..].iter().take_while(|&&b| b == b'`').count();
    let mut i = start + run;

    while i < bytes.len() {
        if bytes[i] == b'`' {
            let closing = bytes[i..].iter().take_while(|&&b| b == b'`').count();
            if closing == run {
                return i + closing;
            }
            i += closing;
        } else {
            i += 1;
        }
    }
    start + run
}

/// Find the `)` closing a destination that starts at `open`, honoring nested
/// parentheses and backslash escapes.
fn closing_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'(' => depth += 1,
            b')' if depth == 0 => return Some(i),
            b')' => depth -= 1,
            b'\n' => return None,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Byte range (relative to `inner`) of a destination that needs wrapping.
fn whitespace_destination(inner: &str) -> Option<std::ops::Range<usize>> {
    let trimmed = inner.trim_start();
    if trimmed.starts_with('<') {
        return None;
    }

    let caps = DESTINATION_RE.captures(inner)?;
    let dest = caps.name("dest")?;
    let text = dest.as_str();

    if text.is_empty()
        || !text.contains(char::is_whitespace)
        || text.contains(['<', '>'])
        || text.ends_with('\\')
    {
        return None;
    }
    Some(dest.range())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wrapped(source: &str) -> String {
        wrap_destinations(source).map_or_else(|| source.to_owned(), |w| w.text)
    }

    #[test]
    fn test_wraps_spaced_destination() {
        assert_eq!(
            wrapped("[cool **text**](this is a link)"),
            "[cool **text**](<this is a link>)"
        );
    }

    #[test]
    fn test_keeps_title() {
        assert_eq!(
            wrapped(r#"[a](my file.md "The title")"#),
            r#"[a](<my file.md> "The title")"#
        );
    }

    #[test]
    fn test_valid_destinations_untouched() {
        for source in [
            "[cool](https://dotnet.github.io/docfx)",
            "[cool](~/a.txt)",
            "[cool](this%20is%20a%20link)",
            r#"[a](b.md "title with spaces")"#,
            "[a](<already wrapped>)",
            "no links here",
        ] {
            assert!(
                wrap_destinations(source).is_none(),
                "{source} should be untouched"
            );
        }
    }

    #[test]
    fn test_skips_fenced_code() {
        let source = "```\n[a](b c)\n```\n[a](b c)\n";
        assert_eq!(
            wrapped(source),
            "```\n[a](b c)\n```\n[a](<b c>)\n"
        );
    }

    #[test]
    fn test_skips_code_span() {
        assert_eq!(
            wrapped("`[a](b c)` and [a](b c)"),
            "`[a](b c)` and [a](<b c>)"
        );
    }

    #[test]
    fn test_nested_parentheses() {
        assert_eq!(
            wrapped("[a](foo (bar) baz)"),
            "[a](<foo (bar) baz>)"
        );
    }

    #[test]
    fn test_multiple_links_on_line() {
        assert_eq!(
            wrapped("[a](x y) and [b](z w)"),
            "[a](<x y>) and [b](<z w>)"
        );
    }

    #[test]
    fn test_unclosed_destination_untouched() {
        assert_eq!(wrapped("[a](b c"), "[a](b c");
    }

    #[test]
    fn test_requires_link_text() {
        assert_eq!(wrapped("foo](bar baz)"), "foo](bar baz)");
    }

    #[test]
    fn test_wraps_inside_blockquote() {
        assert_eq!(wrapped("> [a](b c)\n"), "> [a](<b c>)\n");
    }

    #[test]
    fn test_escaped_quote_in_title() {
        assert!(wrap_destinations(r#"[a](b "t\"x")"#).is_none());
        assert!(wrap_destinations(r"[a](b 't\'x')").is_none());
        assert_eq!(
            wrapped(r#"[a](b c "t\"x")"#),
            r#"[a](<b c> "t\"x")"#
        );
    }

    #[test]
    fn test_inserted_offsets() {
        let wrapped = wrap_destinations("[a](b c) [d](e f)").unwrap();
        assert_eq!(wrapped.text, "[a](<b c>) [d](<e f>)");
        assert_eq!(wrapped.inserted, vec![4, 8, 15, 19]);
        for &at in &wrapped.inserted {
            assert!(matches!(&wrapped.text[at..=at], "<" | ">"));
        }
    }
}
