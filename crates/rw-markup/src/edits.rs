//! Byte-range edits applied in a single pass.

use std::ops::Range;

/// Collects byte-range replacements against one source string.
///
/// Passes register edits while scanning the original text, then
/// [`apply`](Self::apply) builds the new string in one allocation instead of
/// splicing repeatedly.
///
/// Edits must not overlap; overlapping edits after the first are dropped.
#[derive(Debug, Default)]
pub(crate) struct Edits {
    items: Vec<(Range<usize>, String)>,
}

impl Edits {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replace `range` of the source with `text`.
    pub(crate) fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.items.push((range, text.into()));
    }

    /// Insert `text` before byte `at`.
    pub(crate) fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(at..at, text);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Apply all edits to `source`.
    pub(crate) fn apply(mut self, source: &str) -> String {
        if self.items.is_empty() {
            return source.to_owned();
        }

        // Stable sort keeps insertions at the same offset in registration order.
        self.items.sort_by_key(|(range, _)| range.start);

        let added: usize = self.items.iter().map(|(_, text)| text.len()).sum();
        let mut out = String::with_capacity(source.len() + added);
        let mut cursor = 0;

        for (range, text) in self.items {
            if range.start < cursor || range.end > source.len() {
                continue;
            }
            out.push_str(&source[cursor..range.start]);
            out.push_str(&text);
            cursor = range.end;
        }
        out.push_str(&source[cursor..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_edits() {
        assert_eq!(Edits::new().apply("unchanged"), "unchanged");
    }

    #[test]
    fn test_replace_and_insert() {
        let mut edits = Edits::new();
        edits.replace(0..2, "<strong>");
        edits.replace(3..5, "</strong>");
        edits.insert(5, "!");

        assert_eq!(edits.apply("**a**"), "<strong>a</strong>!");
    }

    #[test]
    fn test_registration_order_does_not_matter() {
        let mut edits = Edits::new();
        edits.insert(4, ">");
        edits.insert(1, "<");

        assert_eq!(edits.apply("a bc d"), "a< bc> d");
    }

    #[test]
    fn test_overlapping_edit_dropped() {
        let mut edits = Edits::new();
        edits.replace(0..3, "x");
        edits.replace(1..2, "y");

        assert_eq!(edits.apply("abcd"), "xd");
    }
}
