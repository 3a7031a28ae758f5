//! Code fence tracking for line-based source passes.
//!
//! Source-level preprocessing must leave fenced code untouched, so each pass
//! feeds lines through a [`FenceTracker`] before looking at them.

/// Tracks whether the current line is inside a fenced code block.
///
/// A fence is three or more backticks or tildes. The closing fence must use
/// the same character and be at least as long as the opening one.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed the next line. Returns `true` if the line opens or closes a fence.
    ///
    /// Blockquote markers in front of the fence are ignored, so fences nested
    /// in quotes are tracked too.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = strip_quote_markers(line).trim_start();

        match self.open {
            Some((ch, len)) => {
                if is_closing_fence(trimmed, ch, len) {
                    self.open = None;
                    true
                } else {
                    false
                }
            }
            None => {
                self.open = opening_fence(trimmed);
                self.open.is_some()
            }
        }
    }
}

fn strip_quote_markers(line: &str) -> &str {
    let mut rest = line;
    loop {
        let trimmed = rest.trim_start_matches(' ');
        match trimmed.strip_prefix('>') {
            Some(after) => rest = after,
            None => return rest,
        }
    }
}

fn opening_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    // Backtick fences cannot have backticks in their info string.
    if count < 3 || (first == '`' && trimmed[count..].contains('`')) {
        return None;
    }
    Some((first, count))
}

fn is_closing_fence(trimmed: &str, expected: char, min_len: usize) -> bool {
    let count = trimmed.chars().take_while(|&c| c == expected).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}
