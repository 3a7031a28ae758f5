//! Link destination encoding.
//!
//! Characters that would stop a destination from parsing back as the same
//! link are percent-encoded:
//!
//! - ASCII control characters and space
//! - `<` and `>`
//! - `%` not starting a `%XX` hex triplet
//! - `(` and `)` that have no matching partner
//!
//! Everything else, including non-ASCII text and existing `%XX` triplets, is
//! kept. Encoding is therefore idempotent.

use std::borrow::Cow;

use percent_encoding::percent_encode_byte;

/// Percent-encode the reserved characters of a link destination.
pub(crate) fn encode_destination(destination: &str) -> Cow<'_, str> {
    let bytes = destination.as_bytes();
    let unbalanced = unbalanced_parens(bytes);

    let needs_encoding = |i: usize, b: u8| match b {
        b'%' => !is_triplet(bytes, i),
        b'(' | b')' => unbalanced.contains(&i),
        b' ' | b'<' | b'>' => true,
        _ => b.is_ascii_control(),
    };

    if !bytes.iter().enumerate().any(|(i, &b)| needs_encoding(i, b)) {
        return Cow::Borrowed(destination);
    }

    let mut out = String::with_capacity(destination.len() + 8);
    let mut cursor = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if needs_encoding(i, b) {
            out.push_str(&destination[cursor..i]);
            out.push_str(percent_encode_byte(b));
            cursor = i + 1;
        }
    }
    out.push_str(&destination[cursor..]);
    Cow::Owned(out)
}

fn is_triplet(bytes: &[u8], at: usize) -> bool {
    matches!(
        bytes.get(at + 1..at + 3),
        Some([a, b]) if a.is_ascii_hexdigit() && b.is_ascii_hexdigit()
    )
}

/// Byte offsets of parentheses without a matching partner.
fn unbalanced_parens(bytes: &[u8]) -> Vec<usize> {
    let mut open = Vec::new();
    let mut unmatched = Vec::new();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => open.push(i),
            b')' => {
                if open.pop().is_none() {
                    unmatched.push(i);
                }
            }
            _ => {}
        }
    }
    unmatched.extend(open);
    unmatched
}
