//! Video directive layout inside blockquotes.

use crate::ast::{Block, Inline};

/// Give every video directive in `children` a paragraph of its own.
///
/// Paragraph text around a directive is split into separate paragraphs, so
/// each directive ends up between blank quote lines when rendered.
pub(super) fn isolate_directives(children: Vec<Block>) -> Vec<Block> {
    let mut out = Vec::with_capacity(children.len());
    for block in children {
        match block {
            Block::Paragraph(inlines) if has_directive_with_text(&inlines) => {
                split_paragraph(inlines, &mut out);
            }
            other => out.push(other),
        }
    }
    out
}

fn has_directive_with_text(inlines: &[Inline]) -> bool {
    inlines.len() > 1 && inlines.iter().any(|i| matches!(i, Inline::Video(_)))
}

fn split_paragraph(inlines: Vec<Inline>, out: &mut Vec<Block>) {
    let mut current = Vec::new();
    for inline in inlines {
        if matches!(inline, Inline::Video(_)) {
            flush(&mut current, out);
            out.push(Block::Paragraph(vec![inline]));
        } else {
            current.push(inline);
        }
    }
    flush(&mut current, out);
}

/// Emit `current` as a paragraph, dropping line breaks left at its edges.
fn flush(current: &mut Vec<Inline>, out: &mut Vec<Block>) {
    let start = current
        .iter()
        .position(|i| !matches!(i, Inline::SoftBreak))
        .unwrap_or(current.len());
    let end = current
        .iter()
        .rposition(|i| !matches!(i, Inline::SoftBreak))
        .map_or(start, |p| p + 1);

    if start < end {
        out.push(Block::Paragraph(current.drain(start..end).collect()));
    }
    current.clear();
}
