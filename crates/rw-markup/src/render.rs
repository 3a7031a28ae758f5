//! Canonical Markdown serialization.
//!
//! Every top-level block is followed by a blank line, so a non-empty document
//! always ends with `\n\n`. In legacy mode a top-level heading is followed by
//! a single newline instead.
//!
//! Blockquotes are rendered by prefixing each line of their content with
//! `"> "`, blank lines included. A quote with several blocks keeps the blank
//! line after each of them, so its last lines are blank `"> "` markers.

use crate::ast::{
    Block, BlockQuote, CodeBlock, Document, Inline, InlineLink, List, ListKind, ShortcutXref,
};
use crate::util::prefix_lines;

/// Serializes a document tree to Markdown.
///
/// # Example
///
/// ```
/// use rw_markup::{CanonicalRenderer, Document, Block, Inline};
///
/// let doc = Document {
///     blocks: vec![Block::Paragraph(vec![Inline::Text("Hello".to_owned())])],
/// };
/// assert_eq!(CanonicalRenderer::new().render(&doc), "Hello\n\n");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalRenderer {
    legacy_mode: bool,
}

impl CanonicalRenderer {
    /// Create a renderer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable legacy heading spacing.
    #[must_use]
    pub fn with_legacy_mode(mut self, enabled: bool) -> Self {
        self.legacy_mode = enabled;
        self
    }

    /// Render `document` to text.
    #[must_use]
    pub fn render(&self, document: &Document) -> String {
        let mut out = String::new();
        for block in &document.blocks {
            out.push_str(&self.block(block));
            if self.legacy_mode && matches!(block, Block::Heading { .. }) {
                out.push('\n');
            } else {
                out.push_str("\n\n");
            }
        }
        out
    }

    /// Render one block without its trailing separator.
    fn block(&self, block: &Block) -> String {
        match block {
            Block::Paragraph(inlines) => render_inlines(inlines),
            Block::Heading { level, content } => heading(*level, content),
            Block::BlockQuote(quote) => self.block_quote(quote),
            Block::List(list) => self.list(list),
            Block::CodeBlock(code) => code_block(code),
            Block::Html(text) | Block::Opaque(text) => text.trim_end_matches('\n').to_owned(),
            Block::ThematicBreak(marker) => marker.clone(),
            Block::FrontMatter(yaml) => {
                let newline = if yaml.is_empty() || yaml.ends_with('\n') {
                    ""
                } else {
                    "\n"
                };
                format!("---\n{yaml}{newline}---")
            }
        }
    }

    fn block_quote(&self, quote: &BlockQuote) -> String {
        let body = match quote.children.as_slice() {
            [single] => self.block(single),
            children => children
                .iter()
                .map(|child| self.block(child) + "\n\n")
                .collect(),
        };
        prefix_lines(&body, "> ", "> ")
    }

    fn list(&self, list: &List) -> String {
        let separator = if list.tight { "\n" } else { "\n\n" };
        let mut number = match list.kind {
            ListKind::Ordered { start, .. } => start,
            ListKind::Bullet(_) => 0,
        };

        let mut items = Vec::with_capacity(list.items.len());
        for item in &list.items {
            let marker = match list.kind {
                ListKind::Bullet(bullet) => bullet.to_string(),
                ListKind::Ordered { delimiter, .. } => format!("{number}{delimiter}"),
            };
            number += 1;

            let body = item
                .iter()
                .map(|block| self.block(block))
                .collect::<Vec<_>>()
                .join(separator);
            if body.is_empty() {
                items.push(marker);
            } else {
                let indent = " ".repeat(marker.len() + 1);
                items.push(prefix_lines(&body, &format!("{marker} "), &indent));
            }
        }
        items.join(separator)
    }
}

fn heading(level: u8, content: &[Inline]) -> String {
    let hashes = "#".repeat(usize::from(level));
    let text = render_inlines(content).replace('\n', " ");
    if text.is_empty() {
        hashes
    } else {
        format!("{hashes} {text}")
    }
}

fn code_block(code: &CodeBlock) -> String {
    let text = code.text.strip_suffix('\n').unwrap_or(&code.text);
    match &code.fence {
        Some(fence) => {
            let info = &code.info;
            if code.text.is_empty() {
                format!("{fence}{info}\n{fence}")
            } else {
                format!("{fence}{info}\n{text}\n{fence}")
            }
        }
        None => text
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("    {line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Render an inline sequence.
fn render_inlines(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        render_inline(inline, &mut out);
    }
    out
}

fn render_inline(inline: &Inline, out: &mut String) {
    match inline {
        Inline::Text(text) | Inline::Html(text) | Inline::Code(text) | Inline::Raw(text) => {
            out.push_str(text);
        }
        Inline::Emphasis {
            delimiter,
            children,
        } => wrap(&delimiter.to_string(), children, out),
        Inline::Strong {
            delimiter,
            children,
        } => wrap(&delimiter.to_string().repeat(2), children, out),
        Inline::Strikethrough {
            delimiter,
            children,
        } => wrap(delimiter, children, out),
        Inline::Link(link) => render_link(link, out),
        Inline::Autolink(url) => {
            out.push('<');
            out.push_str(url);
            out.push('>');
        }
        Inline::AutolinkXref(xref) => {
            out.push('<');
            out.push_str(&xref.scheme);
            out.push(':');
            out.push_str(&xref.identifier);
            out.push('>');
        }
        Inline::ShortcutXref(xref) => {
            out.push('@');
            match xref_quote(xref) {
                Some(quote) => {
                    out.push(quote);
                    out.push_str(&xref.identifier);
                    out.push(quote);
                }
                None => out.push_str(&xref.identifier),
            }
        }
        Inline::Mailto(mailto) => {
            out.push('<');
            if let Some(scheme) = &mailto.scheme {
                out.push_str(scheme);
                out.push(':');
            }
            out.push_str(&mailto.address);
            out.push('>');
        }
        Inline::Video(video) => {
            out.push_str("[!VIDEO ");
            out.push_str(&video.url);
            out.push(']');
        }
        Inline::SoftBreak => out.push('\n'),
        Inline::HardBreak { backslash: true } => out.push_str("\\\n"),
        Inline::HardBreak { backslash: false } => out.push_str("  \n"),
        Inline::TaskMarker(checked) => out.push_str(if *checked { "[x] " } else { "[ ] " }),
    }
}

/// Quote character for a resolved shortcut xref, `None` to keep it bare.
fn xref_quote(xref: &ShortcutXref) -> Option<char> {
    if !xref.resolved {
        return None;
    }
    match (xref.identifier.contains('"'), xref.identifier.contains('\'')) {
        (false, _) => Some('"'),
        (true, false) => Some('\''),
        (true, true) => None,
    }
}

fn wrap(delimiter: &str, children: &[Inline], out: &mut String) {
    out.push_str(delimiter);
    for child in children {
        render_inline(child, out);
    }
    out.push_str(delimiter);
}

fn render_link(link: &InlineLink, out: &mut String) {
    if link.image {
        out.push('!');
    }
    out.push('[');
    for child in &link.children {
        render_inline(child, out);
    }
    out.push_str("](");
    escape_destination(&link.destination, out);
    if let Some(title) = &link.title {
        out.push_str(" \"");
        for c in title.chars() {
            if matches!(c, '\\' | '"') {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
    }
    out.push(')');
}

/// Write a parsed destination back in source form.
///
/// A backslash that would escape the following character (or the closing
/// parenthesis) is doubled so that it stays literal.
fn escape_destination(destination: &str, out: &mut String) {
    let mut chars = destination.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '\\' && chars.peek().is_none_or(char::is_ascii_punctuation) {
            out.push('\\');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{MailtoAutolink, VideoDirective};
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_owned())
    }

    fn paragraph(s: &str) -> Block {
        Block::Paragraph(vec![text(s)])
    }

    fn render(blocks: Vec<Block>) -> String {
        CanonicalRenderer::new().render(&Document { blocks })
    }

    fn video() -> Inline {
        Inline::Video(VideoDirective {
            url: "https://channel9.msdn.com".to_owned(),
        })
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(render(vec![]), "");
    }

    #[test]
    fn test_blocks_separated_by_blank_line() {
        assert_eq!(render(vec![paragraph("a"), paragraph("b")]), "a\n\nb\n\n");
    }

    #[test]
    fn test_heading_spacing() {
        let blocks = vec![Block::Heading {
            level: 2,
            content: vec![text("Title"), Inline::SoftBreak, text("cont")],
        }];
        let doc = Document { blocks };

        assert_eq!(CanonicalRenderer::new().render(&doc), "## Title cont\n\n");
        assert_eq!(
            CanonicalRenderer::new().with_legacy_mode(true).render(&doc),
            "## Title cont\n"
        );
    }

    #[test]
    fn test_shortcut_xref_by_state() {
        let resolved = Inline::ShortcutXref(ShortcutXref {
            identifier: "System.String".to_owned(),
            resolved: true,
        });
        assert_eq!(
            render(vec![Block::Paragraph(vec![
                resolved,
                text(" and "),
                Inline::shortcut_xref("outlook.com")
            ])]),
            "@\"System.String\" and @outlook.com\n\n"
        );
    }

    #[test]
    fn test_shortcut_xref_quote_choice() {
        let resolved = |id: &str| {
            Block::Paragraph(vec![Inline::ShortcutXref(ShortcutXref {
                identifier: id.to_owned(),
                resolved: true,
            })])
        };
        assert_eq!(render(vec![resolved("a\"b")]), "@'a\"b'\n\n");
        assert_eq!(render(vec![resolved("a\"b'c")]), "@a\"b'c\n\n");
    }

    #[test]
    fn test_mailto() {
        let inline = Inline::Mailto(MailtoAutolink {
            scheme: None,
            address: "docs@microsoft.com".to_owned(),
        });
        assert_eq!(
            render(vec![Block::Paragraph(vec![inline])]),
            "<docs@microsoft.com>\n\n"
        );
    }

    #[test]
    fn test_link_with_title() {
        let link = Inline::Link(InlineLink {
            image: true,
            destination: "a.png".to_owned(),
            title: Some("say \"hi\"".to_owned()),
            children: vec![text("alt")],
        });
        assert_eq!(
            render(vec![Block::Paragraph(vec![link])]),
            "![alt](a.png \"say \\\"hi\\\"\")\n\n"
        );
    }

    #[test]
    fn test_link_backslashes_stay_literal() {
        let link = |destination: &str, title: Option<&str>| {
            Block::Paragraph(vec![Inline::Link(InlineLink {
                image: false,
                destination: destination.to_owned(),
                title: title.map(str::to_owned),
                children: vec![text("a")],
            })])
        };
        assert_eq!(render(vec![link(r"a\*b", None)]), "[a](a\\\\*b)\n\n");
        assert_eq!(render(vec![link(r"a\", None)]), "[a](a\\\\)\n\n");
        assert_eq!(render(vec![link(r"C:\dir", None)]), "[a](C:\\dir)\n\n");
        assert_eq!(render(vec![link("b", Some(r"x\"))]), "[a](b \"x\\\\\")\n\n");
    }

    #[test]
    fn test_single_video_quote() {
        let quote = Block::BlockQuote(BlockQuote {
            depth: 1,
            children: vec![Block::Paragraph(vec![video()])],
        });
        assert_eq!(render(vec![quote]), "> [!VIDEO https://channel9.msdn.com]\n\n");
    }

    #[test]
    fn test_multi_block_quote_keeps_blank_markers() {
        let quote = Block::BlockQuote(BlockQuote {
            depth: 1,
            children: vec![paragraph("a"), Block::Paragraph(vec![video()])],
        });
        assert_eq!(
            render(vec![quote]),
            "> a\n> \n> [!VIDEO https://channel9.msdn.com]\n> \n> \n\n"
        );
    }

    #[test]
    fn test_nested_quote() {
        let inner = Block::BlockQuote(BlockQuote {
            depth: 2,
            children: vec![paragraph("x")],
        });
        let outer = Block::BlockQuote(BlockQuote {
            depth: 1,
            children: vec![inner],
        });
        assert_eq!(render(vec![outer]), "> > x\n\n");
    }

    #[test]
    fn test_tight_bullet_list() {
        let list = Block::List(List {
            kind: ListKind::Bullet('*'),
            tight: true,
            items: vec![vec![paragraph("a")], vec![paragraph("b\nc")]],
        });
        assert_eq!(render(vec![list]), "* a\n* b\n  c\n\n");
    }

    #[test]
    fn test_loose_ordered_list() {
        let list = Block::List(List {
            kind: ListKind::Ordered {
                start: 9,
                delimiter: '.',
            },
            tight: false,
            items: vec![vec![paragraph("a"), paragraph("b")], vec![paragraph("c")]],
        });
        assert_eq!(render(vec![list]), "9. a\n\n   b\n\n10. c\n\n");
    }

    #[test]
    fn test_fenced_code() {
        let code = Block::CodeBlock(CodeBlock {
            fence: Some("```".to_owned()),
            info: "rust".to_owned(),
            text: "let a = 1;\n".to_owned(),
        });
        assert_eq!(render(vec![code]), "```rust\nlet a = 1;\n```\n\n");
    }

    #[test]
    fn test_indented_code() {
        let code = Block::CodeBlock(CodeBlock {
            fence: None,
            info: String::new(),
            text: "a\n\nb\n".to_owned(),
        });
        assert_eq!(render(vec![code]), "    a\n\n    b\n\n");
    }

    #[test]
    fn test_front_matter() {
        assert_eq!(
            render(vec![Block::FrontMatter("title: A\n".to_owned()), paragraph("x")]),
            "---\ntitle: A\n---\n\nx\n\n"
        );
    }
}
