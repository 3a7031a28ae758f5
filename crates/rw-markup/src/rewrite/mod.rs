//! Tree rewriting.
//!
//! [`Rewriter`] walks the document depth-first in document order and hands
//! each node kind to its rewrite rule. The match is exhaustive: node kinds
//! without a rule are rebuilt with rewritten children or passed through.

mod html;
mod link;
mod mailto;
mod video;
mod xref;

use std::borrow::Cow;

use crate::ast::{Block, BlockQuote, Document, Inline, InlineLink, List};
use crate::resolver::{ResolveContext, XrefResolver};

pub(crate) use html::render_nested_markup;

/// Applies the rewrite rules to a document.
pub(crate) struct Rewriter<'a> {
    resolver: &'a dyn XrefResolver,
    ctx: ResolveContext<'a>,
}

impl<'a> Rewriter<'a> {
    pub(crate) fn new(resolver: &'a dyn XrefResolver, ctx: ResolveContext<'a>) -> Self {
        Self { resolver, ctx }
    }

    pub(crate) fn rewrite(&self, document: Document) -> Document {
        Document {
            blocks: self.blocks(document.blocks),
        }
    }

    fn blocks(&self, blocks: Vec<Block>) -> Vec<Block> {
        blocks.into_iter().map(|b| self.block(b)).collect()
    }

    fn block(&self, block: Block) -> Block {
        match block {
            Block::Paragraph(inlines) => Block::Paragraph(self.inlines(inlines)),
            Block::Heading { level, content } => Block::Heading {
                level,
                content: self.inlines(content),
            },
            Block::BlockQuote(quote) => Block::BlockQuote(BlockQuote {
                depth: quote.depth,
                children: video::isolate_directives(self.blocks(quote.children)),
            }),
            Block::List(list) => Block::List(List {
                items: list.items.into_iter().map(|item| self.blocks(item)).collect(),
                ..list
            }),
            Block::Html(html) => Block::Html(render_nested_markup(&html)),
            block @ (Block::CodeBlock(_)
            | Block::ThematicBreak(_)
            | Block::FrontMatter(_)
            | Block::Opaque(_)) => block,
        }
    }

    /// Rewrite an inline sequence.
    ///
    /// Emphasis between an opening and a closing inline HTML tag is turned
    /// into HTML, the same way it is inside HTML blocks.
    fn inlines(&self, inlines: Vec<Inline>) -> Vec<Inline> {
        let mut out = Vec::with_capacity(inlines.len());
        let mut html_depth = 0isize;

        for inline in inlines {
            if let Inline::Html(fragment) = &inline {
                html_depth = (html_depth + html::tag_depth_delta(fragment)).max(0);
            }
            let inline = self.inline(inline);
            if html_depth > 0 {
                emphasis_as_html(inline, &mut out);
            } else {
                out.push(inline);
            }
        }
        out
    }

    fn inline(&self, inline: Inline) -> Inline {
        match inline {
            Inline::Emphasis {
                delimiter,
                children,
            } => Inline::Emphasis {
                delimiter,
                children: self.inlines(children),
            },
            Inline::Strong {
                delimiter,
                children,
            } => Inline::Strong {
                delimiter,
                children: self.inlines(children),
            },
            Inline::Strikethrough {
                delimiter,
                children,
            } => Inline::Strikethrough {
                delimiter,
                children: self.inlines(children),
            },
            Inline::Link(link) => Inline::Link(self.link(link)),
            Inline::ShortcutXref(xref) => {
                Inline::ShortcutXref(xref::resolve_shortcut(xref, self.resolver, &self.ctx))
            }
            Inline::Mailto(mailto) => Inline::Mailto(mailto::normalize(mailto)),
            inline @ (Inline::Text(_)
            | Inline::Autolink(_)
            | Inline::AutolinkXref(_)
            | Inline::Html(_)
            | Inline::Video(_)
            | Inline::Code(_)
            | Inline::SoftBreak
            | Inline::HardBreak { .. }
            | Inline::TaskMarker(_)
            | Inline::Raw(_)) => inline,
        }
    }

    fn link(&self, link: InlineLink) -> InlineLink {
        let encoded = match link::encode_destination(&link.destination) {
            Cow::Owned(encoded) => {
                tracing::debug!(from = %link.destination, to = %encoded, "Encoded link destination");
                Some(encoded)
            }
            Cow::Borrowed(_) => None,
        };
        InlineLink {
            destination: encoded.unwrap_or(link.destination),
            children: self.inlines(link.children),
            ..link
        }
    }
}

/// Push `inline`, replacing emphasis and strong nodes by HTML elements.
fn emphasis_as_html(inline: Inline, out: &mut Vec<Inline>) {
    let (tag, children) = match inline {
        Inline::Strong { children, .. } => ("strong", children),
        Inline::Emphasis { children, .. } => ("em", children),
        other => {
            out.push(other);
            return;
        }
    };
    out.push(Inline::Html(format!("<{tag}>")));
    for child in children {
        emphasis_as_html(child, out);
    }
    out.push(Inline::Html(format!("</{tag}>")));
}
