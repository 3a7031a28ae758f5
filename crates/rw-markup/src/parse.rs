//! Parser adapter: builds a [`Document`] from pulldown-cmark events.
//!
//! pulldown-cmark is used with offset iteration so that nodes the tree does
//! not model can be kept as their source text. Shortcut xrefs (`@Id`) and
//! video directives are not CommonMark syntax; they are recognized here, on
//! the merged text of each inline sequence.
//!
//! Link reference definitions produce no events; their spans are taken from
//! the parser's definition table and kept as opaque blocks in place.

use std::collections::VecDeque;
use std::iter::Peekable;
use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, LinkType, Parser, Tag};
use regex::Regex;

use crate::ast::{
    AutolinkXref, Block, BlockQuote, CodeBlock, Document, Inline, InlineLink, List, ListKind,
    MailtoAutolink, VideoDirective,
};
use crate::options::ParserOptions;
use crate::util::heading_level_to_num;

static VIDEO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[!(?i:video)[ \t]+([^\s\]]+)\]$").unwrap());

/// Characters that end a shortcut xref identifier when they trail it.
const XREF_TRAILING: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"', ')', ']', '}', '>'];

/// Parse `source` into a document tree.
#[must_use]
pub fn parse(source: &str, options: ParserOptions) -> Document {
    parse_with_origin(source, source, &[], options)
}

/// Parse `source`, a copy of `original` with single bytes inserted at the
/// ascending offsets `inserted`.
///
/// Nodes kept as source text are sliced from `original`.
pub(crate) fn parse_with_origin<'a>(
    source: &'a str,
    original: &'a str,
    inserted: &'a [usize],
    options: ParserOptions,
) -> Document {
    let parser = Parser::new_ext(source, options.to_pulldown());
    let mut definitions: Vec<Range<usize>> = parser
        .reference_definitions()
        .iter()
        .map(|(_, def)| def.span.clone())
        .collect();
    definitions.sort_by_key(|span| span.start);

    let mut builder = TreeBuilder {
        source,
        original,
        inserted,
        events: parser.into_offset_iter().peekable(),
        containers: Vec::new(),
        definitions: definitions.into(),
        last_inline_end: 0,
    };
    let mut blocks = builder.blocks_until_end();
    builder.flush_definitions(usize::MAX, &mut blocks);
    Document { blocks }
}

/// Container whose continuation prefix is stripped from multi-line spans.
#[derive(Clone, Copy, Debug)]
enum Container {
    Quote,
    Item { indent: usize },
}

struct TreeBuilder<'a, I>
where
    I: Iterator<Item = (Event<'a>, Range<usize>)>,
{
    source: &'a str,
    /// Text the caller supplied, before lenient wrapping.
    original: &'a str,
    /// Offsets in `source` of bytes absent from `original`.
    inserted: &'a [usize],
    events: Peekable<I>,
    containers: Vec<Container>,
    /// Spans of link reference definitions not emitted yet.
    definitions: VecDeque<Range<usize>>,
    /// End offset of the last inline event, used to recover escape backslashes.
    last_inline_end: usize,
}

impl<'a, I> TreeBuilder<'a, I>
where
    I: Iterator<Item = (Event<'a>, Range<usize>)>,
{
    fn blocks_until_end(&mut self) -> Vec<Block> {
        let mut blocks = Vec::new();
        while let Some((event, range)) = self.events.next() {
            if matches!(event, Event::End(_)) {
                self.flush_definitions(range.end, &mut blocks);
                break;
            }
            self.flush_definitions(range.start, &mut blocks);
            if let Some(block) = self.block(event, range) {
                blocks.push(block);
            }
        }
        blocks
    }

    /// Emit the reference definitions that start before `before`.
    fn flush_definitions(&mut self, before: usize, out: &mut Vec<Block>) {
        while let Some(span) = self.definitions.front().filter(|s| s.start < before) {
            let text = self.slice(span.clone());
            self.definitions.pop_front();
            out.push(Block::Opaque(text.trim_end().to_owned()));
        }
    }

    fn block(&mut self, event: Event<'a>, range: Range<usize>) -> Option<Block> {
        let block = match event {
            Event::Start(Tag::Paragraph) => {
                let inlines = self.inlines_until_end();
                self.paragraph(inlines)
            }
            Event::Start(Tag::Heading { level, .. }) => Block::Heading {
                level: heading_level_to_num(level),
                content: self.inlines_until_end(),
            },
            Event::Start(Tag::BlockQuote(_)) => self.block_quote(),
            Event::Start(Tag::List(start)) => self.list(start),
            Event::Start(Tag::CodeBlock(kind)) => self.code_block(kind, &range),
            Event::Start(Tag::HtmlBlock) => Block::Html(self.literal_until_end()),
            Event::Start(Tag::MetadataBlock(_)) => Block::FrontMatter(self.literal_until_end()),
            Event::Rule => Block::ThematicBreak(self.source[range].trim().to_owned()),
            Event::End(_) => return None,
            event if is_inline(&event) => {
                // Tight list items carry inline content without a paragraph.
                let mut inlines = Vec::new();
                self.inline(event, range, &mut inlines);
                while let Some((event, range)) = self.events.next_if(|(e, _)| is_inline(e)) {
                    self.inline(event, range, &mut inlines);
                }
                let inlines = finish_inlines(inlines);
                self.paragraph(inlines)
            }
            Event::Start(_) => {
                self.skip_to_end();
                Block::Opaque(self.slice(range))
            }
            Event::Html(html) => Block::Html(html.into_string()),
            _ => Block::Opaque(self.slice(range)),
        };
        Some(block)
    }

    fn paragraph(&self, inlines: Vec<Inline>) -> Block {
        if self.in_quote() {
            Block::Paragraph(mark_video_lines(inlines))
        } else {
            Block::Paragraph(inlines)
        }
    }

    fn block_quote(&mut self) -> Block {
        self.containers.push(Container::Quote);
        let depth = self.quote_depth();
        let children = self.blocks_until_end();
        self.containers.pop();
        Block::BlockQuote(BlockQuote { depth, children })
    }

    fn list(&mut self, start: Option<u64>) -> Block {
        let mut kind = None;
        let mut tight = true;
        let mut items = Vec::new();

        while let Some((event, range)) = self.events.next() {
            match event {
                Event::Start(Tag::Item) => {
                    let (marker, indent) = self.item_marker(start, range.start);
                    kind.get_or_insert(marker);
                    if matches!(self.events.peek(), Some((Event::Start(Tag::Paragraph), _))) {
                        tight = false;
                    }
                    self.containers.push(Container::Item { indent });
                    items.push(self.blocks_until_end());
                    self.containers.pop();
                }
                Event::End(_) => break,
                _ => {}
            }
        }

        Block::List(List {
            kind: kind.unwrap_or(ListKind::Bullet('-')),
            tight,
            items,
        })
    }

    /// Marker style and content indent of the item starting at `at`.
    fn item_marker(&self, start: Option<u64>, at: usize) -> (ListKind, usize) {
        let rest = self.source[at..].trim_start_matches(' ');
        let (kind, width) = match start {
            Some(start) => {
                let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
                let delimiter = match rest.as_bytes().get(digits) {
                    Some(b')') => ')',
                    _ => '.',
                };
                (ListKind::Ordered { start, delimiter }, digits + 1)
            }
            None => {
                let bullet = rest.chars().next().filter(|c| matches!(c, '-' | '*' | '+'));
                (ListKind::Bullet(bullet.unwrap_or('-')), 1)
            }
        };

        let spaces = rest
            .bytes()
            .skip(width)
            .take_while(|&b| b == b' ')
            .count();
        let followed_by_content = rest
            .as_bytes()
            .get(width + spaces)
            .is_some_and(|&b| b != b'\n');
        let padding = if followed_by_content && (1..=4).contains(&spaces) {
            spaces
        } else {
            1
        };
        (kind, width + padding)
    }

    fn code_block(&mut self, kind: CodeBlockKind<'a>, range: &Range<usize>) -> Block {
        let (fence, info) = match kind {
            CodeBlockKind::Fenced(info) => {
                let first_line = self.source[range.clone()].trim_start();
                let fence = match first_line.chars().next() {
                    Some(c @ ('`' | '~')) => first_line.chars().take_while(|&x| x == c).collect(),
                    _ => "```".to_owned(),
                };
                (Some(fence), info.trim().to_owned())
            }
            CodeBlockKind::Indented => (None, String::new()),
        };
        Block::CodeBlock(CodeBlock {
            fence,
            info,
            text: self.literal_until_end(),
        })
    }

    fn inlines_until_end(&mut self) -> Vec<Inline> {
        let mut inlines = Vec::new();
        while let Some((event, range)) = self.events.next() {
            if matches!(event, Event::End(_)) {
                break;
            }
            self.inline(event, range, &mut inlines);
        }
        finish_inlines(inlines)
    }

    fn inline(&mut self, event: Event<'a>, range: Range<usize>, out: &mut Vec<Inline>) {
        let node = match event {
            Event::Text(_) => {
                self.push_text(range, out);
                return;
            }
            Event::Code(_) => Inline::Code(self.slice(range.clone())),
            Event::InlineHtml(html) | Event::Html(html) => Inline::Html(html.into_string()),
            Event::SoftBreak => Inline::SoftBreak,
            Event::HardBreak => Inline::HardBreak {
                backslash: self.source[range.clone()].starts_with('\\'),
            },
            Event::TaskListMarker(checked) => Inline::TaskMarker(checked),
            Event::Start(Tag::Emphasis) => Inline::Emphasis {
                delimiter: self.delimiter_at(range.start),
                children: self.inlines_until_end(),
            },
            Event::Start(Tag::Strong) => Inline::Strong {
                delimiter: self.delimiter_at(range.start),
                children: self.inlines_until_end(),
            },
            Event::Start(Tag::Strikethrough) => Inline::Strikethrough {
                delimiter: self.source[range.start..]
                    .chars()
                    .take_while(|&c| c == '~')
                    .collect(),
                children: self.inlines_until_end(),
            },
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            }) => self.link(link_type, dest_url.into_string(), title.into_string(), false, &range),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                ..
            }) => self.link(link_type, dest_url.into_string(), title.into_string(), true, &range),
            Event::Start(_) => {
                self.skip_to_end();
                Inline::Raw(self.slice(range.clone()))
            }
            Event::End(_) => return,
            Event::FootnoteReference(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_)
            | Event::Rule => Inline::Raw(self.slice(range.clone())),
        };
        self.last_inline_end = range.end;
        out.push(node);
    }

    fn link(
        &mut self,
        link_type: LinkType,
        destination: String,
        title: String,
        image: bool,
        range: &Range<usize>,
    ) -> Inline {
        match link_type {
            LinkType::Inline => Inline::Link(InlineLink {
                image,
                destination,
                title: (!title.is_empty()).then_some(title),
                children: self.inlines_until_end(),
            }),
            LinkType::Autolink if !image => {
                self.skip_to_end();
                classify_autolink(&self.source[range.clone()])
            }
            LinkType::Email if !image => {
                self.skip_to_end();
                Inline::Mailto(MailtoAutolink {
                    scheme: None,
                    address: destination,
                })
            }
            _ => {
                self.skip_to_end();
                Inline::Raw(self.slice(range.clone()))
            }
        }
    }

    /// Append a text event, merging with a preceding text node.
    ///
    /// The source span is used instead of the decoded text so escapes and
    /// entities survive. A backslash escape just before the span belongs to it.
    fn push_text(&mut self, range: Range<usize>, out: &mut Vec<Inline>) {
        let mut start = range.start;
        if start > self.last_inline_end && self.source.as_bytes()[start - 1] == b'\\' {
            start -= 1;
        }
        let raw = self.slice(start..range.end);
        self.last_inline_end = range.end;

        if let Some(Inline::Text(prev)) = out.last_mut() {
            prev.push_str(&raw);
        } else {
            out.push(Inline::Text(raw));
        }
    }

    /// Concatenated literal content up to the matching end event.
    fn literal_until_end(&mut self) -> String {
        let mut text = String::new();
        for (event, _) in self.events.by_ref() {
            match event {
                Event::End(_) => break,
                Event::Text(t) | Event::Html(t) | Event::InlineHtml(t) | Event::Code(t) => {
                    text.push_str(&t);
                }
                _ => {}
            }
        }
        text
    }

    fn skip_to_end(&mut self) {
        let mut depth = 1usize;
        for (event, _) in self.events.by_ref() {
            match event {
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    fn delimiter_at(&self, at: usize) -> char {
        match self.source[at..].chars().next() {
            Some('_') => '_',
            _ => '*',
        }
    }

    fn in_quote(&self) -> bool {
        self.containers
            .iter()
            .any(|c| matches!(c, Container::Quote))
    }

    fn quote_depth(&self) -> usize {
        self.containers
            .iter()
            .filter(|c| matches!(c, Container::Quote))
            .count()
    }

    /// Source text of `range` with enclosing container prefixes removed from
    /// continuation lines.
    fn slice(&self, range: Range<usize>) -> String {
        let start = self.original_offset(range.start);
        let end = self.original_offset(range.end);
        let text = &self.original[start..end];
        if self.containers.is_empty() || !text.contains('\n') {
            return text.to_owned();
        }

        let mut out = String::with_capacity(text.len());
        for (i, line) in text.split('\n').enumerate() {
            if i == 0 {
                out.push_str(line);
            } else {
                out.push('\n');
                out.push_str(self.strip_prefixes(line));
            }
        }
        out
    }

    /// Offset in `original` of the byte at `at` in `source`.
    fn original_offset(&self, at: usize) -> usize {
        at - self.inserted.partition_point(|&p| p < at)
    }

    fn strip_prefixes<'l>(&self, mut line: &'l str) -> &'l str {
        for container in &self.containers {
            line = match *container {
                Container::Quote => strip_quote_marker(line),
                Container::Item { indent } => {
                    let n = line.bytes().take(indent).take_while(|&b| b == b' ').count();
                    &line[n..]
                }
            };
        }
        line
    }
}

fn strip_quote_marker(line: &str) -> &str {
    let trimmed = line.trim_start_matches(' ');
    match trimmed.strip_prefix('>') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
        None => line,
    }
}

fn is_inline(event: &Event<'_>) -> bool {
    match event {
        Event::Text(_)
        | Event::Code(_)
        | Event::InlineHtml(_)
        | Event::InlineMath(_)
        | Event::FootnoteReference(_)
        | Event::SoftBreak
        | Event::HardBreak
        | Event::TaskListMarker(_) => true,
        Event::Start(tag) => matches!(
            tag,
            Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. }
                | Tag::Image { .. }
        ),
        _ => false,
    }
}

/// `<scheme:rest>` autolink source into its typed node.
fn classify_autolink(raw: &str) -> Inline {
    let inner = raw
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(raw);

    match inner.split_once(':') {
        Some((scheme, identifier)) if scheme.eq_ignore_ascii_case("xref") => {
            Inline::AutolinkXref(AutolinkXref {
                scheme: scheme.to_owned(),
                identifier: identifier.to_owned(),
            })
        }
        Some((scheme, address)) if scheme.eq_ignore_ascii_case("mailto") => {
            Inline::Mailto(MailtoAutolink {
                scheme: Some(scheme.to_owned()),
                address: address.to_owned(),
            })
        }
        _ => Inline::Autolink(inner.to_owned()),
    }
}

/// Split shortcut xrefs out of text nodes.
fn finish_inlines(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out = Vec::with_capacity(inlines.len());
    for inline in inlines {
        match inline {
            Inline::Text(text) => split_shortcut_xrefs(text, &mut out),
            other => out.push(other),
        }
    }
    out
}

fn split_shortcut_xrefs(text: String, out: &mut Vec<Inline>) {
    if !text.contains('@') {
        out.push(Inline::Text(text));
        return;
    }

    let mut cursor = 0;
    let mut search = 0;
    while let Some(found) = text[search..].find('@') {
        let at = search + found;
        match shortcut_xref_end(&text, at) {
            Some(end) => {
                if at > cursor {
                    out.push(Inline::Text(text[cursor..at].to_owned()));
                }
                out.push(Inline::shortcut_xref(&text[at + 1..end]));
                cursor = end;
                search = end;
            }
            None => search = at + 1,
        }
    }
    if cursor < text.len() {
        out.push(Inline::Text(text[cursor..].to_owned()));
    }
}

/// End offset of a shortcut xref whose `@` is at `at`, if it is one.
///
/// The `@` must not follow a word character (so `name@host` stays text) and
/// must be followed by an ASCII letter. Quoted forms (`@"Id"`) are already
/// explicit and stay text.
fn shortcut_xref_end(text: &str, at: usize) -> Option<usize> {
    let before = text[..at].chars().next_back();
    if before.is_some_and(|c| c.is_alphanumeric() || matches!(c, '@' | '\\' | '_' | '`')) {
        return None;
    }

    let rest = &text[at + 1..];
    if !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    let run = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let identifier = rest[..run].trim_end_matches(XREF_TRAILING);
    Some(at + 1 + identifier.len())
}

/// Replace paragraph lines that consist of a video directive.
fn mark_video_lines(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out = Vec::with_capacity(inlines.len());
    let mut line = Vec::new();

    for inline in inlines {
        if matches!(inline, Inline::SoftBreak) {
            flush_line(&mut line, &mut out);
            out.push(Inline::SoftBreak);
        } else {
            line.push(inline);
        }
    }
    flush_line(&mut line, &mut out);
    out
}

fn flush_line(line: &mut Vec<Inline>, out: &mut Vec<Inline>) {
    if let [Inline::Text(text)] = line.as_slice()
        && let Some(url) = video_url(text)
    {
        out.push(Inline::Video(VideoDirective { url }));
        line.clear();
    } else {
        out.append(line);
    }
}

fn video_url(text: &str) -> Option<String> {
    VIDEO_RE
        .captures(text.trim())
        .map(|caps| caps[1].to_owned())
}
