//! Document tree produced by the parser adapter.
//!
//! The tree is a closed set of tagged variants. Rewriters consume it by value
//! and return a new tree; the renderer only borrows it. Nodes never refer to
//! their parent, so traversal context lives on the call stack.

/// Parsed document: an ordered sequence of blocks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    /// Top-level blocks in document order.
    pub blocks: Vec<Block>,
}

/// Block-level node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// Paragraph of inline content.
    Paragraph(Vec<Inline>),
    /// Heading (levels 1-6), always rendered in ATX form.
    Heading {
        /// Heading level.
        level: u8,
        /// Heading text.
        content: Vec<Inline>,
    },
    /// Blockquote with its nested blocks.
    BlockQuote(BlockQuote),
    /// Bullet or ordered list.
    List(List),
    /// Fenced or indented code block.
    CodeBlock(CodeBlock),
    /// Raw HTML block (text as emitted by the parser, without container markers).
    Html(String),
    /// Thematic break, kept as written (`---`, `***`, ...).
    ThematicBreak(String),
    /// YAML front matter body (without the `---` fences).
    FrontMatter(String),
    /// Any other block, kept as its normalized source text.
    Opaque(String),
}

/// Blockquote node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockQuote {
    /// Number of `>` markers in effect for this quote (1 for a top-level quote).
    pub depth: usize,
    /// Nested blocks.
    pub children: Vec<Block>,
}

/// List node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct List {
    /// Bullet character or ordered numbering.
    pub kind: ListKind,
    /// Tight lists have no blank lines between items.
    pub tight: bool,
    /// Items, each an ordered sequence of blocks.
    pub items: Vec<Vec<Block>>,
}

/// List marker style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListKind {
    /// `-`, `*` or `+`.
    Bullet(char),
    /// `1.` or `1)` style numbering.
    Ordered {
        /// Number of the first item.
        start: u64,
        /// `.` or `)`.
        delimiter: char,
    },
}

/// Code block node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeBlock {
    /// Opening fence (e.g. "```" or "~~~~"); `None` for indented code.
    pub fence: Option<String>,
    /// Info string after the opening fence.
    pub info: String,
    /// Literal content, each line terminated by a newline.
    pub text: String,
}

/// Inline node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inline {
    /// Text exactly as written in the source (escapes and entities intact).
    Text(String),
    /// `*text*` or `_text_`.
    Emphasis {
        /// `*` or `_`.
        delimiter: char,
        /// Emphasized content.
        children: Vec<Inline>,
    },
    /// `**text**` or `__text__`.
    Strong {
        /// `*` or `_`.
        delimiter: char,
        /// Strong content.
        children: Vec<Inline>,
    },
    /// `~~text~~`.
    Strikethrough {
        /// Delimiter run as written.
        delimiter: String,
        /// Struck content.
        children: Vec<Inline>,
    },
    /// Inline link or image with an explicit destination.
    Link(InlineLink),
    /// URI autolink `<scheme:...>` that is neither an xref nor a mail-to.
    Autolink(String),
    /// `<xref:Identifier>`.
    AutolinkXref(AutolinkXref),
    /// `@Identifier`.
    ShortcutXref(ShortcutXref),
    /// `<mailto:address>` or `<address>`.
    Mailto(MailtoAutolink),
    /// Inline raw HTML.
    Html(String),
    /// `[!VIDEO url]` line inside a blockquote.
    Video(VideoDirective),
    /// Code span, as written.
    Code(String),
    /// Line break inside a paragraph.
    SoftBreak,
    /// Hard line break.
    HardBreak {
        /// Written as a trailing backslash rather than two spaces.
        backslash: bool,
    },
    /// Task list checkbox.
    TaskMarker(bool),
    /// Any other inline, kept as its normalized source text.
    Raw(String),
}

/// Inline link (or image) with destination and optional title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineLink {
    /// `![...](...)` rather than `[...](...)`.
    pub image: bool,
    /// Destination as parsed (escapes resolved).
    pub destination: String,
    /// Optional title.
    pub title: Option<String>,
    /// Link text.
    pub children: Vec<Inline>,
}

/// Explicit cross-reference autolink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutolinkXref {
    /// Scheme as written (normally `xref`).
    pub scheme: String,
    /// Referenced identifier.
    pub identifier: String,
}

/// Shortcut cross-reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortcutXref {
    /// Referenced identifier, without the `@` prefix.
    pub identifier: String,
    /// Set by the xref rewriter when the resolver knows the identifier.
    pub resolved: bool,
}

/// Mail autolink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailtoAutolink {
    /// Scheme as written (`mailto`, `Mailto`, ...); `None` for the bare form.
    pub scheme: Option<String>,
    /// Address part.
    pub address: String,
}

/// Video embed directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoDirective {
    /// Video URL.
    pub url: String,
}

impl Inline {
    /// Create a shortcut xref node in the unresolved state.
    #[must_use]
    pub fn shortcut_xref(identifier: impl Into<String>) -> Self {
        Self::ShortcutXref(ShortcutXref {
            identifier: identifier.into(),
            resolved: false,
        })
    }
}
