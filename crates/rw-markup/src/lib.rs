//! Markdown rewriting engine.
//!
//! [`MarkupEngine`] parses Markdown with pulldown-cmark, applies a fixed set
//! of rewrite rules and serializes the tree back to canonical Markdown:
//!
//! - `@Identifier` cross-references are quoted (`@"Identifier"`) once the
//!   [`XrefResolver`] knows them, and left as written otherwise
//! - `<xref:Identifier>` autolinks are passed through
//! - `<mailto:address>` autolinks lose their scheme
//! - inline link destinations get reserved characters percent-encoded
//! - `[!VIDEO url]` lines in blockquotes are laid out on their own lines
//! - emphasis inside raw HTML becomes `<strong>`/`<em>`
//!
//! Rewriting never fails. Unknown references, malformed directives and
//! resolver errors all leave the input as written.
//!
//! # Example
//!
//! ```
//! use rw_markup::{MarkupEngine, MarkupOptions};
//!
//! let engine = MarkupEngine::new(MarkupOptions::new());
//! let output = engine.markup("<Mailto:docs@microsoft.com>", "index.md");
//! assert_eq!(output, "<docs@microsoft.com>\n\n");
//! ```

pub mod ast;
mod edits;
mod engine;
mod fence;
mod lenient;
mod options;
mod parse;
mod render;
mod resolver;
mod rewrite;
mod util;

pub use ast::{Block, Document, Inline};
pub use engine::MarkupEngine;
pub use options::{MarkupOptions, ParserOptions};
pub use parse::parse;
pub use render::CanonicalRenderer;
pub use resolver::{
    MapResolver, NoopResolver, Resolution, ResolveContext, ResolveError, XrefResolver,
    XrefTarget,
};
