//! The markup pipeline: parse, rewrite, render.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use crate::ast::Document;
use crate::lenient::wrap_destinations;
use crate::options::MarkupOptions;
use crate::parse::{parse, parse_with_origin};
use crate::render::CanonicalRenderer;
use crate::resolver::{NoopResolver, ResolveContext, XrefResolver};
use crate::rewrite::Rewriter;

/// Rewrites Markdown into its canonical form.
///
/// The engine holds only immutable configuration and the resolver, so one
/// instance can serve any number of sequential or concurrent calls. Each call
/// builds its own tree and output buffer.
///
/// # Example
///
/// ```
/// use rw_markup::{MapResolver, MarkupEngine, MarkupOptions};
///
/// let engine = MarkupEngine::new(MarkupOptions::new())
///     .with_resolver(MapResolver::new().with_uid("System.String"));
///
/// assert_eq!(engine.markup("@System.String", "topic.md"), "@\"System.String\"\n\n");
/// assert_eq!(engine.markup("@outlook.com", "topic.md"), "@outlook.com\n\n");
/// ```
pub struct MarkupEngine {
    options: MarkupOptions,
    resolver: Box<dyn XrefResolver>,
}

impl MarkupEngine {
    /// Create an engine that resolves no cross-references.
    #[must_use]
    pub fn new(options: MarkupOptions) -> Self {
        Self {
            options,
            resolver: Box::new(NoopResolver),
        }
    }

    /// Use `resolver` for shortcut cross-references.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl XrefResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Engine configuration.
    #[must_use]
    pub fn options(&self) -> &MarkupOptions {
        &self.options
    }

    /// Rewrite `source` and render it back to Markdown.
    ///
    /// `context_path` is the location of the document; it is handed to the
    /// resolver and does not otherwise affect the output. This never fails:
    /// input the rewrite rules do not understand is passed through.
    pub fn markup(&self, source: &str, context_path: impl AsRef<Path>) -> String {
        let context_path = context_path.as_ref();
        tracing::debug!(path = %context_path.display(), len = source.len(), "Rewriting markup");

        let document = self.parse(source);
        let document = self.rewrite(document, context_path);
        CanonicalRenderer::new()
            .with_legacy_mode(self.options.legacy_mode)
            .render(&document)
    }

    /// Parse `source` into a document tree without rewriting it.
    ///
    /// Nodes kept as source text (tables, reference links, ...) carry the
    /// input as written, without the brackets added for lenient destinations.
    #[must_use]
    pub fn parse(&self, source: &str) -> Document {
        let source = normalize_newlines(source);
        if self.options.lenient_link_destinations
            && let Some(wrapped) = wrap_destinations(&source)
        {
            return parse_with_origin(
                &wrapped.text,
                &source,
                &wrapped.inserted,
                self.options.parser,
            );
        }
        parse(&source, self.options.parser)
    }

    /// Apply the rewrite rules to a parsed document.
    #[must_use]
    pub fn rewrite(&self, document: Document, context_path: &Path) -> Document {
        let ctx = ResolveContext {
            source_path: context_path,
        };
        Rewriter::new(self.resolver.as_ref(), ctx).rewrite(document)
    }
}

impl Default for MarkupEngine {
    fn default() -> Self {
        Self::new(MarkupOptions::default())
    }
}

impl fmt::Debug for MarkupEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkupEngine")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn normalize_newlines(source: &str) -> Cow<'_, str> {
    if source.contains('\r') {
        Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(source)
    }
}
