//! Engine configuration.

use pulldown_cmark::Options;

/// Parser extension toggles, passed to pulldown-cmark unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParserOptions {
    /// GFM tables.
    pub tables: bool,
    /// `~~strikethrough~~`.
    pub strikethrough: bool,
    /// `- [ ] task` list items.
    pub tasklists: bool,
    /// `[^1]` footnotes.
    pub footnotes: bool,
    /// YAML front matter at the start of the document.
    pub front_matter: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            tasklists: true,
            footnotes: false,
            front_matter: true,
        }
    }
}

impl ParserOptions {
    /// Convert to pulldown-cmark options.
    #[must_use]
    pub fn to_pulldown(self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.front_matter {
            options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
        }
        options
    }
}

/// Immutable engine configuration.
///
/// # Example
///
/// ```
/// use rw_markup::MarkupOptions;
///
/// let options = MarkupOptions::new().with_legacy_mode(true);
/// assert!(options.legacy_mode);
/// assert!(options.lenient_link_destinations);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkupOptions {
    /// Render headings with a single trailing newline, as older corpora expect.
    pub legacy_mode: bool,
    /// Accept `[text](a b c)` link destinations containing whitespace.
    pub lenient_link_destinations: bool,
    /// Parser extensions.
    pub parser: ParserOptions,
}

impl Default for MarkupOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupOptions {
    /// Create options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            legacy_mode: false,
            lenient_link_destinations: true,
            parser: ParserOptions::default(),
        }
    }

    /// Enable or disable legacy rendering.
    #[must_use]
    pub fn with_legacy_mode(mut self, enabled: bool) -> Self {
        self.legacy_mode = enabled;
        self
    }

    /// Enable or disable whitespace-tolerant link destinations.
    #[must_use]
    pub fn with_lenient_link_destinations(mut self, enabled: bool) -> Self {
        self.lenient_link_destinations = enabled;
        self
    }

    /// Set parser extension toggles.
    #[must_use]
    pub fn with_parser(mut self, parser: ParserOptions) -> Self {
        self.parser = parser;
        self
    }
}
