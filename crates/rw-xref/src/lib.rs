//! Cross-reference maps.
//!
//! An [`XrefMap`] is loaded from docfx-style `xrefmap.yml` files and answers
//! the markup engine's resolver queries:
//!
//! ```yaml
//! ### YamlMime:XRefMap
//! references:
//! - uid: System.String
//!   name: String
//!   href: https://learn.microsoft.com/dotnet/api/system.string
//! ```
//!
//! # Example
//!
//! ```
//! use rw_markup::{MarkupEngine, MarkupOptions};
//! use rw_xref::XrefMap;
//!
//! let map = XrefMap::from_yaml_str("references:\n- uid: System.String\n").unwrap();
//! let engine = MarkupEngine::new(MarkupOptions::new()).with_resolver(map);
//!
//! assert_eq!(engine.markup("@System.String", "a.md"), "@\"System.String\"\n\n");
//! ```

mod error;
mod map;

pub use error::XrefMapError;
pub use map::XrefMap;
