//! Cross-reference resolver collaborator.
//!
//! The engine queries a [`XrefResolver`] once per shortcut xref. An unknown
//! identifier is a normal [`Resolution::Unresolved`] outcome, not an error;
//! errors are reserved for resolver failures and are swallowed by the engine.

use std::collections::HashMap;
use std::path::Path;

/// Resolved cross-reference target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XrefTarget {
    /// Canonical identifier.
    pub uid: String,
    /// Display name.
    pub name: Option<String>,
    /// Target URL.
    pub href: Option<String>,
}

impl XrefTarget {
    /// Create a target with only a uid.
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ..Self::default()
        }
    }
}

/// Outcome of a resolver query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Identifier is known.
    Resolved(XrefTarget),
    /// Identifier is unknown.
    Unresolved,
}

impl Resolution {
    /// Whether the identifier was resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl From<Option<XrefTarget>> for Resolution {
    fn from(target: Option<XrefTarget>) -> Self {
        target.map_or(Self::Unresolved, Self::Resolved)
    }
}

/// Location of the document being rewritten.
#[derive(Clone, Copy, Debug)]
pub struct ResolveContext<'a> {
    /// Path of the source document, used as the base for relative lookups.
    pub source_path: &'a Path,
}

/// Resolver failure.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// Backend is unavailable.
    #[error("xref resolver unavailable: {0}")]
    Unavailable(String),

    /// Any other failure.
    #[error("xref resolver failed")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Maps an identifier to its target.
///
/// Implementations must be thread-safe: one engine may serve concurrent
/// `markup` calls. Caching, if any, is the resolver's own concern.
pub trait XrefResolver: Send + Sync {
    /// Look up `uid`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the lookup itself failed. Unknown
    /// identifiers yield `Ok(Resolution::Unresolved)`.
    fn resolve(&self, uid: &str, ctx: &ResolveContext<'_>) -> Result<Resolution, ResolveError>;
}

/// Resolver that never resolves anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopResolver;

impl XrefResolver for NoopResolver {
    fn resolve(&self, _uid: &str, _ctx: &ResolveContext<'_>) -> Result<Resolution, ResolveError> {
        Ok(Resolution::Unresolved)
    }
}

/// In-memory resolver keyed by exact uid.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use rw_markup::{MapResolver, ResolveContext, XrefResolver};
///
/// let resolver = MapResolver::new().with_uid("System.String");
/// let ctx = ResolveContext { source_path: Path::new("topic.md") };
///
/// assert!(resolver.resolve("System.String", &ctx).unwrap().is_resolved());
/// assert!(!resolver.resolve("outlook.com", &ctx).unwrap().is_resolved());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MapResolver {
    targets: HashMap<String, XrefTarget>,
}

impl MapResolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target.
    #[must_use]
    pub fn with_target(mut self, target: XrefTarget) -> Self {
        self.insert(target);
        self
    }

    /// Register a bare uid.
    #[must_use]
    pub fn with_uid(self, uid: impl Into<String>) -> Self {
        self.with_target(XrefTarget::new(uid))
    }

    /// Register a target, replacing any previous one with the same uid.
    pub fn insert(&mut self, target: XrefTarget) {
        self.targets.insert(target.uid.clone(), target);
    }

    /// Number of registered targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no targets are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl XrefResolver for MapResolver {
    fn resolve(&self, uid: &str, _ctx: &ResolveContext<'_>) -> Result<Resolution, ResolveError> {
        Ok(self.targets.get(uid).cloned().into())
    }
}

impl<T: XrefResolver + ?Sized> XrefResolver for Box<T> {
    fn resolve(&self, uid: &str, ctx: &ResolveContext<'_>) -> Result<Resolution, ResolveError> {
        (**self).resolve(uid, ctx)
    }
}

impl<T: XrefResolver + ?Sized> XrefResolver for std::sync::Arc<T> {
    fn resolve(&self, uid: &str, ctx: &ResolveContext<'_>) -> Result<Resolution, ResolveError> {
        (**self).resolve(uid, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ResolveContext<'static> {
        ResolveContext {
            source_path: Path::new("topic.md"),
        }
    }

    #[test]
    fn test_noop_resolver() {
        let resolution = NoopResolver.resolve("System.String", &ctx()).unwrap();
        assert_eq!(resolution, Resolution::Unresolved);
    }

    #[test]
    fn test_map_resolver_hit() {
        let resolver = MapResolver::new().with_target(XrefTarget {
            uid: "System.String".to_owned(),
            name: Some("String".to_owned()),
            href: Some("https://learn.microsoft.com/dotnet/api/system.string".to_owned()),
        });

        let resolution = resolver.resolve("System.String", &ctx()).unwrap();
        let Resolution::Resolved(target) = resolution else {
            panic!("expected resolved, got {resolution:?}");
        };
        assert_eq!(target.name.as_deref(), Some("String"));
    }

    #[test]
    fn test_map_resolver_is_case_sensitive() {
        let resolver = MapResolver::new().with_uid("System.String");
        assert!(!resolver.resolve("system.string", &ctx()).unwrap().is_resolved());
    }

    #[test]
    fn test_map_resolver_insert_replaces() {
        let mut resolver = MapResolver::new();
        resolver.insert(XrefTarget::new("A"));
        resolver.insert(XrefTarget {
            uid: "A".to_owned(),
            name: Some("Second".to_owned()),
            href: None,
        });
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn test_resolution_from_option() {
        assert_eq!(Resolution::from(None), Resolution::Unresolved);
        assert!(Resolution::from(Some(XrefTarget::new("A"))).is_resolved());
    }

    #[test]
    fn test_boxed_resolver() {
        let resolver: Box<dyn XrefResolver> = Box::new(MapResolver::new().with_uid("A"));
        assert!(resolver.resolve("A", &ctx()).unwrap().is_resolved());
    }
}
