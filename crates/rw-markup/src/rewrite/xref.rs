//! Shortcut cross-reference resolution.

use crate::ast::ShortcutXref;
use crate::resolver::{Resolution, ResolveContext, XrefResolver};

/// Query the resolver and record the outcome on `xref`.
///
/// Resolver failures are logged and leave the reference unresolved.
pub(super) fn resolve_shortcut(
    mut xref: ShortcutXref,
    resolver: &dyn XrefResolver,
    ctx: &ResolveContext<'_>,
) -> ShortcutXref {
    xref.resolved = match resolver.resolve(&xref.identifier, ctx) {
        Ok(Resolution::Resolved(_)) => true,
        Ok(Resolution::Unresolved) => {
            tracing::debug!(
                uid = %xref.identifier,
                path = %ctx.source_path.display(),
                "Unresolved xref"
            );
            false
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                uid = %xref.identifier,
                path = %ctx.source_path.display(),
                "Xref resolver failed, treating as unresolved"
            );
            false
        }
    };
    xref
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::resolver::{MapResolver, NoopResolver, ResolveError};

    struct FailingResolver;

    impl XrefResolver for FailingResolver {
        fn resolve(
            &self,
            _uid: &str,
            _ctx: &ResolveContext<'_>,
        ) -> Result<Resolution, ResolveError> {
            Err(ResolveError::Unavailable("timeout".to_owned()))
        }
    }

    fn ctx() -> ResolveContext<'static> {
        ResolveContext {
            source_path: Path::new("topic.md"),
        }
    }

    fn xref(id: &str) -> ShortcutXref {
        ShortcutXref {
            identifier: id.to_owned(),
            resolved: false,
        }
    }

    #[test]
    fn test_resolved() {
        let resolver = MapResolver::new().with_uid("System.String");
        assert!(resolve_shortcut(xref("System.String"), &resolver, &ctx()).resolved);
    }

    #[test]
    fn test_unresolved() {
        assert!(!resolve_shortcut(xref("outlook.com"), &NoopResolver, &ctx()).resolved);
    }

    #[test]
    fn test_failure_is_unresolved() {
        assert!(!resolve_shortcut(xref("System.String"), &FailingResolver, &ctx()).resolved);
    }
}
