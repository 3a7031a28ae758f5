use std::collections::HashMap;
use std::path::Path;

use rw_markup::{Resolution, ResolveContext, ResolveError, XrefResolver, XrefTarget};
use serde::Deserialize;

use crate::XrefMapError;

/// On-disk `xrefmap.yml` layout. Unknown keys (`sorted`, `fullName`, ...)
/// are ignored.
#[derive(Debug, Default, Deserialize)]
struct XrefMapFile {
    #[serde(default)]
    references: Vec<XrefSpec>,
}

#[derive(Debug, Deserialize)]
struct XrefSpec {
    uid: String,
    name: Option<String>,
    href: Option<String>,
}

/// Cross-reference targets keyed by uid.
///
/// Lookups try the exact uid first and fall back to a case-insensitive
/// match. When several maps define the same uid, the first definition wins.
#[derive(Clone, Debug, Default)]
pub struct XrefMap {
    targets: HashMap<String, XrefTarget>,
    /// Lowercased uid to the first uid registered with that spelling.
    folded: HashMap<String, String>,
}

impl XrefMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a map from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid xref map.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let trimmed = yaml.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        let file: XrefMapFile = serde_yaml::from_str(trimmed)?;
        let mut map = Self::new();
        for spec in file.references {
            map.insert(XrefTarget {
                uid: spec.uid,
                name: spec.name,
                href: spec.href,
            });
        }
        Ok(map)
    }

    /// Load a map from an `xrefmap.yml` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, XrefMapError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| XrefMapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let map = Self::from_yaml_str(&content).map_err(|source| XrefMapError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), targets = map.len(), "Loaded xref map");
        Ok(map)
    }

    /// Load and merge several maps, in order.
    ///
    /// # Errors
    ///
    /// Returns the first load error.
    pub fn load_all<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Result<Self, XrefMapError> {
        let mut map = Self::new();
        for path in paths {
            map.merge(Self::load(path)?);
        }
        Ok(map)
    }

    /// Add the targets of `other` that are not defined yet.
    pub fn merge(&mut self, other: XrefMap) {
        for target in other.targets.into_values() {
            self.insert(target);
        }
    }

    /// Register a target unless its uid is already defined.
    ///
    /// Returns `false` for a duplicate.
    pub fn insert(&mut self, target: XrefTarget) -> bool {
        if self.targets.contains_key(&target.uid) {
            tracing::debug!(uid = %target.uid, "Duplicate xref uid ignored");
            return false;
        }
        self.folded
            .entry(target.uid.to_lowercase())
            .or_insert_with(|| target.uid.clone());
        self.targets.insert(target.uid.clone(), target);
        true
    }

    /// Look up a target by uid.
    #[must_use]
    pub fn get(&self, uid: &str) -> Option<&XrefTarget> {
        self.targets.get(uid).or_else(|| {
            self.folded
                .get(&uid.to_lowercase())
                .and_then(|canonical| self.targets.get(canonical))
        })
    }

    /// Number of targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the map has no targets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl XrefResolver for XrefMap {
    fn resolve(&self, uid: &str, _ctx: &ResolveContext<'_>) -> Result<Resolution, ResolveError> {
        Ok(self.get(uid).cloned().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
### YamlMime:XRefMap
sorted: true
references:
- uid: System.String
  name: String
  href: https://learn.microsoft.com/dotnet/api/system.string
  fullName: System.String
- uid: System.Int32
  name: Int32
";

    #[test]
    fn test_from_yaml_str() {
        let map = XrefMap::from_yaml_str(SAMPLE).unwrap();

        assert_eq!(map.len(), 2);
        let target = map.get("System.String").unwrap();
        assert_eq!(target.name.as_deref(), Some("String"));
        assert_eq!(
            target.href.as_deref(),
            Some("https://learn.microsoft.com/dotnet/api/system.string")
        );
        assert_eq!(map.get("System.Int32").unwrap().href, None);
    }

    #[test]
    fn test_empty_yaml() {
        assert!(XrefMap::from_yaml_str("").unwrap().is_empty());
        assert!(XrefMap::from_yaml_str("sorted: true\n").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(XrefMap::from_yaml_str("references: [uid: ").is_err());
    }

    #[test]
    fn test_case_insensitive_fallback() {
        let map = XrefMap::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(map.get("system.string").unwrap().uid, "System.String");
        assert!(map.get("System.Strin").is_none());
    }

    #[test]
    fn test_exact_match_preferred() {
        let mut map = XrefMap::new();
        map.insert(XrefTarget::new("a.B"));
        map.insert(XrefTarget::new("A.b"));

        assert_eq!(map.get("A.b").unwrap().uid, "A.b");
        assert_eq!(map.get("a.b").unwrap().uid, "a.B");
    }

    #[test]
    fn test_first_definition_wins() {
        let mut first = XrefMap::new();
        first.insert(XrefTarget {
            uid: "A".to_owned(),
            name: Some("first".to_owned()),
            href: None,
        });
        let mut second = XrefMap::new();
        second.insert(XrefTarget {
            uid: "A".to_owned(),
            name: Some("second".to_owned()),
            href: None,
        });
        second.insert(XrefTarget::new("B"));

        first.merge(second);

        assert_eq!(first.len(), 2);
        assert_eq!(first.get("A").unwrap().name.as_deref(), Some("first"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("xrefmap.yml");
        std::fs::write(&path, SAMPLE).unwrap();

        let map = XrefMap::load(&path).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = XrefMap::load(dir.path().join("missing.yml")).unwrap_err();

        assert!(matches!(err, XrefMapError::Io { .. }));
        assert!(err.to_string().contains("missing.yml"));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yml");
        std::fs::write(&path, "references: {uid: [").unwrap();

        let err = XrefMap::load(&path).unwrap_err();
        assert!(matches!(err, XrefMapError::Yaml { .. }));
    }

    #[test]
    fn test_load_all_merges_in_order() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.yml");
        let b = dir.path().join("b.yml");
        std::fs::write(&a, "references:\n- uid: X\n  name: from-a\n").unwrap();
        std::fs::write(&b, "references:\n- uid: X\n  name: from-b\n- uid: Y\n").unwrap();

        let map = XrefMap::load_all([&a, &b]).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("X").unwrap().name.as_deref(), Some("from-a"));
    }

    #[test]
    fn test_resolver_impl() {
        let map = XrefMap::from_yaml_str(SAMPLE).unwrap();
        let ctx = ResolveContext {
            source_path: Path::new("a.md"),
        };

        assert!(map.resolve("System.String", &ctx).unwrap().is_resolved());
        assert!(!map.resolve("outlook.com", &ctx).unwrap().is_resolved());
    }
}
