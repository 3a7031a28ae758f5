use std::path::PathBuf;

/// Error loading an xref map.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum XrefMapError {
    /// File could not be read.
    #[error("failed to read xref map {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not a valid xref map.
    #[error("invalid xref map {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
