//! CLI error types.

use rw_config::ConfigError;
use rw_xref::XrefMapError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Xref(#[from] XrefMapError),

    #[error("{0} file(s) not in canonical form")]
    NotCanonical(usize),
}
