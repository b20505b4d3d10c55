use std::path::PathBuf;

use thiserror::Error;

/// Failure to load settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid settings: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failure while dispatching actions over a document.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("cell {index} out of range (document has {len} cells)")]
    CellOutOfRange { index: usize, len: usize },

    #[error("cell {0} is not a code cell")]
    NotCode(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
