use std::path::PathBuf;

/// Errors raised at the I/O and parsing boundary.
///
/// Data-shape problems inside a loaded match never surface here; they are
/// normalized to defaults by the builders.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
