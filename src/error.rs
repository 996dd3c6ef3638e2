use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the analysis pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the analysis pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read directory entry: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("parse error in {}:{line}: {message}", .file.display())]
    Parse {
        file: PathBuf,
        line: usize,
        message: String,
    },

    #[error("failed to load Go grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("invalid tree-sitter query: {0}")]
    Query(#[from] tree_sitter::QueryError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no Gin routes found in {}", .0.display())]
    NoRoutesFound(PathBuf),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON serialization failed: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(format!("YAML serialization failed: {}", err))
    }
}
