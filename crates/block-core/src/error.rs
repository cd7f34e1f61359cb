use std::path::PathBuf;

use thiserror::Error;

use crate::block::{BlockId, BlockKind};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("block already exists: {0}")]
    DuplicateId(BlockId),

    #[error("index {index} out of bounds for document with {len} blocks")]
    IndexOutOfBounds { index: usize, len: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("block kind registered twice: {0}")]
    DuplicateKind(BlockKind),

    #[error("shortcut prefix registered twice: {0:?}")]
    DuplicateShortcut(String),

    /// `/` opens the command palette and `""` would match every block.
    #[error("shortcut prefix is reserved: {0:?}")]
    ReservedShortcut(String),
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not an image ({mime})", path.display())]
    NotAnImage { path: PathBuf, mime: String },
}

#[derive(Error, Debug)]
pub enum ValueError {
    #[error("invalid block JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}
