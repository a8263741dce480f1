//! Editor error types.

use std::path::PathBuf;

use ashk_tree::{RenderError, TreeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("cursor row {row} out of range ({rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
