//! Error types for the element tree.

use thiserror::Error;

use crate::tree::ElementId;

/// Failure reported by a [`SurfaceProvider`](crate::surface::SurfaceProvider).
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("invalid surface size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },

    #[error("surface allocation failed: {live} live surfaces, limit {limit}")]
    Exhausted { live: usize, limit: usize },

    #[error("surface operation failed: {0}")]
    Backend(String),
}

/// Failure while laying out or rendering a subtree.
///
/// Any of these aborts the whole frame; there is no partial commit.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("text shaping failed: {0}")]
    Shaping(String),

    #[error("element {0:?} no longer exists")]
    StaleElement(ElementId),
}

/// Failure of a structural tree operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("element {0:?} no longer exists")]
    StaleElement(ElementId),

    #[error("element {child:?} is an ancestor of {parent:?}")]
    WouldCycle { parent: ElementId, child: ElementId },

    #[error("the root element cannot be detached or destroyed")]
    RootDetach,
}
