//! Plain-text editor on the ashk element tree.
//!
//! The document is the tree itself: one row element per line, one element
//! per character, and a cursor element moved between them.

pub mod app;
pub mod config;
pub mod editor;
pub mod error;

pub use app::{AppMessage, EditorApp, Notice};
pub use config::AppConfig;
pub use editor::{EditorMessage, EditorStyle, TextEditor};
pub use error::EditorError;
