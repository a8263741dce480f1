//! Ashk: a retained-mode element tree
//!
//! Elements are rectangles arranged in a tree. Each frame the tree is
//! rendered bottom-up: every subtree becomes an offscreen surface, children
//! are placed with wrap-flow layout and composited into their parent. The
//! geometry of that frame is cached on the elements and drives pointer
//! hit-testing and scrolling until the next one.
//!
//! # Architecture
//!
//! - [`Tree`] owns all elements in an arena; [`ElementId`]s are generational.
//! - [`SurfaceProvider`] abstracts pixel surfaces. [`SoftwareSurfaces`] is
//!   the in-memory implementation with allocation accounting.
//! - [`TextShaper`] turns text into pixels. [`CosmicShaper`] uses
//!   cosmic-text; [`FixedCellShaper`] is a font-free monospace stand-in.
//! - [`Dispatcher`] turns raw input into per-element [`UiEvent`]s. Handlers
//!   return messages instead of touching the tree, so the application
//!   applies mutations after dispatch.
//!
//! ```ignore
//! let mut tree: Tree<Msg> = Tree::new(Element::new().size(800, 600));
//! let out = tree.render_root(&mut surfaces, &mut shaper)?;
//! let messages = dispatcher.pointer(&mut tree, Point::new(10, 10), [true, false, false]);
//! ```

// Core primitives
pub mod primitives;
pub mod length;
pub mod error;
pub mod event_context;

// Surfaces and text
pub mod surface;
pub mod text_engine;
pub mod content;

// Tree
pub mod scroll_state;
pub mod element;
pub mod tree;
pub mod render;
pub mod dispatch;

pub use primitives::{Color, Point, Rect, Size};
pub use length::{Length, ResolvedSize};
pub use error::{RenderError, SurfaceError, TreeError};
pub use event_context::{
    ButtonStates, InputEvent, Key, KeyEvent, Modifiers, MouseButton, NamedKey, ScrollDelta, UiEvent,
};
pub use surface::{Pixmap, SoftSurface, SoftwareSurfaces, SurfaceProvider};
pub use text_engine::{CosmicShaper, FixedCellShaper, FontFamily, FontSpec, TextShaper};
pub use content::{Content, ImageContent, TextContent};
pub use scroll_state::ScrollState;
pub use element::{Element, Handler, LayoutCache};
pub use tree::{ElementId, Tree};
pub use render::{FlowItem, FlowLayout, flow};
pub use dispatch::{DEFAULT_SCROLL_STEP, Dispatcher};
