//! The element: sizing, margins, paint and interaction configuration of one
//! tree node, plus the geometry it resolved to in the last rendered frame.

use std::fmt;

use crate::content::Content;
use crate::event_context::UiEvent;
use crate::length::Length;
use crate::primitives::{Color, Point, Rect, Size};
use crate::scroll_state::ScrollState;
use crate::tree::ElementId;

/// Event callback. Returning `Some(message)` hands a message to the
/// application after dispatch finishes.
pub type Handler<M> = Box<dyn FnMut(ElementId, &UiEvent) -> Option<M>>;

/// Geometry written by the last render, read by hit-testing and scrolling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutCache {
    /// Placement inside the parent's surface (scroll offset applied).
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub margin_x: i32,
    pub margin_y: i32,
    /// Extent of the laid-out children before clipping.
    pub content_width: i32,
    pub content_height: i32,
}

impl LayoutCache {
    /// Bounds in the parent's coordinate space.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn content_size(&self) -> Size {
        Size::new(self.content_width, self.content_height)
    }
}

/// Hover flag and per-button "pressed while over" latches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PointerLatch {
    pub hovering: bool,
    pub pressed: [bool; 3],
}

/// A tree node.
///
/// Configuration fields are public and builder methods cover the common
/// ones. Structure (parent, children, content) is only changed through
/// [`Tree`](crate::tree::Tree) so the ownership invariants hold.
pub struct Element<M = ()> {
    pub width: Length,
    pub height: Length,
    pub min_width: i32,
    pub min_height: i32,

    pub margin_x: Length,
    pub margin_y: Length,

    /// Never force-wrapped onto a new line.
    pub inline: bool,
    /// The next sibling always starts a new line.
    pub breaking: bool,

    pub background: Color,
    pub scroll: ScrollState,

    pub selectable: bool,
    pub is_text_input: bool,
    pub(crate) selected: bool,

    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) content: Option<Content>,
    pub(crate) handlers: Vec<Handler<M>>,
    pub(crate) pointer: PointerLatch,
    pub(crate) layout: LayoutCache,
}

impl<M> Element<M> {
    /// An auto-sized, transparent, non-interactive element.
    pub fn new() -> Self {
        Self {
            width: Length::Auto,
            height: Length::Auto,
            min_width: 0,
            min_height: 0,
            margin_x: Length::Px(0),
            margin_y: Length::Px(0),
            inline: false,
            breaking: false,
            background: Color::TRANSPARENT,
            scroll: ScrollState::default(),
            selectable: false,
            is_text_input: false,
            selected: false,
            parent: None,
            children: Vec::new(),
            content: None,
            handlers: Vec::new(),
            pointer: PointerLatch::default(),
            layout: LayoutCache::default(),
        }
    }

    pub fn width(mut self, width: impl Into<Length>) -> Self {
        self.width = width.into();
        self
    }

    pub fn height(mut self, height: impl Into<Length>) -> Self {
        self.height = height.into();
        self
    }

    pub fn size(self, width: impl Into<Length>, height: impl Into<Length>) -> Self {
        self.width(width).height(height)
    }

    pub fn min_size(mut self, min_width: i32, min_height: i32) -> Self {
        self.min_width = min_width;
        self.min_height = min_height;
        self
    }

    pub fn margin(mut self, x: impl Into<Length>, y: impl Into<Length>) -> Self {
        self.margin_x = x.into();
        self.margin_y = y.into();
        self
    }

    pub fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    pub fn breaking(mut self, breaking: bool) -> Self {
        self.breaking = breaking;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn scrollable(mut self, horizontal: bool, vertical: bool) -> Self {
        self.scroll = ScrollState::new(horizontal, vertical);
        self
    }

    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn text_input(mut self, is_text_input: bool) -> Self {
        self.is_text_input = is_text_input;
        self
    }

    /// Start with content instead of children.
    pub fn content(mut self, content: impl Into<Content>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Register a handler before the element is inserted.
    pub fn on_event(
        mut self,
        handler: impl FnMut(ElementId, &UiEvent) -> Option<M> + 'static,
    ) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_hovered(&self) -> bool {
        self.pointer.hovering
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn get_content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    /// Geometry from the last render.
    pub fn layout(&self) -> &LayoutCache {
        &self.layout
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl<M> Default for Element<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for Element<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("min", &(self.min_width, self.min_height))
            .field("margin", &(self.margin_x, self.margin_y))
            .field("inline", &self.inline)
            .field("breaking", &self.breaking)
            .field("selectable", &self.selectable)
            .field("selected", &self.selected)
            .field("children", &self.children.len())
            .field("content", &self.content.is_some())
            .field("handlers", &self.handlers.len())
            .field("layout", &self.layout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_natural_and_inert() {
        let e: Element = Element::new();
        assert_eq!(e.width, Length::Auto);
        assert_eq!(e.height, Length::Auto);
        assert!(!e.inline && !e.breaking);
        assert!(!e.selectable && !e.is_selected());
        assert!(e.children().is_empty());
        assert!(e.get_content().is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let e: Element = Element::new()
            .size(Length::Percent(100), 40)
            .min_size(0, 40)
            .margin(5, Length::Percent(10))
            .scrollable(false, true)
            .selectable(true)
            .text_input(true);
        assert_eq!(e.width, Length::Percent(100));
        assert_eq!(e.height, Length::Px(40));
        assert_eq!(e.min_height, 40);
        assert_eq!(e.margin_y, Length::Percent(10));
        assert!(e.scroll.vertical && !e.scroll.horizontal);
        assert!(e.selectable && e.is_text_input);
    }

    #[test]
    fn layout_cache_rect() {
        let cache = LayoutCache {
            x: 3,
            y: 4,
            width: 10,
            height: 20,
            ..LayoutCache::default()
        };
        assert_eq!(cache.rect(), Rect::new(3, 4, 10, 20));
    }
}
