//! Scroll State
//!
//! Per-element scroll configuration and offsets. Offsets are kept inside
//! `[0, content - view]` on every axis; a disabled axis always sits at 0.

use crate::primitives::{Point, Size};

/// Scroll flags and offsets of one element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    pub horizontal: bool,
    pub vertical: bool,
    offset_x: i32,
    offset_y: i32,
}

impl ScrollState {
    pub fn new(horizontal: bool, vertical: bool) -> Self {
        Self {
            horizontal,
            vertical,
            offset_x: 0,
            offset_y: 0,
        }
    }

    /// Current offset (0 on disabled axes).
    pub fn offset(&self) -> Point {
        Point::new(
            if self.horizontal { self.offset_x } else { 0 },
            if self.vertical { self.offset_y } else { 0 },
        )
    }

    /// Largest valid offset for a content extent inside a view extent.
    #[inline]
    pub fn max_offset(content: i32, view: i32) -> i32 {
        (content - view).max(0)
    }

    /// Re-clamp offsets after the content or view changed size.
    pub fn clamp_to(&mut self, content: Size, view: Size) {
        self.offset_x = if self.horizontal {
            self.offset_x
                .clamp(0, Self::max_offset(content.width, view.width))
        } else {
            0
        };
        self.offset_y = if self.vertical {
            self.offset_y
                .clamp(0, Self::max_offset(content.height, view.height))
        } else {
            0
        };
    }

    pub fn can_scroll_x(&self, content: Size, view: Size) -> bool {
        self.horizontal && content.width > view.width
    }

    pub fn can_scroll_y(&self, content: Size, view: Size) -> bool {
        self.vertical && content.height > view.height
    }

    /// Scroll by a pixel delta (positive = towards the start).
    ///
    /// Returns false if neither axis has anything to scroll, leaving the
    /// delta for an enclosing container. When only the horizontal axis can
    /// move, a vertical wheel delta drives it.
    pub fn scroll_by(&mut self, dx: i32, dy: i32, content: Size, view: Size) -> bool {
        let can_x = self.can_scroll_x(content, view);
        let can_y = self.can_scroll_y(content, view);
        if !can_x && !can_y {
            return false;
        }

        if can_x {
            let dx = if !can_y && dy != 0 { dy } else { dx };
            self.offset_x =
                (self.offset_x - dx).clamp(0, Self::max_offset(content.width, view.width));
        }
        if can_y {
            self.offset_y =
                (self.offset_y - dy).clamp(0, Self::max_offset(content.height, view.height));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_by_clamps() {
        let mut state = ScrollState::new(false, true);
        let content = Size::new(100, 300);
        let view = Size::new(100, 200);

        assert!(state.scroll_by(0, -50, content, view)); // scroll down
        assert_eq!(state.offset(), Point::new(0, 50));

        state.scroll_by(0, -200, content, view); // over-scroll
        assert_eq!(state.offset(), Point::new(0, 100));

        state.scroll_by(0, 300, content, view); // scroll up past 0
        assert_eq!(state.offset(), Point::new(0, 0));
    }

    #[test]
    fn nothing_to_scroll_is_not_consumed() {
        let mut state = ScrollState::new(true, true);
        assert!(!state.scroll_by(0, -10, Size::new(50, 50), Size::new(100, 100)));
        assert_eq!(state.offset(), Point::ORIGIN);
    }

    #[test]
    fn vertical_wheel_drives_horizontal_only_container() {
        let mut state = ScrollState::new(true, false);
        assert!(state.scroll_by(0, -30, Size::new(500, 10), Size::new(100, 10)));
        assert_eq!(state.offset(), Point::new(30, 0));
    }

    #[test]
    fn clamp_after_content_shrinks() {
        let mut state = ScrollState::new(false, true);
        state.scroll_by(0, -100, Size::new(10, 400), Size::new(10, 200));
        assert_eq!(state.offset().y, 100);

        state.clamp_to(Size::new(10, 250), Size::new(10, 200));
        assert_eq!(state.offset().y, 50);

        state.clamp_to(Size::new(10, 50), Size::new(10, 200));
        assert_eq!(state.offset().y, 0);
    }

    #[test]
    fn disabled_axis_reports_zero() {
        let mut state = ScrollState::new(true, true);
        state.scroll_by(-40, 0, Size::new(400, 10), Size::new(100, 10));
        state.horizontal = false;
        assert_eq!(state.offset(), Point::ORIGIN);
    }
}
