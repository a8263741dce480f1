//! Event dispatch.
//!
//! Pointer updates walk the whole tree from the root, translating the
//! pointer into each element's local space using the cached placements of
//! the last frame. An element's handlers fire before its children's.
//! Keyboard and text input go to the single selected element.

use crate::event_context::{ButtonStates, InputEvent, KeyEvent, MouseButton, ScrollDelta, UiEvent};
use crate::primitives::{Point, Rect};
use crate::tree::{ElementId, Tree};

/// Pixels scrolled per wheel line.
pub const DEFAULT_SCROLL_STEP: i32 = 60;

/// Per-window dispatch state: last button states and the selected element.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    buttons: ButtonStates,
    selected: Option<ElementId>,
    scroll_step: i32,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            buttons: [false; 3],
            selected: None,
            scroll_step: DEFAULT_SCROLL_STEP,
        }
    }

    pub fn with_scroll_step(mut self, step: i32) -> Self {
        self.scroll_step = step;
        self
    }

    pub fn scroll_step(&self) -> i32 {
        self.scroll_step
    }

    pub fn buttons(&self) -> ButtonStates {
        self.buttons
    }

    /// The selected element, if it is still alive.
    pub fn selected<M>(&self, tree: &Tree<M>) -> Option<ElementId> {
        self.selected.filter(|&id| tree.contains(id))
    }

    /// Select `id` directly (no pointer involved). Non-selectable elements
    /// are ignored.
    pub fn select<M>(&mut self, tree: &mut Tree<M>, id: ElementId) {
        if tree.get(id).is_some_and(|e| e.selectable) {
            self.selected = Some(id);
            tree.select_exclusive(self.selected);
        }
    }

    /// Route one raw input event. Resize is the caller's business and is
    /// ignored here.
    pub fn dispatch<M>(&mut self, tree: &mut Tree<M>, event: &InputEvent) -> Vec<M> {
        match event {
            InputEvent::Pointer { x, y, buttons } => self.pointer(tree, Point::new(*x, *y), *buttons),
            InputEvent::Wheel { x, y, delta } => {
                self.scroll(tree, Point::new(*x, *y), *delta);
                Vec::new()
            }
            InputEvent::Text(text) => self.text_input(tree, text),
            InputEvent::Key(key) => self.key(tree, key),
            InputEvent::Resize { .. } => Vec::new(),
        }
    }

    // =====================================================================
    // Pointer
    // =====================================================================

    /// Feed the current pointer position (root coordinates) and the full
    /// button state. Emits hover, button and click edges.
    pub fn pointer<M>(&mut self, tree: &mut Tree<M>, pos: Point, buttons: ButtonStates) -> Vec<M> {
        let previous = std::mem::replace(&mut self.buttons, buttons);
        let mut out = Vec::new();
        let mut pressed = None;

        let root = tree.root();
        visit(tree, root, pos, true, previous, buttons, &mut pressed, &mut out);

        if pressed.is_some() {
            self.selected = pressed;
        }
        let selected = self.selected(tree);
        tree.select_exclusive(selected);
        out
    }

    // =====================================================================
    // Keyboard
    // =====================================================================

    /// Committed text goes to the selected element if it takes text input.
    pub fn text_input<M>(&mut self, tree: &mut Tree<M>, text: &str) -> Vec<M> {
        match self.focused_input(tree) {
            Some(id) => tree.emit(id, &UiEvent::Text(text.to_string())),
            None => Vec::new(),
        }
    }

    pub fn key<M>(&mut self, tree: &mut Tree<M>, key: &KeyEvent) -> Vec<M> {
        match self.selected(tree) {
            Some(id) => tree.emit(id, &UiEvent::Key(key.clone())),
            None => Vec::new(),
        }
    }

    /// The selected element when it accepts text input.
    pub fn focused_input<M>(&self, tree: &Tree<M>) -> Option<ElementId> {
        self.selected(tree)
            .filter(|&id| tree.get(id).is_some_and(|e| e.is_text_input))
    }

    /// Where the focused text input sits on screen (for IME placement).
    pub fn focused_input_rect<M>(&self, tree: &Tree<M>) -> Option<Rect> {
        let id = self.focused_input(tree)?;
        let origin = tree.locate(id)?;
        Some(Rect::from_origin_size(origin, tree.layout(id)?.size()))
    }

    // =====================================================================
    // Scroll
    // =====================================================================

    /// Offer a wheel delta at `pos` (root coordinates). The deepest
    /// scrollable container under the pointer that can move takes it.
    /// Returns whether anything scrolled.
    pub fn scroll<M>(&mut self, tree: &mut Tree<M>, pos: Point, delta: ScrollDelta) -> bool {
        let (dx, dy) = delta.to_pixels(self.scroll_step);
        let root = tree.root();
        let consumed = scroll_at(tree, root, pos, dx, dy);
        tracing::trace!(x = pos.x, y = pos.y, dx, dy, consumed, "wheel");
        consumed
    }
}

#[allow(clippy::too_many_arguments)]
fn visit<M>(
    tree: &mut Tree<M>,
    id: ElementId,
    local: Point,
    over: bool,
    previous: ButtonStates,
    current: ButtonStates,
    pressed: &mut Option<ElementId>,
    out: &mut Vec<M>,
) {
    let mut events = Vec::new();
    {
        let Some(element) = tree.get_mut(id) else {
            return;
        };
        let latch = &mut element.pointer;

        if over && !latch.hovering {
            latch.hovering = true;
            events.push(UiEvent::HoverStart);
        } else if !over && latch.hovering {
            latch.hovering = false;
            events.push(UiEvent::HoverEnd);
        }

        for button in MouseButton::ALL {
            let i = button.index();
            let (was, is) = (previous[i], current[i]);

            if !was && is && over {
                latch.pressed[i] = true;
                events.push(UiEvent::ButtonDown(button));
                if element.selectable {
                    *pressed = Some(id);
                }
            }
            if !over {
                latch.pressed[i] = false;
            }
            if was && !is && over {
                events.push(UiEvent::ButtonUp(button));
                if latch.pressed[i] {
                    events.push(UiEvent::Click(button));
                }
            }
            if !is {
                latch.pressed[i] = false;
            }
        }
    }

    for event in &events {
        tree.emit_into(id, event, out);
    }

    let children = tree.children(id).to_vec();
    for child in children {
        let Some(layout) = tree.layout(child).copied() else {
            continue;
        };
        let over_child = over && layout.rect().contains(local);
        visit(tree, child, local - layout.origin(), over_child, previous, current, pressed, out);
    }
}

fn scroll_at<M>(tree: &mut Tree<M>, id: ElementId, pos: Point, dx: i32, dy: i32) -> bool {
    let Some(element) = tree.get(id) else {
        return false;
    };
    if element.get_content().is_some() {
        return false;
    }
    let layout = *element.layout();
    if !layout.rect().contains(pos) {
        return false;
    }

    let local = pos - layout.origin();
    for child in tree.children(id).to_vec() {
        if scroll_at(tree, child, local, dx, dy) {
            return true;
        }
    }

    match tree.get_mut(id) {
        Some(element) => element
            .scroll
            .scroll_by(dx, dy, layout.content_size(), layout.size()),
        None => false,
    }
}
