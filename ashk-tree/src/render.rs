//! Layout and compositing.
//!
//! Rendering is bottom-up: a container renders every child first, because
//! wrap decisions need the children's rendered sizes, then places them with
//! wrap-flow and composites the child surfaces into its own. Every surface
//! handed out during a render is released before returning except the one
//! returned to the caller.

use crate::element::LayoutCache;
use crate::error::RenderError;
use crate::length::ResolvedSize;
use crate::primitives::{Color, Point, Rect, Size};
use crate::surface::SurfaceProvider;
use crate::text_engine::TextShaper;
use crate::tree::{ElementId, Tree};

/// Thickness of the selection border.
pub const SELECTION_BORDER: i32 = 1;

/// Result of the wrap-flow pass over a container's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowLayout {
    /// Placement of each child's surface, before scroll offset.
    pub positions: Vec<Point>,
    /// Extent of all placed children including margins.
    pub content: Size,
}

/// One child as seen by the flow pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowItem {
    pub size: Size,
    pub margin_x: i32,
    pub margin_y: i32,
    pub inline: bool,
    pub breaking: bool,
}

/// Place `items` left to right, starting a new line when a non-inline item
/// would overflow `max_width` (unless the container scrolls horizontally) or
/// when the previous item forces a break.
pub fn flow(items: &[FlowItem], max_width: i32, scroll_x: bool) -> FlowLayout {
    let mut positions = Vec::with_capacity(items.len());
    let mut x = 0;
    let mut y = 0;
    let mut line_height = 0;
    let mut widest = 0;

    for (i, item) in items.iter().enumerate() {
        let mut next_x = x + item.size.width + item.margin_x;

        let overflows = !item.inline && !scroll_x && next_x > max_width && x > 0;
        let forced = i > 0 && items[i - 1].breaking;
        if overflows || forced {
            widest = widest.max(x);
            x = 0;
            next_x = item.size.width + item.margin_x;
            y += line_height;
            line_height = 0;
        }

        line_height = line_height.max(item.size.height + item.margin_y);
        positions.push(Point::new(x + item.margin_x, y + item.margin_y));
        x = next_x;
    }

    widest = widest.max(x);
    FlowLayout {
        positions,
        content: Size::new(widest, y + line_height),
    }
}

impl<M> Tree<M> {
    /// Render the whole tree. The root is placed at the origin.
    pub fn render_root<P, S>(&mut self, provider: &mut P, shaper: &mut S) -> Result<P::Surface, RenderError>
    where
        P: SurfaceProvider,
        S: TextShaper + ?Sized,
    {
        let root = self.root();
        if let Some(layout) = self.layout_mut(root) {
            layout.x = 0;
            layout.y = 0;
        }
        self.render(root, provider, shaper)
    }

    /// Render the subtree under `id` into a new surface owned by the caller.
    ///
    /// Writes the subtree's layout cache. Children are placed relative to
    /// `id`; `id`'s own placement is written by its parent.
    pub fn render<P, S>(&mut self, id: ElementId, provider: &mut P, shaper: &mut S) -> Result<P::Surface, RenderError>
    where
        P: SurfaceProvider,
        S: TextShaper + ?Sized,
    {
        let resolved = self.expanded_size(id).ok_or(RenderError::StaleElement(id))?;
        let has_content = self.get(id).is_some_and(|e| e.get_content().is_some());

        if has_content {
            self.render_content(id, resolved, provider, shaper)
        } else {
            self.render_children(id, resolved, provider, shaper)
        }
    }

    fn render_content<P, S>(
        &mut self,
        id: ElementId,
        resolved: ResolvedSize,
        provider: &mut P,
        shaper: &mut S,
    ) -> Result<P::Surface, RenderError>
    where
        P: SurfaceProvider,
        S: TextShaper + ?Sized,
    {
        let element = self.get(id).ok_or(RenderError::StaleElement(id))?;
        let content = element.get_content().ok_or(RenderError::StaleElement(id))?;
        let background = element.background;
        let selected = element.is_selected();
        let (min_width, min_height) = (element.min_width, element.min_height);

        let natural = content.render(resolved.width, provider, shaper)?;
        let natural_size = provider.size(&natural);

        let size = Size::new(
            resolved.width.unwrap_or(natural_size.width),
            resolved.height.unwrap_or(natural_size.height),
        )
        .at_least(min_width, min_height);

        let mut surface = match provider.allocate(size) {
            Ok(surface) => surface,
            Err(err) => {
                provider.release(natural);
                return Err(err.into());
            }
        };

        let painted = paint(provider, &mut surface, size, background).and_then(|()| {
            provider.blit(&natural, Rect::from_size(natural_size), &mut surface, Rect::from_size(natural_size))
        });
        provider.release(natural);
        let painted = painted.and_then(|()| outline(provider, &mut surface, size, selected));
        if let Err(err) = painted {
            provider.release(surface);
            return Err(err.into());
        }

        if let Some(layout) = self.layout_mut(id) {
            layout.width = size.width;
            layout.height = size.height;
            layout.content_width = natural_size.width;
            layout.content_height = natural_size.height;
        }
        Ok(surface)
    }

    fn render_children<P, S>(
        &mut self,
        id: ElementId,
        resolved: ResolvedSize,
        provider: &mut P,
        shaper: &mut S,
    ) -> Result<P::Surface, RenderError>
    where
        P: SurfaceProvider,
        S: TextShaper + ?Sized,
    {
        let children = self.children(id).to_vec();

        // Measure: render every child at its own size.
        let mut surfaces = Vec::with_capacity(children.len());
        for &child in &children {
            match self.render(child, provider, shaper) {
                Ok(surface) => surfaces.push(surface),
                Err(err) => {
                    release_all(provider, surfaces);
                    return Err(err);
                }
            }
        }

        let sizes: Vec<Size> = surfaces.iter().map(|s| provider.size(s)).collect();
        let mut items = Vec::with_capacity(children.len());
        for (&child, &size) in children.iter().zip(&sizes) {
            let Some(element) = self.get(child) else {
                release_all(provider, surfaces);
                return Err(RenderError::StaleElement(child));
            };
            let item = FlowItem {
                size,
                margin_x: element.margin_x.resolve_margin(resolved.width),
                margin_y: element.margin_y.resolve_margin(resolved.height),
                inline: element.inline,
                breaking: element.breaking,
            };
            if let Some(layout) = self.layout_mut(child) {
                layout.margin_x = item.margin_x;
                layout.margin_y = item.margin_y;
            }
            items.push(item);
        }

        let Some(element) = self.get(id) else {
            release_all(provider, surfaces);
            return Err(RenderError::StaleElement(id));
        };
        let background = element.background;
        let selected = element.is_selected();
        let (min_width, min_height) = (element.min_width, element.min_height);
        let mut scroll = element.scroll;

        let max_width = resolved
            .width
            .unwrap_or_else(|| items.iter().map(|i| i.size.width + 2 * i.margin_x).sum());
        let placed = flow(&items, max_width, scroll.horizontal);

        let size = Size::new(
            resolved.width.unwrap_or(placed.content.width),
            resolved.height.unwrap_or(placed.content.height),
        )
        .at_least(min_width, min_height);

        scroll.clamp_to(placed.content, size);
        let offset = scroll.offset();
        if let Some(element) = self.get_mut(id) {
            element.scroll = scroll;
        }
        for (&child, position) in children.iter().zip(&placed.positions) {
            if let Some(layout) = self.layout_mut(child) {
                layout.x = position.x - offset.x;
                layout.y = position.y - offset.y;
            }
        }

        let mut surface = match provider.allocate(size) {
            Ok(surface) => surface,
            Err(err) => {
                release_all(provider, surfaces);
                return Err(err.into());
            }
        };

        let mut result = paint(provider, &mut surface, size, background);
        for (child, position) in surfaces.into_iter().zip(&placed.positions) {
            if result.is_ok() {
                let child_size = provider.size(&child);
                let dst = Rect::from_origin_size(*position - offset, child_size);
                result = provider.blit(&child, Rect::from_size(child_size), &mut surface, dst);
            }
            provider.release(child);
        }
        let result = result.and_then(|()| outline(provider, &mut surface, size, selected));
        if let Err(err) = result {
            provider.release(surface);
            return Err(err.into());
        }

        if let Some(layout) = self.layout_mut(id) {
            *layout = LayoutCache {
                width: size.width,
                height: size.height,
                content_width: placed.content.width,
                content_height: placed.content.height,
                ..*layout
            };
        }
        tracing::trace!(?id, width = size.width, height = size.height, children = children.len(), "rendered container");
        Ok(surface)
    }
}

fn paint<P: SurfaceProvider>(
    provider: &mut P,
    surface: &mut P::Surface,
    size: Size,
    background: Color,
) -> Result<(), crate::error::SurfaceError> {
    if background.a == 0 {
        return Ok(());
    }
    provider.fill_rect(surface, background, Rect::from_size(size))
}

fn outline<P: SurfaceProvider>(
    provider: &mut P,
    surface: &mut P::Surface,
    size: Size,
    selected: bool,
) -> Result<(), crate::error::SurfaceError> {
    if !selected {
        return Ok(());
    }
    provider.draw_rect_outline(surface, Color::SELECTION, Rect::from_size(size), SELECTION_BORDER)
}

fn release_all<P: SurfaceProvider>(provider: &mut P, surfaces: Vec<P::Surface>) {
    for surface in surfaces {
        provider.release(surface);
    }
}
