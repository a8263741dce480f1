//! Surface capability and the in-memory software implementation.
//!
//! The render pipeline never owns pixels directly. It asks a
//! [`SurfaceProvider`] for surfaces, composites through it, and hands every
//! surface back through [`SurfaceProvider::release`]. `release` consumes the
//! surface, so a surface can be released at most once; the provider's
//! counters catch the "never released" direction.

use image::{Rgba, RgbaImage};

use crate::error::SurfaceError;
use crate::primitives::{Color, Point, Rect, Size};

/// CPU-side RGBA8 pixels, as produced by text shaping and image decoding.
pub type Pixmap = RgbaImage;

/// Allocates, composites and releases pixel surfaces.
pub trait SurfaceProvider {
    type Surface;

    /// Allocate a blank surface of the given size.
    fn allocate(&mut self, size: Size) -> Result<Self::Surface, SurfaceError>;

    /// Allocate a surface initialised from CPU pixels.
    fn upload(&mut self, pixels: &Pixmap) -> Result<Self::Surface, SurfaceError>;

    /// Give a surface back. Every allocated surface must come through here once.
    fn release(&mut self, surface: Self::Surface);

    fn size(&self, surface: &Self::Surface) -> Size;

    /// Copy `src_rect` of `src` onto `dst` at `dst_rect`'s origin, clipped to
    /// both `dst_rect` and the destination bounds. No scaling.
    fn blit(
        &mut self,
        src: &Self::Surface,
        src_rect: Rect,
        dst: &mut Self::Surface,
        dst_rect: Rect,
    ) -> Result<(), SurfaceError>;

    /// Overwrite `rect` (clipped to the surface) with `color`.
    fn fill_rect(
        &mut self,
        dst: &mut Self::Surface,
        color: Color,
        rect: Rect,
    ) -> Result<(), SurfaceError>;

    /// Stroke the inside edge of `rect`, `thickness` pixels deep.
    fn draw_rect_outline(
        &mut self,
        dst: &mut Self::Surface,
        color: Color,
        rect: Rect,
        thickness: i32,
    ) -> Result<(), SurfaceError> {
        for step in 0..thickness {
            let r = rect.inset(step);
            if r.width <= 0 || r.height <= 0 {
                break;
            }
            self.fill_rect(dst, color, Rect::new(r.x, r.y, r.width, 1))?;
            self.fill_rect(dst, color, Rect::new(r.x, r.bottom() - 1, r.width, 1))?;
            self.fill_rect(dst, color, Rect::new(r.x, r.y, 1, r.height))?;
            self.fill_rect(dst, color, Rect::new(r.right() - 1, r.y, 1, r.height))?;
        }
        Ok(())
    }
}

// =========================================================================
// Software surfaces
// =========================================================================

/// A surface owned by [`SoftwareSurfaces`].
#[derive(Debug)]
pub struct SoftSurface {
    id: u64,
    pixels: RgbaImage,
}

impl SoftSurface {
    /// Provider-unique identifier of this surface.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Read one pixel; `None` outside the surface.
    pub fn pixel(&self, point: Point) -> Option<Color> {
        if point.x < 0 || point.y < 0 {
            return None;
        }
        let (x, y) = (point.x as u32, point.y as u32);
        if x >= self.pixels.width() || y >= self.pixels.height() {
            return None;
        }
        let Rgba([r, g, b, a]) = *self.pixels.get_pixel(x, y);
        Some(Color::rgba(r, g, b, a))
    }
}

/// In-memory RGBA8 surface provider with allocation accounting.
#[derive(Debug, Default)]
pub struct SoftwareSurfaces {
    next_id: u64,
    allocations: usize,
    releases: usize,
    limit: Option<usize>,
}

impl SoftwareSurfaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail allocations once `limit` surfaces are alive at the same time.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Total surfaces handed out (allocate + upload).
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    /// Total surfaces given back.
    pub fn releases(&self) -> usize {
        self.releases
    }

    /// Surfaces currently alive.
    pub fn live(&self) -> usize {
        self.allocations - self.releases
    }

    /// Release a surface and keep its pixels (e.g. to write a snapshot).
    pub fn into_image(&mut self, surface: SoftSurface) -> RgbaImage {
        self.releases += 1;
        surface.pixels
    }

    fn admit(&mut self, size: Size) -> Result<u64, SurfaceError> {
        if size.width < 0 || size.height < 0 {
            return Err(SurfaceError::InvalidSize {
                width: size.width,
                height: size.height,
            });
        }
        if let Some(limit) = self.limit {
            if self.live() >= limit {
                return Err(SurfaceError::Exhausted {
                    live: self.live(),
                    limit,
                });
            }
        }
        self.allocations += 1;
        self.next_id += 1;
        Ok(self.next_id)
    }
}

impl SurfaceProvider for SoftwareSurfaces {
    type Surface = SoftSurface;

    fn allocate(&mut self, size: Size) -> Result<SoftSurface, SurfaceError> {
        let id = self.admit(size)?;
        Ok(SoftSurface {
            id,
            pixels: RgbaImage::new(size.width as u32, size.height as u32),
        })
    }

    fn upload(&mut self, pixels: &Pixmap) -> Result<SoftSurface, SurfaceError> {
        let size = Size::new(pixels.width() as i32, pixels.height() as i32);
        let id = self.admit(size)?;
        Ok(SoftSurface {
            id,
            pixels: pixels.clone(),
        })
    }

    fn release(&mut self, surface: SoftSurface) {
        self.releases += 1;
        drop(surface);
    }

    fn size(&self, surface: &SoftSurface) -> Size {
        Size::new(surface.pixels.width() as i32, surface.pixels.height() as i32)
    }

    fn blit(
        &mut self,
        src: &SoftSurface,
        src_rect: Rect,
        dst: &mut SoftSurface,
        dst_rect: Rect,
    ) -> Result<(), SurfaceError> {
        let src_bounds = Rect::from_size(self.size(src));
        let Some(src_rect) = src_rect.intersection(&src_bounds) else {
            return Ok(());
        };
        let placed = Rect::new(
            dst_rect.x,
            dst_rect.y,
            src_rect.width.min(dst_rect.width),
            src_rect.height.min(dst_rect.height),
        );
        let dst_bounds = Rect::from_size(self.size(dst));
        let Some(visible) = placed.intersection(&dst_bounds) else {
            return Ok(());
        };

        for y in visible.y..visible.bottom() {
            for x in visible.x..visible.right() {
                let sx = (src_rect.x + x - placed.x) as u32;
                let sy = (src_rect.y + y - placed.y) as u32;
                let over = *src.pixels.get_pixel(sx, sy);
                let under = dst.pixels.get_pixel_mut(x as u32, y as u32);
                *under = blend_over(over, *under);
            }
        }
        Ok(())
    }

    fn fill_rect(
        &mut self,
        dst: &mut SoftSurface,
        color: Color,
        rect: Rect,
    ) -> Result<(), SurfaceError> {
        let bounds = Rect::from_size(self.size(dst));
        let Some(visible) = rect.intersection(&bounds) else {
            return Ok(());
        };
        let fill = Rgba(color.to_array());
        for y in visible.y..visible.bottom() {
            for x in visible.x..visible.right() {
                dst.pixels.put_pixel(x as u32, y as u32, fill);
            }
        }
        Ok(())
    }
}

/// Source-over compositing of straight-alpha RGBA8 pixels.
fn blend_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as u32;
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let da = dst[3] as u32;
    // out_a = sa + da * (1 - sa), all scaled by 255
    let out_a = sa * 255 + da * (255 - sa);
    if out_a == 0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |s: u8, d: u8| -> u8 {
        let v = (s as u32 * sa * 255 + d as u32 * da * (255 - sa)) / out_a;
        v.min(255) as u8
    };
    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a / 255).min(255) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_and_release_are_counted() {
        let mut surfaces = SoftwareSurfaces::new();
        let a = surfaces.allocate(Size::new(4, 4)).unwrap();
        let b = surfaces.upload(&Pixmap::new(2, 2)).unwrap();
        assert_eq!(surfaces.allocations(), 2);
        assert_eq!(surfaces.live(), 2);

        surfaces.release(a);
        surfaces.release(b);
        assert_eq!(surfaces.releases(), 2);
        assert_eq!(surfaces.live(), 0);
    }

    #[test]
    fn negative_size_is_rejected() {
        let mut surfaces = SoftwareSurfaces::new();
        let err = surfaces.allocate(Size::new(-1, 4)).unwrap_err();
        assert!(matches!(err, SurfaceError::InvalidSize { width: -1, height: 4 }));
        assert_eq!(surfaces.allocations(), 0);
    }

    #[test]
    fn limit_is_enforced_on_live_surfaces() {
        let mut surfaces = SoftwareSurfaces::with_limit(1);
        let a = surfaces.allocate(Size::new(1, 1)).unwrap();
        assert!(matches!(
            surfaces.allocate(Size::new(1, 1)),
            Err(SurfaceError::Exhausted { live: 1, limit: 1 })
        ));
        surfaces.release(a);
        let b = surfaces.allocate(Size::new(1, 1)).unwrap();
        surfaces.release(b);
    }

    #[test]
    fn fill_and_blit_clip_to_destination() {
        let mut surfaces = SoftwareSurfaces::new();
        let mut src = surfaces.allocate(Size::new(4, 4)).unwrap();
        surfaces
            .fill_rect(&mut src, Color::WHITE, Rect::new(0, 0, 4, 4))
            .unwrap();

        let mut dst = surfaces.allocate(Size::new(6, 6)).unwrap();
        surfaces
            .fill_rect(&mut dst, Color::BLACK, Rect::new(0, 0, 6, 6))
            .unwrap();
        surfaces
            .blit(&src, Rect::new(0, 0, 4, 4), &mut dst, Rect::new(4, 4, 4, 4))
            .unwrap();

        assert_eq!(dst.pixel(Point::new(5, 5)), Some(Color::WHITE));
        assert_eq!(dst.pixel(Point::new(3, 3)), Some(Color::BLACK));
        assert_eq!(dst.pixel(Point::new(6, 6)), None);

        surfaces.release(src);
        surfaces.release(dst);
    }

    #[test]
    fn blit_blends_translucent_source() {
        let mut surfaces = SoftwareSurfaces::new();
        let src = surfaces.upload(&Pixmap::new(2, 2)).unwrap();
        let mut dst = surfaces.allocate(Size::new(2, 2)).unwrap();
        surfaces
            .fill_rect(&mut dst, Color::rgb(10, 20, 30), Rect::new(0, 0, 2, 2))
            .unwrap();
        surfaces
            .blit(&src, Rect::new(0, 0, 2, 2), &mut dst, Rect::new(0, 0, 2, 2))
            .unwrap();
        // fully transparent source leaves the destination untouched
        assert_eq!(dst.pixel(Point::new(1, 1)), Some(Color::rgb(10, 20, 30)));
        surfaces.release(src);
        surfaces.release(dst);
    }

    #[test]
    fn outline_draws_only_the_edge() {
        let mut surfaces = SoftwareSurfaces::new();
        let mut dst = surfaces.allocate(Size::new(5, 5)).unwrap();
        surfaces
            .draw_rect_outline(&mut dst, Color::CYAN, Rect::new(0, 0, 5, 5), 1)
            .unwrap();
        assert_eq!(dst.pixel(Point::new(0, 2)), Some(Color::CYAN));
        assert_eq!(dst.pixel(Point::new(4, 4)), Some(Color::CYAN));
        assert_eq!(dst.pixel(Point::new(2, 2)), Some(Color::TRANSPARENT));
        surfaces.release(dst);
    }
}
