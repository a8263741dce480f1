//! Leaf payloads hosted by childless elements.

use std::path::Path;

use crate::error::RenderError;
use crate::primitives::{Color, Size};
use crate::surface::{Pixmap, SurfaceProvider};
use crate::text_engine::{FontSpec, TextShaper};

/// A run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextContent {
    pub text: String,
    pub font: FontSpec,
    pub color: Color,
    /// Wrap to the hosting element's resolved width, when it has one.
    pub wrap: bool,
}

impl TextContent {
    pub fn new(text: impl Into<String>, font: FontSpec) -> Self {
        Self {
            text: text.into(),
            font,
            color: Color::WHITE,
            wrap: false,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }
}

/// A decoded image.
#[derive(Debug, Clone)]
pub struct ImageContent {
    pixels: Pixmap,
}

impl ImageContent {
    /// Decode an image file (any format the `image` crate understands).
    pub fn open(path: impl AsRef<Path>) -> Result<Self, image::ImageError> {
        let pixels = image::open(path.as_ref())?.to_rgba8();
        Ok(Self { pixels })
    }

    /// Wrap already-decoded RGBA pixels.
    pub fn from_pixmap(pixels: Pixmap) -> Self {
        Self { pixels }
    }

    pub fn size(&self) -> Size {
        Size::new(self.pixels.width() as i32, self.pixels.height() as i32)
    }
}

/// Renderable leaf payload.
#[derive(Debug, Clone)]
pub enum Content {
    Text(TextContent),
    Image(ImageContent),
}

impl Content {
    /// Render at natural size into a fresh surface owned by the caller.
    ///
    /// `container_width` is the hosting element's resolved width; wrapped
    /// text breaks at it.
    pub fn render<P, S>(
        &self,
        container_width: Option<i32>,
        provider: &mut P,
        shaper: &mut S,
    ) -> Result<P::Surface, RenderError>
    where
        P: SurfaceProvider,
        S: TextShaper + ?Sized,
    {
        match self {
            Content::Text(text) => {
                let wrap_width = container_width.filter(|w| text.wrap && *w >= 0);
                let pixels = shaper.shape(&text.text, &text.font, text.color, wrap_width)?;
                Ok(provider.upload(&pixels)?)
            }
            Content::Image(image) => Ok(provider.upload(&image.pixels)?),
        }
    }

    /// Drop owned resources (decoded pixels, text buffers).
    pub fn release(self) {
        if let Content::Image(image) = &self {
            let size = image.size();
            tracing::trace!(width = size.width, height = size.height, "released image content");
        }
    }

    /// The text of a text run, if this is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(&text.text),
            Content::Image(_) => None,
        }
    }
}

impl From<TextContent> for Content {
    fn from(text: TextContent) -> Self {
        Content::Text(text)
    }
}

impl From<ImageContent> for Content {
    fn from(image: ImageContent) -> Self {
        Content::Image(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SoftwareSurfaces;
    use crate::text_engine::FixedCellShaper;

    #[test]
    fn text_renders_unwrapped_without_flag() {
        let mut surfaces = SoftwareSurfaces::new();
        let mut shaper = FixedCellShaper::with_cell_width(10);
        let content = Content::from(TextContent::new("abcd", FontSpec::default()));

        let surface = content.render(Some(15), &mut surfaces, &mut shaper).unwrap();
        assert_eq!(surfaces.size(&surface), Size::new(40, 40));
        surfaces.release(surface);
    }

    #[test]
    fn wrapped_text_breaks_at_container_width() {
        let mut surfaces = SoftwareSurfaces::new();
        let mut shaper = FixedCellShaper::with_cell_width(10);
        let content = Content::from(TextContent::new("abcd", FontSpec::default()).wrap(true));

        let surface = content.render(Some(20), &mut surfaces, &mut shaper).unwrap();
        assert_eq!(surfaces.size(&surface), Size::new(20, 80));
        surfaces.release(surface);

        // unconstrained container: single run
        let surface = content.render(None, &mut surfaces, &mut shaper).unwrap();
        assert_eq!(surfaces.size(&surface), Size::new(40, 40));
        surfaces.release(surface);
    }

    #[test]
    fn image_renders_its_pixels() {
        let mut surfaces = SoftwareSurfaces::new();
        let mut shaper = FixedCellShaper::new();
        let content = Content::from(ImageContent::from_pixmap(Pixmap::new(7, 3)));

        let surface = content.render(None, &mut surfaces, &mut shaper).unwrap();
        assert_eq!(surfaces.size(&surface), Size::new(7, 3));
        surfaces.release(surface);
        assert_eq!(surfaces.live(), 0);
    }

    #[test]
    fn missing_image_file_is_an_error() {
        assert!(ImageContent::open("/nonexistent/definitely/not/here.png").is_err());
    }

    #[test]
    fn as_text() {
        let text = Content::from(TextContent::new("q", FontSpec::default()));
        assert_eq!(text.as_text(), Some("q"));
        let image = Content::from(ImageContent::from_pixmap(Pixmap::new(1, 1)));
        assert_eq!(image.as_text(), None);
    }
}
