//! The editor window: a top bar with a save button above a scrolling text
//! area. Owns the tree, the dispatcher and the editing state, and applies
//! the messages element handlers produce.

use std::path::{Path, PathBuf};

use ashk_tree::{
    Dispatcher, Element, ElementId, ImageContent, InputEvent, KeyEvent, Length, MouseButton, Pixmap,
    Rect, SurfaceProvider, TextShaper, Tree, UiEvent,
};

use crate::config::AppConfig;
use crate::editor::{EditorMessage, TextEditor};
use crate::error::EditorError;

/// Side length of the save button.
const BUTTON_SIZE: i32 = 30;
const BUTTON_MARGIN: i32 = 5;

/// Messages element handlers hand back to the app.
#[derive(Debug, Clone, PartialEq)]
pub enum AppMessage {
    Editor(EditorMessage),
    Type(String),
    Key(KeyEvent),
    Save,
}

impl From<EditorMessage> for AppMessage {
    fn from(message: EditorMessage) -> Self {
        AppMessage::Editor(message)
    }
}

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved { path: PathBuf, bytes: usize },
    SaveFailed { path: PathBuf, reason: String },
}

pub struct EditorApp {
    tree: Tree<AppMessage>,
    dispatcher: Dispatcher,
    editor: TextEditor,
    save_button: ElementId,
    text_area: ElementId,
    path: PathBuf,
    config: AppConfig,
}

impl EditorApp {
    /// Build the window with an empty document that saves to `path`.
    pub fn new(path: impl Into<PathBuf>, config: AppConfig) -> Result<Self, EditorError> {
        let (width, height) = config.window_size;
        let mut tree = Tree::new(Element::new().size(width, height));
        let root = tree.root();

        let top_bar = tree.add_child(
            root,
            Element::new()
                .size(Length::Percent(100), config.top_bar_height)
                .background(config.top_bar_color()),
        )?;

        let icon = match &config.save_icon {
            Some(path) => ImageContent::open(path)?,
            None => ImageContent::from_pixmap(save_icon(BUTTON_SIZE as u32)),
        };
        let save_button = tree.add_child(
            top_bar,
            Element::new()
                .size(BUTTON_SIZE, BUTTON_SIZE)
                .margin(BUTTON_MARGIN, BUTTON_MARGIN)
                .content(icon)
                .on_event(|_, event| {
                    matches!(event, UiEvent::Click(MouseButton::Left)).then_some(AppMessage::Save)
                }),
        )?;

        let text_area = tree.add_child(
            root,
            Element::new()
                .size(Length::Percent(100), (height - config.top_bar_height).max(0))
                .background(config.text_area_color())
                .scrollable(false, true)
                .selectable(true)
                .text_input(true)
                .on_event(|_, event| match event {
                    UiEvent::Text(text) => Some(AppMessage::Type(text.clone())),
                    UiEvent::Key(key) if key.is_press() => Some(AppMessage::Key(key.clone())),
                    _ => None,
                }),
        )?;

        let editor = TextEditor::new(&mut tree, text_area, config.style())?;
        let mut dispatcher = Dispatcher::new().with_scroll_step(config.scroll_step);
        dispatcher.select(&mut tree, text_area);

        Ok(Self {
            tree,
            dispatcher,
            editor,
            save_button,
            text_area,
            path: path.into(),
            config,
        })
    }

    /// Open `path` for editing. A file that does not exist yet starts empty.
    pub fn open(path: impl Into<PathBuf>, config: AppConfig) -> Result<Self, EditorError> {
        let path = path.into();
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(source) => return Err(EditorError::Read { path, source }),
        };

        let mut app = Self::new(path, config)?;
        if let Some(text) = text {
            app.editor.load(&mut app.tree, &text)?;
        }
        tracing::info!(path = %app.path.display(), rows = app.editor.row_count(&app.tree), "opened");
        Ok(app)
    }

    pub fn tree(&self) -> &Tree<AppMessage> {
        &self.tree
    }

    pub fn editor(&self) -> &TextEditor {
        &self.editor
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save_button(&self) -> ElementId {
        self.save_button
    }

    pub fn text_area(&self) -> ElementId {
        self.text_area
    }

    pub fn text(&self) -> String {
        self.editor.text(&self.tree)
    }

    pub fn rows(&self) -> Vec<String> {
        self.editor.rows(&self.tree)
    }

    /// Screen rect of the focused text input, for IME placement.
    pub fn text_input_rect(&self) -> Option<Rect> {
        self.dispatcher.focused_input_rect(&self.tree)
    }

    /// Feed one input event and apply whatever the handlers asked for.
    pub fn handle(&mut self, event: &InputEvent) -> Result<Vec<Notice>, EditorError> {
        if let InputEvent::Resize { width, height } = event {
            self.resize(*width, *height);
            return Ok(Vec::new());
        }

        let messages = self.dispatcher.dispatch(&mut self.tree, event);
        let mut notices = Vec::new();
        for message in messages {
            match message {
                AppMessage::Editor(message) => self.editor.apply(&mut self.tree, message)?,
                AppMessage::Type(text) => self.editor.type_text(&mut self.tree, &text)?,
                AppMessage::Key(key) => {
                    self.editor.key(&mut self.tree, &key)?;
                }
                AppMessage::Save => notices.push(self.save_notice()),
            }
        }
        Ok(notices)
    }

    /// New window size; the text area takes everything under the top bar.
    pub fn resize(&mut self, width: i32, height: i32) {
        let root = self.tree.root();
        if let Some(element) = self.tree.get_mut(root) {
            element.width = Length::Px(width);
            element.height = Length::Px(height);
        }
        let area_height = (height - self.config.top_bar_height).max(0);
        if let Some(element) = self.tree.get_mut(self.text_area) {
            element.height = Length::Px(area_height);
        }
        tracing::debug!(width, height, "resized");
    }

    /// Render one frame. The caller owns (and must release) the surface.
    pub fn render_frame<P, S>(&mut self, provider: &mut P, shaper: &mut S) -> Result<P::Surface, EditorError>
    where
        P: SurfaceProvider,
        S: TextShaper + ?Sized,
    {
        Ok(self.tree.render_root(provider, shaper)?)
    }

    /// Write the document to its path. Returns the number of bytes written.
    pub fn save(&self) -> Result<usize, EditorError> {
        let text = self.text();
        std::fs::write(&self.path, &text).map_err(|source| EditorError::Write {
            path: self.path.clone(),
            source,
        })?;
        Ok(text.len())
    }

    fn save_notice(&self) -> Notice {
        match self.save() {
            Ok(bytes) => {
                tracing::info!(path = %self.path.display(), bytes, "saved");
                Notice::Saved {
                    path: self.path.clone(),
                    bytes,
                }
            }
            Err(err) => {
                tracing::error!(path = %self.path.display(), error = %err, "save failed");
                Notice::SaveFailed {
                    path: self.path.clone(),
                    reason: err.to_string(),
                }
            }
        }
    }
}

/// Generated save icon: a gradient tile with a lighter label strip.
fn save_icon(size: u32) -> Pixmap {
    Pixmap::from_fn(size, size, |x, y| {
        let u = x as f32 / size as f32;
        let v = y as f32 / size as f32;
        let label = y < size / 3 && x > size / 5 && x < size * 4 / 5;
        if label {
            return image::Rgba([220, 220, 230, 255]);
        }
        let r = (u * 100.0 + 50.0) as u8;
        let g = (v * 80.0 + 40.0) as u8;
        let b = ((1.0 - u) * 180.0 + 75.0) as u8;
        image::Rgba([r, g, b, 255])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_follows_window() {
        let mut app = EditorApp::new("unused.txt", AppConfig::default()).unwrap();
        app.resize(640, 480);
        let area = app.tree().get(app.text_area()).unwrap();
        assert_eq!(area.height, Length::Px(440));
        assert!(area.is_selected());
    }

    #[test]
    fn save_icon_is_square_and_opaque() {
        let icon = save_icon(30);
        assert_eq!(icon.dimensions(), (30, 30));
        assert!(icon.pixels().all(|p| p.0[3] == 255));
    }
}
