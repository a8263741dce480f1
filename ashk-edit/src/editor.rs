//! Text editing on the element tree.
//!
//! The document element's children are rows; a row's children are one
//! element per character. The cursor is one more element living in the
//! current row at index `col`. Every edit detaches the cursor, rearranges
//! character elements, then puts the cursor back at `(row, col)`, so while
//! an edit runs a row's children are exactly its characters.

use ashk_tree::{
    Color, Element, ElementId, FontSpec, Key, KeyEvent, Length, MouseButton, NamedKey, TextContent,
    Tree, UiEvent,
};

use crate::error::EditorError;

/// Messages produced by row and character elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMessage {
    /// A character was pressed: put the cursor right after it.
    PlaceCursorAfter(ElementId),
    /// Empty space in a row was pressed: put the cursor at the row's end.
    PlaceCursorAtRowEnd(ElementId),
}

/// Look of the text.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorStyle {
    pub font: FontSpec,
    pub text_color: Color,
    pub cursor_color: Color,
    pub cursor_width: i32,
}

impl Default for EditorStyle {
    fn default() -> Self {
        Self {
            font: FontSpec::default(),
            text_color: Color::WHITE,
            cursor_color: Color::CYAN,
            cursor_width: 5,
        }
    }
}

impl EditorStyle {
    pub fn line_height(&self) -> i32 {
        self.font.line_height.round() as i32
    }
}

/// Cursor state over a document element.
#[derive(Debug)]
pub struct TextEditor {
    document: ElementId,
    cursor: ElementId,
    row: usize,
    col: usize,
    style: EditorStyle,
}

impl TextEditor {
    /// Take over `document`: existing children are destroyed and replaced by
    /// one empty row holding the cursor.
    pub fn new<M>(tree: &mut Tree<M>, document: ElementId, style: EditorStyle) -> Result<Self, EditorError>
    where
        M: From<EditorMessage> + 'static,
    {
        for child in tree.children(document).to_vec() {
            tree.destroy(child)?;
        }
        let cursor = tree.create(
            Element::new()
                .size(style.cursor_width, style.line_height())
                .background(style.cursor_color),
        );
        let editor = Self {
            document,
            cursor,
            row: 0,
            col: 0,
            style,
        };
        let first = tree.create(editor.new_row());
        tree.append_child(document, first)?;
        tree.append_child(first, cursor)?;
        Ok(editor)
    }

    pub fn document(&self) -> ElementId {
        self.document
    }

    pub fn cursor(&self) -> ElementId {
        self.cursor
    }

    /// `(row, column)` of the cursor.
    pub fn position(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn style(&self) -> &EditorStyle {
        &self.style
    }

    pub fn row_count<M>(&self, tree: &Tree<M>) -> usize {
        tree.children(self.document).len()
    }

    // =====================================================================
    // Element factories
    // =====================================================================

    fn new_row<M>(&self) -> Element<M>
    where
        M: From<EditorMessage> + 'static,
    {
        Element::new()
            .width(Length::Percent(100))
            .min_size(0, self.style.line_height())
            .on_event(|id, event| {
                matches!(event, UiEvent::ButtonDown(MouseButton::Left))
                    .then(|| EditorMessage::PlaceCursorAtRowEnd(id).into())
            })
    }

    fn new_char<M>(&self, c: char) -> Element<M>
    where
        M: From<EditorMessage> + 'static,
    {
        let text = TextContent::new(c.to_string(), self.style.font.clone()).color(self.style.text_color);
        Element::new().content(text).on_event(|id, event| {
            matches!(event, UiEvent::ButtonDown(MouseButton::Left))
                .then(|| EditorMessage::PlaceCursorAfter(id).into())
        })
    }

    // =====================================================================
    // Reading
    // =====================================================================

    fn row_id<M>(&self, tree: &Tree<M>, row: usize) -> Result<ElementId, EditorError> {
        let rows = tree.children(self.document);
        rows.get(row).copied().ok_or(EditorError::RowOutOfRange {
            row,
            rows: rows.len(),
        })
    }

    /// Character elements of `row`, cursor excluded.
    fn chars_of<M>(&self, tree: &Tree<M>, row: ElementId) -> Vec<ElementId> {
        tree.children(row)
            .iter()
            .copied()
            .filter(|&c| c != self.cursor)
            .collect()
    }

    fn row_len<M>(&self, tree: &Tree<M>, row: usize) -> Result<usize, EditorError> {
        let id = self.row_id(tree, row)?;
        Ok(self.chars_of(tree, id).len())
    }

    /// Text of every row.
    pub fn rows<M>(&self, tree: &Tree<M>) -> Vec<String> {
        tree.children(self.document)
            .iter()
            .map(|&row| {
                self.chars_of(tree, row)
                    .into_iter()
                    .filter_map(|c| tree.content(c).and_then(|content| content.as_text()))
                    .collect()
            })
            .collect()
    }

    /// The document as a string, rows joined by `\n`.
    pub fn text<M>(&self, tree: &Tree<M>) -> String {
        self.rows(tree).join("\n")
    }

    // =====================================================================
    // Editing
    // =====================================================================

    /// Run `edit` with the cursor out of the tree, then put it back at
    /// `(row, col)`.
    fn with_cursor_detached<M, T>(
        &mut self,
        tree: &mut Tree<M>,
        edit: impl FnOnce(&mut Self, &mut Tree<M>) -> Result<T, EditorError>,
    ) -> Result<T, EditorError> {
        tree.remove(self.cursor)?;
        let result = edit(self, tree);
        let row = self.row_id(tree, self.row)?;
        tree.insert_child(row, self.cursor, self.col)?;
        result
    }

    /// Replace the whole document. `\r` and other control characters except
    /// tab are dropped; the cursor goes to the start.
    pub fn load<M>(&mut self, tree: &mut Tree<M>, text: &str) -> Result<(), EditorError>
    where
        M: From<EditorMessage> + 'static,
    {
        tree.remove(self.cursor)?;
        for row in tree.children(self.document).to_vec() {
            tree.destroy(row)?;
        }

        for line in text.split('\n') {
            let row = tree.add_child(self.document, self.new_row())?;
            for c in line.chars().filter(|&c| is_document_char(c)) {
                let element = self.new_char(c);
                tree.add_child(row, element)?;
            }
        }

        self.row = 0;
        self.col = 0;
        let first = self.row_id(tree, 0)?;
        tree.insert_child(first, self.cursor, 0)?;
        tracing::debug!(rows = self.row_count(tree), "loaded document");
        Ok(())
    }

    /// Type a string: `\n` splits the row, tabs and printable characters
    /// are inserted, `\r` and the remaining control characters are dropped.
    pub fn type_text<M>(&mut self, tree: &mut Tree<M>, text: &str) -> Result<(), EditorError>
    where
        M: From<EditorMessage> + 'static,
    {
        for c in text.chars() {
            match c {
                '\n' => self.newline(tree)?,
                c if is_document_char(c) => self.insert_char(tree, c)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Insert one character at the cursor.
    pub fn insert_char<M>(&mut self, tree: &mut Tree<M>, c: char) -> Result<(), EditorError>
    where
        M: From<EditorMessage> + 'static,
    {
        self.with_cursor_detached(tree, |editor, tree| {
            let row = editor.row_id(tree, editor.row)?;
            let id = tree.create(editor.new_char(c));
            if let Err(err) = tree.insert_child(row, id, editor.col) {
                tree.destroy(id)?;
                return Err(err.into());
            }
            editor.col += 1;
            Ok(())
        })
    }

    /// Split the row at the cursor; the tail moves to a new row below.
    pub fn newline<M>(&mut self, tree: &mut Tree<M>) -> Result<(), EditorError>
    where
        M: From<EditorMessage> + 'static,
    {
        self.with_cursor_detached(tree, |editor, tree| {
            let current = editor.row_id(tree, editor.row)?;
            let fresh = tree.create(editor.new_row());
            if let Err(err) = tree.insert_child(editor.document, fresh, editor.row + 1) {
                tree.destroy(fresh)?;
                return Err(err.into());
            }
            for c in editor.chars_of(tree, current).into_iter().skip(editor.col) {
                tree.append_child(fresh, c)?;
            }
            editor.row += 1;
            editor.col = 0;
            Ok(())
        })
    }

    /// Delete before the cursor, joining with the previous row at column 0.
    pub fn backspace<M>(&mut self, tree: &mut Tree<M>) -> Result<(), EditorError> {
        self.with_cursor_detached(tree, |editor, tree| {
            let current = editor.row_id(tree, editor.row)?;
            if editor.col > 0 {
                let chars = editor.chars_of(tree, current);
                if let Some(&gone) = chars.get(editor.col - 1) {
                    tree.destroy(gone)?;
                }
                editor.col -= 1;
            } else if editor.row > 0 {
                let previous = editor.row_id(tree, editor.row - 1)?;
                let joined_at = editor.chars_of(tree, previous).len();
                for c in editor.chars_of(tree, current) {
                    tree.append_child(previous, c)?;
                }
                tree.destroy(current)?;
                editor.row -= 1;
                editor.col = joined_at;
            }
            Ok(())
        })
    }

    /// Delete after the cursor, pulling the next row up at the row's end.
    pub fn delete<M>(&mut self, tree: &mut Tree<M>) -> Result<(), EditorError> {
        self.with_cursor_detached(tree, |editor, tree| {
            let current = editor.row_id(tree, editor.row)?;
            let chars = editor.chars_of(tree, current);
            if let Some(&gone) = chars.get(editor.col) {
                tree.destroy(gone)?;
            } else if editor.row + 1 < editor.row_count(tree) {
                let next = editor.row_id(tree, editor.row + 1)?;
                for c in editor.chars_of(tree, next) {
                    tree.append_child(current, c)?;
                }
                tree.destroy(next)?;
            }
            Ok(())
        })
    }

    pub fn move_left<M>(&mut self, tree: &mut Tree<M>) -> Result<(), EditorError> {
        self.with_cursor_detached(tree, |editor, tree| {
            if editor.col > 0 {
                editor.col -= 1;
            } else if editor.row > 0 {
                editor.row -= 1;
                editor.col = editor.row_len(tree, editor.row)?;
            }
            Ok(())
        })
    }

    pub fn move_right<M>(&mut self, tree: &mut Tree<M>) -> Result<(), EditorError> {
        self.with_cursor_detached(tree, |editor, tree| {
            if editor.col < editor.row_len(tree, editor.row)? {
                editor.col += 1;
            } else if editor.row + 1 < editor.row_count(tree) {
                editor.row += 1;
                editor.col = 0;
            }
            Ok(())
        })
    }

    pub fn move_up<M>(&mut self, tree: &mut Tree<M>) -> Result<(), EditorError> {
        self.with_cursor_detached(tree, |editor, tree| {
            if editor.row > 0 {
                editor.row -= 1;
                editor.col = editor.col.min(editor.row_len(tree, editor.row)?);
            }
            Ok(())
        })
    }

    pub fn move_down<M>(&mut self, tree: &mut Tree<M>) -> Result<(), EditorError> {
        self.with_cursor_detached(tree, |editor, tree| {
            if editor.row + 1 < editor.row_count(tree) {
                editor.row += 1;
                editor.col = editor.col.min(editor.row_len(tree, editor.row)?);
            }
            Ok(())
        })
    }

    pub fn move_home<M>(&mut self, tree: &mut Tree<M>) -> Result<(), EditorError> {
        self.with_cursor_detached(tree, |editor, _| {
            editor.col = 0;
            Ok(())
        })
    }

    pub fn move_end<M>(&mut self, tree: &mut Tree<M>) -> Result<(), EditorError> {
        self.with_cursor_detached(tree, |editor, tree| {
            editor.col = editor.row_len(tree, editor.row)?;
            Ok(())
        })
    }

    /// Apply a key press. Returns whether the key did anything.
    pub fn key<M>(&mut self, tree: &mut Tree<M>, event: &KeyEvent) -> Result<bool, EditorError>
    where
        M: From<EditorMessage> + 'static,
    {
        let KeyEvent::Pressed { key: Key::Named(named), .. } = event else {
            return Ok(false);
        };
        match named {
            NamedKey::Enter => self.newline(tree)?,
            NamedKey::Backspace => self.backspace(tree)?,
            NamedKey::Delete => self.delete(tree)?,
            NamedKey::ArrowLeft => self.move_left(tree)?,
            NamedKey::ArrowRight => self.move_right(tree)?,
            NamedKey::ArrowUp => self.move_up(tree)?,
            NamedKey::ArrowDown => self.move_down(tree)?,
            NamedKey::Home => self.move_home(tree)?,
            NamedKey::End => self.move_end(tree)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    // =====================================================================
    // Pointer placement
    // =====================================================================

    /// Apply a message from a row or character element. Messages about
    /// elements that are gone are ignored.
    pub fn apply<M>(&mut self, tree: &mut Tree<M>, message: EditorMessage) -> Result<(), EditorError> {
        let target = match message {
            EditorMessage::PlaceCursorAfter(c) => {
                let Some(row) = tree.parent(c) else {
                    return Ok(());
                };
                let position = self.chars_of(tree, row).iter().position(|&x| x == c);
                self.row_index(tree, row).zip(position.map(|p| p + 1))
            }
            EditorMessage::PlaceCursorAtRowEnd(row) => self
                .row_index(tree, row)
                .map(|index| (index, self.chars_of(tree, row).len())),
        };
        let Some((row, col)) = target else {
            tracing::debug!(?message, "cursor placement target is gone");
            return Ok(());
        };

        self.with_cursor_detached(tree, |editor, _| {
            editor.row = row;
            editor.col = col;
            Ok(())
        })
    }

    fn row_index<M>(&self, tree: &Tree<M>, row: ElementId) -> Option<usize> {
        if tree.parent(row) != Some(self.document) {
            return None;
        }
        tree.index_in_parent(row)
    }
}

/// Characters the document keeps: printable ones and tab.
fn is_document_char(c: char) -> bool {
    c == '\t' || !c.is_control()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Msg(EditorMessage);

    impl From<EditorMessage> for Msg {
        fn from(message: EditorMessage) -> Self {
            Msg(message)
        }
    }

    fn setup(text: &str) -> (Tree<Msg>, TextEditor) {
        let mut tree = Tree::new(Element::new().size(800, 600));
        let root = tree.root();
        let document = tree.add_child(root, Element::new().width(Length::Percent(100))).unwrap();
        let mut editor = TextEditor::new(&mut tree, document, EditorStyle::default()).unwrap();
        editor.load(&mut tree, text).unwrap();
        (tree, editor)
    }

    /// The cursor is in exactly one row, at the column the editor reports.
    fn assert_cursor_consistent(tree: &Tree<Msg>, editor: &TextEditor) {
        let (row, col) = editor.position();
        let rows = tree.children(editor.document());
        let holders: Vec<_> = rows
            .iter()
            .filter(|&&r| tree.children(r).contains(&editor.cursor()))
            .collect();
        assert_eq!(holders, vec![&rows[row]]);
        assert_eq!(tree.index_in_parent(editor.cursor()), Some(col));
    }

    // =========================================================================
    // Typing
    // =========================================================================

    #[test]
    fn typing_inserts_at_cursor() {
        let (mut tree, mut editor) = setup("");
        editor.type_text(&mut tree, "ab").unwrap();
        editor.move_left(&mut tree).unwrap();
        editor.type_text(&mut tree, "X").unwrap();

        assert_eq!(editor.rows(&tree), vec!["aXb"]);
        assert_eq!(editor.position(), (0, 2));
        assert_cursor_consistent(&tree, &editor);
    }

    #[test]
    fn newline_splits_row() {
        let (mut tree, mut editor) = setup("");
        editor.type_text(&mut tree, "ab\nc").unwrap();
        assert_eq!(editor.rows(&tree), vec!["ab", "c"]);
        assert_eq!(editor.position(), (1, 1));

        editor.move_up(&mut tree).unwrap();
        editor.newline(&mut tree).unwrap();
        assert_eq!(editor.rows(&tree), vec!["a", "b", "c"]);
        assert_eq!(editor.position(), (1, 0));
        assert_cursor_consistent(&tree, &editor);
    }

    #[test]
    fn control_characters_are_dropped() {
        let (mut tree, mut editor) = setup("");
        editor.type_text(&mut tree, "a\r\n\tb\u{7}").unwrap();
        assert_eq!(editor.rows(&tree), vec!["a", "\tb"]);
    }

    #[test]
    fn tabs_survive_load() {
        let (tree, editor) = setup("a\tb\r\n\u{1b}c");
        assert_eq!(editor.rows(&tree), vec!["a\tb", "c"]);
    }

    // =========================================================================
    // Deleting
    // =========================================================================

    #[test]
    fn backspace_at_row_start_joins_rows() {
        let (mut tree, mut editor) = setup("ab\nc");
        editor.move_down(&mut tree).unwrap();
        assert_eq!(editor.position(), (1, 0));

        editor.backspace(&mut tree).unwrap();
        assert_eq!(editor.rows(&tree), vec!["abc"]);
        assert_eq!(editor.position(), (0, 2));
        assert_cursor_consistent(&tree, &editor);
    }

    #[test]
    fn backspace_mid_row_removes_previous_char() {
        let (mut tree, mut editor) = setup("abc");
        editor.move_end(&mut tree).unwrap();
        editor.backspace(&mut tree).unwrap();
        assert_eq!(editor.rows(&tree), vec!["ab"]);
        assert_eq!(editor.position(), (0, 2));
    }

    #[test]
    fn backspace_at_document_start_does_nothing() {
        let (mut tree, mut editor) = setup("ab");
        editor.backspace(&mut tree).unwrap();
        assert_eq!(editor.rows(&tree), vec!["ab"]);
        assert_eq!(editor.position(), (0, 0));
    }

    #[test]
    fn delete_mid_row_removes_next_char() {
        let (mut tree, mut editor) = setup("abc");
        editor.move_right(&mut tree).unwrap();
        editor.delete(&mut tree).unwrap();
        assert_eq!(editor.rows(&tree), vec!["ac"]);
        assert_eq!(editor.position(), (0, 1));
    }

    #[test]
    fn delete_at_row_end_pulls_next_row_up() {
        let (mut tree, mut editor) = setup("ab\ncd\ne");
        editor.move_end(&mut tree).unwrap();
        editor.delete(&mut tree).unwrap();
        assert_eq!(editor.rows(&tree), vec!["abcd", "e"]);
        assert_eq!(editor.position(), (0, 2));
        assert_cursor_consistent(&tree, &editor);
    }

    #[test]
    fn delete_at_document_end_does_nothing() {
        let (mut tree, mut editor) = setup("ab");
        editor.move_end(&mut tree).unwrap();
        editor.delete(&mut tree).unwrap();
        assert_eq!(editor.rows(&tree), vec!["ab"]);
    }

    #[test]
    fn failed_inserts_leave_no_orphans() {
        let (mut tree, mut editor) = setup("abc");
        tree.destroy(editor.cursor()).unwrap();
        let before = tree.len();

        assert!(editor.insert_char(&mut tree, 'x').is_err());
        assert!(editor.newline(&mut tree).is_err());
        assert_eq!(tree.len(), before);

        // a row index past the end fails after the cursor is detached
        let (mut tree, mut editor) = setup("abc");
        let before = tree.len();
        editor.row = 5;
        assert!(editor.insert_char(&mut tree, 'x').is_err());
        assert!(editor.newline(&mut tree).is_err());
        assert_eq!(tree.len(), before);
    }

    #[test]
    fn removed_characters_leave_the_arena() {
        let (mut tree, mut editor) = setup("abc");
        let before = tree.len();
        editor.move_end(&mut tree).unwrap();
        editor.backspace(&mut tree).unwrap();
        assert_eq!(tree.len(), before - 1);
    }

    // =========================================================================
    // Movement
    // =========================================================================

    #[test]
    fn horizontal_moves_wrap_across_rows() {
        let (mut tree, mut editor) = setup("ab\ncd");
        editor.move_end(&mut tree).unwrap();
        editor.move_right(&mut tree).unwrap();
        assert_eq!(editor.position(), (1, 0));
        editor.move_left(&mut tree).unwrap();
        assert_eq!(editor.position(), (0, 2));
        assert_cursor_consistent(&tree, &editor);
    }

    #[test]
    fn vertical_moves_clamp_column() {
        let (mut tree, mut editor) = setup("abcdef\nx\nabcd");
        editor.move_end(&mut tree).unwrap();
        editor.move_down(&mut tree).unwrap();
        assert_eq!(editor.position(), (1, 1));
        editor.move_down(&mut tree).unwrap();
        assert_eq!(editor.position(), (2, 1));
        editor.move_down(&mut tree).unwrap();
        assert_eq!(editor.position(), (2, 1));
    }

    #[test]
    fn key_events_map_to_operations() {
        let (mut tree, mut editor) = setup("ab");
        assert!(editor.key(&mut tree, &KeyEvent::press(NamedKey::End)).unwrap());
        assert!(editor.key(&mut tree, &KeyEvent::press(NamedKey::Enter)).unwrap());
        assert!(!editor.key(&mut tree, &KeyEvent::press(NamedKey::Escape)).unwrap());
        assert_eq!(editor.rows(&tree), vec!["ab", ""]);
    }

    // =========================================================================
    // Pointer placement
    // =========================================================================

    #[test]
    fn place_after_character_and_at_row_end() {
        let (mut tree, mut editor) = setup("abc\nde");
        let rows = tree.children(editor.document()).to_vec();
        let b = tree.children(rows[0])[2];

        editor.apply(&mut tree, EditorMessage::PlaceCursorAfter(b)).unwrap();
        assert_eq!(editor.position(), (0, 2));

        editor.apply(&mut tree, EditorMessage::PlaceCursorAtRowEnd(rows[1])).unwrap();
        assert_eq!(editor.position(), (1, 2));
        assert_cursor_consistent(&tree, &editor);
    }

    #[test]
    fn stale_placement_is_ignored() {
        let (mut tree, mut editor) = setup("abc");
        let row = tree.children(editor.document())[0];
        let c = tree.children(row)[3];
        editor.move_end(&mut tree).unwrap();
        editor.backspace(&mut tree).unwrap();

        editor.apply(&mut tree, EditorMessage::PlaceCursorAfter(c)).unwrap();
        assert_eq!(editor.position(), (0, 2));
    }

    #[test]
    fn row_and_char_elements_emit_placement() {
        let (mut tree, editor) = setup("a");
        let row = tree.children(editor.document())[0];
        let a = tree.children(row)[1];
        let down = UiEvent::ButtonDown(MouseButton::Left);

        assert_eq!(tree.emit(row, &down), vec![Msg(EditorMessage::PlaceCursorAtRowEnd(row))]);
        assert_eq!(tree.emit(a, &down), vec![Msg(EditorMessage::PlaceCursorAfter(a))]);
        assert!(tree.emit(a, &UiEvent::HoverStart).is_empty());
    }
}
