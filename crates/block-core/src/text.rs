/// A text buffer with a single caret, measured in UTF-8 byte offsets that always sit on
/// a char boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
}

impl TextBuffer {
    /// A buffer with the caret at the end of `text`.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    pub fn with_cursor(text: impl Into<String>, cursor: usize) -> Self {
        let text = text.into();
        let cursor = clamp_to_char_boundary(&text, cursor);
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_at_start(&self) -> bool {
        self.cursor == 0
    }

    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = clamp_to_char_boundary(&self.text, offset);
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn move_left(&mut self) -> bool {
        let prev = previous_boundary(&self.text, self.cursor);
        let moved = prev != self.cursor;
        self.cursor = prev;
        moved
    }

    pub fn move_right(&mut self) -> bool {
        let next = next_boundary(&self.text, self.cursor);
        let moved = next != self.cursor;
        self.cursor = next;
        moved
    }

    pub fn insert(&mut self, text: &str) {
        self.text.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    /// Delete the char before the caret.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = previous_boundary(&self.text, self.cursor);
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
        true
    }

    /// Delete the char after the caret.
    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.text.len() {
            return false;
        }
        let end = next_boundary(&self.text, self.cursor);
        self.text.replace_range(self.cursor..end, "");
        true
    }

    /// Drop the first `len` bytes and pull the caret back with them.
    pub fn strip_prefix(&mut self, len: usize) {
        let len = clamp_to_char_boundary(&self.text, len);
        self.text.replace_range(..len, "");
        self.cursor = self.cursor.saturating_sub(len);
    }
}

/// The largest char boundary in `s` at or before `ix`.
pub fn clamp_to_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.min(s.len());
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

fn previous_boundary(s: &str, offset: usize) -> usize {
    s[..offset.min(s.len())]
        .char_indices()
        .next_back()
        .map(|(ix, _)| ix)
        .unwrap_or(0)
}

fn next_boundary(s: &str, offset: usize) -> usize {
    s[offset.min(s.len())..]
        .chars()
        .next()
        .map(|ch| offset + ch.len_utf8())
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_backspace_track_caret() {
        let mut buf = TextBuffer::with_cursor("ac", 1);
        buf.insert("b");
        assert_eq!(buf.text(), "abc");
        assert_eq!(buf.cursor(), 2);

        assert!(buf.backspace());
        assert_eq!(buf.text(), "ac");
        assert_eq!(buf.cursor(), 1);

        buf.move_to_start();
        assert!(!buf.backspace());
    }

    #[test]
    fn caret_moves_over_multibyte_chars() {
        let mut buf = TextBuffer::new("añb");
        assert_eq!(buf.cursor(), 4);
        assert!(buf.move_left());
        assert_eq!(buf.cursor(), 3);
        assert!(buf.move_left());
        assert_eq!(buf.cursor(), 1);
        assert!(buf.delete_forward());
        assert_eq!(buf.text(), "ab");
    }

    #[test]
    fn cursor_is_clamped_to_char_boundary() {
        let buf = TextBuffer::with_cursor("ñ", 1);
        assert_eq!(buf.cursor(), 0);
        let buf = TextBuffer::with_cursor("abc", 99);
        assert_eq!(buf.cursor(), 3);
    }

    #[test]
    fn strip_prefix_shifts_caret() {
        let mut buf = TextBuffer::new("# Hello");
        buf.strip_prefix(2);
        assert_eq!(buf.text(), "Hello");
        assert_eq!(buf.cursor(), 5);

        let mut buf = TextBuffer::with_cursor("> ", 1);
        buf.strip_prefix(2);
        assert_eq!(buf.text(), "");
        assert_eq!(buf.cursor(), 0);
    }
}
