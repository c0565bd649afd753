use unicode_segmentation::UnicodeSegmentation;

use super::CommandDialog;

// Cursor positions are grapheme indices into the single-line input.
impl CommandDialog {
    pub fn insert_text(&mut self, s: &str) {
        if !self.input_visible {
            return;
        }
        // The command line is one line; pasted newlines become spaces.
        let s = s.replace(['\r', '\n'], " ");
        let parts: Vec<&str> = self.input.graphemes(true).collect();
        let idx = self.input_cursor.min(parts.len());
        let mut line = parts[..idx].concat();
        line.push_str(&s);
        line.push_str(&parts[idx..].concat());
        self.input = line;
        self.input_cursor = idx + s.graphemes(true).count();
    }

    /// Backspace. On an empty line this closes the dialog, as Vim does.
    pub fn delete_left_grapheme(&mut self) {
        if !self.input_visible {
            return;
        }
        if self.input.is_empty() {
            self.on_cancel();
            return;
        }
        if self.input_cursor == 0 {
            return;
        }
        let mut parts: Vec<&str> = self.input.graphemes(true).collect();
        let idx = self.input_cursor.min(parts.len());
        parts.remove(idx - 1);
        self.input = parts.concat();
        self.input_cursor = idx - 1;
    }

    pub fn delete_right_grapheme(&mut self) {
        let mut parts: Vec<&str> = self.input.graphemes(true).collect();
        let idx = self.input_cursor.min(parts.len());
        if idx < parts.len() {
            parts.remove(idx);
            self.input = parts.concat();
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        let len = self.input.graphemes(true).count();
        if self.input_cursor < len {
            self.input_cursor += 1;
        }
    }

    pub fn move_cursor_start(&mut self) {
        self.input_cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.input_cursor = self.input.graphemes(true).count();
    }

    /// Ctrl-W.
    pub fn delete_prev_word(&mut self) {
        let parts: Vec<&str> = self.input.graphemes(true).collect();
        let end = self.input_cursor.min(parts.len());
        let mut i = end;
        while i > 0 && parts[i - 1].trim().is_empty() {
            i -= 1;
        }
        while i > 0 && !parts[i - 1].trim().is_empty() {
            i -= 1;
        }
        let mut kept = parts.clone();
        kept.drain(i..end);
        self.input = kept.concat();
        self.input_cursor = i;
    }

    /// Ctrl-U.
    pub fn kill_to_line_start(&mut self) {
        let parts: Vec<&str> = self.input.graphemes(true).collect();
        let end = self.input_cursor.min(parts.len());
        self.input = parts[end..].concat();
        self.input_cursor = 0;
    }
}
