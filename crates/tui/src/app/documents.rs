use std::path::PathBuf;

use exbar_core::{Editor, EditorId, EditorOption, ExtraKeys, KeyMap};
use unicode_segmentation::UnicodeSegmentation;

use super::App;

/// Host bindings every document starts with; the Vim key map clears them.
pub fn default_extra_keys() -> ExtraKeys {
    let mut keys = ExtraKeys::new();
    keys.insert("Ctrl-S".to_string(), "file.save".to_string());
    keys.insert("Ctrl-F".to_string(), "edit.find".to_string());
    keys
}

/// A plain-text buffer. Columns are grapheme indices.
pub struct Document {
    pub id: EditorId,
    pub name: String,
    pub path: Option<PathBuf>,
    pub lines: Vec<String>,
    pub row: usize,
    pub col: usize,
    pub modified: bool,
    pub key_map: KeyMap,
    pub extra_keys: Option<ExtraKeys>,
    pub show_cursor_when_selecting: bool,
}

impl Document {
    pub fn new(id: u64, name: impl Into<String>, path: Option<PathBuf>, lines: Vec<String>) -> Self {
        let lines = if lines.is_empty() { vec![String::new()] } else { lines };
        Self {
            id: EditorId(id),
            name: name.into(),
            path,
            lines,
            row: 0,
            col: 0,
            modified: false,
            key_map: KeyMap::Default,
            extra_keys: Some(default_extra_keys()),
            show_cursor_when_selecting: false,
        }
    }

    pub fn scratch(id: u64) -> Self {
        Self::new(id, "[scratch]", None, Vec::new())
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines
            .get(row)
            .map(|l| l.graphemes(true).count())
            .unwrap_or(0)
    }

    pub fn current_line_len(&self) -> usize {
        self.line_len(self.row)
    }

    /// Normal mode keeps the cursor on a character, insert mode may sit past
    /// the end.
    pub fn clamp_col(&mut self, past_end: bool) {
        let len = self.current_line_len();
        let max = if past_end { len } else { len.saturating_sub(1) };
        self.col = self.col.min(max);
    }

    pub fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
    }

    pub fn move_right(&mut self, n: usize, past_end: bool) {
        self.col = self.col.saturating_add(n);
        self.clamp_col(past_end);
    }

    pub fn move_up(&mut self, n: usize, past_end: bool) {
        self.row = self.row.saturating_sub(n);
        self.clamp_col(past_end);
    }

    pub fn move_down(&mut self, n: usize, past_end: bool) {
        self.row = (self.row + n).min(self.lines.len().saturating_sub(1));
        self.clamp_col(past_end);
    }

    pub fn line_start(&mut self) {
        self.col = 0;
    }

    pub fn line_end(&mut self, past_end: bool) {
        self.col = usize::MAX;
        self.clamp_col(past_end);
    }

    /// 1-based, clamped to the buffer.
    pub fn goto_line(&mut self, line: usize) {
        self.row = line.saturating_sub(1).min(self.lines.len().saturating_sub(1));
        self.col = 0;
    }

    pub fn insert_text(&mut self, s: &str) {
        for (i, part) in s.split('\n').enumerate() {
            if i > 0 {
                self.insert_newline();
            }
            let part = part.trim_end_matches('\r');
            if part.is_empty() {
                continue;
            }
            let line = &self.lines[self.row];
            let parts: Vec<&str> = line.graphemes(true).collect();
            let idx = self.col.min(parts.len());
            let mut new_line = parts[..idx].concat();
            new_line.push_str(part);
            new_line.push_str(&parts[idx..].concat());
            self.lines[self.row] = new_line;
            self.col = idx + part.graphemes(true).count();
        }
        self.modified = true;
    }

    /// Replace mode: typed text covers what is under the cursor.
    pub fn overwrite_text(&mut self, s: &str) {
        let line = &self.lines[self.row];
        let mut parts: Vec<&str> = line.graphemes(true).collect();
        let idx = self.col.min(parts.len());
        let added: Vec<&str> = s.graphemes(true).collect();
        let end = (idx + added.len()).min(parts.len());
        parts.splice(idx..end, added.iter().copied());
        self.lines[self.row] = parts.concat();
        self.col = idx + added.len();
        self.modified = true;
    }

    pub fn insert_newline(&mut self) {
        let line = &self.lines[self.row];
        let parts: Vec<&str> = line.graphemes(true).collect();
        let idx = self.col.min(parts.len());
        let head = parts[..idx].concat();
        let tail = parts[idx..].concat();
        self.lines[self.row] = head;
        self.lines.insert(self.row + 1, tail);
        self.row += 1;
        self.col = 0;
        self.modified = true;
    }

    pub fn open_line_below(&mut self) {
        self.lines.insert(self.row + 1, String::new());
        self.row += 1;
        self.col = 0;
        self.modified = true;
    }

    pub fn delete_left(&mut self) {
        if self.col == 0 {
            if self.row == 0 {
                return;
            }
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.current_line_len();
            self.lines[self.row].push_str(&line);
            self.modified = true;
            return;
        }
        let mut parts: Vec<&str> = self.lines[self.row].graphemes(true).collect();
        let idx = self.col.min(parts.len());
        if idx == 0 {
            self.col = 0;
            return;
        }
        parts.remove(idx - 1);
        self.lines[self.row] = parts.concat();
        self.col = idx - 1;
        self.modified = true;
    }

    pub fn delete_right(&mut self) {
        let mut parts: Vec<&str> = self.lines[self.row].graphemes(true).collect();
        let idx = self.col.min(parts.len());
        if idx < parts.len() {
            parts.remove(idx);
            self.lines[self.row] = parts.concat();
            self.modified = true;
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
            self.modified = true;
        }
    }
}

impl Editor for Document {
    fn id(&self) -> EditorId {
        self.id
    }

    fn set_option(&mut self, option: EditorOption) {
        match option {
            EditorOption::KeyMap(k) => {
                self.key_map = k;
                self.clamp_col(k == KeyMap::Default);
            }
            EditorOption::ExtraKeys(keys) => self.extra_keys = keys,
            EditorOption::ShowCursorWhenSelecting(b) => self.show_cursor_when_selecting = b,
        }
    }

    fn extra_keys(&self) -> Option<ExtraKeys> {
        self.extra_keys.clone()
    }

    fn key_map(&self) -> KeyMap {
        self.key_map
    }
}

impl App {
    pub fn current_doc(&self) -> &Document {
        &self.docs[self.current]
    }

    pub fn current_doc_mut(&mut self) -> &mut Document {
        &mut self.docs[self.current]
    }

    pub fn select_next_doc(&mut self) {
        if self.docs.len() > 1 {
            self.switch_to((self.current + 1) % self.docs.len());
        }
    }

    pub fn select_prev_doc(&mut self) {
        if self.docs.len() > 1 {
            let idx = if self.current == 0 {
                self.docs.len() - 1
            } else {
                self.current - 1
            };
            self.switch_to(idx);
        }
    }

    /// Every switch is an active-editor change for the lifecycle.
    pub fn switch_to(&mut self, idx: usize) {
        if idx >= self.docs.len() {
            return;
        }
        self.current = idx;
        self.scroll = 0;
        self.engine.reset();
        self.find_hits.clear();
        let doc: &mut dyn Editor = &mut self.docs[self.current];
        self.lifecycle.on_active_editor_change(Some(doc));
        self.dirty = true;
    }

    /// `:e path`. Re-uses an open document for the same path.
    pub fn open_document(&mut self, path: PathBuf) -> anyhow::Result<()> {
        if let Some(idx) = self.docs.iter().position(|d| d.path.as_ref() == Some(&path)) {
            self.switch_to(idx);
            return Ok(());
        }
        let lines = crate::persist::load_document(&path)?.unwrap_or_default();
        let id = self.next_doc_id();
        let name = path.display().to_string();
        self.docs.push(Document::new(id, name, Some(path), lines));
        self.switch_to(self.docs.len() - 1);
        Ok(())
    }

    pub fn next_doc_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}
