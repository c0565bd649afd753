use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use exbar_core::{
    CommandDialog, CommandHistory, Config, Editor, JsonFileStore, KeyMap, KvStore, Lifecycle,
    LifecycleEvent, Transition,
};
use ratatui::layout::Rect;
use tracing::{debug, info};
use unicode_segmentation::UnicodeSegmentation;

pub mod commands;
pub mod documents;
pub mod engine;
pub mod find;
pub mod keys;

use documents::Document;
use engine::{Engine, EngineAction};

#[derive(Clone)]
pub struct FindInput {
    pub buffer: String,
    pub backwards: bool,
}

#[derive(Clone)]
pub struct FindHit {
    pub line_idx: usize,
    pub start: usize, // byte offsets into the line
    pub end: usize,
}

pub struct App {
    pub docs: Vec<Document>,
    pub current: usize,
    pub lifecycle: Lifecycle,
    pub engine: Engine,
    pub should_quit: bool,
    pub show_sidebar: bool,
    pub show_help: bool,
    pub editor_area: Option<Rect>,
    pub scroll: u16,
    pub find_input: Option<FindInput>,
    pub find_query: Option<String>,
    pub find_backwards: bool,
    pub find_hits: Vec<FindHit>,
    pub find_current: usize,
    pub dirty: bool,
    next_id: u64,
}

impl App {
    /// Opens `paths` (missing files become empty documents) and wires the
    /// bar to the shared state file.
    pub fn new(cfg: &Config, paths: &[PathBuf]) -> anyhow::Result<Self> {
        let mut docs = Vec::new();
        for (i, path) in paths.iter().enumerate() {
            let lines = crate::persist::load_document(path)?.unwrap_or_default();
            docs.push(Document::new(
                i as u64 + 1,
                path.display().to_string(),
                Some(path.clone()),
                lines,
            ));
        }
        let history_store = JsonFileStore::in_dir(&cfg.state_dir);
        let prefs = JsonFileStore::in_dir(&cfg.state_dir);
        info!(target: "tui", "state file: {}", history_store.path().display());
        Ok(Self::with_stores(cfg, Box::new(history_store), Box::new(prefs), docs))
    }

    pub fn with_stores(
        cfg: &Config,
        history_store: Box<dyn KvStore>,
        prefs: Box<dyn KvStore>,
        mut docs: Vec<Document>,
    ) -> Self {
        if docs.is_empty() {
            docs.push(Document::scratch(1));
        }
        let next_id = docs.iter().map(|d| d.id.0).max().unwrap_or(0);

        let mut history = CommandHistory::new(history_store, cfg.history_limit);
        history.initialize();
        let dialog = CommandDialog::new(history, cfg.ignore_duplicates);
        let lifecycle = Lifecycle::new(dialog, prefs, cfg.enabled_by_default);

        let mut app = Self {
            docs,
            current: 0,
            lifecycle,
            engine: Engine::default(),
            should_quit: false,
            show_sidebar: true,
            show_help: false,
            editor_area: None,
            scroll: 0,
            find_input: None,
            find_query: None,
            find_backwards: false,
            find_hits: Vec::new(),
            find_current: 0,
            dirty: true,
            next_id,
        };
        let doc: &mut dyn Editor = &mut app.docs[0];
        let t = app.lifecycle.init(Some(doc));
        debug!(target: "tui", "lifecycle init: {:?}", t);
        app.drain_lifecycle_events();
        app
    }

    pub fn vim_active(&self) -> bool {
        self.current_doc().key_map == KeyMap::Vim
    }

    /// The "Enable Vim bar" menu item.
    pub fn toggle_vim(&mut self) {
        self.engine.reset();
        let doc: &mut dyn Editor = &mut self.docs[self.current];
        let t = self.lifecycle.toggle(Some(doc));
        if t == Transition::Hidden {
            self.find_input = None;
        }
        self.drain_lifecycle_events();
        self.dirty = true;
    }

    fn drain_lifecycle_events(&mut self) {
        for ev in self.lifecycle.take_events() {
            match ev {
                LifecycleEvent::Enabled(id) => info!(target: "tui", "vim enabled on {:?}", id),
                LifecycleEvent::Disabled(id) => info!(target: "tui", "vim disabled on {:?}", id),
            }
        }
    }

    /// Open the prompt, type `line` and submit it, as if from the keyboard.
    pub fn submit_ex_line(&mut self, line: &str) {
        use exbar_core::{DialogRequest, KeymapHooks};
        let dialog = self.lifecycle.dialog_mut();
        dialog.open_dialog(DialogRequest::Prompt { sign: ":".to_string() });
        dialog.insert_text(line);
        self.submit_dialog();
    }

    fn submit_dialog(&mut self) {
        if let Some(cmd) = self.lifecycle.dialog_mut().on_submit() {
            self.execute_ex(&cmd);
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.dirty = true;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::F(2) => {
                self.toggle_vim();
                return;
            }
            KeyCode::F(1) => {
                self.show_help = !self.show_help;
                return;
            }
            KeyCode::Char('q') if ctrl => {
                self.quit(false);
                return;
            }
            KeyCode::Char('n') if ctrl => {
                self.select_next_doc();
                return;
            }
            KeyCode::Char('p') if ctrl => {
                self.select_prev_doc();
                return;
            }
            KeyCode::Char('b') if ctrl => {
                self.show_sidebar = !self.show_sidebar;
                return;
            }
            _ => {}
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return;
        }

        if self.find_input.is_some() {
            self.on_find_key(&key);
            return;
        }

        if self.lifecycle.dialog().is_open() {
            self.on_dialog_key(&key);
            return;
        }

        if self.vim_active() {
            let action = self.engine.handle(
                &key,
                &mut self.docs[self.current],
                self.lifecycle.dialog_mut(),
            );
            match action {
                EngineAction::None => {
                    if !self.find_hits.is_empty() && self.current_doc().modified {
                        self.recompute_find_hits();
                    }
                }
                EngineAction::Find { backwards } => self.open_find(backwards),
                EngineAction::FindNext => self.next_find_hit(),
                EngineAction::FindPrev => self.prev_find_hit(),
            }
            return;
        }

        self.on_default_key(&key);
    }

    fn on_find_key(&mut self, key: &KeyEvent) {
        let Some(state) = &mut self.find_input else {
            return;
        };
        if keys::is_cancel(key) {
            self.find_input = None;
            return;
        }
        match key.code {
            KeyCode::Enter => self.commit_find(),
            KeyCode::Backspace => {
                if state.buffer.is_empty() {
                    self.find_input = None;
                } else {
                    let mut parts: Vec<&str> = state.buffer.graphemes(true).collect();
                    parts.pop();
                    state.buffer = parts.concat();
                }
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                state.buffer.push(ch);
            }
            _ => {}
        }
    }

    fn on_dialog_key(&mut self, key: &KeyEvent) {
        if keys::is_cancel(key) {
            self.lifecycle.dialog_mut().on_cancel();
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let dialog = self.lifecycle.dialog_mut();
        match key.code {
            KeyCode::Enter => self.submit_dialog(),
            KeyCode::Up => dialog.on_navigate_up(),
            KeyCode::Down => dialog.on_navigate_down(),
            KeyCode::Backspace => dialog.delete_left_grapheme(),
            KeyCode::Delete => dialog.delete_right_grapheme(),
            KeyCode::Left => dialog.move_cursor_left(),
            KeyCode::Right => dialog.move_cursor_right(),
            KeyCode::Home => dialog.move_cursor_start(),
            KeyCode::End => dialog.move_cursor_end(),
            KeyCode::Char('a') if ctrl => dialog.move_cursor_start(),
            KeyCode::Char('e') if ctrl => dialog.move_cursor_end(),
            KeyCode::Char('w') if ctrl => dialog.delete_prev_word(),
            KeyCode::Char('u') if ctrl => dialog.kill_to_line_start(),
            KeyCode::Char(ch) if !ctrl => {
                let mut buf = [0u8; 4];
                dialog.insert_text(ch.encode_utf8(&mut buf));
            }
            _ => {}
        }
    }

    /// Default key map: extra keys first, then plain editing.
    fn on_default_key(&mut self, key: &KeyEvent) {
        let bound = keys::key_name(key).and_then(|name| {
            self.current_doc()
                .extra_keys
                .as_ref()
                .and_then(|k| k.get(&name).cloned())
        });
        if let Some(action) = bound {
            self.run_host_action(&action);
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let doc = self.current_doc_mut();
        match key.code {
            KeyCode::Enter => doc.insert_newline(),
            KeyCode::Backspace => doc.delete_left(),
            KeyCode::Delete => doc.delete_right(),
            KeyCode::Left => doc.move_left(1),
            KeyCode::Right => doc.move_right(1, true),
            KeyCode::Up => doc.move_up(1, true),
            KeyCode::Down => doc.move_down(1, true),
            KeyCode::Home => doc.line_start(),
            KeyCode::End => doc.line_end(true),
            KeyCode::Tab => doc.insert_text("    "),
            KeyCode::Char(ch) if !ctrl => {
                let mut buf = [0u8; 4];
                doc.insert_text(ch.encode_utf8(&mut buf));
            }
            _ => {}
        }
        if !self.find_hits.is_empty() {
            self.recompute_find_hits();
        }
    }

    fn run_host_action(&mut self, action: &str) {
        debug!(target: "tui", "host action: {}", action);
        match action {
            "file.save" => self.execute_ex("w"),
            "edit.find" => self.open_find(false),
            other => self.set_info(format!("Unbound action: {}", other)),
        }
    }

    pub fn on_paste(&mut self, text: &str) {
        self.dirty = true;
        if let Some(state) = &mut self.find_input {
            state.buffer.push_str(&text.replace(['\r', '\n'], " "));
            return;
        }
        if self.lifecycle.dialog().is_open() {
            self.lifecycle.dialog_mut().insert_text(text);
            return;
        }
        let editable = !self.vim_active()
            || matches!(
                self.engine.mode(),
                exbar_core::VimMode::Insert | exbar_core::VimMode::Replace
            );
        if editable {
            self.current_doc_mut().insert_text(&text.replace("\r\n", "\n"));
            if !self.find_hits.is_empty() {
                self.recompute_find_hits();
            }
        }
    }

    /// The terminal lost focus: the prompt closes and recall starts over.
    pub fn on_focus_lost(&mut self) {
        self.lifecycle.dialog_mut().on_blur();
        self.dirty = true;
    }

    /// Vim normal-mode style cursor; any text entry shows a bar.
    pub fn cursor_block(&self) -> bool {
        self.vim_active()
            && self.find_input.is_none()
            && !self.lifecycle.dialog().is_open()
            && !matches!(
                self.engine.mode(),
                exbar_core::VimMode::Insert | exbar_core::VimMode::Replace
            )
    }

    /// Keeps the cursor row inside the visible editor rows.
    pub fn ensure_cursor_visible(&mut self, height: u16) {
        let row = self.current_doc().row as u16;
        if height == 0 {
            return;
        }
        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + height {
            self.scroll = row + 1 - height;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use exbar_core::{MemoryStore, StatusBar};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn typed(app: &mut App, s: &str) {
        for c in s.chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
    }

    fn docs(lines: &[&str]) -> Vec<Document> {
        vec![Document::new(
            1,
            "test.txt",
            None,
            lines.iter().map(|s| s.to_string()).collect(),
        )]
    }

    pub fn app_with_store(store: &MemoryStore, lines: &[&str]) -> App {
        App::with_stores(
            &Config::default(),
            Box::new(store.clone()),
            Box::new(store.clone()),
            docs(lines),
        )
    }

    pub fn app_with_lines(lines: &[&str]) -> App {
        app_with_store(&MemoryStore::new(), lines)
    }

    fn status(app: &App) -> StatusBar<'_> {
        app.lifecycle.dialog().status()
    }

    #[test]
    fn starts_in_default_key_map() {
        let app = app_with_lines(&["abc"]);
        assert!(!app.vim_active());
        assert!(!app.lifecycle.bar_visible());
        assert!(app.current_doc().extra_keys.is_some());
    }

    #[test]
    fn f2_toggles_bar_and_key_map() {
        let mut app = app_with_lines(&["abc"]);
        app.on_key(key(KeyCode::F(2)));
        assert!(app.vim_active());
        assert!(app.lifecycle.bar_visible());
        assert_eq!(app.current_doc().extra_keys, None);
        assert_eq!(status(&app).mode, Some("-- NORMAL --"));
        app.on_key(key(KeyCode::F(2)));
        assert!(!app.vim_active());
        assert_eq!(
            app.current_doc().extra_keys,
            Some(documents::default_extra_keys())
        );
    }

    #[test]
    fn ex_prompt_round_trip() {
        let mut app = app_with_lines(&["abc"]);
        app.toggle_vim();
        typed(&mut app, ":");
        assert!(app.lifecycle.dialog().is_open());
        typed(&mut app, "bogus");
        assert_eq!(status(&app).input, Some("bogus"));
        app.on_key(key(KeyCode::Enter));
        assert!(!app.lifecycle.dialog().is_open());
        assert_eq!(status(&app).info, "Not an editor command: bogus");
        assert_eq!(app.lifecycle.dialog().history().entries(), &["bogus"]);
    }

    #[test]
    fn up_recalls_previous_command() {
        let mut app = app_with_lines(&["abc"]);
        app.toggle_vim();
        app.submit_ex_line("set vim");
        app.submit_ex_line("2");
        typed(&mut app, ":");
        app.on_key(key(KeyCode::Up));
        assert_eq!(status(&app).input, Some("2"));
        app.on_key(key(KeyCode::Up));
        assert_eq!(status(&app).input, Some("set vim"));
        app.on_key(key(KeyCode::Esc));
        assert!(!app.lifecycle.dialog().is_open());
        assert!(!app.lifecycle.dialog().history().is_recalling());
    }

    #[test]
    fn ctrl_bracket_cancels_prompt() {
        let mut app = app_with_lines(&["abc"]);
        app.toggle_vim();
        typed(&mut app, ":wq");
        app.on_key(ctrl('['));
        assert!(!app.lifecycle.dialog().is_open());
        assert!(!app.should_quit);
        assert!(app.lifecycle.dialog().history().is_empty());
    }

    #[test]
    fn history_persists_across_restart() {
        let store = MemoryStore::new();
        {
            let mut app = app_with_store(&store, &["abc"]);
            app.toggle_vim();
            app.submit_ex_line("history");
        }
        let mut app = app_with_store(&store, &["abc"]);
        assert!(app.vim_active());
        typed(&mut app, ":");
        app.on_key(key(KeyCode::Up));
        assert_eq!(status(&app).input, Some("history"));
    }

    #[test]
    fn switching_documents_keeps_vim_state() {
        let mut app = app_with_lines(&["abc"]);
        let id = app.next_doc_id();
        app.docs.push(Document::scratch(id));
        app.toggle_vim();
        app.on_key(ctrl('n'));
        assert_eq!(app.current, 1);
        assert!(app.vim_active());
        assert_eq!(app.lifecycle.dialog().editor(), Some(app.current_doc().id));
        app.submit_ex_line("set novim");
        app.on_key(ctrl('p'));
        assert!(!app.vim_active());
        assert_eq!(
            app.current_doc().extra_keys,
            Some(documents::default_extra_keys())
        );
    }

    #[test]
    fn extra_keys_only_in_default_map() {
        let mut app = app_with_lines(&["abc"]);
        app.on_key(ctrl('s'));
        assert_eq!(status(&app).info, crate::strings::NO_FILE_NAME);
        app.on_key(ctrl('f'));
        assert!(app.find_input.is_some());
        app.on_key(key(KeyCode::Esc));
        assert!(app.find_input.is_none());

        app.toggle_vim();
        app.lifecycle.dialog_mut().set_info("");
        app.on_key(ctrl('s'));
        assert_eq!(status(&app).info, "");
    }

    #[test]
    fn slash_search_in_vim_mode() {
        let mut app = app_with_lines(&["one", "two", "one"]);
        app.toggle_vim();
        typed(&mut app, "/one");
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.current_doc().row, 2);
        typed(&mut app, "n");
        assert_eq!(app.current_doc().row, 0);
    }

    #[test]
    fn default_map_edits_text() {
        let mut app = app_with_lines(&[""]);
        typed(&mut app, "hi");
        app.on_key(key(KeyCode::Enter));
        typed(&mut app, "x");
        assert_eq!(app.current_doc().lines, vec!["hi", "x"]);
    }

    #[test]
    fn paste_goes_to_open_prompt() {
        let mut app = app_with_lines(&["abc"]);
        app.toggle_vim();
        app.on_paste("ignored in normal mode");
        assert_eq!(app.current_doc().lines, vec!["abc"]);
        typed(&mut app, ":");
        app.on_paste("e a\nb");
        assert_eq!(status(&app).input, Some("e a b"));
    }

    #[test]
    fn paste_before_find_hit_shifts_highlight() {
        let mut app = app_with_lines(&["xxfoo"]);
        app.on_key(ctrl('f'));
        app.on_paste("foo");
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.find_hits[0].start, 2);
        app.on_key(key(KeyCode::Home));
        app.on_paste("€");
        assert_eq!(app.current_doc().lines, vec!["€xxfoo"]);
        assert_eq!(app.find_hits.len(), 1);
        assert_eq!(app.find_hits[0].start, "€xxfoo".find("foo").unwrap());
        let mut term = ratatui::Terminal::new(ratatui::backend::TestBackend::new(80, 20)).unwrap();
        term.draw(|f| crate::ui::draw(f, &mut app)).unwrap();
    }

    #[test]
    fn focus_loss_closes_prompt_and_ends_recall() {
        let mut app = app_with_lines(&["abc"]);
        app.toggle_vim();
        typed(&mut app, ":w");
        app.on_key(key(KeyCode::Enter));
        typed(&mut app, ":");
        app.on_key(key(KeyCode::Up));
        assert_eq!(status(&app).input, Some("w"));
        assert!(app.lifecycle.dialog().history().is_recalling());
        app.on_focus_lost();
        assert!(!app.lifecycle.dialog().is_open());
        assert!(!app.lifecycle.dialog().history().is_recalling());
        assert!(app.dirty);
    }

    #[test]
    fn ctrl_q_respects_unsaved_changes() {
        let mut app = app_with_lines(&[""]);
        typed(&mut app, "x");
        app.on_key(ctrl('q'));
        assert!(!app.should_quit);
        app.current_doc_mut().modified = false;
        app.on_key(ctrl('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn scroll_follows_cursor() {
        let mut app = app_with_lines(&["a"; 30]);
        app.current_doc_mut().row = 20;
        app.ensure_cursor_visible(10);
        assert_eq!(app.scroll, 11);
        app.current_doc_mut().row = 3;
        app.ensure_cursor_visible(10);
        assert_eq!(app.scroll, 3);
    }
}
