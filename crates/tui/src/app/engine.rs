//! Stand-in for the host's Vim keymap engine.
//!
//! Only enough modal behaviour to exercise the status hooks: mode switches,
//! counts and `g` as pending keys, `:` and `/` prompts, macro-recording
//! notices, and cursor movement. It talks to the bar exclusively through
//! `KeymapHooks`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use exbar_core::{DialogOpen, DialogRequest, KeymapHooks, VimMode};
use tracing::debug;

use super::documents::Document;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineAction {
    None,
    Find { backwards: bool },
    FindNext,
    FindPrev,
}

#[derive(Debug, Default)]
pub struct Engine {
    mode: VimMode,
    count: String,
    pending_g: bool,
    awaiting_register: bool,
    recording: Option<char>,
}

impl Engine {
    pub fn mode(&self) -> VimMode {
        self.mode
    }

    pub fn recording(&self) -> Option<char> {
        self.recording
    }

    /// Back to a clean normal mode, e.g. when the key map is re-attached.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn handle(
        &mut self,
        key: &KeyEvent,
        doc: &mut Document,
        hooks: &mut dyn KeymapHooks,
    ) -> EngineAction {
        match self.mode {
            VimMode::Insert | VimMode::Replace => {
                self.handle_insert(key, doc, hooks);
                EngineAction::None
            }
            _ => self.handle_normal(key, doc, hooks),
        }
    }

    fn set_mode(&mut self, mode: VimMode, hooks: &mut dyn KeymapHooks) {
        if self.mode != mode {
            debug!(target: "tui", "vim mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
        hooks.on_mode_change(mode);
    }

    fn take_count(&mut self) -> Option<usize> {
        let n = self.count.parse::<usize>().ok();
        self.count.clear();
        n
    }

    fn clear_pending(&mut self, hooks: &mut dyn KeymapHooks) {
        self.count.clear();
        self.pending_g = false;
        self.awaiting_register = false;
        hooks.clear_command_keys();
    }

    fn handle_insert(&mut self, key: &KeyEvent, doc: &mut Document, hooks: &mut dyn KeymapHooks) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                doc.move_left(1);
                self.set_mode(VimMode::Normal, hooks);
            }
            KeyCode::Char('c') | KeyCode::Char('[') if ctrl => {
                doc.move_left(1);
                self.set_mode(VimMode::Normal, hooks);
            }
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
                let s = ch.encode_utf8(&mut buf);
                if self.mode == VimMode::Replace {
                    doc.overwrite_text(s);
                } else {
                    doc.insert_text(s);
                }
            }
            _ => {}
        }
    }

    fn handle_normal(
        &mut self,
        key: &KeyEvent,
        doc: &mut Document,
        hooks: &mut dyn KeymapHooks,
    ) -> EngineAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if matches!(key.code, KeyCode::Char('c') | KeyCode::Char('[')) {
                self.clear_pending(hooks);
            }
            return EngineAction::None;
        }

        if self.awaiting_register {
            self.awaiting_register = false;
            hooks.clear_command_keys();
            if let KeyCode::Char(reg) = key.code {
                if reg.is_ascii_alphanumeric() {
                    self.recording = Some(reg);
                    hooks.open_dialog(DialogRequest::Notice(format!("recording @{}", reg)));
                }
            }
            return EngineAction::None;
        }

        if self.pending_g {
            self.pending_g = false;
            let count = self.take_count();
            hooks.clear_command_keys();
            if key.code == KeyCode::Char('g') {
                doc.goto_line(count.unwrap_or(1));
            }
            return EngineAction::None;
        }

        let ch = match key.code {
            KeyCode::Char(c) => c,
            KeyCode::Esc => {
                self.clear_pending(hooks);
                if self.mode != VimMode::Normal {
                    self.set_mode(VimMode::Normal, hooks);
                }
                return EngineAction::None;
            }
            KeyCode::Left => 'h',
            KeyCode::Right => 'l',
            KeyCode::Up => 'k',
            KeyCode::Down => 'j',
            KeyCode::Home => '0',
            KeyCode::End => '$',
            _ => return EngineAction::None,
        };

        if ch.is_ascii_digit() && (ch != '0' || !self.count.is_empty()) {
            self.count.push(ch);
            let mut buf = [0u8; 4];
            hooks.update_command_keys(ch.encode_utf8(&mut buf));
            return EngineAction::None;
        }

        let action = match ch {
            'g' => {
                self.pending_g = true;
                hooks.update_command_keys("g");
                return EngineAction::None;
            }
            'h' => {
                doc.move_left(self.take_count().unwrap_or(1));
                EngineAction::None
            }
            'l' => {
                doc.move_right(self.take_count().unwrap_or(1), false);
                EngineAction::None
            }
            'j' => {
                doc.move_down(self.take_count().unwrap_or(1), false);
                EngineAction::None
            }
            'k' => {
                doc.move_up(self.take_count().unwrap_or(1), false);
                EngineAction::None
            }
            '0' => {
                doc.line_start();
                EngineAction::None
            }
            '$' => {
                doc.line_end(false);
                EngineAction::None
            }
            'G' => {
                let last = doc.lines.len();
                doc.goto_line(self.take_count().unwrap_or(last));
                EngineAction::None
            }
            'i' => {
                self.set_mode(VimMode::Insert, hooks);
                EngineAction::None
            }
            'a' => {
                self.set_mode(VimMode::Insert, hooks);
                doc.move_right(1, true);
                EngineAction::None
            }
            'A' => {
                self.set_mode(VimMode::Insert, hooks);
                doc.line_end(true);
                EngineAction::None
            }
            'I' => {
                self.set_mode(VimMode::Insert, hooks);
                doc.line_start();
                EngineAction::None
            }
            'o' => {
                self.set_mode(VimMode::Insert, hooks);
                doc.open_line_below();
                EngineAction::None
            }
            'R' => {
                self.set_mode(VimMode::Replace, hooks);
                EngineAction::None
            }
            'v' | 'V' => {
                let target = if ch == 'v' { VimMode::Visual } else { VimMode::VisualLine };
                let next = if self.mode == target { VimMode::Normal } else { target };
                self.set_mode(next, hooks);
                EngineAction::None
            }
            'q' => {
                if self.recording.take().is_some() {
                    hooks.on_mode_change(self.mode);
                } else {
                    self.awaiting_register = true;
                    hooks.update_command_keys("q");
                    self.count.clear();
                    return EngineAction::None;
                }
                EngineAction::None
            }
            ':' => {
                hooks.open_dialog(DialogRequest::Prompt { sign: ":".to_string() });
                EngineAction::None
            }
            '/' | '?' => match hooks.open_dialog(DialogRequest::Prompt { sign: ch.to_string() }) {
                DialogOpen::Search => EngineAction::Find { backwards: ch == '?' },
                _ => EngineAction::None,
            },
            'n' => EngineAction::FindNext,
            'N' => EngineAction::FindPrev,
            _ => EngineAction::None,
        };
        self.clear_pending(hooks);
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exbar_core::{CommandDialog, CommandHistory, MemoryStore};

    fn setup() -> (Engine, Document, CommandDialog) {
        let h = CommandHistory::new(Box::new(MemoryStore::new()), 0);
        let doc = Document::new(
            1,
            "t",
            None,
            vec!["one".to_string(), "two".to_string(), "three".to_string()],
        );
        (Engine::default(), doc, CommandDialog::new(h, true))
    }

    fn press(e: &mut Engine, d: &mut Document, hooks: &mut CommandDialog, keys: &str) -> EngineAction {
        let mut last = EngineAction::None;
        for c in keys.chars() {
            let ev = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            last = e.handle(&ev, d, hooks);
        }
        last
    }

    fn esc(e: &mut Engine, d: &mut Document, hooks: &mut CommandDialog) {
        e.handle(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), d, hooks);
    }

    #[test]
    fn insert_mode_reports_status() {
        let (mut e, mut d, mut bar) = setup();
        press(&mut e, &mut d, &mut bar, "i");
        assert_eq!(e.mode(), VimMode::Insert);
        assert_eq!(bar.status().mode, Some("-- INSERT --"));
        press(&mut e, &mut d, &mut bar, "hi ");
        assert_eq!(d.lines[0], "hi one");
        esc(&mut e, &mut d, &mut bar);
        assert_eq!(e.mode(), VimMode::Normal);
        assert_eq!(bar.status().mode, Some("-- NORMAL --"));
        assert_eq!(d.col, 2);
    }

    #[test]
    fn counts_show_as_pending_keys() {
        let (mut e, mut d, mut bar) = setup();
        press(&mut e, &mut d, &mut bar, "2");
        assert_eq!(bar.status().command_keys, "2");
        press(&mut e, &mut d, &mut bar, "j");
        assert_eq!(d.row, 2);
        assert_eq!(bar.status().command_keys, "");
    }

    #[test]
    fn gg_and_g_jump() {
        let (mut e, mut d, mut bar) = setup();
        press(&mut e, &mut d, &mut bar, "G");
        assert_eq!(d.row, 2);
        press(&mut e, &mut d, &mut bar, "g");
        assert_eq!(bar.status().command_keys, "g");
        press(&mut e, &mut d, &mut bar, "g");
        assert_eq!(d.row, 0);
        press(&mut e, &mut d, &mut bar, "2gg");
        assert_eq!(d.row, 1);
    }

    #[test]
    fn colon_opens_prompt() {
        let (mut e, mut d, mut bar) = setup();
        press(&mut e, &mut d, &mut bar, ":");
        assert!(bar.is_open());
        assert_eq!(bar.status().sign, ":");
    }

    #[test]
    fn slash_routes_to_find() {
        let (mut e, mut d, mut bar) = setup();
        assert_eq!(press(&mut e, &mut d, &mut bar, "/"), EngineAction::Find { backwards: false });
        assert_eq!(press(&mut e, &mut d, &mut bar, "?"), EngineAction::Find { backwards: true });
        assert!(!bar.is_open());
        assert_eq!(press(&mut e, &mut d, &mut bar, "n"), EngineAction::FindNext);
    }

    #[test]
    fn recording_notice_round_trip() {
        let (mut e, mut d, mut bar) = setup();
        bar.on_mode_change(VimMode::Normal);
        press(&mut e, &mut d, &mut bar, "qa");
        assert_eq!(e.recording(), Some('a'));
        assert_eq!(bar.status().mode, Some("recording @a"));
        press(&mut e, &mut d, &mut bar, "q");
        assert_eq!(e.recording(), None);
        assert_eq!(bar.status().mode, Some("-- NORMAL --"));
    }

    #[test]
    fn replace_mode_overwrites() {
        let (mut e, mut d, mut bar) = setup();
        press(&mut e, &mut d, &mut bar, "R");
        assert_eq!(bar.status().mode, Some("-- REPLACE --"));
        press(&mut e, &mut d, &mut bar, "ON");
        assert_eq!(d.lines[0], "ONe");
    }

    #[test]
    fn visual_modes_toggle() {
        let (mut e, mut d, mut bar) = setup();
        press(&mut e, &mut d, &mut bar, "v");
        assert_eq!(bar.status().mode, Some("-- VISUAL --"));
        press(&mut e, &mut d, &mut bar, "V");
        assert_eq!(bar.status().mode, Some("-- VISUAL LINE --"));
        press(&mut e, &mut d, &mut bar, "j");
        assert_eq!(d.row, 1);
        esc(&mut e, &mut d, &mut bar);
        assert_eq!(e.mode(), VimMode::Normal);
        press(&mut e, &mut d, &mut bar, "vv");
        assert_eq!(e.mode(), VimMode::Normal);
    }

    #[test]
    fn escape_drops_pending_count() {
        let (mut e, mut d, mut bar) = setup();
        press(&mut e, &mut d, &mut bar, "3");
        esc(&mut e, &mut d, &mut bar);
        assert_eq!(bar.status().command_keys, "");
        press(&mut e, &mut d, &mut bar, "j");
        assert_eq!(d.row, 1);
    }
}
