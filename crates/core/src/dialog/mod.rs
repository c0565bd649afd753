//! The command line that lives in the status bar.
//!
//! `CommandDialog` owns the input line, the status fields around it and the
//! command history. The keymap engine reaches it through [`KeymapHooks`]; the
//! host forwards key presses to the `on_*` methods.

use tracing::{debug, info};
use unicode_segmentation::UnicodeSegmentation;

use crate::history::CommandHistory;
use crate::keymap::{DialogOpen, DialogRequest, EditorId, KeymapHooks};

mod input;

/// Read-only view of the bar for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusBar<'a> {
    pub mode: Option<&'a str>,
    pub command_keys: &'a str,
    pub sign: &'a str,
    pub input: Option<&'a str>,
    pub input_cursor: usize,
    pub info: &'a str,
    pub confirm: Option<&'a str>,
}

pub struct CommandDialog {
    history: CommandHistory,
    ignore_duplicates: bool,
    input: String,
    input_cursor: usize,
    input_visible: bool,
    draft: Option<String>,
    sign: String,
    mode_text: String,
    mode_visible: bool,
    command_keys: String,
    info: String,
    confirm: Option<String>,
    editor: Option<EditorId>,
}

impl CommandDialog {
    /// Takes an initialized history. With `ignore_duplicates` a submit equal
    /// to the newest entry is not recorded again.
    pub fn new(history: CommandHistory, ignore_duplicates: bool) -> Self {
        Self {
            history,
            ignore_duplicates,
            input: String::new(),
            input_cursor: 0,
            input_visible: false,
            draft: None,
            sign: String::new(),
            mode_text: String::new(),
            mode_visible: true,
            command_keys: String::new(),
            info: String::new(),
            confirm: None,
            editor: None,
        }
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn is_open(&self) -> bool {
        self.input_visible
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_cursor(&self) -> usize {
        self.input_cursor
    }

    pub fn editor(&self) -> Option<EditorId> {
        self.editor
    }

    /// Point the dialog at another document. History is process-wide and
    /// stays.
    pub fn attach(&mut self, editor: EditorId) {
        if self.editor != Some(editor) {
            debug!(target: "exbar", "dialog attached to editor {:?}", editor);
        }
        if self.input_visible {
            self.on_blur();
        }
        self.editor = Some(editor);
    }

    pub fn status(&self) -> StatusBar<'_> {
        StatusBar {
            mode: self.mode_visible.then_some(self.mode_text.as_str()),
            command_keys: &self.command_keys,
            sign: &self.sign,
            input: self.input_visible.then_some(self.input.as_str()),
            input_cursor: self.input_cursor,
            info: &self.info,
            confirm: self.confirm.as_deref(),
        }
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.info = text.into();
    }

    pub fn show_confirm(&mut self, text: impl Into<String>) {
        self.confirm = Some(text.into());
        self.mode_visible = false;
    }

    pub fn hide_confirm(&mut self) {
        self.confirm = None;
        self.mode_visible = true;
    }

    /// Close the line and hand back the command for the host to execute.
    /// Blank input executes nothing and leaves history alone.
    pub fn on_submit(&mut self) -> Option<String> {
        if !self.input_visible {
            return None;
        }
        let command = self.input.trim().to_string();
        self.on_blur();
        if command.is_empty() {
            return None;
        }
        let repeat = self.ignore_duplicates && self.history.last() == Some(command.as_str());
        if !repeat {
            self.history.add(command.clone());
        }
        info!(target: "exbar", "ex command submitted: {}", command);
        Some(command)
    }

    pub fn on_navigate_up(&mut self) {
        if !self.input_visible {
            return;
        }
        if !self.history.is_recalling() {
            self.draft = Some(self.input.clone());
        }
        if self.history.is_empty() {
            return;
        }
        let entry = self.history.previous_entry().to_string();
        self.replace_input(entry);
    }

    /// Leaving the newest entry brings back whatever was typed before the
    /// first Up.
    pub fn on_navigate_down(&mut self) {
        if !self.input_visible || !self.history.is_recalling() {
            return;
        }
        let entry = self.history.next_entry().to_string();
        if self.history.is_recalling() {
            self.replace_input(entry);
        } else {
            let draft = self.draft.take().unwrap_or_default();
            self.replace_input(draft);
        }
    }

    pub fn on_cancel(&mut self) {
        if self.input_visible {
            debug!(target: "exbar", "ex command cancelled");
        }
        self.on_blur();
    }

    /// Common close path for submit, cancel and focus loss.
    pub fn on_blur(&mut self) {
        self.input.clear();
        self.input_cursor = 0;
        self.input_visible = false;
        self.sign.clear();
        self.info.clear();
        if self.confirm.is_none() {
            self.mode_visible = true;
        }
        self.draft = None;
        self.history.exit_session();
    }

    pub fn reset_history(&mut self) {
        self.history.clear_all();
        info!(target: "exbar", "ex command history cleared");
    }

    fn replace_input(&mut self, text: String) {
        self.input_cursor = text.graphemes(true).count();
        self.input = text;
    }
}

impl KeymapHooks for CommandDialog {
    fn open_dialog(&mut self, request: DialogRequest) -> DialogOpen {
        match request {
            DialogRequest::Notice(text) => {
                self.mode_text = text;
                self.mode_visible = true;
                DialogOpen::Notice
            }
            DialogRequest::Prompt { sign } => {
                if sign.starts_with('/') || sign.starts_with('?') {
                    return DialogOpen::Search;
                }
                self.input.clear();
                self.input_cursor = 0;
                self.input_visible = true;
                self.draft = None;
                self.sign = sign;
                self.info.clear();
                self.mode_visible = false;
                self.confirm = None;
                DialogOpen::Opened
            }
        }
    }

    fn update_status(&mut self, mode: &str) {
        self.mode_visible = true;
        self.confirm = None;
        self.mode_text = format!("-- {} --", mode);
    }

    fn update_command_keys(&mut self, key: &str) {
        if key != "?" {
            self.command_keys.push_str(key);
        }
    }

    fn clear_command_keys(&mut self) {
        self.command_keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::VimMode;
    use crate::store::MemoryStore;

    fn dialog(store: &MemoryStore) -> CommandDialog {
        let mut h = CommandHistory::new(Box::new(store.clone()), 0);
        h.initialize();
        CommandDialog::new(h, true)
    }

    fn prompt(d: &mut CommandDialog) {
        let r = d.open_dialog(DialogRequest::Prompt { sign: ":".into() });
        assert_eq!(r, DialogOpen::Opened);
    }

    fn run(d: &mut CommandDialog, cmd: &str) -> Option<String> {
        prompt(d);
        d.insert_text(cmd);
        d.on_submit()
    }

    #[test]
    fn submit_records_and_returns_command() {
        let store = MemoryStore::new();
        let mut d = dialog(&store);
        assert_eq!(run(&mut d, "wq"), Some("wq".to_string()));
        assert!(!d.is_open());
        assert_eq!(d.history().entries(), &["wq"]);
        assert_eq!(d.status().mode, Some(""));
    }

    #[test]
    fn blank_submit_is_dropped() {
        let store = MemoryStore::new();
        let mut d = dialog(&store);
        assert_eq!(run(&mut d, "   "), None);
        assert!(d.history().is_empty());
    }

    #[test]
    fn repeated_submit_recorded_once() {
        let store = MemoryStore::new();
        let mut d = dialog(&store);
        run(&mut d, "w");
        run(&mut d, "w");
        run(&mut d, "q");
        run(&mut d, "w");
        assert_eq!(d.history().entries(), &["w", "q", "w"]);
    }

    #[test]
    fn repeats_kept_when_policy_off() {
        let store = MemoryStore::new();
        let mut h = CommandHistory::new(Box::new(store.clone()), 0);
        h.initialize();
        let mut d = CommandDialog::new(h, false);
        run(&mut d, "w");
        run(&mut d, "w");
        assert_eq!(d.history().len(), 2);
    }

    #[test]
    fn up_down_recall_and_restore_draft() {
        let store = MemoryStore::new();
        let mut d = dialog(&store);
        run(&mut d, "w");
        run(&mut d, "wq");
        run(&mut d, "%s/foo/bar/g");

        prompt(&mut d);
        d.insert_text("e ma");
        d.on_navigate_up();
        assert_eq!(d.input(), "%s/foo/bar/g");
        d.on_navigate_up();
        assert_eq!(d.input(), "wq");
        assert_eq!(d.input_cursor(), 2);
        d.on_navigate_down();
        assert_eq!(d.input(), "%s/foo/bar/g");
        d.on_navigate_down();
        assert_eq!(d.input(), "e ma");
        assert!(!d.history().is_recalling());
        d.on_navigate_down();
        assert_eq!(d.input(), "e ma");
    }

    #[test]
    fn cancel_resets_recall_session() {
        let store = MemoryStore::new();
        let mut d = dialog(&store);
        run(&mut d, "a");
        run(&mut d, "b");
        prompt(&mut d);
        d.on_navigate_up();
        d.on_navigate_up();
        d.on_cancel();
        assert!(!d.is_open());
        assert!(!d.history().is_recalling());

        prompt(&mut d);
        d.on_navigate_up();
        assert_eq!(d.input(), "b");
    }

    #[test]
    fn up_on_empty_history_keeps_input() {
        let store = MemoryStore::new();
        let mut d = dialog(&store);
        prompt(&mut d);
        d.insert_text("set");
        d.on_navigate_up();
        assert_eq!(d.input(), "set");
    }

    #[test]
    fn navigation_ignored_when_closed() {
        let store = MemoryStore::new();
        let mut d = dialog(&store);
        run(&mut d, "w");
        d.on_navigate_up();
        assert_eq!(d.input(), "");
        assert_eq!(d.on_submit(), None);
    }

    #[test]
    fn search_prompts_route_to_host() {
        let store = MemoryStore::new();
        let mut d = dialog(&store);
        assert_eq!(d.open_dialog(DialogRequest::Prompt { sign: "/".into() }), DialogOpen::Search);
        assert_eq!(d.open_dialog(DialogRequest::Prompt { sign: "?".into() }), DialogOpen::Search);
        assert!(!d.is_open());
    }

    #[test]
    fn prompt_hides_mode_and_shows_sign() {
        let store = MemoryStore::new();
        let mut d = dialog(&store);
        d.update_status("Normal");
        prompt(&mut d);
        let s = d.status();
        assert_eq!(s.mode, None);
        assert_eq!(s.sign, ":");
        assert_eq!(s.input, Some(""));
        d.on_cancel();
        let s = d.status();
        assert_eq!(s.mode, Some("-- Normal --"));
        assert_eq!(s.sign, "");
        assert_eq!(s.input, None);
    }

    #[test]
    fn notice_replaces_mode_text() {
        let store = MemoryStore::new();
        let mut d = dialog(&store);
        assert_eq!(d.open_dialog(DialogRequest::Notice("recording @q".into())), DialogOpen::Notice);
        assert_eq!(d.status().mode, Some("recording @q"));
        d.on_mode_change(VimMode::Insert);
        assert_eq!(d.status().mode, Some("-- INSERT --"));
    }

    #[test]
    fn command_keys_skip_question_mark() {
        let store = MemoryStore::new();
        let mut d = dialog(&store);
        d.update_command_keys("2");
        d.update_command_keys("?");
        d.update_command_keys("d");
        assert_eq!(d.status().command_keys, "2d");
        d.clear_command_keys();
        assert_eq!(d.status().command_keys, "");
    }

    #[test]
    fn blur_keeps_mode_hidden_under_confirm() {
        let store = MemoryStore::new();
        let mut d = dialog(&store);
        d.update_status("Normal");
        d.show_confirm("replace with bar (y/n/a/q)?");
        d.on_blur();
        assert_eq!(d.status().mode, None);
        assert!(d.status().confirm.is_some());
        d.update_status("Normal");
        assert_eq!(d.status().confirm, None);
        assert_eq!(d.status().mode, Some("-- Normal --"));
    }

    #[test]
    fn attach_closes_line_and_keeps_history() {
        let store = MemoryStore::new();
        let mut d = dialog(&store);
        d.attach(EditorId(1));
        run(&mut d, "w");
        prompt(&mut d);
        d.insert_text("half");
        d.attach(EditorId(2));
        assert!(!d.is_open());
        assert_eq!(d.editor(), Some(EditorId(2)));
        assert_eq!(d.history().entries(), &["w"]);
    }

    #[test]
    fn reset_history_clears_store() {
        let store = MemoryStore::new();
        let mut d = dialog(&store);
        run(&mut d, "w");
        d.reset_history();
        assert!(d.history().is_empty());
        let reopened = dialog(&store);
        assert!(reopened.history().is_empty());
    }

    #[test]
    fn submit_clears_info_before_host_runs() {
        let store = MemoryStore::new();
        let mut d = dialog(&store);
        prompt(&mut d);
        d.set_info("old message");
        d.insert_text("foo");
        assert_eq!(d.on_submit(), Some("foo".to_string()));
        assert_eq!(d.status().info, "");
        d.set_info("Not an editor command: foo");
        assert_eq!(d.status().info, "Not an editor command: foo");
    }
}
