//! Seams with the host editor and its keymap engine.
//!
//! The engine is handed a `&mut dyn KeymapHooks` when it needs to show a
//! prompt or report status; the lifecycle drives the editor through
//! [`Editor::set_option`].

use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeyMap {
    #[default]
    Default,
    Vim,
}

/// Host key bindings layered on top of the key map (key name to command id).
pub type ExtraKeys = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorOption {
    KeyMap(KeyMap),
    ExtraKeys(Option<ExtraKeys>),
    ShowCursorWhenSelecting(bool),
}

pub trait Editor {
    fn id(&self) -> EditorId;
    fn set_option(&mut self, option: EditorOption);
    fn extra_keys(&self) -> Option<ExtraKeys>;
    fn key_map(&self) -> KeyMap;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VimMode {
    #[default]
    Normal,
    Insert,
    Visual,
    VisualLine,
    Replace,
}

impl VimMode {
    pub fn label(&self) -> &'static str {
        match self {
            VimMode::Normal => "NORMAL",
            VimMode::Insert => "INSERT",
            VimMode::Visual => "VISUAL",
            VimMode::VisualLine => "VISUAL LINE",
            VimMode::Replace => "REPLACE",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogRequest {
    /// Open the command line behind `sign` (`:` for ex commands).
    Prompt { sign: String },
    /// Show text in place of the mode label, e.g. "recording @q".
    Notice(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogOpen {
    Opened,
    /// `/` and `?` prompts go to the host's own find instead.
    Search,
    Notice,
}

pub trait KeymapHooks {
    fn open_dialog(&mut self, request: DialogRequest) -> DialogOpen;
    fn update_status(&mut self, mode: &str);
    fn update_command_keys(&mut self, key: &str);
    fn clear_command_keys(&mut self);

    fn on_mode_change(&mut self, mode: VimMode) {
        self.update_status(mode.label());
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        status: Vec<String>,
    }

    impl KeymapHooks for Recorder {
        fn open_dialog(&mut self, _request: DialogRequest) -> DialogOpen {
            DialogOpen::Opened
        }
        fn update_status(&mut self, mode: &str) {
            self.status.push(mode.to_string());
        }
        fn update_command_keys(&mut self, _key: &str) {}
        fn clear_command_keys(&mut self) {}
    }

    #[test]
    fn editors_start_in_default_key_map() {
        assert_eq!(KeyMap::default(), KeyMap::Default);
        let mut saved: BTreeMap<EditorId, KeyMap> = BTreeMap::new();
        saved.insert(EditorId(2), KeyMap::Vim);
        saved.insert(EditorId(1), KeyMap::default());
        let ids: Vec<EditorId> = saved.keys().copied().collect();
        assert_eq!(ids, vec![EditorId(1), EditorId(2)]);
    }

    #[test]
    fn mode_change_reports_label() {
        let mut hooks = Recorder::default();
        hooks.on_mode_change(VimMode::VisualLine);
        hooks.on_mode_change(VimMode::Replace);
        assert_eq!(hooks.status, vec!["VISUAL LINE", "REPLACE"]);
    }
}
