//! Turning the Vim key map and the status bar on and off.
//!
//! The on/off choice is a persisted flag; every active-editor change re-reads
//! it and reconfigures whichever editor is now in front.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::dialog::CommandDialog;
use crate::keymap::{Editor, EditorId, EditorOption, ExtraKeys, KeyMap, KeymapHooks, VimMode};
use crate::store::{get_as, set_as, KvStore};

pub const ENABLED_KEY: &str = "vim_enabled";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Shown,
    Hidden,
    NoEditor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    Enabled(EditorId),
    Disabled(EditorId),
}

pub struct Lifecycle {
    dialog: CommandDialog,
    prefs: Box<dyn KvStore>,
    enabled_by_default: bool,
    last_written: Option<bool>,
    bar_visible: bool,
    // Bindings each editor had before the Vim key map replaced them.
    saved_extra_keys: BTreeMap<EditorId, Option<ExtraKeys>>,
    events: Vec<LifecycleEvent>,
}

impl Lifecycle {
    pub fn new(dialog: CommandDialog, prefs: Box<dyn KvStore>, enabled_by_default: bool) -> Self {
        Self {
            dialog,
            prefs,
            enabled_by_default,
            last_written: None,
            bar_visible: false,
            saved_extra_keys: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    /// First look at the host. The bar starts hidden and is only shown when
    /// the stored preference says so.
    pub fn init(&mut self, editor: Option<&mut dyn Editor>) -> Transition {
        let Some(editor) = editor else {
            return Transition::NoEditor;
        };
        self.remember_extra_keys(&*editor);
        if self.is_enabled() {
            self.show(editor);
            Transition::Shown
        } else {
            Transition::Hidden
        }
    }

    pub fn on_active_editor_change(&mut self, editor: Option<&mut dyn Editor>) -> Transition {
        let Some(editor) = editor else {
            return Transition::NoEditor;
        };
        self.remember_extra_keys(&*editor);
        if self.is_enabled() {
            self.show(editor);
            Transition::Shown
        } else {
            self.hide(editor);
            Transition::Hidden
        }
    }

    pub fn toggle(&mut self, editor: Option<&mut dyn Editor>) -> Transition {
        let on = !self.is_enabled();
        info!(target: "exbar", "vim bar toggled {}", if on { "on" } else { "off" });
        self.write_enabled(on);
        self.on_active_editor_change(editor)
    }

    /// Reads the stored flag. Missing means the configured default; an
    /// unreadable store falls back to what this session last wrote.
    pub fn is_enabled(&self) -> bool {
        match get_as::<bool>(self.prefs.as_ref(), ENABLED_KEY) {
            Ok(Some(v)) => v,
            Ok(None) => self.last_written.unwrap_or(self.enabled_by_default),
            Err(e) => {
                warn!(target: "exbar", "enabled flag unreadable: {}", e);
                self.last_written.unwrap_or(self.enabled_by_default)
            }
        }
    }

    pub fn bar_visible(&self) -> bool {
        self.bar_visible
    }

    /// The host's "Enable Vim" menu item mirrors the bar.
    pub fn menu_checked(&self) -> bool {
        self.bar_visible
    }

    pub fn dialog(&self) -> &CommandDialog {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut CommandDialog {
        &mut self.dialog
    }

    pub fn take_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.events)
    }

    fn show(&mut self, editor: &mut dyn Editor) {
        let id = editor.id();
        self.bar_visible = true;
        self.dialog.attach(id);
        self.dialog.on_mode_change(VimMode::Normal);
        editor.set_option(EditorOption::ExtraKeys(None));
        editor.set_option(EditorOption::ShowCursorWhenSelecting(true));
        editor.set_option(EditorOption::KeyMap(KeyMap::Vim));
        self.write_enabled(true);
        self.events.push(LifecycleEvent::Enabled(id));
        debug!(target: "exbar", "vim key map attached to editor {:?}", id);
    }

    fn hide(&mut self, editor: &mut dyn Editor) {
        let id = editor.id();
        self.bar_visible = false;
        self.dialog.on_blur();
        self.dialog.clear_command_keys();
        let restored = self.saved_extra_keys.get(&id).cloned().flatten();
        editor.set_option(EditorOption::ExtraKeys(restored));
        editor.set_option(EditorOption::ShowCursorWhenSelecting(false));
        editor.set_option(EditorOption::KeyMap(KeyMap::Default));
        self.write_enabled(false);
        self.events.push(LifecycleEvent::Disabled(id));
        debug!(target: "exbar", "vim key map detached from editor {:?}", id);
    }

    fn remember_extra_keys(&mut self, editor: &dyn Editor) {
        // Only a default-keyed editor still has its own bindings to save.
        if editor.key_map() == KeyMap::Default {
            self.saved_extra_keys
                .entry(editor.id())
                .or_insert_with(|| editor.extra_keys());
        }
    }

    fn write_enabled(&mut self, on: bool) {
        self.last_written = Some(on);
        if let Err(e) = set_as(self.prefs.as_mut(), ENABLED_KEY, &on) {
            warn!(target: "exbar", "enabled flag not persisted: {}", e);
        }
    }
}
