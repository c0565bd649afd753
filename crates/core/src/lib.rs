//! Ex-command line, status hooks and Vim key map toggling for a host editor.
//!
//! The host owns a [`lifecycle::Lifecycle`], which owns the
//! [`dialog::CommandDialog`], which owns the [`history::CommandHistory`].
//! Nothing here is global: two editors can each carry their own stack.

pub mod config;
pub mod dialog;
pub mod error;
pub mod history;
pub mod keymap;
pub mod lifecycle;
pub mod store;

pub use config::Config;
pub use dialog::{CommandDialog, StatusBar};
pub use error::{ConfigError, StoreError};
pub use history::CommandHistory;
pub use keymap::{
    DialogOpen, DialogRequest, Editor, EditorId, EditorOption, ExtraKeys, KeyMap, KeymapHooks,
    VimMode,
};
pub use lifecycle::{Lifecycle, LifecycleEvent, Transition};
pub use store::{JsonFileStore, KvStore, MemoryStore};
