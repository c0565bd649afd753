use std::path::PathBuf;

use tracing::{info, warn};

use crate::strings;

use super::App;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExCommand {
    Write { path: Option<PathBuf> },
    Quit { force: bool },
    WriteQuit,
    Edit(PathBuf),
    BufferNext,
    BufferPrev,
    GotoLine(usize),
    History,
    HistoryClear,
    SetVim(bool),
    Missing(&'static str),
    Unknown(String),
}

/// Very small parser: `name[!] [arg]`, leading colons and spaces ignored.
pub fn parse(input: &str) -> ExCommand {
    let s = input.trim().trim_start_matches(':').trim();
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        return ExCommand::GotoLine(s.parse().unwrap_or(usize::MAX));
    }
    let mut parts = s.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("");
    let arg = parts.next().unwrap_or("").trim();
    match name {
        "w" | "write" => ExCommand::Write {
            path: (!arg.is_empty()).then(|| PathBuf::from(arg)),
        },
        "q" | "quit" => ExCommand::Quit { force: false },
        "q!" | "quit!" => ExCommand::Quit { force: true },
        "wq" | "x" | "xit" => ExCommand::WriteQuit,
        "e" | "edit" => {
            if arg.is_empty() {
                ExCommand::Missing("file name")
            } else {
                ExCommand::Edit(PathBuf::from(arg))
            }
        }
        "bn" | "bnext" => ExCommand::BufferNext,
        "bp" | "bprev" | "bprevious" | "bN" | "bNext" => ExCommand::BufferPrev,
        "his" | "history" => match arg {
            "" => ExCommand::History,
            "clear" | "c" => ExCommand::HistoryClear,
            _ => ExCommand::Unknown(s.to_string()),
        },
        "set" | "se" => match arg {
            "vim" => ExCommand::SetVim(true),
            "novim" => ExCommand::SetVim(false),
            "" => ExCommand::Missing("option"),
            _ => ExCommand::Unknown(s.to_string()),
        },
        _ => ExCommand::Unknown(s.to_string()),
    }
}

impl App {
    /// Runs a submitted ex command; the outcome lands in the bar's info
    /// field.
    pub fn execute_ex(&mut self, input: &str) {
        let cmd = parse(input);
        info!(target: "tui", "execute ex: {:?}", cmd);
        match cmd {
            ExCommand::Write { path } => {
                self.write_current(path);
            }
            ExCommand::Quit { force } => self.quit(force),
            ExCommand::WriteQuit => {
                if self.write_current(None) {
                    self.quit(false);
                }
            }
            ExCommand::Edit(path) => {
                if let Err(e) = self.open_document(path.clone()) {
                    warn!(target: "tui", "open {} failed: {:#}", path.display(), e);
                    self.set_info(strings::error_line(&e));
                }
            }
            ExCommand::BufferNext => self.select_next_doc(),
            ExCommand::BufferPrev => self.select_prev_doc(),
            ExCommand::GotoLine(n) => self.current_doc_mut().goto_line(n),
            ExCommand::History => {
                let entries = self.lifecycle.dialog().history().entries();
                let msg = strings::history_summary(entries);
                self.set_info(msg);
            }
            ExCommand::HistoryClear => {
                self.lifecycle.dialog_mut().reset_history();
                self.set_info(strings::HISTORY_CLEARED);
            }
            ExCommand::SetVim(on) => {
                if self.lifecycle.is_enabled() != on {
                    self.toggle_vim();
                }
            }
            ExCommand::Missing(what) => self.set_info(strings::argument_required(what)),
            ExCommand::Unknown(name) => self.set_info(strings::not_an_editor_command(&name)),
        }
        self.dirty = true;
    }

    /// Returns false when nothing could be written.
    fn write_current(&mut self, path: Option<PathBuf>) -> bool {
        let doc = &mut self.docs[self.current];
        if let Some(p) = path {
            doc.name = p.display().to_string();
            doc.path = Some(p);
        }
        let Some(target) = doc.path.clone() else {
            self.set_info(strings::NO_FILE_NAME);
            return false;
        };
        match crate::persist::save_document(&target, &doc.lines) {
            Ok(bytes) => {
                doc.modified = false;
                let msg = strings::written(&target.display().to_string(), doc.lines.len(), bytes);
                self.set_info(msg);
                true
            }
            Err(e) => {
                warn!(target: "tui", "write {} failed: {:#}", target.display(), e);
                self.set_info(strings::error_line(&e));
                false
            }
        }
    }

    pub fn quit(&mut self, force: bool) {
        if !force && self.docs.iter().any(|d| d.modified) {
            self.set_info(strings::NO_WRITE_SINCE_CHANGE);
            return;
        }
        self.should_quit = true;
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.lifecycle.dialog_mut().set_info(text);
    }
}
