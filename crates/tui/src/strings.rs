// Centralized UI strings and labels. ASCII-friendly by default.

use unicode_width::UnicodeWidthStr;

// UI block titles (keep surrounding spaces for visual padding)
pub const TITLE_DOCUMENTS: &str = " Documents ";
pub const TITLE_HELP: &str = " Help / Shortcuts ";
pub const TITLE_FIND: &str = " Find ";

pub const MODIFIED_MARK: &str = "[+]";

// Info messages shown in the Vim bar
pub const NO_FILE_NAME: &str = "No file name";
pub const NO_WRITE_SINCE_CHANGE: &str = "No write since last change (add ! to override)";
pub const HISTORY_CLEARED: &str = "Command history cleared";

pub fn not_an_editor_command(cmd: &str) -> String {
    format!("Not an editor command: {}", cmd)
}

pub fn argument_required(what: &str) -> String {
    format!("Argument required: {}", what)
}

pub fn pattern_not_found(q: &str) -> String {
    format!("Pattern not found: {}", q)
}

pub fn written(name: &str, lines: usize, bytes: usize) -> String {
    format!("\"{}\" {}L, {}B written", name, lines, bytes)
}

// Single line; the bar has no room for anyhow's cause chain on separate lines.
pub fn error_line(err: &anyhow::Error) -> String {
    format!("E: {:#}", err)
}

// Example: "3 in history: w | wq | %s/foo/bar/g" (newest last)
pub fn history_summary(entries: &[String]) -> String {
    if entries.is_empty() {
        return "History is empty".to_string();
    }
    const SHOWN: usize = 5;
    let start = entries.len().saturating_sub(SHOWN);
    let mut out = format!("{} in history: ", entries.len());
    if start > 0 {
        out.push_str("... | ");
    }
    out.push_str(&entries[start..].join(" | "));
    out
}

/// Key map label for the bottom status line.
pub fn key_map_label(vim: bool) -> &'static str {
    if vim {
        "Vim"
    } else {
        "Default"
    }
}

// Build the bottom status line with width-aware compaction.
// - doc: document name, `modified` appends a marker
// - line_disp/col_disp: caret location (1-based display)
// - history_len: ex command history length
// - find_info: Some((query, current_index_1_based, total_hits))
// - max_width: available width for the status text
#[allow(clippy::too_many_arguments)]
pub fn build_status_line(
    doc: &str,
    modified: bool,
    line_disp: usize,
    col_disp: usize,
    key_map: &str,
    history_len: usize,
    find_info: Option<(&str, usize, usize)>,
    max_width: u16,
) -> String {
    let mut segments: Vec<String> = Vec::new();
    if modified {
        segments.push(format!("{} {}", doc, MODIFIED_MARK));
    } else {
        segments.push(doc.to_string());
    }
    segments.push(format!("[{}] L{} C{}", key_map, line_disp, col_disp));
    segments.push(format!("Hist:{}", history_len));
    if let Some((q, cur, total)) = find_info {
        segments.push(if total > 0 {
            format!("Find:{} ({}/{})", q, cur, total)
        } else {
            format!("Find:{} (0/0)", q)
        });
    }
    // Hints ordered by importance; will be appended if space allows.
    let hints: [&str; 4] = [
        "F2: vim on/off",
        "Ctrl+N/P: next/prev doc",
        "Ctrl+Q: quit",
        "F1: help",
    ];
    for h in hints {
        segments.push(h.to_string());
    }

    let sep = "  |  ";
    let mut out = String::new();
    let mut used = 0usize;
    for (i, seg) in segments.iter().enumerate() {
        let segw = UnicodeWidthStr::width(seg.as_str());
        let addw = segw
            + if i == 0 {
                0
            } else {
                UnicodeWidthStr::width(sep)
            };
        if used + addw > max_width as usize {
            break;
        }
        if i > 0 {
            out.push_str(sep);
            used += UnicodeWidthStr::width(sep);
        }
        out.push_str(seg);
        used += segw;
    }
    out
}

// ASCII help lines content; UI maps to styled lines.
pub fn help_lines_ascii() -> &'static [&'static str] {
    &[
        "Basic",
        "  F2: Enable/disable Vim bar    F1: Open/close this panel    Ctrl+Q: Quit",
        "  Ctrl+N/Ctrl+P: Next/prev document    Ctrl+B: Show/hide documents",
        "Default key map",
        "  Type to edit    Ctrl+S: Save    Ctrl+F: Find",
        "Vim key map",
        "  i a A I o: Insert    R: Replace    v V: Visual    Esc: Normal",
        "  h j k l / Arrows: Move    0 $: Line start/end    gg G: First/last line",
        "  /pattern ?pattern: Find    n N: Next/prev match    qa ... q: Record",
        "Command line (:)",
        "  Up/Down: Recall history    Enter: Run    Esc/Ctrl-C/Ctrl-[: Cancel",
        "  Ctrl+A/E: Line start/end    Ctrl+W: Delete prev word    Ctrl+U: Kill to start",
        "Commands",
        "  :w [file]  :q  :q!  :wq  :x  :e file  :bn  :bp  :N",
        "  :history  :history clear  :set vim  :set novim",
    ]
}
