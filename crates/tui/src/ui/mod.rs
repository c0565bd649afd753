use exbar_core::StatusBar;
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::app::{App, FindHit, FindInput};
use crate::strings::{
    build_status_line, help_lines_ascii, key_map_label, TITLE_DOCUMENTS, TITLE_FIND, TITLE_HELP,
    MODIFIED_MARK,
};
use crate::theme::THEME;

pub fn draw(f: &mut Frame, app: &mut App) {
    // Layout: optional left documents list (26), editor column
    let mut constraints: Vec<Constraint> = Vec::new();
    if app.show_sidebar {
        constraints.push(Constraint::Length(26));
    }
    constraints.push(Constraint::Min(10));
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(f.area());
    let mut idx = 0usize;
    if app.show_sidebar {
        draw_sidebar(f, chunks[idx], app);
        idx += 1;
    }
    draw_main(f, chunks[idx], app);

    if let Some(state) = &app.find_input {
        draw_find(f, f.area(), state);
    }
    if app.show_help {
        draw_help(f, f.area());
    }
}

fn draw_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let title = Span::styled(
        TITLE_DOCUMENTS,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(THEME.border_inactive));
    let inner_h = area.height.saturating_sub(2) as usize;
    let start = app.current.saturating_sub(inner_h.saturating_sub(1));
    let mut lines: Vec<Line> = Vec::new();
    for (i, d) in app.docs.iter().enumerate().skip(start).take(inner_h) {
        let prefix = if i == app.current { "> " } else { "  " };
        let style = if i == app.current {
            Style::default()
                .fg(THEME.sidebar_selected_fg)
                .bg(THEME.sidebar_selected_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let mark = if d.modified { MODIFIED_MARK } else { "" };
        lines.push(Line::from(Span::styled(
            format!("{}{}{}", prefix, d.name, mark),
            style,
        )));
    }
    let para = Paragraph::new(lines).block(block);
    f.render_widget(para, area);
}

fn draw_main(f: &mut Frame, area: Rect, app: &mut App) {
    let bar_height = if app.lifecycle.bar_visible() { 1 } else { 0 };
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(bar_height),
            Constraint::Length(1),
        ])
        .split(area);

    app.editor_area = Some(main_chunks[0]);
    app.ensure_cursor_visible(main_chunks[0].height.saturating_sub(2));

    let editor_cursor = draw_editor(f, main_chunks[0], app);
    let bar_cursor = if bar_height > 0 {
        draw_vim_bar(f, main_chunks[1], &app.lifecycle.dialog().status())
    } else {
        None
    };
    draw_status(f, main_chunks[2], app);

    // Text entry owns the cursor: find popup, then the bar, then the editor.
    if app.find_input.is_none() && !app.show_help {
        if let Some(pos) = bar_cursor.or(editor_cursor) {
            f.set_cursor_position(pos);
        }
    }
}

/// Renders the current document; returns where its cursor lands.
fn draw_editor(f: &mut Frame, area: Rect, app: &App) -> Option<Position> {
    let doc = app.current_doc();
    let border = if app.lifecycle.dialog().is_open() {
        THEME.editor_border
    } else {
        THEME.border_focus
    };
    let mut title = format!(" {} ", doc.name);
    if doc.modified {
        title.push_str(MODIFIED_MARK);
        title.push(' ');
    }
    let block = Block::default()
        .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let inner_h = area.height.saturating_sub(2) as usize;
    let gutter = gutter_width(doc.lines.len());
    let start = app.scroll as usize;
    let current_hit = app.find_hits.get(app.find_current);
    let mut lines: Vec<Line> = Vec::new();
    for (i, text) in doc.lines.iter().enumerate().skip(start).take(inner_h) {
        let mut spans = vec![Span::styled(
            format!("{:>w$} ", i + 1, w = gutter as usize - 1),
            Style::default().fg(THEME.gutter_fg),
        )];
        let hits: Vec<&FindHit> = app.find_hits.iter().filter(|h| h.line_idx == i).collect();
        spans.extend(highlight_line(text, &hits, current_hit));
        lines.push(Line::from(spans));
    }
    let para = Paragraph::new(lines).block(block);
    f.render_widget(para, area);

    if doc.row < start || doc.row >= start + inner_h {
        return None;
    }
    let x = area.x + 1 + gutter + prefix_width(&doc.lines[doc.row], doc.col);
    let y = area.y + 1 + (doc.row - start) as u16;
    if x >= area.x + area.width.saturating_sub(1) {
        return None;
    }
    Some(Position::new(x, y))
}

fn highlight_line<'a>(
    text: &'a str,
    hits: &[&FindHit],
    current: Option<&FindHit>,
) -> Vec<Span<'a>> {
    let mut spans = Vec::new();
    let mut pos = 0usize;
    for hit in hits {
        if hit.start < pos
            || hit.end > text.len()
            || !text.is_char_boundary(hit.start)
            || !text.is_char_boundary(hit.end)
        {
            continue;
        }
        if hit.start > pos {
            spans.push(Span::raw(&text[pos..hit.start]));
        }
        let is_current = current
            .map(|c| c.line_idx == hit.line_idx && c.start == hit.start)
            .unwrap_or(false);
        let style = if is_current {
            Style::default().bg(THEME.find_current_bg).fg(Color::Black)
        } else {
            Style::default().bg(THEME.find_hit_bg)
        };
        spans.push(Span::styled(&text[hit.start..hit.end], style));
        pos = hit.end;
    }
    if pos < text.len() {
        spans.push(Span::raw(&text[pos..]));
    }
    spans
}

/// The Vim bar: mode or notice, pending keys, then either the command line
/// or the info text. Returns the input cursor when the line is open.
fn draw_vim_bar(f: &mut Frame, area: Rect, status: &StatusBar<'_>) -> Option<Position> {
    let (spans, cursor_col) = bar_spans(status);
    f.render_widget(Paragraph::new(Line::from(spans)), area);
    cursor_col.map(|c| Position::new(area.x + c.min(area.width.saturating_sub(1)), area.y))
}

fn bar_spans<'a>(status: &StatusBar<'a>) -> (Vec<Span<'a>>, Option<u16>) {
    let mut spans: Vec<Span<'a>> = Vec::new();
    if let Some(confirm) = status.confirm {
        spans.push(Span::styled(confirm, Style::default().add_modifier(Modifier::BOLD)));
        spans.push(Span::raw(" "));
    }
    if let Some(mode) = status.mode {
        spans.push(Span::styled(
            mode,
            Style::default()
                .fg(THEME.bar_mode_fg)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" "));
    }
    let mut cursor = None;
    if let Some(input) = status.input {
        spans.push(Span::raw(status.sign));
        let used: usize = spans.iter().map(Span::width).sum();
        cursor = Some(used as u16 + prefix_width(input, status.input_cursor));
        spans.push(Span::raw(input));
    }
    if !status.info.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(status.info, Style::default().fg(THEME.bar_info_fg)));
    }
    if !status.command_keys.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            status.command_keys,
            Style::default().fg(THEME.bar_keys_fg),
        ));
    }
    (spans, cursor)
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let doc = app.current_doc();
    let find_info = app
        .find_query
        .as_deref()
        .map(|q| (q, app.find_current + 1, app.find_hits.len()));
    let tips = build_status_line(
        &doc.name,
        doc.modified,
        doc.row + 1,
        doc.col + 1,
        key_map_label(app.vim_active()),
        app.lifecycle.dialog().history().len(),
        find_info,
        area.width,
    );
    let help = Span::styled(tips, Style::default().fg(Color::DarkGray));
    f.render_widget(Paragraph::new(Line::from(vec![help])), area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(70, 70, area);
    let block = Block::default()
        .title(Span::styled(
            TITLE_HELP,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);
    let lines = help_lines_ascii()
        .iter()
        .map(|s| Line::from(*s))
        .collect::<Vec<Line>>();
    let para = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, popup_area);
    f.render_widget(para, popup_area);
}

fn draw_find(f: &mut Frame, area: Rect, state: &FindInput) {
    let popup_area = centered_rect(60, 20, area);
    let block = Block::default()
        .title(Span::styled(
            TITLE_FIND,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);
    let sign = if state.backwards { "?" } else { "/" };
    let lines = vec![
        Line::from("Enter a pattern, Enter to confirm, Esc to cancel:"),
        Line::from(format!("{}{}", sign, state.buffer)),
    ];
    let para = Paragraph::new(lines).block(block);
    f.render_widget(Clear, popup_area);
    f.render_widget(para, popup_area);
    let cursor_x = popup_area.x + 2 + UnicodeWidthStr::width(state.buffer.as_str()) as u16;
    let cursor_y = popup_area.y + 2;
    f.set_cursor_position(Position::new(cursor_x, cursor_y));
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1]);
    horiz[1]
}

// Digits of the largest line number plus one space, at least 3 columns.
fn gutter_width(line_count: usize) -> u16 {
    (line_count.max(1).to_string().len() as u16 + 1).max(3)
}

// Display width of the first `upto` graphemes.
fn prefix_width(s: &str, upto: usize) -> u16 {
    s.graphemes(true)
        .take(upto)
        .map(UnicodeWidthStr::width)
        .sum::<usize>() as u16
}
