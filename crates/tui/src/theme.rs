use ratatui::style::Color;

pub struct Theme {
    pub border_focus: Color,
    pub border_inactive: Color,
    pub editor_border: Color,
    pub gutter_fg: Color,
    pub sidebar_selected_fg: Color,
    pub sidebar_selected_bg: Color,
    pub find_hit_bg: Color,
    pub find_current_bg: Color,
    pub bar_mode_fg: Color,
    pub bar_keys_fg: Color,
    pub bar_info_fg: Color,
}

pub const THEME: Theme = Theme {
    border_focus: Color::Cyan,
    border_inactive: Color::DarkGray,
    editor_border: Color::DarkGray,
    gutter_fg: Color::DarkGray,
    sidebar_selected_fg: Color::Black,
    sidebar_selected_bg: Color::Cyan,
    find_hit_bg: Color::DarkGray,
    find_current_bg: Color::Yellow,
    bar_mode_fg: Color::Green,
    bar_keys_fg: Color::Yellow,
    bar_info_fg: Color::Gray,
};
