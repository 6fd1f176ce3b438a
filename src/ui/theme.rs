//! Colours shared by the viewer panes

use ratatui::style::Color;

pub struct Theme {
    /// Source text, console lines and token rows
    pub text: Color,
    /// Comments, hints and empty-pane placeholders
    pub dim: Color,
    pub bracket: Color,
    pub keyword: Color,
    /// String, character, number and boolean literals
    pub literal: Color,
    pub call: Color,
    pub type_name: Color,
    pub directive: Color,
    pub exit_ok: Color,
    /// Error badge, failing source line and its marker
    pub failure: Color,
    pub border_focused: Color,
    pub border_normal: Color,
    pub status_bg: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    text: Color::Rgb(205, 214, 244),
    dim: Color::Rgb(108, 112, 134),
    bracket: Color::Rgb(137, 180, 250),
    keyword: Color::Rgb(137, 180, 250),
    literal: Color::Rgb(250, 179, 135),
    call: Color::Rgb(249, 226, 175),
    type_name: Color::Rgb(148, 226, 213),
    directive: Color::Rgb(203, 166, 247),
    exit_ok: Color::Rgb(166, 227, 161),
    failure: Color::Rgb(243, 139, 168),
    border_focused: Color::Rgb(249, 226, 175),
    border_normal: Color::Rgb(108, 112, 134),
    status_bg: Color::Rgb(50, 50, 70),
};
