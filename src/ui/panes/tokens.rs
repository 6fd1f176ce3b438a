//! Token listing pane

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the filtered token stream, one `line:col kind lexeme` row each.
///
/// Rows are preformatted so the pane does not need to re-lex on every frame.
pub fn render_tokens_pane(
    frame: &mut Frame,
    area: Rect,
    rows: &[String],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(format!(" Tokens ({}) ", rows.len()))
        .borders(Borders::ALL)
        .border_style(super::border_style(is_focused));

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = super::clamp_scroll(*scroll_offset, rows.len(), visible_height);

    let visible: Vec<Line> = rows
        .iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|row| Line::styled(row.as_str(), Style::default().fg(DEFAULT_THEME.text)))
        .collect();

    frame.render_widget(Paragraph::new(visible).block(block), area);
}
