//! TUI pane rendering modules
//!
//! - [`source`]: source code with syntax highlighting and the error line
//! - [`console`]: everything the program wrote to `cout`
//! - [`tokens`]: the filtered token stream
//! - [`status`]: status bar with the run outcome and keybindings
//!
//! Each pane exports one `render_*` function; scroll offsets live in the
//! [`App`](crate::ui::App) and are clamped while rendering.

pub mod console;
pub mod source;
pub mod status;
pub mod tokens;

pub use console::render_console_pane;
pub use source::render_source_pane;
pub use status::render_status_bar;
pub use tokens::render_tokens_pane;

use crate::ui::theme::DEFAULT_THEME;
use ratatui::style::{Modifier, Style};

fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    }
}

/// Clamp a scroll offset only if content exceeds the visible area.
fn clamp_scroll(offset: usize, total: usize, visible_height: usize) -> usize {
    if total > visible_height {
        offset.min(total - visible_height)
    } else {
        0
    }
}
