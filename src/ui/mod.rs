//! Terminal viewer built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: viewer state, keyboard event loop and pane focus
//! - **[`panes`]**: stateless render functions for each visible pane (source,
//!   console, tokens, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! Build an [`App`] with [`App::load`], which runs the program into a buffer
//! first, then call [`App::run`] to start the event loop.
//!
//! [`App::load`]: app::App::load
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::{App, FocusedPane, RunOutcome};
