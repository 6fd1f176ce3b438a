//! Viewer application state and logic

use crate::config::RunConfig;
use crate::error::{ErrorKind, InterpreterError};
use crate::output::BufferSink;
use crate::ui::panes::{
    render_console_pane, render_source_pane, render_status_bar, render_tokens_pane,
};
use crate::ExitCode;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tracing::debug;

/// Lines scrolled by PageUp/PageDown
const PAGE: usize = 10;

/// Deadline for a viewed run when the host sets no limit
pub const DEFAULT_VIEW_TIMEOUT: Duration = Duration::from_secs(5);

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Console,
    Tokens,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: source -> console -> tokens)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Console,
            FocusedPane::Console => FocusedPane::Tokens,
            FocusedPane::Tokens => FocusedPane::Source,
        }
    }

    /// Move focus to the previous pane (counter-clockwise)
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Tokens,
            FocusedPane::Console => FocusedPane::Source,
            FocusedPane::Tokens => FocusedPane::Console,
        }
    }
}

/// How the viewed run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Exited(ExitCode),
    Failed {
        kind: ErrorKind,
        line: Option<usize>,
        message: String,
    },
}

impl RunOutcome {
    pub fn from_result(result: Result<ExitCode, InterpreterError>) -> Self {
        match result {
            Ok(status) => RunOutcome::Exited(status),
            Err(err) => RunOutcome::Failed {
                kind: err.kind(),
                line: err.line(),
                message: err.to_string(),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }

    pub fn error_line(&self) -> Option<usize> {
        match self {
            RunOutcome::Failed { line, .. } => *line,
            RunOutcome::Exited(_) => None,
        }
    }
}

/// `config`, with the default deadline added when it has no limits.
fn bounded(config: &RunConfig) -> RunConfig {
    let config = config.clone();
    if config.max_steps.is_none() && config.timeout.is_none() {
        return config.with_timeout(DEFAULT_VIEW_TIMEOUT);
    }
    config
}

/// Main application state
pub struct App {
    source_code: String,
    output: Vec<String>,
    token_rows: Vec<String>,
    outcome: RunOutcome,

    focused_pane: FocusedPane,
    source_scroll: usize,
    console_scroll: usize,
    tokens_scroll: usize,

    should_quit: bool,
    status_message: String,
}

impl App {
    pub fn new(
        source_code: String,
        output: Vec<String>,
        token_rows: Vec<String>,
        outcome: RunOutcome,
    ) -> Self {
        let status_message = match &outcome {
            RunOutcome::Exited(status) => format!("Program exited with status {}", status),
            RunOutcome::Failed { message, .. } => message.clone(),
        };
        let mut app = App {
            source_code,
            output,
            token_rows,
            outcome,
            focused_pane: FocusedPane::Source,
            source_scroll: 0,
            console_scroll: 0,
            tokens_scroll: 0,
            should_quit: false,
            status_message,
        };
        app.jump_to_error();
        app
    }

    /// Run `source` to completion into a buffer and collect what the panes show.
    ///
    /// The token listing is empty when the source does not lex or its
    /// directives do not balance; the outcome carries that error instead.
    /// A config without limits runs under [`DEFAULT_VIEW_TIMEOUT`], so a
    /// program that never ends still opens with a `Cancelled` outcome.
    pub fn load(source_code: String, config: &RunConfig) -> Self {
        let config = bounded(config);
        let mut sink = BufferSink::new();
        let result = crate::run_with_config(&source_code, &config, &mut sink);
        let token_rows = crate::tokenize_and_filter(&source_code, &config.macros)
            .map(|tokens| tokens.iter().map(|t| t.listing_row()).collect())
            .unwrap_or_default();
        let outcome = RunOutcome::from_result(result);
        debug!(?outcome, lines = sink.lines().len(), "loaded program for viewing");
        App::new(source_code, sink.lines(), token_rows, outcome)
    }

    pub fn outcome(&self) -> &RunOutcome {
        &self.outcome
    }

    pub fn focused_pane(&self) -> FocusedPane {
        self.focused_pane
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI: source on the left, console over tokens on the right,
    /// status bar at the bottom.
    pub fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[1]);

        render_source_pane(
            frame,
            columns[0],
            &self.source_code,
            self.outcome.error_line(),
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );
        render_console_pane(
            frame,
            right[0],
            &self.output,
            self.focused_pane == FocusedPane::Console,
            &mut self.console_scroll,
        );
        render_tokens_pane(
            frame,
            right[1],
            &self.token_rows,
            self.focused_pane == FocusedPane::Tokens,
            &mut self.tokens_scroll,
        );
        render_status_bar(frame, main_chunks[1], &self.status_message, &self.outcome);
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Char('e') => {
                if self.jump_to_error() {
                    self.focused_pane = FocusedPane::Source;
                } else {
                    self.status_message = "No error to show".to_string();
                }
            }
            KeyCode::Up => self.scroll_by(|s| s.saturating_sub(1)),
            KeyCode::Down => self.scroll_by(|s| s.saturating_add(1)),
            KeyCode::PageUp => self.scroll_by(|s| s.saturating_sub(PAGE)),
            KeyCode::PageDown => self.scroll_by(|s| s.saturating_add(PAGE)),
            KeyCode::Home => self.scroll_by(|_| 0),
            // Clamped to the last page on the next render
            KeyCode::End => self.scroll_by(|_| usize::MAX),
            _ => {}
        }
    }

    fn scroll_by(&mut self, f: impl FnOnce(usize) -> usize) {
        let scroll = match self.focused_pane {
            FocusedPane::Source => &mut self.source_scroll,
            FocusedPane::Console => &mut self.console_scroll,
            FocusedPane::Tokens => &mut self.tokens_scroll,
        };
        *scroll = f(*scroll);
    }

    /// Scroll the source so the error line sits a few rows from the top.
    fn jump_to_error(&mut self) -> bool {
        match self.outcome.error_line() {
            Some(line) if line > 0 => {
                self.source_scroll = line.saturating_sub(4);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    const FAILING: &str = "int main() {\n  int x = 1;\n  int y = 2;\n  int z = 3;\n  int w = 4;\n  cout << x;\n  return x / 0;\n}\n";

    #[test]
    fn test_focus_cycle() {
        let mut focus = FocusedPane::Source;
        for _ in 0..3 {
            focus = focus.next();
        }
        assert_eq!(focus, FocusedPane::Source);
        assert_eq!(FocusedPane::Source.prev(), FocusedPane::Tokens);
        assert_eq!(FocusedPane::Tokens.next().prev(), FocusedPane::Tokens);
    }

    #[test]
    fn test_load_successful_run() {
        let source = "using namespace std;\nint main() { cout << \"hi\" << endl << 2; return 3; }\n";
        let app = App::load(source.to_string(), &RunConfig::new());
        assert_eq!(app.outcome(), &RunOutcome::Exited(3));
        assert_eq!(app.output, vec!["hi".to_string(), "2".to_string()]);
        assert!(!app.token_rows.is_empty());
        assert_eq!(app.source_scroll, 0);
    }

    #[test]
    fn test_load_failed_run_keeps_output() {
        let app = App::load(FAILING.to_string(), &RunConfig::new());
        match app.outcome() {
            RunOutcome::Failed { kind, line, .. } => {
                assert_eq!(*kind, ErrorKind::ArithmeticError);
                assert_eq!(*line, Some(7));
            }
            other => panic!("expected a failure, got {:?}", other),
        }
        assert_eq!(app.output, vec!["1".to_string()]);
        assert_eq!(app.source_scroll, 3);
        assert!(app.status_message.starts_with("ArithmeticError at line 7"));
    }

    #[test]
    fn test_unlimited_config_gets_a_deadline() {
        let config = bounded(&RunConfig::new().with_macros(["DEBUG"]));
        assert_eq!(config.timeout, Some(DEFAULT_VIEW_TIMEOUT));
        assert!(config.macros.is_defined("DEBUG"));

        let config = bounded(&RunConfig::new().with_max_steps(10));
        assert_eq!(config.timeout, None);
        assert_eq!(config.max_steps, Some(10));
    }

    #[test]
    fn test_endless_program_loads_cancelled() {
        let source = "int main() {\n  while (true) {}\n  return 0;\n}\n";
        let app = App::load(source.to_string(), &RunConfig::new().with_max_steps(1000));
        match app.outcome() {
            RunOutcome::Failed { kind, .. } => assert_eq!(*kind, ErrorKind::Cancelled),
            other => panic!("expected a cancelled run, got {:?}", other),
        }

        let app = App::load(
            source.to_string(),
            &RunConfig::new().with_timeout(Duration::from_millis(20)),
        );
        assert!(app.status_message.starts_with("Cancelled at line 2"));
    }

    #[test]
    fn test_lex_failure_has_no_token_rows() {
        let app = App::load("int main() { return $; }".to_string(), &RunConfig::new());
        assert!(app.token_rows.is_empty());
        assert!(app.outcome().is_failure());
    }

    #[test]
    fn test_keys_scroll_focused_pane() {
        let mut app = App::load(FAILING.to_string(), &RunConfig::new());
        app.handle_key_event(key(KeyCode::Tab));
        assert_eq!(app.focused_pane(), FocusedPane::Console);
        app.handle_key_event(key(KeyCode::Down));
        app.handle_key_event(key(KeyCode::PageDown));
        assert_eq!(app.console_scroll, 11);
        app.handle_key_event(key(KeyCode::Home));
        assert_eq!(app.console_scroll, 0);
        assert_eq!(app.source_scroll, 3);

        app.handle_key_event(key(KeyCode::BackTab));
        app.handle_key_event(key(KeyCode::Home));
        assert_eq!(app.source_scroll, 0);
        app.handle_key_event(key(KeyCode::Tab));
        app.handle_key_event(key(KeyCode::Char('e')));
        assert_eq!(app.focused_pane(), FocusedPane::Source);
        assert_eq!(app.source_scroll, 3);

        app.handle_key_event(key(KeyCode::Char('q')));
        assert!(app.should_quit());
    }

    #[test]
    fn test_render_clamps_scroll() {
        let mut app = App::load(FAILING.to_string(), &RunConfig::new());
        app.handle_key_event(key(KeyCode::End));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        // Eight source lines fit in the pane, so the offset snaps back to 0
        assert_eq!(app.source_scroll, 0);
    }
}
