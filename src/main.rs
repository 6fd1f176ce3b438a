// cppsim: run, inspect and view small C++-subset programs

use clap::{ArgAction, Args, Parser, Subcommand};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use cppsim::output::WriterSink;
use cppsim::ui::App;
use cppsim::{InterpreterError, MacroTable, RunConfig};

#[derive(Parser)]
#[command(name = "cppsim", version, about = "Run and inspect small C++-subset programs")]
struct Cli {
    /// Log more to stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Source file path
    file: PathBuf,
    /// Define a macro for #ifdef/#ifndef (repeatable)
    #[arg(short = 'D', long = "define", value_name = "NAME")]
    defines: Vec<String>,
}

#[derive(Args)]
struct LimitArgs {
    /// Cancel after this many statements, iterations and calls
    #[arg(long)]
    max_steps: Option<u64>,
    /// Cancel after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

impl LimitArgs {
    fn config(&self, defines: Vec<String>) -> RunConfig {
        let mut config = RunConfig::new().with_macros(defines);
        if let Some(steps) = self.max_steps {
            config = config.with_max_steps(steps);
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(ms));
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program, streaming its output to stdout
    Run {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        limits: LimitArgs,
    },
    /// Report undeclared names and bad calls without running anything
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the token stream left after conditional directives
    Tokens {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Pretty-print the parsed translation unit
    Ast {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Run a program, then browse its source, output and tokens
    ///
    /// Without limits the run is cancelled after five seconds.
    View {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        limits: LimitArgs,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = dispatch(cli.command);
    std::process::exit(code);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(level)
        .init();
}

fn dispatch(command: Commands) -> i32 {
    match command {
        Commands::Run { source, limits } => {
            let Some(text) = read_source(&source.file) else {
                return 1;
            };
            let config = limits.config(source.defines);

            let mut sink = WriterSink::new(io::stdout());
            match cppsim::run_with_config(&text, &config, &mut sink) {
                Ok(status) => status,
                Err(err) => report(&source.file, &err),
            }
        }
        Commands::Check { source } => {
            let Some(text) = read_source(&source.file) else {
                return 1;
            };
            let macros: MacroTable = source.defines.into_iter().collect();
            match cppsim::check_source(&text, &macros) {
                Ok(findings) => {
                    for finding in &findings {
                        println!("{finding}");
                    }
                    i32::from(!findings.is_empty())
                }
                Err(err) => report(&source.file, &err),
            }
        }
        Commands::Tokens { source } => {
            let Some(text) = read_source(&source.file) else {
                return 1;
            };
            let macros: MacroTable = source.defines.into_iter().collect();
            match cppsim::tokenize_and_filter(&text, &macros) {
                Ok(tokens) => {
                    let mut out = io::stdout().lock();
                    for token in &tokens {
                        if writeln!(out, "{}", token.listing_row()).is_err() {
                            return 1;
                        }
                    }
                    0
                }
                Err(err) => report(&source.file, &err),
            }
        }
        Commands::Ast { source } => {
            let Some(text) = read_source(&source.file) else {
                return 1;
            };
            let macros: MacroTable = source.defines.into_iter().collect();
            match cppsim::parse_source(&text, &macros) {
                Ok(unit) => {
                    println!("{:#?}", unit);
                    0
                }
                Err(err) => report(&source.file, &err),
            }
        }
        Commands::View { source, limits } => {
            let Some(text) = read_source(&source.file) else {
                return 1;
            };
            let config = limits.config(source.defines);
            let mut app = App::load(text, &config);
            match run_viewer(&mut app) {
                Ok(()) => 0,
                Err(err) => {
                    eprintln!("error: terminal: {err}");
                    1
                }
            }
        }
    }
}

fn read_source(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(err) => {
            eprintln!("error [{}]: {err}", path.display());
            None
        }
    }
}

fn report(path: &Path, err: &InterpreterError) -> i32 {
    eprintln!("error [{}]: {err}", path.display());
    1
}

fn run_viewer(app: &mut App) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}
