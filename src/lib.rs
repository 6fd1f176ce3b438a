//! # Introduction
//!
//! cppsim parses and executes a small, statically-scoped subset of C++:
//! namespaces, classes with fields, methods and constructors, free
//! functions, the usual statements, and console output through
//! `std::cout`. It is a teaching tool for watching simple C++ programs run,
//! not a compiler.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Directive filter → Parser → AST → Interpreter → OutputSink
//! ```
//!
//! 1. [`parser`] tokenises the source, resolves `#ifdef`/`#ifndef` against a
//!    host-supplied [`MacroTable`], and builds an AST.
//! 2. [`interpreter`] registers every declaration, then runs `main`.
//! 3. [`memory`] holds the runtime model: tagged [`memory::value::Value`]s,
//!    call frames with block scopes, and reference-counted objects.
//! 4. [`output`] receives everything written with `cout`.
//! 5. [`ui`] is the ratatui-based viewer; not part of the stable library API.
//!
//! ## Quick start
//!
//! ```
//! use cppsim::{run, output::BufferSink, parser::preprocessor::MacroTable};
//!
//! let source = r#"
//!     #include <iostream>
//!     using namespace std;
//!     int main() { cout << "a" << 1 << endl; return 0; }
//! "#;
//! let mut sink = BufferSink::new();
//! let status = run(source, &MacroTable::new(), &mut sink).unwrap();
//! assert_eq!(status, 0);
//! assert_eq!(sink.contents(), "a1\n");
//! ```

pub mod config;
pub mod error;
pub mod interpreter;
pub mod memory;
pub mod output;
pub mod parser;
pub mod ui;

pub use config::RunConfig;
pub use error::{ErrorKind, InterpreterError};
pub use parser::preprocessor::MacroTable;

use interpreter::cancel::{CancelCheck, NeverCancel};
use interpreter::check;
use interpreter::engine::Interpreter;
use interpreter::errors::RuntimeError;
use interpreter::symbols::SymbolTable;
use output::OutputSink;
use parser::ast::TranslationUnit;
use parser::lexer::Token;
use tracing::debug;

/// Program exit status: the value returned by `main`
pub type ExitCode = i32;

/// Lex `source` and drop everything excluded by conditional directives.
pub fn tokenize_and_filter(
    source: &str,
    macros: &MacroTable,
) -> Result<Vec<Token>, InterpreterError> {
    let tokens = parser::lexer::tokenize(source)?;
    debug!(tokens = tokens.len(), "lexed source");
    let filtered = parser::preprocessor::filter(tokens, macros)?;
    debug!(tokens = filtered.len(), macros = macros.len(), "filtered directives");
    Ok(filtered)
}

/// Lex, filter and parse `source` into a translation unit.
pub fn parse_source(
    source: &str,
    macros: &MacroTable,
) -> Result<TranslationUnit, InterpreterError> {
    let tokens = tokenize_and_filter(source, macros)?;
    let unit = parser::parse::parse(tokens)?;
    debug!(declarations = unit.declarations.len(), "parsed translation unit");
    Ok(unit)
}

/// Parse and declare `source`, then report names that resolve to nothing.
///
/// Findings are warnings; [`run`] logs the same ones and carries on.
pub fn check_source(
    source: &str,
    macros: &MacroTable,
) -> Result<Vec<RuntimeError>, InterpreterError> {
    let unit = parse_source(source, macros)?;
    let symbols = SymbolTable::declare(&unit)?;
    Ok(check::check(&unit, &symbols))
}

/// Run a program to completion, writing its console output to `sink`.
pub fn run(
    source: &str,
    macros: &MacroTable,
    sink: &mut dyn OutputSink,
) -> Result<ExitCode, InterpreterError> {
    run_with_cancel(source, macros, sink, &NeverCancel)
}

/// Like [`run`], polling `cancel` at every statement, loop iteration and call.
///
/// The sink is flushed before returning, whether the run succeeded or not.
pub fn run_with_cancel(
    source: &str,
    macros: &MacroTable,
    sink: &mut dyn OutputSink,
    cancel: &dyn CancelCheck,
) -> Result<ExitCode, InterpreterError> {
    let result = execute(source, macros, &mut *sink, cancel);
    let flushed = sink.flush();

    let status = result?;
    if let Err(source) = flushed {
        return Err(RuntimeError::Io {
            source,
            location: Default::default(),
        }
        .into());
    }
    Ok(status)
}

/// Run with the macros and limits of a [`RunConfig`].
pub fn run_with_config(
    source: &str,
    config: &RunConfig,
    sink: &mut dyn OutputSink,
) -> Result<ExitCode, InterpreterError> {
    let cancel = config.cancel_check();
    run_with_cancel(source, &config.macros, sink, &cancel)
}

fn execute(
    source: &str,
    macros: &MacroTable,
    sink: &mut dyn OutputSink,
    cancel: &dyn CancelCheck,
) -> Result<ExitCode, InterpreterError> {
    let unit = parse_source(source, macros)?;
    let mut interpreter = Interpreter::new(&unit, sink, cancel)?;
    check::check(&unit, &interpreter.symbols);
    let status = interpreter.run()?;
    debug!(status, "program finished");
    Ok(status)
}
