//! Crate-level error type
//!
//! Each pipeline stage owns its error type; [`InterpreterError`] wraps them
//! so a host handles one `Result`. Every variant's `Display` starts with the
//! error kind and the source line.

use crate::interpreter::errors::RuntimeError;
use crate::parser::lexer::LexError;
use crate::parser::parse::ParseError;
use crate::parser::preprocessor::DirectiveError;
use std::fmt;
use thiserror::Error;

/// Error kinds a host can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LexError,
    UnbalancedDirective,
    SyntaxError,
    DeclarationError,
    UnboundName,
    UnknownMember,
    ArityError,
    TypeError,
    IoError,
    Cancelled,
    ArithmeticError,
    StackOverflow,
    NoEntryFunction,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::LexError => "LexError",
            ErrorKind::UnbalancedDirective => "UnbalancedDirective",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::DeclarationError => "DeclarationError",
            ErrorKind::UnboundName => "UnboundName",
            ErrorKind::UnknownMember => "UnknownMember",
            ErrorKind::ArityError => "ArityError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::IoError => "IOError",
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::ArithmeticError => "ArithmeticError",
            ErrorKind::StackOverflow => "StackOverflow",
            ErrorKind::NoEntryFunction => "NoEntryFunction",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum InterpreterError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Directive(#[from] DirectiveError),

    #[error(transparent)]
    Syntax(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl InterpreterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InterpreterError::Lex(_) => ErrorKind::LexError,
            InterpreterError::Directive(_) => ErrorKind::UnbalancedDirective,
            InterpreterError::Syntax(_) => ErrorKind::SyntaxError,
            InterpreterError::Runtime(err) => match err {
                RuntimeError::Declaration { .. } => ErrorKind::DeclarationError,
                RuntimeError::UnboundName { .. } => ErrorKind::UnboundName,
                RuntimeError::UnknownMember { .. } => ErrorKind::UnknownMember,
                RuntimeError::Arity { .. } => ErrorKind::ArityError,
                RuntimeError::Type { .. } => ErrorKind::TypeError,
                RuntimeError::Io { .. } => ErrorKind::IoError,
                RuntimeError::Cancelled { .. } => ErrorKind::Cancelled,
                RuntimeError::Arithmetic { .. } => ErrorKind::ArithmeticError,
                RuntimeError::StackOverflow { .. } => ErrorKind::StackOverflow,
                RuntimeError::NoEntryFunction => ErrorKind::NoEntryFunction,
            },
        }
    }

    /// Source line the error points at; `NoEntryFunction` has none.
    pub fn line(&self) -> Option<usize> {
        match self {
            InterpreterError::Lex(err) => Some(err.location.line),
            InterpreterError::Directive(err) => Some(err.location.line),
            InterpreterError::Syntax(err) => Some(err.location.line),
            InterpreterError::Runtime(err) => err.location().map(|loc| loc.line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::SourceLocation;

    #[test]
    fn test_kind_and_line() {
        let err: InterpreterError = DirectiveError {
            message: "'#endif' without '#ifdef'".to_string(),
            location: SourceLocation::new(4, 1),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::UnbalancedDirective);
        assert_eq!(err.line(), Some(4));
        assert!(err.to_string().starts_with("UnbalancedDirective at line 4"));

        let err: InterpreterError = RuntimeError::NoEntryFunction.into();
        assert_eq!(err.kind(), ErrorKind::NoEntryFunction);
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_kind_display_matches_message_prefix() {
        let err: InterpreterError = RuntimeError::Io {
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"),
            location: SourceLocation::new(2, 1),
        }
        .into();
        assert!(err.to_string().starts_with(&err.kind().to_string()));
    }
}
