//! Runtime error types for the simulator
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! during the declaration pass or program execution (as opposed to lex, directive
//! or parse errors, which happen before anything runs).
//!
//! All runtime errors are fatal - they halt execution. Output written before
//! the error stays written.

use crate::parser::ast::SourceLocation;
use std::io;
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Duplicate class, function, method or field, or more than one constructor
    #[error("DeclarationError at line {}: {message}", .location.line)]
    Declaration {
        message: String,
        location: SourceLocation,
    },

    /// Identifier, function, class or namespace that resolves to nothing
    #[error("UnboundName at line {}: '{name}' is not declared", .location.line)]
    UnboundName {
        name: String,
        location: SourceLocation,
    },

    /// Field or method missing from a class
    #[error("UnknownMember at line {}: class '{class}' has no member '{member}'", .location.line)]
    UnknownMember {
        class: String,
        member: String,
        location: SourceLocation,
    },

    /// Call with the wrong number of arguments
    #[error(
        "ArityError at line {}: '{callee}' expects {expected} argument{}, got {got}",
        .location.line,
        if *.expected == 1 { "" } else { "s" }
    )]
    Arity {
        callee: String,
        expected: usize,
        got: usize,
        location: SourceLocation,
    },

    #[error("TypeError at line {}: expected {expected}, got {got}", .location.line)]
    Type {
        expected: String,
        got: String,
        location: SourceLocation,
    },

    /// The output sink failed
    #[error("IOError at line {}: {source}", .location.line)]
    Io {
        source: io::Error,
        location: SourceLocation,
    },

    /// The host's cancellation check fired
    #[error("Cancelled at line {}: execution stopped by the host", .location.line)]
    Cancelled { location: SourceLocation },

    /// Division or modulo by zero, 32-bit integer overflow
    #[error("ArithmeticError at line {}: {message}", .location.line)]
    Arithmetic {
        message: String,
        location: SourceLocation,
    },

    /// Runaway recursion
    #[error("StackOverflow at line {}: call depth exceeded {limit}", .location.line)]
    StackOverflow {
        limit: usize,
        location: SourceLocation,
    },

    #[error("NoEntryFunction: no 'main' function in the global namespace")]
    NoEntryFunction,
}

impl RuntimeError {
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            RuntimeError::Declaration { location, .. }
            | RuntimeError::UnboundName { location, .. }
            | RuntimeError::UnknownMember { location, .. }
            | RuntimeError::Arity { location, .. }
            | RuntimeError::Type { location, .. }
            | RuntimeError::Io { location, .. }
            | RuntimeError::Cancelled { location }
            | RuntimeError::Arithmetic { location, .. }
            | RuntimeError::StackOverflow { location, .. } => Some(location),
            RuntimeError::NoEntryFunction => None,
        }
    }

    pub(crate) fn type_error(
        expected: impl Into<String>,
        got: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        RuntimeError::Type {
            expected: expected.into(),
            got: got.into(),
            location,
        }
    }

    pub(crate) fn arithmetic(message: impl Into<String>, location: SourceLocation) -> Self {
        RuntimeError::Arithmetic {
            message: message.into(),
            location,
        }
    }

    pub(crate) fn unbound(name: impl ToString, location: SourceLocation) -> Self {
        RuntimeError::UnboundName {
            name: name.to_string(),
            location,
        }
    }
}
