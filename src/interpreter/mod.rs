//! C++ subset execution engine
//!
//! This module provides the evaluator:
//! - [`engine`]: the [`engine::Interpreter`], calls and object construction
//! - [`symbols`]: the declaration pass and namespace-aware name lookup
//! - [`check`]: warnings for names that resolve to nothing
//! - [`errors`]: runtime error types
//! - [`cancel`]: host cancellation checks
//!
//! # Execution Model
//!
//! The interpreter first registers every namespace, class and free function
//! and warns about names that resolve to nothing, then walks the body of
//! `main`. Statements, loop iterations and calls each poll the host's
//! cancellation check before running.

pub mod cancel;
pub mod check;
pub mod constants;
pub mod engine;
pub mod errors;
mod expressions;
mod jumps;
mod loops;
pub mod ops;
mod statements;
pub mod symbols;
mod type_system;
