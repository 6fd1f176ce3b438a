//! C++-subset front end
//!
//! This module transforms source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens, directives included)
//! - [`preprocessor`]: `#ifdef`/`#ifndef`/`#else`/`#endif` filtering against a
//!   host-supplied [`preprocessor::MacroTable`]
//! - [`parse`]: Parsing (tokens → AST), split across `declarations`,
//!   `statements` and `expressions`
//! - [`ast`]: AST node definitions
//!
//! # Supported subset
//!
//! - Namespaces (nested, reopenable) and `using namespace`
//! - Classes/structs with fields, methods and one constructor
//! - Types: `int`, `float`, `double`, `char`, `bool`, `void`, `auto`,
//!   `string`, class names
//! - Statements: declarations, `if`/`else`, `while`, `do`-`while`, `for`,
//!   `break`, `continue`, `return`, `cout` output chains
//! - No templates, inheritance, overloading, pointers or arrays

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
pub mod preprocessor;
mod statements;
