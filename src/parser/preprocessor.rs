//! Conditional-compilation filter
//!
//! Runs between the lexer and the parser. Directive tokens are resolved
//! against a host-supplied [`MacroTable`] and removed; tokens inside an
//! inactive `#ifdef`/`#ifndef` branch are dropped. Nothing is expanded:
//! `#define` lines are ignored, so the macro table is the only source of
//! truth.

use super::ast::SourceLocation;
use super::lexer::Token;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Macro name → defined flag, populated by the host only.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    entries: FxHashMap<String, bool>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: impl Into<String>) {
        self.entries.insert(name.into(), true);
    }

    pub fn undefine(&mut self, name: impl Into<String>) {
        self.entries.insert(name.into(), false);
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.entries.get(name).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.values().filter(|defined| **defined).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: Into<String>> FromIterator<S> for MacroTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = MacroTable::new();
        for name in iter {
            table.define(name);
        }
        table
    }
}

#[derive(Debug, Clone, Error)]
#[error("UnbalancedDirective at line {}: {message}", .location.line)]
pub struct DirectiveError {
    pub message: String,
    pub location: SourceLocation,
}

/// One open `#ifdef`/`#ifndef` block.
#[derive(Debug)]
struct Conditional {
    name: String,
    active: bool,
    seen_else: bool,
    location: SourceLocation,
}

/// Resolve every directive token in `tokens` against `macros`.
pub fn filter(
    tokens: Vec<Token>,
    macros: &MacroTable,
) -> Result<Vec<Token>, DirectiveError> {
    let mut frames: Vec<Conditional> = Vec::new();
    let mut output = Vec::with_capacity(tokens.len());
    let mut dropped = 0usize;

    for token in tokens {
        let (name, argument, location) = match token {
            Token::Directive {
                name,
                argument,
                location,
            } => (name, argument, location),
            other => {
                if frames.iter().all(|frame| frame.active) {
                    output.push(other);
                } else {
                    dropped += 1;
                }
                continue;
            }
        };

        match name.as_str() {
            "ifdef" | "ifndef" => {
                let macro_name = argument
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| DirectiveError {
                        message: format!("#{} requires a macro name", name),
                        location,
                    })?
                    .to_string();
                let defined = macros.is_defined(&macro_name);
                let active = if name == "ifdef" { defined } else { !defined };
                debug!(
                    directive = %name,
                    macro_name = %macro_name,
                    active,
                    line = location.line,
                    "conditional block"
                );
                frames.push(Conditional {
                    name: macro_name,
                    active,
                    seen_else: false,
                    location,
                });
            }
            "else" => {
                let frame = frames.last_mut().ok_or_else(|| DirectiveError {
                    message: "#else without matching #ifdef".to_string(),
                    location,
                })?;
                if frame.seen_else {
                    return Err(DirectiveError {
                        message: format!(
                            "duplicate #else for '{}' opened at line {}",
                            frame.name, frame.location.line
                        ),
                        location,
                    });
                }
                frame.seen_else = true;
                frame.active = !frame.active;
            }
            "endif" => {
                frames.pop().ok_or_else(|| DirectiveError {
                    message: "#endif without matching #ifdef".to_string(),
                    location,
                })?;
            }
            "include" => {}
            _ => {
                if frames.iter().all(|frame| frame.active) {
                    warn!(
                        directive = %name,
                        line = location.line,
                        "ignoring unsupported preprocessor directive"
                    );
                }
            }
        }
    }

    if let Some(open) = frames.first() {
        return Err(DirectiveError {
            message: format!("unterminated #ifdef {}", open.name),
            location: open.location,
        });
    }

    debug!(kept = output.len(), dropped, "preprocessed token stream");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    fn idents(tokens: &[Token]) -> Vec<String> {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Ident(name, _) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_no_directives_is_identity() {
        let tokens = tokenize("int main() { return a + b; }").unwrap();
        let filtered = filter(tokens.clone(), &MacroTable::new()).unwrap();
        assert_eq!(filtered, tokens);
    }

    #[test]
    fn test_ifdef_defined_keeps_tokens() {
        let tokens = tokenize("a\n#ifdef DEBUG\nb\n#endif\nc").unwrap();
        let macros: MacroTable = ["DEBUG"].into_iter().collect();
        let filtered = filter(tokens, &macros).unwrap();
        assert_eq!(idents(&filtered), ["a", "b", "c"]);
    }

    #[test]
    fn test_ifdef_undefined_drops_tokens() {
        let tokens = tokenize("a\n#ifdef DEBUG\nb\n#endif\nc").unwrap();
        let filtered = filter(tokens, &MacroTable::new()).unwrap();
        assert_eq!(idents(&filtered), ["a", "c"]);
    }

    #[test]
    fn test_undefined_macro_entry_counts_as_undefined() {
        let tokens = tokenize("#ifdef DEBUG\nb\n#endif").unwrap();
        let mut macros = MacroTable::new();
        macros.undefine("DEBUG");
        let filtered = filter(tokens, &macros).unwrap();
        assert!(idents(&filtered).is_empty());
    }

    #[test]
    fn test_ifndef_and_else() {
        let source = "#ifndef FAST\nslow\n#else\nfast\n#endif";
        let filtered =
            filter(tokenize(source).unwrap(), &MacroTable::new()).unwrap();
        assert_eq!(idents(&filtered), ["slow"]);

        let macros: MacroTable = ["FAST"].into_iter().collect();
        let filtered = filter(tokenize(source).unwrap(), &macros).unwrap();
        assert_eq!(idents(&filtered), ["fast"]);
    }

    #[test]
    fn test_nested_blocks_inside_inactive_branch_still_balance() {
        let source = "#ifdef A\nx\n#ifdef B\ny\n#endif\n#endif\nz";
        let macros: MacroTable = ["B"].into_iter().collect();
        let filtered = filter(tokenize(source).unwrap(), &macros).unwrap();
        assert_eq!(idents(&filtered), ["z"]);
    }

    #[test]
    fn test_include_and_define_are_dropped() {
        let source = "#include <iostream>\n#define DEBUG\n#ifdef DEBUG\nx\n#endif\ny";
        let filtered =
            filter(tokenize(source).unwrap(), &MacroTable::new()).unwrap();
        assert_eq!(idents(&filtered), ["y"]);
        assert!(filtered
            .iter()
            .all(|t| !matches!(t, Token::Directive { .. })));
    }

    #[test]
    fn test_stray_endif_is_unbalanced() {
        let err = filter(tokenize("x\n#endif").unwrap(), &MacroTable::new())
            .unwrap_err();
        assert_eq!(err.location.line, 2);
        assert!(err.to_string().starts_with("UnbalancedDirective at line 2"));
    }

    #[test]
    fn test_unclosed_ifdef_reports_opening_line() {
        let source = "a\n#ifdef X\nb\n#ifdef Y\nc\n#endif";
        let err =
            filter(tokenize(source).unwrap(), &MacroTable::new()).unwrap_err();
        assert_eq!(err.location.line, 2);
        assert!(err.message.contains('X'));
    }

    #[test]
    fn test_ifdef_without_name() {
        let err = filter(tokenize("#ifdef\n#endif").unwrap(), &MacroTable::new())
            .unwrap_err();
        assert!(err.message.contains("requires a macro name"));
    }
}
