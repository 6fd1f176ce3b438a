//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the error type, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: namespaces, classes, functions, types
//! - `statements`: statements (if, while, for, output, etc.)
//! - `expressions`: expressions with one function per precedence level
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! Before parsing, the token stream is scanned once for `class NAME` and
//! `struct NAME` so that `NAME(args)` can be told apart from a function call
//! and `NAME x;` from an expression, even when the class is declared later in
//! the file.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use rustc_hash::FxHashSet;
use thiserror::Error;

/// Parser error type: the first token that did not fit the grammar.
#[derive(Debug, Clone, Error)]
#[error(
    "SyntaxError at line {}, column {}: expected {} {context}, found {found}",
    .location.line,
    .location.column,
    .expected.join(" or ")
)]
pub struct ParseError {
    pub expected: Vec<String>,
    pub context: String,
    pub found: String,
    pub location: SourceLocation,
}

/// Recursive descent parser for the C++ subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) class_names: FxHashSet<String>,
}

impl Parser {
    /// Create a parser over an already preprocessed token stream.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(Token::Eof(_))) {
            let location = tokens.last().map(Token::location).unwrap_or_default();
            tokens.push(Token::Eof(location));
        }

        let class_names = tokens
            .windows(2)
            .filter_map(|pair| match pair {
                [Token::Class(_) | Token::Struct(_), Token::Ident(name, _)] => {
                    Some(name.clone())
                }
                _ => None,
            })
            .collect();

        Self {
            tokens,
            position: 0,
            class_names,
        }
    }

    /// Parse the whole translation unit
    pub fn parse_translation_unit(
        &mut self,
    ) -> Result<TranslationUnit, ParseError> {
        let mut unit = TranslationUnit::new();

        while !self.is_at_end() {
            if self.match_token(&Token::Semicolon(self.current_location())) {
                continue;
            }
            unit.declarations.push(self.parse_declaration()?);
        }

        Ok(unit)
    }

    // ===== Helper methods =====

    /// Keyword that can only start a type.
    pub(crate) fn is_type_keyword(&self) -> bool {
        matches!(
            self.peek(),
            Token::Int(_)
                | Token::Float(_)
                | Token::Double(_)
                | Token::Char(_)
                | Token::Bool(_)
                | Token::Void(_)
                | Token::Auto(_)
                | Token::Const(_)
        )
    }

    /// True when the tokens at the cursor read as `Type name`, i.e. the start
    /// of a variable declaration rather than an expression.
    pub(crate) fn is_declaration_start(&self) -> bool {
        if self.is_type_keyword() {
            return true;
        }

        let mut offset = 0;
        let last_segment = loop {
            let Some(Token::Ident(name, _)) = self.peek_ahead(offset) else {
                return false;
            };
            offset += 1;
            if matches!(self.peek_ahead(offset), Some(Token::ColonColon(_))) {
                offset += 1;
            } else {
                break name.as_str();
            }
        };

        let known_type = last_segment == "string" || self.class_names.contains(last_segment);

        let mut decorated = false;
        while matches!(
            self.peek_ahead(offset),
            Some(Token::Star(_)) | Some(Token::Amp(_))
        ) {
            decorated = true;
            offset += 1;
        }

        // `a * b;` stays an expression unless `a` names a type
        matches!(self.peek_ahead(offset), Some(Token::Ident(..)))
            && (known_type || !decorated)
    }

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn check_ahead(&self, n: usize, token: &Token) -> bool {
        self.peek_ahead(n)
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_token(&self) -> Token {
        self.tokens[self.position].clone()
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous().location()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    /// Build an error for the token at the cursor.
    pub(crate) fn error_expected(&self, expected: &[&str], context: &str) -> ParseError {
        ParseError {
            expected: expected.iter().map(|s| s.to_string()).collect(),
            context: context.to_string(),
            found: self.peek().to_string(),
            location: self.current_location(),
        }
    }

    pub(crate) fn expect_token(
        &mut self,
        token: &Token,
        context: &str,
    ) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_expected(&[&token.to_string()], context))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&Token::LParen(self.current_location()), ctx)
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&Token::RParen(self.current_location()), ctx)
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&Token::LBrace(self.current_location()), ctx)
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&Token::RBrace(self.current_location()), ctx)
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&Token::Semicolon(self.current_location()), ctx)
    }

    pub(crate) fn expect_identifier(&mut self, ctx: &str) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(self.error_expected(&["identifier"], ctx))
        }
    }

    /// Parse `ident (:: ident)*`
    pub(crate) fn parse_qualified_name(
        &mut self,
        ctx: &str,
    ) -> Result<QualifiedName, ParseError> {
        let mut segments = vec![self.expect_identifier(ctx)?];
        while self.check(&Token::ColonColon(self.current_location()))
            && self.check_ahead(1, &Token::Ident(String::new(), self.current_location()))
        {
            self.advance();
            segments.push(self.expect_identifier(ctx)?);
        }
        Ok(QualifiedName { segments })
    }
}

/// Parse a preprocessed token stream into a translation unit.
pub fn parse(tokens: Vec<Token>) -> Result<TranslationUnit, ParseError> {
    Parser::new(tokens).parse_translation_unit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    fn parse_source(source: &str) -> Result<TranslationUnit, ParseError> {
        parse(tokenize(source).unwrap())
    }

    #[test]
    fn test_parse_simple_function() {
        let unit = parse_source("int main() { return 0; }").unwrap();

        assert_eq!(unit.declarations.len(), 1);
        match &unit.declarations[0] {
            Declaration::Function(func) => {
                assert_eq!(func.name, "main");
                assert!(func.params.is_empty());
                assert_eq!(func.return_type.base, BaseType::Int);
                assert_eq!(func.body.len(), 1);
            }
            _ => panic!("Expected function definition"),
        }
    }

    #[test]
    fn test_parse_namespace_with_class() {
        let source = "namespace geo { class Point { public: int x; int y; \
                      int sum() { return x + y; } }; }";
        let unit = parse_source(source).unwrap();

        let Declaration::Namespace(ns) = &unit.declarations[0] else {
            panic!("Expected namespace");
        };
        assert_eq!(ns.name, "geo");
        let Declaration::Class(class) = &ns.declarations[0] else {
            panic!("Expected class");
        };
        assert_eq!(class.name, "Point");
        assert_eq!(class.fields.len(), 2);
        assert_eq!(class.methods.len(), 1);
        assert_eq!(class.methods[0].name, "sum");
    }

    #[test]
    fn test_declaration_detection_uses_class_names() {
        let mut parser =
            Parser::new(tokenize("Box * b; a * b; Box b; x = 1;").unwrap());
        parser.class_names.insert("Box".to_string());
        assert!(parser.is_declaration_start());
        parser.position = 4;
        assert!(!parser.is_declaration_start());
        parser.position = 8;
        assert!(parser.is_declaration_start());
        parser.position = 11;
        assert!(!parser.is_declaration_start());
    }

    #[test]
    fn test_declaration_detection_reads_qualified_names() {
        let mut parser = Parser::new(tokenize("geo::Box b; std::string s; geo::f(1); geo::").unwrap());
        parser.class_names.insert("Box".to_string());
        assert!(parser.is_declaration_start());
        parser.position = 5;
        assert!(parser.is_declaration_start());
        parser.position = 10;
        assert!(!parser.is_declaration_start());
        // Trailing `::` with nothing after it
        parser.position = 17;
        assert!(!parser.is_declaration_start());
    }

    #[test]
    fn test_syntax_error_reports_expected_and_found() {
        let err = parse_source("int main() {\n  int x = 1\n  return x;\n}")
            .unwrap_err();
        assert_eq!(err.location.line, 3);
        assert_eq!(err.expected, vec!["';'".to_string()]);
        assert_eq!(err.found, "'return'");
        assert!(err.to_string().starts_with("SyntaxError at line 3"));
    }

    #[test]
    fn test_global_variable_is_rejected() {
        let err = parse_source("int counter = 0;").unwrap_err();
        assert_eq!(err.expected, vec!["'('".to_string()]);
    }
}
