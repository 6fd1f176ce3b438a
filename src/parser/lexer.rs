//! Lexer (tokenizer) for C++-subset source code
//!
//! Converts raw source text into a flat [`Token`] stream. Preprocessor lines
//! are not interpreted here: each one becomes a single [`Token::Directive`]
//! carrying the directive name and its argument text, which the
//! [`preprocessor`](super::preprocessor) filter resolves afterwards.

use super::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line and column without a separate token→location table.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Magnitude of an integer literal; the parser narrows it to `int`
    IntLiteral(i64, SourceLocation),
    FloatLiteral(f64, SourceLocation),
    CharLiteral(char, SourceLocation),
    StringLiteral(String, SourceLocation),

    // Identifiers
    Ident(String, SourceLocation),

    // Preprocessor line: `#name argument`
    Directive {
        name: String,
        argument: String,
        location: SourceLocation,
    },

    // Keywords
    Namespace(SourceLocation),
    Class(SourceLocation),
    Struct(SourceLocation),
    Public(SourceLocation),
    Private(SourceLocation),
    Protected(SourceLocation),
    Using(SourceLocation),
    This(SourceLocation),
    True(SourceLocation),
    False(SourceLocation),
    Const(SourceLocation),
    Auto(SourceLocation),
    Int(SourceLocation),
    Float(SourceLocation),
    Double(SourceLocation),
    Char(SourceLocation),
    Bool(SourceLocation),
    Void(SourceLocation),
    If(SourceLocation),
    Else(SourceLocation),
    While(SourceLocation),
    Do(SourceLocation),
    For(SourceLocation),
    Break(SourceLocation),
    Continue(SourceLocation),
    Return(SourceLocation),

    // Arithmetic
    Plus(SourceLocation),    // +
    Minus(SourceLocation),   // -
    Star(SourceLocation),    // *
    Slash(SourceLocation),   // /
    Percent(SourceLocation), // %

    // Comparison
    EqEq(SourceLocation),  // ==
    NotEq(SourceLocation), // !=
    Lt(SourceLocation),    // <
    Le(SourceLocation),    // <=
    Gt(SourceLocation),    // >
    Ge(SourceLocation),    // >=

    // Logical
    AndAnd(SourceLocation), // &&
    OrOr(SourceLocation),   // ||
    Bang(SourceLocation),   // !

    // Streams and references
    Amp(SourceLocation),  // &
    LtLt(SourceLocation), // <<
    GtGt(SourceLocation), // >>

    // Assignment
    Eq(SourceLocation), // =

    // Increment/Decrement
    PlusPlus(SourceLocation),   // ++
    MinusMinus(SourceLocation), // --

    // Member access and scope resolution
    Dot(SourceLocation),        // .
    Arrow(SourceLocation),      // ->
    Colon(SourceLocation),      // :
    ColonColon(SourceLocation), // ::

    // Punctuation
    LParen(SourceLocation),    // (
    RParen(SourceLocation),    // )
    LBrace(SourceLocation),    // {
    RBrace(SourceLocation),    // }
    LBracket(SourceLocation),  // [
    RBracket(SourceLocation),  // ]
    Semicolon(SourceLocation), // ;
    Comma(SourceLocation),     // ,

    // End of file
    Eof(SourceLocation),
}

/// Coarse token classification, as shown by the token listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    IntLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,
    Keyword,
    Operator,
    Directive,
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::IntLiteral => "int-literal",
            TokenKind::FloatLiteral => "float-literal",
            TokenKind::CharLiteral => "char-literal",
            TokenKind::StringLiteral => "string-literal",
            TokenKind::Keyword => "keyword",
            TokenKind::Operator => "operator",
            TokenKind::Directive => "directive",
            TokenKind::EndOfInput => "end-of-input",
        };
        f.write_str(name)
    }
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::IntLiteral(_, loc)
            | Token::FloatLiteral(_, loc)
            | Token::CharLiteral(_, loc)
            | Token::StringLiteral(_, loc)
            | Token::Ident(_, loc)
            | Token::Directive { location: loc, .. }
            | Token::Namespace(loc)
            | Token::Class(loc)
            | Token::Struct(loc)
            | Token::Public(loc)
            | Token::Private(loc)
            | Token::Protected(loc)
            | Token::Using(loc)
            | Token::This(loc)
            | Token::True(loc)
            | Token::False(loc)
            | Token::Const(loc)
            | Token::Auto(loc)
            | Token::Int(loc)
            | Token::Float(loc)
            | Token::Double(loc)
            | Token::Char(loc)
            | Token::Bool(loc)
            | Token::Void(loc)
            | Token::If(loc)
            | Token::Else(loc)
            | Token::While(loc)
            | Token::Do(loc)
            | Token::For(loc)
            | Token::Break(loc)
            | Token::Continue(loc)
            | Token::Return(loc)
            | Token::Plus(loc)
            | Token::Minus(loc)
            | Token::Star(loc)
            | Token::Slash(loc)
            | Token::Percent(loc)
            | Token::EqEq(loc)
            | Token::NotEq(loc)
            | Token::Lt(loc)
            | Token::Le(loc)
            | Token::Gt(loc)
            | Token::Ge(loc)
            | Token::AndAnd(loc)
            | Token::OrOr(loc)
            | Token::Bang(loc)
            | Token::Amp(loc)
            | Token::LtLt(loc)
            | Token::GtGt(loc)
            | Token::Eq(loc)
            | Token::PlusPlus(loc)
            | Token::MinusMinus(loc)
            | Token::Dot(loc)
            | Token::Arrow(loc)
            | Token::Colon(loc)
            | Token::ColonColon(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::LBracket(loc)
            | Token::RBracket(loc)
            | Token::Semicolon(loc)
            | Token::Comma(loc)
            | Token::Eof(loc) => *loc,
        }
    }

    pub fn line(&self) -> usize {
        self.location().line
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::IntLiteral(..) => TokenKind::IntLiteral,
            Token::FloatLiteral(..) => TokenKind::FloatLiteral,
            Token::CharLiteral(..) => TokenKind::CharLiteral,
            Token::StringLiteral(..) => TokenKind::StringLiteral,
            Token::Ident(..) => TokenKind::Identifier,
            Token::Directive { .. } => TokenKind::Directive,
            Token::Eof(_) => TokenKind::EndOfInput,
            _ if self.is_keyword() => TokenKind::Keyword,
            _ => TokenKind::Operator,
        }
    }

    fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::Namespace(_)
                | Token::Class(_)
                | Token::Struct(_)
                | Token::Public(_)
                | Token::Private(_)
                | Token::Protected(_)
                | Token::Using(_)
                | Token::This(_)
                | Token::True(_)
                | Token::False(_)
                | Token::Const(_)
                | Token::Auto(_)
                | Token::Int(_)
                | Token::Float(_)
                | Token::Double(_)
                | Token::Char(_)
                | Token::Bool(_)
                | Token::Void(_)
                | Token::If(_)
                | Token::Else(_)
                | Token::While(_)
                | Token::Do(_)
                | Token::For(_)
                | Token::Break(_)
                | Token::Continue(_)
                | Token::Return(_)
        )
    }

    /// Source-like spelling of the token, used by the token listing.
    pub fn lexeme(&self) -> String {
        match self {
            Token::IntLiteral(n, _) => n.to_string(),
            Token::FloatLiteral(x, _) => format!("{x:?}"),
            Token::CharLiteral(c, _) => format!("'{}'", c.escape_default()),
            Token::StringLiteral(s, _) => format!("\"{s}\""),
            Token::Ident(s, _) => s.clone(),
            Token::Directive { name, argument, .. } if argument.is_empty() => {
                format!("#{name}")
            }
            Token::Directive { name, argument, .. } => {
                format!("#{name} {argument}")
            }
            Token::Eof(_) => String::new(),
            other => other.to_string().trim_matches('\'').to_string(),
        }
    }

    /// One row of the token listing: `line:column  kind  lexeme`
    pub fn listing_row(&self) -> String {
        let loc = self.location();
        format!(
            "{:>4}:{:<3} {:<14} {}",
            loc.line,
            loc.column,
            self.kind().to_string(),
            self.lexeme()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::IntLiteral(n, _) => write!(f, "int literal {}", n),
            Token::FloatLiteral(x, _) => write!(f, "float literal {:?}", x),
            Token::CharLiteral(c, _) => {
                write!(f, "char literal '{}'", c.escape_default())
            }
            Token::StringLiteral(s, _) => write!(f, "string literal \"{}\"", s),
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Directive { name, .. } => write!(f, "directive '#{}'", name),
            Token::Namespace(_) => write!(f, "'namespace'"),
            Token::Class(_) => write!(f, "'class'"),
            Token::Struct(_) => write!(f, "'struct'"),
            Token::Public(_) => write!(f, "'public'"),
            Token::Private(_) => write!(f, "'private'"),
            Token::Protected(_) => write!(f, "'protected'"),
            Token::Using(_) => write!(f, "'using'"),
            Token::This(_) => write!(f, "'this'"),
            Token::True(_) => write!(f, "'true'"),
            Token::False(_) => write!(f, "'false'"),
            Token::Const(_) => write!(f, "'const'"),
            Token::Auto(_) => write!(f, "'auto'"),
            Token::Int(_) => write!(f, "'int'"),
            Token::Float(_) => write!(f, "'float'"),
            Token::Double(_) => write!(f, "'double'"),
            Token::Char(_) => write!(f, "'char'"),
            Token::Bool(_) => write!(f, "'bool'"),
            Token::Void(_) => write!(f, "'void'"),
            Token::If(_) => write!(f, "'if'"),
            Token::Else(_) => write!(f, "'else'"),
            Token::While(_) => write!(f, "'while'"),
            Token::Do(_) => write!(f, "'do'"),
            Token::For(_) => write!(f, "'for'"),
            Token::Break(_) => write!(f, "'break'"),
            Token::Continue(_) => write!(f, "'continue'"),
            Token::Return(_) => write!(f, "'return'"),
            Token::Plus(_) => write!(f, "'+'"),
            Token::Minus(_) => write!(f, "'-'"),
            Token::Star(_) => write!(f, "'*'"),
            Token::Slash(_) => write!(f, "'/'"),
            Token::Percent(_) => write!(f, "'%'"),
            Token::EqEq(_) => write!(f, "'=='"),
            Token::NotEq(_) => write!(f, "'!='"),
            Token::Lt(_) => write!(f, "'<'"),
            Token::Le(_) => write!(f, "'<='"),
            Token::Gt(_) => write!(f, "'>'"),
            Token::Ge(_) => write!(f, "'>='"),
            Token::AndAnd(_) => write!(f, "'&&'"),
            Token::OrOr(_) => write!(f, "'||'"),
            Token::Bang(_) => write!(f, "'!'"),
            Token::Amp(_) => write!(f, "'&'"),
            Token::LtLt(_) => write!(f, "'<<'"),
            Token::GtGt(_) => write!(f, "'>>'"),
            Token::Eq(_) => write!(f, "'='"),
            Token::PlusPlus(_) => write!(f, "'++'"),
            Token::MinusMinus(_) => write!(f, "'--'"),
            Token::Dot(_) => write!(f, "'.'"),
            Token::Arrow(_) => write!(f, "'->'"),
            Token::Colon(_) => write!(f, "':'"),
            Token::ColonColon(_) => write!(f, "'::'"),
            Token::LParen(_) => write!(f, "'('"),
            Token::RParen(_) => write!(f, "')'"),
            Token::LBrace(_) => write!(f, "'{{'"),
            Token::RBrace(_) => write!(f, "'}}'"),
            Token::LBracket(_) => write!(f, "'['"),
            Token::RBracket(_) => write!(f, "']'"),
            Token::Semicolon(_) => write!(f, "';'"),
            Token::Comma(_) => write!(f, "','"),
            Token::Eof(_) => write!(f, "end of file"),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, Error)]
#[error("LexError at line {}, column {}: {message}", .location.line, .location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Lexer for C++-subset source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                tokens.push(Token::Eof(self.current_location()));
                break;
            }

            if self.peek() == Some('#') {
                tokens.push(self.directive()?);
                continue;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();

        // `.5` is a number, `.` alone is member access
        if self.peek() == Some('.')
            && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit())
        {
            return self.number_literal(loc);
        }

        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        match ch {
            '"' => self.string_literal(loc),
            '\'' => self.char_literal(loc),
            '0'..='9' => {
                // Re-read from the first digit so the number scanner sees it
                self.position -= 1;
                self.column -= 1;
                self.number_literal(loc)
            }
            c if c.is_alphabetic() || c == '_' => {
                Ok(self.identifier_or_keyword(c, loc))
            }

            '+' => Ok(if self.match_char('+') {
                Token::PlusPlus(loc)
            } else {
                Token::Plus(loc)
            }),
            '-' => Ok(if self.match_char('-') {
                Token::MinusMinus(loc)
            } else if self.match_char('>') {
                Token::Arrow(loc)
            } else {
                Token::Minus(loc)
            }),
            '*' => Ok(Token::Star(loc)),
            '/' => Ok(Token::Slash(loc)),
            '%' => Ok(Token::Percent(loc)),
            '=' => Ok(if self.match_char('=') {
                Token::EqEq(loc)
            } else {
                Token::Eq(loc)
            }),
            '!' => Ok(if self.match_char('=') {
                Token::NotEq(loc)
            } else {
                Token::Bang(loc)
            }),
            '<' => Ok(if self.match_char('=') {
                Token::Le(loc)
            } else if self.match_char('<') {
                Token::LtLt(loc)
            } else {
                Token::Lt(loc)
            }),
            '>' => Ok(if self.match_char('=') {
                Token::Ge(loc)
            } else if self.match_char('>') {
                Token::GtGt(loc)
            } else {
                Token::Gt(loc)
            }),
            '&' => Ok(if self.match_char('&') {
                Token::AndAnd(loc)
            } else {
                Token::Amp(loc)
            }),
            '|' if self.match_char('|') => Ok(Token::OrOr(loc)),
            ':' => Ok(if self.match_char(':') {
                Token::ColonColon(loc)
            } else {
                Token::Colon(loc)
            }),
            '.' => Ok(Token::Dot(loc)),
            '(' => Ok(Token::LParen(loc)),
            ')' => Ok(Token::RParen(loc)),
            '{' => Ok(Token::LBrace(loc)),
            '}' => Ok(Token::RBrace(loc)),
            '[' => Ok(Token::LBracket(loc)),
            ']' => Ok(Token::RBracket(loc)),
            ';' => Ok(Token::Semicolon(loc)),
            ',' => Ok(Token::Comma(loc)),

            _ => Err(LexError {
                message: format!("Unexpected character: '{}'", ch),
                location: loc,
            }),
        }
    }

    /// Read a `#name argument` line. Trailing `//` comments are not part of
    /// the argument.
    fn directive(&mut self) -> Result<Token, LexError> {
        let location = self.current_location();
        self.advance(); // '#'

        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.advance();
        }

        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let mut argument = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            if ch == '/' && self.peek_ahead(1) == Some('/') {
                self.skip_line_comment();
                break;
            }
            if ch == '/' && self.peek_ahead(1) == Some('*') {
                self.skip_block_comment()?;
                continue;
            }
            argument.push(ch);
            self.advance();
        }

        Ok(Token::Directive {
            name,
            argument: argument.trim().to_string(),
            location,
        })
    }

    /// Parse string literal. Only `\"` and `\\` are unescaped; any other
    /// backslash sequence is kept as written.
    fn string_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(Token::StringLiteral(string, loc));
                }
                '\n' => break,
                '\\' => {
                    self.advance();
                    match self.peek() {
                        Some(c @ ('"' | '\\')) => {
                            string.push(c);
                            self.advance();
                        }
                        _ => string.push('\\'),
                    }
                }
                _ => {
                    string.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Parse character literal
    fn char_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let unterminated = || LexError {
            message: "Unterminated character literal".to_string(),
            location: loc,
        };

        let ch = match self.peek() {
            None | Some('\n') | Some('\'') => return Err(unterminated()),
            Some(c) => {
                self.advance();
                c
            }
        };

        let value = if ch == '\\' {
            let escaped = self.advance().ok_or_else(unterminated)?;
            match escaped {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                '0' => '\0',
                '\\' => '\\',
                '\'' => '\'',
                '"' => '"',
                _ => {
                    return Err(LexError {
                        message: format!(
                            "Unknown escape sequence: \\{}",
                            escaped
                        ),
                        location: loc,
                    });
                }
            }
        } else {
            ch
        };

        if self.peek() != Some('\'') {
            return Err(unterminated());
        }
        self.advance();

        Ok(Token::CharLiteral(value, loc))
    }

    /// Parse a numeric literal: decimal, `0x` hex, `0b` binary, leading-zero
    /// octal, or a float with a fraction, exponent or `f` suffix.
    fn number_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        if self.peek() == Some('0') {
            let radix = match self.peek_ahead(1) {
                Some('x') | Some('X') => Some(16),
                Some('b') | Some('B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                self.advance();
                let digits = self.take_while(|c| c.is_ascii_alphanumeric());
                return self.radix_literal(&digits, radix, loc);
            }
        }

        let mut text = self.take_while(|c| c.is_ascii_digit());
        let mut is_float = false;

        if self.peek() == Some('.') {
            is_float = true;
            text.push('.');
            self.advance();
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let signed = matches!(self.peek_ahead(1), Some('+') | Some('-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_ahead(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                text.push('e');
                self.advance();
                if signed {
                    text.push(self.advance().unwrap_or('+'));
                }
                text.push_str(&self.take_while(|c| c.is_ascii_digit()));
            }
        }

        if matches!(self.peek(), Some('f') | Some('F')) {
            is_float = true;
            self.advance();
        }

        if self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            return Err(LexError {
                message: format!(
                    "Invalid suffix on numeric literal: {}{}",
                    text,
                    self.peek().unwrap_or_default()
                ),
                location: loc,
            });
        }

        if is_float {
            let value = text.parse::<f64>().map_err(|_| LexError {
                message: format!("Invalid float literal: {}", text),
                location: loc,
            })?;
            return Ok(Token::FloatLiteral(value, loc));
        }

        if text.len() > 1 && text.starts_with('0') {
            return self.radix_literal(&text[1..], 8, loc);
        }

        self.radix_literal(&text, 10, loc)
    }

    fn radix_literal(
        &self,
        digits: &str,
        radix: u32,
        loc: SourceLocation,
    ) -> Result<Token, LexError> {
        i64::from_str_radix(digits, radix)
            .map(|value| Token::IntLiteral(value, loc))
            .map_err(|_| LexError {
                message: format!(
                    "Invalid integer literal '{}' (base {})",
                    digits, radix
                ),
                location: loc,
            })
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(
        &mut self,
        first_char: char,
        loc: SourceLocation,
    ) -> Token {
        let mut ident = String::new();
        ident.push(first_char);
        ident.push_str(&self.take_while(|c| c.is_alphanumeric() || c == '_'));

        match ident.as_str() {
            "namespace" => Token::Namespace(loc),
            "class" => Token::Class(loc),
            "struct" => Token::Struct(loc),
            "public" => Token::Public(loc),
            "private" => Token::Private(loc),
            "protected" => Token::Protected(loc),
            "using" => Token::Using(loc),
            "this" => Token::This(loc),
            "true" => Token::True(loc),
            "false" => Token::False(loc),
            "const" => Token::Const(loc),
            "auto" => Token::Auto(loc),
            "int" => Token::Int(loc),
            "float" => Token::Float(loc),
            "double" => Token::Double(loc),
            "char" => Token::Char(loc),
            "bool" => Token::Bool(loc),
            "void" => Token::Void(loc),
            "if" => Token::If(loc),
            "else" => Token::Else(loc),
            "while" => Token::While(loc),
            "do" => Token::Do(loc),
            "for" => Token::For(loc),
            "break" => Token::Break(loc),
            "continue" => Token::Continue(loc),
            "return" => Token::Return(loc),
            _ => Token::Ident(ident, loc),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => {
                    self.skip_line_comment();
                }
                Some('/') if self.peek_ahead(1) == Some('*') => {
                    self.skip_block_comment()?;
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...), leaving the newline in place
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            out.push(ch);
            self.advance();
        }
        out
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Convenience wrapper around [`Lexer::tokenize`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}
