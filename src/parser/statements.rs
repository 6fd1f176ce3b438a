//! Statement parsing implementation
//!
//! This module handles parsing of all statement types:
//!
//! - Variable declarations: `int x = 42, y;`, `Box b(1);`
//! - Control flow: `if`, `while`, `do-while`, `for`
//! - Jump statements: `return`, `break`, `continue`
//! - Stream output: `std::cout << a << std::endl;`
//! - Block-level `using namespace x;`
//! - Compound statements: `{ ... }`
//! - Expression statements: calls, assignments, increments
//!
//! # Grammar
//!
//! ```text
//! statement ::= var_decl | if_stmt | while_stmt | do_while_stmt | for_stmt
//!             | return_stmt | break_stmt | continue_stmt | output_stmt
//!             | using_decl | block | expr_stmt | ";"
//! output_stmt ::= ("std" "::")? "cout" ("<<" (additive | endl))+ ";"
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse block statements (inside braces, excluding the braces themselves)
    pub(crate) fn parse_block_statements(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        if self.match_token(&Token::Return(loc)) {
            return self.parse_return_statement();
        }

        if self.match_token(&Token::If(loc)) {
            return self.parse_if_statement();
        }

        if self.match_token(&Token::While(loc)) {
            return self.parse_while_statement();
        }

        if self.match_token(&Token::Do(loc)) {
            return self.parse_do_while_statement();
        }

        if self.match_token(&Token::For(loc)) {
            return self.parse_for_statement();
        }

        if self.match_token(&Token::Break(loc)) {
            self.expect_semicolon("after 'break'")?;
            return Ok(AstNode::Break { location: loc });
        }

        if self.match_token(&Token::Continue(loc)) {
            self.expect_semicolon("after 'continue'")?;
            return Ok(AstNode::Continue { location: loc });
        }

        if self.match_token(&Token::LBrace(loc)) {
            let statements = self.parse_block_statements()?;
            self.expect_rbrace("after block")?;
            return Ok(AstNode::Block {
                statements,
                location: loc,
            });
        }

        // Empty statement
        if self.match_token(&Token::Semicolon(loc)) {
            return Ok(AstNode::Block {
                statements: Vec::new(),
                location: loc,
            });
        }

        if self.match_token(&Token::Using(loc)) {
            let namespace = self.parse_using_directive()?;
            return Ok(AstNode::UsingNamespace {
                namespace,
                location: loc,
            });
        }

        if self.is_stream_name("cout") {
            return self.parse_output_statement();
        }

        if self.is_declaration_start() {
            return self.parse_variable_declaration();
        }

        let expr = self.parse_expression()?;
        self.expect_semicolon("after expression")?;
        Ok(AstNode::ExpressionStatement {
            expr: Box::new(expr),
            location: loc,
        })
    }

    /// `name` or `std::name` at the cursor, not followed by a call.
    fn is_stream_name(&self, name: &str) -> bool {
        let is_name = |t: Option<&Token>| matches!(t, Some(Token::Ident(s, _)) if s == name);
        let after = if is_name(self.peek_ahead(0)) {
            1
        } else if matches!(self.peek(), Token::Ident(s, _) if s == "std")
            && matches!(self.peek_ahead(1), Some(Token::ColonColon(_)))
            && is_name(self.peek_ahead(2))
        {
            3
        } else {
            return false;
        };
        !matches!(self.peek_ahead(after), Some(Token::LParen(_)))
    }

    /// Parse `cout << a << b << endl;` into an ordered operand list
    fn parse_output_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();
        self.parse_qualified_name("for output stream")?;

        if !self.check(&Token::LtLt(self.current_location())) {
            return Err(self.error_expected(&["'<<'"], "after 'cout'"));
        }

        let mut items = Vec::new();
        while self.match_token(&Token::LtLt(self.current_location())) {
            if self.is_stream_name("endl") {
                self.parse_qualified_name("for 'endl'")?;
                items.push(OutputItem::Endl);
            } else {
                items.push(OutputItem::Expr(self.parse_additive()?));
            }
        }

        self.expect_semicolon("after output statement")?;

        Ok(AstNode::Output {
            items,
            location: loc,
        })
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        let expr = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        self.expect_semicolon("after return")?;

        Ok(AstNode::Return {
            expr,
            location: loc,
        })
    }

    /// Parse if statement
    fn parse_if_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'if'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_rparen("after if condition")?;

        let then_branch = self.parse_statement_or_block()?;

        let else_branch = if self.match_token(&Token::Else(self.current_location())) {
            Some(self.parse_statement_or_block()?)
        } else {
            None
        };

        Ok(AstNode::If {
            condition,
            then_branch,
            else_branch,
            location: loc,
        })
    }

    /// Parse while statement
    fn parse_while_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'while'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_rparen("after while condition")?;

        let body = self.parse_statement_or_block()?;

        Ok(AstNode::While {
            condition,
            body,
            location: loc,
        })
    }

    /// Parse do-while statement
    fn parse_do_while_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        let body = self.parse_statement_or_block()?;

        self.expect_token(&Token::While(self.current_location()), "after do body")?;
        self.expect_lparen("after 'while'")?;
        let condition = Box::new(self.parse_expression()?);
        self.expect_rparen("after do-while condition")?;
        self.expect_semicolon("after do-while")?;

        Ok(AstNode::DoWhile {
            body,
            condition,
            location: loc,
        })
    }

    /// Parse for statement
    fn parse_for_statement(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'for'")?;

        // Init (optional); a declaration consumes its own ';'
        let init = if self.match_token(&Token::Semicolon(self.current_location())) {
            None
        } else if self.is_declaration_start() {
            Some(Box::new(self.parse_variable_declaration()?))
        } else {
            let init_loc = self.current_location();
            let expr = self.parse_expression()?;
            self.expect_semicolon("after for init")?;
            Some(Box::new(AstNode::ExpressionStatement {
                expr: Box::new(expr),
                location: init_loc,
            }))
        };

        let condition = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_semicolon("after for condition")?;

        let increment = if self.check(&Token::RParen(self.current_location())) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        self.expect_rparen("after for clauses")?;

        let body = self.parse_statement_or_block()?;

        Ok(AstNode::For {
            init,
            condition,
            increment,
            body,
            location: loc,
        })
    }

    /// Parse variable declaration: `type name [= init | (args) | {args}], ...;`
    pub(crate) fn parse_variable_declaration(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();
        let var_type = self.parse_type()?;

        let mut declarators = Vec::new();
        loop {
            let name = self.expect_identifier("for variable name")?;
            let name_loc = self.previous_location();

            let init = if self.match_token(&Token::Eq(self.current_location())) {
                Some(Initializer::Assign(Box::new(self.parse_expression()?)))
            } else if self.match_token(&Token::LParen(self.current_location())) {
                Some(Initializer::Construct(self.parse_arguments()?))
            } else if self.match_token(&Token::LBrace(self.current_location())) {
                Some(Initializer::Construct(self.parse_brace_arguments()?))
            } else {
                None
            };

            declarators.push(Declarator {
                name,
                init,
                location: name_loc,
            });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_semicolon("after variable declaration")?;

        Ok(AstNode::VarDecl {
            var_type,
            declarators,
            location: loc,
        })
    }

    /// Parse statement or block (for if/while/for bodies)
    pub(crate) fn parse_statement_or_block(&mut self) -> Result<Vec<AstNode>, ParseError> {
        if self.match_token(&Token::LBrace(self.current_location())) {
            let statements = self.parse_block_statements()?;
            self.expect_rbrace("after block")?;
            Ok(statements)
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }
}
