//! Expression parsing implementation
//!
//! One function per precedence level, lowest first:
//!
//! ```text
//! assignment  ::= logical_or ("=" assignment)?
//! logical_or  ::= logical_and ("||" logical_and)*
//! logical_and ::= equality ("&&" equality)*
//! equality    ::= relational (("==" | "!=") relational)*
//! relational  ::= additive (("<" | "<=" | ">" | ">=") additive)*
//! additive    ::= multiplicative (("+" | "-") multiplicative)*
//! multiplicative ::= unary (("*" | "/" | "%") unary)*
//! unary       ::= ("!" | "-" | "+" | "++" | "--") unary | postfix
//! postfix     ::= primary ("." ident call? | "->" ident call? | "++" | "--")*
//! primary     ::= literal | "this" | qualified_name call? | "(" expression ")"
//! ```
//!
//! Binary operators are left-associative; `=` is right-associative and only
//! accepts a variable or member on its left.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<AstNode, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<AstNode, ParseError> {
        let expr = self.parse_logical_or()?;

        let loc = self.current_location();
        if self.match_token(&Token::Eq(loc)) {
            if !matches!(expr, AstNode::Identifier(..) | AstNode::MemberAccess { .. }) {
                return Err(ParseError {
                    expected: vec!["variable or member".to_string()],
                    context: "on the left of '='".to_string(),
                    found: "expression".to_string(),
                    location: *expr.location(),
                });
            }
            let value = Box::new(self.parse_assignment()?);
            return Ok(AstNode::Assignment {
                target: Box::new(expr),
                value,
                location: loc,
            });
        }

        Ok(expr)
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_logical_and()?;

        while self.match_token(&Token::OrOr(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_logical_and()?);
            left = AstNode::BinaryOp {
                op: BinOp::Or,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_equality()?;

        while self.match_token(&Token::AndAnd(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_equality()?);
            left = AstNode::BinaryOp {
                op: BinOp::And,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse equality (== !=)
    fn parse_equality(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_relational()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::EqEq(loc)) {
                BinOp::Eq
            } else if self.match_token(&Token::NotEq(loc)) {
                BinOp::Ne
            } else {
                break;
            };

            let right = Box::new(self.parse_relational()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse relational (< <= > >=)
    fn parse_relational(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Lt(loc)) {
                BinOp::Lt
            } else if self.match_token(&Token::Le(loc)) {
                BinOp::Le
            } else if self.match_token(&Token::Gt(loc)) {
                BinOp::Gt
            } else if self.match_token(&Token::Ge(loc)) {
                BinOp::Ge
            } else {
                break;
            };

            let right = Box::new(self.parse_additive()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse additive (+ -). Also the entry point for `<<` output operands.
    pub(crate) fn parse_additive(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Plus(loc)) {
                BinOp::Add
            } else if self.match_token(&Token::Minus(loc)) {
                BinOp::Sub
            } else {
                break;
            };

            let right = Box::new(self.parse_multiplicative()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse multiplicative (* / %)
    fn parse_multiplicative(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Star(loc)) {
                BinOp::Mul
            } else if self.match_token(&Token::Slash(loc)) {
                BinOp::Div
            } else if self.match_token(&Token::Percent(loc)) {
                BinOp::Mod
            } else {
                break;
            };

            let right = Box::new(self.parse_unary()?);
            left = AstNode::BinaryOp {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse unary (! - + ++ --)
    fn parse_unary(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        let op = match self.peek() {
            Token::Bang(_) => UnOp::Not,
            Token::Minus(_) => UnOp::Neg,
            Token::Plus(_) => UnOp::Plus,
            Token::PlusPlus(_) => UnOp::PreInc,
            Token::MinusMinus(_) => UnOp::PreDec,
            _ => return self.parse_postfix(),
        };
        self.advance();

        // `-2147483648` is INT_MIN even though `2147483648` is not an int
        let int_min_magnitude = -i64::from(i32::MIN);
        if op == UnOp::Neg
            && matches!(self.peek(), Token::IntLiteral(n, _) if *n == int_min_magnitude)
        {
            self.advance();
            return Ok(AstNode::IntLiteral(i32::MIN, loc));
        }

        let operand = Box::new(self.parse_unary()?);
        Ok(AstNode::UnaryOp {
            op,
            operand,
            location: loc,
        })
    }

    /// Parse postfix: member access, method calls, x++, x--
    fn parse_postfix(&mut self) -> Result<AstNode, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let loc = self.current_location();

            if self.match_token(&Token::Dot(loc)) || self.match_token(&Token::Arrow(loc)) {
                let member = self.expect_identifier("after member access operator")?;
                expr = if self.match_token(&Token::LParen(self.current_location())) {
                    let args = self.parse_arguments()?;
                    AstNode::MethodCall {
                        object: Box::new(expr),
                        method: member,
                        args,
                        location: loc,
                    }
                } else {
                    AstNode::MemberAccess {
                        object: Box::new(expr),
                        member,
                        location: loc,
                    }
                };
            } else if self.match_token(&Token::PlusPlus(loc)) {
                expr = AstNode::UnaryOp {
                    op: UnOp::PostInc,
                    operand: Box::new(expr),
                    location: loc,
                };
            } else if self.match_token(&Token::MinusMinus(loc)) {
                expr = AstNode::UnaryOp {
                    op: UnOp::PostDec,
                    operand: Box::new(expr),
                    location: loc,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse primary expression
    fn parse_primary(&mut self) -> Result<AstNode, ParseError> {
        let loc = self.current_location();

        match self.peek_token() {
            Token::IntLiteral(n, _) => {
                let value = i32::try_from(n).map_err(|_| {
                    self.error_expected(&["integer"], "within the 32-bit int range")
                })?;
                self.advance();
                Ok(AstNode::IntLiteral(value, loc))
            }
            Token::FloatLiteral(x, _) => {
                self.advance();
                Ok(AstNode::FloatLiteral(x, loc))
            }
            Token::CharLiteral(c, _) => {
                self.advance();
                Ok(AstNode::CharLiteral(c, loc))
            }
            Token::StringLiteral(s, _) => {
                self.advance();
                // "a" "b" concatenates
                let mut text = s;
                while let Token::StringLiteral(next, _) = self.peek_token() {
                    self.advance();
                    text.push_str(&next);
                }
                Ok(AstNode::StringLiteral(text, loc))
            }
            Token::True(_) => {
                self.advance();
                Ok(AstNode::BoolLiteral(true, loc))
            }
            Token::False(_) => {
                self.advance();
                Ok(AstNode::BoolLiteral(false, loc))
            }
            Token::This(_) => {
                self.advance();
                Ok(AstNode::This(loc))
            }
            Token::LParen(_) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                Ok(expr)
            }
            Token::Ident(..) => {
                let name = self.parse_qualified_name("in expression")?;
                if !self.match_token(&Token::LParen(self.current_location())) {
                    return Ok(AstNode::Identifier(name, loc));
                }

                let args = self.parse_arguments()?;
                if self.class_names.contains(name.last()) {
                    Ok(AstNode::Instantiation {
                        class: name,
                        args,
                        location: loc,
                    })
                } else {
                    Ok(AstNode::FunctionCall {
                        name,
                        args,
                        location: loc,
                    })
                }
            }
            _ => Err(self.error_expected(&["expression"], "here")),
        }
    }

    /// Parse call arguments after the opening '(' through the closing ')'
    pub(crate) fn parse_arguments(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut args = Vec::new();

        if self.match_token(&Token::RParen(self.current_location())) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_rparen("after arguments")?;
        Ok(args)
    }

    /// Parse `{a, b}` initializer arguments after the opening '{'
    pub(crate) fn parse_brace_arguments(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut args = Vec::new();

        if self.match_token(&Token::RBrace(self.current_location())) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_rbrace("after initializer list")?;
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::lexer::tokenize;
    use crate::parser::parse::{ParseError, Parser};

    fn expr(source: &str) -> Result<AstNode, ParseError> {
        let mut parser = Parser::new(tokenize(source).unwrap());
        parser.class_names.insert("Box".to_string());
        parser.parse_expression()
    }

    #[test]
    fn test_precedence() {
        let ast = expr("1 + 2 * 3").unwrap();
        let AstNode::BinaryOp { op: BinOp::Add, right, .. } = ast else {
            panic!("Expected addition at the root");
        };
        assert!(matches!(*right, AstNode::BinaryOp { op: BinOp::Mul, .. }));
    }

    #[test]
    fn test_left_associativity() {
        let ast = expr("10 - 4 - 3").unwrap();
        let AstNode::BinaryOp { op: BinOp::Sub, left, right, .. } = ast else {
            panic!("Expected subtraction");
        };
        assert!(matches!(*left, AstNode::BinaryOp { op: BinOp::Sub, .. }));
        assert!(matches!(*right, AstNode::IntLiteral(3, _)));
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let ast = expr("a = b = 2").unwrap();
        let AstNode::Assignment { value, .. } = ast else {
            panic!("Expected assignment");
        };
        assert!(matches!(*value, AstNode::Assignment { .. }));
    }

    #[test]
    fn test_int_min_literal() {
        assert!(matches!(expr("-2147483648").unwrap(), AstNode::IntLiteral(i32::MIN, _)));
        assert!(matches!(
            expr("-2147483647").unwrap(),
            AstNode::UnaryOp { op: UnOp::Neg, ref operand, .. }
                if matches!(**operand, AstNode::IntLiteral(2147483647, _))
        ));
        assert!(matches!(
            expr("1 - -2147483648").unwrap(),
            AstNode::BinaryOp { op: BinOp::Sub, ref right, .. }
                if matches!(**right, AstNode::IntLiteral(i32::MIN, _))
        ));
    }

    #[test]
    fn test_int_literal_out_of_range() {
        for source in ["2147483648", "-(2147483648)", "x = 3000000000"] {
            let err = expr(source).unwrap_err();
            assert_eq!(err.context, "within the 32-bit int range", "{source}");
        }
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = expr("1 + 2 = 3").unwrap_err();
        assert_eq!(err.context, "on the left of '='");
    }

    #[test]
    fn test_logical_precedence() {
        let ast = expr("a || b && !c").unwrap();
        let AstNode::BinaryOp { op: BinOp::Or, right, .. } = ast else {
            panic!("Expected ||");
        };
        assert!(matches!(*right, AstNode::BinaryOp { op: BinOp::And, .. }));
    }

    #[test]
    fn test_calls_and_members() {
        assert!(matches!(
            expr("util::square(3)").unwrap(),
            AstNode::FunctionCall { ref name, ref args, .. }
                if name.to_string() == "util::square" && args.len() == 1
        ));
        assert!(matches!(expr("Box(1, 2)").unwrap(), AstNode::Instantiation { .. }));
        assert!(matches!(
            expr("this->value").unwrap(),
            AstNode::MemberAccess { ref object, .. } if matches!(**object, AstNode::This(_))
        ));
        assert!(matches!(
            expr("b.area()").unwrap(),
            AstNode::MethodCall { ref method, .. } if method == "area"
        ));
        assert!(matches!(
            expr("i++").unwrap(),
            AstNode::UnaryOp { op: UnOp::PostInc, .. }
        ));
    }

    #[test]
    fn test_adjacent_string_literals() {
        assert!(matches!(
            expr(r#""ab" "cd""#).unwrap(),
            AstNode::StringLiteral(ref s, _) if s == "abcd"
        ));
    }

    #[test]
    fn test_missing_operand() {
        let err = expr("1 + ;").unwrap_err();
        assert_eq!(err.expected, vec!["expression".to_string()]);
        assert_eq!(err.found, "';'");
    }
}
