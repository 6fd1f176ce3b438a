//! Declaration parsing implementation
//!
//! This module handles parsing of file- and namespace-level declarations:
//!
//! - Namespaces: `namespace name { ... }`
//! - Classes: `class Name { ... };` (`struct` is accepted as a synonym)
//! - Free functions: `type name(params) { ... }`
//! - Using directives: `using namespace a::b;`
//! - Types: base types, qualified class names, `const`, `*`, `&`
//!
//! # Grammar
//!
//! ```text
//! declaration  ::= namespace_decl | class_decl | function_def | using_decl
//! class_decl   ::= ("class" | "struct") identifier "{" member* "}" ";"
//! member       ::= access_label ":" | field_decl | method_def | constructor
//! constructor  ::= ClassName "(" params ")" (":" member_init ("," member_init)*)? block
//! type         ::= "const"? base_type "const"? "*"* "&"?
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse one file- or namespace-level declaration
    pub(crate) fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let loc = self.current_location();

        if self.match_token(&Token::Namespace(loc)) {
            return self.parse_namespace(loc).map(Declaration::Namespace);
        }

        if self.match_token(&Token::Class(loc)) || self.match_token(&Token::Struct(loc)) {
            return self.parse_class(loc).map(Declaration::Class);
        }

        if self.match_token(&Token::Using(loc)) {
            let namespace = self.parse_using_directive()?;
            return Ok(Declaration::Using {
                namespace,
                location: loc,
            });
        }

        self.parse_function_definition().map(Declaration::Function)
    }

    /// Parse the rest of `using namespace a::b;` after `using`
    pub(crate) fn parse_using_directive(&mut self) -> Result<QualifiedName, ParseError> {
        self.expect_token(&Token::Namespace(self.current_location()), "after 'using'")?;
        let name = self.parse_qualified_name("after 'using namespace'")?;
        self.expect_semicolon("after using directive")?;
        Ok(name)
    }

    fn parse_namespace(&mut self, loc: SourceLocation) -> Result<NamespaceDecl, ParseError> {
        let name = self.expect_identifier("after 'namespace'")?;
        self.expect_lbrace("after namespace name")?;

        let mut declarations = Vec::new();
        while !self.check(&Token::RBrace(self.current_location())) {
            if self.is_at_end() {
                return Err(self.error_expected(&["'}'"], "to close namespace"));
            }
            if self.match_token(&Token::Semicolon(self.current_location())) {
                continue;
            }
            declarations.push(self.parse_declaration()?);
        }
        self.expect_rbrace("to close namespace")?;

        Ok(NamespaceDecl {
            name,
            declarations,
            location: loc,
        })
    }

    /// Parse class body: `Name { members };`
    fn parse_class(&mut self, loc: SourceLocation) -> Result<ClassDecl, ParseError> {
        let name = self.expect_identifier("after 'class'")?;
        self.expect_lbrace("after class name")?;

        let mut class = ClassDecl {
            name,
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            location: loc,
        };

        while !self.check(&Token::RBrace(self.current_location())) {
            if self.is_at_end() {
                return Err(self.error_expected(&["'}'"], "to close class body"));
            }
            self.parse_class_member(&mut class)?;
        }

        self.expect_rbrace("to close class body")?;
        self.expect_semicolon("after class definition")?;

        Ok(class)
    }

    fn parse_class_member(&mut self, class: &mut ClassDecl) -> Result<(), ParseError> {
        let loc = self.current_location();

        // Access labels carry no meaning here
        if matches!(
            self.peek(),
            Token::Public(_) | Token::Private(_) | Token::Protected(_)
        ) {
            self.advance();
            return self.expect_token(&Token::Colon(self.current_location()), "after access label");
        }

        if self.match_token(&Token::Semicolon(loc)) {
            return Ok(());
        }

        if matches!(self.peek(), Token::Ident(name, _) if *name == class.name)
            && self.check_ahead(1, &Token::LParen(loc))
        {
            self.advance();
            let constructor = self.parse_constructor(loc)?;
            class.constructors.push(constructor);
            return Ok(());
        }

        let member_type = self.parse_type()?;
        let name = self.expect_identifier("for member name")?;
        let name_loc = self.previous_location();

        if self.check(&Token::LParen(self.current_location())) {
            let method = self.parse_function_rest(member_type, name, name_loc)?;
            class.methods.push(method);
            return Ok(());
        }

        let mut name = name;
        let mut name_loc = name_loc;
        loop {
            let init = if self.match_token(&Token::Eq(self.current_location())) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            class.fields.push(Field {
                name,
                field_type: member_type.clone(),
                init,
                location: name_loc,
            });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
            name = self.expect_identifier("for member name")?;
            name_loc = self.previous_location();
        }

        self.expect_semicolon("after field declaration")
    }

    /// Parse constructor after its name: `(params) : a(x), b(y) { body }`
    fn parse_constructor(&mut self, loc: SourceLocation) -> Result<Constructor, ParseError> {
        self.expect_lparen("after constructor name")?;
        let params = self.parse_parameter_list()?;
        self.expect_rparen("after parameters")?;

        let mut initializers = Vec::new();
        if self.match_token(&Token::Colon(self.current_location())) {
            loop {
                let field = self.expect_identifier("in member initializer list")?;
                let init_loc = self.previous_location();
                self.expect_lparen("after member name")?;
                let value = self.parse_expression()?;
                self.expect_rparen("after member initializer")?;
                initializers.push(MemberInit {
                    field,
                    value,
                    location: init_loc,
                });

                if !self.match_token(&Token::Comma(self.current_location())) {
                    break;
                }
            }
        }

        self.expect_lbrace("before constructor body")?;
        let body = self.parse_block_statements()?;
        self.expect_rbrace("after constructor body")?;

        Ok(Constructor {
            params,
            initializers,
            body,
            location: loc,
        })
    }

    /// Parse function definition: type name(params) { body }
    pub(crate) fn parse_function_definition(&mut self) -> Result<MethodDecl, ParseError> {
        let return_type = self.parse_type()?;
        let name = self.expect_identifier("for function name")?;
        let loc = self.previous_location();
        self.parse_function_rest(return_type, name, loc)
    }

    fn parse_function_rest(
        &mut self,
        return_type: Type,
        name: String,
        loc: SourceLocation,
    ) -> Result<MethodDecl, ParseError> {
        self.expect_lparen("after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect_rparen("after parameters")?;

        // `int get() const { ... }`
        self.match_token(&Token::Const(self.current_location()));

        self.expect_lbrace("before function body")?;
        let body = self.parse_block_statements()?;
        self.expect_rbrace("after function body")?;

        Ok(MethodDecl {
            name,
            params,
            return_type,
            body,
            location: loc,
        })
    }

    /// Parse parameter list: (type name, type name, ...)
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(params);
        }

        // `(void)` means no parameters
        if self.check(&Token::Void(self.current_location()))
            && self.check_ahead(1, &Token::RParen(self.current_location()))
        {
            self.advance();
            return Ok(params);
        }

        loop {
            let mut param_type = self.parse_type()?;
            let name = self.expect_identifier("for parameter name")?;

            // `char *argv[]` decays to a pointer
            if self.match_token(&Token::LBracket(self.current_location())) {
                self.expect_token(
                    &Token::RBracket(self.current_location()),
                    "after '[' in parameter",
                )?;
                param_type = param_type.with_pointer();
            }

            params.push(Param { name, param_type });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse type: [const] base_type [const] [*]* [&]
    pub(crate) fn parse_type(&mut self) -> Result<Type, ParseError> {
        let mut is_const = self.match_token(&Token::Const(self.current_location()));

        let base = match self.peek_token() {
            Token::Int(_) => BaseType::Int,
            Token::Float(_) => BaseType::Float,
            Token::Double(_) => BaseType::Double,
            Token::Char(_) => BaseType::Char,
            Token::Bool(_) => BaseType::Bool,
            Token::Void(_) => BaseType::Void,
            Token::Auto(_) => BaseType::Auto,
            Token::Ident(..) => {
                let name = self.parse_qualified_name("for type name")?;
                if name.is_std("string") {
                    BaseType::String
                } else {
                    BaseType::Class(name)
                }
            }
            _ => return Err(self.error_expected(&["type"], "at start of declaration")),
        };
        if !matches!(base, BaseType::String | BaseType::Class(_)) {
            self.advance();
        }

        is_const |= self.match_token(&Token::Const(self.current_location()));

        let mut ty = Type::new(base);
        if is_const {
            ty = ty.with_const();
        }
        while self.match_token(&Token::Star(self.current_location())) {
            ty = ty.with_pointer();
        }
        if self.match_token(&Token::Amp(self.current_location())) {
            ty = ty.with_reference();
        }

        Ok(ty)
    }
}
