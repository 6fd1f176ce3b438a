//! Statement execution implementation
//!
//! This module handles the execution of statement nodes:
//!
//! - Variable declarations, including constructor-style `T x(args);`
//! - `if`/`else` and block statements
//! - `cout << ...` output chains
//! - Block-level `using namespace`
//!
//! Loops live in `loops`, `return`/`break`/`continue` in `jumps`.
//!
//! # Control Flow
//!
//! A statement list stops as soon as `control_flow` leaves
//! [`ControlFlow::Normal`]; the enclosing loop or call consumes the signal.

use crate::interpreter::constants::{STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::type_system::expect_bool;
use crate::memory::value::Value;
use crate::parser::ast::*;

impl Interpreter<'_> {
    pub(crate) fn enter_scope(&mut self) {
        self.stack.current_frame_mut().push_scope();
    }

    pub(crate) fn exit_scope(&mut self) {
        self.stack.current_frame_mut().pop_scope();
    }

    pub(crate) fn execute_statement(&mut self, stmt: &AstNode) -> Result<(), RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.execute_statement_inner(stmt)
        })
    }

    fn execute_statement_inner(&mut self, stmt: &AstNode) -> Result<(), RuntimeError> {
        self.checkpoint(*stmt.location())?;

        match stmt {
            AstNode::Block { statements, .. } => self.execute_scoped(statements),
            AstNode::VarDecl {
                var_type,
                declarators,
                ..
            } => {
                for declarator in declarators {
                    self.execute_declarator(var_type, declarator)?;
                }
                Ok(())
            }
            AstNode::Return { expr, location } => self.execute_return(expr.as_deref(), *location),
            AstNode::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => self.execute_if(condition, then_branch, else_branch.as_deref()),
            AstNode::While {
                condition,
                body,
                location,
            } => self.execute_while(condition, body, *location),
            AstNode::DoWhile {
                body,
                condition,
                location,
            } => self.execute_do_while(body, condition, *location),
            AstNode::For {
                init,
                condition,
                increment,
                body,
                location,
            } => self.execute_for(
                init.as_deref(),
                condition.as_deref(),
                increment.as_deref(),
                body,
                *location,
            ),
            AstNode::Break { .. } => {
                self.execute_break();
                Ok(())
            }
            AstNode::Continue { .. } => {
                self.execute_continue();
                Ok(())
            }
            AstNode::Output { items, location } => self.execute_output(items, *location),
            AstNode::UsingNamespace {
                namespace,
                location,
            } => self.execute_using(namespace, *location),
            AstNode::ExpressionStatement { expr, .. } => {
                self.evaluate_expr(expr)?;
                Ok(())
            }
            expr => {
                self.evaluate_expr(expr)?;
                Ok(())
            }
        }
    }

    /// Run statements in order until one raises control flow.
    pub(crate) fn execute_statements(&mut self, statements: &[AstNode]) -> Result<(), RuntimeError> {
        for stmt in statements {
            self.execute_statement(stmt)?;
            if self.control_flow != ControlFlow::Normal {
                break;
            }
        }
        Ok(())
    }

    /// Run statements inside a new block scope.
    pub(crate) fn execute_scoped(&mut self, statements: &[AstNode]) -> Result<(), RuntimeError> {
        self.enter_scope();
        let result = self.execute_statements(statements);
        self.exit_scope();
        result
    }

    fn execute_if(
        &mut self,
        condition: &AstNode,
        then_branch: &[AstNode],
        else_branch: Option<&[AstNode]>,
    ) -> Result<(), RuntimeError> {
        let cond_val = self.evaluate_expr(condition)?;
        if expect_bool(&cond_val, *condition.location())? {
            self.execute_scoped(then_branch)
        } else if let Some(else_stmts) = else_branch {
            self.execute_scoped(else_stmts)
        } else {
            Ok(())
        }
    }

    fn execute_declarator(
        &mut self,
        var_type: &Type,
        declarator: &Declarator,
    ) -> Result<(), RuntimeError> {
        let location = declarator.location;
        let value = match &declarator.init {
            Some(Initializer::Assign(expr)) => {
                let val = self.evaluate_expr(expr)?;
                self.coerce_to_type(val, var_type, location)?
            }
            Some(Initializer::Construct(args)) => self.construct_value(var_type, args, location)?,
            None => self.zero_value(var_type, location)?,
        };

        self.stack.current_frame_mut().declare_var(
            declarator.name.clone(),
            var_type.clone(),
            value,
        );
        Ok(())
    }

    /// `T x(args);` and `T x{args};`
    fn construct_value(
        &mut self,
        var_type: &Type,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if let (BaseType::Class(name), 0) = (&var_type.base, var_type.pointer_depth) {
            let class = self.resolve_class(name, location)?;
            let arg_values = self.evaluate_args(args)?;
            return self
                .instantiate(class, arg_values, location)
                .map(Value::Object);
        }

        match args {
            [] => self.zero_value(var_type, location),
            [arg] => {
                let val = self.evaluate_expr(arg)?;
                self.coerce_to_type(val, var_type, location)
            }
            _ => Err(RuntimeError::Arity {
                callee: var_type.to_string(),
                expected: 1,
                got: args.len(),
                location,
            }),
        }
    }

    fn execute_output(
        &mut self,
        items: &[OutputItem],
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        for item in items {
            match item {
                OutputItem::Expr(expr) => {
                    let value = self.evaluate_expr(expr)?;
                    let text = value.to_output_string().ok_or_else(|| {
                        RuntimeError::type_error(
                            "a printable value",
                            value.type_name(),
                            *expr.location(),
                        )
                    })?;
                    self.sink
                        .write(&text)
                        .map_err(|source| RuntimeError::Io { source, location })?;
                }
                OutputItem::Endl => {
                    self.sink
                        .write("\n")
                        .and_then(|()| self.sink.flush())
                        .map_err(|source| RuntimeError::Io { source, location })?;
                }
            }
        }
        Ok(())
    }

    fn execute_using(
        &mut self,
        namespace: &QualifiedName,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let (ns, usings) = self.name_context();
        let target = self
            .symbols
            .resolve_namespace(ns, &usings, &namespace.segments)
            .ok_or_else(|| RuntimeError::unbound(namespace, location))?;
        self.stack.current_frame_mut().add_using(target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::cancel::NeverCancel;
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::output::{BufferSink, OutputSink};
    use crate::parser::{lexer::tokenize, parse::parse};
    use std::io;

    fn run(source: &str) -> (Result<i32, RuntimeError>, String) {
        let unit = parse(tokenize(source).unwrap()).unwrap();
        let mut sink = BufferSink::new();
        let result = Interpreter::new(&unit, &mut sink, &NeverCancel).and_then(|mut i| i.run());
        (result, sink.contents().to_string())
    }

    #[test]
    fn test_output_chain() {
        let (result, out) = run("using namespace std; int main() { cout << \"a\" << 1 << endl; }");
        assert_eq!(result.unwrap(), 0);
        assert_eq!(out, "a1\n");
    }

    #[test]
    fn test_output_formats_each_kind() {
        let (_, out) = run(
            "int main() { std::cout << 2.5 << ' ' << true << ' ' << 'c' << ' ' << 3.0 << std::endl; }",
        );
        assert_eq!(out, "2.5 1 c 3\n");
    }

    #[test]
    fn test_block_shadowing() {
        let source = r#"
            using namespace std;
            int main() {
                int x = 1;
                {
                    int x = 2;
                    cout << x;
                }
                cout << x;
                return 0;
            }
        "#;
        assert_eq!(run(source).1, "21");
    }

    #[test]
    fn test_if_else_chain() {
        let source = r#"
            using namespace std;
            int main() {
                int n = 5;
                if (n < 3) { cout << "small"; }
                else if (n < 10) { cout << "medium"; }
                else { cout << "large"; }
            }
        "#;
        assert_eq!(run(source).1, "medium");
    }

    #[test]
    fn test_multiple_declarators_and_zero_values() {
        let source = r#"
            using namespace std;
            int main() {
                int a = 1, b, c = a + 2;
                double d;
                bool flag;
                string s;
                cout << a << b << c << d << flag << s << "|";
            }
        "#;
        assert_eq!(run(source).1, "10300|");
    }

    #[test]
    fn test_declared_type_coercion() {
        let source = r#"
            using namespace std;
            int main() {
                int i = 3.7;
                double d = 2;
                char c = 66;
                int code = 'A';
                cout << i << " " << d << " " << c << " " << code;
            }
        "#;
        assert_eq!(run(source).1, "3 2 B 65");
    }

    #[test]
    fn test_bool_rejects_int() {
        let (result, _) = run("int main() { bool b = 1; }");
        assert!(matches!(result, Err(RuntimeError::Type { .. })));
    }

    #[test]
    fn test_printing_void_is_type_error() {
        let (result, out) = run("void f() {} int main() { std::cout << \"x\" << f(); }");
        assert!(matches!(result, Err(RuntimeError::Type { .. })));
        assert_eq!(out, "x");
    }

    #[test]
    fn test_block_using_ends_with_block() {
        let source = r#"
            namespace util { int twice(int n) { return n * 2; } }
            int main() {
                {
                    using namespace util;
                    std::cout << twice(2);
                }
                return twice(1);
            }
        "#;
        let (result, out) = run(source);
        assert_eq!(out, "4");
        assert!(matches!(result, Err(RuntimeError::UnboundName { .. })));
    }

    struct FailingSink;

    impl OutputSink for FailingSink {
        fn write(&mut self, _text: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_sink_failure_is_io_error() {
        let unit = parse(tokenize("int main() {\n std::cout << 1;\n}").unwrap()).unwrap();
        let mut sink = FailingSink;
        let err = Interpreter::new(&unit, &mut sink, &NeverCancel)
            .and_then(|mut i| i.run())
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Io { .. }));
        assert_eq!(err.location().map(|l| l.line), Some(2));
    }
}
