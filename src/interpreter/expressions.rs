//! Expression evaluation implementation
//!
//! This module handles evaluation of expression nodes:
//!
//! - Literals (integers, floats, characters, booleans, strings)
//! - Identifiers, which resolve to locals first and then to fields of `this`
//! - Free function calls, with unqualified names trying the receiver's
//!   methods first
//! - Class instantiation `T(args)`
//!
//! Operators, assignment and member access live in [`super::ops`].
//!
//! Operands are evaluated strictly left to right.

use crate::interpreter::constants::{STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::object::ObjectRef;
use crate::memory::value::Value;
use crate::parser::ast::*;
use std::rc::Rc;

impl Interpreter<'_> {
    /// Evaluate an expression and return its value
    pub(crate) fn evaluate_expr(&mut self, expr: &AstNode) -> Result<Value, RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.evaluate_expr_inner(expr))
    }

    fn evaluate_expr_inner(&mut self, expr: &AstNode) -> Result<Value, RuntimeError> {
        match expr {
            AstNode::IntLiteral(n, _) => Ok(Value::Int(*n)),
            AstNode::FloatLiteral(x, _) => Ok(Value::Float(*x)),
            AstNode::CharLiteral(c, _) => Ok(Value::Char(*c)),
            AstNode::BoolLiteral(b, _) => Ok(Value::Bool(*b)),
            AstNode::StringLiteral(s, _) => Ok(Value::Str(s.clone())),

            AstNode::Identifier(name, location) => self.lookup_identifier(name, *location),

            AstNode::This(location) => self
                .current_receiver()
                .map(Value::Object)
                .ok_or_else(|| RuntimeError::unbound("this", *location)),

            AstNode::Assignment {
                target,
                value,
                location,
            } => self.execute_assignment(target, value, *location),

            AstNode::BinaryOp {
                op,
                left,
                right,
                location,
            } => self.evaluate_binary_op(*op, left, right, *location),

            AstNode::UnaryOp {
                op,
                operand,
                location,
            } => self.evaluate_unary_op(*op, operand, *location),

            AstNode::FunctionCall {
                name,
                args,
                location,
            } => self.evaluate_function_call(name, args, *location),

            AstNode::MemberAccess {
                object,
                member,
                location,
            } => self.evaluate_member_access(object, member, *location),

            AstNode::MethodCall {
                object,
                method,
                args,
                location,
            } => self.evaluate_method_call(object, method, args, *location),

            AstNode::Instantiation {
                class,
                args,
                location,
            } => {
                let descriptor = self.resolve_class(class, *location)?;
                let arg_values = self.evaluate_args(args)?;
                self.instantiate(descriptor, arg_values, *location)
                    .map(Value::Object)
            }

            stmt => Err(RuntimeError::type_error(
                "an expression",
                "a statement",
                *stmt.location(),
            )),
        }
    }

    /// Evaluate call arguments left to right
    pub(crate) fn evaluate_args(&mut self, args: &[AstNode]) -> Result<Vec<Value>, RuntimeError> {
        args.iter().map(|arg| self.evaluate_expr(arg)).collect()
    }

    /// The object bound to `this` in the current call, if any
    pub(crate) fn current_receiver(&self) -> Option<ObjectRef> {
        self.stack.current_frame().receiver.clone()
    }

    fn lookup_identifier(
        &self,
        name: &QualifiedName,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        // Only functions and classes live in namespaces
        if name.is_qualified() {
            return Err(RuntimeError::unbound(name, location));
        }

        let frame = self.stack.current_frame();
        if let Some(var) = frame.get_var(name.last()) {
            return Ok(var.value.clone());
        }
        frame
            .receiver
            .as_ref()
            .and_then(|obj| obj.borrow().get(name.last()))
            .ok_or_else(|| RuntimeError::unbound(name, location))
    }

    fn evaluate_function_call(
        &mut self,
        name: &QualifiedName,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        // Inside a method, `helper()` means `this->helper()`
        if !name.is_qualified() {
            if let Some(receiver) = self.current_receiver() {
                let is_method = receiver.borrow().class.method(name.last()).is_some();
                if is_method {
                    let arg_values = self.evaluate_args(args)?;
                    return self.invoke_method(receiver, name.last(), arg_values, location);
                }
            }
        }

        let (ns, usings) = self.name_context();
        let function = self
            .symbols
            .lookup_function(ns, &usings, name)
            .ok_or_else(|| RuntimeError::unbound(name, location))?;

        let arg_values = self.evaluate_args(args)?;
        self.call_function(
            Rc::clone(&function.decl),
            function.namespace,
            None,
            arg_values,
            location,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::cancel::NeverCancel;
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::output::BufferSink;
    use crate::parser::{lexer::tokenize, parse::parse};

    fn run(source: &str) -> (Result<i32, RuntimeError>, String) {
        let unit = parse(tokenize(source).unwrap()).unwrap();
        let mut sink = BufferSink::new();
        let result = Interpreter::new(&unit, &mut sink, &NeverCancel).and_then(|mut i| i.run());
        (result, sink.contents().to_string())
    }

    #[test]
    fn test_recursive_function() {
        let source = r#"
            int fact(int n) {
                if (n <= 1) { return 1; }
                return n * fact(n - 1);
            }
            int main() { return fact(5); }
        "#;
        assert_eq!(run(source).0.unwrap(), 120);
    }

    #[test]
    fn test_forward_reference() {
        let source = "int main() { return later(); } int later() { return 3; }";
        assert_eq!(run(source).0.unwrap(), 3);
    }

    #[test]
    fn test_undeclared_variable() {
        let (result, _) = run("int main() {\n  return y;\n}");
        match result {
            Err(RuntimeError::UnboundName { name, location }) => {
                assert_eq!(name, "y");
                assert_eq!(location.line, 2);
            }
            other => panic!("expected UnboundName, got {:?}", other),
        }
    }

    #[test]
    fn test_function_arity_mismatch() {
        let (result, _) = run("int add(int a, int b) { return a + b; } int main() { return add(1); }");
        assert!(matches!(
            result,
            Err(RuntimeError::Arity {
                expected: 2,
                got: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_qualified_function_call() {
        let source = r#"
            namespace util {
                int square(int n) { return n * n; }
                namespace deep { int cube(int n) { return n * square(n); } }
            }
            int main() { return util::square(3) + util::deep::cube(2); }
        "#;
        assert_eq!(run(source).0.unwrap(), 17);
    }

    #[test]
    fn test_method_calls_sibling_without_this() {
        let source = r#"
            class Counter {
            public:
                int count;
                Counter() : count(0) {}
                void bump() { count = count + step(); }
                int step() { return 2; }
            };
            int main() {
                Counter c;
                c.bump();
                c.bump();
                return c.count;
            }
        "#;
        assert_eq!(run(source).0.unwrap(), 4);
    }

    #[test]
    fn test_this_outside_method() {
        let (result, _) = run("int main() { this; return 0; }");
        assert!(matches!(result, Err(RuntimeError::UnboundName { .. })));
    }

    #[test]
    fn test_arguments_evaluate_left_to_right() {
        let source = r#"
            using namespace std;
            int show(int n) { cout << n; return n; }
            int pair(int a, int b) { return a - b; }
            int main() { return pair(show(1), show(2)); }
        "#;
        let (result, out) = run(source);
        assert_eq!(result.unwrap(), -1);
        assert_eq!(out, "12");
    }
}
