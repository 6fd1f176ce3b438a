use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::object::ObjectRef;
use crate::memory::value::Value;
use crate::parser::ast::{AstNode, SourceLocation};

impl Interpreter<'_> {
    /// Evaluate an expression that must produce an object.
    pub(crate) fn evaluate_object(&mut self, expr: &AstNode) -> Result<ObjectRef, RuntimeError> {
        match self.evaluate_expr(expr)? {
            Value::Object(obj) => Ok(obj),
            other => Err(RuntimeError::type_error(
                "an object",
                other.type_name(),
                *expr.location(),
            )),
        }
    }

    pub(crate) fn check_field(
        &self,
        obj: &ObjectRef,
        member: &str,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let obj = obj.borrow();
        if obj.class.field(member).is_some() {
            return Ok(());
        }
        Err(RuntimeError::UnknownMember {
            class: obj.class.name.clone(),
            member: member.to_string(),
            location,
        })
    }

    /// `obj.field` and `this->field`
    pub(crate) fn evaluate_member_access(
        &mut self,
        object: &AstNode,
        member: &str,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let obj = self.evaluate_object(object)?;
        self.check_field(&obj, member, location)?;
        let value = obj.borrow().get(member).unwrap_or_default();
        Ok(value)
    }

    /// `obj.method(args)` and `this->method(args)`
    pub(crate) fn evaluate_method_call(
        &mut self,
        object: &AstNode,
        method: &str,
        args: &[AstNode],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let obj = self.evaluate_object(object)?;

        let known = obj.borrow().class.method(method).is_some();
        if !known {
            let class = obj.borrow().class.name.clone();
            return Err(RuntimeError::UnknownMember {
                class,
                member: method.to_string(),
                location,
            });
        }

        let arg_values = self.evaluate_args(args)?;
        self.invoke_method(obj, method, arg_values, location)
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::cancel::NeverCancel;
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::output::BufferSink;
    use crate::parser::{lexer::tokenize, parse::parse};

    const POINT: &str = r#"
        class Point {
        public:
            int x;
            int y;
            Point(int a, int b) : x(a), y(b) {}
            int sum() { return this->x + y; }
            void shift(int d) { this->x = x + d; }
        };
    "#;

    fn run(main_body: &str) -> (Result<i32, RuntimeError>, String) {
        let source = format!("{}\nint main() {{ {} }}", POINT, main_body);
        let unit = parse(tokenize(&source).unwrap()).unwrap();
        let mut sink = BufferSink::new();
        let result = Interpreter::new(&unit, &mut sink, &NeverCancel).and_then(|mut i| i.run());
        (result, sink.contents().to_string())
    }

    #[test]
    fn test_field_read_and_method() {
        let (result, _) = run("Point p(2, 3); return p.sum() * 10 + p.x;");
        assert_eq!(result.unwrap(), 52);
    }

    #[test]
    fn test_objects_share_state() {
        let (result, _) = run("Point a(1, 1); Point b = a; b.shift(4); return a.x;");
        assert_eq!(result.unwrap(), 5);
    }

    #[test]
    fn test_field_assignment_from_outside() {
        let (result, _) = run("Point p = Point(0, 0); p.y = 9; return p.y;");
        assert_eq!(result.unwrap(), 9);
    }

    #[test]
    fn test_unknown_method() {
        let (result, _) = run("Point p(1, 2); p.length(); return 0;");
        match result {
            Err(RuntimeError::UnknownMember { class, member, .. }) => {
                assert_eq!(class, "Point");
                assert_eq!(member, "length");
            }
            other => panic!("expected UnknownMember, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_field() {
        let (result, _) = run("Point p(1, 2); return p.z;");
        assert!(matches!(result, Err(RuntimeError::UnknownMember { .. })));
    }

    #[test]
    fn test_method_arity() {
        let (result, _) = run("Point p(1, 2); p.shift(1, 2); return 0;");
        match result {
            Err(err @ RuntimeError::Arity { .. }) => {
                assert!(err.to_string().contains("'Point::shift' expects 1 argument, got 2"));
            }
            other => panic!("expected ArityError, got {:?}", other),
        }
    }

    #[test]
    fn test_constructor_arity() {
        let (result, _) = run("Point p(1); return 0;");
        assert!(matches!(result, Err(RuntimeError::Arity { expected: 2, got: 1, .. })));
    }

    #[test]
    fn test_member_access_on_int() {
        let (result, _) = run("int n = 1; return n.x;");
        assert!(matches!(result, Err(RuntimeError::Type { .. })));
    }
}
