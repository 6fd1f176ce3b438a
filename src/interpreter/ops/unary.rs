//! Unary operator evaluation

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::type_system::{expect_bool, int_to_char};
use crate::memory::value::Value;
use crate::parser::ast::*;

impl Interpreter<'_> {
    pub(crate) fn evaluate_unary_op(
        &mut self,
        op: UnOp,
        operand: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        use UnOp::*;

        match op {
            Neg | Plus => {
                let val = self.evaluate_expr(operand)?;
                apply_sign(op, val, location)
            }
            Not => {
                let val = self.evaluate_expr(operand)?;
                expect_bool(&val, *operand.location()).map(|b| Value::Bool(!b))
            }
            PreInc | PreDec | PostInc | PostDec => {
                self.evaluate_inc_dec_op(op, operand, location)
            }
        }
    }

    /// `++x`, `--x`, `x++`, `x--` on a variable or field
    fn evaluate_inc_dec_op(
        &mut self,
        op: UnOp,
        operand: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(operand)?;
        let old = self.read_place(&place, location)?;
        let delta = if matches!(op, UnOp::PreInc | UnOp::PostInc) { 1 } else { -1 };

        let new = match &old {
            Value::Int(n) => n.checked_add(delta).map(Value::Int).ok_or_else(|| {
                RuntimeError::arithmetic(format!("integer overflow stepping {}", n), location)
            })?,
            Value::Char(c) => Value::Char(int_to_char(*c as i32 + delta, location)?),
            Value::Float(x) => Value::Float(x + delta as f64),
            other => {
                return Err(RuntimeError::type_error(
                    "Int, Char or Float",
                    other.type_name(),
                    location,
                ))
            }
        };

        let stored = self.write_place(&place, new, location)?;
        match op {
            UnOp::PostInc | UnOp::PostDec => Ok(old),
            _ => Ok(stored),
        }
    }
}

fn apply_sign(op: UnOp, val: Value, location: SourceLocation) -> Result<Value, RuntimeError> {
    let negate = op == UnOp::Neg;
    match val {
        Value::Int(n) if negate => n.checked_neg().map(Value::Int).ok_or_else(|| {
            RuntimeError::arithmetic(format!("integer overflow in -({})", n), location)
        }),
        Value::Int(n) => Ok(Value::Int(n)),
        Value::Char(c) if negate => Ok(Value::Int(-(c as i32))),
        Value::Char(c) => Ok(Value::Int(c as i32)),
        Value::Float(x) if negate => Ok(Value::Float(-x)),
        Value::Float(x) => Ok(Value::Float(x)),
        other => Err(RuntimeError::type_error(
            "a number",
            other.type_name(),
            location,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::cancel::NeverCancel;
    use crate::output::BufferSink;
    use crate::parser::{lexer::tokenize, parse::parse};

    fn run(body: &str) -> (Result<i32, RuntimeError>, String) {
        let source = format!("using namespace std;\nint main() {{ {} }}", body);
        let unit = parse(tokenize(&source).unwrap()).unwrap();
        let mut sink = BufferSink::new();
        let result = Interpreter::new(&unit, &mut sink, &NeverCancel).and_then(|mut i| i.run());
        (result, sink.contents().to_string())
    }

    #[test]
    fn test_negation() {
        let loc = SourceLocation::new(1, 1);
        assert_eq!(apply_sign(UnOp::Neg, Value::Int(5), loc).unwrap(), Value::Int(-5));
        assert_eq!(apply_sign(UnOp::Neg, Value::Float(1.5), loc).unwrap(), Value::Float(-1.5));
        assert!(apply_sign(UnOp::Neg, Value::Int(i32::MIN), loc).is_err());
        assert!(apply_sign(UnOp::Plus, Value::Bool(true), loc).is_err());
    }

    #[test]
    fn test_prefix_and_postfix() {
        let (_, out) = run("int i = 5; cout << i++ << \" \" << i << \" \" << ++i << \" \" << i--;");
        assert_eq!(out, "5 6 7 7");
    }

    #[test]
    fn test_char_and_float_steps() {
        let (_, out) = run("char c = 'a'; c++; double d = 1.5; --d; cout << c << d;");
        assert_eq!(out, "b0.5");
    }

    #[test]
    fn test_not_requires_bool() {
        let (_, out) = run("bool b = !false; cout << b << !(1 < 2);");
        assert_eq!(out, "10");
        let (result, _) = run("int n = 0; bool b = !n; return 0;");
        assert!(matches!(result, Err(RuntimeError::Type { .. })));
    }

    #[test]
    fn test_increment_string_is_type_error() {
        let (result, _) = run("string s = \"x\"; s++; return 0;");
        assert!(matches!(result, Err(RuntimeError::Type { .. })));
    }
}
