//! Binary operator evaluation
//!
//! `&&` and `||` short-circuit and take only Bool operands. Every other
//! operator evaluates both sides, left first, and dispatches on the pair of
//! value kinds in [`apply_binary`].

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::type_system::expect_bool;
use crate::memory::value::Value;
use crate::parser::ast::{AstNode, BinOp, SourceLocation};
use std::cmp::Ordering;
use std::rc::Rc;

impl Interpreter<'_> {
    pub(crate) fn evaluate_binary_op(
        &mut self,
        op: BinOp,
        left: &AstNode,
        right: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match op {
            BinOp::And | BinOp::Or => {
                let left_val = self.evaluate_expr(left)?;
                let left_bool = expect_bool(&left_val, *left.location())?;
                match (op, left_bool) {
                    (BinOp::And, false) => return Ok(Value::Bool(false)),
                    (BinOp::Or, true) => return Ok(Value::Bool(true)),
                    _ => {}
                }
                let right_val = self.evaluate_expr(right)?;
                expect_bool(&right_val, *right.location()).map(Value::Bool)
            }
            _ => {
                let left_val = self.evaluate_expr(left)?;
                let right_val = self.evaluate_expr(right)?;
                apply_binary(op, &left_val, &right_val, location)
            }
        }
    }
}

/// Numeric view of a value; Char counts as its code point.
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i32),
    Float(f64),
}

impl Num {
    #[inline]
    fn of(value: &Value) -> Option<Num> {
        match value {
            Value::Int(n) => Some(Num::Int(*n)),
            Value::Char(c) => Some(Num::Int(*c as i32)),
            Value::Float(x) => Some(Num::Float(*x)),
            _ => None,
        }
    }

    #[inline]
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(x) => x,
        }
    }
}

fn mismatch(op: BinOp, left: &Value, right: &Value, location: SourceLocation) -> RuntimeError {
    RuntimeError::type_error(
        format!("compatible operands for '{}'", op),
        format!("{} and {}", left.type_name(), right.type_name()),
        location,
    )
}

/// Apply a non-short-circuit binary operator to two evaluated operands.
pub(crate) fn apply_binary(
    op: BinOp,
    left: &Value,
    right: &Value,
    location: SourceLocation,
) -> Result<Value, RuntimeError> {
    if let (Some(a), Some(b)) = (Num::of(left), Num::of(right)) {
        return match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                arithmetic(op, a, b, location)
            }
            _ => {
                let ordering = match (a, b) {
                    (Num::Int(x), Num::Int(y)) => Some(x.cmp(&y)),
                    _ => a.as_f64().partial_cmp(&b.as_f64()),
                };
                Ok(Value::Bool(compare(op, ordering)))
            }
        };
    }

    match (left, right) {
        (Value::Str(a), Value::Str(b)) => match op {
            BinOp::Add => Ok(Value::Str(format!("{}{}", a, b))),
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                Ok(Value::Bool(compare(op, Some(a.cmp(b)))))
            }
            _ => Err(mismatch(op, left, right, location)),
        },
        (Value::Str(a), Value::Char(c)) if op == BinOp::Add => {
            let mut joined = a.clone();
            joined.push(*c);
            Ok(Value::Str(joined))
        }
        (Value::Char(c), Value::Str(b)) if op == BinOp::Add => {
            Ok(Value::Str(format!("{}{}", c, b)))
        }
        (Value::Bool(a), Value::Bool(b)) => match op {
            BinOp::Eq => Ok(Value::Bool(a == b)),
            BinOp::Ne => Ok(Value::Bool(a != b)),
            _ => Err(mismatch(op, left, right, location)),
        },
        (Value::Object(a), Value::Object(b)) => match op {
            BinOp::Eq => Ok(Value::Bool(Rc::ptr_eq(a, b))),
            BinOp::Ne => Ok(Value::Bool(!Rc::ptr_eq(a, b))),
            _ => Err(mismatch(op, left, right, location)),
        },
        _ => Err(mismatch(op, left, right, location)),
    }
}

#[inline]
fn compare(op: BinOp, ordering: Option<Ordering>) -> bool {
    match (op, ordering) {
        // NaN compares unequal to everything
        (BinOp::Ne, None) => true,
        (_, None) => false,
        (BinOp::Eq, Some(o)) => o == Ordering::Equal,
        (BinOp::Ne, Some(o)) => o != Ordering::Equal,
        (BinOp::Lt, Some(o)) => o == Ordering::Less,
        (BinOp::Le, Some(o)) => o != Ordering::Greater,
        (BinOp::Gt, Some(o)) => o == Ordering::Greater,
        (BinOp::Ge, Some(o)) => o != Ordering::Less,
        _ => false,
    }
}

fn arithmetic(op: BinOp, a: Num, b: Num, location: SourceLocation) -> Result<Value, RuntimeError> {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => {
            let result = match op {
                BinOp::Add => x.checked_add(y),
                BinOp::Sub => x.checked_sub(y),
                BinOp::Mul => x.checked_mul(y),
                BinOp::Div => {
                    if y == 0 {
                        return Err(RuntimeError::arithmetic("division by zero", location));
                    }
                    x.checked_div(y)
                }
                BinOp::Mod => {
                    if y == 0 {
                        return Err(RuntimeError::arithmetic("modulo by zero", location));
                    }
                    x.checked_rem(y)
                }
                _ => None,
            };
            result.map(Value::Int).ok_or_else(|| {
                RuntimeError::arithmetic(format!("integer overflow in {} {} {}", x, op, y), location)
            })
        }
        _ => {
            let (x, y) = (a.as_f64(), b.as_f64());
            match op {
                BinOp::Add => Ok(Value::Float(x + y)),
                BinOp::Sub => Ok(Value::Float(x - y)),
                BinOp::Mul => Ok(Value::Float(x * y)),
                BinOp::Div => Ok(Value::Float(x / y)),
                _ => Err(RuntimeError::type_error(
                    format!("Int operands for '{}'", op),
                    "Float",
                    location,
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new(1, 1)
    }

    fn apply(op: BinOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
        apply_binary(op, &left, &right, loc())
    }

    #[test]
    fn test_int_float_promotion() {
        assert_eq!(apply(BinOp::Add, Value::Int(1), Value::Float(0.5)).unwrap(), Value::Float(1.5));
        assert_eq!(apply(BinOp::Div, Value::Int(7), Value::Int(2)).unwrap(), Value::Int(3));
        assert_eq!(apply(BinOp::Div, Value::Float(7.0), Value::Int(2)).unwrap(), Value::Float(3.5));
    }

    #[test]
    fn test_char_is_its_code_point() {
        assert_eq!(apply(BinOp::Add, Value::Char('a'), Value::Int(1)).unwrap(), Value::Int(98));
        assert_eq!(apply(BinOp::Lt, Value::Char('a'), Value::Char('b')).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_division_by_zero() {
        let err = apply(BinOp::Div, Value::Int(1), Value::Int(0)).unwrap_err();
        assert_eq!(err.to_string(), "ArithmeticError at line 1: division by zero");
        assert!(apply(BinOp::Mod, Value::Int(1), Value::Int(0)).is_err());
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = apply(BinOp::Add, Value::Int(i32::MAX), Value::Int(1)).unwrap_err();
        assert!(matches!(err, RuntimeError::Arithmetic { .. }));
        assert!(apply(BinOp::Div, Value::Int(i32::MIN), Value::Int(-1)).is_err());
    }

    #[test]
    fn test_float_modulo_is_type_error() {
        let err = apply(BinOp::Mod, Value::Float(1.0), Value::Int(2)).unwrap_err();
        assert!(matches!(err, RuntimeError::Type { .. }));
    }

    #[test]
    fn test_bool_never_numeric() {
        let err = apply(BinOp::Eq, Value::Bool(true), Value::Int(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "TypeError at line 1: expected compatible operands for '==', got Bool and Int"
        );
        assert!(apply(BinOp::Add, Value::Bool(true), Value::Bool(true)).is_err());
        assert_eq!(apply(BinOp::Ne, Value::Bool(true), Value::Bool(false)).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_strings() {
        let s = |t: &str| Value::Str(t.to_string());
        assert_eq!(apply(BinOp::Add, s("ab"), s("cd")).unwrap(), s("abcd"));
        assert_eq!(apply(BinOp::Add, s("ab"), Value::Char('!')).unwrap(), s("ab!"));
        assert_eq!(apply(BinOp::Lt, s("apple"), s("banana")).unwrap(), Value::Bool(true));
        assert!(apply(BinOp::Add, s("n"), Value::Int(1)).is_err());
    }

    #[test]
    fn test_nan_comparisons() {
        let nan = Value::Float(f64::NAN);
        assert_eq!(apply(BinOp::Eq, nan.clone(), nan.clone()).unwrap(), Value::Bool(false));
        assert_eq!(apply(BinOp::Ne, nan.clone(), Value::Int(0)).unwrap(), Value::Bool(true));
        assert_eq!(apply(BinOp::Ge, nan, Value::Int(0)).unwrap(), Value::Bool(false));
    }
}
