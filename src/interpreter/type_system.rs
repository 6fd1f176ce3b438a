//! Declared-type coercion and zero values
//!
//! Every value stored into a variable, field, parameter or return slot goes
//! through [`Interpreter::coerce_to_type`], so a variable always holds a value
//! of its declared kind.
//!
//! # Coercion Rules
//!
//! - `int` accepts Int and Char, and truncates Float
//! - `float`/`double` accept Int, Char and Float
//! - `char` accepts Char, and Int when it is a valid code point
//! - `bool` and `string` accept only their own kind
//! - a class type accepts only instances of that class
//! - `auto` and pointer types accept anything except `void`

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::object::NamespaceId;
use crate::memory::value::Value;
use crate::parser::ast::{BaseType, SourceLocation, Type};
use std::rc::Rc;

impl Interpreter<'_> {
    /// Convert `value` to the kind required by `ty`, resolving class names
    /// from the current scope.
    pub(crate) fn coerce_to_type(
        &self,
        value: Value,
        ty: &Type,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let (ns, usings) = self.name_context();
        self.coerce_in(value, ty, ns, &usings, location)
    }

    /// Like [`Self::coerce_to_type`], with class names resolved from `ns`.
    pub(crate) fn coerce_in(
        &self,
        value: Value,
        ty: &Type,
        ns: NamespaceId,
        usings: &[NamespaceId],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        // Pointer-typed slots only exist so that `char *argv[]` binds
        if ty.pointer_depth > 0 {
            return Ok(value);
        }

        let mismatch = |value: &Value| -> Result<Value, RuntimeError> {
            Err(RuntimeError::type_error(
                ty.to_string(),
                value.type_name(),
                location,
            ))
        };

        match (&ty.base, value) {
            (BaseType::Auto, Value::Void) => mismatch(&Value::Void),
            (BaseType::Auto, value) => Ok(value),

            (BaseType::Int, Value::Int(n)) => Ok(Value::Int(n)),
            (BaseType::Int, Value::Char(c)) => Ok(Value::Int(c as i32)),
            (BaseType::Int, Value::Float(x)) => float_to_int(x, location).map(Value::Int),

            (BaseType::Float | BaseType::Double, Value::Float(x)) => Ok(Value::Float(x)),
            (BaseType::Float | BaseType::Double, Value::Int(n)) => Ok(Value::Float(n as f64)),
            (BaseType::Float | BaseType::Double, Value::Char(c)) => {
                Ok(Value::Float(c as u32 as f64))
            }

            (BaseType::Char, Value::Char(c)) => Ok(Value::Char(c)),
            (BaseType::Char, Value::Int(n)) => int_to_char(n, location).map(Value::Char),

            (BaseType::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
            (BaseType::String, Value::Str(s)) => Ok(Value::Str(s)),
            (BaseType::Void, Value::Void) => Ok(Value::Void),

            (BaseType::Class(name), Value::Object(obj)) => {
                let class = self
                    .symbols
                    .lookup_class(ns, usings, name)
                    .ok_or_else(|| RuntimeError::unbound(name, location))?;
                if Rc::ptr_eq(&obj.borrow().class, &class) {
                    Ok(Value::Object(obj))
                } else {
                    mismatch(&Value::Object(obj))
                }
            }

            (_, value) => mismatch(&value),
        }
    }

    /// Value of an uninitialised declaration of type `ty`.
    ///
    /// Class types are default-constructed.
    pub(crate) fn zero_value(
        &mut self,
        ty: &Type,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if ty.pointer_depth > 0 {
            return Ok(Value::Void);
        }
        match &ty.base {
            BaseType::Int => Ok(Value::Int(0)),
            BaseType::Float | BaseType::Double => Ok(Value::Float(0.0)),
            BaseType::Char => Ok(Value::Char('\0')),
            BaseType::Bool => Ok(Value::Bool(false)),
            BaseType::String => Ok(Value::Str(String::new())),
            BaseType::Void => Ok(Value::Void),
            BaseType::Auto => Err(RuntimeError::type_error(
                "an initializer for 'auto'",
                "none",
                location,
            )),
            BaseType::Class(name) => {
                let class = self.resolve_class(name, location)?;
                self.instantiate(class, Vec::new(), location)
                    .map(Value::Object)
            }
        }
    }
}

/// Truncate toward zero, failing when the result does not fit in 32 bits.
pub(crate) fn float_to_int(x: f64, location: SourceLocation) -> Result<i32, RuntimeError> {
    let truncated = x.trunc();
    if truncated.is_nan() || truncated < i32::MIN as f64 || truncated > i32::MAX as f64 {
        return Err(RuntimeError::arithmetic(
            format!("{} does not fit in an int", x),
            location,
        ));
    }
    Ok(truncated as i32)
}

pub(crate) fn int_to_char(n: i32, location: SourceLocation) -> Result<char, RuntimeError> {
    u32::try_from(n)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| RuntimeError::arithmetic(format!("{} is not a valid char", n), location))
}

/// Require a `bool`, as every condition does.
pub(crate) fn expect_bool(value: &Value, location: SourceLocation) -> Result<bool, RuntimeError> {
    value
        .as_bool()
        .ok_or_else(|| RuntimeError::type_error("Bool", value.type_name(), location))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new(3, 1)
    }

    #[test]
    fn test_float_truncates_toward_zero() {
        assert_eq!(float_to_int(3.9, loc()).unwrap(), 3);
        assert_eq!(float_to_int(-3.9, loc()).unwrap(), -3);
        assert!(float_to_int(1e12, loc()).is_err());
        assert!(float_to_int(f64::NAN, loc()).is_err());
    }

    #[test]
    fn test_int_to_char_range() {
        assert_eq!(int_to_char(65, loc()).unwrap(), 'A');
        assert!(int_to_char(-1, loc()).is_err());
        assert!(int_to_char(0xD800, loc()).is_err());
    }

    #[test]
    fn test_condition_must_be_bool() {
        assert!(expect_bool(&Value::Bool(true), loc()).unwrap());
        let err = expect_bool(&Value::Int(1), loc()).unwrap_err();
        assert_eq!(err.to_string(), "TypeError at line 3: expected Bool, got Int");
    }
}
