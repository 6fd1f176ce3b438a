//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents every runtime
//! value in the simulator. Values are tagged: no implicit conversion happens
//! between variants except the numeric promotions applied by the evaluator.
//!
//! # Value Types
//!
//! - [`Value::Int`]: 32-bit signed integer
//! - [`Value::Float`]: 64-bit float (`float` and `double` share it)
//! - [`Value::Char`]: a single Unicode scalar
//! - [`Value::Bool`]: `true`/`false`, never implicitly numeric
//! - [`Value::Str`]: owned string
//! - [`Value::Object`]: shared handle to a class instance
//! - [`Value::Void`]: result of a `void` call

use super::object::ObjectRef;
use std::fmt;
use std::rc::Rc;

/// Runtime values in the simulator
#[derive(Debug, Clone, Default)]
pub enum Value {
    Int(i32),
    Float(f64),
    Char(char),
    Bool(bool),
    Str(String),
    Object(ObjectRef),
    #[default]
    Void,
}

impl Value {
    /// Name of the value's kind, used in `TypeError` messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::Int(_) => "Int".to_string(),
            Value::Float(_) => "Float".to_string(),
            Value::Char(_) => "Char".to_string(),
            Value::Bool(_) => "Bool".to_string(),
            Value::Str(_) => "String".to_string(),
            Value::Object(obj) => obj.borrow().class.name.clone(),
            Value::Void => "Void".to_string(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Textual form written by `cout <<`. Objects and `Void` have none.
    pub fn to_output_string(&self) -> Option<String> {
        match self {
            Value::Int(n) => Some(n.to_string()),
            Value::Float(x) => Some(format_float(*x)),
            Value::Char(c) => Some(c.to_string()),
            Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            Value::Str(s) => Some(s.clone()),
            Value::Object(_) | Value::Void => None,
        }
    }
}

/// Same variant and equal payload; objects compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Void, Value::Void) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Char(c) => write!(f, "'{}'", c.escape_default()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Object(obj) => write!(f, "<{} instance>", obj.borrow().class.name),
            Value::Void => write!(f, "void"),
            other => match other.to_output_string() {
                Some(text) => f.write_str(&text),
                None => Ok(()),
            },
        }
    }
}

const FLOAT_PRECISION: i32 = 6;

/// Format a float the way `std::cout` does by default: `%g` with six
/// significant digits and trailing zeros removed.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return if x.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounding to the target precision decides the exponent, e.g. 999999.5
    let scientific = format!("{:.*e}", (FLOAT_PRECISION - 1) as usize, x);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= FLOAT_PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (FLOAT_PRECISION - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, x)).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float_fixed() {
        assert_eq!(format_float(3.14), "3.14");
        assert_eq!(format_float(2.0), "2");
        assert_eq!(format_float(-0.5), "-0.5");
        assert_eq!(format_float(100.0), "100");
        assert_eq!(format_float(1.0 / 3.0), "0.333333");
        assert_eq!(format_float(123456.0), "123456");
        assert_eq!(format_float(0.0001), "0.0001");
    }

    #[test]
    fn test_format_float_scientific() {
        assert_eq!(format_float(1e6), "1e+06");
        assert_eq!(format_float(1234567.0), "1.23457e+06");
        assert_eq!(format_float(999999.5), "1e+06");
        assert_eq!(format_float(0.00001), "1e-05");
        assert_eq!(format_float(2.5e-10), "2.5e-10");
        assert_eq!(format_float(1e100), "1e+100");
    }

    #[test]
    fn test_format_float_special() {
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_output_strings() {
        assert_eq!(Value::Int(-7).to_output_string().unwrap(), "-7");
        assert_eq!(Value::Bool(true).to_output_string().unwrap(), "1");
        assert_eq!(Value::Bool(false).to_output_string().unwrap(), "0");
        assert_eq!(Value::Char('x').to_output_string().unwrap(), "x");
        assert_eq!(Value::Str("hi".into()).to_output_string().unwrap(), "hi");
        assert!(Value::Void.to_output_string().is_none());
    }

    #[test]
    fn test_equality_is_per_variant() {
        assert_eq!(Value::Int(1), Value::Int(1));
        assert_ne!(Value::Int(1), Value::Bool(true));
        assert_ne!(Value::Int(65), Value::Char('A'));
    }
}
