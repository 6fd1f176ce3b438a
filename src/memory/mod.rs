//! Runtime memory model
//!
//! - [`value`]: tagged runtime values (Int, Float, Char, Bool, String, Object, Void)
//! - [`object`]: class descriptors and reference-counted object instances
//! - [`stack`]: call frames with block scopes, receivers and `using` imports
//!
//! Objects have reference semantics: copying a [`value::Value::Object`]
//! copies the handle, and an instance is dropped with its last handle.

pub mod object;
pub mod stack;
pub mod value;
