pub mod access;
pub mod assign;
pub mod binary;
pub mod unary;

// Operators are `impl Interpreter` blocks; `binary::apply_binary` is also
// usable on plain values.
