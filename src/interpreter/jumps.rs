use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::ast::{AstNode, SourceLocation};

impl Interpreter<'_> {
    pub(crate) fn execute_return(
        &mut self,
        expr: Option<&AstNode>,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let value = match expr {
            Some(ret_expr) => self.evaluate_expr(ret_expr)?,
            None => Value::Void,
        };
        self.control_flow = ControlFlow::Return { value, location };
        Ok(())
    }

    pub(crate) fn execute_break(&mut self) {
        self.control_flow = ControlFlow::Break;
    }

    pub(crate) fn execute_continue(&mut self) {
        self.control_flow = ControlFlow::Continue;
    }
}
