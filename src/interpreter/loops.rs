//! Loop statement execution (`while`, `do-while`, `for`).
//!
//! Adds `impl Interpreter` methods for the three loop forms. `break` and
//! `continue` are propagated via `LoopBodyResult` so the loop driver can
//! react without inspecting `control_flow` directly.
//!
//! `return` inside a loop body is handled by returning
//! `LoopBodyResult::Exit`, which causes the loop to unwind immediately and
//! let the enclosing call pick up the return value.
//!
//! The cancellation check is polled once per iteration, before the condition.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::type_system::expect_bool;
use crate::parser::ast::{AstNode, SourceLocation};

/// Result returned by [`Interpreter::execute_loop_body`] to signal how the body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally or via `continue`; the loop should iterate again.
    Continue,
    /// `break` was encountered; the loop should exit cleanly.
    Break,
    /// `return` was executed; the loop driver should unwind and leave
    /// `self.control_flow` for the caller.
    Exit,
}

impl Interpreter<'_> {
    /// Executes all statements in `body` inside a fresh scope.
    pub(crate) fn execute_loop_body(
        &mut self,
        body: &[AstNode],
    ) -> Result<LoopBodyResult, RuntimeError> {
        self.enter_scope();
        let result = self.execute_statements(body);
        self.exit_scope();
        result?;

        match self.control_flow {
            ControlFlow::Normal => Ok(LoopBodyResult::Continue),
            ControlFlow::Continue => {
                self.control_flow = ControlFlow::Normal;
                Ok(LoopBodyResult::Continue)
            }
            ControlFlow::Break => {
                self.control_flow = ControlFlow::Normal;
                Ok(LoopBodyResult::Break)
            }
            ControlFlow::Return { .. } => Ok(LoopBodyResult::Exit),
        }
    }

    fn loop_condition(&mut self, condition: &AstNode) -> Result<bool, RuntimeError> {
        let cond_val = self.evaluate_expr(condition)?;
        expect_bool(&cond_val, *condition.location())
    }

    /// Executes a `while (condition) { body }` loop.
    ///
    /// The condition is evaluated before each iteration.
    pub(crate) fn execute_while(
        &mut self,
        condition: &AstNode,
        body: &[AstNode],
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        loop {
            self.checkpoint(location)?;
            if !self.loop_condition(condition)? {
                break;
            }

            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit | LoopBodyResult::Break => break,
                LoopBodyResult::Continue => continue,
            }
        }
        Ok(())
    }

    /// Executes a `do { body } while (condition)` loop.
    ///
    /// The body always runs at least once; the condition is checked after each
    /// iteration.
    pub(crate) fn execute_do_while(
        &mut self,
        body: &[AstNode],
        condition: &AstNode,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        loop {
            self.checkpoint(location)?;

            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit | LoopBodyResult::Break => break,
                LoopBodyResult::Continue => {}
            }

            if !self.loop_condition(condition)? {
                break;
            }
        }
        Ok(())
    }

    /// Executes a `for (init; condition; increment) { body }` loop.
    ///
    /// `init`, `condition`, and `increment` are all optional. A missing
    /// condition is treated as always-true. The initializer and loop variable
    /// share a single scope that is exited when the loop ends.
    pub(crate) fn execute_for(
        &mut self,
        init: Option<&AstNode>,
        condition: Option<&AstNode>,
        increment: Option<&AstNode>,
        body: &[AstNode],
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        self.enter_scope(); // Scope for init and loop variable
        let result = self.run_for(init, condition, increment, body, location);
        self.exit_scope();
        result
    }

    fn run_for(
        &mut self,
        init: Option<&AstNode>,
        condition: Option<&AstNode>,
        increment: Option<&AstNode>,
        body: &[AstNode],
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        if let Some(init_stmt) = init {
            self.execute_statement(init_stmt)?;
        }

        loop {
            self.checkpoint(location)?;
            if let Some(cond) = condition {
                if !self.loop_condition(cond)? {
                    break;
                }
            }

            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit | LoopBodyResult::Break => break,
                LoopBodyResult::Continue => {}
            }

            if let Some(inc) = increment {
                self.evaluate_expr(inc)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::cancel::NeverCancel;
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::output::BufferSink;
    use crate::parser::{lexer::tokenize, parse::parse};

    fn output_of(body: &str) -> Result<String, RuntimeError> {
        let source = format!("using namespace std;\nint main() {{\n{}\n}}", body);
        let unit = parse(tokenize(&source).unwrap()).unwrap();
        let mut sink = BufferSink::new();
        Interpreter::new(&unit, &mut sink, &NeverCancel)?.run()?;
        Ok(sink.contents().to_string())
    }

    #[test]
    fn test_while_runs_three_times() {
        let out = output_of("int x = 0; while (x < 3) { cout << x << endl; x = x + 1; }").unwrap();
        assert_eq!(out, "0\n1\n2\n");
    }

    #[test]
    fn test_for_matches_while() {
        let out = output_of("for (int i = 0; i < 3; i = i + 1) { cout << i << endl; }").unwrap();
        assert_eq!(out, "0\n1\n2\n");
    }

    #[test]
    fn test_do_while_runs_body_once() {
        let out = output_of("int n = 10; do { cout << n; n++; } while (n < 3);").unwrap();
        assert_eq!(out, "10");
    }

    #[test]
    fn test_break_and_continue() {
        let out = output_of(
            "for (int i = 0; i < 10; i++) { if (i == 1) { continue; } if (i == 4) { break; } cout << i; }",
        )
        .unwrap();
        assert_eq!(out, "023");
    }

    #[test]
    fn test_return_inside_loop_leaves_function() {
        let out = output_of("while (true) { cout << \"once\"; return 0; } cout << \"never\";").unwrap();
        assert_eq!(out, "once");
    }

    #[test]
    fn test_loop_variable_scoped_to_loop() {
        let err = output_of("for (int i = 0; i < 1; i++) { } cout << i;").unwrap_err();
        assert!(matches!(err, RuntimeError::UnboundName { .. }));
    }

    #[test]
    fn test_int_condition_is_type_error() {
        let err = output_of("int x = 1; while (x) { x = 0; }").unwrap_err();
        assert!(matches!(err, RuntimeError::Type { .. }));
    }
}
