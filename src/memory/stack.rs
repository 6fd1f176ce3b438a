//! Call stack implementation
//!
//! This module provides the call stack for function and method execution:
//! - [`Stack`]: The call stack containing frames
//! - [`StackFrame`]: A single call's activation record
//! - [`LocalVar`]: A local variable with its declared type
//!
//! # Scoping
//!
//! Each frame keeps one flat map of visible locals plus a stack of block
//! scopes. A block scope remembers which names it declared and which outer
//! bindings it shadowed, so leaving the block restores the outer view. Block
//! scopes also carry the namespaces imported by a block-level
//! `using namespace`, which stop applying when the block ends.
//!
//! The receiver (`this`) lives in the frame, so it is bound for exactly one
//! call.

use super::object::{NamespaceId, ObjectRef};
use super::value::Value;
use crate::parser::ast::Type;
use rustc_hash::FxHashMap;

/// Local variable on the stack
#[derive(Debug, Clone)]
pub struct LocalVar {
    pub value: Value,
    pub var_type: Type,
}

#[derive(Debug, Clone, Default)]
struct ScopeData {
    shadowed: Vec<(String, LocalVar)>,
    declared: Vec<String>,
    using: Vec<NamespaceId>,
}

/// Stack frame for a function or method call
#[derive(Debug, Clone)]
pub struct StackFrame {
    pub function_name: String,
    pub receiver: Option<ObjectRef>,
    /// Namespace the callee was declared in
    pub namespace: NamespaceId,
    locals: FxHashMap<String, LocalVar>,
    scope_stack: Vec<ScopeData>,
}

impl StackFrame {
    pub fn new(
        function_name: String,
        receiver: Option<ObjectRef>,
        namespace: NamespaceId,
    ) -> Self {
        StackFrame {
            function_name,
            receiver,
            namespace,
            locals: FxHashMap::default(),
            scope_stack: vec![ScopeData::default()],
        }
    }

    /// Enter a new scope
    pub fn push_scope(&mut self) {
        self.scope_stack.push(ScopeData::default());
    }

    /// Exit the current scope
    pub fn pop_scope(&mut self) {
        // The function-level scope lives as long as the frame
        if self.scope_stack.len() <= 1 {
            return;
        }
        if let Some(scope) = self.scope_stack.pop() {
            for name in scope.declared {
                self.locals.remove(&name);
            }
            for (name, var) in scope.shadowed {
                self.locals.insert(name, var);
            }
        }
    }

    /// Declare a new local variable in the innermost scope
    pub fn declare_var(&mut self, name: String, var_type: Type, value: Value) {
        let new_var = LocalVar { value, var_type };
        let Some(scope) = self.scope_stack.last_mut() else {
            self.locals.insert(name, new_var);
            return;
        };

        // Redeclaring inside the same scope replaces without shadowing
        if scope.declared.contains(&name) {
            self.locals.insert(name, new_var);
        } else if let Some(old_var) = self.locals.insert(name.clone(), new_var) {
            scope.shadowed.push((name.clone(), old_var));
            scope.declared.push(name);
        } else {
            scope.declared.push(name);
        }
    }

    /// Import a namespace for the rest of the innermost scope
    pub fn add_using(&mut self, namespace: NamespaceId) {
        if let Some(scope) = self.scope_stack.last_mut() {
            if !scope.using.contains(&namespace) {
                scope.using.push(namespace);
            }
        }
    }

    /// Namespaces imported by enclosing blocks, innermost first
    pub fn active_usings(&self) -> Vec<NamespaceId> {
        self.scope_stack
            .iter()
            .rev()
            .flat_map(|scope| scope.using.iter().copied())
            .collect()
    }

    pub fn get_var(&self, name: &str) -> Option<&LocalVar> {
        self.locals.get(name)
    }

    pub fn get_var_mut(&mut self, name: &str) -> Option<&mut LocalVar> {
        self.locals.get_mut(name)
    }
}

/// The call stack
///
/// A base frame for the global namespace sits below every call, so there is
/// always a current frame.
#[derive(Debug, Clone)]
pub struct Stack {
    base: StackFrame,
    frames: Vec<StackFrame>,
}

impl Stack {
    pub fn new(global: NamespaceId) -> Self {
        Stack {
            base: StackFrame::new("<global>".to_string(), None, global),
            frames: Vec::new(),
        }
    }

    pub fn push_frame(&mut self, frame: StackFrame) {
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) -> Option<StackFrame> {
        self.frames.pop()
    }

    pub fn current_frame(&self) -> &StackFrame {
        self.frames.last().unwrap_or(&self.base)
    }

    pub fn current_frame_mut(&mut self) -> &mut StackFrame {
        match self.frames.last_mut() {
            Some(frame) => frame,
            None => &mut self.base,
        }
    }

    /// Number of active calls
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::BaseType;

    fn int() -> Type {
        Type::new(BaseType::Int)
    }

    #[test]
    fn test_inner_scope_shadows_and_restores() {
        let mut frame = StackFrame::new("main".to_string(), None, 0);
        frame.declare_var("x".to_string(), int(), Value::Int(1));

        frame.push_scope();
        frame.declare_var("x".to_string(), int(), Value::Int(2));
        frame.declare_var("y".to_string(), int(), Value::Int(3));
        assert_eq!(frame.get_var("x").unwrap().value, Value::Int(2));

        frame.pop_scope();
        assert_eq!(frame.get_var("x").unwrap().value, Value::Int(1));
        assert!(frame.get_var("y").is_none());
    }

    #[test]
    fn test_assignment_in_inner_scope_reaches_outer_variable() {
        let mut frame = StackFrame::new("main".to_string(), None, 0);
        frame.declare_var("x".to_string(), int(), Value::Int(1));

        frame.push_scope();
        frame.get_var_mut("x").unwrap().value = Value::Int(5);
        frame.pop_scope();

        assert_eq!(frame.get_var("x").unwrap().value, Value::Int(5));
    }

    #[test]
    fn test_block_using_ends_with_block() {
        let mut frame = StackFrame::new("main".to_string(), None, 0);
        frame.add_using(1);
        frame.push_scope();
        frame.add_using(2);
        assert_eq!(frame.active_usings(), vec![2, 1]);
        frame.pop_scope();
        assert_eq!(frame.active_usings(), vec![1]);
    }

    #[test]
    fn test_stack_always_has_a_frame() {
        let mut stack = Stack::new(0);
        assert_eq!(stack.current_frame().function_name, "<global>");
        stack.push_frame(StackFrame::new("main".to_string(), None, 0));
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current_frame_mut().function_name, "main");
        stack.pop_frame();
        assert_eq!(stack.depth(), 0);
        assert!(stack.pop_frame().is_none());
    }

    #[test]
    fn test_function_scope_is_never_popped() {
        let mut frame = StackFrame::new("f".to_string(), None, 0);
        frame.declare_var("a".to_string(), int(), Value::Int(1));
        frame.pop_scope();
        assert!(frame.get_var("a").is_some());
    }
}
