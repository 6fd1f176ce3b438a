// Execution engine for the C++ subset

use crate::interpreter::cancel::CancelCheck;
use crate::interpreter::constants::{MAX_CALL_DEPTH, STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::symbols::{SymbolTable, GLOBAL_NAMESPACE};
use crate::memory::object::{ClassDescriptor, NamespaceId, Object, ObjectRef};
use crate::memory::stack::{Stack, StackFrame};
use crate::memory::value::Value;
use crate::output::OutputSink;
use crate::parser::ast::{MethodDecl, QualifiedName, SourceLocation, TranslationUnit};
use std::rc::Rc;
use tracing::{debug, trace};

/// Non-local control flow raised by `break`, `continue` and `return`
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ControlFlow {
    Normal,
    Break,
    Continue,
    Return {
        value: Value,
        location: SourceLocation,
    },
}

/// Tree-walking interpreter for one translation unit
///
/// The output sink and the cancellation check are borrowed for the whole
/// run.
pub struct Interpreter<'a> {
    pub(crate) symbols: SymbolTable,
    pub(crate) stack: Stack,
    pub(crate) sink: &'a mut dyn OutputSink,
    cancel: &'a dyn CancelCheck,
    pub(crate) control_flow: ControlFlow,
}

impl<'a> Interpreter<'a> {
    /// Run the declaration pass over `unit`.
    pub fn new(
        unit: &TranslationUnit,
        sink: &'a mut dyn OutputSink,
        cancel: &'a dyn CancelCheck,
    ) -> Result<Self, RuntimeError> {
        let symbols = SymbolTable::declare(unit)?;
        Ok(Interpreter {
            symbols,
            stack: Stack::new(GLOBAL_NAMESPACE),
            sink,
            cancel,
            control_flow: ControlFlow::Normal,
        })
    }

    /// Run `main` and return its exit status
    pub fn run(&mut self) -> Result<i32, RuntimeError> {
        let entry = self
            .symbols
            .entry_function()
            .ok_or(RuntimeError::NoEntryFunction)?;
        let location = entry.decl.location;
        debug!(line = location.line, "entry function found");

        // `int main(int argc, char *argv[])` gets zero values
        let mut args = Vec::with_capacity(entry.decl.params.len());
        for param in &entry.decl.params {
            args.push(self.zero_value(&param.param_type, location)?);
        }

        match self.call_function(entry.decl, entry.namespace, None, args, location)? {
            Value::Int(status) => Ok(status),
            Value::Void => Ok(0),
            other => Err(RuntimeError::type_error("Int", other.type_name(), location)),
        }
    }

    /// Poll the host's cancellation check
    pub(crate) fn checkpoint(&self, location: SourceLocation) -> Result<(), RuntimeError> {
        if self.cancel.is_cancelled() {
            debug!(line = location.line, "cancelled by host");
            return Err(RuntimeError::Cancelled { location });
        }
        Ok(())
    }

    /// Namespace and block-level imports used for name lookup at this point
    pub(crate) fn name_context(&self) -> (NamespaceId, Vec<NamespaceId>) {
        let frame = self.stack.current_frame();
        (frame.namespace, frame.active_usings())
    }

    pub(crate) fn resolve_class(
        &self,
        name: &QualifiedName,
        location: SourceLocation,
    ) -> Result<Rc<ClassDescriptor>, RuntimeError> {
        let (ns, usings) = self.name_context();
        self.symbols
            .lookup_class(ns, &usings, name)
            .ok_or_else(|| RuntimeError::unbound(name, location))
    }

    fn enter_frame(
        &mut self,
        callee: String,
        receiver: Option<ObjectRef>,
        namespace: NamespaceId,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        if self.stack.depth() >= MAX_CALL_DEPTH {
            return Err(RuntimeError::StackOverflow {
                limit: MAX_CALL_DEPTH,
                location,
            });
        }
        trace!(callee = %callee, depth = self.stack.depth() + 1, line = location.line, "call");
        self.stack
            .push_frame(StackFrame::new(callee, receiver, namespace));
        Ok(())
    }

    fn leave_frame(&mut self) {
        self.stack.pop_frame();
        self.control_flow = ControlFlow::Normal;
    }

    /// Call a free function or, with a receiver, a method.
    pub(crate) fn call_function(
        &mut self,
        decl: Rc<MethodDecl>,
        namespace: NamespaceId,
        receiver: Option<ObjectRef>,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        self.checkpoint(location)?;

        let callee = match &receiver {
            Some(obj) => format!("{}::{}", obj.borrow().class.name, decl.name),
            None => decl.name.clone(),
        };
        if args.len() != decl.params.len() {
            return Err(RuntimeError::Arity {
                callee,
                expected: decl.params.len(),
                got: args.len(),
                location,
            });
        }

        self.enter_frame(callee, receiver, namespace, location)?;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.run_function_body(&decl, args, location)
        });
        self.leave_frame();
        result
    }

    fn run_function_body(
        &mut self,
        decl: &MethodDecl,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        for (param, arg) in decl.params.iter().zip(args) {
            let value = self.coerce_to_type(arg, &param.param_type, location)?;
            self.stack.current_frame_mut().declare_var(
                param.name.clone(),
                param.param_type.clone(),
                value,
            );
        }

        self.execute_statements(&decl.body)?;

        let returned = match std::mem::replace(&mut self.control_flow, ControlFlow::Normal) {
            ControlFlow::Return { value, location } => Some((value, location)),
            _ => None,
        };

        if decl.return_type.is_void() {
            return match returned {
                None | Some((Value::Void, _)) => Ok(Value::Void),
                Some((other, at)) => Err(RuntimeError::type_error("void", other.type_name(), at)),
            };
        }
        match returned {
            Some((value, at)) => self.coerce_to_type(value, &decl.return_type, at),
            // Falling off the end of a non-void function
            None => self.zero_value(&decl.return_type, location),
        }
    }

    /// Call a method by name on an object.
    pub(crate) fn invoke_method(
        &mut self,
        object: ObjectRef,
        name: &str,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let (method, namespace, class_name) = {
            let obj = object.borrow();
            (
                obj.class.method(name),
                obj.class.namespace,
                obj.class.name.clone(),
            )
        };
        let method = method.ok_or_else(|| RuntimeError::UnknownMember {
            class: class_name,
            member: name.to_string(),
            location,
        })?;
        self.call_function(method, namespace, Some(object), args, location)
    }

    /// Create an instance of `class` and run its constructor.
    pub(crate) fn instantiate(
        &mut self,
        class: Rc<ClassDescriptor>,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<ObjectRef, RuntimeError> {
        self.checkpoint(location)?;

        if args.len() != class.constructor_arity() {
            return Err(RuntimeError::Arity {
                callee: class.name.clone(),
                expected: class.constructor_arity(),
                got: args.len(),
                location,
            });
        }

        let object = Object::new_ref(Rc::clone(&class));
        self.enter_frame(
            class.name.clone(),
            Some(Rc::clone(&object)),
            class.namespace,
            location,
        )?;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.construct(&class, &object, args, location)
        });
        self.leave_frame();
        result.map(|()| object)
    }

    fn construct(
        &mut self,
        class: &ClassDescriptor,
        object: &ObjectRef,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let ctor = class.constructor.clone();

        if let Some(ctor) = &ctor {
            if let Some(init) = ctor
                .initializers
                .iter()
                .find(|init| class.field(&init.field).is_none())
            {
                return Err(RuntimeError::UnknownMember {
                    class: class.name.clone(),
                    member: init.field.clone(),
                    location: init.location,
                });
            }
            for (param, arg) in ctor.params.iter().zip(args) {
                let value = self.coerce_to_type(arg, &param.param_type, location)?;
                self.stack.current_frame_mut().declare_var(
                    param.name.clone(),
                    param.param_type.clone(),
                    value,
                );
            }
        }

        // Fields initialise in declaration order
        for slot in &class.fields {
            let from_list = ctor
                .as_ref()
                .and_then(|ctor| ctor.initializers.iter().find(|init| init.field == slot.name));
            let value = match (from_list, &slot.init) {
                (Some(init), _) => {
                    let value = self.evaluate_expr(&init.value)?;
                    self.coerce_to_type(value, &slot.field_type, init.location)?
                }
                (None, Some(default)) => {
                    let value = self.evaluate_expr(default)?;
                    self.coerce_to_type(value, &slot.field_type, *default.location())?
                }
                (None, None) => self.zero_value(&slot.field_type, location)?,
            };
            object.borrow_mut().set(&slot.name, value);
        }

        if let Some(ctor) = &ctor {
            self.execute_statements(&ctor.body)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::cancel::{NeverCancel, StepBudget};
    use crate::output::BufferSink;
    use crate::parser::{lexer::tokenize, parse::parse};

    fn run_source(source: &str) -> (Result<i32, RuntimeError>, String) {
        let unit = parse(tokenize(source).unwrap()).unwrap();
        let mut sink = BufferSink::new();
        let result = Interpreter::new(&unit, &mut sink, &NeverCancel).and_then(|mut i| i.run());
        (result, sink.contents().to_string())
    }

    #[test]
    fn test_main_return_value_is_exit_status() {
        let (result, _) = run_source("int main() { return 7; }");
        assert_eq!(result.unwrap(), 7);
        let (result, _) = run_source("int main() { int x = 1; }");
        assert_eq!(result.unwrap(), 0);
    }

    #[test]
    fn test_missing_main() {
        let (result, _) = run_source("int helper() { return 1; }");
        assert!(matches!(result, Err(RuntimeError::NoEntryFunction)));
    }

    #[test]
    fn test_main_parameters_get_zero_values() {
        let (result, _) = run_source("int main(int argc, char *argv[]) { return argc; }");
        assert_eq!(result.unwrap(), 0);
    }

    #[test]
    fn test_main_returning_string_is_type_error() {
        let (result, _) = run_source("string main() { return \"x\"; }");
        assert!(matches!(result, Err(RuntimeError::Type { .. })));
    }

    #[test]
    fn test_void_function_cannot_return_value() {
        let (result, _) = run_source("void f() { return 1; } int main() { f(); return 0; }");
        match result {
            Err(RuntimeError::Type { location, .. }) => assert_eq!(location.line, 1),
            other => panic!("expected TypeError, got {:?}", other),
        }
    }

    #[test]
    fn test_constructor_initializer_list_and_defaults() {
        let source = r#"
            class Box {
            public:
                int value;
                int scale = 10;
                int extra;
                Box(int d) : value(d) { extra = value + scale; }
            };
            int main() {
                Box b(5);
                return b.extra;
            }
        "#;
        let (result, _) = run_source(source);
        assert_eq!(result.unwrap(), 15);
    }

    #[test]
    fn test_unknown_field_in_initializer_list() {
        let source = "class A { int x; A() : y(1) {} }; int main() { A a; return 0; }";
        let (result, _) = run_source(source);
        assert!(matches!(result, Err(RuntimeError::UnknownMember { .. })));
    }

    #[test]
    fn test_runaway_recursion_overflows() {
        let source = "int f(int n) { return f(n + 1); } int main() { return f(0); }";
        let err = run_source(source).0.unwrap_err().to_string();
        assert!(err.starts_with("StackOverflow at line 1"), "{}", err);
    }

    #[test]
    fn test_recursion_depth_limit() {
        let program = |depth: i32| {
            format!(
                "int down(int n) {{ if (n == 0) {{ return 0; }} return down(n - 1); }}\n\
                 int main() {{ return down({}); }}",
                depth
            )
        };
        assert_eq!(run_source(&program(400)).0.unwrap(), 0);
        assert!(matches!(
            run_source(&program(600)).0,
            Err(RuntimeError::StackOverflow { limit: MAX_CALL_DEPTH, .. })
        ));
    }

    #[test]
    fn test_self_containing_class_overflows() {
        let (result, _) = run_source("class N { public: N next; }; int main() { N n; return 0; }");
        assert!(matches!(result, Err(RuntimeError::StackOverflow { .. })));
    }

    #[test]
    fn test_cancellation_stops_infinite_loop() {
        let unit = parse(tokenize("int main() { while (true) { } return 0; }").unwrap()).unwrap();
        let mut sink = BufferSink::new();
        let budget = StepBudget::new(100);
        let result = Interpreter::new(&unit, &mut sink, &budget).and_then(|mut i| i.run());
        assert!(matches!(result, Err(RuntimeError::Cancelled { .. })));
    }
}
