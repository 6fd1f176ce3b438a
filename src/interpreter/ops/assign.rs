//! Assignment targets
//!
//! A [`Place`] is a resolved l-value: a local variable of the current frame
//! or a field of a live object. Reads and writes go through it so that `=`,
//! `++` and `--` share one lookup and one coercion path.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::object::ObjectRef;
use crate::memory::value::Value;
use crate::parser::ast::{AstNode, SourceLocation};

pub(crate) enum Place {
    Local(String),
    Field(ObjectRef, String),
}

impl Interpreter<'_> {
    /// Resolve an assignable expression without reading it.
    pub(crate) fn resolve_place(&mut self, target: &AstNode) -> Result<Place, RuntimeError> {
        match target {
            AstNode::Identifier(name, location) if !name.is_qualified() => {
                let name = name.last();
                if self.stack.current_frame().get_var(name).is_some() {
                    return Ok(Place::Local(name.to_string()));
                }
                match self.current_receiver() {
                    Some(obj) if obj.borrow().class.field(name).is_some() => {
                        Ok(Place::Field(obj, name.to_string()))
                    }
                    _ => Err(RuntimeError::unbound(name, *location)),
                }
            }
            AstNode::MemberAccess {
                object,
                member,
                location,
            } => {
                let obj = self.evaluate_object(object)?;
                self.check_field(&obj, member, *location)?;
                Ok(Place::Field(obj, member.clone()))
            }
            other => Err(RuntimeError::type_error(
                "an assignable name",
                "an expression",
                *other.location(),
            )),
        }
    }

    pub(crate) fn read_place(&self, place: &Place, location: SourceLocation) -> Result<Value, RuntimeError> {
        match place {
            Place::Local(name) => self
                .stack
                .current_frame()
                .get_var(name)
                .map(|var| var.value.clone())
                .ok_or_else(|| RuntimeError::unbound(name, location)),
            Place::Field(obj, name) => {
                let obj = obj.borrow();
                match obj.get(name) {
                    Some(value) => Ok(value),
                    None => Err(RuntimeError::UnknownMember {
                        class: obj.class.name.clone(),
                        member: name.clone(),
                        location,
                    }),
                }
            }
        }
    }

    /// Coerce `value` to the place's declared type and store it.
    /// Returns the stored value.
    pub(crate) fn write_place(
        &mut self,
        place: &Place,
        value: Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match place {
            Place::Local(name) => {
                let var_type = self
                    .stack
                    .current_frame()
                    .get_var(name)
                    .map(|var| var.var_type.clone())
                    .ok_or_else(|| RuntimeError::unbound(name, location))?;
                if var_type.is_const {
                    return Err(RuntimeError::type_error(
                        "a modifiable variable",
                        format!("'{}' of type {}", name, var_type),
                        location,
                    ));
                }
                let value = self.coerce_to_type(value, &var_type, location)?;
                if let Some(var) = self.stack.current_frame_mut().get_var_mut(name) {
                    var.value = value.clone();
                }
                Ok(value)
            }
            Place::Field(obj, name) => {
                let (field_type, class_ns) = {
                    let obj = obj.borrow();
                    let slot = obj.class.field(name).ok_or_else(|| RuntimeError::UnknownMember {
                        class: obj.class.name.clone(),
                        member: name.clone(),
                        location,
                    })?;
                    (slot.field_type.clone(), obj.class.namespace)
                };
                // Field types are written relative to the class's namespace
                let value = self.coerce_in(value, &field_type, class_ns, &[], location)?;
                obj.borrow_mut().set(name, value.clone());
                Ok(value)
            }
        }
    }

    /// `target = value`; evaluates to the stored value.
    pub(crate) fn execute_assignment(
        &mut self,
        target: &AstNode,
        value: &AstNode,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(target)?;
        let new_value = self.evaluate_expr(value)?;
        self.write_place(&place, new_value, location)
    }
}
