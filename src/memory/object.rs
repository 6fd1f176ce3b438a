//! Class descriptors and object instances
//!
//! A [`ClassDescriptor`] is built once per class during the declaration pass
//! and owns the class's method bodies. Call sites clone the `Rc` handle of the
//! method they invoke, which keeps it alive for exactly the duration of the
//! call. An [`Object`] points back at its descriptor and holds the current
//! value of each field.

use super::value::Value;
use crate::parser::ast::{AstNode, Constructor, MethodDecl, SourceLocation, Type};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Index of a namespace in the symbol table.
pub type NamespaceId = usize;

/// Shared, mutable handle to an object instance
pub type ObjectRef = Rc<RefCell<Object>>;

/// Declared field of a class
#[derive(Debug, Clone)]
pub struct FieldSlot {
    pub name: String,
    pub field_type: Type,
    pub init: Option<AstNode>,
}

#[derive(Debug)]
pub struct ClassDescriptor {
    pub name: String,
    /// Namespace the class was declared in; method bodies resolve names from here.
    pub namespace: NamespaceId,
    /// Fields in declaration order
    pub fields: Vec<FieldSlot>,
    pub methods: FxHashMap<String, Rc<MethodDecl>>,
    pub constructor: Option<Rc<Constructor>>,
    pub location: SourceLocation,
}

impl ClassDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldSlot> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<Rc<MethodDecl>> {
        self.methods.get(name).cloned()
    }

    /// Number of arguments the constructor takes (0 without a constructor).
    pub fn constructor_arity(&self) -> usize {
        self.constructor.as_ref().map_or(0, |ctor| ctor.params.len())
    }
}

/// A live class instance
#[derive(Debug)]
pub struct Object {
    pub class: Rc<ClassDescriptor>,
    pub fields: FxHashMap<String, Value>,
}

impl Object {
    /// Allocate an instance with every field set to `Void`; the evaluator
    /// fills in initial values before the object becomes visible.
    pub fn new_ref(class: Rc<ClassDescriptor>) -> ObjectRef {
        let fields = class
            .fields
            .iter()
            .map(|slot| (slot.name.clone(), Value::Void))
            .collect();
        Rc::new(RefCell::new(Object { class, fields }))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }

    /// Overwrite an existing field. Returns false for an unknown field.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.fields.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::BaseType;

    fn point_class() -> Rc<ClassDescriptor> {
        let slot = |name: &str| FieldSlot {
            name: name.to_string(),
            field_type: Type::new(BaseType::Int),
            init: None,
        };
        Rc::new(ClassDescriptor {
            name: "Point".to_string(),
            namespace: 0,
            fields: vec![slot("x"), slot("y")],
            methods: FxHashMap::default(),
            constructor: None,
            location: SourceLocation::default(),
        })
    }

    #[test]
    fn test_objects_share_state_through_handles() {
        let obj = Object::new_ref(point_class());
        let alias = Rc::clone(&obj);

        assert!(alias.borrow_mut().set("x", Value::Int(3)));
        assert_eq!(obj.borrow().get("x"), Some(Value::Int(3)));
        assert_eq!(obj.borrow().get("y"), Some(Value::Void));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let obj = Object::new_ref(point_class());
        assert!(!obj.borrow_mut().set("z", Value::Int(1)));
        assert!(obj.borrow().get("z").is_none());
        assert_eq!(obj.borrow().class.constructor_arity(), 0);
    }
}
