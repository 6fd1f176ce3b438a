//! Namespace, class and function tables
//!
//! Namespaces live in an arena indexed by [`NamespaceId`]; each one links to
//! its enclosing namespace by index, so the parent link is used for lookup
//! only and never owns anything. Index 0 is the global namespace and `std`
//! is always registered beneath it.
//!
//! [`SymbolTable::declare`] is the declaration pass: it walks the whole
//! translation unit before anything executes, so forward references resolve.

use crate::interpreter::errors::RuntimeError;
use crate::memory::object::{ClassDescriptor, FieldSlot, NamespaceId};
use crate::parser::ast::{
    ClassDecl, Declaration, MethodDecl, QualifiedName, SourceLocation, TranslationUnit,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;
use tracing::debug;

pub const GLOBAL_NAMESPACE: NamespaceId = 0;

#[derive(Debug)]
struct NamespaceTable {
    name: String,
    parent: Option<NamespaceId>,
    children: FxHashMap<String, NamespaceId>,
    classes: FxHashMap<String, Rc<ClassDescriptor>>,
    functions: FxHashMap<String, Rc<MethodDecl>>,
    /// Resolved `using namespace` directives at namespace level
    using: Vec<NamespaceId>,
}

impl NamespaceTable {
    fn new(name: &str, parent: Option<NamespaceId>) -> Self {
        Self {
            name: name.to_string(),
            parent,
            children: FxHashMap::default(),
            classes: FxHashMap::default(),
            functions: FxHashMap::default(),
            using: Vec::new(),
        }
    }
}

/// A function found by name lookup, with the namespace it belongs to.
#[derive(Debug, Clone)]
pub struct FunctionRef {
    pub decl: Rc<MethodDecl>,
    pub namespace: NamespaceId,
}

#[derive(Debug)]
pub struct SymbolTable {
    namespaces: Vec<NamespaceTable>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut table = SymbolTable {
            namespaces: vec![NamespaceTable::new("", None)],
        };
        table.child_or_insert(GLOBAL_NAMESPACE, "std");
        table
    }

    /// Build the tables for a translation unit.
    pub fn declare(unit: &TranslationUnit) -> Result<Self, RuntimeError> {
        let mut table = SymbolTable::new();
        let mut pending_using = Vec::new();

        table.declare_all(&unit.declarations, GLOBAL_NAMESPACE, &mut pending_using)?;

        // Namespaces can be named before they are declared
        for (ns, name, location) in pending_using {
            let target = table
                .resolve_namespace(ns, &[], &name.segments)
                .ok_or_else(|| RuntimeError::unbound(&name, location))?;
            let using = &mut table.namespaces[ns].using;
            if !using.contains(&target) {
                using.push(target);
            }
        }

        debug!(
            namespaces = table.namespaces.len(),
            classes = table.namespaces.iter().map(|ns| ns.classes.len()).sum::<usize>(),
            functions = table.namespaces.iter().map(|ns| ns.functions.len()).sum::<usize>(),
            "declaration pass complete"
        );
        Ok(table)
    }

    fn declare_all(
        &mut self,
        declarations: &[Declaration],
        ns: NamespaceId,
        pending_using: &mut Vec<(NamespaceId, QualifiedName, SourceLocation)>,
    ) -> Result<(), RuntimeError> {
        for decl in declarations {
            match decl {
                Declaration::Namespace(inner) => {
                    // Reopening a namespace merges into the existing table
                    let child = self.child_or_insert(ns, &inner.name);
                    self.declare_all(&inner.declarations, child, pending_using)?;
                }
                Declaration::Class(class) => {
                    if self.namespaces[ns].classes.contains_key(&class.name) {
                        return Err(RuntimeError::Declaration {
                            message: format!(
                                "class '{}' is already declared in {}",
                                class.name,
                                self.describe(ns)
                            ),
                            location: class.location,
                        });
                    }
                    let descriptor = Rc::new(build_class(class, ns)?);
                    self.namespaces[ns]
                        .classes
                        .insert(class.name.clone(), descriptor);
                }
                Declaration::Function(func) => {
                    if self.namespaces[ns].functions.contains_key(&func.name) {
                        return Err(RuntimeError::Declaration {
                            message: format!(
                                "function '{}' is already declared in {}",
                                func.name,
                                self.describe(ns)
                            ),
                            location: func.location,
                        });
                    }
                    self.namespaces[ns]
                        .functions
                        .insert(func.name.clone(), Rc::new(func.clone()));
                }
                Declaration::Using {
                    namespace,
                    location,
                } => pending_using.push((ns, namespace.clone(), *location)),
            }
        }
        Ok(())
    }

    fn child_or_insert(&mut self, parent: NamespaceId, name: &str) -> NamespaceId {
        if let Some(&id) = self.namespaces[parent].children.get(name) {
            return id;
        }
        let id = self.namespaces.len();
        self.namespaces.push(NamespaceTable::new(name, Some(parent)));
        self.namespaces[parent].children.insert(name.to_string(), id);
        id
    }

    /// Human-readable name such as `namespace 'geo::shapes'`
    pub fn describe(&self, id: NamespaceId) -> String {
        if id == GLOBAL_NAMESPACE {
            return "the global namespace".to_string();
        }
        format!("namespace '{}'", self.path(id))
    }

    fn path(&self, id: NamespaceId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(ns) = current {
            if ns != GLOBAL_NAMESPACE {
                segments.push(self.namespaces[ns].name.as_str());
            }
            current = self.namespaces[ns].parent;
        }
        segments.reverse();
        segments.join("::")
    }

    /// Namespaces searched for a name used inside `from`: block-level
    /// imports first, then `from` and each enclosing namespace, each followed
    /// by the namespaces it imports.
    fn search_order(&self, from: NamespaceId, block_using: &[NamespaceId]) -> Vec<NamespaceId> {
        let mut order = Vec::new();
        let mut seen = FxHashSet::default();
        let mut push = |id: NamespaceId, order: &mut Vec<NamespaceId>| {
            if seen.insert(id) {
                order.push(id);
            }
        };

        for &id in block_using {
            push(id, &mut order);
        }
        let mut current = Some(from);
        while let Some(ns) = current {
            push(ns, &mut order);
            for &imported in &self.namespaces[ns].using {
                push(imported, &mut order);
            }
            current = self.namespaces[ns].parent;
        }
        order
    }

    /// Resolve a namespace path such as `geo::shapes` as seen from `from`.
    pub fn resolve_namespace(
        &self,
        from: NamespaceId,
        block_using: &[NamespaceId],
        segments: &[String],
    ) -> Option<NamespaceId> {
        let (first, rest) = segments.split_first()?;
        self.search_order(from, block_using)
            .into_iter()
            .find_map(|ns| self.namespaces[ns].children.get(first).copied())
            .and_then(|start| {
                rest.iter().try_fold(start, |ns, segment| {
                    self.namespaces[ns].children.get(segment).copied()
                })
            })
    }

    /// Namespaces in which the final segment of `name` is looked up.
    fn candidates(
        &self,
        from: NamespaceId,
        block_using: &[NamespaceId],
        name: &QualifiedName,
    ) -> Vec<NamespaceId> {
        if name.is_qualified() {
            self.resolve_namespace(from, block_using, name.qualifier())
                .into_iter()
                .collect()
        } else {
            self.search_order(from, block_using)
        }
    }

    pub fn lookup_class(
        &self,
        from: NamespaceId,
        block_using: &[NamespaceId],
        name: &QualifiedName,
    ) -> Option<Rc<ClassDescriptor>> {
        self.candidates(from, block_using, name)
            .into_iter()
            .find_map(|ns| self.namespaces[ns].classes.get(name.last()).cloned())
    }

    pub fn lookup_function(
        &self,
        from: NamespaceId,
        block_using: &[NamespaceId],
        name: &QualifiedName,
    ) -> Option<FunctionRef> {
        self.candidates(from, block_using, name)
            .into_iter()
            .find_map(|ns| {
                self.namespaces[ns]
                    .functions
                    .get(name.last())
                    .map(|decl| FunctionRef {
                        decl: Rc::clone(decl),
                        namespace: ns,
                    })
            })
    }

    /// The program's entry point: `main` in the global namespace.
    pub fn entry_function(&self) -> Option<FunctionRef> {
        self.namespaces[GLOBAL_NAMESPACE]
            .functions
            .get("main")
            .map(|decl| FunctionRef {
                decl: Rc::clone(decl),
                namespace: GLOBAL_NAMESPACE,
            })
    }
}

/// Check a class declaration for duplicates and turn it into a descriptor.
fn build_class(class: &ClassDecl, ns: NamespaceId) -> Result<ClassDescriptor, RuntimeError> {
    let duplicate = |what: &str, name: &str, location: SourceLocation| RuntimeError::Declaration {
        message: format!("{} '{}' is declared twice in class '{}'", what, name, class.name),
        location,
    };

    let mut fields: Vec<FieldSlot> = Vec::with_capacity(class.fields.len());
    for field in &class.fields {
        if fields.iter().any(|f| f.name == field.name) {
            return Err(duplicate("field", &field.name, field.location));
        }
        fields.push(FieldSlot {
            name: field.name.clone(),
            field_type: field.field_type.clone(),
            init: field.init.clone(),
        });
    }

    let mut methods = FxHashMap::default();
    for method in &class.methods {
        if methods.contains_key(&method.name) {
            return Err(duplicate("method", &method.name, method.location));
        }
        if fields.iter().any(|f| f.name == method.name) {
            return Err(duplicate("member", &method.name, method.location));
        }
        methods.insert(method.name.clone(), Rc::new(method.clone()));
    }

    if let Some(extra) = class.constructors.get(1) {
        return Err(RuntimeError::Declaration {
            message: format!(
                "class '{}' declares more than one constructor; overloading is not supported",
                class.name
            ),
            location: extra.location,
        });
    }

    Ok(ClassDescriptor {
        name: class.name.clone(),
        namespace: ns,
        fields,
        methods,
        constructor: class.constructors.first().cloned().map(Rc::new),
        location: class.location,
    })
}
