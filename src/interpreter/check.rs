//! Static name check
//!
//! Walks every function, method and constructor body against the tables
//! built by [`SymbolTable::declare`] and reports names that resolve to
//! nothing, including those in branches that never run. Findings are
//! warnings: they are logged and returned, and never stop a run.

use crate::interpreter::errors::RuntimeError;
use crate::interpreter::symbols::{SymbolTable, GLOBAL_NAMESPACE};
use crate::memory::object::{ClassDescriptor, NamespaceId};
use crate::parser::ast::{
    AstNode, BaseType, ClassDecl, Declaration, Initializer, OutputItem, Param, QualifiedName,
    SourceLocation, TranslationUnit, Type,
};
use rustc_hash::FxHashSet;
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Default)]
struct Scope {
    names: FxHashSet<String>,
    using: Vec<NamespaceId>,
}

struct Checker<'a> {
    symbols: &'a SymbolTable,
    namespace: NamespaceId,
    class: Option<Rc<ClassDescriptor>>,
    scopes: Vec<Scope>,
    findings: Vec<RuntimeError>,
}

/// Report unresolvable names in `unit`.
///
/// Each finding is an `UnboundName`, `UnknownMember` or `Arity` error
/// pointing at the offending use.
pub fn check(unit: &TranslationUnit, symbols: &SymbolTable) -> Vec<RuntimeError> {
    let mut checker = Checker {
        symbols,
        namespace: GLOBAL_NAMESPACE,
        class: None,
        scopes: Vec::new(),
        findings: Vec::new(),
    };
    checker.check_declarations(&unit.declarations, GLOBAL_NAMESPACE);

    for finding in &checker.findings {
        warn!("{finding}");
    }
    debug!(findings = checker.findings.len(), "name check complete");
    checker.findings
}

impl Checker<'_> {
    fn check_declarations(&mut self, declarations: &[Declaration], ns: NamespaceId) {
        for decl in declarations {
            match decl {
                Declaration::Namespace(inner) => {
                    let child = self.symbols.resolve_namespace(
                        ns,
                        &[],
                        std::slice::from_ref(&inner.name),
                    );
                    if let Some(child) = child {
                        self.check_declarations(&inner.declarations, child);
                    }
                }
                Declaration::Class(class) => self.check_class(class, ns),
                Declaration::Function(func) => {
                    self.enter_body(ns, None, &func.params, func.location);
                    self.check_type(&func.return_type, func.location);
                    self.check_statements(&func.body);
                }
                // Already resolved by the declaration pass
                Declaration::Using { .. } => {}
            }
        }
    }

    fn check_class(&mut self, class: &ClassDecl, ns: NamespaceId) {
        let Some(descriptor) =
            self.symbols
                .lookup_class(ns, &[], &QualifiedName::simple(class.name.as_str()))
        else {
            return;
        };

        for field in &class.fields {
            self.enter_body(ns, Some(&descriptor), &[], field.location);
            self.check_type(&field.field_type, field.location);
            if let Some(init) = &field.init {
                self.check_expr(init);
            }
        }

        for method in &class.methods {
            self.enter_body(ns, Some(&descriptor), &method.params, method.location);
            self.check_type(&method.return_type, method.location);
            self.check_statements(&method.body);
        }

        for ctor in &class.constructors {
            self.enter_body(ns, Some(&descriptor), &ctor.params, ctor.location);
            for init in &ctor.initializers {
                if descriptor.field(&init.field).is_none() {
                    self.findings.push(RuntimeError::UnknownMember {
                        class: descriptor.name.clone(),
                        member: init.field.clone(),
                        location: init.location,
                    });
                }
                self.check_expr(&init.value);
            }
            self.check_statements(&ctor.body);
        }
    }

    /// Reset the walker for a new body with `params` in its outermost scope.
    fn enter_body(
        &mut self,
        ns: NamespaceId,
        class: Option<&Rc<ClassDescriptor>>,
        params: &[Param],
        location: SourceLocation,
    ) {
        self.namespace = ns;
        self.class = class.cloned();
        self.scopes = vec![Scope::default()];
        for param in params {
            self.check_type(&param.param_type, location);
            self.declare(&param.name);
        }
    }

    fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.names.insert(name.to_string());
        }
    }

    fn is_local(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.names.contains(name))
    }

    fn usings(&self) -> Vec<NamespaceId> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.using.iter().copied())
            .collect()
    }

    fn unbound(&mut self, name: impl ToString, location: SourceLocation) {
        self.findings.push(RuntimeError::unbound(name, location));
    }

    fn check_type(&mut self, ty: &Type, location: SourceLocation) {
        if let BaseType::Class(name) = &ty.base {
            let usings = self.usings();
            if self
                .symbols
                .lookup_class(self.namespace, &usings, name)
                .is_none()
            {
                self.unbound(name, location);
            }
        }
    }

    fn check_scoped(&mut self, statements: &[AstNode]) {
        self.scopes.push(Scope::default());
        self.check_statements(statements);
        self.scopes.pop();
    }

    fn check_statements(&mut self, statements: &[AstNode]) {
        for stmt in statements {
            self.check_statement(stmt);
        }
    }

    fn check_statement(&mut self, stmt: &AstNode) {
        match stmt {
            AstNode::Block { statements, .. } => self.check_scoped(statements),

            AstNode::VarDecl {
                var_type,
                declarators,
                location,
            } => {
                self.check_type(var_type, *location);
                for declarator in declarators {
                    match &declarator.init {
                        Some(Initializer::Assign(expr)) => self.check_expr(expr),
                        Some(Initializer::Construct(args)) => self.check_exprs(args),
                        None => {}
                    }
                    self.declare(&declarator.name);
                }
            }

            AstNode::Return { expr, .. } => {
                if let Some(expr) = expr {
                    self.check_expr(expr);
                }
            }

            AstNode::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.check_expr(condition);
                self.check_scoped(then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_scoped(else_branch);
                }
            }

            AstNode::While {
                condition, body, ..
            }
            | AstNode::DoWhile {
                body, condition, ..
            } => {
                self.check_expr(condition);
                self.check_scoped(body);
            }

            AstNode::For {
                init,
                condition,
                increment,
                body,
                ..
            } => {
                self.scopes.push(Scope::default());
                if let Some(init) = init {
                    self.check_statement(init);
                }
                for expr in [condition, increment].into_iter().flatten() {
                    self.check_expr(expr);
                }
                self.check_scoped(body);
                self.scopes.pop();
            }

            AstNode::Break { .. } | AstNode::Continue { .. } => {}

            AstNode::Output { items, .. } => {
                for item in items {
                    if let OutputItem::Expr(expr) = item {
                        self.check_expr(expr);
                    }
                }
            }

            AstNode::UsingNamespace {
                namespace,
                location,
            } => {
                let usings = self.usings();
                match self
                    .symbols
                    .resolve_namespace(self.namespace, &usings, &namespace.segments)
                {
                    Some(target) => {
                        if let Some(scope) = self.scopes.last_mut() {
                            scope.using.push(target);
                        }
                    }
                    None => self.unbound(namespace, *location),
                }
            }

            AstNode::ExpressionStatement { expr, .. } => self.check_expr(expr),

            expr => self.check_expr(expr),
        }
    }

    fn check_exprs(&mut self, exprs: &[AstNode]) {
        for expr in exprs {
            self.check_expr(expr);
        }
    }

    fn check_expr(&mut self, expr: &AstNode) {
        match expr {
            AstNode::IntLiteral(..)
            | AstNode::FloatLiteral(..)
            | AstNode::CharLiteral(..)
            | AstNode::BoolLiteral(..)
            | AstNode::StringLiteral(..) => {}

            AstNode::Identifier(name, location) => {
                let found = !name.is_qualified()
                    && (self.is_local(name.last())
                        || self
                            .class
                            .as_ref()
                            .is_some_and(|class| class.field(name.last()).is_some()));
                if !found {
                    self.unbound(name, *location);
                }
            }

            AstNode::This(location) => {
                if self.class.is_none() {
                    self.unbound("this", *location);
                }
            }

            AstNode::Assignment { target, value, .. } => {
                self.check_expr(target);
                self.check_expr(value);
            }

            AstNode::BinaryOp { left, right, .. } => {
                self.check_expr(left);
                self.check_expr(right);
            }

            AstNode::UnaryOp { operand, .. } => self.check_expr(operand),

            AstNode::FunctionCall {
                name,
                args,
                location,
            } => {
                self.check_exprs(args);
                self.check_call(name, args.len(), *location);
            }

            // The member itself depends on the runtime class of the object
            AstNode::MemberAccess { object, .. } => self.check_expr(object),
            AstNode::MethodCall { object, args, .. } => {
                self.check_expr(object);
                self.check_exprs(args);
            }

            AstNode::Instantiation {
                class,
                args,
                location,
            } => {
                let usings = self.usings();
                if self
                    .symbols
                    .lookup_class(self.namespace, &usings, class)
                    .is_none()
                {
                    self.unbound(class, *location);
                }
                self.check_exprs(args);
            }

            stmt => self.check_statement(stmt),
        }
    }

    fn check_call(&mut self, name: &QualifiedName, argc: usize, location: SourceLocation) {
        let method = if name.is_qualified() {
            None
        } else {
            self.class.as_ref().and_then(|class| class.method(name.last()))
        };
        let decl = match method {
            Some(decl) => decl,
            None => {
                let usings = self.usings();
                match self.symbols.lookup_function(self.namespace, &usings, name) {
                    Some(found) => found.decl,
                    None => return self.unbound(name, location),
                }
            }
        };

        if decl.params.len() != argc {
            self.findings.push(RuntimeError::Arity {
                callee: decl.name.clone(),
                expected: decl.params.len(),
                got: argc,
                location,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;
    use crate::parser::parse::parse;

    fn findings(source: &str) -> Vec<RuntimeError> {
        let unit = parse(tokenize(source).unwrap()).unwrap();
        let symbols = SymbolTable::declare(&unit).unwrap();
        check(&unit, &symbols)
    }

    fn unbound_names(source: &str) -> Vec<(String, usize)> {
        findings(source)
            .into_iter()
            .filter_map(|finding| match finding {
                RuntimeError::UnboundName { name, location } => Some((name, location.line)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_clean_program_has_no_findings() {
        let source = r#"
            using namespace std;
            namespace geo {
                class Point {
                public:
                    int x;
                    Point(int v) : x(v) {}
                    int twice() { return scale(2); }
                    int scale(int by) { return this->x * by; }
                };
                int origin() { return 0; }
            }
            int main() {
                geo::Point p(3);
                for (int i = 0; i < 2; i++) { cout << i << p.twice() << endl; }
                {
                    using namespace geo;
                    int o = origin();
                    cout << o;
                }
                return 0;
            }
        "#;
        let found = findings(source);
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn test_undeclared_variable_in_dead_branch() {
        let names = unbound_names(
            "int main() {\n  if (false) {\n    return missing;\n  }\n  return 0;\n}",
        );
        assert_eq!(names, vec![("missing".to_string(), 3)]);
    }

    #[test]
    fn test_block_variables_end_with_their_block() {
        let names = unbound_names("int main() {\n  { int x = 1; }\n  return x;\n}");
        assert_eq!(names, vec![("x".to_string(), 3)]);
    }

    #[test]
    fn test_undefined_function_and_class() {
        // `Ghost` exists, but only inside namespace `b`
        let names = unbound_names(
            "namespace b { class Ghost {}; }\nint main() {\n  helper();\n  Ghost g;\n  return 0;\n}",
        );
        assert_eq!(
            names,
            vec![("helper".to_string(), 3), ("Ghost".to_string(), 4)]
        );
    }

    #[test]
    fn test_block_using_ends_with_block() {
        let names = unbound_names(
            "namespace m { int one() { return 1; } }\n\
             int main() {\n  { using namespace m; one(); }\n  return one();\n}",
        );
        assert_eq!(names, vec![("one".to_string(), 4)]);
    }

    #[test]
    fn test_arity_and_unknown_initializer_field() {
        let found = findings(
            "class A { public: int x; A(int v) : y(v) {} };\n\
             int add(int a, int b) { return a + b; }\n\
             int main() { return add(1); }",
        );
        assert_eq!(found.len(), 2, "{found:?}");
        assert!(matches!(
            &found[0],
            RuntimeError::UnknownMember { member, .. } if member == "y"
        ));
        assert!(matches!(
            &found[1],
            RuntimeError::Arity { expected: 2, got: 1, .. }
        ));
    }

    #[test]
    fn test_this_outside_a_method() {
        let names = unbound_names("int main() { return this->x; }");
        assert_eq!(names, vec![("this".to_string(), 1)]);
    }
}
