// AST (Abstract Syntax Tree) definitions for the C++-subset simulator

use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A possibly `::`-qualified name such as `geo::Point` or `square`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub segments: Vec<String>,
}

impl QualifiedName {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// The final segment: the name itself without its namespace path.
    pub fn last(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Every segment but the last.
    pub fn qualifier(&self) -> &[String] {
        &self.segments[..self.segments.len().saturating_sub(1)]
    }

    pub fn is_qualified(&self) -> bool {
        self.segments.len() > 1
    }

    /// `name` or `std::name`
    pub fn is_std(&self, name: &str) -> bool {
        match self.segments.as_slice() {
            [only] => only == name,
            [ns, last] => ns == "std" && last == name,
            _ => false,
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("::"))
    }
}

/// Base types supported by the simulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseType {
    Int,
    Float,
    Double,
    Char,
    Bool,
    Void,
    String,
    Auto,
    Class(QualifiedName),
}

/// Type representation with const qualifier, pointers and references.
///
/// Pointer and array markers are only accepted so that signatures such as
/// `int main(int argc, char *argv[])` parse; values of those types are never
/// dereferenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub base: BaseType,
    pub is_const: bool,
    pub pointer_depth: usize,
    pub is_reference: bool,
}

impl Type {
    pub fn new(base: BaseType) -> Self {
        Type {
            base,
            is_const: false,
            pointer_depth: 0,
            is_reference: false,
        }
    }

    pub fn with_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn with_pointer(mut self) -> Self {
        self.pointer_depth += 1;
        self
    }

    pub fn with_reference(mut self) -> Self {
        self.is_reference = true;
        self
    }

    pub fn is_void(&self) -> bool {
        self.base == BaseType::Void && self.pointer_depth == 0
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            write!(f, "const ")?;
        }
        match &self.base {
            BaseType::Int => write!(f, "int")?,
            BaseType::Float => write!(f, "float")?,
            BaseType::Double => write!(f, "double")?,
            BaseType::Char => write!(f, "char")?,
            BaseType::Bool => write!(f, "bool")?,
            BaseType::Void => write!(f, "void")?,
            BaseType::String => write!(f, "string")?,
            BaseType::Auto => write!(f, "auto")?,
            BaseType::Class(name) => write!(f, "{}", name)?,
        }
        for _ in 0..self.pointer_depth {
            write!(f, "*")?;
        }
        if self.is_reference {
            write!(f, "&")?;
        }
        Ok(())
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        };
        f.write_str(symbol)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,     // -x
    Plus,    // +x
    Not,     // !x
    PreInc,  // ++x
    PreDec,  // --x
    PostInc, // x++
    PostDec, // x--
}

/// Function, method or constructor parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub param_type: Type,
}

/// Class field, with an optional default member initializer
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub field_type: Type,
    pub init: Option<AstNode>,
    pub location: SourceLocation,
}

/// Free function or method definition
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Vec<AstNode>,
    pub location: SourceLocation,
}

/// `field(expr)` entry of a constructor's member initializer list
#[derive(Debug, Clone)]
pub struct MemberInit {
    pub field: String,
    pub value: AstNode,
    pub location: SourceLocation,
}

#[derive(Debug, Clone)]
pub struct Constructor {
    pub params: Vec<Param>,
    pub initializers: Vec<MemberInit>,
    pub body: Vec<AstNode>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub fields: Vec<Field>,
    pub methods: Vec<MethodDecl>,
    pub constructors: Vec<Constructor>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone)]
pub struct NamespaceDecl {
    pub name: String,
    pub declarations: Vec<Declaration>,
    pub location: SourceLocation,
}

/// Declarations allowed at file and namespace level
#[derive(Debug, Clone)]
pub enum Declaration {
    Namespace(NamespaceDecl),
    Class(ClassDecl),
    Function(MethodDecl),
    Using {
        namespace: QualifiedName,
        location: SourceLocation,
    },
}

impl Declaration {
    pub fn location(&self) -> SourceLocation {
        match self {
            Declaration::Namespace(ns) => ns.location,
            Declaration::Class(class) => class.location,
            Declaration::Function(func) => func.location,
            Declaration::Using { location, .. } => *location,
        }
    }
}

/// How a declared variable receives its first value
#[derive(Debug, Clone)]
pub enum Initializer {
    /// `T x = expr;`
    Assign(Box<AstNode>),
    /// `T x(args);`
    Construct(Vec<AstNode>),
}

/// One name of a (possibly multi-name) variable declaration
#[derive(Debug, Clone)]
pub struct Declarator {
    pub name: String,
    pub init: Option<Initializer>,
    pub location: SourceLocation,
}

/// One operand of a `cout << ...` chain
#[derive(Debug, Clone)]
pub enum OutputItem {
    Expr(AstNode),
    Endl,
}

/// AST nodes representing statements and expressions
#[derive(Debug, Clone)]
pub enum AstNode {
    // Statements
    Block {
        statements: Vec<AstNode>,
        location: SourceLocation,
    },
    VarDecl {
        var_type: Type,
        declarators: Vec<Declarator>,
        location: SourceLocation,
    },
    Return {
        expr: Option<Box<AstNode>>,
        location: SourceLocation,
    },
    If {
        condition: Box<AstNode>,
        then_branch: Vec<AstNode>,
        else_branch: Option<Vec<AstNode>>,
        location: SourceLocation,
    },
    While {
        condition: Box<AstNode>,
        body: Vec<AstNode>,
        location: SourceLocation,
    },
    DoWhile {
        body: Vec<AstNode>,
        condition: Box<AstNode>,
        location: SourceLocation,
    },
    For {
        init: Option<Box<AstNode>>,
        condition: Option<Box<AstNode>>,
        increment: Option<Box<AstNode>>,
        body: Vec<AstNode>,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    Output {
        items: Vec<OutputItem>,
        location: SourceLocation,
    },
    UsingNamespace {
        namespace: QualifiedName,
        location: SourceLocation,
    },
    ExpressionStatement {
        expr: Box<AstNode>,
        location: SourceLocation,
    },

    // Expressions
    IntLiteral(i32, SourceLocation),
    FloatLiteral(f64, SourceLocation),
    CharLiteral(char, SourceLocation),
    BoolLiteral(bool, SourceLocation),
    StringLiteral(String, SourceLocation),
    Identifier(QualifiedName, SourceLocation),
    This(SourceLocation),
    Assignment {
        target: Box<AstNode>,
        value: Box<AstNode>,
        location: SourceLocation,
    },
    BinaryOp {
        op: BinOp,
        left: Box<AstNode>,
        right: Box<AstNode>,
        location: SourceLocation,
    },
    UnaryOp {
        op: UnOp,
        operand: Box<AstNode>,
        location: SourceLocation,
    },
    FunctionCall {
        name: QualifiedName,
        args: Vec<AstNode>,
        location: SourceLocation,
    },
    MemberAccess {
        object: Box<AstNode>,
        member: String,
        location: SourceLocation,
    },
    MethodCall {
        object: Box<AstNode>,
        method: String,
        args: Vec<AstNode>,
        location: SourceLocation,
    },
    Instantiation {
        class: QualifiedName,
        args: Vec<AstNode>,
        location: SourceLocation,
    },
}

impl AstNode {
    /// Get the source location of this node
    pub fn location(&self) -> &SourceLocation {
        match self {
            AstNode::Block { location, .. } => location,
            AstNode::VarDecl { location, .. } => location,
            AstNode::Return { location, .. } => location,
            AstNode::If { location, .. } => location,
            AstNode::While { location, .. } => location,
            AstNode::DoWhile { location, .. } => location,
            AstNode::For { location, .. } => location,
            AstNode::Break { location } => location,
            AstNode::Continue { location } => location,
            AstNode::Output { location, .. } => location,
            AstNode::UsingNamespace { location, .. } => location,
            AstNode::ExpressionStatement { location, .. } => location,
            AstNode::IntLiteral(_, loc) => loc,
            AstNode::FloatLiteral(_, loc) => loc,
            AstNode::CharLiteral(_, loc) => loc,
            AstNode::BoolLiteral(_, loc) => loc,
            AstNode::StringLiteral(_, loc) => loc,
            AstNode::Identifier(_, loc) => loc,
            AstNode::This(loc) => loc,
            AstNode::Assignment { location, .. } => location,
            AstNode::BinaryOp { location, .. } => location,
            AstNode::UnaryOp { location, .. } => location,
            AstNode::FunctionCall { location, .. } => location,
            AstNode::MemberAccess { location, .. } => location,
            AstNode::MethodCall { location, .. } => location,
            AstNode::Instantiation { location, .. } => location,
        }
    }
}

/// Top-level node for one parsed source file
#[derive(Debug, Clone, Default)]
pub struct TranslationUnit {
    pub declarations: Vec<Declaration>,
}

impl TranslationUnit {
    pub fn new() -> Self {
        TranslationUnit::default()
    }
}
