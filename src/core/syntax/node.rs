//! Generic syntax tree consumed by the rule registry and the expression evaluator.
//!
//! The source frontend (see `crate::core::lower`) lowers swc's JS/TS AST into these nodes.
//! Only the constructs that matter for message extraction get their own kind; everything
//! else becomes [`NodeKind::Opaque`] so the evaluator can report what it refused to fold.

use std::fmt;

/// Source position of a node. Lines are 1-based, columns are 0-based character offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            line,
            column,
            end_line,
            end_column,
        }
    }

    /// A single-line position, mostly useful in tests.
    pub fn line(line: usize) -> Self {
        Self::new(line, 0, line, 0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// Any operator the evaluator never folds (comparisons, logical, bitwise, ...).
    Other(&'static str),
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Mod => write!(f, "%"),
            BinaryOp::Other(op) => write!(f, "{}", op),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    TypeOf,
    Void,
    Delete,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::TypeOf => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
            UnaryOp::PreIncrement | UnaryOp::PostIncrement => "++",
            UnaryOp::PreDecrement | UnaryOp::PostDecrement => "--",
        };
        write!(f, "{}", text)
    }
}

/// Reference to a field read like `Labels.SAVE` or an imported module constant.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRef {
    /// Qualified owner (`module#Class`, or a module id for module-level constants).
    pub owner: Option<String>,
    pub name: String,
    /// Whether the declaration is immutable (`const`, `static readonly`, enum member).
    pub constant: bool,
}

/// A method or function call.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Receiver expression for calls on a value (`"a".toUpperCase()`, `t.tr(..)`).
    pub receiver: Option<Box<SyntaxNode>>,
    /// Qualified static type of the receiver, or the module of a free function.
    pub owner: Option<String>,
    pub name: String,
    pub is_static: bool,
    pub args: Vec<SyntaxNode>,
    /// Parameter types at the call site, one per argument.
    pub param_types: Vec<String>,
}

/// A `new Type(...)` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Construction {
    pub type_name: Option<String>,
    pub args: Vec<SyntaxNode>,
    pub param_types: Vec<String>,
}

/// A metadata tag (decorator) use: `@Label({ text: "Save" })`.
#[derive(Debug, Clone, PartialEq)]
pub struct TagUse {
    /// Name as written at the use site, possibly dotted (`i18n.Label`).
    pub name: String,
    pub fields: Vec<(String, SyntaxNode)>,
}

impl TagUse {
    pub fn field(&self, name: &str) -> Option<&SyntaxNode> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Literal(Literal),
    Binary {
        op: BinaryOp,
        left: Box<SyntaxNode>,
        right: Box<SyntaxNode>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<SyntaxNode>,
    },
    Conditional {
        test: Box<SyntaxNode>,
        consequent: Box<SyntaxNode>,
        alternate: Box<SyntaxNode>,
    },
    FieldAccess(FieldRef),
    Invocation(Invocation),
    NewObject(Construction),
    ArrayLiteral(Vec<SyntaxNode>),
    TagUse(TagUse),
    /// A construct the frontend does not model (identifier of unknown origin, lambda, ...).
    Opaque {
        description: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub position: Position,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, position: Position) -> Self {
        Self { kind, position }
    }

    pub fn string(value: impl Into<String>, position: Position) -> Self {
        Self::new(NodeKind::Literal(Literal::Str(value.into())), position)
    }

    pub fn number(value: f64, position: Position) -> Self {
        Self::new(NodeKind::Literal(Literal::Num(value)), position)
    }

    pub fn binary(op: BinaryOp, left: SyntaxNode, right: SyntaxNode) -> Self {
        let position = Position::new(
            left.position.line,
            left.position.column,
            right.position.end_line,
            right.position.end_column,
        );
        Self::new(
            NodeKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            position,
        )
    }

    pub fn opaque(description: impl Into<String>, position: Position) -> Self {
        Self::new(
            NodeKind::Opaque {
                description: description.into(),
            },
            position,
        )
    }

    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Literal(_) => "literal",
            NodeKind::Binary { .. } => "binary",
            NodeKind::Unary { .. } => "unary",
            NodeKind::Conditional { .. } => "conditional",
            NodeKind::FieldAccess(_) => "field access",
            NodeKind::Invocation(_) => "invocation",
            NodeKind::NewObject(_) => "construction",
            NodeKind::ArrayLiteral(_) => "array",
            NodeKind::TagUse(_) => "tag",
            NodeKind::Opaque { .. } => "expression",
        }
    }
}

/// Renders a compact, source-like description used in warnings.
impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Literal(Literal::Str(s)) => write!(f, "{:?}", s),
            NodeKind::Literal(Literal::Num(n)) => write!(f, "{}", n),
            NodeKind::Literal(Literal::Bool(b)) => write!(f, "{}", b),
            NodeKind::Literal(Literal::Null) => write!(f, "null"),
            NodeKind::Binary { op, left, right } => write!(f, "{} {} {}", left, op, right),
            NodeKind::Unary { op, operand } => match op {
                UnaryOp::PostIncrement | UnaryOp::PostDecrement => write!(f, "{}{}", operand, op),
                UnaryOp::TypeOf | UnaryOp::Void | UnaryOp::Delete => {
                    write!(f, "{} {}", op, operand)
                }
                _ => write!(f, "{}{}", op, operand),
            },
            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => write!(f, "{} ? {} : {}", test, consequent, alternate),
            NodeKind::FieldAccess(field) => write!(f, "{}", field.name),
            NodeKind::Invocation(call) => {
                if let Some(receiver) = &call.receiver {
                    write!(f, "{}.", receiver)?;
                }
                write!(f, "{}(", call.name)?;
                write_list(f, &call.args)?;
                write!(f, ")")
            }
            NodeKind::NewObject(new) => {
                let name = new.type_name.as_deref().unwrap_or("?");
                let short = name.rsplit('#').next().unwrap_or(name);
                write!(f, "new {}(", short)?;
                write_list(f, &new.args)?;
                write!(f, ")")
            }
            NodeKind::ArrayLiteral(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
            NodeKind::TagUse(tag) => write!(f, "@{}", tag.name),
            NodeKind::Opaque { description } => write!(f, "{}", description),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[SyntaxNode]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
