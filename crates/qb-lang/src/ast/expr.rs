use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Field references
// ---------------------------------------------------------------------------

/// Field reference in expressions.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FieldRef {
    /// Bare identifier, e.g. `p`.
    Simple(String),
    /// Qualified, e.g. `p.comments`.
    Qualified(String, String),
    /// Bracket notation, e.g. `c["post id"]`.
    Bracketed(String, String),
}

impl FieldRef {
    /// The binding-side identifier of a qualified reference.
    pub fn qualifier(&self) -> Option<&str> {
        match self {
            FieldRef::Simple(_) => None,
            FieldRef::Qualified(q, _) | FieldRef::Bracketed(q, _) => Some(q),
        }
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum BinOp {
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// `name in Source`: only meaningful as a join/from source.
    In,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Expr {
    /// Number literal (integer or float).
    Number(f64),
    /// String literal.
    StringLit(String),
    /// Boolean literal.
    Bool(bool),
    /// Field reference.
    Field(FieldRef),
    /// Entity reference: a capitalised alias path such as `Blog.Comment`.
    Entity(Vec<String>),
    /// Binary operation.
    BinOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary negation.
    Neg(Box<Expr>),
    /// Logical `not`.
    Not(Box<Expr>),
    /// Function call: `name(args...)` or `qualifier.name(args...)`.
    FuncCall {
        qualifier: Option<String>,
        name: String,
        args: Vec<Expr>,
    },
    /// `expr in (v1, v2, ...)` or `expr not in (v1, v2, ...)`.
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    /// Conditional expression: `if cond then yes else no`.
    IfThenElse {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Field(FieldRef::Simple(name.into()))
    }

    pub fn dot(binding: impl Into<String>, field: impl Into<String>) -> Self {
        Expr::Field(FieldRef::Qualified(binding.into(), field.into()))
    }

    pub fn entity(path: &str) -> Self {
        Expr::Entity(path.split('.').map(String::from).collect())
    }

    /// `name in source`.
    pub fn bind_in(name: impl Into<String>, source: Expr) -> Self {
        Expr::binop(BinOp::In, Expr::ident(name), source)
    }

    pub fn binop(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
