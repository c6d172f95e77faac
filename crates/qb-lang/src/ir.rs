use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::BinOp;

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Source position of a clause, carried into the IR for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Location {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

// ---------------------------------------------------------------------------
// Qualifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Qualifier {
    Inner,
    Left,
    Right,
    Full,
}

impl Qualifier {
    pub const ALL: [Qualifier; 4] = [
        Qualifier::Inner,
        Qualifier::Left,
        Qualifier::Right,
        Qualifier::Full,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Qualifier::Inner => "inner",
            Qualifier::Left => "left",
            Qualifier::Right => "right",
            Qualifier::Full => "full",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.as_str() == name)
    }

    /// `inner, left, right, full`: used in diagnostics.
    pub fn accepted() -> String {
        Self::ALL.map(Qualifier::as_str).join(", ")
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// A statically named source: an entity alias or a raw table name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRef {
    Entity(String),
    Table(String),
}

/// What a join reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinSource {
    Source(SourceRef),
    /// `binding.field`: resolved through relationship metadata downstream.
    Assoc { binding: usize, field: String },
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// Positional reference to a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindIndex {
    Fixed(usize),
    /// The joining binding itself, whose index is only known once the base
    /// query has been materialised.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Number(f64),
    Str(String),
    Bool(bool),
}

/// Compiled expression with every variable replaced by a [`BindIndex`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryExpr {
    Literal(Literal),
    Field {
        binding: BindIndex,
        field: String,
    },
    /// A whole binding, e.g. the argument of `count(c)`.
    Binding(BindIndex),
    BinOp {
        op: BinOp,
        left: Box<QueryExpr>,
        right: Box<QueryExpr>,
    },
    Neg(Box<QueryExpr>),
    Not(Box<QueryExpr>),
    Call {
        qualifier: Option<String>,
        name: String,
        args: Vec<QueryExpr>,
    },
    InList {
        expr: Box<QueryExpr>,
        list: Vec<QueryExpr>,
        negated: bool,
    },
    IfThenElse {
        cond: Box<QueryExpr>,
        then_expr: Box<QueryExpr>,
        else_expr: Box<QueryExpr>,
    },
}

impl QueryExpr {
    /// Visit every binding reference in the expression tree.
    fn for_each_index_mut(&mut self, f: &mut impl FnMut(&mut BindIndex)) {
        match self {
            QueryExpr::Literal(_) => {}
            QueryExpr::Field { binding, .. } | QueryExpr::Binding(binding) => f(binding),
            QueryExpr::BinOp { left, right, .. } => {
                left.for_each_index_mut(f);
                right.for_each_index_mut(f);
            }
            QueryExpr::Neg(inner) | QueryExpr::Not(inner) => inner.for_each_index_mut(f),
            QueryExpr::Call { args, .. } => {
                for arg in args {
                    arg.for_each_index_mut(f);
                }
            }
            QueryExpr::InList { expr, list, .. } => {
                expr.for_each_index_mut(f);
                for item in list {
                    item.for_each_index_mut(f);
                }
            }
            QueryExpr::IfThenElse {
                cond,
                then_expr,
                else_expr,
            } => {
                cond.for_each_index_mut(f);
                then_expr.for_each_index_mut(f);
                else_expr.for_each_index_mut(f);
            }
        }
    }

    /// Whether any binding reference satisfies `pred`.
    pub fn any_index(&self, pred: &impl Fn(BindIndex) -> bool) -> bool {
        match self {
            QueryExpr::Literal(_) => false,
            QueryExpr::Field { binding, .. } | QueryExpr::Binding(binding) => pred(*binding),
            QueryExpr::BinOp { left, right, .. } => left.any_index(pred) || right.any_index(pred),
            QueryExpr::Neg(inner) | QueryExpr::Not(inner) => inner.any_index(pred),
            QueryExpr::Call { args, .. } => args.iter().any(|a| a.any_index(pred)),
            QueryExpr::InList { expr, list, .. } => {
                expr.any_index(pred) || list.iter().any(|i| i.any_index(pred))
            }
            QueryExpr::IfThenElse {
                cond,
                then_expr,
                else_expr,
            } => cond.any_index(pred) || then_expr.any_index(pred) || else_expr.any_index(pred),
        }
    }

    pub fn has_pending(&self) -> bool {
        self.any_index(&|idx| idx == BindIndex::Pending)
    }

    pub fn resolve_pending(&mut self, index: usize) {
        self.for_each_index_mut(&mut |idx| {
            if *idx == BindIndex::Pending {
                *idx = BindIndex::Fixed(index);
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Join node
// ---------------------------------------------------------------------------

/// Compiled `on` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnClause {
    pub expr: QueryExpr,
    pub location: Location,
}

/// Compiled join clause, ready to be appended to a [`QueryIr`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinNode {
    pub qualifier: Qualifier,
    /// Name the join was bound to in source, kept for explain output.
    pub bind_name: Option<String>,
    pub source: JoinSource,
    pub on: Option<OnClause>,
    pub location: Location,
    pub is_association: bool,
}

impl JoinNode {
    pub fn has_pending(&self) -> bool {
        self.on.as_ref().is_some_and(|on| on.expr.has_pending())
    }

    /// Replace every pending reference with the joining binding's index.
    pub fn resolve_pending(&mut self, index: usize) {
        if let Some(on) = self.on.as_mut() {
            on.expr.resolve_pending(index);
        }
    }
}

// ---------------------------------------------------------------------------
// Query IR
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FromExpr {
    pub source: SourceRef,
    pub bind_name: Option<String>,
}

/// Intermediate representation of one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryIr {
    pub from: FromExpr,
    pub joins: Vec<JoinNode>,
}

impl QueryIr {
    pub fn from_source(source: SourceRef, bind_name: Option<String>) -> Self {
        QueryIr {
            from: FromExpr { source, bind_name },
            joins: Vec::new(),
        }
    }

    /// Number of positional bindings: the `from` source plus one per join.
    pub fn count_bindings(&self) -> usize {
        1 + self.joins.len()
    }

    /// Binding names in positional order (`None` for unnamed bindings).
    pub fn binding_names(&self) -> Vec<Option<&str>> {
        std::iter::once(self.from.bind_name.as_deref())
            .chain(self.joins.iter().map(|j| j.bind_name.as_deref()))
            .collect()
    }

    pub fn append_join(&mut self, join: JoinNode) {
        self.joins.push(join);
    }
}

/// Free-function form of [`QueryIr::count_bindings`].
pub fn count_bindings(query: &QueryIr) -> usize {
    query.count_bindings()
}
