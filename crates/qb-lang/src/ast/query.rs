use super::Expr;

// ---------------------------------------------------------------------------
// Query document
// ---------------------------------------------------------------------------

/// A parsed query: one `from` clause followed by join clauses in
/// declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDoc {
    pub from: FromClause,
    /// 1-based line of the `from` keyword.
    pub from_line: u32,
    pub joins: Vec<JoinClause>,
}

/// Base of a query.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FromClause {
    /// `from p in Posts`: known while compiling.
    Source(Expr),
    /// `from $posts [p]`: a value supplied at runtime, with the bindings the
    /// query author declares for it.
    Var {
        name: String,
        bindings: Option<Vec<Expr>>,
    },
}

/// `[qualifier] join [bindings] source [on cond]`
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// Raw qualifier identifier; legality is checked by the compiler.
    pub qualifier: String,
    /// Explicit binding list; `None` means "use the accumulated bindings".
    pub bindings: Option<Vec<Expr>>,
    pub source: Expr,
    pub on: Option<Expr>,
    /// 1-based line of the `join` keyword.
    pub line: u32,
}
