use serde::{Deserialize, Serialize};

use crate::ir::{JoinNode, QueryIr};

// ---------------------------------------------------------------------------
// Base query
// ---------------------------------------------------------------------------

/// The query a join is applied to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseQuery {
    /// Fully known while compiling.
    Static(QueryIr),
    /// A named runtime value, converted with `to_query_ir` when run.
    Var(String),
    /// The output of an earlier deferred join.
    Program(Box<RuntimeProgram>),
}

impl BaseQuery {
    /// Compile-time view of the base, if it is already a query IR.
    pub fn resolve_static_ir(&self) -> Option<&QueryIr> {
        match self {
            BaseQuery::Static(ir) => Some(ir),
            BaseQuery::Var(_) | BaseQuery::Program(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime program
// ---------------------------------------------------------------------------

/// One staged step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instr {
    /// Convert the evaluated base into a [`QueryIr`].
    ToQueryIr,
    /// Count the bindings of the converted IR. `listed` is the length of the
    /// binding list the program was compiled against: it may not exceed the
    /// count, and must equal it when `exact` is set.
    CountBindings { listed: usize, exact: bool },
    /// Fail unless the converted IR has at least `listed` bindings. Guards
    /// joins that need no count but still name earlier bindings.
    CheckBindings { listed: usize },
    /// Append the join, resolving pending indices with the counted value.
    AppendJoin(JoinNode),
}

/// Staged resolution of a join whose base query is only known at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeProgram {
    pub base: BaseQuery,
    pub instrs: Vec<Instr>,
}

impl RuntimeProgram {
    /// Whether the program computes the bind count when run.
    pub fn defers_count(&self) -> bool {
        self.instrs
            .iter()
            .any(|i| matches!(i, Instr::CountBindings { .. }))
    }

    /// Number of nested programs, this one included.
    pub fn depth(&self) -> usize {
        match &self.base {
            BaseQuery::Program(inner) => 1 + inner.depth(),
            BaseQuery::Static(_) | BaseQuery::Var(_) => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Join output
// ---------------------------------------------------------------------------

/// Result of compiling one join clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinOutput {
    /// The join was spliced into a known query.
    Static(QueryIr),
    /// The join must be applied once the base query exists.
    Deferred(RuntimeProgram),
}

impl JoinOutput {
    pub fn as_static(&self) -> Option<&QueryIr> {
        match self {
            JoinOutput::Static(ir) => Some(ir),
            JoinOutput::Deferred(_) => None,
        }
    }

    pub fn as_deferred(&self) -> Option<&RuntimeProgram> {
        match self {
            JoinOutput::Static(_) => None,
            JoinOutput::Deferred(p) => Some(p),
        }
    }

    /// The most recently compiled join, if any.
    pub fn last_join(&self) -> Option<&JoinNode> {
        match self {
            JoinOutput::Static(ir) => ir.joins.last(),
            JoinOutput::Deferred(program) => program.instrs.iter().rev().find_map(|i| match i {
                Instr::AppendJoin(join) => Some(join),
                _ => None,
            }),
        }
    }

    /// Use this output as the base of the next join.
    pub fn into_base(self) -> BaseQuery {
        match self {
            JoinOutput::Static(ir) => BaseQuery::Static(ir),
            JoinOutput::Deferred(p) => BaseQuery::Program(Box::new(p)),
        }
    }
}

impl From<BaseQuery> for JoinOutput {
    /// A query with no joins compiled yet. A runtime base becomes a program
    /// that only converts the value.
    fn from(base: BaseQuery) -> Self {
        match base {
            BaseQuery::Static(ir) => JoinOutput::Static(ir),
            BaseQuery::Program(p) => JoinOutput::Deferred(*p),
            var @ BaseQuery::Var(_) => JoinOutput::Deferred(RuntimeProgram {
                base: var,
                instrs: vec![Instr::ToQueryIr],
            }),
        }
    }
}
