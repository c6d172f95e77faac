use std::collections::HashMap;

use orion_error::StructError;
use qb_lang::ir::{Literal, QueryIr, SourceRef};
use serde::{Deserialize, Serialize};

use crate::error::{ExecReason, ExecResult};

// ---------------------------------------------------------------------------
// Queryable
// ---------------------------------------------------------------------------

/// A runtime value that can stand in for a query.
pub trait Queryable {
    fn to_query_ir(&self) -> ExecResult<QueryIr>;
}

impl Queryable for QueryIr {
    fn to_query_ir(&self) -> ExecResult<QueryIr> {
        Ok(self.clone())
    }
}

/// Values a query variable may hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeValue {
    /// An already built query.
    Query(QueryIr),
    /// An entity alias; queried as a single unnamed binding.
    Entity(String),
    /// A raw table name; queried as a single unnamed binding.
    Table(String),
    /// A scalar. Never queryable.
    Literal(Literal),
}

impl Queryable for RuntimeValue {
    fn to_query_ir(&self) -> ExecResult<QueryIr> {
        let source = match self {
            RuntimeValue::Query(ir) => return Ok(ir.clone()),
            RuntimeValue::Entity(name) => SourceRef::Entity(name.clone()),
            RuntimeValue::Table(name) => SourceRef::Table(name.clone()),
            RuntimeValue::Literal(lit) => {
                return StructError::from(ExecReason::NotQueryable)
                    .with_detail(format!("literal {lit:?} is not a query source"))
                    .err();
            }
        };
        match &source {
            SourceRef::Entity(name) | SourceRef::Table(name) if name.is_empty() => {
                StructError::from(ExecReason::NotQueryable)
                    .with_detail("empty source name")
                    .err()
            }
            _ => Ok(QueryIr::from_source(source, None)),
        }
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Where a runtime program finds the values its `$var` bases name.
pub trait RuntimeEnv {
    fn lookup(&self, name: &str) -> Option<&dyn Queryable>;
}

/// Name to value table; the environment the CLI builds from configuration.
#[derive(Debug, Clone, Default)]
pub struct VarTable {
    vars: HashMap<String, RuntimeValue>,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: RuntimeValue) -> Option<RuntimeValue> {
        self.vars.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&RuntimeValue> {
        self.vars.get(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl RuntimeEnv for VarTable {
    fn lookup(&self, name: &str) -> Option<&dyn Queryable> {
        self.vars.get(name).map(|v| v as &dyn Queryable)
    }
}

impl<K: Into<String>> FromIterator<(K, RuntimeValue)> for VarTable {
    fn from_iter<I: IntoIterator<Item = (K, RuntimeValue)>>(iter: I) -> Self {
        VarTable {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
