use crate::ast::{BinOp, Expr, FieldRef};
use crate::error::JoinError;
use crate::ir::{BindIndex, Literal, QueryExpr};

use super::binding::BindingScope;

/// The binding a join introduces, as seen from its own `on` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinBinding<'a> {
    pub name: Option<&'a str>,
    pub index: BindIndex,
}

/// Compile a condition, replacing variables with positional indices.
///
/// Names in `known` resolve to their position; the joining binding resolves
/// to `join.index`, which may still be pending.
pub fn escape_expression(
    expr: &Expr,
    known: &BindingScope,
    join: &JoinBinding<'_>,
) -> Result<QueryExpr, JoinError> {
    let lookup = |name: &str| -> Result<BindIndex, JoinError> {
        if join.name == Some(name) {
            return Ok(join.index);
        }
        known
            .index_of(name)
            .map(BindIndex::Fixed)
            .ok_or_else(|| JoinError::InvalidExpression {
                expr: expr.to_string(),
                reason: format!("unbound variable `{name}`"),
            })
    };
    let sub = |e: &Expr| escape_expression(e, known, join).map(Box::new);

    Ok(match expr {
        Expr::Number(n) => QueryExpr::Literal(Literal::Number(*n)),
        Expr::StringLit(s) => QueryExpr::Literal(Literal::Str(s.clone())),
        Expr::Bool(b) => QueryExpr::Literal(Literal::Bool(*b)),
        Expr::Field(FieldRef::Simple(name)) => QueryExpr::Binding(lookup(name)?),
        Expr::Field(FieldRef::Qualified(binding, field))
        | Expr::Field(FieldRef::Bracketed(binding, field)) => QueryExpr::Field {
            binding: lookup(binding)?,
            field: field.clone(),
        },
        Expr::Entity(_) => {
            return Err(JoinError::InvalidExpression {
                expr: expr.to_string(),
                reason: "entity references are only valid as join sources".into(),
            });
        }
        Expr::BinOp { op: BinOp::In, .. } => {
            return Err(JoinError::InvalidExpression {
                expr: expr.to_string(),
                reason: "`in` needs a parenthesised list inside a condition".into(),
            });
        }
        Expr::BinOp { op, left, right } => QueryExpr::BinOp {
            op: *op,
            left: sub(left)?,
            right: sub(right)?,
        },
        Expr::Neg(inner) => QueryExpr::Neg(sub(inner)?),
        Expr::Not(inner) => QueryExpr::Not(sub(inner)?),
        Expr::FuncCall {
            qualifier,
            name,
            args,
        } => QueryExpr::Call {
            qualifier: qualifier.clone(),
            name: name.clone(),
            args: args
                .iter()
                .map(|a| escape_expression(a, known, join))
                .collect::<Result<_, _>>()?,
        },
        Expr::InList {
            expr: inner,
            list,
            negated,
        } => QueryExpr::InList {
            expr: sub(inner)?,
            list: list
                .iter()
                .map(|a| escape_expression(a, known, join))
                .collect::<Result<_, _>>()?,
            negated: *negated,
        },
        Expr::IfThenElse {
            cond,
            then_expr,
            else_expr,
        } => QueryExpr::IfThenElse {
            cond: sub(cond)?,
            then_expr: sub(then_expr)?,
            else_expr: sub(else_expr)?,
        },
    })
}
