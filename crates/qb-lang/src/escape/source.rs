use crate::ast::{BinOp, Expr, FieldRef};
use crate::error::JoinError;

use super::binding::{BindingScope, is_placeholder};

/// Classified join source.
///
/// Exactly one of `source_expr` and `association` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSourceDesc {
    pub bind_name: Option<String>,
    /// Entity reference or table-name literal.
    pub source_expr: Option<Expr>,
    /// `(binding_index, field)` of an association path.
    pub association: Option<(usize, String)>,
}

impl JoinSourceDesc {
    pub fn is_association(&self) -> bool {
        self.association.is_some()
    }
}

/// Classify a join source against the bindings known to the clause.
pub fn escape_source(expr: &Expr, known: &BindingScope) -> Result<JoinSourceDesc, JoinError> {
    // `c in sub`: escape `sub`, then take the binding name.
    if let Expr::BinOp {
        op: BinOp::In,
        left,
        right,
    } = expr
        && let Expr::Field(FieldRef::Simple(name)) = left.as_ref()
    {
        let mut desc = escape_source(right, known)?;
        desc.bind_name = (!is_placeholder(name)).then(|| name.clone());
        return Ok(desc);
    }

    match expr {
        Expr::Entity(_) | Expr::StringLit(_) => Ok(JoinSourceDesc {
            bind_name: None,
            source_expr: Some(expr.clone()),
            association: None,
        }),
        _ => match escape_dot(expr, known) {
            Some(assoc) => Ok(JoinSourceDesc {
                bind_name: None,
                source_expr: None,
                association: Some(assoc),
            }),
            None => Err(JoinError::MalformedJoinExpression {
                expr: expr.to_string(),
            }),
        },
    }
}

/// Resolve `binding.field` where `binding` is known; `None` for any other
/// shape.
pub fn escape_dot(expr: &Expr, known: &BindingScope) -> Option<(usize, String)> {
    match expr {
        Expr::Field(FieldRef::Qualified(binding, field))
        | Expr::Field(FieldRef::Bracketed(binding, field)) => {
            known.index_of(binding).map(|idx| (idx, field.clone()))
        }
        _ => None,
    }
}
