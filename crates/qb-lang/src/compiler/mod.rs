use crate::ast::Expr;
use crate::bind_count::{BindCount, resolve_bind_count};
use crate::checker::{validate_bind_uniqueness, validate_on_presence, validate_qualifier};
use crate::error::{BuildError, BuildResult, JoinError};
use crate::escape::{
    BindingScope, JoinBinding, JoinSourceDesc, escape_binding, escape_expression, escape_source,
};
use crate::ir::{BindIndex, JoinNode, JoinSource, Location, OnClause, SourceRef};
use crate::program::{BaseQuery, Instr, JoinOutput, RuntimeProgram};

mod query;

pub use query::compile_query;

#[cfg(test)]
mod tests;

/// Compile one join clause against `base`.
///
/// Validation runs before any IR is built, so an error never leaves a
/// half-built query behind. When `base` is a known [`QueryIr`] the join is
/// appended now and the updated query is returned as
/// [`JoinOutput::Static`]; otherwise a [`RuntimeProgram`] that converts the
/// base, counts its bindings if needed and appends the join is returned.
/// A join that needs no count but lists more than one binding gets a
/// [`Instr::CheckBindings`] guard instead.
///
/// [`QueryIr`]: crate::ir::QueryIr
pub fn compile_join(
    base: BaseQuery,
    qualifier: &str,
    binding_names: &[Expr],
    source: &Expr,
    on: Option<&Expr>,
    location: Location,
) -> BuildResult<JoinOutput> {
    let at = |kind: JoinError| BuildError {
        location: location.clone(),
        kind,
    };

    let known = escape_binding(binding_names).map_err(at)?;
    let desc = escape_source(source, &known).map_err(at)?;
    let is_association = desc.is_association();
    tracing::trace!(
        domain = "build",
        %location,
        association = is_association,
        bind = ?desc.bind_name,
        "join source escaped"
    );

    let qualifier = validate_qualifier(qualifier).map_err(at)?;
    validate_bind_uniqueness(desc.bind_name.as_deref(), &known).map_err(at)?;
    validate_on_presence(on, is_association).map_err(at)?;

    let static_ir = base.resolve_static_ir();
    // The listed scope may rename or omit positions; names already in the
    // query stay taken.
    if let Some(ir) = static_ir {
        let bound = BindingScope::new(
            ir.binding_names()
                .into_iter()
                .map(|n| n.map(String::from))
                .collect(),
        );
        validate_bind_uniqueness(desc.bind_name.as_deref(), &bound).map_err(at)?;
    }
    if let Some(ir) = static_ir
        && known.len() > ir.count_bindings()
    {
        return Err(at(JoinError::BindingOverflow {
            listed: known.len(),
            available: ir.count_bindings(),
        }));
    }

    let needs_count = !(is_association && on.is_none());
    let count = resolve_bind_count(static_ir, needs_count);

    let on = match on {
        Some(expr) => {
            let join = JoinBinding {
                name: desc.bind_name.as_deref(),
                index: count.map_or(BindIndex::Pending, BindCount::join_index),
            };
            let compiled = escape_expression(expr, &known, &join).map_err(at)?;
            Some(OnClause {
                expr: compiled,
                location: location.clone(),
            })
        }
        None => None,
    };

    let JoinSourceDesc {
        bind_name,
        source_expr,
        association,
    } = desc;
    let resolved = match (association, source_expr.as_ref().and_then(source_ref)) {
        (Some((binding, field)), _) => JoinSource::Assoc { binding, field },
        (None, Some(src)) => JoinSource::Source(src),
        (None, None) => {
            return Err(at(JoinError::MalformedJoinExpression {
                expr: source.to_string(),
            }));
        }
    };
    let node = JoinNode {
        qualifier,
        bind_name,
        source: resolved,
        on,
        location: location.clone(),
        is_association,
    };

    match base {
        BaseQuery::Static(mut ir) => {
            ir.append_join(node);
            tracing::debug!(
                domain = "build",
                %location,
                %qualifier,
                bindings = ir.count_bindings(),
                "join spliced into static query"
            );
            Ok(JoinOutput::Static(ir))
        }
        runtime => {
            let mut instrs = vec![Instr::ToQueryIr];
            match count {
                Some(BindCount::Deferred) => instrs.push(Instr::CountBindings {
                    listed: known.len(),
                    exact: false,
                }),
                // Every query has at least one binding.
                None if known.len() > 1 => instrs.push(Instr::CheckBindings {
                    listed: known.len(),
                }),
                _ => {}
            }
            instrs.push(Instr::AppendJoin(node));
            tracing::debug!(
                domain = "build",
                %location,
                %qualifier,
                deferred_count = count.is_some(),
                "join deferred to runtime"
            );
            Ok(JoinOutput::Deferred(RuntimeProgram {
                base: runtime,
                instrs,
            }))
        }
    }
}

/// Static source of an entity or table-name expression.
pub(crate) fn source_ref(expr: &Expr) -> Option<SourceRef> {
    match expr {
        Expr::Entity(path) => Some(SourceRef::Entity(path.join("."))),
        Expr::StringLit(table) => Some(SourceRef::Table(table.clone())),
        _ => None,
    }
}
