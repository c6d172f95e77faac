use crate::ast::{FromClause, QueryDoc};
use crate::checker::validate_bind_uniqueness;
use crate::error::{BuildError, BuildResult, JoinError};
use crate::escape::{BindingScope, escape_binding, escape_source};
use crate::ir::{Location, QueryIr};
use crate::program::{BaseQuery, Instr, JoinOutput};

use super::{compile_join, source_ref};

/// Compile a whole query document, joins in declaration order.
///
/// Each join sees the bindings accumulated so far unless it lists its own;
/// a listed scope never frees a name the query already binds. The output of
/// one join is the base of the next, so a runtime base nests one program per
/// join.
///
/// A `$var` base without a declared binding list has no known scope, and
/// neither do the joins after it: each of them must list the bindings it
/// refers to.
pub fn compile_query(doc: &QueryDoc, file: &str) -> BuildResult<JoinOutput> {
    let from_location = Location::new(file, doc.from_line);
    let (base, mut scope) = compile_from(&doc.from).map_err(|kind| BuildError {
        location: from_location,
        kind,
    })?;

    let mut output = JoinOutput::from(base);
    // Declared bindings of a runtime value must be its complete list, or the
    // accumulated positions below would drift.
    if let (JoinOutput::Deferred(program), Some(declared)) = (&mut output, &scope) {
        program.instrs.push(Instr::CountBindings {
            listed: declared.len(),
            exact: true,
        });
    }
    for clause in &doc.joins {
        let location = Location::new(file, clause.line);
        let listed = match &clause.bindings {
            Some(explicit) => explicit.clone(),
            None => scope.as_ref().map(BindingScope::to_exprs).unwrap_or_default(),
        };
        output = compile_join(
            output.into_base(),
            &clause.qualifier,
            &listed,
            &clause.source,
            clause.on.as_ref(),
            location,
        )?;
        let bind_name = output.last_join().and_then(|j| j.bind_name.as_deref());
        if clause.bindings.is_some()
            && let Some(accumulated) = &scope
        {
            validate_bind_uniqueness(bind_name, accumulated).map_err(|kind| BuildError {
                location: Location::new(file, clause.line),
                kind,
            })?;
        }
        scope = scope.map(|s| s.pushed(bind_name));
    }
    Ok(output)
}

/// The base query and the bindings known for it. Bindings of a runtime
/// value are unknown unless the author declares them.
fn compile_from(from: &FromClause) -> Result<(BaseQuery, Option<BindingScope>), JoinError> {
    match from {
        FromClause::Source(expr) => {
            let desc = escape_source(expr, &BindingScope::default())?;
            let src = desc.source_expr.as_ref().and_then(source_ref).ok_or_else(|| {
                JoinError::MalformedJoinExpression {
                    expr: expr.to_string(),
                }
            })?;
            let scope = BindingScope::new(vec![desc.bind_name.clone()]);
            Ok((
                BaseQuery::Static(QueryIr::from_source(src, desc.bind_name)),
                Some(scope),
            ))
        }
        FromClause::Var { name, bindings } => {
            let scope = bindings
                .as_deref()
                .filter(|b| !b.is_empty())
                .map(escape_binding)
                .transpose()?;
            Ok((BaseQuery::Var(name.clone()), scope))
        }
    }
}
