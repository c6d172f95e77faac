use winnow::combinator::{cut_err, opt, separated};
use winnow::error::{StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::literal;

mod expr;

use crate::ast::*;
use crate::parse_utils::{ident, kw, line_at, ws_skip};

#[cfg(test)]
mod tests;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Parse a query document: a `from` clause followed by join clauses.
pub fn parse_query(input: &str) -> anyhow::Result<QueryDoc> {
    let origin = input;
    (|i: &mut &str| query_doc(origin, i))
        .parse(input)
        .map_err(|e| anyhow::anyhow!("parse error: {e}"))
}

/// Parse a standalone expression, e.g. an `on` condition or a join source.
pub fn parse_expr(input: &str) -> anyhow::Result<Expr> {
    (ws_skip, expr::parse_expr, ws_skip)
        .map(|(_, e, _)| e)
        .parse(input)
        .map_err(|e| anyhow::anyhow!("parse error: {e}"))
}

/// Parse a bracketed binding list such as `[p, _, c]`.
///
/// Items are returned unvalidated; the join compiler decides which shapes
/// are legal bindings.
pub fn parse_bindings(input: &str) -> anyhow::Result<Vec<Expr>> {
    (ws_skip, binding_list, ws_skip)
        .map(|(_, b, _)| b)
        .parse(input)
        .map_err(|e| anyhow::anyhow!("parse error: {e}"))
}

// ---------------------------------------------------------------------------
// Top-level grammar
// ---------------------------------------------------------------------------

fn query_doc(origin: &str, input: &mut &str) -> ModalResult<QueryDoc> {
    ws_skip.parse_next(input)?;
    let from_line = line_at(origin, input);
    cut_err(kw("from"))
        .context(StrContext::Expected(StrContextValue::Description(
            "'from' clause",
        )))
        .parse_next(input)?;
    ws_skip.parse_next(input)?;
    let from = cut_err(from_clause).parse_next(input)?;

    let mut joins = Vec::new();
    loop {
        ws_skip.parse_next(input)?;
        if input.is_empty() {
            break;
        }
        let line = line_at(origin, input);
        let clause = cut_err(|i: &mut &str| join_clause(line, i))
            .context(StrContext::Expected(StrContextValue::Description(
                "join clause",
            )))
            .parse_next(input)?;
        joins.push(clause);
    }

    Ok(QueryDoc {
        from,
        from_line,
        joins,
    })
}

// ---------------------------------------------------------------------------
// from clause
// ---------------------------------------------------------------------------

fn from_clause(input: &mut &str) -> ModalResult<FromClause> {
    if opt(literal("$")).parse_next(input)?.is_some() {
        let name = cut_err(ident)
            .context(StrContext::Expected(StrContextValue::Description(
                "variable name after '$'",
            )))
            .parse_next(input)?
            .to_string();
        ws_skip.parse_next(input)?;
        let bindings = opt(binding_list).parse_next(input)?;
        return Ok(FromClause::Var { name, bindings });
    }
    let source = expr::parse_expr
        .context(StrContext::Expected(StrContextValue::Description(
            "query source",
        )))
        .parse_next(input)?;
    Ok(FromClause::Source(source))
}

// ---------------------------------------------------------------------------
// join clause
// ---------------------------------------------------------------------------

fn join_clause(line: u32, input: &mut &str) -> ModalResult<JoinClause> {
    // A bare `join` is an inner join.
    let qualifier = if opt(kw("join")).parse_next(input)?.is_some() {
        "inner".to_string()
    } else {
        let qual = ident.parse_next(input)?.to_string();
        ws_skip.parse_next(input)?;
        cut_err(kw("join"))
            .context(StrContext::Expected(StrContextValue::Description(
                "'join' after qualifier",
            )))
            .parse_next(input)?;
        qual
    };

    ws_skip.parse_next(input)?;
    let bindings = opt(binding_list).parse_next(input)?;

    ws_skip.parse_next(input)?;
    let source = cut_err(expr::parse_expr)
        .context(StrContext::Expected(StrContextValue::Description(
            "join source",
        )))
        .parse_next(input)?;

    ws_skip.parse_next(input)?;
    let on = if opt(kw("on")).parse_next(input)?.is_some() {
        ws_skip.parse_next(input)?;
        Some(
            cut_err(expr::parse_expr)
                .context(StrContext::Expected(StrContextValue::Description(
                    "join condition after 'on'",
                )))
                .parse_next(input)?,
        )
    } else {
        None
    };

    Ok(JoinClause {
        qualifier,
        bindings,
        source,
        on,
        line,
    })
}

fn binding_list(input: &mut &str) -> ModalResult<Vec<Expr>> {
    literal("[").parse_next(input)?;
    ws_skip.parse_next(input)?;
    let items: Vec<Expr> = separated(
        0..,
        (ws_skip, expr::parse_expr, ws_skip).map(|(_, e, _)| e),
        literal(","),
    )
    .parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal("]"))
        .context(StrContext::Expected(StrContextValue::Description(
            "closing ']'",
        )))
        .parse_next(input)?;
    Ok(items)
}
