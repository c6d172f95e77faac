use winnow::combinator::{alt, cut_err, opt, separated};
use winnow::error::{StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::literal;

use crate::ast::*;
use crate::parse_utils::{ident, is_entity_segment, kw, number_literal, quoted_string, ws_skip};

// ---------------------------------------------------------------------------
// Public entry: full expression
// ---------------------------------------------------------------------------

pub(crate) fn parse_expr(input: &mut &str) -> ModalResult<Expr> {
    or_expr.parse_next(input)
}

// ---------------------------------------------------------------------------
// Precedence levels (lowest to highest)
// ---------------------------------------------------------------------------

/// `or_expr = and_expr { "||" and_expr }`
fn or_expr(input: &mut &str) -> ModalResult<Expr> {
    let mut left = and_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        if opt(literal("||")).parse_next(input)?.is_some() {
            ws_skip.parse_next(input)?;
            let right = cut_err(and_expr).parse_next(input)?;
            left = Expr::binop(BinOp::Or, left, right);
        } else {
            break;
        }
    }
    Ok(left)
}

/// `and_expr = cmp_expr { "&&" cmp_expr }`
fn and_expr(input: &mut &str) -> ModalResult<Expr> {
    let mut left = cmp_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        if opt(literal("&&")).parse_next(input)?.is_some() {
            ws_skip.parse_next(input)?;
            let right = cut_err(cmp_expr).parse_next(input)?;
            left = Expr::binop(BinOp::And, left, right);
        } else {
            break;
        }
    }
    Ok(left)
}

/// `cmp_expr = add_expr [cmp_op add_expr | "in" "(" list ")" | "not" "in" "(" list ")" | "in" add_expr]`
///
/// The last form is the binding shape `c in Comments` used by sources.
fn cmp_expr(input: &mut &str) -> ModalResult<Expr> {
    let left = add_expr.parse_next(input)?;
    ws_skip.parse_next(input)?;

    if opt((kw("not"), ws_skip, kw("in")))
        .parse_next(input)?
        .is_some()
    {
        ws_skip.parse_next(input)?;
        let list = cut_err(in_list).parse_next(input)?;
        return Ok(Expr::InList {
            expr: Box::new(left),
            list,
            negated: true,
        });
    }

    if opt(kw("in")).parse_next(input)?.is_some() {
        ws_skip.parse_next(input)?;
        if input.starts_with('(') {
            let list = in_list.parse_next(input)?;
            return Ok(Expr::InList {
                expr: Box::new(left),
                list,
                negated: false,
            });
        }
        let right = cut_err(add_expr)
            .context(StrContext::Expected(StrContextValue::Description(
                "source after 'in'",
            )))
            .parse_next(input)?;
        return Ok(Expr::binop(BinOp::In, left, right));
    }

    if let Some(op) = opt(cmp_op).parse_next(input)? {
        ws_skip.parse_next(input)?;
        let right = cut_err(add_expr).parse_next(input)?;
        return Ok(Expr::binop(op, left, right));
    }

    Ok(left)
}

fn in_list(input: &mut &str) -> ModalResult<Vec<Expr>> {
    literal("(").parse_next(input)?;
    ws_skip.parse_next(input)?;
    let list: Vec<Expr> =
        separated(1.., (ws_skip, parse_expr).map(|(_, e)| e), literal(",")).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal(")")).parse_next(input)?;
    Ok(list)
}

fn cmp_op(input: &mut &str) -> ModalResult<BinOp> {
    alt((
        literal("==").value(BinOp::Eq),
        literal("!=").value(BinOp::Ne),
        literal("<=").value(BinOp::Le),
        literal(">=").value(BinOp::Ge),
        literal("<").value(BinOp::Lt),
        literal(">").value(BinOp::Gt),
    ))
    .parse_next(input)
}

/// `add_expr = mul_expr { ("+" | "-") mul_expr }`
fn add_expr(input: &mut &str) -> ModalResult<Expr> {
    let mut left = mul_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        let op = opt(alt((
            literal("+").value(BinOp::Add),
            literal("-").value(BinOp::Sub),
        )))
        .parse_next(input)?;
        if let Some(op) = op {
            ws_skip.parse_next(input)?;
            let right = cut_err(mul_expr).parse_next(input)?;
            left = Expr::binop(op, left, right);
        } else {
            break;
        }
    }
    Ok(left)
}

/// `mul_expr = unary_expr { ("*" | "/" | "%") unary_expr }`
fn mul_expr(input: &mut &str) -> ModalResult<Expr> {
    let mut left = unary_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        let op = opt(alt((
            literal("*").value(BinOp::Mul),
            literal("/").value(BinOp::Div),
            literal("%").value(BinOp::Mod),
        )))
        .parse_next(input)?;
        if let Some(op) = op {
            ws_skip.parse_next(input)?;
            let right = cut_err(unary_expr).parse_next(input)?;
            left = Expr::binop(op, left, right);
        } else {
            break;
        }
    }
    Ok(left)
}

/// `unary_expr = ["-" | "not"] primary`
fn unary_expr(input: &mut &str) -> ModalResult<Expr> {
    if opt(literal("-")).parse_next(input)?.is_some() {
        ws_skip.parse_next(input)?;
        let inner = cut_err(primary).parse_next(input)?;
        return Ok(Expr::Neg(Box::new(inner)));
    }
    if opt(kw("not")).parse_next(input)?.is_some() {
        ws_skip.parse_next(input)?;
        let inner = cut_err(unary_expr).parse_next(input)?;
        return Ok(Expr::Not(Box::new(inner)));
    }
    primary.parse_next(input)
}

// ---------------------------------------------------------------------------
// Primary
// ---------------------------------------------------------------------------

fn primary(input: &mut &str) -> ModalResult<Expr> {
    alt((
        number_literal.map(Expr::Number),
        quoted_string.map(Expr::StringLit),
        kw("true").map(|_| Expr::Bool(true)),
        kw("false").map(|_| Expr::Bool(false)),
        if_expr,
        paren_expr,
        ident_primary,
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "expression",
    )))
    .parse_next(input)
}

fn paren_expr(input: &mut &str) -> ModalResult<Expr> {
    literal("(").parse_next(input)?;
    ws_skip.parse_next(input)?;
    let inner = cut_err(parse_expr).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal(")")).parse_next(input)?;
    Ok(inner)
}

/// `if cond then a else b`
fn if_expr(input: &mut &str) -> ModalResult<Expr> {
    kw("if").parse_next(input)?;
    ws_skip.parse_next(input)?;
    let cond = cut_err(parse_expr).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(kw("then")).parse_next(input)?;
    ws_skip.parse_next(input)?;
    let then_expr = cut_err(parse_expr).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(kw("else")).parse_next(input)?;
    ws_skip.parse_next(input)?;
    let else_expr = cut_err(parse_expr).parse_next(input)?;
    Ok(Expr::IfThenElse {
        cond: Box::new(cond),
        then_expr: Box::new(then_expr),
        else_expr: Box::new(else_expr),
    })
}

/// Parse an ident-based primary: entity path, function call or field
/// reference.
fn ident_primary(input: &mut &str) -> ModalResult<Expr> {
    let first = ident.parse_next(input)?;

    if is_entity_segment(first) {
        return Ok(entity_path(first, input));
    }

    ws_skip.parse_next(input)?;

    // first( ... ) → function call
    if opt(literal("(")).parse_next(input)?.is_some() {
        return parse_func_call_args(None, first.to_string(), input);
    }

    // first.second → qualified func call or field ref
    if opt(literal(".")).parse_next(input)?.is_some() {
        ws_skip.parse_next(input)?;
        let second = cut_err(ident).parse_next(input)?;
        ws_skip.parse_next(input)?;

        if opt(literal("(")).parse_next(input)?.is_some() {
            return parse_func_call_args(Some(first.to_string()), second.to_string(), input);
        }

        return Ok(Expr::dot(first, second));
    }

    // first["key"] → bracket field ref
    if opt(literal("[")).parse_next(input)?.is_some() {
        ws_skip.parse_next(input)?;
        let key = cut_err(quoted_string).parse_next(input)?;
        ws_skip.parse_next(input)?;
        cut_err(literal("]")).parse_next(input)?;
        return Ok(Expr::Field(FieldRef::Bracketed(first.to_string(), key)));
    }

    Ok(Expr::ident(first))
}

/// `Blog.Comment`: segments continue only while they are capitalised, so
/// `Blog.Post.comments` never becomes part of an alias.
fn entity_path(first: &str, input: &mut &str) -> Expr {
    let mut path = vec![first.to_string()];
    loop {
        let mut probe = *input;
        let next = probe.strip_prefix('.').and_then(|rest| {
            probe = rest;
            ident.parse_next(&mut probe).ok()
        });
        match next {
            Some(seg) if is_entity_segment(seg) => {
                path.push(seg.to_string());
                *input = probe;
            }
            _ => break,
        }
    }
    Expr::Entity(path)
}

fn parse_func_call_args(
    qualifier: Option<String>,
    name: String,
    input: &mut &str,
) -> ModalResult<Expr> {
    ws_skip.parse_next(input)?;

    if opt(literal(")")).parse_next(input)?.is_some() {
        return Ok(Expr::FuncCall {
            qualifier,
            name,
            args: vec![],
        });
    }

    let args: Vec<Expr> =
        separated(1.., (ws_skip, parse_expr).map(|(_, e)| e), literal(",")).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal(")")).parse_next(input)?;

    Ok(Expr::FuncCall {
        qualifier,
        name,
        args,
    })
}
