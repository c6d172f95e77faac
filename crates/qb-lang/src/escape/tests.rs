use crate::ast::{BinOp, Expr};
use crate::error::JoinError;
use crate::ir::{BindIndex, Literal, QueryExpr};
use crate::parse_expr;

use super::*;

fn scope(names: &[&str]) -> BindingScope {
    escape_binding(&names.iter().map(|n| Expr::ident(*n)).collect::<Vec<_>>()).unwrap()
}

fn expr(src: &str) -> Expr {
    parse_expr(src).expect("expression should parse")
}

// -----------------------------------------------------------------------
// Binding lists
// -----------------------------------------------------------------------

#[test]
fn binding_positions_follow_declaration_order() {
    let s = scope(&["p", "_", "c"]);
    assert_eq!(s.len(), 3);
    assert_eq!(s.index_of("p"), Some(0));
    assert_eq!(s.index_of("c"), Some(2));
    assert_eq!(s.index_of("_"), None);
}

#[test]
fn binding_list_rejects_non_identifiers() {
    let err = escape_binding(&[Expr::ident("p"), Expr::dot("p", "x")]).unwrap_err();
    assert_eq!(
        err,
        JoinError::MalformedBinding {
            expr: "p.x".into()
        }
    );
}

#[test]
fn binding_list_rejects_repeats() {
    let err = escape_binding(&[Expr::ident("p"), Expr::ident("p")]).unwrap_err();
    assert_eq!(err, JoinError::DuplicateBinding { name: "p".into() });
}

#[test]
fn placeholders_may_repeat() {
    let s = escape_binding(&[Expr::ident("_"), Expr::ident("_other"), Expr::ident("_")]).unwrap();
    assert_eq!(s.len(), 3);
    assert!(s.names().iter().all(Option::is_none));
}

// -----------------------------------------------------------------------
// Sources
// -----------------------------------------------------------------------

#[test]
fn bind_in_entity() {
    let desc = escape_source(&expr("c in Comments"), &scope(&["p"])).unwrap();
    assert_eq!(desc.bind_name.as_deref(), Some("c"));
    assert_eq!(desc.source_expr, Some(Expr::entity("Comments")));
    assert!(!desc.is_association());
}

#[test]
fn bind_in_association() {
    let desc = escape_source(&expr("t in p.tags"), &scope(&["p"])).unwrap();
    assert_eq!(desc.bind_name.as_deref(), Some("t"));
    assert_eq!(desc.association, Some((0, "tags".into())));
    assert!(desc.source_expr.is_none());
}

#[test]
fn bare_table_name() {
    let desc = escape_source(&Expr::StringLit("likes".into()), &scope(&[])).unwrap();
    assert!(desc.bind_name.is_none());
    assert_eq!(desc.source_expr, Some(Expr::StringLit("likes".into())));
}

#[test]
fn placeholder_bind_introduces_no_name() {
    let desc = escape_source(&expr("_ in Comments"), &scope(&[])).unwrap();
    assert!(desc.bind_name.is_none());
}

#[test]
fn outer_bind_name_wins() {
    let nested = Expr::bind_in("a", Expr::bind_in("b", Expr::entity("Comments")));
    let desc = escape_source(&nested, &scope(&[])).unwrap();
    assert_eq!(desc.bind_name.as_deref(), Some("a"));
}

#[test]
fn association_on_second_binding() {
    let desc = escape_source(&expr("c.likes"), &scope(&["p", "c"])).unwrap();
    assert_eq!(desc.association, Some((1, "likes".into())));
}

#[test]
fn unknown_binding_is_malformed() {
    let err = escape_source(&expr("x.comments"), &scope(&["p"])).unwrap_err();
    assert_eq!(
        err,
        JoinError::MalformedJoinExpression {
            expr: "x.comments".into()
        }
    );
}

#[test]
fn other_shapes_are_malformed() {
    for src in ["1", "comments", "f(p)", "p.id == 1"] {
        let err = escape_source(&expr(src), &scope(&["p"])).unwrap_err();
        assert!(
            matches!(err, JoinError::MalformedJoinExpression { .. }),
            "{src}: {err:?}"
        );
    }
}

#[test]
fn escape_is_deterministic() {
    let e = expr("c in Blog.Comment");
    let known = scope(&["p"]);
    assert_eq!(escape_source(&e, &known), escape_source(&e, &known));
}

#[test]
fn dot_only_for_known_bindings() {
    let known = scope(&["p"]);
    assert_eq!(escape_dot(&expr("p.comments"), &known), Some((0, "comments".into())));
    assert_eq!(escape_dot(&expr("q.comments"), &known), None);
    assert_eq!(escape_dot(&expr("p"), &known), None);
}

// -----------------------------------------------------------------------
// Conditions
// -----------------------------------------------------------------------

#[test]
fn condition_resolves_positions() {
    let join = JoinBinding {
        name: Some("c"),
        index: BindIndex::Fixed(1),
    };
    let compiled = escape_expression(&expr("c.post_id == p.id"), &scope(&["p"]), &join).unwrap();
    assert_eq!(
        compiled,
        QueryExpr::BinOp {
            op: BinOp::Eq,
            left: Box::new(QueryExpr::Field {
                binding: BindIndex::Fixed(1),
                field: "post_id".into(),
            }),
            right: Box::new(QueryExpr::Field {
                binding: BindIndex::Fixed(0),
                field: "id".into(),
            }),
        }
    );
    assert_eq!(compiled.to_string(), "&1.post_id == &0.id");
}

#[test]
fn condition_keeps_pending_index() {
    let join = JoinBinding {
        name: Some("c"),
        index: BindIndex::Pending,
    };
    let compiled = escape_expression(
        &expr("c.score > 3 && p.id in (1, 2)"),
        &scope(&["p"]),
        &join,
    )
    .unwrap();
    assert!(compiled.has_pending());
    let mut resolved = compiled.clone();
    resolved.resolve_pending(4);
    assert!(!resolved.has_pending());
    assert_eq!(resolved.to_string(), "&4.score > 3 && &0.id in (1, 2)");
}

#[test]
fn condition_literals_and_calls() {
    let join = JoinBinding {
        name: None,
        index: BindIndex::Fixed(1),
    };
    let compiled = escape_expression(&expr("lower(p.title) != \"x\""), &scope(&["p"]), &join).unwrap();
    match compiled {
        QueryExpr::BinOp { left, right, .. } => {
            assert!(matches!(*left, QueryExpr::Call { ref name, .. } if name == "lower"));
            assert_eq!(*right, QueryExpr::Literal(Literal::Str("x".into())));
        }
        other => panic!("expected BinOp, got {other:?}"),
    }
}

#[test]
fn unbound_variable_in_condition() {
    let join = JoinBinding {
        name: Some("c"),
        index: BindIndex::Fixed(1),
    };
    let err = escape_expression(&expr("c.post_id == q.id"), &scope(&["p"]), &join).unwrap_err();
    match err {
        JoinError::InvalidExpression { reason, .. } => assert!(reason.contains("`q`")),
        other => panic!("expected InvalidExpression, got {other:?}"),
    }
}

#[test]
fn entity_in_condition_is_rejected() {
    let join = JoinBinding {
        name: None,
        index: BindIndex::Fixed(1),
    };
    let err = escape_expression(&expr("p.kind == Posts"), &scope(&["p"]), &join).unwrap_err();
    assert!(matches!(err, JoinError::InvalidExpression { .. }));
}
