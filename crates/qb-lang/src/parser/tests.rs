use crate::ast::*;
use crate::parser::{parse_bindings, parse_expr, parse_query};

// -----------------------------------------------------------------------
// Sources
// -----------------------------------------------------------------------

#[test]
fn parse_bind_in_entity() {
    let e = parse_expr("c in Comments").unwrap();
    assert_eq!(e, Expr::bind_in("c", Expr::entity("Comments")));
}

#[test]
fn parse_bind_in_alias_path() {
    let e = parse_expr("c in Blog.Comment").unwrap();
    assert_eq!(
        e,
        Expr::bind_in("c", Expr::Entity(vec!["Blog".into(), "Comment".into()]))
    );
}

#[test]
fn parse_bind_in_table_name() {
    let e = parse_expr(r#"l in "likes""#).unwrap();
    assert_eq!(e, Expr::bind_in("l", Expr::StringLit("likes".into())));
}

#[test]
fn parse_association_path() {
    let e = parse_expr("p.comments").unwrap();
    assert_eq!(e, Expr::dot("p", "comments"));
}

#[test]
fn in_with_parens_is_a_list() {
    let e = parse_expr("c.kind in (1, 2)").unwrap();
    match e {
        Expr::InList { list, negated, .. } => {
            assert_eq!(list.len(), 2);
            assert!(!negated);
        }
        other => panic!("expected InList, got {other:?}"),
    }
}

// -----------------------------------------------------------------------
// Conditions
// -----------------------------------------------------------------------

#[test]
fn parse_on_condition() {
    let e = parse_expr("c.post_id == p.id && not c.hidden").unwrap();
    match e {
        Expr::BinOp {
            op: BinOp::And,
            left,
            right,
        } => {
            assert_eq!(
                *left,
                Expr::binop(BinOp::Eq, Expr::dot("c", "post_id"), Expr::dot("p", "id"))
            );
            assert!(matches!(*right, Expr::Not(_)));
        }
        other => panic!("expected And, got {other:?}"),
    }
}

#[test]
fn parse_if_then_else() {
    let e = parse_expr("if p.public then true else c.approved").unwrap();
    assert!(matches!(e, Expr::IfThenElse { .. }));
}

#[test]
fn parse_qualified_call() {
    let e = parse_expr("str.lower(c.author) == \"bob\"").unwrap();
    match e {
        Expr::BinOp { left, .. } => match *left {
            Expr::FuncCall {
                qualifier, name, ..
            } => {
                assert_eq!(qualifier.as_deref(), Some("str"));
                assert_eq!(name, "lower");
            }
            other => panic!("expected FuncCall, got {other:?}"),
        },
        other => panic!("expected BinOp, got {other:?}"),
    }
}

// -----------------------------------------------------------------------
// Binding lists
// -----------------------------------------------------------------------

#[test]
fn parse_binding_list_with_placeholder() {
    let b = parse_bindings("[p, _, c]").unwrap();
    assert_eq!(b, vec![Expr::ident("p"), Expr::ident("_"), Expr::ident("c")]);
}

#[test]
fn parse_empty_binding_list() {
    assert!(parse_bindings("[]").unwrap().is_empty());
}

// -----------------------------------------------------------------------
// Query documents
// -----------------------------------------------------------------------

#[test]
fn parse_query_with_joins() {
    let doc = parse_query(
        r#"
from p in Posts
inner join c in Comments on c.post_id == p.id
# association join, no condition
left join p.tags
join [p, c] l in "likes" on l.comment_id == c.id
"#,
    )
    .unwrap();

    assert_eq!(
        doc.from,
        FromClause::Source(Expr::bind_in("p", Expr::entity("Posts")))
    );
    assert_eq!(doc.joins.len(), 3);

    assert_eq!(doc.joins[0].qualifier, "inner");
    assert_eq!(doc.joins[0].line, 3);
    assert!(doc.joins[0].on.is_some());
    assert!(doc.joins[0].bindings.is_none());

    assert_eq!(doc.joins[1].qualifier, "left");
    assert_eq!(doc.joins[1].source, Expr::dot("p", "tags"));
    assert!(doc.joins[1].on.is_none());
    assert_eq!(doc.joins[1].line, 5);

    assert_eq!(doc.joins[2].qualifier, "inner");
    assert_eq!(
        doc.joins[2].bindings,
        Some(vec![Expr::ident("p"), Expr::ident("c")])
    );
}

#[test]
fn parse_runtime_base() {
    let doc = parse_query("from $posts [p] right join c in Comments on c.post_id == p.id").unwrap();
    assert_eq!(
        doc.from,
        FromClause::Var {
            name: "posts".into(),
            bindings: Some(vec![Expr::ident("p")]),
        }
    );
    assert_eq!(doc.joins[0].qualifier, "right");
    assert_eq!(doc.joins[0].line, 1);
}

#[test]
fn unknown_qualifier_is_left_to_the_compiler() {
    let doc = parse_query("from p in Posts outer join c in Comments on true").unwrap();
    assert_eq!(doc.joins[0].qualifier, "outer");
}

#[test]
fn missing_from_is_an_error() {
    let err = parse_query("join c in Comments on true").unwrap_err();
    assert!(err.to_string().contains("parse error"));
}

#[test]
fn qualifier_without_join_is_an_error() {
    assert!(parse_query("from p in Posts left c in Comments on true").is_err());
}
