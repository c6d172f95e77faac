use crate::ir::{BindIndex, JoinSource, Qualifier, QueryExpr, SourceRef};
use crate::program::BaseQuery;

use super::*;

// ---------------------------------------------------------------------------
// Reference scenarios
// ---------------------------------------------------------------------------

#[test]
fn inner_join_with_condition() {
    let out = join(
        BaseQuery::Static(posts_query()),
        "inner",
        "[p]",
        "c in Comments",
        Some("c.post_id == p.id"),
    )
    .unwrap();
    let ir = expect_static(out);
    assert_eq!(ir.joins.len(), 1);
    let node = &ir.joins[0];
    assert_eq!(node.qualifier, Qualifier::Inner);
    assert!(!node.is_association);
    assert_eq!(node.bind_name.as_deref(), Some("c"));
    assert_eq!(
        node.source,
        JoinSource::Source(SourceRef::Entity("Comments".into()))
    );

    let on = node.on.as_ref().expect("condition should be compiled");
    assert_eq!(on.location, loc(1));
    assert!(on.expr.any_index(&|i| i == BindIndex::Fixed(0)));
    assert!(on.expr.any_index(&|i| i == BindIndex::Fixed(1)));
    assert!(!on.expr.has_pending());
    assert_eq!(ir.binding_names(), vec![Some("p"), Some("c")]);
}

#[test]
fn association_join_without_condition() {
    let out = join(
        BaseQuery::Static(posts_query()),
        "left",
        "[p]",
        "p.comments",
        None,
    )
    .unwrap();
    let ir = expect_static(out);
    let node = &ir.joins[0];
    assert_eq!(node.qualifier, Qualifier::Left);
    assert!(node.is_association);
    assert!(node.on.is_none());
    assert_eq!(
        node.source,
        JoinSource::Assoc {
            binding: 0,
            field: "comments".into()
        }
    );
}

#[test]
fn plain_join_without_condition_is_rejected() {
    let err = expect_err(join(
        BaseQuery::Static(posts_query()),
        "inner",
        "[p]",
        "c in Comments",
        None,
    ));
    assert_eq!(err, JoinError::MissingOnClause);
}

#[test]
fn rebinding_an_existing_name_is_rejected() {
    let err = expect_err(join(
        BaseQuery::Static(posts_query()),
        "inner",
        "[p]",
        "p in Posts",
        Some("p.id == 1"),
    ));
    assert_eq!(err, JoinError::DuplicateBinding { name: "p".into() });
}

#[test]
fn unknown_qualifier_is_rejected() {
    let err = expect_err(join(
        BaseQuery::Static(posts_query()),
        "outer",
        "[p]",
        "c in Comments",
        Some("c.post_id == p.id"),
    ));
    assert_eq!(
        err,
        JoinError::InvalidQualifier {
            qualifier: "outer".into()
        }
    );
    assert!(err.to_string().contains("outer"));
}

// ---------------------------------------------------------------------------
// Properties of the static path
// ---------------------------------------------------------------------------

#[test]
fn every_qualifier_is_stored() {
    for q in Qualifier::ALL {
        let out = join(
            BaseQuery::Static(posts_query()),
            q.as_str(),
            "[p]",
            "c in Comments",
            Some("c.post_id == p.id"),
        )
        .unwrap();
        assert_eq!(out.last_join().map(|j| j.qualifier), Some(q));
    }
}

#[test]
fn static_splice_appends_exactly_one_join() {
    let first = expect_static(
        join(
            BaseQuery::Static(posts_query()),
            "inner",
            "[p]",
            "c in Comments",
            Some("c.post_id == p.id"),
        )
        .unwrap(),
    );
    let before = first.clone();

    let second = expect_static(
        join(
            BaseQuery::Static(first),
            "left",
            "[p, c]",
            r#"l in "likes""#,
            Some("l.comment_id == c.id"),
        )
        .unwrap(),
    );
    assert_eq!(second.from, before.from);
    assert_eq!(&second.joins[..1], &before.joins[..]);
    assert_eq!(second.count_bindings(), before.count_bindings() + 1);

    let node = &second.joins[1];
    assert_eq!(node.source, JoinSource::Source(SourceRef::Table("likes".into())));
    let on = node.on.as_ref().unwrap();
    assert_eq!(on.expr.to_string(), "&2.comment_id == &1.id");
}

#[test]
fn unnamed_join_still_takes_a_position() {
    let ir = expect_static(
        join(
            BaseQuery::Static(posts_query()),
            "inner",
            "[p]",
            r#""likes""#,
            Some("p.id > 0"),
        )
        .unwrap(),
    );
    assert_eq!(ir.count_bindings(), 2);
    assert_eq!(ir.binding_names(), vec![Some("p"), None]);
}

#[test]
fn association_may_carry_a_condition() {
    let ir = expect_static(
        join(
            BaseQuery::Static(posts_query()),
            "inner",
            "[p]",
            "c in p.comments",
            Some("c.score > 3"),
        )
        .unwrap(),
    );
    let node = &ir.joins[0];
    assert!(node.is_association);
    assert_eq!(
        node.on.as_ref().map(|o| o.expr.clone()),
        Some(QueryExpr::BinOp {
            op: crate::ast::BinOp::Gt,
            left: Box::new(QueryExpr::Field {
                binding: BindIndex::Fixed(1),
                field: "score".into(),
            }),
            right: Box::new(QueryExpr::Literal(crate::ir::Literal::Number(3.0))),
        })
    );
}

#[test]
fn placeholder_positions_are_skipped() {
    let base = expect_static(
        join(
            BaseQuery::Static(posts_query()),
            "inner",
            "[p]",
            "c in Comments",
            Some("c.post_id == p.id"),
        )
        .unwrap(),
    );
    let ir = expect_static(
        join(
            BaseQuery::Static(base),
            "inner",
            "[_, c]",
            "a in Authors",
            Some("a.id == c.author_id"),
        )
        .unwrap(),
    );
    let on = ir.joins[1].on.as_ref().unwrap();
    assert_eq!(on.expr.to_string(), "&2.id == &1.author_id");
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn listed_scope_cannot_rebind_a_query_name() {
    let base = expect_static(
        join(
            BaseQuery::Static(posts_query()),
            "inner",
            "[p]",
            "c in Comments",
            Some("c.post_id == p.id"),
        )
        .unwrap(),
    );
    let err = expect_err(join(
        BaseQuery::Static(base),
        "inner",
        "[p]",
        "c in Likes",
        Some("c.post_id == p.id"),
    ));
    assert_eq!(err, JoinError::DuplicateBinding { name: "c".into() });
}

#[test]
fn binding_list_longer_than_query() {
    let err = expect_err(join(
        BaseQuery::Static(posts_query()),
        "inner",
        "[p, c]",
        "l in Likes",
        Some("l.comment_id == c.id"),
    ));
    assert_eq!(
        err,
        JoinError::BindingOverflow {
            listed: 2,
            available: 1
        }
    );
}

#[test]
fn malformed_source() {
    let err = expect_err(join(
        BaseQuery::Static(posts_query()),
        "inner",
        "[p]",
        "comments",
        Some("true"),
    ));
    assert_eq!(
        err,
        JoinError::MalformedJoinExpression {
            expr: "comments".into()
        }
    );
}

#[test]
fn unbound_variable_in_condition() {
    let err = expect_err(join(
        BaseQuery::Static(posts_query()),
        "inner",
        "[p]",
        "c in Comments",
        Some("c.post_id == x.id"),
    ));
    assert!(matches!(err, JoinError::InvalidExpression { .. }));
}

#[test]
fn qualifier_checked_before_on_presence() {
    let err = expect_err(join(
        BaseQuery::Static(posts_query()),
        "cross",
        "[p]",
        "c in Comments",
        None,
    ));
    assert!(matches!(err, JoinError::InvalidQualifier { .. }));
}

#[test]
fn error_carries_clause_location() {
    let err = compile_join(
        BaseQuery::Static(posts_query()),
        "inner",
        &bindings("[p]"),
        &expr("c in Comments"),
        None,
        Location::new("blog.q", 7),
    )
    .unwrap_err();
    assert_eq!(err.location, Location::new("blog.q", 7));
    assert!(err.to_string().starts_with("blog.q:7: missing `on`"));
}
