use crate::ast::Expr;
use crate::error::{BuildResult, JoinError};
use crate::ir::{Location, QueryIr, SourceRef};
use crate::program::{BaseQuery, JoinOutput};
use crate::{compile_join, compile_query, parse_bindings, parse_expr, parse_query};

mod scenarios;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `from p in Posts`, nothing joined yet.
fn posts_query() -> QueryIr {
    QueryIr::from_source(SourceRef::Entity("Posts".into()), Some("p".into()))
}

fn loc(line: u32) -> Location {
    Location::new("test.q", line)
}

fn expr(src: &str) -> Expr {
    parse_expr(src).expect("expression should parse")
}

fn bindings(src: &str) -> Vec<Expr> {
    parse_bindings(src).expect("binding list should parse")
}

/// Compile one join clause given in surface syntax.
fn join(
    base: BaseQuery,
    qualifier: &str,
    listed: &str,
    source: &str,
    on: Option<&str>,
) -> BuildResult<JoinOutput> {
    let on = on.map(expr);
    compile_join(
        base,
        qualifier,
        &bindings(listed),
        &expr(source),
        on.as_ref(),
        loc(1),
    )
}

fn compile_src(src: &str) -> BuildResult<JoinOutput> {
    let doc = parse_query(src).expect("query should parse");
    compile_query(&doc, "test.q")
}

fn expect_static(out: JoinOutput) -> QueryIr {
    match out {
        JoinOutput::Static(ir) => ir,
        other => panic!("expected static output, got {other:?}"),
    }
}

fn expect_err(result: BuildResult<JoinOutput>) -> JoinError {
    match result {
        Err(e) => e.kind,
        Ok(out) => panic!("expected error, got {out:?}"),
    }
}
