use std::fmt;

use crate::ast::{BinOp, Expr, FieldRef};
use crate::ir::{BindIndex, JoinNode, JoinSource, Literal, QueryExpr, QueryIr, SourceRef};
use crate::program::{BaseQuery, Instr, JoinOutput, RuntimeProgram};

// ---------------------------------------------------------------------------
// Surface expressions
// ---------------------------------------------------------------------------

pub fn format_expr(expr: &Expr) -> String {
    match expr {
        Expr::Number(n) => format_number(*n),
        Expr::StringLit(s) => format!("\"{}\"", s),
        Expr::Bool(b) => format!("{}", b),
        Expr::Field(fref) => format_field_ref(fref),
        Expr::Entity(path) => path.join("."),
        Expr::BinOp { op, left, right } => {
            format!(
                "{} {} {}",
                format_expr(left),
                format_binop(*op),
                format_expr(right)
            )
        }
        Expr::Neg(inner) => format!("-{}", format_expr(inner)),
        Expr::Not(inner) => format!("not {}", format_expr(inner)),
        Expr::FuncCall {
            qualifier,
            name,
            args,
        } => {
            let args_str = args.iter().map(format_expr).collect::<Vec<_>>().join(", ");
            match qualifier {
                Some(q) => format!("{}.{}({})", q, name, args_str),
                None => format!("{}({})", name, args_str),
            }
        }
        Expr::InList {
            expr: inner,
            list,
            negated,
        } => {
            let items = list.iter().map(format_expr).collect::<Vec<_>>().join(", ");
            let kw = if *negated { "not in" } else { "in" };
            format!("{} {} ({})", format_expr(inner), kw, items)
        }
        Expr::IfThenElse {
            cond,
            then_expr,
            else_expr,
        } => {
            format!(
                "if {} then {} else {}",
                format_expr(cond),
                format_expr(then_expr),
                format_expr(else_expr)
            )
        }
    }
}

pub fn format_field_ref(fref: &FieldRef) -> String {
    match fref {
        FieldRef::Simple(name) => name.clone(),
        FieldRef::Qualified(alias, field) => format!("{}.{}", alias, field),
        FieldRef::Bracketed(alias, key) => format!("{}[\"{}\"]", alias, key),
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

fn format_binop(op: BinOp) -> &'static str {
    match op {
        BinOp::And => "&&",
        BinOp::Or => "||",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::Le => "<=",
        BinOp::Ge => ">=",
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::In => "in",
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_expr(self))
    }
}

// ---------------------------------------------------------------------------
// Compiled expressions
// ---------------------------------------------------------------------------

/// Render a compiled expression; `name_of` turns binding references into
/// text (names when known, `&N` otherwise).
pub fn format_query_expr(expr: &QueryExpr, name_of: &dyn Fn(BindIndex) -> String) -> String {
    let sub = |e: &QueryExpr| format_query_expr(e, name_of);
    match expr {
        QueryExpr::Literal(Literal::Number(n)) => format_number(*n),
        QueryExpr::Literal(Literal::Str(s)) => format!("\"{}\"", s),
        QueryExpr::Literal(Literal::Bool(b)) => format!("{}", b),
        QueryExpr::Field { binding, field } => format!("{}.{}", name_of(*binding), field),
        QueryExpr::Binding(binding) => name_of(*binding),
        QueryExpr::BinOp { op, left, right } => {
            format!("{} {} {}", sub(left), format_binop(*op), sub(right))
        }
        QueryExpr::Neg(inner) => format!("-{}", sub(inner)),
        QueryExpr::Not(inner) => format!("not {}", sub(inner)),
        QueryExpr::Call {
            qualifier,
            name,
            args,
        } => {
            let args_str = args.iter().map(sub).collect::<Vec<_>>().join(", ");
            match qualifier {
                Some(q) => format!("{}.{}({})", q, name, args_str),
                None => format!("{}({})", name, args_str),
            }
        }
        QueryExpr::InList {
            expr,
            list,
            negated,
        } => {
            let items = list.iter().map(sub).collect::<Vec<_>>().join(", ");
            let kw = if *negated { "not in" } else { "in" };
            format!("{} {} ({})", sub(expr), kw, items)
        }
        QueryExpr::IfThenElse {
            cond,
            then_expr,
            else_expr,
        } => format!(
            "if {} then {} else {}",
            sub(cond),
            sub(then_expr),
            sub(else_expr)
        ),
    }
}

fn positional(idx: BindIndex) -> String {
    match idx {
        BindIndex::Fixed(i) => format!("&{i}"),
        BindIndex::Pending => "&?".to_string(),
    }
}

impl fmt::Display for QueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_query_expr(self, &positional))
    }
}

// ---------------------------------------------------------------------------
// Query IR
// ---------------------------------------------------------------------------

fn format_source(source: &SourceRef) -> String {
    match source {
        SourceRef::Entity(name) => name.clone(),
        SourceRef::Table(table) => format!("\"{}\"", table),
    }
}

/// `inner join c in Comments on c.post_id == p.id`
fn format_join(join: &JoinNode, names: &[Option<&str>]) -> String {
    let name_of = |idx: BindIndex| match idx {
        BindIndex::Fixed(i) => match names.get(i).copied().flatten() {
            Some(name) => name.to_string(),
            None => format!("&{i}"),
        },
        BindIndex::Pending => join.bind_name.clone().unwrap_or_else(|| "&?".to_string()),
    };
    let bind = join.bind_name.as_deref().unwrap_or("_");
    let mut out = match &join.source {
        JoinSource::Source(src) => {
            format!("{} join {} in {}", join.qualifier, bind, format_source(src))
        }
        JoinSource::Assoc { binding, field } => format!(
            "{} join {} in {}.{}",
            join.qualifier,
            bind,
            name_of(BindIndex::Fixed(*binding)),
            field
        ),
    };
    if let Some(on) = &join.on {
        out.push_str(" on ");
        out.push_str(&format_query_expr(&on.expr, &name_of));
    }
    out
}

impl fmt::Display for JoinNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_join(self, &[]))
    }
}

impl fmt::Display for QueryIr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.binding_names();
        write!(
            f,
            "from {} in {}",
            self.from.bind_name.as_deref().unwrap_or("_"),
            format_source(&self.from.source)
        )?;
        for join in &self.joins {
            write!(f, "\n{}", format_join(join, &names))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Runtime programs
// ---------------------------------------------------------------------------

impl fmt::Display for RuntimeProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.base {
            BaseQuery::Static(ir) => {
                for line in ir.to_string().lines() {
                    writeln!(f, "  const {line}")?;
                }
            }
            BaseQuery::Var(name) => writeln!(f, "  load ${name}")?,
            BaseQuery::Program(inner) => write!(f, "{inner}")?,
        }
        for instr in &self.instrs {
            match instr {
                Instr::ToQueryIr => writeln!(f, "  to_query_ir")?,
                Instr::CountBindings { listed, exact } => {
                    let rel = if *exact { "==" } else { ">=" };
                    writeln!(f, "  count_bindings ({rel} {listed})")?
                }
                Instr::CheckBindings { listed } => {
                    writeln!(f, "  check_bindings (>= {listed})")?
                }
                Instr::AppendJoin(join) => writeln!(f, "  append {join}")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for JoinOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinOutput::Static(ir) => write!(f, "{ir}"),
            JoinOutput::Deferred(program) => write!(f, "deferred:\n{program}"),
        }
    }
}
