//! Executes the runtime half of a compiled join.
//!
//! A [`RuntimeProgram`] evaluates its base, converts it with
//! [`to_query_ir`], optionally counts the bindings and appends the join.
//! Nested programs are run innermost first.

use orion_error::StructError;
use qb_lang::count_bindings;
use qb_lang::ir::QueryIr;
use qb_lang::program::{BaseQuery, Instr, JoinOutput, RuntimeProgram};

use crate::env::{Queryable, RuntimeEnv};
use crate::error::{ExecReason, ExecResult};

/// Convert a runtime value to the query IR the joins are spliced into.
pub fn to_query_ir(value: &dyn Queryable) -> ExecResult<QueryIr> {
    value.to_query_ir()
}

/// Final query of a compiled clause, running the program if there is one.
pub fn materialize(output: &JoinOutput, env: &dyn RuntimeEnv) -> ExecResult<QueryIr> {
    match output {
        JoinOutput::Static(ir) => Ok(ir.clone()),
        JoinOutput::Deferred(program) => {
            let ir = run_program(program, env)?;
            qb_info!(
                exec,
                depth = program.depth(),
                bindings = ir.count_bindings(),
                "deferred query materialised"
            );
            Ok(ir)
        }
    }
}

/// Evaluated base, before and after `to_query_ir`.
enum Stage<'a> {
    Value(&'a dyn Queryable),
    Query(QueryIr),
}

pub fn run_program(program: &RuntimeProgram, env: &dyn RuntimeEnv) -> ExecResult<QueryIr> {
    let mut stage = match &program.base {
        BaseQuery::Static(ir) => Stage::Query(ir.clone()),
        BaseQuery::Program(inner) => Stage::Query(run_program(inner, env)?),
        BaseQuery::Var(name) => match env.lookup(name) {
            Some(value) => {
                qb_debug!(exec, var = %name, "runtime variable resolved");
                Stage::Value(value)
            }
            None => {
                qb_warn!(exec, var = %name, "runtime variable not found");
                return StructError::from(ExecReason::UnboundVar)
                    .with_detail(format!("`${name}` is not defined"))
                    .err();
            }
        },
    };

    let mut counted: Option<usize> = None;
    for instr in &program.instrs {
        match instr {
            Instr::ToQueryIr => {
                if let Stage::Value(value) = stage {
                    stage = Stage::Query(to_query_ir(value)?);
                }
            }
            Instr::CountBindings { listed, exact } => {
                let ir = converted(&stage, instr)?;
                let count = count_bindings(ir);
                let fits = if *exact {
                    *listed == count
                } else {
                    *listed <= count
                };
                if !fits {
                    return StructError::from(ExecReason::BindingMismatch)
                        .with_detail(format!(
                            "binding list names {listed} bindings but the query has {count}"
                        ))
                        .err();
                }
                qb_trace!(exec, count, listed = *listed, "bindings counted");
                counted = Some(count);
            }
            Instr::CheckBindings { listed } => {
                let count = count_bindings(converted(&stage, instr)?);
                if *listed > count {
                    return StructError::from(ExecReason::BindingMismatch)
                        .with_detail(format!(
                            "binding list names {listed} bindings but the query has {count}"
                        ))
                        .err();
                }
            }
            Instr::AppendJoin(node) => {
                let Stage::Query(ir) = &mut stage else {
                    return malformed(instr);
                };
                let mut node = node.clone();
                if node.has_pending() {
                    let Some(index) = counted else {
                        return StructError::from(ExecReason::MalformedProgram)
                            .with_detail(format!(
                                "join at {} references its binding before it was counted",
                                node.location
                            ))
                            .err();
                    };
                    node.resolve_pending(index);
                }
                qb_trace!(exec, location = %node.location, "join appended");
                ir.append_join(node);
                counted = None;
            }
        }
    }

    match stage {
        Stage::Query(ir) => Ok(ir),
        Stage::Value(_) => StructError::from(ExecReason::MalformedProgram)
            .with_detail("program never converted its base")
            .err(),
    }
}

fn converted<'s>(stage: &'s Stage<'_>, instr: &Instr) -> ExecResult<&'s QueryIr> {
    match stage {
        Stage::Query(ir) => Ok(ir),
        Stage::Value(_) => malformed(instr),
    }
}

fn malformed<T>(instr: &Instr) -> ExecResult<T> {
    StructError::from(ExecReason::MalformedProgram)
        .with_detail(format!("{instr:?} before to_query_ir"))
        .err()
}
