#[macro_use]
mod log_macros;

pub mod env;
pub mod error;
pub mod exec;

pub use env::{Queryable, RuntimeEnv, RuntimeValue, VarTable};
pub use error::{ExecError, ExecReason, ExecResult};
pub use exec::{materialize, run_program, to_query_ir};
