pub mod ast;
mod bind_count;
mod checker;
mod compiler;
pub mod error;
pub mod escape;
pub mod explain;
pub mod ir;
pub mod parse_utils;
mod parser;
pub mod program;

pub use bind_count::{BindCount, resolve_bind_count};
pub use checker::{validate_bind_uniqueness, validate_on_presence, validate_qualifier};
pub use compiler::{compile_join, compile_query};
pub use error::{BuildError, BuildResult, JoinError};
pub use ir::count_bindings;
pub use parser::{parse_bindings, parse_expr, parse_query};
