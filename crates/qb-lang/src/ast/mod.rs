mod expr;
mod query;

pub use expr::*;
pub use query::*;
