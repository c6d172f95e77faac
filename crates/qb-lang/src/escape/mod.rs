//! Build-time escaping: surface syntax → IR fragments.

mod binding;
mod expr;
mod source;

pub use binding::{BindingScope, escape_binding};
pub use expr::{JoinBinding, escape_expression};
pub use source::{JoinSourceDesc, escape_dot, escape_source};

#[cfg(test)]
mod tests;
