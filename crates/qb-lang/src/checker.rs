use crate::ast::Expr;
use crate::error::JoinError;
use crate::escape::BindingScope;
use crate::ir::Qualifier;

/// Accept only `inner`, `left`, `right` and `full`.
pub fn validate_qualifier(qualifier: &str) -> Result<Qualifier, JoinError> {
    Qualifier::from_name(qualifier).ok_or_else(|| JoinError::InvalidQualifier {
        qualifier: qualifier.to_string(),
    })
}

/// Only association joins may leave out the `on` condition; their predicate
/// comes from relationship metadata.
pub fn validate_on_presence(on: Option<&Expr>, is_association: bool) -> Result<(), JoinError> {
    if on.is_none() && !is_association {
        return Err(JoinError::MissingOnClause);
    }
    Ok(())
}

pub fn validate_bind_uniqueness(
    new_bind: Option<&str>,
    known: &BindingScope,
) -> Result<(), JoinError> {
    match new_bind {
        Some(name) if known.contains(name) => Err(JoinError::DuplicateBinding {
            name: name.to_string(),
        }),
        _ => Ok(()),
    }
}
