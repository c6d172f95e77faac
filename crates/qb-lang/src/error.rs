use crate::ir::{Location, Qualifier};

/// Why a join clause failed to compile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum JoinError {
    #[error("malformed join `{expr}` in query expression")]
    MalformedJoinExpression { expr: String },
    #[error(
        "invalid join qualifier `{qualifier}`, accepted qualifiers are: {}",
        Qualifier::accepted()
    )]
    InvalidQualifier { qualifier: String },
    #[error("missing `on` in join; only association joins may omit the condition")]
    MissingOnClause,
    #[error("variable `{name}` is bound twice in the query")]
    DuplicateBinding { name: String },
    #[error("malformed binding `{expr}`, expected an identifier or `_`")]
    MalformedBinding { expr: String },
    #[error("invalid expression `{expr}` in join condition: {reason}")]
    InvalidExpression { expr: String, reason: String },
    #[error("binding list names {listed} bindings but the query only has {available}")]
    BindingOverflow { listed: usize, available: usize },
}

/// A [`JoinError`] tied to the clause that raised it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{location}: {kind}")]
pub struct BuildError {
    pub location: Location,
    pub kind: JoinError,
}

pub type BuildResult<T> = Result<T, BuildError>;
