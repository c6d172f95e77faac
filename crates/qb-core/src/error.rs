use derive_more::From;
use orion_error::{ErrorCode, StructError, UvsReason};

#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum ExecReason {
    #[error("unbound runtime variable")]
    UnboundVar,
    #[error("value cannot be used as a query")]
    NotQueryable,
    #[error("binding list does not match the query")]
    BindingMismatch,
    #[error("malformed runtime program")]
    MalformedProgram,
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for ExecReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::UnboundVar => 3001,
            Self::NotQueryable => 3002,
            Self::BindingMismatch => 3003,
            Self::MalformedProgram => 3004,
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type ExecError = StructError<ExecReason>;
pub type ExecResult<T> = Result<T, ExecError>;
