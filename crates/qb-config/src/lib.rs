pub mod compile;
pub mod config;
pub mod logging;
pub mod vars;

pub use compile::{CompileConfig, EmitFormat};
pub use config::QbConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use vars::{VarConfig, VarSource};
