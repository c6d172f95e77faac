use serde::Deserialize;

/// `[compile]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Default output of `qbc compile` when `--json` is not given.
    pub emit: EmitFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitFormat {
    /// Explain text.
    #[default]
    Text,
    Json,
}
