use serde::Deserialize;

/// One `[vars]` entry: what a `$name` query base resolves to at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarSource {
    /// `{ entity = "Blog.Post" }`
    Entity(String),
    /// `{ table = "audit_log" }`
    Table(String),
}

/// Resolved variable, sorted by name in [`QbConfig`](crate::QbConfig).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarConfig {
    pub name: String,
    pub source: VarSource,
}

impl VarConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let is_ident = self
            .name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !is_ident {
            anyhow::bail!("vars: `{}` is not a valid variable name", self.name);
        }
        let (kind, value) = match &self.source {
            VarSource::Entity(e) => ("entity", e),
            VarSource::Table(t) => ("table", t),
        };
        if value.trim().is_empty() {
            anyhow::bail!("vars.{}: {kind} must not be empty", self.name);
        }
        if let VarSource::Entity(path) = &self.source
            && path.split('.').any(|seg| !seg.starts_with(|c: char| c.is_ascii_uppercase()))
        {
            anyhow::bail!(
                "vars.{}: entity `{path}` must be a capitalised alias path",
                self.name
            );
        }
        Ok(())
    }
}
