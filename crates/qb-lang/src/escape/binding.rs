use crate::ast::{Expr, FieldRef};
use crate::error::JoinError;

/// Ordered binding names known to a clause. Position equals binding index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingScope {
    names: Vec<Option<String>>,
}

impl BindingScope {
    pub fn new(names: Vec<Option<String>>) -> Self {
        BindingScope { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_deref() == Some(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn names(&self) -> &[Option<String>] {
        &self.names
    }

    /// The scope seen by the next clause once a join binding is added.
    pub fn pushed(&self, name: Option<&str>) -> Self {
        let mut names = self.names.clone();
        names.push(name.map(String::from));
        BindingScope { names }
    }

    /// Back to the surface form, for feeding an accumulated scope into the
    /// next clause's binding list.
    pub fn to_exprs(&self) -> Vec<Expr> {
        self.names
            .iter()
            .map(|n| Expr::ident(n.as_deref().unwrap_or("_")))
            .collect()
    }
}

/// `_` and `_name` hold a position without binding a name.
pub(crate) fn is_placeholder(name: &str) -> bool {
    name.starts_with('_')
}

/// Parse a clause's binding list (`[p, _, c]`) into a [`BindingScope`].
pub fn escape_binding(raw: &[Expr]) -> Result<BindingScope, JoinError> {
    let mut names: Vec<Option<String>> = Vec::with_capacity(raw.len());
    for item in raw {
        let Expr::Field(FieldRef::Simple(name)) = item else {
            return Err(JoinError::MalformedBinding {
                expr: item.to_string(),
            });
        };
        if is_placeholder(name) {
            names.push(None);
            continue;
        }
        if names.iter().any(|n| n.as_deref() == Some(name.as_str())) {
            return Err(JoinError::DuplicateBinding { name: name.clone() });
        }
        names.push(Some(name.clone()));
    }
    Ok(BindingScope { names })
}
