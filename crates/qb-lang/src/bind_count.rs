use crate::ir::{BindIndex, QueryIr};

/// Number of bindings already in the base query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindCount {
    /// Counted while compiling.
    Static(usize),
    /// Counted by the runtime program before the join is appended.
    Deferred,
}

impl BindCount {
    /// Index the joining binding will occupy.
    pub fn join_index(self) -> BindIndex {
        match self {
            BindCount::Static(n) => BindIndex::Fixed(n),
            BindCount::Deferred => BindIndex::Pending,
        }
    }
}

/// Decide when the bind count of the base query is known.
///
/// A known base is counted now regardless of `needs_count`. Otherwise a pure
/// association join (no condition referencing the new binding) skips the
/// count entirely.
pub fn resolve_bind_count(static_base: Option<&QueryIr>, needs_count: bool) -> Option<BindCount> {
    match static_base {
        Some(ir) => Some(BindCount::Static(ir.count_bindings())),
        None if !needs_count => None,
        None => Some(BindCount::Deferred),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::SourceRef;

    #[test]
    fn static_base_is_counted_now() {
        let ir = QueryIr::from_source(SourceRef::Entity("Posts".into()), Some("p".into()));
        assert_eq!(resolve_bind_count(Some(&ir), true), Some(BindCount::Static(1)));
        assert_eq!(resolve_bind_count(Some(&ir), false), Some(BindCount::Static(1)));
    }

    #[test]
    fn runtime_base_defers_or_skips() {
        assert_eq!(resolve_bind_count(None, true), Some(BindCount::Deferred));
        assert_eq!(resolve_bind_count(None, false), None);
    }

    #[test]
    fn join_index() {
        assert_eq!(BindCount::Static(3).join_index(), BindIndex::Fixed(3));
        assert_eq!(BindCount::Deferred.join_index(), BindIndex::Pending);
    }
}
