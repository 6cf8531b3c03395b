//! # Walk Context
//!
//! State the walker threads down the tree. A context is never modified in
//! place: each `with_*` method returns an extended copy for the next level,
//! so a visitor holding `&WalkContext` sees exactly the state of its node.

use std::collections::BTreeMap;
use std::sync::Arc;

use confsem_schema::BodySchema;

/// Child block counts of one body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockTallies {
    /// Blocks by block type, `dynamic` included.
    pub by_type: BTreeMap<String, u64>,
    /// `dynamic` blocks by the block type they generate (label 0).
    pub dynamic_by_label: BTreeMap<String, u64>,
}

impl BlockTallies {
    /// Number of blocks of `block_type`.
    pub fn count(&self, block_type: &str) -> u64 {
        self.by_type.get(block_type).copied().unwrap_or(0)
    }

    /// Number of `dynamic` blocks generating `block_type`.
    pub fn dynamic_count(&self, block_type: &str) -> u64 {
        self.dynamic_by_label.get(block_type).copied().unwrap_or(0)
    }

    pub(crate) fn record(&mut self, block_type: &str, first_label: Option<&str>) {
        *self.by_type.entry(block_type.to_string()).or_default() += 1;
        if block_type == confsem_schema::dynamic::DYNAMIC {
            if let Some(label) = first_label {
                *self.dynamic_by_label.entry(label.to_string()).or_default() += 1;
            }
        }
    }
}

/// Immutable per-node walk state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkContext {
    nesting_level: usize,
    unknown_schema: bool,
    tallies: Option<BlockTallies>,
    block_body: Option<Arc<BodySchema>>,
}

impl WalkContext {
    /// Root context: level 0, schema known, no tallies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of block bodies entered above this node.
    pub fn nesting_level(&self) -> usize {
        self.nesting_level
    }

    /// Whether a dependent schema lookup above this node did not fully
    /// succeed.
    pub fn is_unknown_schema(&self) -> bool {
        self.unknown_schema
    }

    /// Child block tallies; only set when visiting a body.
    pub fn tallies(&self) -> Option<&BlockTallies> {
        self.tallies.as_ref()
    }

    /// Effective body schema of the block being visited, dependent
    /// fragments merged in. Only set when visiting a block whose lookup
    /// produced a body.
    pub fn block_body(&self) -> Option<&Arc<BodySchema>> {
        self.block_body.as_ref()
    }

    pub(crate) fn nested(&self) -> Self {
        Self {
            nesting_level: self.nesting_level + 1,
            unknown_schema: self.unknown_schema,
            tallies: None,
            block_body: None,
        }
    }

    pub(crate) fn with_block_body(&self, body: Option<Arc<BodySchema>>) -> Self {
        Self {
            block_body: body,
            ..self.clone()
        }
    }

    pub(crate) fn with_unknown_schema(&self) -> Self {
        Self {
            unknown_schema: true,
            ..self.clone()
        }
    }

    pub(crate) fn with_tallies(&self, tallies: BlockTallies) -> Self {
        Self {
            tallies: Some(tallies),
            ..self.clone()
        }
    }

    pub(crate) fn without_tallies(&self) -> Self {
        Self {
            tallies: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_does_not_touch_parent() {
        let root = WalkContext::new();
        let child = root.nested().with_unknown_schema();
        assert_eq!(root.nesting_level(), 0);
        assert!(!root.is_unknown_schema());
        assert_eq!(child.nesting_level(), 1);
        assert!(child.is_unknown_schema());
        assert_eq!(child.nested().nesting_level(), 2);
        assert!(child.nested().is_unknown_schema());
    }

    #[test]
    fn block_body_does_not_leak_into_nested_levels() {
        let root = WalkContext::new();
        let at_block = root.with_block_body(Some(Arc::new(BodySchema::default())));
        assert!(root.block_body().is_none());
        assert!(at_block.block_body().is_some());
        assert!(at_block.nested().block_body().is_none());
    }

    #[test]
    fn tallies_count_dynamic_labels() {
        let mut tallies = BlockTallies::default();
        tallies.record("widget", Some("a"));
        tallies.record("dynamic", Some("widget"));
        tallies.record("dynamic", Some("widget"));
        tallies.record("dynamic", None);
        assert_eq!(tallies.count("widget"), 1);
        assert_eq!(tallies.count("dynamic"), 3);
        assert_eq!(tallies.dynamic_count("widget"), 2);
        assert_eq!(tallies.dynamic_count("gadget"), 0);
    }
}
