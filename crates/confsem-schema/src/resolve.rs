//! # Dependent Schema Resolution
//!
//! Computes the effective body schema of a block: the static body merged
//! with the dependent fragment selected by the block's label and attribute
//! values, then extended with the virtual `dynamic` block type when enabled.
//!
//! ```text
//! resource "theircloud" "x" { ... }
//!   labels[0] = "theircloud"           (dependency-key label)
//!   → SchemaKey {"labels":[{"index":0,"value":"theircloud"}]}
//!   → static body ∪ dependent_body[key]
//! ```
//!
//! ## Merge Rule
//!
//! Static attribute and block definitions always win on name collision.
//! `targetable_as` and `implied_origins` are appended. `targets`,
//! `docs_link`, `extensions`, `description` and `detail` come from the
//! fragment when it sets them.
//!
//! ## Nested Fragments
//!
//! A fragment may itself declare dependency-key attributes. Resolution then
//! continues with those attributes (and the block's dependency-key labels)
//! for at most [`MAX_NESTED_DEPENDENT_DEPTH`] extra levels. A nested miss
//! keeps the first-level body and degrades the result to
//! [`LookupResult::LookupPartiallySuccessful`]. A nested key already seen in
//! this chain counts as a miss.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use confsem_core::{Block, Expression};

use crate::block::BlockSchema;
use crate::body::BodySchema;
use crate::dependency::{DependencyKeys, SchemaKey};
use crate::dynamic::with_dynamic_blocks;

/// Levels of nested dependent fragments resolved below the first.
pub const MAX_NESTED_DEPENDENT_DEPTH: usize = 1;

/// Outcome of a dependent schema lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupResult {
    /// The block has no dependency keys; the static body applies.
    NoDependentKeys,
    /// A fragment was found and merged, including any nested fragment.
    LookupSuccessful,
    /// The first-level fragment was merged but a nested one was not found.
    LookupPartiallySuccessful,
    /// No fragment matches the block's keys.
    LookupFailed,
}

impl LookupResult {
    /// Whether the schema of the block's subtree is not fully known.
    pub fn is_schema_unknown(&self) -> bool {
        matches!(
            self,
            LookupResult::LookupFailed | LookupResult::LookupPartiallySuccessful
        )
    }
}

/// Resolve the effective body schema of `block` under `schema`.
///
/// Returns `(None, LookupFailed)` when the block has fewer labels than the
/// schema's dependency-key labels require, when the keys cannot be
/// serialized, or when no fragment is stored under them. A block schema
/// without a static body resolves to `(None, NoDependentKeys)`.
pub fn resolve_body_schema(
    block: &Block,
    schema: &BlockSchema,
) -> (Option<Arc<BodySchema>>, LookupResult) {
    let Some(static_body) = schema.body.as_ref() else {
        return (None, LookupResult::NoDependentKeys);
    };

    let Some(keys) = dependency_keys(block, schema, static_body) else {
        debug!(
            block_type = %block.block_type,
            labels = block.labels.len(),
            "block has fewer labels than its dependency keys require"
        );
        return (None, LookupResult::LookupFailed);
    };
    if keys.is_empty() {
        return (
            Some(with_dynamic_blocks(Arc::clone(static_body))),
            LookupResult::NoDependentKeys,
        );
    }

    let Some(key) = schema_key(block, &keys) else {
        return (None, LookupResult::LookupFailed);
    };
    let Some(fragment) = schema.dependent_body.get(&key) else {
        debug!(block_type = %block.block_type, key = %key, "no dependent body for key");
        return (None, LookupResult::LookupFailed);
    };

    let mut seen = vec![key];
    let (fragment, result) = nested_fragment(block, schema, Arc::clone(fragment), &mut seen, 1);
    let merged = Arc::new(merge_bodies(static_body, &fragment));
    (Some(with_dynamic_blocks(merged)), result)
}

/// Follow dependency-key attributes declared by `fragment`.
///
/// Returns the fragment merged with whatever nested fragments were found.
fn nested_fragment(
    block: &Block,
    schema: &BlockSchema,
    fragment: Arc<BodySchema>,
    seen: &mut Vec<SchemaKey>,
    depth: usize,
) -> (Arc<BodySchema>, LookupResult) {
    if !fragment.has_dependency_key_attributes() {
        return (fragment, LookupResult::LookupSuccessful);
    }
    if depth > MAX_NESTED_DEPENDENT_DEPTH {
        trace!(block_type = %block.block_type, depth, "nested dependent depth reached");
        return (fragment, LookupResult::LookupSuccessful);
    }

    let key = dependency_keys(block, schema, &fragment)
        .filter(|keys| !keys.is_empty())
        .and_then(|keys| schema_key(block, &keys));
    let Some(key) = key else {
        return (fragment, LookupResult::LookupPartiallySuccessful);
    };
    if seen.contains(&key) {
        debug!(block_type = %block.block_type, key = %key, "nested dependent key repeats");
        return (fragment, LookupResult::LookupPartiallySuccessful);
    }
    let Some(next) = schema.dependent_body.get(&key) else {
        debug!(block_type = %block.block_type, key = %key, "no nested dependent body for key");
        return (fragment, LookupResult::LookupPartiallySuccessful);
    };

    seen.push(key);
    let (next, result) = nested_fragment(block, schema, Arc::clone(next), seen, depth + 1);
    (Arc::new(merge_bodies(&fragment, &next)), result)
}

/// Collect the dependency keys of `block`.
///
/// Labels come from the block schema, attributes from `body`. Returns `None`
/// if a dependency-key label index is out of range for the block.
fn dependency_keys(block: &Block, schema: &BlockSchema, body: &BodySchema) -> Option<DependencyKeys> {
    let mut keys = DependencyKeys::new();

    for (index, label) in schema.labels.iter().enumerate() {
        if !label.is_dep_key {
            continue;
        }
        let value = block.labels.get(index)?;
        keys = keys.label(index, value.as_str());
    }

    for (name, attr_schema) in &body.attributes {
        if !attr_schema.is_dep_key {
            continue;
        }
        match block.body.attribute(name).map(|a| &a.expr) {
            Some(Expression::Literal { value, .. }) => {
                keys = keys.attribute(name.as_str(), value.clone());
            }
            Some(Expression::Traversal(traversal)) => match traversal.to_address() {
                Ok(address) => keys = keys.attribute_address(name.as_str(), address),
                Err(err) => {
                    trace!(attribute = %name, error = %err, "skipping unaddressable dependency key");
                }
            },
            Some(Expression::Complex { .. }) => {
                trace!(attribute = %name, "skipping complex dependency key expression");
            }
            None => {
                if let Some(default) = &attr_schema.default_value {
                    keys = keys.attribute(name.as_str(), default.clone());
                }
            }
        }
    }

    Some(keys)
}

fn schema_key(block: &Block, keys: &DependencyKeys) -> Option<SchemaKey> {
    match SchemaKey::new(keys) {
        Ok(key) => Some(key),
        Err(err) => {
            warn!(block_type = %block.block_type, error = %err, "malformed dependency keys");
            None
        }
    }
}

/// Merge a dependent fragment into `base`.
///
/// The result shares every child schema with its inputs.
pub fn merge_bodies(base: &BodySchema, fragment: &BodySchema) -> BodySchema {
    let mut merged = base.clone();

    for (name, attr) in &fragment.attributes {
        merged
            .attributes
            .entry(name.clone())
            .or_insert_with(|| Arc::clone(attr));
    }
    for (name, block) in &fragment.blocks {
        merged
            .blocks
            .entry(name.clone())
            .or_insert_with(|| Arc::clone(block));
    }
    if merged.any_attribute.is_none() {
        merged.any_attribute = fragment.any_attribute.clone();
    }

    merged.targetable_as.extend(fragment.targetable_as.iter().cloned());
    merged
        .implied_origins
        .extend(fragment.implied_origins.iter().cloned());

    if fragment.targets.is_some() {
        merged.targets = fragment.targets.clone();
    }
    if fragment.docs_link.is_some() {
        merged.docs_link = fragment.docs_link.clone();
    }
    if fragment.extensions.is_some() {
        merged.extensions = fragment.extensions;
    }
    if fragment.description.is_some() {
        merged.description = fragment.description.clone();
    }
    if fragment.detail.is_some() {
        merged.detail = fragment.detail.clone();
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttributeSchema, LabelSchema};
    use crate::constraint::Constraint;
    use crate::reference::Targetable;
    use confsem_core::{Address, Attribute, Body, Range, Traversal, TraverseStep, Type, Value};

    fn string_attr() -> AttributeSchema {
        AttributeSchema::optional(Constraint::LiteralType { of_type: Type::String })
    }

    fn block(labels: &[&str], attrs: Vec<(&str, Expression)>) -> Block {
        Block {
            block_type: "resource".into(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            label_ranges: vec![],
            body: Body {
                attributes: attrs
                    .into_iter()
                    .map(|(name, expr)| Attribute {
                        name: name.into(),
                        expr,
                        range: Range::default(),
                        name_range: Range::default(),
                    })
                    .collect(),
                ..Default::default()
            },
            def_range: Range::default(),
            range: Range::default(),
        }
    }

    fn literal(v: impl Into<Value>) -> Expression {
        Expression::Literal {
            value: v.into(),
            range: Range::default(),
        }
    }

    fn labelled_schema() -> BlockSchema {
        BlockSchema {
            labels: vec![LabelSchema::dep_key("type"), LabelSchema::new("name")],
            ..BlockSchema::with_body(BodySchema::default().with_attribute("alias", string_attr()))
        }
    }

    #[test]
    fn no_keys_returns_static_body() {
        let schema = BlockSchema::with_body(BodySchema::default().with_attribute("alias", string_attr()));
        let (body, result) = resolve_body_schema(&block(&["a"], vec![]), &schema);
        assert_eq!(result, LookupResult::NoDependentKeys);
        assert!(Arc::ptr_eq(&body.unwrap(), schema.body.as_ref().unwrap()));
    }

    #[test]
    fn missing_static_body() {
        let (body, result) = resolve_body_schema(&block(&[], vec![]), &BlockSchema::default());
        assert!(body.is_none());
        assert_eq!(result, LookupResult::NoDependentKeys);
    }

    #[test]
    fn static_definitions_win() {
        let schema = labelled_schema()
            .with_dependent_body(
                &DependencyKeys::new().label(0, "x"),
                BodySchema::default()
                    .with_attribute("alias", AttributeSchema::required(Constraint::TypeDeclaration))
                    .with_attribute("extra", string_attr()),
            )
            .unwrap();
        let (body, result) = resolve_body_schema(&block(&["x", "n"], vec![]), &schema);
        let body = body.unwrap();
        assert_eq!(result, LookupResult::LookupSuccessful);
        assert!(body.attributes["alias"].is_optional);
        assert!(body.attributes.contains_key("extra"));
    }

    #[test]
    fn targetable_as_is_appended() {
        let targetable = |name: &str| Targetable {
            address: Address::root(name),
            scope_id: Default::default(),
            as_type: None,
            friendly_name: None,
            description: None,
        };
        let mut base = BodySchema::default();
        base.targetable_as.push(targetable("a"));
        let mut fragment = BodySchema::default();
        fragment.targetable_as.push(targetable("b"));
        fragment.description = Some("fragment".into());

        let merged = merge_bodies(&base, &fragment);
        assert_eq!(merged.targetable_as.len(), 2);
        assert_eq!(merged.description.as_deref(), Some("fragment"));
    }

    #[test]
    fn attribute_key_from_literal_traversal_and_default() {
        let mut static_body = BodySchema::default();
        static_body.attributes.insert(
            "engine".into(),
            Arc::new(AttributeSchema {
                is_dep_key: true,
                ..string_attr()
            }),
        );
        static_body.attributes.insert(
            "provider".into(),
            Arc::new(AttributeSchema {
                is_dep_key: true,
                ..string_attr()
            }),
        );
        static_body.attributes.insert(
            "mode".into(),
            Arc::new(AttributeSchema {
                is_dep_key: true,
                default_value: Some(Value::string("fast")),
                ..string_attr()
            }),
        );
        let schema = BlockSchema::with_body(static_body)
            .with_dependent_body(
                &DependencyKeys::new()
                    .attribute("engine", "postgres")
                    .attribute_address("provider", "aws.west".parse().unwrap())
                    .attribute("mode", "fast"),
                BodySchema::default().with_attribute("port", string_attr()),
            )
            .unwrap();

        let provider = Expression::Traversal(Traversal::new(
            vec![TraverseStep::Root("aws".into()), TraverseStep::Attr("west".into())],
            Range::default(),
        ));
        let b = block(&[], vec![("engine", literal("postgres")), ("provider", provider)]);
        let (body, result) = resolve_body_schema(&b, &schema);
        assert_eq!(result, LookupResult::LookupSuccessful);
        assert!(body.unwrap().attributes.contains_key("port"));
    }

    #[test]
    fn unaddressable_traversal_is_skipped() {
        let mut static_body = BodySchema::default();
        static_body.attributes.insert(
            "provider".into(),
            Arc::new(AttributeSchema {
                is_dep_key: true,
                ..string_attr()
            }),
        );
        let schema = BlockSchema::with_body(static_body);
        let splat = Expression::Traversal(Traversal::new(
            vec![TraverseStep::Root("aws".into()), TraverseStep::Splat],
            Range::default(),
        ));
        let (body, result) = resolve_body_schema(&block(&[], vec![("provider", splat)]), &schema);
        assert_eq!(result, LookupResult::NoDependentKeys);
        assert!(body.is_some());
    }

    #[test]
    fn fractional_key_selects_fragment() {
        let mut static_body = BodySchema::default();
        static_body.attributes.insert(
            "ratio".into(),
            Arc::new(AttributeSchema {
                is_dep_key: true,
                ..Default::default()
            }),
        );
        let schema = BlockSchema::with_body(static_body)
            .with_dependent_body(
                &DependencyKeys::new().attribute("ratio", 1.5),
                BodySchema::default().with_attribute("scaled", string_attr()),
            )
            .unwrap();

        let (body, result) = resolve_body_schema(&block(&[], vec![("ratio", literal(1.5))]), &schema);
        assert_eq!(result, LookupResult::LookupSuccessful);
        assert!(body.unwrap().attributes.contains_key("scaled"));

        let (body, result) = resolve_body_schema(&block(&[], vec![("ratio", literal(2.5))]), &schema);
        assert_eq!(result, LookupResult::LookupFailed);
        assert!(body.is_none());
    }

    #[test]
    fn lookup_result_unknown_schema() {
        assert!(LookupResult::LookupFailed.is_schema_unknown());
        assert!(LookupResult::LookupPartiallySuccessful.is_schema_unknown());
        assert!(!LookupResult::LookupSuccessful.is_schema_unknown());
        assert!(!LookupResult::NoDependentKeys.is_schema_unknown());
    }
}
