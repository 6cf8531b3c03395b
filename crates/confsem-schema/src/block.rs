//! # Block Schema
//!
//! A block schema owns its static body plus a map of dependent body
//! fragments keyed by [`SchemaKey`]. Descriptors spell the map as a list of
//! `{keys, body}` entries; the keys are canonicalized on load.
//!
//! ```yaml
//! labels:
//!   - { name: type, is_dep_key: true }
//!   - { name: name }
//! body:
//!   attributes:
//!     alias: { constraint: { kind: literal_type, of_type: string } }
//! dependent_body:
//!   - keys: { labels: [{ index: 0, value: theircloud }] }
//!     body:
//!       attributes:
//!         bar: { constraint: { kind: literal_type, of_type: number } }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use confsem_core::Block;

use crate::address::BlockAddrSchema;
use crate::attribute::LabelSchema;
use crate::body::BodySchema;
use crate::dependency::{DependencyKeys, SchemaKey};
use crate::error::SchemaResult;
use crate::resolve::{resolve_body_schema, LookupResult};

/// Dependent body fragments by canonical key.
pub type DependentBodies = BTreeMap<SchemaKey, Arc<BodySchema>>;

/// Schema of a block type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockSchema {
    /// Label schemas in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LabelSchema>,
    /// How the block is addressable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<BlockAddrSchema>,
    /// Static body schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Arc<BodySchema>>,
    /// Body fragments selected by label or attribute values.
    #[serde(with = "dependent_entries", skip_serializing_if = "BTreeMap::is_empty")]
    pub dependent_body: DependentBodies,
    /// Documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The block type is deprecated.
    pub is_deprecated: bool,
    /// Minimum number of blocks of this type.
    pub min_items: u64,
    /// Maximum number of blocks of this type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
}

impl BlockSchema {
    /// A block schema with the given static body.
    pub fn with_body(body: BodySchema) -> Self {
        Self {
            body: Some(Arc::new(body)),
            ..Default::default()
        }
    }

    /// Builder: add a dependent body fragment under `keys`.
    ///
    /// # Errors
    ///
    /// Fails if `keys` cannot be canonicalized.
    pub fn with_dependent_body(mut self, keys: &DependencyKeys, body: BodySchema) -> SchemaResult<Self> {
        self.dependent_body.insert(SchemaKey::new(keys)?, Arc::new(body));
        Ok(self)
    }

    /// Number of labels flagged as dependency keys.
    pub fn dependency_key_label_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_dep_key).count()
    }

    /// Resolve the effective body schema for `block`.
    ///
    /// See [`resolve_body_schema`].
    pub fn resolve_body(&self, block: &Block) -> (Option<Arc<BodySchema>>, LookupResult) {
        resolve_body_schema(block, self)
    }
}

mod dependent_entries {
    use std::sync::Arc;

    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{BodySchema, DependencyKeys, DependentBodies, SchemaKey};

    #[derive(Serialize)]
    struct EntryRef<'a> {
        keys: DependencyKeys,
        body: &'a BodySchema,
    }

    #[derive(Deserialize)]
    struct Entry {
        keys: DependencyKeys,
        body: BodySchema,
    }

    pub fn serialize<S: Serializer>(map: &DependentBodies, serializer: S) -> Result<S::Ok, S::Error> {
        let mut entries = Vec::with_capacity(map.len());
        for (key, body) in map {
            let keys = key.dependency_keys().map_err(S::Error::custom)?;
            entries.push(EntryRef { keys, body });
        }
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DependentBodies, D::Error> {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        let mut map = DependentBodies::new();
        for entry in entries {
            let key = SchemaKey::new(&entry.keys).map_err(D::Error::custom)?;
            map.insert(key, Arc::new(entry.body));
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = r#"
labels:
  - { name: type, is_dep_key: true }
  - { name: name }
body:
  attributes:
    alias: { constraint: { kind: literal_type, of_type: string } }
dependent_body:
  - keys: { labels: [{ index: 0, value: theircloud }] }
    body:
      attributes:
        bar: { constraint: { kind: literal_type, of_type: number } }
"#;

    #[test]
    fn dependent_body_loads_with_canonical_keys() {
        let schema: BlockSchema = serde_yaml::from_str(DESCRIPTOR).unwrap();
        assert_eq!(schema.dependency_key_label_count(), 1);
        let key = SchemaKey::new(&DependencyKeys::new().label(0, "theircloud")).unwrap();
        let body = schema.dependent_body.get(&key).expect("fragment keyed canonically");
        assert!(body.attributes.contains_key("bar"));
    }

    #[test]
    fn dependent_body_serializes_as_entries() {
        let schema: BlockSchema = serde_yaml::from_str(DESCRIPTOR).unwrap();
        let json = serde_json::to_value(&schema).unwrap();
        let entries = json["dependent_body"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["keys"]["labels"][0]["value"], "theircloud");

        let back: BlockSchema = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn address_keys_with_brackets_survive_serialization() {
        let address = r#"lookup["eu]west"]"#.parse().unwrap();
        let schema = BlockSchema::with_body(BodySchema::default())
            .with_dependent_body(
                &DependencyKeys::new().attribute_address("region", address),
                BodySchema::default(),
            )
            .unwrap();
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json["dependent_body"][0]["keys"]["attributes"][0]["expr"]["address"],
            r#"lookup["eu]west"]"#
        );
        let back: BlockSchema = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
    }
}
