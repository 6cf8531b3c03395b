//! # Dependency Keys and Schema Keys
//!
//! A block schema may carry body fragments that only apply when the block's
//! labels or attributes hold particular values. The values a fragment
//! depends on form a [`DependencyKeys`] set; its canonical serialization is
//! the [`SchemaKey`] under which the fragment is stored.
//!
//! ## Invariant
//!
//! Structurally equal key sets canonicalize to the same `SchemaKey`
//! regardless of the order in which labels and attributes were added.
//! Labels are sorted by index and attributes by name before serialization,
//! and the serialization itself goes through `CanonicalBytes` (sorted object
//! keys, compact separators).
//!
//! ```text
//! DependencyKeys { labels: [{index: 0, value: "theircloud"}] }
//!   → SchemaKey(r#"{"labels":[{"index":0,"value":"theircloud"}]}"#)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use confsem_core::{Address, CanonicalBytes, Value};

use crate::error::{SchemaError, SchemaResult};

/// A block label the fragment depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDependent {
    /// Zero-based label position.
    pub index: usize,
    /// Required label value.
    pub value: String,
}

/// An attribute the fragment depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDependent {
    /// Attribute name.
    pub name: String,
    /// Required attribute value.
    pub expr: ExpressionValue,
}

/// The value side of an attribute dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionValue {
    /// A static literal, e.g. `engine = "postgres"`.
    Static(Value),
    /// A resolved reference, e.g. `provider = aws.west`.
    Address(Address),
}

impl fmt::Display for ExpressionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionValue::Static(v) => write!(f, "{v}"),
            ExpressionValue::Address(a) => write!(f, "{a}"),
        }
    }
}

/// The label and attribute values a dependent body fragment is keyed on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyKeys {
    /// Label dependencies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LabelDependent>,
    /// Attribute dependencies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeDependent>,
}

impl DependencyKeys {
    /// Empty key set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label dependency.
    pub fn label(mut self, index: usize, value: impl Into<String>) -> Self {
        self.labels.push(LabelDependent {
            index,
            value: value.into(),
        });
        self
    }

    /// Add a static attribute dependency.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.push(AttributeDependent {
            name: name.into(),
            expr: ExpressionValue::Static(value.into()),
        });
        self
    }

    /// Add a reference attribute dependency.
    pub fn attribute_address(mut self, name: impl Into<String>, address: Address) -> Self {
        self.attributes.push(AttributeDependent {
            name: name.into(),
            expr: ExpressionValue::Address(address),
        });
        self
    }

    /// Whether no keys are present.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.attributes.is_empty()
    }

    /// A copy with labels sorted by index and attributes sorted by name.
    ///
    /// Ties are broken by value rendering so duplicate entries also land in
    /// a deterministic order.
    pub fn canonicalize(&self) -> Self {
        let mut labels = self.labels.clone();
        labels.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.value.cmp(&b.value)));

        let mut attributes = self.attributes.clone();
        attributes.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.expr.to_string().cmp(&b.expr.to_string()))
        });

        Self { labels, attributes }
    }
}

/// Canonical serialization of a [`DependencyKeys`] set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaKey(String);

impl SchemaKey {
    /// Canonicalize `keys` into a schema key.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::KeyEncoding` if a key value cannot be
    /// lowered to JSON.
    pub fn new(keys: &DependencyKeys) -> SchemaResult<Self> {
        let bytes = CanonicalBytes::new(&keys.canonicalize())?;
        Ok(Self(bytes.into_string()))
    }

    /// Decode the key back into its dependency key set.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::KeyDecoding` if the key is not valid JSON of
    /// the dependency key shape.
    pub fn dependency_keys(&self) -> SchemaResult<DependencyKeys> {
        serde_json::from_str(&self.0).map_err(|source| SchemaError::KeyDecoding {
            key: self.0.clone(),
            source,
        })
    }

    /// Access the serialized key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
