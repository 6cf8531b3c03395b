//! # Body Schema
//!
//! The schema of a body: which attributes and nested blocks it accepts,
//! which language extensions are enabled inside it, and the reference hints
//! attached to it.
//!
//! ## Sharing
//!
//! Child schemas are held in `Arc`s. A schema tree is built once and shared
//! read-only by every walk and query; deriving a new body (e.g. the merged
//! body of a dependent lookup) clones only the top-level maps and replaces
//! individual children copy-on-write via `Arc::make_mut`. Nothing ever
//! writes through a shared `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::attribute::AttributeSchema;
use crate::block::BlockSchema;
use crate::error::{SchemaError, SchemaResult};
use crate::reference::{ImpliedOrigin, SchemaTarget, Targetable};

/// Language extensions that may be enabled for a body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyExtensions {
    /// `count` meta-argument and the `count.index` reference.
    pub count: bool,
    /// `for_each` meta-argument and the `each.*` references.
    pub for_each: bool,
    /// `dynamic "x" { content { ... } }` blocks.
    #[serde(alias = "dynamic-blocks")]
    pub dynamic_blocks: bool,
    /// `self.<attr>` references inside the body.
    #[serde(alias = "self-refs")]
    pub self_refs: bool,
}

/// A documentation link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocsLink {
    /// Target URL.
    pub url: String,
    /// Hover tooltip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

/// Schema of a body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodySchema {
    /// Attribute schemas by name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Arc<AttributeSchema>>,
    /// Block schemas by block type.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub blocks: BTreeMap<String, Arc<BlockSchema>>,
    /// Fallback for attributes not named in `attributes`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_attribute: Option<Arc<AttributeSchema>>,
    /// Enabled language extensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<BodyExtensions>,
    /// Additional addresses the enclosing block can be targeted as.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub targetable_as: Vec<Targetable>,
    /// Origins implied by attributes of this body.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub implied_origins: Vec<ImpliedOrigin>,
    /// Configuration unit this body points to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<SchemaTarget>,
    /// Documentation link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_link: Option<DocsLink>,
    /// Documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// One-line detail shown in completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl BodySchema {
    /// Parse a root body schema descriptor.
    ///
    /// `name` selects the format: a `.json` suffix is JSON, anything else
    /// is YAML.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Load` if the text does not parse into a body
    /// schema, including when a dependent-body key cannot be canonicalized.
    pub fn from_descriptor(name: &str, text: &str) -> SchemaResult<Self> {
        let parsed = if name.ends_with(".json") {
            serde_json::from_str(text).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(text).map_err(|e| e.to_string())
        };
        parsed.map_err(|reason| SchemaError::Load {
            name: name.to_string(),
            reason,
        })
    }

    /// Enabled extensions, all off when none are declared.
    pub fn extensions(&self) -> BodyExtensions {
        self.extensions.unwrap_or_default()
    }

    /// The schema for an attribute name: exact match, else the fallback.
    pub fn attribute_schema(&self, name: &str) -> Option<&Arc<AttributeSchema>> {
        self.attributes.get(name).or(self.any_attribute.as_ref())
    }

    /// The schema for a block type.
    pub fn block_schema(&self, block_type: &str) -> Option<&Arc<BlockSchema>> {
        self.blocks.get(block_type)
    }

    /// Whether any attribute is flagged as a dependency key.
    pub fn has_dependency_key_attributes(&self) -> bool {
        self.attributes.values().any(|a| a.is_dep_key)
    }

    /// Builder: add an attribute schema.
    pub fn with_attribute(mut self, name: impl Into<String>, schema: AttributeSchema) -> Self {
        self.attributes.insert(name.into(), Arc::new(schema));
        self
    }

    /// Builder: add a block schema.
    pub fn with_block(mut self, block_type: impl Into<String>, schema: BlockSchema) -> Self {
        self.blocks.insert(block_type.into(), Arc::new(schema));
        self
    }

    /// Builder: set extensions.
    pub fn with_extensions(mut self, extensions: BodyExtensions) -> Self {
        self.extensions = Some(extensions);
        self
    }
}
