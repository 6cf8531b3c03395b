//! # Attribute and Label Schemas

use serde::{Deserialize, Serialize};

use confsem_core::{Type, Value};

use crate::address::AttributeAddrSchema;
use crate::constraint::Constraint;
use crate::reference::PathTarget;

/// Schema of a single `name = expr` attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeSchema {
    /// Documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The attribute must be present.
    pub is_required: bool,
    /// The attribute may be present.
    pub is_optional: bool,
    /// The attribute is deprecated.
    pub is_deprecated: bool,
    /// The value is computed by the platform if not set.
    pub is_computed: bool,
    /// The value must not be shown.
    pub is_sensitive: bool,
    /// Value constraint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Constraint>,
    /// Value assumed when the attribute is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// The attribute's value selects a dependent body fragment.
    pub is_dep_key: bool,
    /// How the attribute is addressable as a reference target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<AttributeAddrSchema>,
    /// A reference this attribute makes into another configuration unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_for_target: Option<PathTarget>,
}

impl AttributeSchema {
    /// An optional attribute with the given constraint.
    pub fn optional(constraint: Constraint) -> Self {
        Self {
            is_optional: true,
            constraint: Some(constraint),
            ..Default::default()
        }
    }

    /// A required attribute with the given constraint.
    pub fn required(constraint: Constraint) -> Self {
        Self {
            is_required: true,
            constraint: Some(constraint),
            ..Default::default()
        }
    }

    /// The value type implied by the constraint.
    pub fn value_type(&self) -> Option<Type> {
        self.constraint.as_ref().and_then(Constraint::constraint_type)
    }
}

/// Schema of a block label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSchema {
    /// Label name, e.g. `type` or `name`.
    pub name: String,
    /// Documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The label's value selects a dependent body fragment.
    pub is_dep_key: bool,
    /// The label's value can be completed.
    pub completable: bool,
}

impl LabelSchema {
    /// A plain label.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A label whose value is a dependency key.
    pub fn dep_key(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dep_key: true,
            completable: true,
            ..Default::default()
        }
    }
}
