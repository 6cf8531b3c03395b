//! # Reference Hints in Schemas
//!
//! Schema-side declarations that drive reference extraction: what a body can
//! be targeted as, which origins its attributes imply, and which other
//! configuration unit it points into.

use serde::{Deserialize, Serialize};

use confsem_core::{Address, Path, Range, ScopeId, Type};

/// One acceptable (scope, type) pair for an origin.
///
/// An empty `of_scope_id` accepts targets of any scope. An absent `of_type`
/// is only meaningful for type-unaware targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginConstraint {
    /// Required target scope; empty means any.
    #[serde(default, skip_serializing_if = "ScopeId::is_empty")]
    pub of_scope_id: ScopeId,
    /// Required target type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub of_type: Option<Type>,
}

impl OriginConstraint {
    /// Constraint on type only.
    pub fn of_type(ty: Type) -> Self {
        Self {
            of_scope_id: ScopeId::default(),
            of_type: Some(ty),
        }
    }

    /// Constraint on scope and type.
    pub fn scoped(scope: impl Into<ScopeId>, ty: Option<Type>) -> Self {
        Self {
            of_scope_id: scope.into(),
            of_type: ty,
        }
    }
}

/// An additional address under which a body's block can be targeted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targetable {
    /// Address of the target.
    pub address: Address,
    /// Scope the target belongs to.
    #[serde(default)]
    pub scope_id: ScopeId,
    /// Type of the target; absent makes it type-unaware.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_type: Option<Type>,
    /// Name shown in hover.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    /// Documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An origin implied by the presence of an attribute in a body that points
/// into another configuration unit, e.g. a module input `region = ...`
/// implying a reference to `var.region` inside the module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpliedOrigin {
    /// Attribute whose presence implies the origin.
    pub attribute: String,
    /// Address referred to inside the other unit.
    pub origin_address: Address,
    /// Constraints of the implied origin.
    #[serde(default)]
    pub constraints: Vec<OriginConstraint>,
}

/// Where a body points to in another configuration unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaTarget {
    /// The other unit.
    pub path: Path,
    /// Range inside that unit to navigate to.
    #[serde(default)]
    pub range: Range,
}

/// A reference an attribute makes into another configuration unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathTarget {
    /// Address inside the other unit.
    pub address: Address,
    /// The other unit.
    pub path: Path,
    /// Constraints of the resulting origin.
    #[serde(default)]
    pub constraints: Vec<OriginConstraint>,
}
