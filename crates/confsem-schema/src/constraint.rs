//! # Constraints
//!
//! Constraints describe what an attribute value may look like. Completion,
//! hover, and semantic-token renderers interpret them; this module only
//! fixes their shape and the generic contract every constraint satisfies:
//!
//! - [`Constraint::friendly_name`]: name shown to users.
//! - [`Constraint::constraint_type`]: the value type the constraint implies,
//!   used when typing reference targets.
//! - [`Constraint::origin_constraints`]: the reference constraints an
//!   expression under this constraint produces.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use confsem_core::{ScopeId, Type, Value};

use crate::attribute::AttributeSchema;
use crate::reference::OriginConstraint;

/// A value constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    /// A literal of the given type.
    LiteralType {
        /// Required type.
        of_type: Type,
    },
    /// Exactly this literal value.
    LiteralValue {
        /// The allowed value.
        value: Value,
    },
    /// A bare keyword, e.g. `create_before_destroy`.
    Keyword {
        /// The keyword.
        keyword: String,
        /// Display name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// `[ ... ]` with homogeneous elements.
    List {
        /// Element constraint; absent accepts anything.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        elem: Option<Box<Constraint>>,
        /// Minimum element count.
        #[serde(default)]
        min_items: u64,
        /// Maximum element count.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_items: Option<u64>,
    },
    /// `[ ... ]` with unique homogeneous elements.
    Set {
        /// Element constraint; absent accepts anything.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        elem: Option<Box<Constraint>>,
        /// Minimum element count.
        #[serde(default)]
        min_items: u64,
        /// Maximum element count.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_items: Option<u64>,
    },
    /// `{ key = value }` with homogeneous values.
    Map {
        /// Value constraint; absent accepts anything.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        elem: Option<Box<Constraint>>,
        /// Display name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// `{ key = value }` with a fixed set of attributes.
    Object {
        /// Attribute schemas by name.
        #[serde(default)]
        attributes: BTreeMap<String, Arc<AttributeSchema>>,
        /// Display name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// `[ a, b ]` with per-position constraints.
    Tuple {
        /// Element constraints by position.
        elems: Vec<Constraint>,
    },
    /// Any one of several constraints.
    OneOf {
        /// Alternatives.
        of: Vec<Constraint>,
    },
    /// Any expression (literal, reference, function call, ...) of a type.
    AnyExpression {
        /// Required type.
        of_type: Type,
    },
    /// A reference to a declared target.
    Reference {
        /// Required target type.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        of_type: Option<Type>,
        /// Required target scope.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        of_scope_id: Option<ScopeId>,
        /// Display name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// A type expression, e.g. `list(string)`.
    TypeDeclaration,
}

impl Constraint {
    /// Name shown in hover and completion detail.
    pub fn friendly_name(&self) -> String {
        match self {
            Constraint::LiteralType { of_type } | Constraint::AnyExpression { of_type } => {
                of_type.friendly_name()
            }
            Constraint::LiteralValue { value } => value.ty().friendly_name(),
            Constraint::Keyword { name, .. } => name.clone().unwrap_or_else(|| "keyword".into()),
            Constraint::List { elem, .. } => collection_name("list", elem.as_deref()),
            Constraint::Set { elem, .. } => collection_name("set", elem.as_deref()),
            Constraint::Map { elem, name } => name
                .clone()
                .unwrap_or_else(|| collection_name("map", elem.as_deref())),
            Constraint::Object { name, .. } => name.clone().unwrap_or_else(|| "object".into()),
            Constraint::Tuple { .. } => "tuple".into(),
            Constraint::OneOf { of } => {
                let mut names: Vec<String> = Vec::new();
                for c in of {
                    let n = c.friendly_name();
                    if !names.contains(&n) {
                        names.push(n);
                    }
                }
                names.join(" or ")
            }
            Constraint::Reference { name, .. } => name.clone().unwrap_or_else(|| "reference".into()),
            Constraint::TypeDeclaration => "type".into(),
        }
    }

    /// The value type implied by the constraint, if it implies one.
    pub fn constraint_type(&self) -> Option<Type> {
        match self {
            Constraint::LiteralType { of_type } | Constraint::AnyExpression { of_type } => {
                Some(of_type.clone())
            }
            Constraint::LiteralValue { value } => Some(value.ty()),
            Constraint::Keyword { .. } | Constraint::TypeDeclaration => None,
            Constraint::List { elem, .. } => Some(Type::list(elem_type(elem.as_deref()))),
            Constraint::Set { elem, .. } => Some(Type::set(elem_type(elem.as_deref()))),
            Constraint::Map { elem, .. } => Some(Type::map(elem_type(elem.as_deref()))),
            Constraint::Object { attributes, .. } => Some(Type::Object(
                attributes
                    .iter()
                    .map(|(name, attr)| (name.clone(), attr.value_type().unwrap_or(Type::Dynamic)))
                    .collect(),
            )),
            Constraint::Tuple { elems } => Some(Type::Tuple(
                elems
                    .iter()
                    .map(|c| c.constraint_type().unwrap_or(Type::Dynamic))
                    .collect(),
            )),
            Constraint::OneOf { of } => {
                let mut types = of.iter().filter_map(Constraint::constraint_type);
                let first = types.next()?;
                if types.all(|t| t == first) {
                    Some(first)
                } else {
                    Some(Type::Dynamic)
                }
            }
            Constraint::Reference { of_type, .. } => of_type.clone(),
        }
    }

    /// Reference constraints produced by a traversal under this constraint.
    ///
    /// Only constraints that accept references produce any; a traversal
    /// where a plain literal is expected yields no origin.
    pub fn origin_constraints(&self) -> Vec<OriginConstraint> {
        match self {
            Constraint::Reference {
                of_type,
                of_scope_id,
                ..
            } => vec![OriginConstraint {
                of_scope_id: of_scope_id.clone().unwrap_or_default(),
                of_type: of_type.clone(),
            }],
            Constraint::AnyExpression { of_type } => vec![OriginConstraint::of_type(of_type.clone())],
            Constraint::OneOf { of } => of.iter().flat_map(Constraint::origin_constraints).collect(),
            _ => Vec::new(),
        }
    }
}

fn collection_name(kind: &str, elem: Option<&Constraint>) -> String {
    match elem {
        Some(e) => format!("{kind} of {}", e.friendly_name()),
        None => kind.to_string(),
    }
}

fn elem_type(elem: Option<&Constraint>) -> Type {
    elem.and_then(Constraint::constraint_type).unwrap_or(Type::Dynamic)
}
