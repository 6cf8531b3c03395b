//! # Structural Value Types
//!
//! The value-type system of the configuration language: primitives, the
//! collection types (list, set, map), the structural types (object, tuple),
//! and the wildcard `Dynamic` type meaning "any / not yet known".
//!
//! ## Conversion
//!
//! [`Type::is_convertible_to`] is the type-conformance predicate used by the
//! reference engine. It answers whether *some* conversion from one type to
//! another exists, safe or lossy. `Dynamic` converts to and from anything.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    /// Wildcard type, convertible to and from every other type.
    Dynamic,
    /// UTF-8 string.
    String,
    /// Arbitrary precision number.
    Number,
    /// Boolean.
    Bool,
    /// Ordered sequence of a single element type.
    List(Box<Type>),
    /// Unordered unique collection of a single element type.
    Set(Box<Type>),
    /// String-keyed collection of a single element type.
    Map(Box<Type>),
    /// Fixed set of named attributes, each with its own type.
    Object(BTreeMap<String, Type>),
    /// Fixed-length sequence, each element with its own type.
    Tuple(Vec<Type>),
}

impl Type {
    /// `list(elem)`.
    pub fn list(elem: Type) -> Self {
        Type::List(Box::new(elem))
    }

    /// `set(elem)`.
    pub fn set(elem: Type) -> Self {
        Type::Set(Box::new(elem))
    }

    /// `map(elem)`.
    pub fn map(elem: Type) -> Self {
        Type::Map(Box::new(elem))
    }

    /// `object({..})` from `(name, type)` pairs.
    pub fn object<I, K>(attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, Type)>,
        K: Into<String>,
    {
        Type::Object(attrs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Whether this is the wildcard type.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Type::Dynamic)
    }

    /// Whether this is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::String | Type::Number | Type::Bool)
    }

    /// The element type of a list, set, or map.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::List(e) | Type::Set(e) | Type::Map(e) => Some(e),
            _ => None,
        }
    }

    /// Whether a value of type `self` can be converted to type `want`.
    pub fn is_convertible_to(&self, want: &Type) -> bool {
        if self == want || self.is_dynamic() || want.is_dynamic() {
            return true;
        }

        match (self, want) {
            // Number <-> Bool is the only primitive pair without a conversion.
            (Type::Number, Type::Bool) | (Type::Bool, Type::Number) => false,
            (from, to) if from.is_primitive() && to.is_primitive() => true,

            (Type::List(from) | Type::Set(from), Type::List(to) | Type::Set(to)) => {
                from.is_convertible_to(to)
            }
            (Type::Tuple(elems), Type::List(to) | Type::Set(to)) => {
                elems.iter().all(|e| e.is_convertible_to(to))
            }
            (Type::Tuple(from), Type::Tuple(to)) => {
                from.len() == to.len() && from.iter().zip(to).all(|(f, t)| f.is_convertible_to(t))
            }

            (Type::Map(from), Type::Map(to)) => from.is_convertible_to(to),
            (Type::Object(attrs), Type::Map(to)) => attrs.values().all(|a| a.is_convertible_to(to)),
            (Type::Map(from), Type::Object(attrs)) => attrs.values().all(|a| from.is_convertible_to(a)),
            (Type::Object(from), Type::Object(to)) => to.iter().all(|(name, want_attr)| {
                from.get(name)
                    .is_some_and(|have| have.is_convertible_to(want_attr))
            }),

            _ => false,
        }
    }

    /// Human-readable type name as shown in hover and completion detail.
    pub fn friendly_name(&self) -> String {
        match self {
            Type::Dynamic => "any type".to_string(),
            Type::String => "string".to_string(),
            Type::Number => "number".to_string(),
            Type::Bool => "bool".to_string(),
            Type::List(e) => format!("list of {}", e.friendly_name()),
            Type::Set(e) => format!("set of {}", e.friendly_name()),
            Type::Map(e) => format!("map of {}", e.friendly_name()),
            Type::Object(_) => "object".to_string(),
            Type::Tuple(_) => "tuple".to_string(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.friendly_name())
    }
}
