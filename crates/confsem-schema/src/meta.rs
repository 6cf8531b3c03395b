//! # Meta-Argument Schemas
//!
//! Schemas synthesized for the `count` and `for_each` meta-arguments. When a
//! body enables the matching extension these override any declared attribute
//! of the same name.

use std::collections::BTreeMap;

use confsem_core::{Address, Type};

use crate::attribute::AttributeSchema;
use crate::constraint::Constraint;

/// Attribute name of the `count` meta-argument.
pub const COUNT: &str = "count";

/// Attribute name of the `for_each` meta-argument.
pub const FOR_EACH: &str = "for_each";

/// Schema of `count = <number>`.
pub fn count_attribute_schema() -> AttributeSchema {
    AttributeSchema {
        description: Some(
            "Total number of instances of this block.\n\n\
             Not compatible with `for_each`."
                .into(),
        ),
        ..AttributeSchema::optional(Constraint::AnyExpression { of_type: Type::Number })
    }
}

/// Schema of `for_each = <map | set(string) | object>`.
pub fn for_each_attribute_schema() -> AttributeSchema {
    AttributeSchema {
        description: Some(
            "A meta-argument that accepts a map or a set of strings, and creates \
             an instance for each item in that map or set.\n\n\
             Not compatible with `count`."
                .into(),
        ),
        ..AttributeSchema::optional(Constraint::OneOf {
            of: vec![
                Constraint::AnyExpression { of_type: Type::map(Type::Dynamic) },
                Constraint::AnyExpression { of_type: Type::set(Type::String) },
                Constraint::AnyExpression { of_type: Type::Object(BTreeMap::new()) },
            ],
        })
    }
}

/// `count.index`
pub fn count_index_address() -> Address {
    Address::root("count").attr("index")
}

/// `each.key`
pub fn each_key_address() -> Address {
    Address::root("each").attr("key")
}

/// `each.value`
pub fn each_value_address() -> Address {
    Address::root("each").attr("value")
}
