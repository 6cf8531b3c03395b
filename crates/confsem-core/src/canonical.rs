//! # Canonical Key Bytes
//!
//! `CanonicalBytes` is the byte form of a lookup key. Dependency key sets
//! are turned into `SchemaKey`s through it, and a schema's dependent bodies
//! are stored and looked up under those keys.
//!
//! ## Invariant
//!
//! Two structurally equal values produce identical bytes, whatever order
//! their map entries were built in. The inner field is private, so every
//! key passes through [`CanonicalBytes::new`].
//!
//! Values are first lowered to `serde_json::Value` and then written with
//! `serde_jcs` (RFC 8785): object members sorted by key, no insignificant
//! whitespace, numbers in their shortest round-trip form. A key may hold
//! any literal a configuration can, fractional numbers included.

use serde::Serialize;

use crate::error::CanonicalizationError;

/// Canonical JSON text of a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// `SerializationFailed` when the value cannot be lowered to JSON.
    pub fn new(value: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let lowered = serde_json::to_value(value)?;
        Ok(Self(serde_jcs::to_string(&lowered)?.into_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The key text. JCS output is always UTF-8.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    pub fn into_string(self) -> String {
        String::from_utf8(self.0).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn members_are_sorted() {
        let key = serde_json::json!({"labels": [{"value": "aws", "index": 0}], "attributes": []});
        let cb = CanonicalBytes::new(&key).unwrap();
        assert_eq!(cb.as_str(), r#"{"attributes":[],"labels":[{"index":0,"value":"aws"}]}"#);
    }

    #[test]
    fn map_insertion_order_is_irrelevant() {
        let mut a = HashMap::new();
        a.insert("region", "eu");
        a.insert("engine", "pg");
        let mut b = HashMap::new();
        b.insert("engine", "pg");
        b.insert("region", "eu");
        assert_eq!(CanonicalBytes::new(&a).unwrap(), CanonicalBytes::new(&b).unwrap());
    }

    #[test]
    fn fractional_numbers_are_keyable() {
        let key = serde_json::json!({"attributes": [{"name": "ratio", "expr": {"static": 1.5}}]});
        let cb = CanonicalBytes::new(&key).unwrap();
        assert_eq!(cb.as_str(), r#"{"attributes":[{"expr":{"static":1.5},"name":"ratio"}]}"#);
        let again = serde_json::json!({"attributes": [{"expr": {"static": 1.5}, "name": "ratio"}]});
        assert_eq!(CanonicalBytes::new(&again).unwrap(), cb);
    }

    #[test]
    fn integers_and_null_survive() {
        let cb = CanonicalBytes::new(&serde_json::json!({"n": -42, "k": null})).unwrap();
        assert_eq!(cb.clone().into_string(), r#"{"k":null,"n":-42}"#);
        assert_eq!(cb.as_bytes(), cb.as_str().as_bytes());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;

    fn integral_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-z0-9_.]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 32, 5, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..5)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn reparse_then_canonicalize_is_stable(value in integral_json()) {
            let first = CanonicalBytes::new(&value).unwrap();
            let reparsed: Value = serde_json::from_slice(first.as_bytes()).unwrap();
            let second = CanonicalBytes::new(&reparsed).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
