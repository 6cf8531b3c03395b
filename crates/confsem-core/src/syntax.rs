//! # Parsed Configuration Tree
//!
//! The node types the walker and extractors consume. Parsing source text is
//! owned by an external collaborator; this module only fixes the shape of
//! its output (bodies, attributes, blocks, expressions, with source ranges).
//!
//! ```text
//! Body
//! ├── attributes: [Attribute { name, expr }]
//! └── blocks:     [Block { block_type, labels, body: Body }]
//! ```
//!
//! Declaration order is preserved as given; nothing here reorders nodes.

use serde::{Deserialize, Serialize};

use crate::address::{AddrStep, Address, IndexKey};
use crate::error::AddressError;
use crate::range::Range;
use crate::value::Value;

/// A body: the contents between a block's braces, or a whole file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Attributes in declaration order.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Nested blocks in declaration order.
    #[serde(default)]
    pub blocks: Vec<Block>,
    /// Source range of the body.
    #[serde(default)]
    pub range: Range,
}

impl Body {
    /// Find an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// `name = expr`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Value expression.
    pub expr: Expression,
    /// Range of the whole `name = expr` line.
    #[serde(default)]
    pub range: Range,
    /// Range of the name only.
    #[serde(default)]
    pub name_range: Range,
}

/// `type "label" ... { body }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block type name.
    #[serde(rename = "type")]
    pub block_type: String,
    /// Label values in order.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Ranges of the labels, parallel to `labels`.
    #[serde(default)]
    pub label_ranges: Vec<Range>,
    /// Block body.
    #[serde(default)]
    pub body: Body,
    /// Range of the type name and labels, used as the definition anchor.
    #[serde(default)]
    pub def_range: Range,
    /// Range of the whole block.
    #[serde(default)]
    pub range: Range,
}

/// An attribute value expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expression {
    /// A static literal.
    Literal {
        /// The literal value.
        value: Value,
        /// Source range.
        #[serde(default)]
        range: Range,
    },
    /// A bare reference, e.g. `var.region`.
    Traversal(Traversal),
    /// Any other expression (template, function call, operator, ...) with
    /// the traversals it contains.
    Complex {
        /// References appearing anywhere inside the expression.
        #[serde(default)]
        traversals: Vec<Traversal>,
        /// Source range.
        #[serde(default)]
        range: Range,
    },
}

impl Expression {
    /// Source range of the expression.
    pub fn range(&self) -> &Range {
        match self {
            Expression::Literal { range, .. } | Expression::Complex { range, .. } => range,
            Expression::Traversal(t) => &t.range,
        }
    }

    /// The literal value, if this is a plain literal.
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Expression::Literal { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Every traversal appearing in the expression.
    pub fn traversals(&self) -> Vec<&Traversal> {
        match self {
            Expression::Literal { .. } => Vec::new(),
            Expression::Traversal(t) => vec![t],
            Expression::Complex { traversals, .. } => traversals.iter().collect(),
        }
    }
}

/// A reference expression as a sequence of traversal steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traversal {
    /// Steps, starting with a root name.
    pub steps: Vec<TraverseStep>,
    /// Source range.
    #[serde(default)]
    pub range: Range,
}

/// One traversal step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraverseStep {
    /// Leading name.
    Root(String),
    /// `.name`
    Attr(String),
    /// `[key]`
    Index(Value),
    /// `[*]` or `.*`
    Splat,
}

impl Traversal {
    /// Create a traversal.
    pub fn new(steps: Vec<TraverseStep>, range: Range) -> Self {
        Self { steps, range }
    }

    /// Build a traversal that follows exactly the steps of `addr`.
    pub fn from_address(addr: &Address, range: Range) -> Self {
        let steps = addr
            .steps()
            .iter()
            .map(|step| match step {
                AddrStep::Root(name) => TraverseStep::Root(name.clone()),
                AddrStep::Attr(name) => TraverseStep::Attr(name.clone()),
                AddrStep::Index(IndexKey::String(s)) => TraverseStep::Index(Value::string(s)),
                AddrStep::Index(IndexKey::Number(n)) => TraverseStep::Index(Value::int(*n)),
            })
            .collect();
        Self { steps, range }
    }

    /// Convert the traversal into an address.
    ///
    /// # Errors
    ///
    /// Fails for empty traversals, traversals not starting with a root name,
    /// splat steps, and index keys that are neither strings nor integers.
    pub fn to_address(&self) -> Result<Address, AddressError> {
        let first = self.steps.first().ok_or(AddressError::Empty)?;
        if !matches!(first, TraverseStep::Root(_)) {
            return Err(AddressError::NotRooted {
                found: format!("{first:?}"),
            });
        }

        let mut steps = Vec::with_capacity(self.steps.len());
        for (position, step) in self.steps.iter().enumerate() {
            let addr_step = match step {
                TraverseStep::Root(name) => AddrStep::Root(name.clone()),
                TraverseStep::Attr(name) => AddrStep::Attr(name.clone()),
                TraverseStep::Splat => return Err(AddressError::Splat { position }),
                TraverseStep::Index(key) => AddrStep::Index(index_key(key).ok_or_else(|| {
                    AddressError::InvalidIndexKey {
                        position,
                        found: key.kind_name().to_string(),
                    }
                })?),
            };
            steps.push(addr_step);
        }
        Ok(Address::new(steps))
    }
}

fn index_key(value: &Value) -> Option<IndexKey> {
    match value {
        Value::String(s) => Some(IndexKey::String(s.clone())),
        Value::Number(n) => n.as_i64().map(IndexKey::Number),
        _ => None,
    }
}
