//! # Address Schemas
//!
//! Templates describing how a block or attribute becomes a reference target.
//! A block `resource "aws_instance" "web" {}` with steps
//! `[label 0, label 1]` is addressable as `aws_instance.web`; a variable
//! block with steps `[static "var", label 0]` as `var.<name>`.

use serde::{Deserialize, Serialize};

use confsem_core::{AddrStep, Address, Block, ScopeId};

/// One step of an address template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AddrStepSchema {
    /// A fixed name.
    Static {
        /// The name.
        name: String,
    },
    /// The value of the block label at `index`.
    Label {
        /// Zero-based label index.
        index: usize,
    },
    /// The string value of a literal attribute in the block body.
    AttrValue {
        /// Attribute name.
        name: String,
    },
    /// The attribute's own name.
    AttrName,
}

fn push_step(steps: &mut Vec<AddrStep>, name: String) {
    if steps.is_empty() {
        steps.push(AddrStep::Root(name));
    } else {
        steps.push(AddrStep::Attr(name));
    }
}

/// How a block is addressable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockAddrSchema {
    /// Address template.
    pub steps: Vec<AddrStepSchema>,
    /// Name shown in hover.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    /// Scope of the produced target.
    pub scope_id: ScopeId,
    /// Produce a type-unaware target usable as a bare reference.
    pub as_reference: bool,
    /// Produce a typed object target whose attributes mirror the body.
    pub as_type_of_body: bool,
}

impl BlockAddrSchema {
    /// Instantiate the template for `block`.
    ///
    /// Returns `None` if a referenced label or attribute value is missing,
    /// or the template is empty or uses `AttrName`.
    pub fn address_for(&self, block: &Block) -> Option<Address> {
        let mut steps = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let name = match step {
                AddrStepSchema::Static { name } => name.clone(),
                AddrStepSchema::Label { index } => block.labels.get(*index)?.clone(),
                AddrStepSchema::AttrValue { name } => block
                    .body
                    .attribute(name)?
                    .expr
                    .as_literal()?
                    .as_str()?
                    .to_string(),
                AddrStepSchema::AttrName => return None,
            };
            push_step(&mut steps, name);
        }
        if steps.is_empty() {
            return None;
        }
        Some(Address::new(steps))
    }
}

/// How an attribute is addressable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeAddrSchema {
    /// Address template; only `Static` and `AttrName` steps apply.
    pub steps: Vec<AddrStepSchema>,
    /// Name shown in hover.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    /// Scope of the produced target.
    pub scope_id: ScopeId,
    /// Produce a type-unaware target usable as a bare reference.
    pub as_reference: bool,
    /// Produce a target typed by the attribute's constraint.
    pub as_expr_type: bool,
}

impl AttributeAddrSchema {
    /// Instantiate the template for an attribute named `attr_name`.
    pub fn address_for(&self, attr_name: &str) -> Option<Address> {
        let mut steps = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let name = match step {
                AddrStepSchema::Static { name } => name.clone(),
                AddrStepSchema::AttrName => attr_name.to_string(),
                AddrStepSchema::Label { .. } | AddrStepSchema::AttrValue { .. } => return None,
            };
            push_step(&mut steps, name);
        }
        if steps.is_empty() {
            return None;
        }
        Some(Address::new(steps))
    }
}
