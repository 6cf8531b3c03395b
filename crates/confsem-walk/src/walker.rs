//! # Tree Walker
//!
//! Visits every node of a parsed configuration tree together with the
//! schema that applies to it.
//!
//! ## Order
//!
//! - A **body** visits its attributes, then its blocks, each in declaration
//!   order, and is itself visited last, with the child block tallies in its
//!   context.
//! - An **attribute** is a leaf.
//! - A **block** has its body schema resolved against its labels and
//!   attributes exactly once. The block is then visited, with the resolved
//!   body in [`WalkContext::block_body`], and its body walked one nesting
//!   level deeper. A lookup that does not fully succeed marks the subtree
//!   as having an unknown schema.
//!
//! A node without a matching schema is still walked; missing schema is not
//! an error at this layer.

use std::sync::Arc;

use tracing::trace;

use confsem_core::{Attribute, Block, Body};
use confsem_schema::meta::{count_attribute_schema, for_each_attribute_schema, COUNT, FOR_EACH};
use confsem_schema::{AttributeSchema, BlockSchema, BodySchema};

use crate::context::{BlockTallies, WalkContext};

/// A node of the parsed tree.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Body(&'a Body),
    Attribute(&'a Attribute),
    Block(&'a Block),
}

/// The schema paired with a [`Node`].
#[derive(Debug, Clone, Copy)]
pub enum NodeSchema<'a> {
    Body(&'a BodySchema),
    Attribute(&'a AttributeSchema),
    Block(&'a BlockSchema),
}

impl<'a> NodeSchema<'a> {
    pub fn as_body(self) -> Option<&'a BodySchema> {
        match self {
            NodeSchema::Body(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_attribute(self) -> Option<&'a AttributeSchema> {
        match self {
            NodeSchema::Attribute(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_block(self) -> Option<&'a BlockSchema> {
        match self {
            NodeSchema::Block(s) => Some(s),
            _ => None,
        }
    }
}

/// Receives every visited node.
pub trait Visitor {
    /// Called once per node. `schema` is `None` when nothing in the schema
    /// tree describes the node.
    fn visit(&mut self, ctx: &WalkContext, node: Node<'_>, schema: Option<NodeSchema<'_>>);
}

/// Walk `node` from a root context.
pub fn walk<V: Visitor + ?Sized>(node: Node<'_>, schema: Option<NodeSchema<'_>>, visitor: &mut V) {
    walk_with_context(&WalkContext::new(), node, schema, visitor);
}

/// Walk `node` under an existing context.
///
/// A schema of the wrong kind for `node` is treated as absent.
pub fn walk_with_context<V: Visitor + ?Sized>(
    ctx: &WalkContext,
    node: Node<'_>,
    schema: Option<NodeSchema<'_>>,
    visitor: &mut V,
) {
    match node {
        Node::Body(body) => walk_body(ctx, body, schema.and_then(NodeSchema::as_body), visitor),
        Node::Attribute(attr) => {
            let schema = schema.and_then(NodeSchema::as_attribute);
            trace!(attribute = %attr.name, level = ctx.nesting_level(), "visit attribute");
            visitor.visit(ctx, node, schema.map(NodeSchema::Attribute));
        }
        Node::Block(block) => walk_block(ctx, block, schema.and_then(NodeSchema::as_block), visitor),
    }
}

fn walk_body<V: Visitor + ?Sized>(
    ctx: &WalkContext,
    body: &Body,
    schema: Option<&BodySchema>,
    visitor: &mut V,
) {
    let ctx = ctx.without_tallies();
    let extensions = schema.map(BodySchema::extensions).unwrap_or_default();
    let count_schema = extensions.count.then(count_attribute_schema);
    let for_each_schema = extensions.for_each.then(for_each_attribute_schema);

    for attr in &body.attributes {
        let attr_schema = match attr.name.as_str() {
            COUNT if count_schema.is_some() => count_schema.as_ref(),
            FOR_EACH if for_each_schema.is_some() => for_each_schema.as_ref(),
            name => schema.and_then(|s| s.attribute_schema(name)).map(Arc::as_ref),
        };
        walk_with_context(
            &ctx,
            Node::Attribute(attr),
            attr_schema.map(NodeSchema::Attribute),
            visitor,
        );
    }

    let mut tallies = BlockTallies::default();
    for block in &body.blocks {
        let block_schema = schema
            .and_then(|s| s.block_schema(&block.block_type))
            .map(Arc::as_ref);
        walk_block(&ctx, block, block_schema, visitor);
        tallies.record(&block.block_type, block.labels.first().map(String::as_str));
    }

    let ctx = ctx.with_tallies(tallies);
    trace!(level = ctx.nesting_level(), "visit body");
    visitor.visit(&ctx, Node::Body(body), schema.map(NodeSchema::Body));
}

fn walk_block<V: Visitor + ?Sized>(
    ctx: &WalkContext,
    block: &Block,
    schema: Option<&BlockSchema>,
    visitor: &mut V,
) {
    let mut body_ctx = ctx.clone();
    let mut body_schema = None;
    if let Some(schema) = schema.filter(|s| s.body.is_some()) {
        let (resolved, result) = schema.resolve_body(block);
        if result.is_schema_unknown() {
            trace!(block_type = %block.block_type, ?result, "body schema not fully known");
            body_ctx = body_ctx.with_unknown_schema();
        }
        body_schema = resolved;
    }

    trace!(
        block_type = %block.block_type,
        level = ctx.nesting_level(),
        known = schema.is_some(),
        "visit block"
    );
    let block_ctx = ctx.with_block_body(body_schema.clone());
    visitor.visit(&block_ctx, Node::Block(block), schema.map(NodeSchema::Block));

    walk_body(&body_ctx.nested(), &block.body, body_schema.as_deref(), visitor);
}
