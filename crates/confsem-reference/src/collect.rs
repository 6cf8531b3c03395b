//! # Schema-Aware Extraction
//!
//! Walker visitors that turn a configuration tree and its schema into
//! targets and origins.
//!
//! ## Targets
//!
//! - Blocks with a `BlockAddrSchema`: a type-unaware target when
//!   `as_reference`, an object-typed target with one nested target per
//!   present attribute when `as_type_of_body`.
//! - `targetable_as` entries of a block's resolved body.
//! - Attributes with an `AttributeAddrSchema`.
//! - Local targets valid only inside their body: `count.index`,
//!   `each.key` and `each.value` when the meta-argument is present,
//!   `self.<attr>` when self references are enabled.
//!
//! ## Origins
//!
//! - Local origins for every addressable traversal of an attribute whose
//!   constraint accepts references. Attributes under an unknown schema
//!   produce unconstrained origins.
//! - Path origins from `origin_for_target` and, for bodies pointing into
//!   another unit, from `implied_origins`.
//! - A direct origin at the definition range of a block whose body points
//!   into another unit.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;

use confsem_core::{Address, Attribute, Block, Body, Type};
use confsem_schema::meta::{count_index_address, each_key_address, each_value_address, COUNT, FOR_EACH};
use confsem_schema::{AttributeSchema, BlockSchema, BodySchema, OriginConstraint};
use confsem_walk::{walk, Node, NodeSchema, Visitor, WalkContext};

use crate::origin::{DirectOrigin, LocalOrigin, Origins, PathOrigin};
use crate::target::{Target, Targets};

/// Collect every target declared in `body`.
pub fn collect_targets(body: &Body, schema: &BodySchema) -> Targets {
    let mut collector = TargetCollector::default();
    walk(Node::Body(body), Some(NodeSchema::Body(schema)), &mut collector);
    collector.into_targets()
}

/// Collect every origin occurring in `body`.
pub fn collect_origins(body: &Body, schema: &BodySchema) -> Origins {
    let mut collector = OriginCollector::default();
    walk(Node::Body(body), Some(NodeSchema::Body(schema)), &mut collector);
    collector.into_origins()
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// Visitor collecting targets.
#[derive(Debug, Default)]
pub struct TargetCollector {
    targets: Targets,
}

impl TargetCollector {
    pub fn into_targets(self) -> Targets {
        self.targets
    }

    fn block_targets(&mut self, block: &Block, schema: &BlockSchema, body_schema: Option<&BodySchema>) {
        if let Some(addr_schema) = &schema.address {
            if let Some(addr) = addr_schema.address_for(block) {
                let name = addr_schema
                    .friendly_name
                    .clone()
                    .unwrap_or_else(|| block.block_type.clone());
                let base = Target {
                    addr: addr.clone(),
                    scope_id: addr_schema.scope_id.clone(),
                    range: block.range.clone(),
                    def_range: block.def_range.clone(),
                    name,
                    description: schema.description.clone(),
                    ..Default::default()
                };
                if addr_schema.as_reference {
                    self.targets.push(base.clone());
                }
                if addr_schema.as_type_of_body {
                    self.targets
                        .push(typed_body_target(base, &addr, &block.body, body_schema));
                }
            } else {
                trace!(block_type = %block.block_type, "block address not instantiable");
            }
        }

        if let Some(body_schema) = body_schema {
            for t in &body_schema.targetable_as {
                self.targets.push(Target {
                    addr: t.address.clone(),
                    scope_id: t.scope_id.clone(),
                    ty: t.as_type.clone(),
                    range: block.range.clone(),
                    def_range: block.def_range.clone(),
                    name: t.friendly_name.clone().unwrap_or_default(),
                    description: t.description.clone(),
                    ..Default::default()
                });
            }
        }
    }

    fn attribute_targets(&mut self, attr: &Attribute, schema: &AttributeSchema) {
        let Some(addr_schema) = &schema.address else {
            return;
        };
        let Some(addr) = addr_schema.address_for(&attr.name) else {
            return;
        };
        let base = Target {
            addr,
            scope_id: addr_schema.scope_id.clone(),
            range: attr.range.clone(),
            def_range: attr.name_range.clone(),
            name: addr_schema.friendly_name.clone().unwrap_or_default(),
            description: schema.description.clone(),
            ..Default::default()
        };
        if addr_schema.as_reference {
            self.targets.push(base.clone());
        }
        if addr_schema.as_expr_type {
            self.targets.push(Target {
                ty: Some(schema.value_type().unwrap_or(Type::Dynamic)),
                ..base
            });
        }
    }

    fn local_targets(&mut self, body: &Body, schema: &BodySchema) {
        let extensions = schema.extensions();
        let local = |addr: Address, ty: Type, attr: &Attribute, description: Option<&str>| Target {
            local_addr: addr,
            targetable_from_range: Some(body.range.clone()),
            ty: Some(ty),
            range: attr.range.clone(),
            def_range: attr.name_range.clone(),
            description: description.map(str::to_string),
            ..Default::default()
        };

        if extensions.count {
            if let Some(count) = body.attribute(COUNT) {
                self.targets.push(local(
                    count_index_address(),
                    Type::Number,
                    count,
                    Some("The distinct index number (starting with 0) corresponding to the instance"),
                ));
            }
        }
        if extensions.for_each {
            if let Some(for_each) = body.attribute(FOR_EACH) {
                self.targets.push(local(
                    each_key_address(),
                    Type::String,
                    for_each,
                    Some("The map key (or set member) corresponding to this instance"),
                ));
                self.targets.push(local(
                    each_value_address(),
                    Type::Dynamic,
                    for_each,
                    Some("The map value corresponding to this instance"),
                ));
            }
        }
        if extensions.self_refs {
            for attr in &body.attributes {
                let ty = schema
                    .attribute_schema(&attr.name)
                    .and_then(|s| s.value_type())
                    .unwrap_or(Type::Dynamic);
                let addr = Address::root("self").attr(attr.name.as_str());
                self.targets.push(local(addr, ty, attr, None));
            }
        }
    }
}

fn typed_body_target(
    base: Target,
    addr: &Address,
    body: &Body,
    schema: Option<&BodySchema>,
) -> Target {
    let Some(schema) = schema else {
        return Target {
            ty: Some(Type::Dynamic),
            ..base
        };
    };

    let attrs: BTreeMap<String, Type> = schema
        .attributes
        .iter()
        .map(|(name, s)| (name.clone(), s.value_type().unwrap_or(Type::Dynamic)))
        .collect();

    let nested_targets = body
        .attributes
        .iter()
        .filter_map(|attr| {
            let attr_schema = schema.attribute_schema(&attr.name).map(Arc::as_ref)?;
            Some(Target {
                addr: addr.attr(attr.name.as_str()),
                scope_id: base.scope_id.clone(),
                ty: Some(attr_schema.value_type().unwrap_or(Type::Dynamic)),
                range: attr.range.clone(),
                def_range: attr.name_range.clone(),
                description: attr_schema.description.clone(),
                ..Default::default()
            })
        })
        .collect();

    Target {
        ty: Some(Type::Object(attrs)),
        nested_targets,
        ..base
    }
}

impl Visitor for TargetCollector {
    fn visit(&mut self, ctx: &WalkContext, node: Node<'_>, schema: Option<NodeSchema<'_>>) {
        match (node, schema) {
            (Node::Block(block), Some(NodeSchema::Block(s))) => {
                self.block_targets(block, s, ctx.block_body().map(Arc::as_ref));
            }
            (Node::Attribute(attr), Some(NodeSchema::Attribute(s))) => self.attribute_targets(attr, s),
            (Node::Body(body), Some(NodeSchema::Body(s))) => self.local_targets(body, s),
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Origins
// ---------------------------------------------------------------------------

/// Visitor collecting origins.
#[derive(Debug, Default)]
pub struct OriginCollector {
    origins: Origins,
}

impl OriginCollector {
    pub fn into_origins(self) -> Origins {
        self.origins
    }

    fn attribute_origins(&mut self, ctx: &WalkContext, attr: &Attribute, schema: Option<&AttributeSchema>) {
        let constraints: Option<Vec<OriginConstraint>> = match schema {
            Some(AttributeSchema {
                constraint: Some(c), ..
            }) => Some(c.origin_constraints()).filter(|cs| !cs.is_empty()),
            Some(_) => Some(Vec::new()),
            None if ctx.is_unknown_schema() => Some(Vec::new()),
            None => None,
        };

        if let Some(constraints) = constraints {
            for traversal in attr.expr.traversals() {
                match traversal.to_address() {
                    Ok(addr) => self.origins.push(LocalOrigin {
                        addr,
                        range: traversal.range.clone(),
                        constraints: constraints.clone(),
                    }),
                    Err(err) => {
                        trace!(attribute = %attr.name, error = %err, "skipping unaddressable traversal");
                    }
                }
            }
        }

        if let Some(path_target) = schema.and_then(|s| s.origin_for_target.as_ref()) {
            self.origins.push(PathOrigin {
                target_addr: path_target.address.clone(),
                target_path: path_target.path.clone(),
                range: attr.expr.range().clone(),
                constraints: path_target.constraints.clone(),
            });
        }
    }

    fn block_origins(&mut self, block: &Block, body_schema: &BodySchema) {
        let Some(targets) = &body_schema.targets else {
            return;
        };

        self.origins.push(DirectOrigin {
            range: block.def_range.clone(),
            target_path: targets.path.clone(),
            target_range: targets.range.clone(),
        });

        for implied in &body_schema.implied_origins {
            let Some(attr) = block.body.attribute(&implied.attribute) else {
                continue;
            };
            self.origins.push(PathOrigin {
                target_addr: implied.origin_address.clone(),
                target_path: targets.path.clone(),
                range: attr.name_range.clone(),
                constraints: implied.constraints.clone(),
            });
        }
    }
}

impl Visitor for OriginCollector {
    fn visit(&mut self, ctx: &WalkContext, node: Node<'_>, schema: Option<NodeSchema<'_>>) {
        match node {
            Node::Attribute(attr) => {
                self.attribute_origins(ctx, attr, schema.and_then(NodeSchema::as_attribute));
            }
            Node::Block(block) => {
                if let Some(body_schema) = ctx.block_body() {
                    self.block_origins(block, body_schema);
                }
            }
            Node::Body(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confsem_core::Range;

    const SCHEMA: &str = r#"
blocks:
  backend:
    labels: [{ name: kind, is_dep_key: true }]
    address:
      steps: [{ kind: static, name: backend }, { kind: label, index: 0 }]
      as_reference: true
    body: {}
    dependent_body:
      - keys: { labels: [{ index: 0, value: remote }] }
        body:
          targetable_as: [{ address: remote_state, scope_id: state }]
          targets: { path: { path: ./state, language_id: cfg } }
"#;

    fn backend(kind: &str) -> Block {
        Block {
            block_type: "backend".into(),
            labels: vec![kind.into()],
            label_ranges: vec![],
            body: Body::default(),
            def_range: Range::default(),
            range: Range::default(),
        }
    }

    fn schema() -> BodySchema {
        BodySchema::from_descriptor("schema.yaml", SCHEMA).unwrap()
    }

    #[test]
    fn dependent_fragment_targets_and_origins_come_from_the_walk() {
        let body = Body {
            blocks: vec![backend("remote"), backend("local")],
            ..Default::default()
        };
        let targets = collect_targets(&body, &schema());
        let addrs: Vec<String> = targets.iter().map(|t| t.addr.to_string()).collect();
        assert_eq!(addrs, vec!["backend.remote", "remote_state", "backend.local"]);

        let origins = collect_origins(&body, &schema());
        assert_eq!(origins.len(), 1);
    }

    #[test]
    fn block_visit_without_resolved_body_adds_no_fragment_targets() {
        let schema = schema();
        let block_schema = schema.block_schema("backend").map(Arc::as_ref).unwrap();
        let block = backend("remote");

        let mut targets = TargetCollector::default();
        targets.visit(&WalkContext::new(), Node::Block(&block), Some(NodeSchema::Block(block_schema)));
        let addrs: Vec<String> = targets.into_targets().iter().map(|t| t.addr.to_string()).collect();
        assert_eq!(addrs, vec!["backend.remote"]);

        let mut origins = OriginCollector::default();
        origins.visit(&WalkContext::new(), Node::Block(&block), Some(NodeSchema::Block(block_schema)));
        assert_eq!(origins.into_origins().len(), 0);
    }
}
