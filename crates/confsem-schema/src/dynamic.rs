//! # Dynamic Blocks
//!
//! With the `dynamic_blocks` extension a body accepts
//!
//! ```text
//! dynamic "widget" {
//!   for_each = var.widgets
//!   content {
//!     # validated against the real `widget` body
//!   }
//! }
//! ```
//!
//! for every nested block type it declares. The virtual `dynamic` block type
//! carries one dependent body per real block type, keyed on label 0, each
//! wrapping the real body in a single required `content` block.
//!
//! ## Invariant
//!
//! Support is transitive: before the `dynamic` block is synthesized, the
//! flag is copied onto every nested block body (static and dependent) so the
//! same synthesis happens again one level down when those blocks resolve.

use std::sync::Arc;

use tracing::warn;

use confsem_core::Type;

use crate::attribute::{AttributeSchema, LabelSchema};
use crate::block::BlockSchema;
use crate::body::{BodyExtensions, BodySchema};
use crate::constraint::Constraint;
use crate::dependency::{DependencyKeys, SchemaKey};
use crate::meta::for_each_attribute_schema;

/// Block type of the virtual dynamic block.
pub const DYNAMIC: &str = "dynamic";

/// Block type of the body wrapper inside a dynamic block.
pub const CONTENT: &str = "content";

/// Add the virtual `dynamic` block type to `body` if it enables the
/// extension and declares nested blocks.
///
/// Returns `body` untouched otherwise.
pub fn with_dynamic_blocks(mut body: Arc<BodySchema>) -> Arc<BodySchema> {
    if !body.extensions().dynamic_blocks || body.blocks.is_empty() {
        return body;
    }

    let merged = Arc::make_mut(&mut body);
    propagate_dynamic_blocks(merged);
    let dynamic = dynamic_block_schema(merged);
    merged.blocks.insert(DYNAMIC.to_string(), Arc::new(dynamic));
    body
}

/// Enable the extension on every nested block body of `body`.
fn propagate_dynamic_blocks(body: &mut BodySchema) {
    for block in body.blocks.values_mut() {
        let block = Arc::make_mut(block);
        if let Some(inner) = block.body.as_mut() {
            enable(Arc::make_mut(inner));
        }
        for fragment in block.dependent_body.values_mut() {
            enable(Arc::make_mut(fragment));
        }
    }
}

fn enable(body: &mut BodySchema) {
    let mut extensions = body.extensions.unwrap_or_default();
    extensions.dynamic_blocks = true;
    body.extensions = Some(extensions);
}

/// The schema of `dynamic "<type>" { ... }` for the blocks of `body`.
pub fn dynamic_block_schema(body: &BodySchema) -> BlockSchema {
    let mut dynamic = BlockSchema {
        labels: vec![LabelSchema {
            description: Some("Type of the block to generate".into()),
            ..LabelSchema::dep_key("name")
        }],
        description: Some(
            "A dynamic block to produce blocks dynamically by iterating over a given \
             complex value"
                .into(),
        ),
        body: Some(Arc::new(dynamic_body())),
        ..Default::default()
    };

    for (block_type, schema) in &body.blocks {
        if block_type == DYNAMIC {
            continue;
        }
        let key = match SchemaKey::new(&DependencyKeys::new().label(0, block_type.as_str())) {
            Ok(key) => key,
            Err(err) => {
                warn!(block_type = %block_type, error = %err, "skipping dynamic variant");
                continue;
            }
        };
        let content = BlockSchema {
            body: schema.body.clone(),
            description: schema.description.clone(),
            min_items: 1,
            max_items: Some(1),
            ..Default::default()
        };
        let fragment = BodySchema::default().with_block(CONTENT, content);
        dynamic.dependent_body.insert(key, Arc::new(fragment));
    }

    dynamic
}

fn dynamic_body() -> BodySchema {
    BodySchema {
        extensions: Some(BodyExtensions::default()),
        ..Default::default()
    }
    .with_attribute(
        "for_each",
        AttributeSchema {
            is_required: true,
            is_optional: false,
            ..for_each_attribute_schema()
        },
    )
    .with_attribute(
        "iterator",
        AttributeSchema {
            description: Some(
                "The name of a temporary variable that represents the current element".into(),
            ),
            ..AttributeSchema::optional(Constraint::LiteralType { of_type: Type::String })
        },
    )
    .with_attribute(
        "labels",
        AttributeSchema {
            description: Some("A list of strings that specifies the block labels".into()),
            ..AttributeSchema::optional(Constraint::AnyExpression {
                of_type: Type::list(Type::String),
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget_body() -> BodySchema {
        let widget = BlockSchema::with_body(BodySchema::default().with_attribute(
            "size",
            AttributeSchema::required(Constraint::LiteralType { of_type: Type::Number }),
        ));
        BodySchema::default()
            .with_block("widget", widget)
            .with_extensions(BodyExtensions {
                dynamic_blocks: true,
                ..Default::default()
            })
    }

    #[test]
    fn disabled_extension_is_identity() {
        let body = Arc::new(BodySchema::default().with_block("widget", BlockSchema::default()));
        let out = with_dynamic_blocks(Arc::clone(&body));
        assert!(Arc::ptr_eq(&body, &out));
    }

    #[test]
    fn synthesizes_content_variant_per_block_type() {
        let out = with_dynamic_blocks(Arc::new(widget_body()));
        let dynamic = out.block_schema(DYNAMIC).unwrap();
        assert_eq!(dynamic.dependency_key_label_count(), 1);

        let key = SchemaKey::new(&DependencyKeys::new().label(0, "widget")).unwrap();
        let fragment = &dynamic.dependent_body[&key];
        let content = fragment.block_schema(CONTENT).unwrap();
        assert_eq!((content.min_items, content.max_items), (1, Some(1)));
        assert!(content.body.as_ref().unwrap().attributes.contains_key("size"));

        let attrs = &dynamic.body.as_ref().unwrap().attributes;
        assert!(attrs["for_each"].is_required);
        assert!(attrs["iterator"].is_optional);
        assert!(attrs["labels"].is_optional);
    }

    #[test]
    fn flag_reaches_nested_bodies() {
        let out = with_dynamic_blocks(Arc::new(widget_body()));
        let widget_body = out.blocks["widget"].body.as_ref().unwrap();
        assert!(widget_body.extensions().dynamic_blocks);

        let key = SchemaKey::new(&DependencyKeys::new().label(0, "widget")).unwrap();
        let content = &out.blocks[DYNAMIC].dependent_body[&key].blocks[CONTENT];
        assert!(content.body.as_ref().unwrap().extensions().dynamic_blocks);
    }

    #[test]
    fn source_schema_is_not_modified() {
        let source = Arc::new(widget_body());
        let _ = with_dynamic_blocks(Arc::clone(&source));
        assert!(!source.blocks.contains_key(DYNAMIC));
        let nested = source.blocks["widget"].body.as_ref().unwrap();
        assert!(!nested.extensions().dynamic_blocks);
    }
}
