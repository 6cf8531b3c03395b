//! # confsem-walk: Schema-Aware Tree Walker
//!
//! Walks an already-parsed configuration tree and reports every node to a
//! [`Visitor`] together with its effective schema. Block bodies are resolved
//! through the dependent schema resolver in `confsem-schema` at each block
//! boundary.
//!
//! ```rust,ignore
//! use confsem_walk::{walk, Node, NodeSchema, Visitor, WalkContext};
//!
//! struct Levels(Vec<usize>);
//!
//! impl Visitor for Levels {
//!     fn visit(&mut self, ctx: &WalkContext, _: Node<'_>, _: Option<NodeSchema<'_>>) {
//!         self.0.push(ctx.nesting_level());
//!     }
//! }
//!
//! let mut levels = Levels(Vec::new());
//! walk(Node::Body(&body), Some(NodeSchema::Body(&schema)), &mut levels);
//! ```
//!
//! ## Crate Policy
//!
//! - The walker never fails; unresolvable schema is reported through
//!   [`WalkContext::is_unknown_schema`].
//! - Visitors receive borrowed nodes and schemas and own whatever state
//!   they accumulate.

pub mod context;
pub mod walker;

pub use context::{BlockTallies, WalkContext};
pub use walker::{walk, walk_with_context, Node, NodeSchema, Visitor};
