//! # confsem-schema: Declarative Schema Model and Dependent Resolution
//!
//! Describes which attributes and blocks a body accepts and computes the
//! schema that applies to a particular block once conditional fragments
//! are resolved.
//!
//! - **Schema model** (`body.rs`, `block.rs`, `attribute.rs`): body, block,
//!   attribute and label schemas, shared as `Arc` trees.
//! - **Constraints** (`constraint.rs`): the value-constraint enum and its
//!   generic contract (friendly name, implied type, origin constraints).
//! - **Dependency keys** (`dependency.rs`): `DependencyKeys` and their
//!   canonical `SchemaKey` encoding.
//! - **Reference hints** (`address.rs`, `reference.rs`): address templates,
//!   targetable aliases, implied origins.
//! - **Resolution** (`resolve.rs`, `dynamic.rs`, `meta.rs`): the dependent
//!   schema resolver, the dynamic-block extension and the `count` /
//!   `for_each` meta-argument schemas.
//!
//! ## Crate Policy
//!
//! - Depends only on `confsem-core` internally.
//! - Schema trees are never written through a shared `Arc`; derived bodies
//!   are built with `Arc::make_mut`.
//! - A lookup miss is a `LookupResult`, not an error.

pub mod address;
pub mod attribute;
pub mod block;
pub mod body;
pub mod constraint;
pub mod dependency;
pub mod dynamic;
pub mod error;
pub mod meta;
pub mod reference;
pub mod resolve;

pub use address::{AddrStepSchema, AttributeAddrSchema, BlockAddrSchema};
pub use attribute::{AttributeSchema, LabelSchema};
pub use block::{BlockSchema, DependentBodies};
pub use body::{BodyExtensions, BodySchema, DocsLink};
pub use constraint::Constraint;
pub use dependency::{AttributeDependent, DependencyKeys, ExpressionValue, LabelDependent, SchemaKey};
pub use error::{SchemaError, SchemaResult};
pub use reference::{ImpliedOrigin, OriginConstraint, PathTarget, SchemaTarget, Targetable};
pub use resolve::{merge_bodies, resolve_body_schema, LookupResult, MAX_NESTED_DEPENDENT_DEPTH};
