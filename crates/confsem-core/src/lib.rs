//! # confsem-core: Foundational Types for the Configuration Semantics Engine
//!
//! This crate is the leaf of the workspace. It defines the data types every
//! other crate exchanges: addresses, source ranges, the structural value-type
//! system, literal values, the already-parsed configuration tree, and the
//! canonical serialization used for lookup keys.
//!
//! ## Key Design Principles
//!
//! 1. **Closed sum types.** Address steps, types, values, and expressions are
//!    enums. Every consumer matches exhaustively; adding a variant forces
//!    every consumer to handle it at compile time.
//!
//! 2. **`CanonicalBytes` newtype.** All lookup-key serialization flows through
//!    `CanonicalBytes::new()`, so structurally equal inputs always produce
//!    byte-identical keys regardless of construction order.
//!
//! 3. **Owned, immutable leaves.** An `Address` is never mutated once built;
//!    builder methods return new addresses, so embedding one in an origin or
//!    target never aliases another.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `confsem-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod address;
pub mod canonical;
pub mod error;
pub mod identity;
pub mod range;
pub mod syntax;
pub mod types;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use address::{AddrStep, Address, IndexKey};
pub use canonical::CanonicalBytes;
pub use error::{AddressError, CanonicalizationError, ConfsemError};
pub use identity::{Path, ScopeId};
pub use range::{Pos, Range};
pub use syntax::{Attribute, Block, Body, Expression, TraverseStep, Traversal};
pub use types::Type;
pub use value::Value;
