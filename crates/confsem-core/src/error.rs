//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types shared by every crate in the workspace. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Nothing in the semantic core is fatal to the host process. These errors
//!   describe a single input (one traversal, one dependency key set) that
//!   could not be processed, and callers decide how lenient to be.
//! - "Schema not fully known" and "no reference found" are NOT errors. They
//!   are ordinary return values of the resolver and the reference engine.

use thiserror::Error;

/// Top-level error type for the configuration semantics engine.
#[derive(Error, Debug)]
pub enum ConfsemError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A traversal could not be converted into an address.
    #[error("address error: {0}")]
    Address(#[from] AddressError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// A traversal that has no address representation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The traversal has no steps at all.
    #[error("traversal is empty")]
    Empty,

    /// The first step of a traversal must be a root name.
    #[error("traversal must begin with a root name, found {found}")]
    NotRooted {
        /// Rendering of the offending first step.
        found: String,
    },

    /// Splat steps (`[*]`, `.*`) address many values and cannot be matched.
    #[error("splat step at position {position} has no address representation")]
    Splat {
        /// Zero-based position of the splat step.
        position: usize,
    },

    /// Index keys must be strings or whole numbers.
    #[error("index key at position {position} must be a string or integer, found {found}")]
    InvalidIndexKey {
        /// Zero-based position of the index step.
        position: usize,
        /// Friendly name of the key's value kind.
        found: String,
    },

    /// An address string could not be parsed.
    #[error("malformed address {input:?} at byte {position}")]
    Malformed {
        /// The rejected input.
        input: String,
        /// Byte offset where parsing failed.
        position: usize,
    },
}
