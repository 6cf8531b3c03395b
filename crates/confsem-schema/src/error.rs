//! # Schema Errors
//!
//! Errors raised while building or loading schemas. Dependent-schema lookup
//! misses are not errors; they are reported through
//! [`LookupResult`](crate::resolve::LookupResult).

use thiserror::Error;

use confsem_core::CanonicalizationError;

/// Error while encoding, decoding, or loading schema data.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A dependency key set could not be canonicalized into a `SchemaKey`.
    #[error("schema key encoding failed: {0}")]
    KeyEncoding(#[from] CanonicalizationError),

    /// A `SchemaKey` string is not a serialized dependency key set.
    #[error("schema key decoding failed for {key:?}: {source}")]
    KeyDecoding {
        /// The undecodable key.
        key: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A schema descriptor could not be loaded.
    #[error("schema load error for '{name}': {reason}")]
    Load {
        /// Descriptor name or path.
        name: String,
        /// Reason the descriptor could not be loaded.
        reason: String,
    },
}

/// Convenience alias for schema results.
pub type SchemaResult<T> = Result<T, SchemaError>;
