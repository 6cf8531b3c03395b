//! # confsem-cli: Command-Line Interface
//!
//! Provides the `confsem` binary over the walker and reference engine.
//! Source parsing is out of scope: documents are read as already-parsed
//! trees serialized to YAML or JSON.
//!
//! ## Subcommands
//!
//! - `confsem inspect`: walk a document and print each node with its
//!   nesting level, schema presence, unknown-schema flag and block tallies.
//! - `confsem refs`: print targets and origins, and resolve the
//!   definitions of origins (optionally only those at a position).
//!
//! ## Exit Codes
//!
//! `0` on success, `1` on any error (unreadable or malformed input), `2`
//! when the command ran but found nothing to report: `inspect` walked
//! into a part of the document whose schema is unknown, or `refs --at`
//! found no origin at the position.
//!
//! ```bash
//! confsem inspect --schema schema.yaml --document main.json
//! confsem -v refs --schema schema.yaml --document main.yaml --at 12:9
//! ```

pub mod inspect;
pub mod refs;

use std::path::Path;

use anyhow::{Context, Result};

use confsem_core::Body;
use confsem_schema::BodySchema;

/// Load a body schema descriptor. JSON when the file name ends in
/// `.json`, YAML otherwise.
pub fn load_schema(path: &Path) -> Result<BodySchema> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    let name = path.display().to_string();
    let schema = BodySchema::from_descriptor(&name, &text)
        .with_context(|| format!("failed to load schema {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        attributes = schema.attributes.len(),
        blocks = schema.blocks.len(),
        "loaded schema"
    );
    Ok(schema)
}

/// Load an already-parsed document body. JSON when the file name ends in
/// `.json`, YAML otherwise.
pub fn load_document(path: &Path) -> Result<Body> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read document {}", path.display()))?;
    let body: Body = if is_json(path) {
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse document {}", path.display()))?
    } else {
        serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse document {}", path.display()))?
    };
    tracing::debug!(
        path = %path.display(),
        attributes = body.attributes.len(),
        blocks = body.blocks.len(),
        "loaded document"
    );
    Ok(body)
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
