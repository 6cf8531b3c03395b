//! # confsem-reference: Reference Origins, Targets and Matching
//!
//! Resolves symbolic references in configuration against declared,
//! addressable targets, in both directions:
//!
//! - **go-to-definition:** [`Targets::match_origin`] finds every target an
//!   origin refers to, searching nested targets at any depth.
//! - **find-references:** [`Origins::match_target`] finds every origin
//!   referring to a target or anything nested in it.
//!
//! Targets and origins are extracted from a configuration tree by walker
//! visitors in `collect.rs`, driven by the same schema the walker uses.
//!
//! ## Sharing
//!
//! Target and origin collections are plain owned values, rebuilt wholesale
//! on each extraction pass and only read afterwards. They can be shared
//! across threads behind an `Arc` without locking.

pub mod collect;
pub mod origin;
pub mod target;

pub use collect::{collect_origins, collect_targets, OriginCollector, TargetCollector};
pub use origin::{DirectOrigin, LocalOrigin, Origin, Origins, PathOrigin};
pub use target::{Target, Targets};
