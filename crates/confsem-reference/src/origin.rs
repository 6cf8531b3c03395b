//! # Reference Origins
//!
//! An origin is a reference occurrence in source. Local and path origins
//! carry an address and are resolved by matching against targets; a direct
//! origin already knows where it points.

use serde::{Deserialize, Serialize};

use confsem_core::{Address, Path, Pos, Range};
use confsem_schema::OriginConstraint;

use crate::target::Target;

/// A reference resolved within the same configuration unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalOrigin {
    pub addr: Address,
    pub range: Range,
    #[serde(default)]
    pub constraints: Vec<OriginConstraint>,
}

/// A reference resolved in another configuration unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathOrigin {
    pub target_addr: Address,
    pub target_path: Path,
    pub range: Range,
    #[serde(default)]
    pub constraints: Vec<OriginConstraint>,
}

/// A fixed pointer into another configuration unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectOrigin {
    pub range: Range,
    pub target_path: Path,
    pub target_range: Range,
}

/// A reference occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    Local(LocalOrigin),
    Path(PathOrigin),
    Direct(DirectOrigin),
}

impl Origin {
    /// Source range of the occurrence.
    pub fn range(&self) -> &Range {
        match self {
            Origin::Local(o) => &o.range,
            Origin::Path(o) => &o.range,
            Origin::Direct(o) => &o.range,
        }
    }

    /// The address to match; `None` for direct origins.
    pub fn address(&self) -> Option<&Address> {
        match self {
            Origin::Local(o) => Some(&o.addr),
            Origin::Path(o) => Some(&o.target_addr),
            Origin::Direct(_) => None,
        }
    }

    /// Constraints a matching target must satisfy.
    pub fn constraints(&self) -> &[OriginConstraint] {
        match self {
            Origin::Local(o) => &o.constraints,
            Origin::Path(o) => &o.constraints,
            Origin::Direct(_) => &[],
        }
    }
}

impl From<LocalOrigin> for Origin {
    fn from(o: LocalOrigin) -> Self {
        Origin::Local(o)
    }
}

impl From<PathOrigin> for Origin {
    fn from(o: PathOrigin) -> Self {
        Origin::Path(o)
    }
}

impl From<DirectOrigin> for Origin {
    fn from(o: DirectOrigin) -> Self {
        Origin::Direct(o)
    }
}

/// A collection of origins, in extraction order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Origins(Vec<Origin>);

impl Origins {
    pub fn new(origins: Vec<Origin>) -> Self {
        Self(origins)
    }

    pub fn push(&mut self, origin: impl Into<Origin>) {
        self.0.push(origin.into());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Origin> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Origins referring to `target` or to any of its nested targets.
    ///
    /// `local_path` owns these origins and `target_path` owns the target.
    /// Local origins only participate when both are the same unit; path
    /// origins only when they point into `target_path`. Direct origins
    /// never match. Each origin appears at most once, in extraction order.
    pub fn match_target(&self, local_path: &Path, target: &Target, target_path: &Path) -> Vec<&Origin> {
        self.0
            .iter()
            .filter(|origin| match origin {
                Origin::Local(_) => local_path == target_path,
                Origin::Path(o) => &o.target_path == target_path,
                Origin::Direct(_) => false,
            })
            .filter(|origin| matches_tree(target, origin))
            .collect()
    }

    /// Origins whose range contains `pos` in `filename`.
    pub fn at_pos(&self, filename: &str, pos: Pos) -> Vec<&Origin> {
        self.0
            .iter()
            .filter(|o| o.range().filename == filename && o.range().contains_pos(pos))
            .collect()
    }
}

fn matches_tree(target: &Target, origin: &Origin) -> bool {
    target.matches(origin) || target.nested_targets.iter().any(|t| matches_tree(t, origin))
}

impl<'a> IntoIterator for &'a Origins {
    type Item = &'a Origin;
    type IntoIter = std::slice::Iter<'a, Origin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Origin> for Origins {
    fn from_iter<I: IntoIterator<Item = Origin>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
