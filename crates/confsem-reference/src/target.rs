//! # Reference Targets
//!
//! A target is a declared, addressable location. Targets form a tree
//! through `nested_targets` (e.g. `aws_instance.web` and its attribute
//! `aws_instance.web.id`). A target tree is built once per extraction pass
//! and never modified afterwards.
//!
//! ## Matching
//!
//! [`Target::matches`] decides whether an origin refers to a target:
//!
//! 1. A wildcard-typed target (`Type::Dynamic`) covers every address below
//!    it, so the origin address is truncated to the target's address length
//!    (and separately to the local address length) before comparison.
//! 2. An origin without constraints only matches typed targets.
//! 3. Otherwise some constraint must accept the target's scope and type.
//! 4. A target with `targetable_from_range` is only reachable through its
//!    local address from origins overlapping that range.
//!
//! The match holds when `(local address matches && range ok) || address
//! matches`, and the constraint check passes.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};

use confsem_core::{Address, Pos, Range, ScopeId, Type};
use confsem_schema::OriginConstraint;

use crate::origin::Origin;

/// A declared, addressable location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Target {
    /// Global address; empty when only reachable locally.
    pub addr: Address,
    /// Address valid only inside `targetable_from_range`, e.g. `count.index`.
    pub local_addr: Address,
    /// Range within which `local_addr` resolves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targetable_from_range: Option<Range>,
    pub scope_id: ScopeId,
    /// Value type; `None` makes the target type-unaware.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<Type>,
    /// Range of the whole declaration.
    pub range: Range,
    /// Range to navigate to, e.g. the block header.
    pub def_range: Range,
    /// Name shown in hover.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested_targets: Vec<Target>,
}

impl Target {
    /// Whether the target's type is the wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.ty.as_ref().is_some_and(Type::is_dynamic)
    }

    /// Whether `origin` refers to this target.
    ///
    /// Direct origins never match.
    pub fn matches(&self, origin: &Origin) -> bool {
        let Some(origin_addr) = origin.address() else {
            return false;
        };

        let (addr, local_addr) = if self.is_wildcard() {
            (
                origin_addr.first_steps(self.addr.len()),
                origin_addr.first_steps(self.local_addr.len()),
            )
        } else {
            (origin_addr.clone(), origin_addr.clone())
        };

        if !self.satisfies(origin.constraints()) {
            return false;
        }

        let range_ok = self
            .targetable_from_range
            .as_ref()
            .map_or(true, |r| r.overlaps(origin.range()));

        (self.local_addr.matches(&local_addr) && range_ok) || self.addr.matches(&addr)
    }

    fn satisfies(&self, constraints: &[OriginConstraint]) -> bool {
        if constraints.is_empty() {
            return self.ty.is_some();
        }
        constraints.iter().any(|c| {
            if !c.of_scope_id.is_empty() && c.of_scope_id != self.scope_id {
                return false;
            }
            match (&self.ty, &c.of_type) {
                (Some(ty), _) if ty.is_dynamic() => true,
                (Some(ty), Some(want)) => ty.is_convertible_to(want),
                (None, None) => true,
                _ => false,
            }
        })
    }

    /// Visit this target and its nested targets depth-first.
    pub fn deep_walk<F>(&self, f: &mut F) -> ControlFlow<()>
    where
        F: FnMut(&Target) -> ControlFlow<()>,
    {
        f(self)?;
        for nested in &self.nested_targets {
            nested.deep_walk(f)?;
        }
        ControlFlow::Continue(())
    }

    fn innermost_at_pos(&self, filename: &str, pos: Pos) -> Option<&Target> {
        if self.range.filename != filename || !self.range.contains_pos(pos) {
            return None;
        }
        self.nested_targets
            .iter()
            .find_map(|t| t.innermost_at_pos(filename, pos))
            .or(Some(self))
    }
}

/// A forest of targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Targets(Vec<Target>);

impl Targets {
    pub fn new(targets: Vec<Target>) -> Self {
        Self(targets)
    }

    pub fn push(&mut self, target: Target) {
        self.0.push(target);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every target in the forest matching `origin`, depth-first, and
    /// whether there were any.
    pub fn match_origin(&self, origin: &Origin) -> (Vec<&Target>, bool) {
        let mut matches = Vec::new();
        for target in &self.0 {
            collect_matches(target, origin, &mut matches);
        }
        let found = !matches.is_empty();
        (matches, found)
    }

    /// Visit every target depth-first until `f` breaks.
    pub fn deep_walk<F>(&self, mut f: F) -> ControlFlow<()>
    where
        F: FnMut(&Target) -> ControlFlow<()>,
    {
        for target in &self.0 {
            target.deep_walk(&mut f)?;
        }
        ControlFlow::Continue(())
    }

    /// The most deeply nested target whose range contains `pos`.
    pub fn innermost_at_pos(&self, filename: &str, pos: Pos) -> Option<&Target> {
        self.0.iter().find_map(|t| t.innermost_at_pos(filename, pos))
    }

    /// Top-level targets declared in `filename`.
    pub fn outermost_in_file(&self, filename: &str) -> Vec<&Target> {
        self.0
            .iter()
            .filter(|t| t.range.filename == filename)
            .collect()
    }
}

fn collect_matches<'a>(target: &'a Target, origin: &Origin, out: &mut Vec<&'a Target>) {
    if target.matches(origin) {
        out.push(target);
    }
    for nested in &target.nested_targets {
        collect_matches(nested, origin, out);
    }
}

impl<'a> IntoIterator for &'a Targets {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Target> for Targets {
    fn from_iter<I: IntoIterator<Item = Target>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Target> for Targets {
    fn extend<I: IntoIterator<Item = Target>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::{DirectOrigin, LocalOrigin};
    use confsem_core::Path;

    fn range(start: usize, end: usize) -> Range {
        Range::new("main.tf", Pos::new(1, start + 1, start), Pos::new(1, end + 1, end))
    }

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    fn origin(a: &str, r: Range, constraints: Vec<OriginConstraint>) -> Origin {
        LocalOrigin {
            addr: addr(a),
            range: r,
            constraints,
        }
        .into()
    }

    fn any() -> Vec<OriginConstraint> {
        vec![OriginConstraint::of_type(Type::Dynamic)]
    }

    fn count_index(scope: Range) -> Target {
        Target {
            local_addr: addr("count.index"),
            targetable_from_range: Some(scope),
            ty: Some(Type::Number),
            ..Default::default()
        }
    }

    #[test]
    fn count_index_only_within_its_body() {
        let target = count_index(range(10, 50));
        let constraints = vec![OriginConstraint::of_type(Type::Number)];
        assert!(target.matches(&origin("count.index", range(20, 31), constraints.clone())));
        assert!(!target.matches(&origin("count.index", range(60, 71), constraints)));
    }

    #[test]
    fn empty_origin_range_never_overlaps() {
        let target = count_index(range(10, 50));
        assert!(!target.matches(&origin("count.index", range(20, 20), any())));
    }

    #[test]
    fn wildcard_target_covers_deeper_addresses() {
        let target = Target {
            addr: addr("var.foo"),
            ty: Some(Type::Dynamic),
            ..Default::default()
        };
        assert!(target.matches(&origin("var.foo.bar.baz", range(0, 15), any())));
        assert!(!target.matches(&origin("var.fob.bar", range(0, 11), any())));

        let typed = Target {
            ty: Some(Type::String),
            ..target
        };
        assert!(!typed.matches(&origin("var.foo.bar.baz", range(0, 15), any())));
    }

    #[test]
    fn unconstrained_origin_needs_typed_target() {
        let untyped = Target {
            addr: addr("aws_instance.web"),
            ..Default::default()
        };
        assert!(!untyped.matches(&origin("aws_instance.web", range(0, 16), vec![])));

        let typed = Target {
            ty: Some(Type::object([("id", Type::String)])),
            ..untyped
        };
        assert!(typed.matches(&origin("aws_instance.web", range(0, 16), vec![])));
    }

    #[test]
    fn scope_and_type_constraints() {
        let target = Target {
            addr: addr("var.region"),
            scope_id: ScopeId::new("variable"),
            ty: Some(Type::String),
            ..Default::default()
        };
        let scoped = |scope: &str, ty: Type| vec![OriginConstraint::scoped(scope, Some(ty))];
        assert!(target.matches(&origin("var.region", range(0, 10), scoped("variable", Type::String))));
        assert!(!target.matches(&origin("var.region", range(0, 10), scoped("resource", Type::String))));
        assert!(!target.matches(&origin("var.region", range(0, 10), scoped("variable", Type::list(Type::String)))));
        assert!(target.matches(&origin("var.region", range(0, 10), scoped("", Type::Number))));
    }

    #[test]
    fn type_unaware_pairs() {
        let target = Target {
            addr: addr("local.x"),
            ..Default::default()
        };
        let untyped = vec![OriginConstraint::scoped("", None)];
        assert!(target.matches(&origin("local.x", range(0, 7), untyped)));
        assert!(!target.matches(&origin("local.x", range(0, 7), any())));
    }

    #[test]
    fn direct_origin_never_matches() {
        let target = Target {
            addr: addr("var.x"),
            ty: Some(Type::Dynamic),
            ..Default::default()
        };
        let direct = Origin::Direct(DirectOrigin {
            range: range(0, 5),
            target_path: Path::default(),
            target_range: Range::default(),
        });
        assert!(!target.matches(&direct));
    }

    fn chain(depth: usize) -> Target {
        let mut target = Target {
            addr: addr("a.l0"),
            ty: Some(Type::String),
            range: range(0, 100),
            ..Default::default()
        };
        let mut path = "a.l0".to_string();
        let mut inner = Vec::new();
        for level in 1..=depth {
            path.push_str(&format!(".l{level}"));
            inner.push(Target {
                addr: addr(&path),
                ty: Some(Type::String),
                range: range(level, 100 - level),
                ..Default::default()
            });
        }
        while let Some(last) = inner.pop() {
            match inner.last_mut() {
                Some(child) => child.nested_targets.push(last),
                None => target.nested_targets.push(last),
            }
        }
        target
    }

    #[test]
    fn match_finds_nested_at_depth() {
        let targets = Targets::new(vec![chain(3)]);
        let (found, any_found) = targets.match_origin(&origin(
            "a.l0.l1.l2.l3",
            range(0, 5),
            vec![OriginConstraint::of_type(Type::String)],
        ));
        assert!(any_found);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].addr.to_string(), "a.l0.l1.l2.l3");

        let (none, any_found) = targets.match_origin(&origin("a.l9", range(0, 5), any()));
        assert!(none.is_empty() && !any_found);
    }

    #[test]
    fn deep_walk_stops_on_break() {
        let targets = Targets::new(vec![chain(3), chain(1)]);
        let mut seen = 0;
        let flow = targets.deep_walk(|t| {
            seen += 1;
            if t.addr.len() == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(flow, ControlFlow::Break(()));
        assert_eq!(seen, 2);

        let mut total = 0;
        let _ = targets.deep_walk(|_| {
            total += 1;
            ControlFlow::Continue(())
        });
        assert_eq!(total, 6);
    }

    #[test]
    fn position_queries() {
        let targets = Targets::new(vec![chain(2)]);
        let inner = targets.innermost_at_pos("main.tf", Pos::new(1, 51, 50)).unwrap();
        assert_eq!(inner.addr.to_string(), "a.l0.l1.l2");
        let outer = targets.innermost_at_pos("main.tf", Pos::new(1, 1, 0)).unwrap();
        assert_eq!(outer.addr.to_string(), "a.l0");
        assert!(targets.innermost_at_pos("other.tf", Pos::new(1, 1, 0)).is_none());

        assert_eq!(targets.outermost_in_file("main.tf").len(), 1);
        assert!(targets.outermost_in_file("other.tf").is_empty());
    }
}
