//! # Addresses
//!
//! An [`Address`] is the structural path of a referenceable location, e.g.
//! `var.region`, `aws_instance.web[0].id` or `each.value["name"]`. It is
//! independent of how the location was reached in source.
//!
//! ## Matching Semantics
//!
//! [`Address::matches`] compares step renderings pairwise and never considers
//! two empty addresses equal. An empty address means "no address declared",
//! which must not collide with another undeclared address. The derived
//! `PartialEq` is plain structural equality for containers and tests.
//!
//! Addresses are serialized as their string rendering so descriptors can
//! write them the way they appear in configuration source. String index
//! keys are written as JSON string literals, so `Display` and `FromStr`
//! are exact inverses for any key text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AddressError;

/// Key of an index step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    /// `["name"]`
    String(String),
    /// `[0]`
    Number(i64),
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::String(s) => {
                let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
                f.write_str(&quoted)
            }
            IndexKey::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A single address step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AddrStep {
    /// The leading name, e.g. `var`.
    Root(String),
    /// An attribute access, e.g. `.region`.
    Attr(String),
    /// An index access, e.g. `[0]`.
    Index(IndexKey),
}

impl AddrStep {
    /// Textual rendering used for step comparison.
    ///
    /// Root and attribute steps render as their bare name; index steps as
    /// the bracketed key.
    pub fn text(&self) -> String {
        match self {
            AddrStep::Root(name) | AddrStep::Attr(name) => name.clone(),
            AddrStep::Index(key) => format!("[{key}]"),
        }
    }
}

/// An ordered sequence of address steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Address(Vec<AddrStep>);

impl Address {
    /// Build an address from steps.
    pub fn new(steps: Vec<AddrStep>) -> Self {
        Self(steps)
    }

    /// An address with a single root step.
    pub fn root(name: impl Into<String>) -> Self {
        Self(vec![AddrStep::Root(name.into())])
    }

    /// Return a new address with an attribute step appended.
    pub fn attr(&self, name: impl Into<String>) -> Self {
        self.with_step(AddrStep::Attr(name.into()))
    }

    /// Return a new address with an index step appended.
    pub fn index(&self, key: IndexKey) -> Self {
        self.with_step(AddrStep::Index(key))
    }

    /// Return a new address with `step` appended.
    pub fn with_step(&self, step: AddrStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    /// The steps of this address.
    pub fn steps(&self) -> &[AddrStep] {
        &self.0
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the address has no steps.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A copy of at most the first `n` steps.
    pub fn first_steps(&self, n: usize) -> Self {
        Self(self.0.iter().take(n).cloned().collect())
    }

    /// Whether `self` is a strict or non-strict prefix of `other`.
    pub fn is_prefix_of(&self, other: &Address) -> bool {
        self.len() <= other.len() && other.first_steps(self.len()).matches(self)
    }

    /// Matching equality: same non-zero length and pairwise equal step renderings.
    pub fn matches(&self, other: &Address) -> bool {
        if self.is_empty() || self.len() != other.len() {
            return false;
        }
        self.0
            .iter()
            .zip(&other.0)
            .all(|(a, b)| a.text() == b.text())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            match step {
                AddrStep::Root(name) => f.write_str(name)?,
                AddrStep::Attr(name) if i == 0 => f.write_str(name)?,
                AddrStep::Attr(name) => write!(f, ".{name}")?,
                AddrStep::Index(key) => write!(f, "[{key}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Parse `root(.attr | [number] | ["string"])*`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Ok(Address::default());
        }

        let malformed = |position: usize| AddressError::Malformed {
            input: input.to_string(),
            position,
        };
        let bytes = input.as_bytes();
        let is_name = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'-';
        let read_name = |start: usize| {
            let mut end = start;
            while end < bytes.len() && is_name(bytes[end]) {
                end += 1;
            }
            end
        };

        let mut steps = Vec::new();
        let end = read_name(0);
        if end == 0 {
            return Err(malformed(0));
        }
        steps.push(AddrStep::Root(input[..end].to_string()));

        let mut pos = end;
        while pos < bytes.len() {
            match bytes[pos] {
                b'.' => {
                    let end = read_name(pos + 1);
                    if end == pos + 1 {
                        return Err(malformed(pos + 1));
                    }
                    steps.push(AddrStep::Attr(input[pos + 1..end].to_string()));
                    pos = end;
                }
                b'[' => {
                    let (key, close) = if bytes.get(pos + 1) == Some(&b'"') {
                        let end = closing_quote(bytes, pos + 1).ok_or_else(|| malformed(pos + 1))?;
                        let key: String = serde_json::from_str(&input[pos + 1..=end])
                            .map_err(|_| malformed(pos + 1))?;
                        (IndexKey::String(key), end + 1)
                    } else {
                        let close = input[pos..]
                            .find(']')
                            .map(|i| pos + i)
                            .ok_or_else(|| malformed(pos))?;
                        let n = input[pos + 1..close].parse().map_err(|_| malformed(pos + 1))?;
                        (IndexKey::Number(n), close)
                    };
                    if bytes.get(close) != Some(&b']') {
                        return Err(malformed(close));
                    }
                    steps.push(AddrStep::Index(key));
                    pos = close + 1;
                }
                _ => return Err(malformed(pos)),
            }
        }

        Ok(Address(steps))
    }
}

/// Byte offset of the quote closing the string literal opened at `open`.
fn closing_quote(bytes: &[u8], open: usize) -> Option<usize> {
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
