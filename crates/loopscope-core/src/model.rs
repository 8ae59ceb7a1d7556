//! Primitive value types shared by every stage of the analysis.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle for a concept registered in a [`crate::registry::ConceptRegistry`].
///
/// Ids are dense and issued in first-seen order. They are only meaningful
/// together with the registry that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConceptId(usize);

impl ConceptId {
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Position of this concept in its registry.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Handle for a loop inside a [`crate::loops::LoopSet`].
///
/// Loop ids follow canonical-sequence order: comparing two ids compares the
/// loops' canonical name sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoopId(usize);

impl LoopId {
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LoopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Sign of a causal link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Influence {
    /// `+1`: more of the source means more of the target.
    Increases,
    /// `-1`: more of the source means less of the target.
    Decreases,
}

impl Influence {
    /// Map a numeric sign to an influence. Only `+1` and `-1` are valid.
    #[must_use]
    pub const fn from_sign(sign: i32) -> Option<Self> {
        match sign {
            1 => Some(Self::Increases),
            -1 => Some(Self::Decreases),
            _ => None,
        }
    }

    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::Increases => 1,
            Self::Decreases => -1,
        }
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        matches!(self, Self::Decreases)
    }

    /// Stable label used in exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increases => "INCREASES",
            Self::Decreases => "DECREASES",
        }
    }

    /// Single-character glyph used in compact loop renderings.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Increases => '+',
            Self::Decreases => '-',
        }
    }
}

impl fmt::Display for Influence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behavioural type of a feedback loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopKind {
    /// Even number of negative links: amplifies change.
    Reinforcing,
    /// Odd number of negative links: dampens change.
    Balancing,
}

impl LoopKind {
    #[must_use]
    pub const fn from_negative_links(count: usize) -> Self {
        if count % 2 == 0 {
            Self::Reinforcing
        } else {
            Self::Balancing
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reinforcing => "reinforcing",
            Self::Balancing => "balancing",
        }
    }
}

impl fmt::Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parity of the negative links along a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    #[must_use]
    pub const fn from_negative_links(count: usize) -> Self {
        if count % 2 == 0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }
}

/// One `(source, target, sign)` relation as produced by an input loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
    pub source: String,
    pub target: String,
    pub sign: i32,
}

impl Triple {
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>, sign: i32) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            sign,
        }
    }
}
