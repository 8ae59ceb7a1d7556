//! Canonical rotation of cycles.
//!
//! The same cycle is discovered with a different starting member depending on
//! where the search was rooted. Rotating every cycle so it starts at the
//! member with the smallest name gives each logical cycle exactly one
//! representation. Cycles are directed, so only rotation is applied; a
//! reversed sequence would describe links that generally do not exist.

use crate::graph::cycles::RawCycle;
use crate::model::{ConceptId, Influence, LoopKind, Polarity};
use crate::registry::ConceptRegistry;

/// A cycle in canonical rotation.
///
/// `signs[i]` is the sign of `members[i] → members[(i + 1) % size]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalLoop {
    members: Vec<ConceptId>,
    signs: Vec<Influence>,
}

impl CanonicalLoop {
    #[must_use]
    pub fn members(&self) -> &[ConceptId] {
        &self.members
    }

    #[must_use]
    pub fn signs(&self) -> &[Influence] {
        &self.signs
    }

    /// Number of links (equal to the number of members).
    #[must_use]
    pub fn size(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn negative_links(&self) -> usize {
        self.signs.iter().filter(|sign| sign.is_negative()).count()
    }

    #[must_use]
    pub fn polarity(&self) -> Polarity {
        Polarity::from_negative_links(self.negative_links())
    }

    #[must_use]
    pub fn kind(&self) -> LoopKind {
        LoopKind::from_negative_links(self.negative_links())
    }

    #[must_use]
    pub fn contains(&self, concept: ConceptId) -> bool {
        self.members.contains(&concept)
    }

    /// Links along the loop as `(source, target, sign)`, wrap-around included.
    pub fn links(&self) -> impl Iterator<Item = (ConceptId, ConceptId, Influence)> + '_ {
        let size = self.members.len();
        self.members
            .iter()
            .zip(&self.signs)
            .enumerate()
            .map(move |(i, (&source, &sign))| (source, self.members[(i + 1) % size], sign))
    }

    /// Compact rendering such as `A +> B -> C +> A`.
    #[must_use]
    pub fn describe(&self, registry: &ConceptRegistry) -> String {
        let mut out = String::new();
        for (source, _, sign) in self.links() {
            out.push_str(registry.name(source));
            out.push(' ');
            out.push(sign.glyph());
            out.push_str("> ");
        }
        if let Some(&first) = self.members.first() {
            out.push_str(registry.name(first));
        }
        out
    }
}

/// Rotates raw cycles into canonical form.
#[derive(Debug, Clone, Copy)]
pub struct LoopCanonicalizer<'r> {
    registry: &'r ConceptRegistry,
}

impl<'r> LoopCanonicalizer<'r> {
    #[must_use]
    pub const fn new(registry: &'r ConceptRegistry) -> Self {
        Self { registry }
    }

    /// Rotate `cycle` to start at its smallest-named member.
    #[must_use]
    pub fn canonicalize(&self, cycle: &RawCycle) -> CanonicalLoop {
        let start = self.start_offset(&cycle.members);
        let mut members = cycle.members.clone();
        let mut signs = cycle.signs.clone();
        members.rotate_left(start);
        signs.rotate_left(start);
        CanonicalLoop { members, signs }
    }

    /// Re-canonicalize an existing loop. Always returns an equal loop.
    #[must_use]
    pub fn recanonicalize(&self, lp: &CanonicalLoop) -> CanonicalLoop {
        self.canonicalize(&RawCycle {
            members: lp.members.clone(),
            signs: lp.signs.clone(),
        })
    }

    fn start_offset(&self, members: &[ConceptId]) -> usize {
        members
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| self.registry.compare(**a, **b))
            .map_or(0, |(idx, _)| idx)
    }
}
