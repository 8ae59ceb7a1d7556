//! Name → identity registry for concepts.
//!
//! Every concept name maps to exactly one [`ConceptId`] for the lifetime of
//! the registry. The registry is owned by one [`crate::graph::SignedGraph`],
//! so identities never leak between analysis runs.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::ConceptId;

#[derive(Debug, Clone, Default)]
pub struct ConceptRegistry {
    names: Vec<String>,
    by_name: HashMap<String, ConceptId>,
}

impl ConceptRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `name`, registering it on first sight.
    pub fn intern(&mut self, name: &str) -> ConceptId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = ConceptId::from_index(self.names.len());
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Look up an already-registered name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ConceptId> {
        self.by_name.get(name).copied()
    }

    /// Name of a concept issued by this registry.
    ///
    /// Passing an id this registry never issued is a caller bug: debug builds
    /// panic, release builds yield `""`.
    #[must_use]
    pub fn name(&self, id: ConceptId) -> &str {
        debug_assert!(
            id.index() < self.names.len(),
            "concept id {} not issued by this registry ({} concepts)",
            id.index(),
            self.names.len()
        );
        self.names.get(id.index()).map_or("", String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All concepts in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ConceptId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(idx, name)| (ConceptId::from_index(idx), name.as_str()))
    }

    /// All concept ids sorted by name.
    #[must_use]
    pub fn ids_by_name(&self) -> Vec<ConceptId> {
        let mut ids: Vec<ConceptId> = self.iter().map(|(id, _)| id).collect();
        ids.sort_unstable_by(|a, b| self.compare(*a, *b));
        ids
    }

    /// Total order over concepts: by name, then by id.
    #[must_use]
    pub fn compare(&self, a: ConceptId, b: ConceptId) -> Ordering {
        self.name(a).cmp(self.name(b)).then_with(|| a.cmp(&b))
    }

    /// Compare two concept sequences element-wise by name.
    #[must_use]
    pub fn compare_sequences(&self, a: &[ConceptId], b: &[ConceptId]) -> Ordering {
        a.iter()
            .map(|&id| self.name(id))
            .cmp(b.iter().map(|&id| self.name(id)))
    }
}
