use std::collections::HashSet;

use super::condition::Condition;
use super::VertexIndex;

slotmap::new_key_type! {
    /// Unique identifier for a domain in a grid model.
    pub struct DomainId;
}

/// Undirected edge key: the smaller vertex index first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(pub VertexIndex, pub VertexIndex);

impl EdgeKey {
    #[must_use]
    pub fn new(a: VertexIndex, b: VertexIndex) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// A 2D boundary curve; owner of a boundary condition.
///
/// A domain is a set of mesh edges. Membership is undirected.
#[derive(Debug, Clone, Default)]
pub struct DomainData {
    pub name: String,
    /// Boundary condition, `None` when the domain is unspecified.
    pub condition: Option<Condition>,
    edges: HashSet<EdgeKey>,
}

impl DomainData {
    /// Creates a new domain with no edges.
    #[must_use]
    pub fn new(name: impl Into<String>, condition: Option<Condition>) -> Self {
        Self {
            name: name.into(),
            condition,
            edges: HashSet::new(),
        }
    }

    /// Adds the edge `(a, b)` to the domain.
    pub fn add_edge(&mut self, a: VertexIndex, b: VertexIndex) {
        self.edges.insert(EdgeKey::new(a, b));
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edges.iter().copied()
    }
}
