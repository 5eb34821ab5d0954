//! (d-2)-faces shared by two facets during hull updates.

use super::vertex::Vertex;
use std::sync::Arc;

/// Unordered set of d-1 vertices; stored sorted so equality and hashing
/// ignore construction order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ridge {
    vertices: Vec<Arc<Vertex>>,
}

impl Ridge {
    pub fn new(mut vertices: Vec<Arc<Vertex>>) -> Self {
        vertices.sort();
        Self { vertices }
    }

    #[inline]
    pub fn vertices(&self) -> &[Arc<Vertex>] {
        &self.vertices
    }

    #[inline]
    pub fn contains(&self, v: &Vertex) -> bool {
        self.vertices
            .binary_search_by(|x| x.as_ref().cmp(v))
            .is_ok()
    }
}
