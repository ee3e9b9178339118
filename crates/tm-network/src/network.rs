//! Contact network storage.
//!
//! # Data layout
//!
//! Vertices live in an id-indexed arena, tombstoned on removal.  Edges live
//! in an ordered map keyed by id, so storage tracks the live edge count no
//! matter how much the network churns:
//!
//! ```text
//! adjacency[person.index()] = Some(vec![edge ids incident to person])  // vertex
//!                           = None                                      // not a vertex
//! edges                     = { EdgeId → Edge }                         // live edges only
//! ```
//!
//! Edge ids come from a counter and are never reused.  Iteration over
//! vertices and edges is in ascending id order, which is also insertion
//! order, so a scan over the network is deterministic.
//!
//! Edges are stored with an orientation (`v1`, `v2`) as they were added;
//! [`ContactNetwork::has_edge`] respects that orientation.  At most one edge
//! of each type may join the same pair of persons.

use std::collections::BTreeMap;

use tm_core::{EdgeId, PersonId};

use crate::{CondomUse, Edge, EdgeType, NetworkError, NetworkResult};

#[derive(Clone, Debug, Default)]
pub struct ContactNetwork {
    adjacency:    Vec<Option<Vec<EdgeId>>>,
    edges:        BTreeMap<EdgeId, Edge>,
    next_edge:    u32,
    vertex_count: usize,
    edge_counts:  [usize; 2],
}

impl ContactNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edge_count(&self, kind: EdgeType) -> usize {
        self.edge_counts[kind.index()]
    }

    pub fn total_edge_count(&self) -> usize {
        self.edge_counts[0] + self.edge_counts[1]
    }

    // ── Vertices ──────────────────────────────────────────────────────────

    pub fn add_vertex(&mut self, person: PersonId) -> NetworkResult<()> {
        let idx = person.index();
        if idx >= self.adjacency.len() {
            self.adjacency.resize_with(idx + 1, || None);
        }
        if self.adjacency[idx].is_some() {
            return Err(NetworkError::DuplicateVertex(person));
        }
        self.adjacency[idx] = Some(Vec::new());
        self.vertex_count += 1;
        Ok(())
    }

    /// Remove a vertex and every edge incident to it.  Returns the removed
    /// edges in ascending id order.
    pub fn remove_vertex(&mut self, person: PersonId) -> NetworkResult<Vec<Edge>> {
        let incident = self
            .adjacency
            .get_mut(person.index())
            .and_then(Option::take)
            .ok_or(NetworkError::VertexNotFound(person))?;
        self.vertex_count -= 1;

        let mut removed = Vec::with_capacity(incident.len());
        for edge_id in incident {
            if let Some(edge) = self.detach_edge(edge_id) {
                removed.push(edge);
            }
        }
        removed.sort_unstable_by_key(|e| e.id);
        Ok(removed)
    }

    #[inline]
    pub fn contains_vertex(&self, person: PersonId) -> bool {
        matches!(self.adjacency.get(person.index()), Some(Some(_)))
    }

    /// Vertices in ascending id order.
    pub fn vertices(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| PersonId(i as u32))
    }

    // ── Edges ─────────────────────────────────────────────────────────────

    /// Add an edge `v1 → v2` and return its id.
    pub fn add_edge(
        &mut self,
        v1: PersonId,
        v2: PersonId,
        kind: EdgeType,
        condom: CondomUse,
    ) -> NetworkResult<EdgeId> {
        if v1 == v2 {
            return Err(NetworkError::SelfLoop(v1));
        }
        for v in [v1, v2] {
            if !self.contains_vertex(v) {
                return Err(NetworkError::VertexNotFound(v));
            }
        }
        if self.has_edge(v1, v2, kind) || self.has_edge(v2, v1, kind) {
            return Err(NetworkError::DuplicateEdge { v1, v2, kind });
        }

        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        self.edges.insert(id, Edge { id, v1, v2, kind, condom });
        for v in [v1, v2] {
            if let Some(Some(list)) = self.adjacency.get_mut(v.index()) {
                list.push(id);
            }
        }
        self.edge_counts[kind.index()] += 1;
        Ok(id)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> NetworkResult<Edge> {
        self.detach_edge(id).ok_or(NetworkError::EdgeNotFound(id))
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    #[inline]
    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(&id)
    }

    /// All edges in ascending id order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    /// Edges of one type in ascending id order.
    pub fn edges_of_type(&self, kind: EdgeType) -> impl Iterator<Item = &Edge> + '_ {
        self.edges().filter(move |e| e.kind == kind)
    }

    /// Edges incident to `person`, in the order they were added.  Empty if
    /// `person` is not a vertex.
    pub fn edges_of(&self, person: PersonId) -> impl Iterator<Item = &Edge> + '_ {
        let ids: &[EdgeId] = match self.adjacency.get(person.index()) {
            Some(Some(list)) => list,
            _ => &[],
        };
        ids.iter().filter_map(|&id| self.edge(id))
    }

    /// Ids of the edges incident to `person`.
    pub fn edge_ids_of(&self, person: PersonId) -> Vec<EdgeId> {
        self.edges_of(person).map(|e| e.id).collect()
    }

    /// `true` if an edge `v1 → v2` of type `kind` exists.
    pub fn has_edge(&self, v1: PersonId, v2: PersonId, kind: EdgeType) -> bool {
        self.edges_of(v1).any(|e| e.kind == kind && e.v1 == v1 && e.v2 == v2)
    }

    /// Number of edges of the less numerous type whose endpoints are also
    /// joined, in either orientation, by an edge of the other type.  Ties
    /// count casual edges.
    pub fn count_overlaps(&self) -> usize {
        let target = if self.edge_count(EdgeType::Steady) < self.edge_count(EdgeType::Casual) {
            EdgeType::Steady
        } else {
            EdgeType::Casual
        };
        let other = target.other();
        self.edges_of_type(target)
            .filter(|e| self.has_edge(e.v1, e.v2, other) || self.has_edge(e.v2, e.v1, other))
            .count()
    }

    // ── Internal ──────────────────────────────────────────────────────────

    /// Number of edges held in storage, live or not.
    #[cfg(test)]
    pub(crate) fn stored_edges(&self) -> usize {
        self.edges.len()
    }

    /// Drop an edge from storage and from the adjacency of whichever
    /// endpoints are still vertices.
    fn detach_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(&id)?;
        self.edge_counts[edge.kind.index()] -= 1;
        for v in [edge.v1, edge.v2] {
            if let Some(Some(list)) = self.adjacency.get_mut(v.index()) {
                list.retain(|&e| e != id);
            }
        }
        Some(edge)
    }
}
