//! Key-addressed graph of positioned vertices
//!
//! Thin layer over a petgraph undirected graph. Payloads and positions live
//! in a side table keyed by [`Key`], petgraph holds the adjacency.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

use super::key::Key;
use super::types::{Point, SimError, SimResult};

/// A vertex record: the payload and where it sits on the map
#[derive(Debug, Clone)]
pub struct Vertex<V> {
    pub payload: V,
    pub position: Point,
    node: NodeIndex,
}

/// Generic graph keyed by [`Key`]
#[derive(Debug)]
pub struct Graph<V> {
    /// Adjacency between vertices, node weights are the vertex keys
    adjacency: UnGraph<Key, ()>,

    /// Vertex records by key
    vertices: HashMap<Key, Vertex<V>>,
}

impl<V> Default for Graph<V> {
    fn default() -> Self {
        Self {
            adjacency: UnGraph::default(),
            vertices: HashMap::new(),
        }
    }
}

impl<V> Graph<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex. Each key can only be inserted once.
    pub fn add_vertex(&mut self, key: Key, payload: V, position: Point) -> SimResult<()> {
        if self.vertices.contains_key(&key) {
            return Err(SimError::DuplicateKey(key));
        }

        let node = self.adjacency.add_node(key);
        self.vertices.insert(
            key,
            Vertex {
                payload,
                position,
                node,
            },
        );
        Ok(())
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.vertices.contains_key(key)
    }

    pub fn get_vertex(&self, key: &Key) -> SimResult<&Vertex<V>> {
        self.vertices.get(key).ok_or(SimError::KeyNotFound(*key))
    }

    pub fn get_payload(&self, key: &Key) -> SimResult<&V> {
        self.get_vertex(key).map(|vertex| &vertex.payload)
    }

    pub fn get_payload_mut(&mut self, key: &Key) -> SimResult<&mut V> {
        self.vertices
            .get_mut(key)
            .map(|vertex| &mut vertex.payload)
            .ok_or(SimError::KeyNotFound(*key))
    }

    /// Gets the position of a vertex
    pub fn get_vertex_coordinates(&self, key: &Key) -> SimResult<Point> {
        self.get_vertex(key).map(|vertex| vertex.position)
    }

    /// Moves a vertex. Only the simulation step relocates vertices.
    pub(crate) fn move_vertex(&mut self, key: &Key, position: Point) -> SimResult<()> {
        let vertex = self
            .vertices
            .get_mut(key)
            .ok_or(SimError::KeyNotFound(*key))?;
        vertex.position = position;
        Ok(())
    }

    /// Connects two vertices. Adding an existing edge is a no-op.
    pub fn add_edge(&mut self, a: &Key, b: &Key) -> SimResult<()> {
        let a_node = self.get_vertex(a)?.node;
        let b_node = self.get_vertex(b)?.node;

        if self.adjacency.find_edge(a_node, b_node).is_none() {
            self.adjacency.add_edge(a_node, b_node, ());
        }
        Ok(())
    }

    /// Removes the edge between two vertices, returns whether one existed
    pub fn remove_edge(&mut self, a: &Key, b: &Key) -> SimResult<bool> {
        let a_node = self.get_vertex(a)?.node;
        let b_node = self.get_vertex(b)?.node;

        match self.adjacency.find_edge(a_node, b_node) {
            Some(edge) => {
                self.adjacency.remove_edge(edge);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes every edge touching a vertex
    pub fn clear_edges(&mut self, key: &Key) -> SimResult<()> {
        let node = self.get_vertex(key)?.node;
        // Edge indices shift on removal, so look the next one up each time
        loop {
            let next = self.adjacency.edges(node).next().map(|edge| edge.id());
            match next {
                Some(edge) => {
                    self.adjacency.remove_edge(edge);
                }
                None => return Ok(()),
            }
        }
    }

    pub fn has_edge(&self, a: &Key, b: &Key) -> bool {
        match (self.vertices.get(a), self.vertices.get(b)) {
            (Some(a), Some(b)) => self.adjacency.find_edge(a.node, b.node).is_some(),
            _ => false,
        }
    }

    /// Gets the keys of all vertices adjacent to `key`
    pub fn neighbors(&self, key: &Key) -> SimResult<Vec<Key>> {
        let node = self.get_vertex(key)?.node;
        Ok(self
            .adjacency
            .neighbors(node)
            .map(|neighbor| self.adjacency[neighbor])
            .collect())
    }

    /// Get number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get number of edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.edge_count()
    }

    /// Iterate over every vertex, in no particular order
    pub fn vertices(&self) -> impl Iterator<Item = (&Key, &Vertex<V>)> {
        self.vertices.iter()
    }
}
