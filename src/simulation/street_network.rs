//! Street adjacency graph for pathfinding

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::{VisitMap, Visitable};
use std::collections::{HashMap, VecDeque};

use super::types::Coordinate;

/// Undirected graph of streets, one edge per pair of axis-adjacent streets
#[derive(Debug, Default, Clone)]
pub struct StreetNetwork {
    /// The underlying petgraph graph
    graph: UnGraph<Coordinate, ()>,

    /// Maps street coordinates to their node indices in the graph
    coordinate_to_node: HashMap<Coordinate, NodeIndex>,
}

impl StreetNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a street and connects it to already known neighbors
    pub fn add_street(&mut self, coordinate: Coordinate, neighbors: &[Coordinate]) {
        if self.coordinate_to_node.contains_key(&coordinate) {
            return;
        }

        let node = self.graph.add_node(coordinate);
        self.coordinate_to_node.insert(coordinate, node);

        for neighbor in neighbors {
            if let Some(&neighbor_node) = self.coordinate_to_node.get(neighbor) {
                self.graph.update_edge(node, neighbor_node, ());
            }
        }
    }

    /// Finds a street path with the fewest hops using breadth-first search
    ///
    /// The returned path starts with `start` and ends with `target`. Among
    /// equally short paths the one discovered first wins, visiting neighbors
    /// north, west, east, south.
    pub fn find_path(&self, start: Coordinate, target: Coordinate) -> Option<Vec<Coordinate>> {
        let start_node = *self.coordinate_to_node.get(&start)?;
        let target_node = *self.coordinate_to_node.get(&target)?;

        let mut predecessors: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut discovered = self.graph.visit_map();
        discovered.visit(start_node);
        let mut queue = VecDeque::from([start_node]);

        while let Some(node) = queue.pop_front() {
            if node == target_node {
                let mut path = vec![self.graph[node]];
                let mut current = node;
                while let Some(&previous) = predecessors.get(&current) {
                    path.push(self.graph[previous]);
                    current = previous;
                }
                path.reverse();
                return Some(path);
            }

            for neighbor in self.ordered_neighbors(node) {
                if discovered.visit(neighbor) {
                    predecessors.insert(neighbor, node);
                    queue.push_back(neighbor);
                }
            }
        }

        None
    }

    /// Neighbors of a street sorted row-major, which for axis-adjacent
    /// streets is north, west, east, south
    fn ordered_neighbors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        neighbors.sort_by_key(|neighbor| self.graph[*neighbor]);
        neighbors
    }

    /// Get number of streets
    pub fn street_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get number of street connections
    pub fn connection_count(&self) -> usize {
        self.graph.edge_count()
    }
}
