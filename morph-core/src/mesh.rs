//! Mesh topologies for the morph engine.
//!
//! A [`Mesh`] is a flat array of node positions plus an undirected edge
//! list over node indices. Two generators are provided: a regular square
//! lattice over the unit square and a concentric radial lattice. Both are
//! deterministic given their parameters.

use glam::Vec2;
use std::f32::consts::TAU;

use crate::types::NodeId;

/// Node positions plus the cohesion adjacency edge list.
///
/// Edges are unordered index pairs; every index must be `< grid.len()`.
/// The edge list never changes during a morph run, only positions do.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub grid: Vec<Vec2>,
    pub edges: Vec<[NodeId; 2]>,
}

/// Which generator to use for a fresh mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    Square,
    Circle,
}

impl Topology {
    /// Builds a mesh of this topology with the given resolution parameter
    /// (`n_side` for [`Mesh::square`], `n_nodes` for [`Mesh::circle`]).
    pub fn build(self, n: usize) -> Mesh {
        match self {
            Topology::Square => Mesh::square(n),
            Topology::Circle => Mesh::circle(n),
        }
    }
}

impl Mesh {
    /// Regular `n_side × n_side` lattice covering the unit square.
    ///
    /// Nodes are laid out row-major: node `r * n_side + c` sits at
    /// `(c / (n_side - 1), r / (n_side - 1))`. Each node is connected to
    /// its right and below neighbors, giving a 4-connected interior.
    /// `n_side == 1` degenerates to a single node at the origin.
    ///
    /// ### Panics
    /// Panics if `n_side == 0`.
    pub fn square(n_side: usize) -> Self {
        assert!(n_side >= 1, "square mesh needs at least one node per side");

        let denom = (n_side - 1).max(1) as f32;
        let mut grid = Vec::with_capacity(n_side * n_side);
        let mut edges = Vec::new();

        for r in 0..n_side {
            for c in 0..n_side {
                grid.push(Vec2::new(c as f32 / denom, r as f32 / denom));

                let idx = r * n_side + c;
                if c < n_side - 1 {
                    edges.push([idx, idx + 1]);
                }
                if r < n_side - 1 {
                    edges.push([idx, idx + n_side]);
                }
            }
        }

        Self { grid, edges }
    }

    /// Concentric radial lattice: `n_nodes / 2 + 1` rings at radii evenly
    /// spaced in `[0.1, 1.0]`, each holding `n_nodes` points at evenly
    /// spaced angles, plus a center node at index 0.
    ///
    /// Edges close each ring into a cycle, connect adjacent rings at equal
    /// angular index (radial spokes), and connect the center to every node
    /// on the innermost ring. Ring `i` occupies indices
    /// `1 + i * n_nodes .. 1 + (i + 1) * n_nodes`.
    ///
    /// ### Panics
    /// Panics if `n_nodes == 0`.
    pub fn circle(n_nodes: usize) -> Self {
        assert!(n_nodes >= 1, "circle mesh needs at least one node per ring");

        let n_rings = n_nodes / 2 + 1;
        let radius_at = |i: usize| {
            if n_rings == 1 {
                0.1
            } else {
                0.1 + 0.9 * i as f32 / (n_rings - 1) as f32
            }
        };

        let mut grid = Vec::with_capacity(1 + n_rings * n_nodes);
        grid.push(Vec2::ZERO);
        for i in 0..n_rings {
            let radius = radius_at(i);
            for j in 0..n_nodes {
                let angle = j as f32 * TAU / n_nodes as f32;
                grid.push(radius * Vec2::new(angle.cos(), angle.sin()));
            }
        }

        let mut edges = Vec::new();

        // Ring closure: each angular position to its cyclic successor.
        // A one-node ring has no cycle, so no self-loop is emitted.
        if n_nodes > 1 {
            for i in 0..n_rings {
                let start = 1 + i * n_nodes;
                for j in 0..n_nodes {
                    edges.push([start + j, start + (j + 1) % n_nodes]);
                }
            }
        }

        // Radial spokes between consecutive rings.
        for j in 0..n_nodes {
            for i in 0..n_rings - 1 {
                edges.push([1 + i * n_nodes + j, 1 + (i + 1) * n_nodes + j]);
            }
        }

        // Center node to the innermost ring.
        for j in 0..n_nodes {
            edges.push([0, 1 + j]);
        }

        Self { grid, edges }
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }
}

/// Builds per-node neighbor lists from an undirected edge list.
///
/// Each edge `[a, b]` makes `b` a neighbor of `a` and vice versa.
/// Duplicate edges are kept as-is; a doubled edge simply weighs its
/// endpoint twice in the neighbor centroid.
///
/// ### Panics
/// Panics if an edge index is `>= n`. The morph entry point validates
/// edges before calling this.
pub fn neighbor_lists(edges: &[[NodeId; 2]], n: usize) -> Vec<Vec<NodeId>> {
    let mut neighbors = vec![Vec::new(); n];
    for &[a, b] in edges {
        neighbors[a].push(b);
        neighbors[b].push(a);
    }
    neighbors
}
