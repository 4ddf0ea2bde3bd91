use crate::types::NodeId;
use glam::Vec2;

/// A temporary buffer holding one displacement vector per node.
///
/// During a relaxation step every node's displacement is computed from the
/// same start-of-step position snapshot and **recorded** here instead of
/// being applied directly. Only after the full node pass does
/// [`DisplacementBuffer::apply_to`] write everything back at once, which is
/// what keeps the update Jacobi-style: no node ever sees another node's
/// already-updated position within the same step.
///
/// Internally, `moves[i]` corresponds to node `i` (where [`NodeId`] is
/// expected to be an index-like type, e.g. `usize`).
#[derive(Debug)]
pub struct DisplacementBuffer {
    /// Pending displacement for each node.
    moves: Vec<Vec2>,
}

impl DisplacementBuffer {
    /// Creates a new [`DisplacementBuffer`] with the given length.
    ///
    /// All displacements are initialized to `Vec2::ZERO`.
    ///
    /// ### Parameters
    /// - `len` - Number of nodes this buffer can store displacements for.
    pub fn with_len(len: usize) -> Self {
        Self {
            moves: vec![Vec2::ZERO; len],
        }
    }

    /// Ensures that the internal storage has exactly the given length.
    ///
    /// If the current length differs from `len`, the buffer is resized.
    /// After this call all entries are cleared to `Vec2::ZERO`, even if
    /// the length was already correct.
    ///
    /// ### Parameters
    /// - `len` - Desired length of the internal buffer.
    pub fn ensure_len(&mut self, len: usize) {
        if self.moves.len() != len {
            self.moves.resize(len, Vec2::ZERO);
        }
        self.clear();
    }

    /// Clears all pending displacements to `Vec2::ZERO`, keeping the length.
    pub fn clear(&mut self) {
        for v in &mut self.moves {
            *v = Vec2::ZERO;
        }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Records the displacement for one node, replacing any previous value.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds for the internal array.
    #[inline]
    pub fn set(&mut self, id: NodeId, v: Vec2) {
        self.moves[id] = v;
    }

    /// Returns the pending displacement recorded for a node.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds for the internal array.
    #[inline]
    pub fn get(&self, id: NodeId) -> Vec2 {
        self.moves[id]
    }

    /// Applies every pending displacement to the matching position.
    ///
    /// This is the simultaneous write-back: `grid[i] += moves[i]` for all
    /// nodes, using values computed from the pre-step snapshot. The buffer
    /// is left unchanged so callers can inspect the step afterwards.
    ///
    /// ### Panics
    /// Panics if `grid` is shorter than the buffer.
    pub fn apply_to(&self, grid: &mut [Vec2]) {
        for (id, &v) in self.moves.iter().enumerate() {
            grid[id] += v;
        }
    }
}
