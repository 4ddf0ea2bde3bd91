/// Identifier for a node in a [`crate::mesh::Mesh`].
///
/// This is an index into `Mesh::grid`, and is only meaningful within
/// the lifetime of a given `Mesh` instance.
pub type NodeId = usize;
