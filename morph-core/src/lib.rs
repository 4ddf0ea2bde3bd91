//! Core 2-D mesh morphing library for cartogram-style grid distortion.
//!
//! Main components:
//! - [`mesh`] — mesh topologies (square and radial lattices) and adjacency.
//! - [`pois`] — points of interest that attract mesh nodes.
//! - [`morph`] — the iterative force-relaxation engine.
//! - [`config`] — tuning parameters for the relaxation.
//! - [`displacement`] — temporary buffer for per-iteration displacements.
//! - [`error`] — input validation errors.
//! - [`types`] — shared type aliases and IDs.

pub mod config;
pub mod displacement;
pub mod error;
pub mod mesh;
pub mod morph;
pub mod pois;
pub mod types;
