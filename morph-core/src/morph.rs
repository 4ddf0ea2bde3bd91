//! Iterative force-relaxation engine.
//!
//! The morph loop pulls every mesh node toward its nearest POI while a
//! cohesion force keeps the node near the centroid of its mesh neighbors.
//! The typical run looks like:
//! 1. Validate inputs and build neighbor lists from the edge list.
//! 2. [`relaxation_step`] — compute every node's displacement from the
//!    start-of-step position snapshot into a [`DisplacementBuffer`].
//! 3. Apply all displacements at once, then test convergence.
//! 4. Repeat until the maximum nearest-POI distance drops below the
//!    threshold or the iteration budget runs out.

use glam::Vec2;

use crate::{
    config::MorphConfig, displacement::DisplacementBuffer, error::MorphError,
    mesh::neighbor_lists, pois::PoiSet, types::NodeId,
};

/// Result of a morph run.
#[derive(Clone, Debug)]
pub struct MorphOutcome {
    /// Final node positions, same length and order as the input grid.
    pub grid: Vec<Vec2>,
    /// 1-based count of iterations actually run (`<= max_iter`).
    pub iterations: usize,
    /// Whether the threshold was met, or the budget ran out.
    pub converged: bool,
}

/// Computes one Jacobi-style relaxation step into `moves`.
///
/// For each node, from the positions in `grid` (the start-of-step
/// snapshot):
///
/// 1. Find the nearest POI by Euclidean distance `d` (ties toward the
///    lowest POI index).
/// 2. Attraction: `alpha * d * unit(poi - node)`, or zero when the node
///    sits exactly on the POI.
/// 3. Cohesion: `beta * (centroid(neighbor positions) - node)` when the
///    node has neighbors, using the same snapshot.
/// 4. Sum both, and if the combined magnitude exceeds `max_step`, rescale
///    to exactly `max_step` without changing direction.
///
/// Displacements are only **recorded** in `moves`; nothing is applied
/// here, so every node's computation sees the same snapshot. The buffer
/// is resized and cleared to `grid.len()` at the start of the step.
///
/// ### Parameters
/// - `grid` - Start-of-step node positions; read-only snapshot.
/// - `pois` - Attraction targets; never mutated.
/// - `neighbors` - Per-node neighbor lists from [`neighbor_lists`].
/// - `cfg` - Force coefficients and the optional step clamp.
/// - `moves` - Scratch buffer receiving one displacement per node.
///
/// ### Returns
/// The maximum over all nodes of the nearest-POI distance `d`, i.e. the
/// convergence metric for this step. Zero when `pois` is empty (no node
/// moves in that case).
pub fn relaxation_step(
    grid: &[Vec2],
    pois: &PoiSet,
    neighbors: &[Vec<NodeId>],
    cfg: &MorphConfig,
    moves: &mut DisplacementBuffer,
) -> f32 {
    moves.ensure_len(grid.len());
    let mut max_min_d = 0.0f32;

    for (i, &p) in grid.iter().enumerate() {
        let Some((j, d)) = pois.nearest(p) else {
            continue;
        };
        max_min_d = max_min_d.max(d);

        // Attraction scales with distance; a node sitting exactly on its
        // nearest POI gets no pull (avoids dividing by zero).
        let v_poi = if d > 0.0 {
            let diff = pois.points[j] - p;
            cfg.alpha * d * (diff / d)
        } else {
            Vec2::ZERO
        };

        let mut v_coh = Vec2::ZERO;
        if !neighbors[i].is_empty() {
            let mut centroid = Vec2::ZERO;
            for &nb in &neighbors[i] {
                centroid += grid[nb];
            }
            centroid /= neighbors[i].len() as f32;
            v_coh = cfg.beta * (centroid - p);
        }

        let mut v = v_poi + v_coh;
        if let Some(max_step) = cfg.max_step {
            let norm_v = v.length();
            if norm_v > max_step {
                v *= max_step / norm_v;
            }
        }
        moves.set(i, v);
    }

    max_min_d
}

/// Morphs `grid` toward `pois` under attraction and cohesion forces.
///
/// Runs up to `cfg.max_iter` relaxation steps. Each step computes all
/// displacements from the previous step's final positions, applies them
/// simultaneously, and then tests convergence: once the maximum
/// nearest-POI distance (measured at the start of the step) is below
/// `cfg.threshold`, the run stops.
///
/// The convergence test deliberately measures only proximity to the POIs,
/// not mesh smoothness; the cohesion force is trusted to have kept the
/// mesh coherent along the way. At least one iteration always runs,
/// because the test happens after the update.
///
/// Running out of iterations is a normal outcome, reported through
/// [`MorphOutcome::converged`], not an error.
///
/// ### Parameters
/// - `grid` - Initial node positions; the input is not mutated.
/// - `pois` - Attraction targets.
/// - `edges` - Undirected cohesion adjacency over node indices.
/// - `cfg` - Engine parameters; validated before anything runs.
///
/// ### Returns
/// The final positions plus the 1-based iteration count, or a
/// [`MorphError`] if any input is rejected by validation.
pub fn morph(
    grid: &[Vec2],
    pois: &PoiSet,
    edges: &[[NodeId; 2]],
    cfg: &MorphConfig,
) -> Result<MorphOutcome, MorphError> {
    cfg.validate()?;
    if grid.is_empty() {
        return Err(MorphError::EmptyGrid);
    }
    if pois.is_empty() {
        return Err(MorphError::EmptyPois);
    }
    for &[a, b] in edges {
        if a >= grid.len() || b >= grid.len() {
            return Err(MorphError::EdgeOutOfRange {
                a,
                b,
                node_count: grid.len(),
            });
        }
    }

    let neighbors = neighbor_lists(edges, grid.len());
    let mut g = grid.to_vec();
    let mut moves = DisplacementBuffer::with_len(g.len());

    for it in 0..cfg.max_iter {
        let max_min_d = relaxation_step(&g, pois, &neighbors, cfg, &mut moves);
        moves.apply_to(&mut g);

        if max_min_d < cfg.threshold {
            return Ok(MorphOutcome {
                grid: g,
                iterations: it + 1,
                converged: true,
            });
        }
    }

    Ok(MorphOutcome {
        grid: g,
        iterations: cfg.max_iter,
        converged: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;

    fn cfg_with(alpha: f32, beta: f32, max_step: Option<f32>) -> MorphConfig {
        MorphConfig {
            alpha,
            beta,
            threshold: 1e-3,
            max_iter: 250,
            max_step,
        }
    }

    #[test]
    fn morph_rejects_empty_grid() {
        let pois = PoiSet::from_positions(vec![Vec2::ZERO]);
        let err = morph(&[], &pois, &[], &MorphConfig::default()).unwrap_err();
        assert_eq!(err, MorphError::EmptyGrid);
    }

    #[test]
    fn morph_rejects_empty_poi_set() {
        let pois = PoiSet::from_positions(Vec::new());
        let err = morph(&[Vec2::ZERO], &pois, &[], &MorphConfig::default()).unwrap_err();
        assert_eq!(err, MorphError::EmptyPois);
    }

    #[test]
    fn morph_rejects_out_of_range_edges_before_moving_anything() {
        let pois = PoiSet::from_positions(vec![Vec2::new(1.0, 0.0)]);
        let grid = vec![Vec2::ZERO, Vec2::new(0.5, 0.0)];

        let err = morph(&grid, &pois, &[[0, 2]], &MorphConfig::default()).unwrap_err();
        assert_eq!(
            err,
            MorphError::EdgeOutOfRange {
                a: 0,
                b: 2,
                node_count: 2
            }
        );
    }

    #[test]
    fn morph_rejects_invalid_config_first() {
        let pois = PoiSet::from_positions(vec![Vec2::ZERO]);
        let mut cfg = MorphConfig::default();
        cfg.max_iter = 0;

        // Even with an empty grid, the config error wins: validation is
        // config first, then grid, then POIs, then edges.
        let err = morph(&[], &pois, &[], &cfg).unwrap_err();
        assert_eq!(err, MorphError::ZeroMaxIter);
    }

    #[test]
    fn output_has_the_same_length_as_the_input() {
        let mesh = Mesh::square(4);
        let pois = PoiSet::from_positions(vec![Vec2::new(0.3, 0.7)]);

        let out = morph(&mesh.grid, &pois, &mesh.edges, &MorphConfig::default()).unwrap();
        assert_eq!(out.grid.len(), mesh.grid.len());
    }

    #[test]
    fn single_node_exhausts_a_one_iteration_budget() {
        // One free node at the origin, one POI at distance 1.
        let grid = vec![Vec2::ZERO];
        let pois = PoiSet::from_positions(vec![Vec2::new(1.0, 0.0)]);
        let cfg = MorphConfig {
            alpha: 0.1,
            beta: 0.0,
            threshold: 0.001,
            max_iter: 1,
            max_step: None,
        };

        let out = morph(&grid, &pois, &[], &cfg).unwrap();

        // v = 0.1 * 1 * (1, 0); the step's max distance (1.0) is measured
        // before the move, so the budget runs out unconverged.
        assert_eq!(out.grid[0], Vec2::new(0.1, 0.0));
        assert_eq!(out.iterations, 1);
        assert!(!out.converged);
    }

    #[test]
    fn already_converged_input_still_runs_one_iteration() {
        // Node exactly on the POI: distance 0 < threshold, and the
        // coincident node gets a zero attraction vector.
        let grid = vec![Vec2::new(0.5, 0.5)];
        let pois = PoiSet::from_positions(vec![Vec2::new(0.5, 0.5)]);
        let cfg = cfg_with(0.5, 0.0, None);

        let out = morph(&grid, &pois, &[], &cfg).unwrap();
        assert_eq!(out.iterations, 1);
        assert!(out.converged);
        assert_eq!(out.grid[0], Vec2::new(0.5, 0.5));
    }

    #[test]
    fn zero_forces_leave_positions_untouched() {
        let mesh = Mesh::square(3);
        let pois = PoiSet::from_positions(vec![Vec2::new(5.0, 5.0)]);
        let cfg = MorphConfig {
            alpha: 0.0,
            beta: 0.0,
            threshold: 1e-3,
            max_iter: 10,
            max_step: None,
        };

        let out = morph(&mesh.grid, &pois, &mesh.edges, &cfg).unwrap();

        assert_eq!(out.grid, mesh.grid);
        assert_eq!(out.iterations, 10);
        assert!(!out.converged);
    }

    #[test]
    fn attraction_scales_with_distance_to_the_nearest_poi() {
        let grid = vec![Vec2::ZERO];
        let pois = PoiSet::from_positions(vec![Vec2::new(2.0, 0.0)]);
        let cfg = MorphConfig {
            alpha: 0.1,
            beta: 0.0,
            threshold: 1e-3,
            max_iter: 1,
            max_step: None,
        };

        let out = morph(&grid, &pois, &[], &cfg).unwrap();
        // alpha * d * unit = 0.1 * 2 * (1, 0).
        assert_eq!(out.grid[0], Vec2::new(0.2, 0.0));
    }

    #[test]
    fn cohesion_pulls_toward_the_neighbor_centroid() {
        let grid = vec![Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        let edges = [[0, 1], [0, 2]];
        let neighbors = neighbor_lists(&edges, grid.len());

        // alpha = 0 so only cohesion acts on node 0; the far POI only
        // feeds the convergence metric.
        let pois = PoiSet::from_positions(vec![Vec2::new(100.0, 0.0)]);
        let cfg = cfg_with(0.0, 0.5, None);
        let mut moves = DisplacementBuffer::with_len(0);

        relaxation_step(&grid, &pois, &neighbors, &cfg, &mut moves);

        // Centroid of (1,0) and (0,1) is (0.5, 0.5).
        assert_eq!(moves.get(0), Vec2::new(0.25, 0.25));
    }

    #[test]
    fn update_is_simultaneous_not_sequential() {
        // Two connected nodes with pure cohesion at beta = 1 swap places:
        // each one's centroid is the other's *old* position. A sequential
        // (Gauss-Seidel) update would instead leave node 1 where it is.
        let grid = vec![Vec2::ZERO, Vec2::new(1.0, 0.0)];
        let pois = PoiSet::from_positions(vec![Vec2::new(100.0, 0.0)]);
        let cfg = MorphConfig {
            alpha: 0.0,
            beta: 1.0,
            threshold: 1e-3,
            max_iter: 1,
            max_step: None,
        };

        let out = morph(&grid, &pois, &[[0, 1]], &cfg).unwrap();
        assert_eq!(out.grid[0], Vec2::new(1.0, 0.0));
        assert_eq!(out.grid[1], Vec2::ZERO);
    }

    #[test]
    fn relaxation_step_reports_the_worst_nearest_poi_distance() {
        let grid = vec![Vec2::ZERO, Vec2::new(0.75, 0.0)];
        let pois = PoiSet::from_positions(vec![Vec2::new(1.0, 0.0)]);
        let neighbors = neighbor_lists(&[], grid.len());
        let mut moves = DisplacementBuffer::with_len(0);

        let max_min_d =
            relaxation_step(&grid, &pois, &neighbors, &MorphConfig::default(), &mut moves);
        assert_eq!(max_min_d, 1.0);
    }

    #[test]
    fn oversized_displacements_are_clamped_in_magnitude_only() {
        let grid = vec![Vec2::ZERO];
        let pois = PoiSet::from_positions(vec![Vec2::new(3.0, 4.0)]);
        let neighbors = neighbor_lists(&[], grid.len());
        let mut moves = DisplacementBuffer::with_len(0);

        // Unclamped attraction would be alpha * d * unit = (3, 4).
        let unclamped = cfg_with(1.0, 0.0, None);
        relaxation_step(&grid, &pois, &neighbors, &unclamped, &mut moves);
        let free = moves.get(0);
        assert!((free - Vec2::new(3.0, 4.0)).length() < 1e-5);

        let clamped = cfg_with(1.0, 0.0, Some(0.05));
        relaxation_step(&grid, &pois, &neighbors, &clamped, &mut moves);
        let v = moves.get(0);

        let eps = 1e-6;
        assert!((v.length() - 0.05).abs() < eps);
        // Direction unchanged: cosine similarity with the free vector ~ 1.
        let cos = v.dot(free) / (v.length() * free.length());
        assert!((cos - 1.0).abs() < eps);
    }

    #[test]
    fn displacements_at_the_clamp_are_not_rescaled() {
        let grid = vec![Vec2::ZERO];
        let pois = PoiSet::from_positions(vec![Vec2::new(1.0, 0.0)]);
        let neighbors = neighbor_lists(&[], grid.len());
        let mut moves = DisplacementBuffer::with_len(0);

        // Unclamped magnitude is exactly 0.1; the clamp only rescales
        // strictly larger displacements.
        let cfg = cfg_with(0.1, 0.0, Some(0.1));
        relaxation_step(&grid, &pois, &neighbors, &cfg, &mut moves);
        assert_eq!(moves.get(0), Vec2::new(0.1, 0.0));
    }

    #[test]
    fn equidistant_pois_attract_toward_the_lowest_index() {
        // Two POIs at distance 1 from the node, on opposite sides.
        let grid = vec![Vec2::ZERO];
        let pois =
            PoiSet::from_positions(vec![Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0)]);
        let cfg = MorphConfig {
            alpha: 0.1,
            beta: 0.0,
            threshold: 1e-3,
            max_iter: 1,
            max_step: None,
        };

        let out = morph(&grid, &pois, &[], &cfg).unwrap();
        assert_eq!(out.grid[0], Vec2::new(0.1, 0.0));
    }

    #[test]
    fn square_mesh_collapses_onto_a_single_central_poi() {
        let mesh = Mesh::square(2);
        let pois = PoiSet::from_positions(vec![Vec2::new(0.5, 0.5)]);
        let cfg = MorphConfig::default();

        let out = morph(&mesh.grid, &pois, &mesh.edges, &cfg).unwrap();

        assert!(out.converged, "expected convergence within the budget");
        assert!(out.iterations >= 1 && out.iterations <= cfg.max_iter);
        for p in &out.grid {
            assert!((*p - Vec2::new(0.5, 0.5)).length() < cfg.threshold);
        }
    }

    #[test]
    fn duplicate_edges_double_count_in_the_centroid() {
        // Node 0 has neighbors 1 (twice) and 2 (once): the centroid is
        // biased toward node 1. Duplicates are accepted, not deduped.
        let grid = vec![Vec2::ZERO, Vec2::new(3.0, 0.0), Vec2::new(0.0, 3.0)];
        let edges = [[0, 1], [0, 1], [0, 2]];
        let neighbors = neighbor_lists(&edges, grid.len());

        let pois = PoiSet::from_positions(vec![Vec2::new(100.0, 0.0)]);
        let cfg = cfg_with(0.0, 1.0, None);
        let mut moves = DisplacementBuffer::with_len(0);

        relaxation_step(&grid, &pois, &neighbors, &cfg, &mut moves);
        assert_eq!(moves.get(0), Vec2::new(2.0, 1.0));
    }
}
