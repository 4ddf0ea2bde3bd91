use glam::Vec2;
use rand::Rng;

#[derive(Clone, Debug)]
pub struct PoiSet {
    pub points: Vec<Vec2>,
}

impl PoiSet {
    pub fn from_positions(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    pub fn random_in_unit_square(count: usize, rng: &mut impl Rng) -> Self {
        let points = (0..count)
            .map(|_| {
                let x = rng.random_range(0.0..=1.0);
                let y = rng.random_range(0.0..=1.0);
                Vec2::new(x, y)
            })
            .collect();

        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index and distance of the POI closest to `pos`.
    ///
    /// Ties are broken toward the lowest POI index (strict-minimum scan),
    /// so the result is deterministic for equidistant POIs.
    pub fn nearest(&self, pos: Vec2) -> Option<(usize, f32)> {
        let mut best = None;
        let mut best_d = f32::MAX;
        for (j, &q) in self.points.iter().enumerate() {
            let d = (q - pos).length();
            if d < best_d {
                best_d = d;
                best = Some(j);
            }
        }
        best.map(|j| (j, best_d))
    }
}
