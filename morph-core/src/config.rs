use crate::error::MorphError;

/// Tuning parameters for the relaxation engine.
#[derive(Clone, Copy, Debug)]
pub struct MorphConfig {
    /// Attraction strength toward the nearest POI.
    pub alpha: f32,
    /// Cohesion strength toward the neighbor centroid.
    pub beta: f32,
    /// Convergence threshold on the maximum nearest-POI distance.
    pub threshold: f32,
    /// Iteration budget; the engine always terminates within this bound.
    pub max_iter: usize,
    /// Per-iteration displacement clamp, or `None` for unclamped steps.
    pub max_step: Option<f32>,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            beta: 0.2,
            threshold: 1e-3,
            max_iter: 250,
            max_step: Some(0.05),
        }
    }
}

impl MorphConfig {
    /// Rejects parameter combinations the engine cannot run with.
    ///
    /// Note: non-finite values (NaN/infinity) are not rejected here and
    /// will propagate through the distance and centroid math unchecked.
    pub fn validate(&self) -> Result<(), MorphError> {
        if self.alpha < 0.0 {
            return Err(MorphError::NegativeCoefficient {
                name: "alpha",
                value: self.alpha,
            });
        }
        if self.beta < 0.0 {
            return Err(MorphError::NegativeCoefficient {
                name: "beta",
                value: self.beta,
            });
        }
        if self.threshold <= 0.0 {
            return Err(MorphError::NonPositiveThreshold {
                value: self.threshold,
            });
        }
        if let Some(step) = self.max_step
            && step <= 0.0
        {
            return Err(MorphError::NonPositiveMaxStep { value: step });
        }
        if self.max_iter == 0 {
            return Err(MorphError::ZeroMaxIter);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(MorphConfig::default().validate().is_ok());
    }

    #[test]
    fn negative_coefficients_are_rejected() {
        let mut cfg = MorphConfig::default();
        cfg.alpha = -0.1;
        assert!(matches!(
            cfg.validate(),
            Err(MorphError::NegativeCoefficient { name: "alpha", .. })
        ));

        let mut cfg = MorphConfig::default();
        cfg.beta = -1.0;
        assert!(matches!(
            cfg.validate(),
            Err(MorphError::NegativeCoefficient { name: "beta", .. })
        ));
    }

    #[test]
    fn non_positive_threshold_is_rejected() {
        let mut cfg = MorphConfig::default();
        cfg.threshold = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(MorphError::NonPositiveThreshold { .. })
        ));
    }

    #[test]
    fn non_positive_max_step_is_rejected_but_none_is_fine() {
        let mut cfg = MorphConfig::default();
        cfg.max_step = Some(0.0);
        assert!(matches!(
            cfg.validate(),
            Err(MorphError::NonPositiveMaxStep { .. })
        ));

        cfg.max_step = None;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_max_iter_is_rejected() {
        let mut cfg = MorphConfig::default();
        cfg.max_iter = 0;
        assert!(matches!(cfg.validate(), Err(MorphError::ZeroMaxIter)));
    }
}
