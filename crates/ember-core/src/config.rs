//! Physics configuration shared by the initializer and the stencil kernel.

use crate::dims::GridDims;
use crate::error::ConfigError;

/// Immutable physics constants for one simulation run.
///
/// Constructed once and passed by reference to both the grid initializer
/// and the stencil kernel. The mesh-dependent quantities (`h`, `dt`) are
/// derived from it exactly once per run via [`HeatConfig::discretize`].
#[derive(Clone, Debug, PartialEq)]
pub struct HeatConfig {
    /// Physical length of the domain along the row axis. Default: 2.0.
    pub domain_length: f64,
    /// Thermal diffusivity coefficient. Default: 22.0.
    pub alpha: f64,
    /// Residual threshold reported in the run summary. Default: 1.0e-3.
    ///
    /// Informational only: runs always execute the requested step count.
    pub eps: f64,
    /// Temperature of the cold partition. Default: 10.0.
    pub u_min: f64,
    /// Temperature of the hot partition. Default: 100.0.
    pub u_max: f64,
}

impl HeatConfig {
    /// Default domain length.
    pub const DEFAULT_DOMAIN_LENGTH: f64 = 2.0;

    /// Default diffusivity.
    pub const DEFAULT_ALPHA: f64 = 22.0;

    /// Default reported residual threshold.
    pub const DEFAULT_EPS: f64 = 1.0e-3;

    /// Default cold temperature.
    pub const DEFAULT_U_MIN: f64 = 10.0;

    /// Default hot temperature.
    pub const DEFAULT_U_MAX: f64 = 100.0;

    /// Check every constant is finite and in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("domain_length", self.domain_length),
            ("alpha", self.alpha),
            ("eps", self.eps),
            ("u_min", self.u_min),
            ("u_max", self.u_max),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
        }
        if self.domain_length <= 0.0 {
            return Err(ConfigError::OutOfRange {
                name: "domain_length",
                value: self.domain_length,
                expected: "positive",
            });
        }
        if self.alpha <= 0.0 {
            return Err(ConfigError::OutOfRange {
                name: "alpha",
                value: self.alpha,
                expected: "positive",
            });
        }
        if self.eps < 0.0 {
            return Err(ConfigError::OutOfRange {
                name: "eps",
                value: self.eps,
                expected: "non-negative",
            });
        }
        if self.u_min > self.u_max {
            return Err(ConfigError::OutOfRange {
                name: "u_min",
                value: self.u_min,
                expected: "no greater than u_max",
            });
        }
        Ok(())
    }

    /// Derive the mesh-dependent step coefficients for `dims`.
    ///
    /// `h = domain_length / n`, `hi2 = (1 / h)^2` and the stability-bound
    /// timestep `dt = h^2 / 4 / alpha`. Validates `self` first.
    pub fn discretize(&self, dims: GridDims) -> Result<Discretization, ConfigError> {
        self.validate()?;
        let h = self.domain_length / dims.n() as f64;
        let hi = 1.0 / h;
        Ok(Discretization {
            h,
            hi2: hi * hi,
            dt: h * h / 4.0 / self.alpha,
            alpha: self.alpha,
        })
    }

    /// Row count of the hot partition: rows `i < m / 3` start at `u_max`.
    ///
    /// The threshold is taken from the column count even though it is
    /// compared against row indices. For non-square grids this is kept
    /// as-is so output files stay comparable across implementations.
    pub fn hot_rows(&self, dims: GridDims) -> usize {
        dims.m() / 3
    }

    /// Initial temperature of row `i`.
    pub fn initial_temperature(&self, dims: GridDims, i: usize) -> f64 {
        if i < self.hot_rows(dims) {
            self.u_max
        } else {
            self.u_min
        }
    }
}

impl Default for HeatConfig {
    fn default() -> Self {
        Self {
            domain_length: Self::DEFAULT_DOMAIN_LENGTH,
            alpha: Self::DEFAULT_ALPHA,
            eps: Self::DEFAULT_EPS,
            u_min: Self::DEFAULT_U_MIN,
            u_max: Self::DEFAULT_U_MAX,
        }
    }
}

/// Step coefficients derived from a [`HeatConfig`] and a grid size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Discretization {
    /// Mesh width.
    pub h: f64,
    /// Inverse squared mesh width.
    pub hi2: f64,
    /// Timestep.
    pub dt: f64,
    /// Diffusivity.
    pub alpha: f64,
}

impl Discretization {
    /// Update for one point given its five-point Laplacian numerator.
    ///
    /// Evaluated left to right as `laplacian * dt * hi2 * alpha`; changing
    /// the association changes the low bits of the result.
    #[inline]
    pub fn delta(&self, laplacian: f64) -> f64 {
        laplacian * self.dt * self.hi2 * self.alpha
    }

    /// Simulated time after `step` steps.
    pub fn time_at(&self, step: u64) -> f64 {
        step as f64 * self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let cfg = HeatConfig::default();
        assert_eq!(cfg.domain_length, 2.0);
        assert_eq!(cfg.alpha, 22.0);
        assert_eq!(cfg.eps, 1.0e-3);
        assert_eq!(cfg.u_min, 10.0);
        assert_eq!(cfg.u_max, 100.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn discretize_four_by_four() {
        let dims = GridDims::new(4, 4).unwrap();
        let disc = HeatConfig::default().discretize(dims).unwrap();
        let h = 2.0 / 4.0;
        assert_eq!(disc.h, h);
        assert_eq!(disc.hi2, (1.0 / h) * (1.0 / h));
        assert_eq!(disc.dt, h * h / 4.0 / 22.0);
    }

    #[test]
    fn stability_bound_gives_quarter_weight() {
        // dt * hi2 * alpha == 1/4 up to rounding for any n.
        let dims = GridDims::new(100, 7).unwrap();
        let disc = HeatConfig::default().discretize(dims).unwrap();
        assert!((disc.dt * disc.hi2 * disc.alpha - 0.25).abs() < 1e-12);
    }

    #[test]
    fn hot_rows_follow_column_count() {
        let cfg = HeatConfig::default();
        let dims = GridDims::new(9, 3).unwrap();
        assert_eq!(cfg.hot_rows(dims), 1);
        assert_eq!(cfg.initial_temperature(dims, 0), 100.0);
        assert_eq!(cfg.initial_temperature(dims, 1), 10.0);

        let wide = GridDims::new(2, 30).unwrap();
        assert_eq!(cfg.hot_rows(wide), 10);
        assert_eq!(cfg.initial_temperature(wide, 2), 100.0);
    }

    #[test]
    fn non_finite_rejected() {
        let cfg = HeatConfig {
            alpha: f64::NAN,
            ..HeatConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonFinite { name: "alpha", .. })
        ));
    }

    #[test]
    fn inverted_temperatures_rejected() {
        let cfg = HeatConfig {
            u_min: 200.0,
            ..HeatConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::OutOfRange { name: "u_min", .. })
        ));
    }

    #[test]
    fn non_positive_alpha_rejected_by_discretize() {
        let cfg = HeatConfig {
            alpha: 0.0,
            ..HeatConfig::default()
        };
        let dims = GridDims::new(4, 4).unwrap();
        assert!(cfg.discretize(dims).is_err());
    }
}
