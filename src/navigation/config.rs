use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::{GeometryError, Result};
use crate::spatial::OctreeConfig;

/// Default opening half-angle of the culling frustum.
pub const DEFAULT_HALF_ANGLE: f64 = PI / 30.0;

/// Parameters of an [`OctreeNavigator`](super::OctreeNavigator).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigatorConfig {
    half_angle: f64,
    octree: OctreeConfig,
    include_surfaces: bool,
    recursive: bool,
}

impl NavigatorConfig {
    /// Sets the half-angle of the culling frustum.
    ///
    /// # Errors
    ///
    /// Returns an error if `half_angle` is not inside `(0, pi/2)`.
    pub fn with_half_angle(mut self, half_angle: f64) -> Result<Self> {
        if !(half_angle > 0.0 && half_angle < FRAC_PI_2) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "half_angle",
                value: half_angle,
                min: 0.0,
                max: FRAC_PI_2,
            }
            .into());
        }
        self.half_angle = half_angle;
        Ok(self)
    }

    /// Sets how the volume index is subdivided.
    #[must_use]
    pub fn with_octree(mut self, octree: OctreeConfig) -> Self {
        self.octree = octree;
        self
    }

    /// Also offers the internal surfaces of culled volumes as candidates.
    #[must_use]
    pub fn with_surfaces(mut self, include_surfaces: bool) -> Self {
        self.include_surfaces = include_surfaces;
        self
    }

    /// Indexes the innermost volumes of the whole tree instead of the
    /// direct sub-volumes only.
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Returns the frustum half-angle in radians.
    #[must_use]
    pub fn half_angle(&self) -> f64 {
        self.half_angle
    }

    /// Returns the octree parameters.
    #[must_use]
    pub fn octree(&self) -> &OctreeConfig {
        &self.octree
    }

    /// Returns whether internal surfaces become candidates.
    #[must_use]
    pub fn include_surfaces(&self) -> bool {
        self.include_surfaces
    }

    /// Returns whether the index descends the whole volume tree.
    #[must_use]
    pub fn recursive(&self) -> bool {
        self.recursive
    }
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            half_angle: DEFAULT_HALF_ANGLE,
            octree: OctreeConfig::default(),
            include_surfaces: false,
            recursive: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults() {
        let c = NavigatorConfig::default();
        assert_relative_eq!(c.half_angle(), PI / 30.0);
        assert_eq!(c.octree().max_leaf_size(), 8);
        assert!(!c.include_surfaces());
        assert!(!c.recursive());
    }

    #[test]
    fn builders_chain() {
        let c = NavigatorConfig::default()
            .with_half_angle(0.2)
            .unwrap()
            .with_octree(OctreeConfig::new(2).unwrap())
            .with_surfaces(true)
            .with_recursive(true);
        assert_relative_eq!(c.half_angle(), 0.2);
        assert_eq!(c.octree().max_leaf_size(), 2);
        assert!(c.include_surfaces());
        assert!(c.recursive());
    }

    #[test]
    fn half_angle_out_of_range_fails() {
        let c = NavigatorConfig::default();
        assert!(c.with_half_angle(0.0).is_err());
        assert!(c.with_half_angle(-0.1).is_err());
        assert!(c.with_half_angle(FRAC_PI_2).is_err());
        assert!(c.with_half_angle(f64::NAN).is_err());
    }
}
