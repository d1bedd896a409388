use crate::detector::VolumeId;
use crate::geometry::BoundaryCheck;
use crate::math::{unit_or_none, Point3, Vector3};
use crate::spatial::Frustum;

use super::candidate::SurfaceCandidate;

/// What the last navigation step did with the candidate cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullingPhase {
    /// No step has run yet.
    #[default]
    Uninitialized,
    /// Candidates were culled from an empty cache.
    Culled,
    /// The cached candidates were reused.
    Stepping,
    /// The track left the cached frustum and the cache was rebuilt.
    Exited,
}

/// Per-track navigation context.
///
/// The stepping engine owns position, direction and the current volume.
/// Candidates, selection and the cached frustum are written only by the
/// navigator.
#[derive(Debug, Clone)]
pub struct NavigationState {
    /// Volume the track is in; `None` past the end of the known world.
    pub current_volume: Option<VolumeId>,
    pub position: Point3,
    /// Unit direction of travel.
    pub direction: Vector3,
    /// Bounds policy applied to newly culled candidates.
    pub boundary_check: BoundaryCheck,
    pub(crate) surface_candidates: Vec<SurfaceCandidate>,
    pub(crate) selected: Option<usize>,
    pub(crate) culling_frustum: Option<Frustum>,
    pub(crate) phase: CullingPhase,
}

impl NavigationState {
    /// Creates a state outside any volume. `direction` is normalized; a
    /// zero or non-finite direction is kept as given and yields no
    /// candidates when stepped.
    #[must_use]
    pub fn new(position: Point3, direction: Vector3) -> Self {
        Self {
            current_volume: None,
            position,
            direction: unit_or_none(&direction).unwrap_or(direction),
            boundary_check: BoundaryCheck::default(),
            surface_candidates: Vec::new(),
            selected: None,
            culling_frustum: None,
            phase: CullingPhase::Uninitialized,
        }
    }

    #[must_use]
    pub fn with_volume(mut self, volume: VolumeId) -> Self {
        self.current_volume = Some(volume);
        self
    }

    #[must_use]
    pub fn with_boundary_check(mut self, check: BoundaryCheck) -> Self {
        self.boundary_check = check;
        self
    }

    /// Returns the cached candidates, best first after a step.
    #[must_use]
    pub fn surface_candidates(&self) -> &[SurfaceCandidate] {
        &self.surface_candidates
    }

    /// Returns the selected candidate, if any.
    #[must_use]
    pub fn surface_candidate(&self) -> Option<&SurfaceCandidate> {
        self.selected.and_then(|i| self.surface_candidates.get(i))
    }

    /// Returns the frustum the current candidates were culled with.
    #[must_use]
    pub fn culling_frustum(&self) -> Option<&Frustum> {
        self.culling_frustum.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> CullingPhase {
        self.phase
    }

    /// Drops the candidate cache so the next step culls again.
    pub fn reset(&mut self) {
        self.surface_candidates.clear();
        self.selected = None;
        self.culling_frustum = None;
        self.phase = CullingPhase::Uninitialized;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_normalizes_direction() {
        let s = NavigationState::new(Point3::origin(), Vector3::new(0.0, 3.0, 4.0));
        assert_relative_eq!(s.direction.norm(), 1.0);
        assert_relative_eq!(s.direction.y, 0.6);
        assert_eq!(s.phase(), CullingPhase::Uninitialized);
        assert!(s.surface_candidate().is_none());
        assert!(s.culling_frustum().is_none());
    }

    #[test]
    fn zero_direction_is_kept() {
        let s = NavigationState::new(Point3::origin(), Vector3::zeros());
        assert_eq!(s.direction, Vector3::zeros());
    }
}
