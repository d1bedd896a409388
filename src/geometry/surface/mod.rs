mod cylinder;
mod plane;

pub use cylinder::CylinderSurface;
pub use plane::PlaneSurface;

use crate::math::{Point3, Vector3, ON_SURFACE_TOLERANCE};

use super::GeometryContext;

/// How strictly an intersection must respect the surface bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BoundaryCheck {
    /// Accept any point on the unbounded surface.
    None,
    /// The intersection must lie within the bounds.
    #[default]
    Strict,
    /// The intersection may lie outside the bounds by at most the given distance.
    Tolerance(f64),
}

impl BoundaryCheck {
    /// Returns the tolerance to apply, or `None` if bounds are not checked.
    #[must_use]
    pub fn tolerance(self) -> Option<f64> {
        match self {
            Self::None => None,
            Self::Strict => Some(0.0),
            Self::Tolerance(t) => Some(t.abs()),
        }
    }

    /// Checks `value` against the symmetric bound `[-half, half]`.
    #[must_use]
    pub fn within(self, value: f64, half: f64) -> bool {
        self.tolerance().is_none_or(|tol| value.abs() <= half + tol)
    }
}

/// Outcome class of a line/surface intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionStatus {
    /// The line hits the surface outside its bounds.
    Missed,
    /// The line never reaches the surface.
    Unreachable,
    /// The line hits the surface within its bounds.
    Reachable,
    /// The line origin already lies on the surface.
    OnSurface,
}

/// Result of intersecting a straight line with a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Global intersection position.
    pub position: Point3,
    /// Signed distance along the direction; negative means behind.
    pub path_length: f64,
    /// Status of the intersection.
    pub status: IntersectionStatus,
}

impl Intersection {
    /// An intersection that can never be reached.
    #[must_use]
    pub fn unreachable() -> Self {
        Self {
            position: Point3::origin(),
            path_length: f64::INFINITY,
            status: IntersectionStatus::Unreachable,
        }
    }

    /// Builds an intersection at `origin + path_length * direction`,
    /// classifying it from the bounds check result.
    #[must_use]
    pub fn classify(origin: &Point3, direction: &Vector3, path_length: f64, inside: bool) -> Self {
        let status = if !inside {
            IntersectionStatus::Missed
        } else if path_length.abs() < ON_SURFACE_TOLERANCE {
            IntersectionStatus::OnSurface
        } else {
            IntersectionStatus::Reachable
        };
        Self {
            position: origin + direction * path_length,
            path_length,
            status,
        }
    }

    /// Returns `true` if the status is reachable or on-surface.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(
            self.status,
            IntersectionStatus::Reachable | IntersectionStatus::OnSurface
        )
    }
}

impl Default for Intersection {
    fn default() -> Self {
        Self::unreachable()
    }
}

/// A bounded surface a track can cross.
///
/// This is the intersection seam of the navigation core: candidates are
/// refreshed exclusively through [`Surface::intersect`].
pub trait Surface {
    /// Intersects the straight line through `position` along `direction`.
    fn intersect(
        &self,
        ctx: &GeometryContext,
        position: &Point3,
        direction: &Vector3,
        check: BoundaryCheck,
    ) -> Intersection;

    /// Unit normal at (or nearest to) `position`.
    fn normal(&self, ctx: &GeometryContext, position: &Point3) -> Vector3;
}

/// The surface shapes a detector can be assembled from.
#[derive(Debug, Clone)]
pub enum SurfaceShape {
    /// A planar surface with optional rectangular bounds.
    Plane(PlaneSurface),
    /// A cylinder mantle bounded along its axis.
    Cylinder(CylinderSurface),
}

impl Surface for SurfaceShape {
    fn intersect(
        &self,
        ctx: &GeometryContext,
        position: &Point3,
        direction: &Vector3,
        check: BoundaryCheck,
    ) -> Intersection {
        match self {
            Self::Plane(s) => s.intersect(ctx, position, direction, check),
            Self::Cylinder(s) => s.intersect(ctx, position, direction, check),
        }
    }

    fn normal(&self, ctx: &GeometryContext, position: &Point3) -> Vector3 {
        match self {
            Self::Plane(s) => s.normal(ctx, position),
            Self::Cylinder(s) => s.normal(ctx, position),
        }
    }
}

impl From<PlaneSurface> for SurfaceShape {
    fn from(value: PlaneSurface) -> Self {
        Self::Plane(value)
    }
}

impl From<CylinderSurface> for SurfaceShape {
    fn from(value: CylinderSurface) -> Self {
        Self::Cylinder(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_check_tolerances() {
        assert!(BoundaryCheck::None.within(100.0, 1.0));
        assert!(BoundaryCheck::Strict.within(1.0, 1.0));
        assert!(!BoundaryCheck::Strict.within(1.1, 1.0));
        assert!(BoundaryCheck::Tolerance(0.2).within(-1.1, 1.0));
    }

    #[test]
    fn classify_statuses() {
        let o = Point3::origin();
        let d = Vector3::z();
        assert_eq!(Intersection::classify(&o, &d, 3.0, true).status, IntersectionStatus::Reachable);
        let behind = Intersection::classify(&o, &d, -3.0, true);
        assert_eq!(behind.status, IntersectionStatus::Reachable);
        let on = Intersection::classify(&o, &d, 1e-6, true);
        assert_eq!(on.status, IntersectionStatus::OnSurface);
        assert_eq!(Intersection::classify(&o, &d, 3.0, false).status, IntersectionStatus::Missed);
    }

    #[test]
    fn classify_position_follows_direction() {
        let i = Intersection::classify(&Point3::new(1.0, 0.0, 0.0), &Vector3::y(), 2.0, true);
        assert!((i.position - Point3::new(1.0, 2.0, 0.0)).norm() < 1e-12);
    }
}
