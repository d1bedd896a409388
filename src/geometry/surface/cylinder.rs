use crate::error::{GeometryError, Result};
use crate::geometry::GeometryContext;
use crate::math::intersect_3d::{line_cylinder_intersect, LineCylinderRelation};
use crate::math::{any_perpendicular, Point3, Vector3, ON_SURFACE_TOLERANCE, TOLERANCE};

use super::{BoundaryCheck, Intersection, Surface};

/// A cylinder mantle in 3D space, bounded along its axis.
///
/// Defined by a center point on the axis, radius, axis direction and the
/// half-length of the mantle measured from the center along the axis.
/// The outward normal points radially away from the axis.
#[derive(Debug, Clone)]
pub struct CylinderSurface {
    center: Point3,
    radius: f64,
    axis: Vector3,
    half_length: f64,
}

impl CylinderSurface {
    /// Creates a new cylinder mantle.
    ///
    /// # Arguments
    ///
    /// * `center` - A point on the cylinder axis, halfway along the mantle
    /// * `radius` - Radius (must be positive)
    /// * `axis` - Axis direction (will be normalized)
    /// * `half_length` - Half-length along the axis (must be positive)
    ///
    /// # Errors
    ///
    /// Returns an error if the radius or half-length is non-positive or the
    /// axis is zero-length.
    pub fn new(center: Point3, radius: f64, axis: Vector3, half_length: f64) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("cylinder radius must be positive".into()).into(),
            );
        }
        if half_length < TOLERANCE {
            return Err(
                GeometryError::Degenerate("cylinder half-length must be positive".into()).into(),
            );
        }

        let axis_len = axis.norm();
        if axis_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let axis = axis / axis_len;

        Ok(Self {
            center,
            radius,
            axis,
            half_length,
        })
    }

    /// Returns the center point on the axis.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the axis direction (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Returns the half-length along the axis.
    #[must_use]
    pub fn half_length(&self) -> f64 {
        self.half_length
    }

    fn inside_bounds(&self, point: &Point3, check: BoundaryCheck) -> bool {
        check.within((point - self.center).dot(&self.axis), self.half_length)
    }
}

/// Preference of a solution: on-surface first, then ahead, then behind.
fn solution_rank(t: f64) -> (u8, f64) {
    if t.abs() < ON_SURFACE_TOLERANCE {
        (0, t.abs())
    } else if t > 0.0 {
        (1, t)
    } else {
        (2, -t)
    }
}

impl Surface for CylinderSurface {
    fn intersect(
        &self,
        _ctx: &GeometryContext,
        position: &Point3,
        direction: &Vector3,
        check: BoundaryCheck,
    ) -> Intersection {
        let LineCylinderRelation::Points { t } = line_cylinder_intersect(position, direction, self)
        else {
            return Intersection::unreachable();
        };

        let mut solutions = t;
        solutions.sort_by(|a, b| {
            let (ra, da) = solution_rank(*a);
            let (rb, db) = solution_rank(*b);
            ra.cmp(&rb).then(da.total_cmp(&db))
        });

        let inside = |s: f64| self.inside_bounds(&(position + direction * s), check);
        match solutions.iter().copied().find(|&s| inside(s)) {
            Some(s) => Intersection::classify(position, direction, s, true),
            None => Intersection::classify(position, direction, solutions[0], false),
        }
    }

    fn normal(&self, _ctx: &GeometryContext, position: &Point3) -> Vector3 {
        let rel = position - self.center;
        let radial = rel - self.axis * rel.dot(&self.axis);
        let len = radial.norm();
        if len < TOLERANCE {
            // On the axis the radial direction is undefined
            return any_perpendicular(&self.axis);
        }
        radial / len
    }
}
