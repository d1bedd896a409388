use crate::error::{GeometryError, Result};
use crate::geometry::GeometryContext;
use crate::math::intersect_3d::{line_plane_intersect, LinePlaneRelation};
use crate::math::{any_perpendicular, Point3, Vector3, TOLERANCE};

use super::{BoundaryCheck, Intersection, Surface};

/// A plane in 3D space, optionally bounded by a rectangle.
///
/// Defined by an origin point and two orthogonal direction vectors
/// (`u_dir`, `v_dir`). The normal is `u_dir x v_dir`. Rectangle bounds are
/// half-lengths along `u_dir` and `v_dir`, centered on the origin.
#[derive(Debug, Clone)]
pub struct PlaneSurface {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
    half_extents: Option<(f64, f64)>,
}

impl PlaneSurface {
    /// Creates a new unbounded plane from an origin and two direction vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction vectors are zero-length
    /// or parallel (degenerate plane).
    pub fn new(origin: Point3, u_dir: Vector3, v_dir: Vector3) -> Result<Self> {
        let u_len = u_dir.norm();
        if u_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let v_len = v_dir.norm();
        if v_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }

        let u_dir = u_dir / u_len;
        let v_dir = v_dir / v_len;

        let normal = u_dir.cross(&v_dir);
        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(
                GeometryError::Degenerate("plane directions are parallel".into()).into(),
            );
        }
        let normal = normal / normal_len;
        // Re-orthogonalize v so that (u, v, n) is a right-handed frame
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
            half_extents: None,
        })
    }

    /// Creates an unbounded plane from an origin and a normal vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;
        let u_dir = any_perpendicular(&normal);
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
            half_extents: None,
        })
    }

    /// Restricts the plane to a rectangle of half-lengths `half_u` x `half_v`.
    ///
    /// # Errors
    ///
    /// Returns an error if either half-length is not positive.
    pub fn with_rectangle(mut self, half_u: f64, half_v: f64) -> Result<Self> {
        for (parameter, value) in [("half_u", half_u), ("half_v", half_v)] {
            if value.is_nan() || value <= 0.0 {
                return Err(GeometryError::ParameterOutOfRange {
                    parameter,
                    value,
                    min: 0.0,
                    max: f64::INFINITY,
                }
                .into());
            }
        }
        self.half_extents = Some((half_u, half_v));
        Ok(self)
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the U direction vector.
    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    /// Returns the V direction vector.
    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Returns the normal vector of the plane.
    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the rectangle half-lengths, if bounded.
    #[must_use]
    pub fn half_extents(&self) -> Option<(f64, f64)> {
        self.half_extents
    }

    /// Checks whether a point on the plane lies within the bounds.
    #[must_use]
    pub fn inside_bounds(&self, point: &Point3, check: BoundaryCheck) -> bool {
        let Some((half_u, half_v)) = self.half_extents else {
            return true;
        };
        let local = point - self.origin;
        check.within(local.dot(&self.u_dir), half_u) && check.within(local.dot(&self.v_dir), half_v)
    }
}

impl Surface for PlaneSurface {
    fn intersect(
        &self,
        _ctx: &GeometryContext,
        position: &Point3,
        direction: &Vector3,
        check: BoundaryCheck,
    ) -> Intersection {
        match line_plane_intersect(position, direction, self) {
            LinePlaneRelation::Point { point, t } => {
                Intersection::classify(position, direction, t, self.inside_bounds(&point, check))
            }
            LinePlaneRelation::OnPlane | LinePlaneRelation::Parallel => Intersection::unreachable(),
        }
    }

    fn normal(&self, _ctx: &GeometryContext, _position: &Point3) -> Vector3 {
        self.normal
    }
}
