use std::f64::consts::FRAC_PI_2;

use crate::error::{GeometryError, Result};
use crate::math::{any_perpendicular, unit_or_none, Point3, Vector3};

/// Number of bounding planes: the near plane plus four sides.
pub const FRUSTUM_PLANES: usize = 5;

/// A square pyramid opening from an apex along an axis.
///
/// The near plane passes through the apex perpendicular to the axis. The four
/// side planes also pass through the apex and are tilted by the half-angle
/// away from the axis. All normals point inward, so a point `p` is inside
/// when `(p - apex).dot(n) >= 0` for every normal.
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    apex: Point3,
    axis: Vector3,
    half_angle: f64,
    normals: [Vector3; FRUSTUM_PLANES],
}

impl Frustum {
    /// Creates a frustum at `apex` opening along `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if `direction` is zero-length or
    /// not finite, and [`GeometryError::ParameterOutOfRange`] if `half_angle`
    /// is not within `(0, pi/2)`.
    pub fn new(apex: Point3, direction: Vector3, half_angle: f64) -> Result<Self> {
        let axis = unit_or_none(&direction).ok_or(GeometryError::ZeroVector)?;
        if !(half_angle > 0.0 && half_angle < FRAC_PI_2) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "half_angle",
                value: half_angle,
                min: 0.0,
                max: FRAC_PI_2,
            }
            .into());
        }

        let u = any_perpendicular(&axis);
        let v = axis.cross(&u);
        let (sin, cos) = half_angle.sin_cos();
        let side = |e: Vector3| axis * sin - e * cos;
        let normals = [axis, side(u), side(-u), side(v), side(-v)];

        Ok(Self {
            apex,
            axis,
            half_angle,
            normals,
        })
    }

    /// Returns the apex position.
    #[must_use]
    pub fn apex(&self) -> &Point3 {
        &self.apex
    }

    /// Returns the opening axis (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Returns the half opening angle in radians.
    #[must_use]
    pub fn half_angle(&self) -> f64 {
        self.half_angle
    }

    /// Returns the inward-facing plane normals, near plane first.
    #[must_use]
    pub fn normals(&self) -> &[Vector3; FRUSTUM_PLANES] {
        &self.normals
    }

    /// Returns `true` if `point` is on the interior side of every face.
    ///
    /// Points on a face count as inside; a non-finite point is never inside.
    #[must_use]
    pub fn contains(&self, point: &Point3) -> bool {
        let rel = point - self.apex;
        self.normals.iter().all(|n| rel.dot(n) >= 0.0)
    }
}
