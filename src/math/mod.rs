pub mod intersect_3d;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Rigid placement of a volume in the global frame.
pub type Transform3 = nalgebra::Isometry3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Distance below which a track counts as sitting on a surface.
pub const ON_SURFACE_TOLERANCE: f64 = 1e-4;

/// Normalizes `v`, returning `None` for zero-length or non-finite input.
#[must_use]
pub fn unit_or_none(v: &Vector3) -> Option<Vector3> {
    let len = v.norm();
    if !len.is_finite() || len < TOLERANCE {
        return None;
    }
    Some(v / len)
}

/// Returns a unit vector perpendicular to `v`.
///
/// `v` must already be normalized.
#[must_use]
pub fn any_perpendicular(v: &Vector3) -> Vector3 {
    // Choose a reference vector not parallel to v
    let reference = if v.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    v.cross(&reference).normalize()
}
