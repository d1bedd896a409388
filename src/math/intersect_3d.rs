use crate::geometry::surface::{CylinderSurface, PlaneSurface};

use super::{Point3, Vector3, TOLERANCE};

/// Relationship of a line with a plane.
#[derive(Debug)]
pub enum LinePlaneRelation {
    /// Line intersects the plane at a single point.
    Point { point: Point3, t: f64 },
    /// Line is parallel to the plane (does not intersect).
    Parallel,
    /// Line lies entirely on the plane.
    OnPlane,
}

/// Computes the intersection of a line `origin + t * dir` with the plane
/// carrying `plane`. Bounds are ignored.
#[must_use]
pub fn line_plane_intersect(
    origin: &Point3,
    dir: &Vector3,
    plane: &PlaneSurface,
) -> LinePlaneRelation {
    let normal = plane.plane_normal();
    let denom = normal.dot(dir);

    let diff = plane.origin() - origin;
    let numer = normal.dot(&diff);

    if denom.abs() < TOLERANCE {
        if numer.abs() < TOLERANCE {
            LinePlaneRelation::OnPlane
        } else {
            LinePlaneRelation::Parallel
        }
    } else {
        let t = numer / denom;
        let point = origin + dir * t;
        LinePlaneRelation::Point { point, t }
    }
}

/// Relationship of a line with an infinite cylinder.
#[derive(Debug)]
pub enum LineCylinderRelation {
    /// Line pierces the mantle; parameters are sorted ascending.
    Points { t: [f64; 2] },
    /// Line runs parallel to the cylinder axis.
    Parallel,
    /// Line passes the cylinder without touching it.
    Miss,
}

/// Computes the intersections of a line `origin + t * dir` with the infinite
/// cylinder carrying `cylinder`. Bounds along the axis are ignored.
#[must_use]
pub fn line_cylinder_intersect(
    origin: &Point3,
    dir: &Vector3,
    cylinder: &CylinderSurface,
) -> LineCylinderRelation {
    let axis = cylinder.axis();
    let rel = origin - cylinder.center();

    // Project onto the plane orthogonal to the axis
    let d = dir - axis * dir.dot(axis);
    let m = rel - axis * rel.dot(axis);

    let a = d.norm_squared();
    if a < TOLERANCE {
        return LineCylinderRelation::Parallel;
    }
    let b = 2.0 * m.dot(&d);
    let c = m.norm_squared() - cylinder.radius() * cylinder.radius();

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return LineCylinderRelation::Miss;
    }
    let sqrt_disc = disc.sqrt();
    let t0 = (-b - sqrt_disc) / (2.0 * a);
    let t1 = (-b + sqrt_disc) / (2.0 * a);
    LineCylinderRelation::Points { t: [t0, t1] }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    // ── line_plane_intersect ──

    #[test]
    fn line_hits_plane() {
        let plane = PlaneSurface::from_normal(p(0.0, 0.0, 5.0), v(0.0, 0.0, 1.0)).unwrap();
        let result = line_plane_intersect(&p(0.0, 0.0, 0.0), &v(0.0, 0.0, 1.0), &plane);
        match result {
            LinePlaneRelation::Point { point, t } => {
                assert!((t - 5.0).abs() < TOLERANCE);
                assert!((point.z - 5.0).abs() < TOLERANCE);
            }
            other => panic!("expected Point, got {other:?}"),
        }
    }

    #[test]
    fn line_behind_plane_has_negative_parameter() {
        let plane = PlaneSurface::from_normal(p(0.0, 0.0, -2.0), v(0.0, 0.0, 1.0)).unwrap();
        match line_plane_intersect(&p(0.0, 0.0, 0.0), &v(0.0, 0.0, 1.0), &plane) {
            LinePlaneRelation::Point { t, .. } => assert!((t + 2.0).abs() < TOLERANCE),
            other => panic!("expected Point, got {other:?}"),
        }
    }

    #[test]
    fn line_parallel_to_plane() {
        let plane = PlaneSurface::from_normal(p(0.0, 0.0, 5.0), v(0.0, 0.0, 1.0)).unwrap();
        let result = line_plane_intersect(&p(0.0, 0.0, 0.0), &v(1.0, 0.0, 0.0), &plane);
        assert!(matches!(result, LinePlaneRelation::Parallel));
    }

    #[test]
    fn line_on_plane() {
        let plane = PlaneSurface::from_normal(p(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0)).unwrap();
        let result = line_plane_intersect(&p(1.0, 2.0, 0.0), &v(1.0, 0.0, 0.0), &plane);
        assert!(matches!(result, LinePlaneRelation::OnPlane));
    }

    // ── line_cylinder_intersect ──

    #[test]
    fn line_through_axis_hits_twice() {
        let cyl = CylinderSurface::new(p(0.0, 0.0, 0.0), 2.0, v(0.0, 0.0, 1.0), 10.0).unwrap();
        match line_cylinder_intersect(&p(-5.0, 0.0, 0.0), &v(1.0, 0.0, 0.0), &cyl) {
            LineCylinderRelation::Points { t } => {
                assert!((t[0] - 3.0).abs() < 1e-9);
                assert!((t[1] - 7.0).abs() < 1e-9);
            }
            other => panic!("expected Points, got {other:?}"),
        }
    }

    #[test]
    fn line_along_axis_is_parallel() {
        let cyl = CylinderSurface::new(p(0.0, 0.0, 0.0), 2.0, v(0.0, 0.0, 1.0), 10.0).unwrap();
        let result = line_cylinder_intersect(&p(0.5, 0.0, 0.0), &v(0.0, 0.0, 1.0), &cyl);
        assert!(matches!(result, LineCylinderRelation::Parallel));
    }

    #[test]
    fn line_outside_misses() {
        let cyl = CylinderSurface::new(p(0.0, 0.0, 0.0), 1.0, v(0.0, 0.0, 1.0), 10.0).unwrap();
        let result = line_cylinder_intersect(&p(-5.0, 3.0, 0.0), &v(1.0, 0.0, 0.0), &cyl);
        assert!(matches!(result, LineCylinderRelation::Miss));
    }
}
