use crate::math::{Point3, Vector3};

use super::frustum::Frustum;
use super::NodeIndex;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Creates a box from two corners, ordering each axis.
    #[must_use]
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Creates a box from its center and half-extents.
    #[must_use]
    pub fn from_center_half_extents(center: Point3, half_extents: Vector3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box enclosing all `points`, or `None` if there are none.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self { min: first, max: first }, |acc, p| Self {
            min: acc.min.inf(p),
            max: acc.max.sup(p),
        }))
    }

    /// Smallest box enclosing both boxes.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns `true` if `point` lies inside or on the box.
    #[must_use]
    pub fn contains_point(&self, point: &Point3) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Returns `true` if `other` lies entirely inside this box.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    /// Conservative box/frustum overlap test.
    ///
    /// For every frustum face the box corner furthest along the inward
    /// normal is tested; the box is rejected only if that corner lies
    /// outside. Boxes near frustum edges may be accepted although they do
    /// not overlap, overlapping boxes are never rejected.
    #[must_use]
    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        let apex = frustum.apex();
        frustum.normals().iter().all(|n| {
            let corner = Point3::new(
                if n.x >= 0.0 { self.max.x } else { self.min.x },
                if n.y >= 0.0 { self.max.y } else { self.min.y },
                if n.z >= 0.0 { self.max.z } else { self.min.z },
            );
            (corner - apex).dot(n) >= 0.0
        })
    }
}

/// A node of the bounding volume tree.
///
/// Leaf nodes carry the entity they bound; interior nodes carry the first of
/// their children. Siblings are chained through `skip`, and the last sibling
/// skips to wherever its parent skips.
#[derive(Debug, Clone)]
pub struct BoundingBox<E> {
    aabb: Aabb,
    entity: Option<E>,
    left_child: Option<NodeIndex>,
    skip: Option<NodeIndex>,
}

impl<E: Copy> BoundingBox<E> {
    /// Creates a leaf node bounding `entity`.
    #[must_use]
    pub fn leaf(aabb: Aabb, entity: E) -> Self {
        Self {
            aabb,
            entity: Some(entity),
            left_child: None,
            skip: None,
        }
    }

    pub(super) fn interior(aabb: Aabb, left_child: NodeIndex) -> Self {
        Self {
            aabb,
            entity: None,
            left_child: Some(left_child),
            skip: None,
        }
    }

    /// Returns the box extent.
    #[must_use]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Returns the bounded entity, if this is a leaf.
    #[must_use]
    pub fn entity(&self) -> Option<E> {
        self.entity
    }

    /// Returns the first child, if this is an interior node.
    #[must_use]
    pub fn left_child(&self) -> Option<NodeIndex> {
        self.left_child
    }

    /// Returns the node visited after this one when its subtree is skipped.
    #[must_use]
    pub fn skip(&self) -> Option<NodeIndex> {
        self.skip
    }

    pub(super) fn set_skip(&mut self, skip: Option<NodeIndex>) {
        self.skip = skip;
    }

    pub(super) fn clear_links(&mut self) {
        self.left_child = None;
        self.skip = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn new_orders_corners() {
        let b = Aabb::new(p(1.0, -1.0, 3.0), p(-1.0, 1.0, 0.0));
        assert_eq!(b.min, p(-1.0, -1.0, 0.0));
        assert_eq!(b.max, p(1.0, 1.0, 3.0));
    }

    #[test]
    fn from_points_encloses_all() {
        let pts = [p(0.0, 0.0, 0.0), p(2.0, -1.0, 4.0), p(-3.0, 5.0, 1.0)];
        let b = Aabb::from_points(&pts).unwrap();
        assert_eq!(b.min, p(-3.0, -1.0, 0.0));
        assert_eq!(b.max, p(2.0, 5.0, 4.0));
        assert!(Aabb::from_points(&[]).is_none());
    }

    #[test]
    fn merged_contains_both() {
        let a = Aabb::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        let b = Aabb::new(p(5.0, 5.0, 5.0), p(6.0, 6.0, 6.0));
        let m = a.merged(&b);
        assert!(m.contains(&a));
        assert!(m.contains(&b));
        assert_eq!(m.center(), p(3.0, 3.0, 3.0));
    }

    #[test]
    fn box_ahead_intersects_frustum() {
        let f = Frustum::new(Point3::origin(), Vector3::z(), 0.1).unwrap();
        let ahead = Aabb::from_center_half_extents(p(0.0, 0.0, 10.0), Vector3::repeat(1.0));
        assert!(ahead.intersects_frustum(&f));
    }

    #[test]
    fn box_behind_apex_is_rejected() {
        let f = Frustum::new(Point3::origin(), Vector3::z(), 0.1).unwrap();
        let behind = Aabb::from_center_half_extents(p(0.0, 0.0, -10.0), Vector3::repeat(1.0));
        assert!(!behind.intersects_frustum(&f));
    }

    #[test]
    fn box_off_axis_is_rejected() {
        let f = Frustum::new(Point3::origin(), Vector3::z(), 0.1).unwrap();
        let aside = Aabb::from_center_half_extents(p(20.0, 0.0, 10.0), Vector3::repeat(1.0));
        assert!(!aside.intersects_frustum(&f));
    }

    #[test]
    fn box_containing_apex_intersects() {
        let f = Frustum::new(p(0.5, 0.5, 0.5), Vector3::x(), 0.05).unwrap();
        let around = Aabb::new(Point3::origin(), p(1.0, 1.0, 1.0));
        assert!(around.intersects_frustum(&f));
    }
}
