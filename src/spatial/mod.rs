pub mod bounding_box;
pub mod frustum;
pub mod octree;

pub use bounding_box::{Aabb, BoundingBox};
pub use frustum::Frustum;
pub use octree::{OctreeConfig, OctreeIndex};

/// Position of a node inside an [`OctreeIndex`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    /// Returns the raw arena position.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}
