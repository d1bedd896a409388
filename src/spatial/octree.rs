use std::collections::HashSet;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::error::{IndexError, Result};

use super::bounding_box::{Aabb, BoundingBox};
use super::frustum::Frustum;
use super::NodeIndex;

/// Parameters controlling how the octree subdivides its leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OctreeConfig {
    max_leaf_size: usize,
    max_depth: usize,
}

impl OctreeConfig {
    /// Creates a configuration holding at most `max_leaf_size` entities per
    /// leaf group.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidParameters`] if `max_leaf_size` is zero.
    pub fn new(max_leaf_size: usize) -> Result<Self> {
        if max_leaf_size == 0 {
            return Err(
                IndexError::InvalidParameters("max leaf size must be positive".into()).into(),
            );
        }
        Ok(Self {
            max_leaf_size,
            ..Self::default()
        })
    }

    /// Limits the subdivision depth.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidParameters`] if `max_depth` is zero.
    pub fn with_max_depth(mut self, max_depth: usize) -> Result<Self> {
        if max_depth == 0 {
            return Err(IndexError::InvalidParameters("max depth must be positive".into()).into());
        }
        self.max_depth = max_depth;
        Ok(self)
    }

    /// Returns the maximum number of entities grouped under one node.
    #[must_use]
    pub fn max_leaf_size(&self) -> usize {
        self.max_leaf_size
    }

    /// Returns the maximum subdivision depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_leaf_size: 8,
            max_depth: 16,
        }
    }
}

/// Bounding volume tree over a fixed set of entity boxes.
///
/// All nodes live in one arena and refer to each other by [`NodeIndex`].
/// Each node stores its first child and a skip link, which lets
/// [`OctreeIndex::search`] walk the tree without a stack: descend on a hit,
/// follow skip on a miss or after a leaf, stop when skip is `None`.
#[derive(Debug, Clone)]
pub struct OctreeIndex<E> {
    nodes: Vec<BoundingBox<E>>,
    root: Option<NodeIndex>,
}

impl<E: Copy + Eq + Hash> OctreeIndex<E> {
    /// Builds the index from leaf boxes.
    ///
    /// Leaves are grouped by splitting the extent of their centers into
    /// octants until a group holds at most `max_leaf_size` boxes, the split
    /// no longer separates them, or `max_depth` is reached. An empty input
    /// yields an empty index.
    #[must_use]
    pub fn build(leaves: Vec<BoundingBox<E>>, config: &OctreeConfig) -> Self {
        if leaves.is_empty() {
            debug!("octree built from zero boxes, index is empty");
            return Self {
                nodes: Vec::new(),
                root: None,
            };
        }

        let leaf_count = leaves.len();
        let mut builder = Builder {
            nodes: leaves,
            children: vec![Vec::new(); leaf_count],
            config,
        };
        for node in &mut builder.nodes {
            node.clear_links();
        }

        let all = (0..leaf_count).map(NodeIndex).collect();
        let root = builder.group(all, 0);
        builder.link_skips(root, None);

        debug!(
            leaves = leaf_count,
            nodes = builder.nodes.len(),
            "octree built"
        );
        Self {
            nodes: builder.nodes,
            root: Some(root),
        }
    }

    /// Returns the root node, or `None` for an empty index.
    #[must_use]
    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    /// Returns `true` if the index holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of nodes, leaves included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates over the entities of all leaves in arena order.
    pub fn entities(&self) -> impl Iterator<Item = E> + '_ {
        self.nodes.iter().filter_map(BoundingBox::entity)
    }

    /// Returns the node at `index`.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&BoundingBox<E>> {
        self.nodes.get(index.0)
    }

    /// Returns the extent of the whole index.
    #[must_use]
    pub fn bounds(&self) -> Option<&Aabb> {
        self.root.and_then(|r| self.node(r)).map(BoundingBox::aabb)
    }

    /// Collects the entities of every leaf whose box overlaps `frustum`.
    ///
    /// Each entity is reported once, in traversal order. Subtrees whose box
    /// misses the frustum are skipped whole.
    #[must_use]
    pub fn search(&self, frustum: &Frustum) -> Vec<E> {
        self.search_counted(frustum).0
    }

    /// Same as [`OctreeIndex::search`], also returning how many nodes were
    /// visited.
    pub(crate) fn search_counted(&self, frustum: &Frustum) -> (Vec<E>, usize) {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut visited = 0_usize;

        let mut cursor = self.root;
        while let Some(node) = cursor.and_then(|c| self.node(c)) {
            visited += 1;
            cursor = if node.aabb().intersects_frustum(frustum) {
                match (node.entity(), node.left_child()) {
                    (Some(entity), _) => {
                        if seen.insert(entity) {
                            found.push(entity);
                        }
                        node.skip()
                    }
                    (None, Some(child)) => Some(child),
                    (None, None) => node.skip(),
                }
            } else {
                node.skip()
            };
        }

        trace!(visited, found = found.len(), "octree search");
        (found, visited)
    }
}

struct Builder<'a, E> {
    nodes: Vec<BoundingBox<E>>,
    children: Vec<Vec<NodeIndex>>,
    config: &'a OctreeConfig,
}

impl<E: Copy> Builder<'_, E> {
    fn aabb(&self, index: NodeIndex) -> &Aabb {
        self.nodes[index.0].aabb()
    }

    /// Returns the node representing `members`, creating interior nodes as needed.
    fn group(&mut self, members: Vec<NodeIndex>, depth: usize) -> NodeIndex {
        if members.len() == 1 {
            return members[0];
        }
        if members.len() <= self.config.max_leaf_size() || depth >= self.config.max_depth() {
            return self.wrap(members);
        }

        let centers: Vec<_> = members.iter().map(|&m| self.aabb(m).center()).collect();
        let Some(extent) = Aabb::from_points(&centers) else {
            return self.wrap(members);
        };
        let split = extent.center();

        let mut octants: [Vec<NodeIndex>; 8] = Default::default();
        for (&member, center) in members.iter().zip(&centers) {
            let octant = usize::from(center.x > split.x)
                | (usize::from(center.y > split.y) << 1)
                | (usize::from(center.z > split.z) << 2);
            octants[octant].push(member);
        }

        if octants.iter().filter(|o| !o.is_empty()).count() <= 1 {
            // Coincident centers cannot be separated any further
            return self.wrap(members);
        }

        let kids = octants
            .into_iter()
            .filter(|o| !o.is_empty())
            .map(|o| self.group(o, depth + 1))
            .collect();
        self.wrap(kids)
    }

    fn wrap(&mut self, kids: Vec<NodeIndex>) -> NodeIndex {
        let aabb = kids
            .iter()
            .skip(1)
            .fold(*self.aabb(kids[0]), |acc, &k| acc.merged(self.aabb(k)));
        let index = NodeIndex(self.nodes.len());
        self.nodes.push(BoundingBox::interior(aabb, kids[0]));
        self.children.push(kids);
        index
    }

    /// Chains siblings through their skip links; the last sibling inherits
    /// the skip of its parent.
    fn link_skips(&mut self, node: NodeIndex, skip: Option<NodeIndex>) {
        self.nodes[node.0].set_skip(skip);
        let kids = std::mem::take(&mut self.children[node.0]);
        for (i, &kid) in kids.iter().enumerate() {
            let next = kids.get(i + 1).copied().or(skip);
            self.link_skips(kid, next);
        }
        self.children[node.0] = kids;
    }
}
