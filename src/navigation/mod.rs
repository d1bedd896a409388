pub mod candidate;
pub mod config;
pub mod octree_navigator;
pub mod state;

pub use candidate::{
    compare_candidates, sort_candidates, CandidateTarget, CandidateTier, SurfaceCandidate,
};
pub use config::{NavigatorConfig, DEFAULT_HALF_ANGLE};
pub use octree_navigator::OctreeNavigator;
pub use state::{CullingPhase, NavigationState};
