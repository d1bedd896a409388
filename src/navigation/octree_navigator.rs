use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::detector::{Detector, VolumeId};
use crate::error::Result;
use crate::geometry::GeometryContext;
use crate::spatial::{BoundingBox, Frustum, OctreeIndex};

use super::candidate::{sort_candidates, CandidateTarget, SurfaceCandidate};
use super::config::NavigatorConfig;
use super::state::{CullingPhase, NavigationState};

/// Navigation delegate that culls candidate portals through an octree of
/// volume boxes.
///
/// The navigator is read-only while stepping. One instance can serve any
/// number of tracks as long as each track owns its [`NavigationState`].
#[derive(Debug, Clone)]
pub struct OctreeNavigator {
    index: OctreeIndex<VolumeId>,
    config: NavigatorConfig,
}

impl OctreeNavigator {
    /// Builds the navigator over explicit volume boxes.
    #[must_use]
    pub fn new(boxes: Vec<BoundingBox<VolumeId>>, config: NavigatorConfig) -> Self {
        Self {
            index: OctreeIndex::build(boxes, config.octree()),
            config,
        }
    }

    /// Builds the navigator over the sub-volumes of `volume`.
    ///
    /// With [`NavigatorConfig::recursive`] set, every innermost volume below
    /// `volume` is indexed instead of the direct sub-volumes. A volume
    /// without sub-volumes yields an empty index.
    ///
    /// # Errors
    ///
    /// Returns an error if a volume of the tree is not found.
    pub fn for_volume(
        detector: &Detector,
        volume: VolumeId,
        config: NavigatorConfig,
    ) -> Result<Self> {
        let mut indexed = Vec::new();
        for &child in detector.volume(volume)?.volumes() {
            if config.recursive() {
                indexed.extend(detector.leaf_volumes(child)?);
            } else {
                indexed.push(child);
            }
        }

        let boxes = indexed
            .into_iter()
            .map(|id| Ok(BoundingBox::leaf(*detector.volume(id)?.bounding_box(), id)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(boxes, config))
    }

    #[must_use]
    pub fn index(&self) -> &OctreeIndex<VolumeId> {
        &self.index
    }

    #[must_use]
    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Advances the candidate cache and selection of `state`.
    ///
    /// Culls when the cache is empty or the position has left the cached
    /// frustum, then refreshes the intersection of every cached candidate
    /// and selects the nearest one ahead of the track. Repeating a step
    /// without moving the track reproduces the same selection.
    pub fn step(&self, ctx: &GeometryContext, detector: &Detector, state: &mut NavigationState) {
        let mut phase = CullingPhase::Stepping;

        if let Some(frustum) = &state.culling_frustum {
            if !frustum.contains(&state.position) {
                debug!(position = ?state.position, "track left culling frustum");
                state.surface_candidates.clear();
                state.selected = None;
                state.culling_frustum = None;
                phase = CullingPhase::Exited;
            }
        }

        if state.surface_candidates.is_empty() {
            if phase == CullingPhase::Stepping {
                phase = CullingPhase::Culled;
            }
            if !self.cull(detector, state) {
                state.selected = None;
                state.phase = CullingPhase::Uninitialized;
                return;
            }
        }

        for candidate in &mut state.surface_candidates {
            candidate.update(ctx, detector, &state.position, &state.direction);
        }
        state.selected = sort_candidates(&mut state.surface_candidates);
        state.phase = phase;

        trace!(
            ?phase,
            candidates = state.surface_candidates.len(),
            path = state.surface_candidate().map(|c| c.intersection.path_length),
            "navigation step"
        );
    }

    /// Rebuilds the candidate cache from the volumes seen by a frustum at
    /// the current position. Returns `false` if no frustum can be built.
    fn cull(&self, detector: &Detector, state: &mut NavigationState) -> bool {
        let half_angle = self.config.half_angle();
        let frustum = match Frustum::new(state.position, state.direction, half_angle) {
            Ok(frustum) => frustum,
            Err(err) => {
                warn!(%err, direction = ?state.direction, "cannot build culling frustum");
                return false;
            }
        };
        if !frustum.contains(&state.position) {
            warn!(position = ?state.position, "culling frustum does not contain its apex");
            return false;
        }

        let volumes = self.index.search(&frustum);
        let mut links = HashSet::new();
        let mut candidates = Vec::new();
        for &id in &volumes {
            let Ok(volume) = detector.volume(id) else {
                warn!(?id, "indexed volume missing from detector");
                continue;
            };
            for &portal in volume.portals() {
                // Fused portals are offered once
                if let Ok(link) = detector.portal_link_id(portal) {
                    if links.insert(link) {
                        candidates.push(SurfaceCandidate::new(
                            CandidateTarget::Portal(portal),
                            state.boundary_check,
                        ));
                    }
                }
            }
            if self.config.include_surfaces() {
                candidates.extend(volume.surfaces().iter().map(|&s| {
                    SurfaceCandidate::new(CandidateTarget::Surface(s), state.boundary_check)
                }));
            }
        }

        debug!(
            volumes = volumes.len(),
            candidates = candidates.len(),
            "culled candidates"
        );
        state.surface_candidates = candidates;
        state.selected = None;
        state.culling_frustum = Some(frustum);
        true
    }
}
