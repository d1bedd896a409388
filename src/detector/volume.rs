use crate::math::{Point3, Transform3};
use crate::spatial::Aabb;

use super::portal::PortalId;
use super::surface::SurfaceId;

slotmap::new_key_type! {
    /// Unique identifier for a volume in the detector store.
    pub struct VolumeId;
}

/// A named region of the detector.
///
/// A volume is bounded by its portals, may hold internal surfaces, and owns
/// an ordered list of sub-volumes. The bounding box encloses the volume in
/// global coordinates and is what the spatial index sees.
#[derive(Debug, Clone)]
pub struct DetectorVolume {
    name: String,
    transform: Transform3,
    bounding_box: Aabb,
    pub(super) portals: Vec<PortalId>,
    pub(super) surfaces: Vec<SurfaceId>,
    pub(super) volumes: Vec<VolumeId>,
    pub(super) parent: Option<VolumeId>,
}

impl DetectorVolume {
    pub(super) fn new(name: String, transform: Transform3, bounding_box: Aabb) -> Self {
        Self {
            name,
            transform,
            bounding_box,
            portals: Vec::new(),
            surfaces: Vec::new(),
            volumes: Vec::new(),
            parent: None,
        }
    }

    /// Returns the volume name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the placement of the volume in the global frame.
    #[must_use]
    pub fn transform(&self) -> &Transform3 {
        &self.transform
    }

    /// Returns the global bounding box.
    #[must_use]
    pub fn bounding_box(&self) -> &Aabb {
        &self.bounding_box
    }

    /// Returns the boundary portals.
    #[must_use]
    pub fn portals(&self) -> &[PortalId] {
        &self.portals
    }

    /// Returns the internal surfaces.
    #[must_use]
    pub fn surfaces(&self) -> &[SurfaceId] {
        &self.surfaces
    }

    /// Returns the sub-volumes in insertion order.
    #[must_use]
    pub fn volumes(&self) -> &[VolumeId] {
        &self.volumes
    }

    /// Returns the enclosing volume, if any.
    #[must_use]
    pub fn parent(&self) -> Option<VolumeId> {
        self.parent
    }

    /// Returns `true` if `position` lies within the bounding box.
    #[must_use]
    pub fn inside(&self, position: &Point3) -> bool {
        self.bounding_box.contains_point(position)
    }
}
