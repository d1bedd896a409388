pub mod fuse;
pub mod portal;
pub mod surface;
pub mod updator;
pub mod volume;

pub use fuse::FusePortals;
pub use portal::{Direction, DirectionSlot, PortalId, PortalLink, PortalLinkId};
pub use surface::{SurfaceData, SurfaceId};
pub use updator::{BinnedVolumes, BinningValue, VolumeUpdator};
pub use volume::{DetectorVolume, VolumeId};

use slotmap::SlotMap;
use tracing::debug;

use crate::error::{DetectorError, Result};
use crate::geometry::{GeometryContext, GeometryId, Surface, SurfaceShape};
use crate::math::{Point3, Transform3};
use crate::navigation::NavigationState;
use crate::spatial::Aabb;

/// Central arena that owns all detector entities.
///
/// Entities reference each other via typed IDs (generational indices).
/// A portal ID is a handle onto a [`PortalLink`] record; fusing portals
/// makes several handles share one record.
#[derive(Debug, Default)]
pub struct Detector {
    volumes: SlotMap<VolumeId, DetectorVolume>,
    portals: SlotMap<PortalId, PortalLinkId>,
    links: SlotMap<PortalLinkId, PortalLink>,
    surfaces: SlotMap<SurfaceId, SurfaceData>,
}

impl Detector {
    /// Creates a new, empty detector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Volume operations ---

    /// Inserts a top-level volume and returns its ID.
    pub fn add_volume(
        &mut self,
        name: impl Into<String>,
        transform: Transform3,
        bounding_box: Aabb,
    ) -> VolumeId {
        self.volumes
            .insert(DetectorVolume::new(name.into(), transform, bounding_box))
    }

    /// Appends `child` to the sub-volumes of `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if either volume is not found, `child` already has a
    /// parent, or `child` encloses `parent` (which would form a cycle).
    pub fn add_sub_volume(&mut self, parent: VolumeId, child: VolumeId) -> Result<()> {
        if self.volume(child)?.parent.is_some() {
            return Err(DetectorError::InvalidHierarchy(format!(
                "volume '{}' already has a parent",
                self.volume(child)?.name()
            ))
            .into());
        }
        let mut ancestor = Some(parent);
        while let Some(a) = ancestor {
            if a == child {
                return Err(DetectorError::InvalidHierarchy(
                    "volume cannot contain one of its ancestors".into(),
                )
                .into());
            }
            ancestor = self.volume(a)?.parent;
        }

        self.volume_mut(parent)?.volumes.push(child);
        self.volume_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Returns a reference to the volume, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn volume(&self, id: VolumeId) -> Result<&DetectorVolume> {
        Ok(self
            .volumes
            .get(id)
            .ok_or_else(|| DetectorError::EntityNotFound("volume".into()))?)
    }

    fn volume_mut(&mut self, id: VolumeId) -> Result<&mut DetectorVolume> {
        Ok(self
            .volumes
            .get_mut(id)
            .ok_or_else(|| DetectorError::EntityNotFound("volume".into()))?)
    }

    /// Collects the volumes below `root` that have no sub-volumes, in depth
    /// first order. A volume without sub-volumes yields itself.
    ///
    /// # Errors
    ///
    /// Returns an error if a volume in the tree is not found.
    pub fn leaf_volumes(&self, root: VolumeId) -> Result<Vec<VolumeId>> {
        let mut leaves = Vec::new();
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            let volume = self.volume(id)?;
            if volume.volumes().is_empty() {
                leaves.push(id);
            } else {
                pending.extend(volume.volumes().iter().rev());
            }
        }
        Ok(leaves)
    }

    /// Finds the deepest volume below `root` whose bounding box contains
    /// `position`, or `None` if `root` itself does not.
    ///
    /// # Errors
    ///
    /// Returns an error if a volume in the tree is not found.
    pub fn locate(&self, root: VolumeId, position: &Point3) -> Result<Option<VolumeId>> {
        if !self.volume(root)?.inside(position) {
            return Ok(None);
        }
        let mut current = root;
        'descend: loop {
            for &child in self.volume(current)?.volumes() {
                if self.volume(child)?.inside(position) {
                    current = child;
                    continue 'descend;
                }
            }
            return Ok(Some(current));
        }
    }

    // --- Surface operations ---

    /// Adds an internal surface to `volume`.
    ///
    /// # Errors
    ///
    /// Returns an error if the volume is not found.
    pub fn add_surface(
        &mut self,
        volume: VolumeId,
        shape: impl Into<SurfaceShape>,
    ) -> Result<SurfaceId> {
        self.volume(volume)?;
        let id = self.surfaces.insert(SurfaceData::new(shape));
        self.volume_mut(volume)?.surfaces.push(id);
        Ok(id)
    }

    /// Returns a reference to the surface data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn surface(&self, id: SurfaceId) -> Result<&SurfaceData> {
        Ok(self
            .surfaces
            .get(id)
            .ok_or_else(|| DetectorError::EntityNotFound("surface".into()))?)
    }

    // --- Portal operations ---

    /// Creates a portal on `shape` bounding `volume`. Both directions start
    /// unassigned.
    ///
    /// # Errors
    ///
    /// Returns an error if the volume is not found.
    pub fn add_portal(
        &mut self,
        volume: VolumeId,
        shape: impl Into<SurfaceShape>,
    ) -> Result<PortalId> {
        self.volume(volume)?;
        let surface = self.surfaces.insert(SurfaceData::new(shape));
        let link = self.links.insert(PortalLink::new(surface));
        let portal = self.portals.insert(link);
        self.volume_mut(volume)?.portals.push(portal);
        Ok(portal)
    }

    /// Lists an existing portal among the boundaries of another volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the volume or portal is not found.
    pub fn attach_portal(&mut self, volume: VolumeId, portal: PortalId) -> Result<()> {
        self.portal_link_id(portal)?;
        let portals = &mut self.volume_mut(volume)?.portals;
        if !portals.contains(&portal) {
            portals.push(portal);
        }
        Ok(())
    }

    /// Returns the link record a portal handle points to.
    ///
    /// # Errors
    ///
    /// Returns an error if the portal is not found.
    pub fn portal_link_id(&self, portal: PortalId) -> Result<PortalLinkId> {
        Ok(*self
            .portals
            .get(portal)
            .ok_or_else(|| DetectorError::EntityNotFound("portal".into()))?)
    }

    /// Returns the link record of a portal.
    ///
    /// # Errors
    ///
    /// Returns an error if the portal or its record is not found.
    pub fn portal(&self, portal: PortalId) -> Result<&PortalLink> {
        let link = self.portal_link_id(portal)?;
        Ok(self
            .links
            .get(link)
            .ok_or_else(|| DetectorError::EntityNotFound("portal link".into()))?)
    }

    fn portal_mut(&mut self, portal: PortalId) -> Result<&mut PortalLink> {
        let link = self.portal_link_id(portal)?;
        Ok(self
            .links
            .get_mut(link)
            .ok_or_else(|| DetectorError::EntityNotFound("portal link".into()))?)
    }

    /// Returns the surface of a portal.
    ///
    /// # Errors
    ///
    /// Returns an error if the portal or its surface is not found.
    pub fn portal_surface(&self, portal: PortalId) -> Result<&SurfaceData> {
        self.surface(self.portal(portal)?.surface)
    }

    /// Assigns the geometry identifier of a portal's surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the portal or its surface is not found.
    pub fn assign_portal_geometry_id(&mut self, portal: PortalId, id: GeometryId) -> Result<()> {
        let surface = self.portal(portal)?.surface;
        self.surfaces
            .get_mut(surface)
            .ok_or_else(|| DetectorError::EntityNotFound("surface".into()))?
            .geometry_id = Some(id);
        Ok(())
    }

    /// Attaches a resolver to one direction of a portal, replacing any
    /// previous one. `volumes` lists what the resolver may return and is
    /// checked when portals are fused.
    ///
    /// # Errors
    ///
    /// Returns an error if the portal or any of the volumes is not found.
    pub fn assign_volume_updator(
        &mut self,
        portal: PortalId,
        direction: Direction,
        updator: VolumeUpdator,
        volumes: Vec<VolumeId>,
    ) -> Result<()> {
        for &v in &volumes {
            self.volume(v)?;
        }
        let slot = self.portal_mut(portal)?.slot_mut(direction);
        slot.updator = updator;
        slot.attached = volumes;
        Ok(())
    }

    /// Returns the volumes attached to a portal, backward direction first.
    ///
    /// # Errors
    ///
    /// Returns an error if the portal is not found.
    pub fn attached_volumes(&self, portal: PortalId) -> Result<[&[VolumeId]; 2]> {
        Ok(self.portal(portal)?.attached_volumes())
    }

    /// Returns `true` if both handles point to the same link record.
    ///
    /// # Errors
    ///
    /// Returns an error if either portal is not found.
    pub fn portals_fused(&self, a: PortalId, b: PortalId) -> Result<bool> {
        Ok(self.portal_link_id(a)? == self.portal_link_id(b)?)
    }

    /// Fuses two portals describing the same boundary.
    ///
    /// # Errors
    ///
    /// See [`FusePortals::execute`].
    pub fn fuse_portals(&mut self, a: PortalId, b: PortalId) -> Result<PortalLinkId> {
        FusePortals::new(a, b).execute(self)
    }

    /// Resolves the volume behind `portal` for the state's position and
    /// direction. The direction through the portal follows the sign of the
    /// track direction projected on the surface normal.
    ///
    /// Returns `Ok(None)` when nothing is known behind the portal.
    ///
    /// # Errors
    ///
    /// Returns an error if the portal or its surface is not found.
    pub fn resolve_next_volume(
        &self,
        ctx: &GeometryContext,
        portal: PortalId,
        state: &NavigationState,
    ) -> Result<Option<VolumeId>> {
        let normal = self.portal_surface(portal)?.shape.normal(ctx, &state.position);
        let direction = Direction::from_projection(state.direction.dot(&normal));
        self.resolve_next_volume_in(ctx, portal, direction, state)
    }

    /// Resolves the volume behind `portal` for an explicit direction,
    /// regardless of where the track is heading.
    ///
    /// # Errors
    ///
    /// Returns an error if the portal is not found.
    pub fn resolve_next_volume_in(
        &self,
        _ctx: &GeometryContext,
        portal: PortalId,
        direction: Direction,
        state: &NavigationState,
    ) -> Result<Option<VolumeId>> {
        Ok(self
            .portal(portal)?
            .slot(direction)
            .updator
            .resolve(&state.position))
    }

    /// Moves the state into the volume behind `portal`. The state's volume
    /// becomes `None` at the end of the known world.
    ///
    /// # Errors
    ///
    /// Returns an error if the portal or its surface is not found.
    pub fn update_detector_volume(
        &self,
        ctx: &GeometryContext,
        portal: PortalId,
        state: &mut NavigationState,
    ) -> Result<()> {
        let next = self.resolve_next_volume(ctx, portal, state)?;
        debug!(?portal, ?next, "crossing portal");
        state.current_volume = next;
        Ok(())
    }

    pub(crate) fn replace_links(
        &mut self,
        old: [PortalLinkId; 2],
        merged: PortalLink,
    ) -> PortalLinkId {
        let surface = merged.surface;
        let new = self.links.insert(merged);
        for link in self.portals.values_mut() {
            if old.contains(link) {
                *link = new;
            }
        }
        for id in old {
            if let Some(record) = self.links.remove(id) {
                if record.surface != surface {
                    self.surfaces.remove(record.surface);
                }
            }
        }
        new
    }

    pub(crate) fn link(&self, id: PortalLinkId) -> Result<&PortalLink> {
        Ok(self
            .links
            .get(id)
            .ok_or_else(|| DetectorError::EntityNotFound("portal link".into()))?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::PlaneSurface;
    use crate::math::Vector3;

    fn boxed(min: [f64; 3], max: [f64; 3]) -> Aabb {
        Aabb::new(Point3::from(min), Point3::from(max))
    }

    fn xy_plane(z: f64) -> PlaneSurface {
        PlaneSurface::new(Point3::new(0.0, 0.0, z), Vector3::x(), Vector3::y())
            .unwrap()
            .with_rectangle(10.0, 100.0)
            .unwrap()
    }

    fn state(direction: Vector3) -> NavigationState {
        NavigationState::new(Point3::origin(), direction)
    }

    fn two_volumes() -> (Detector, VolumeId, VolumeId) {
        let mut det = Detector::new();
        let a = det.add_volume("A", Transform3::identity(), boxed([-1.0; 3], [1.0; 3]));
        let b = det.add_volume("B", Transform3::identity(), boxed([-1.0; 3], [1.0; 3]));
        (det, a, b)
    }

    #[test]
    fn portal_forward_link() {
        let (mut det, a, _) = two_volumes();
        let portal = det.add_portal(a, xy_plane(0.0)).unwrap();
        det.assign_volume_updator(portal, Direction::Forward, VolumeUpdator::Single(a), vec![a])
            .unwrap();

        let attached = det.attached_volumes(portal).unwrap();
        assert!(attached[0].is_empty());
        assert_eq!(attached[1], &[a]);

        let ctx = GeometryContext;
        let forward = det.resolve_next_volume(&ctx, portal, &state(Vector3::z())).unwrap();
        assert_eq!(forward, Some(a));
        let backward = det.resolve_next_volume(&ctx, portal, &state(-Vector3::z())).unwrap();
        assert_eq!(backward, None);
    }

    #[test]
    fn update_detector_volume_writes_state() {
        let (mut det, a, b) = two_volumes();
        let portal = det.add_portal(a, xy_plane(0.0)).unwrap();
        det.assign_volume_updator(portal, Direction::Backward, VolumeUpdator::Single(b), vec![b])
            .unwrap();

        let mut s = state(-Vector3::z()).with_volume(a);
        det.update_detector_volume(&GeometryContext, portal, &mut s).unwrap();
        assert_eq!(s.current_volume, Some(b));

        s.direction = Vector3::z();
        det.update_detector_volume(&GeometryContext, portal, &mut s).unwrap();
        assert_eq!(s.current_volume, None);
    }

    #[test]
    fn explicit_direction_ignores_track() {
        let (mut det, a, b) = two_volumes();
        let portal = det.add_portal(a, xy_plane(0.0)).unwrap();
        det.assign_volume_updator(portal, Direction::Backward, VolumeUpdator::Single(b), vec![b])
            .unwrap();
        let found = det
            .resolve_next_volume_in(
                &GeometryContext,
                portal,
                Direction::Backward,
                &state(Vector3::z()),
            )
            .unwrap();
        assert_eq!(found, Some(b));
    }

    #[test]
    fn assigning_unknown_volume_fails() {
        let (mut det, a, _) = two_volumes();
        let portal = det.add_portal(a, xy_plane(0.0)).unwrap();
        let stranger = VolumeId::default();
        let r = det.assign_volume_updator(
            portal,
            Direction::Forward,
            VolumeUpdator::Single(stranger),
            vec![a, stranger],
        );
        assert!(r.is_err());
        assert!(!det.portal(portal).unwrap().slot(Direction::Forward).is_assigned());
    }

    #[test]
    fn geometry_id_lands_on_surface() {
        let (mut det, a, _) = two_volumes();
        let portal = det.add_portal(a, xy_plane(0.0)).unwrap();
        det.assign_portal_geometry_id(portal, GeometryId(5)).unwrap();
        assert_eq!(det.portal_surface(portal).unwrap().geometry_id, Some(GeometryId(5)));
    }

    #[test]
    fn sub_volume_hierarchy() {
        let mut det = Detector::new();
        let world = det.add_volume("world", Transform3::identity(), boxed([-10.0; 3], [10.0; 3]));
        let left_box = boxed([-10.0; 3], [0.0, 10.0, 10.0]);
        let right_box = boxed([0.0, -10.0, -10.0], [10.0; 3]);
        let left = det.add_volume("left", Transform3::identity(), left_box);
        let right = det.add_volume("right", Transform3::identity(), right_box);
        let inner = det.add_volume("inner", Transform3::identity(), boxed([2.0; 3], [4.0; 3]));
        det.add_sub_volume(world, left).unwrap();
        det.add_sub_volume(world, right).unwrap();
        det.add_sub_volume(right, inner).unwrap();

        assert_eq!(det.volume(world).unwrap().volumes(), &[left, right]);
        assert_eq!(det.volume(inner).unwrap().parent(), Some(right));
        assert_eq!(det.leaf_volumes(world).unwrap(), vec![left, inner]);

        assert_eq!(det.locate(world, &Point3::new(3.0, 3.0, 3.0)).unwrap(), Some(inner));
        assert_eq!(det.locate(world, &Point3::new(-3.0, 0.0, 0.0)).unwrap(), Some(left));
        assert_eq!(det.locate(world, &Point3::new(30.0, 0.0, 0.0)).unwrap(), None);
    }

    #[test]
    fn cycles_and_reparenting_rejected() {
        let mut det = Detector::new();
        let a = det.add_volume("a", Transform3::identity(), boxed([0.0; 3], [1.0; 3]));
        let b = det.add_volume("b", Transform3::identity(), boxed([0.0; 3], [1.0; 3]));
        let c = det.add_volume("c", Transform3::identity(), boxed([0.0; 3], [1.0; 3]));
        det.add_sub_volume(a, b).unwrap();
        assert!(det.add_sub_volume(c, b).is_err());
        assert!(det.add_sub_volume(b, a).is_err());
        assert!(det.add_sub_volume(a, a).is_err());
    }

    #[test]
    fn attach_portal_is_idempotent() {
        let (mut det, a, b) = two_volumes();
        let portal = det.add_portal(a, xy_plane(0.0)).unwrap();
        det.attach_portal(b, portal).unwrap();
        det.attach_portal(b, portal).unwrap();
        assert_eq!(det.volume(b).unwrap().portals(), &[portal]);
    }
}
