use std::collections::HashSet;

use super::surface::SurfaceId;
use super::updator::VolumeUpdator;
use super::volume::VolumeId;

slotmap::new_key_type! {
    /// Handle of a portal as seen by a volume.
    pub struct PortalId;
}

slotmap::new_key_type! {
    /// Identifier of the link record shared by fused portals.
    pub struct PortalLinkId;
}

/// Direction of travel through a portal relative to its surface normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Against the surface normal.
    Backward,
    /// Along the surface normal.
    Forward,
}

impl Direction {
    /// Both directions, in slot order.
    pub const ALL: [Direction; 2] = [Direction::Backward, Direction::Forward];

    /// Picks the direction from `track_direction . normal`.
    ///
    /// Tangential crossings count as backward.
    #[must_use]
    pub fn from_projection(projection: f64) -> Self {
        if projection > 0.0 {
            Self::Forward
        } else {
            Self::Backward
        }
    }

    /// Returns the slot index of this direction.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Backward => 0,
            Self::Forward => 1,
        }
    }

    /// Returns the other direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Backward => Self::Forward,
            Self::Forward => Self::Backward,
        }
    }
}

/// Resolver and reachable volumes for one direction through a portal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectionSlot {
    /// How the next volume is resolved.
    pub updator: VolumeUpdator,
    /// Volumes the updator may resolve to.
    pub attached: Vec<VolumeId>,
}

impl DirectionSlot {
    /// Returns `true` if a resolver has been assigned.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.updator.is_assigned()
    }

    /// Returns `true` if both slots may resolve to the same set of volumes.
    #[must_use]
    pub fn same_volumes(&self, other: &Self) -> bool {
        let mine: HashSet<_> = self.attached.iter().collect();
        let theirs: HashSet<_> = other.attached.iter().collect();
        mine == theirs
    }
}

/// The record a portal handle points to.
///
/// Fused portals point to the same record, so they share one surface and
/// resolve identically in both directions.
#[derive(Debug, Clone)]
pub struct PortalLink {
    /// The boundary surface.
    pub surface: SurfaceId,
    slots: [DirectionSlot; 2],
}

impl PortalLink {
    pub(super) fn new(surface: SurfaceId) -> Self {
        Self {
            surface,
            slots: Default::default(),
        }
    }

    /// Returns the slot for `direction`.
    #[must_use]
    pub fn slot(&self, direction: Direction) -> &DirectionSlot {
        &self.slots[direction.index()]
    }

    pub(super) fn slot_mut(&mut self, direction: Direction) -> &mut DirectionSlot {
        &mut self.slots[direction.index()]
    }

    /// Returns the attached volumes of both slots, backward first.
    #[must_use]
    pub fn attached_volumes(&self) -> [&[VolumeId]; 2] {
        [&self.slots[0].attached, &self.slots[1].attached]
    }
}
