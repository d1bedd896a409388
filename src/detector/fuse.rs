use tracing::{debug, warn};

use crate::error::{PortalError, Result};

use super::portal::{Direction, PortalId, PortalLink, PortalLinkId};
use super::Detector;

/// Fuses two portals that describe the same boundary into one link record.
///
/// Each direction of the fused record takes whichever side has a resolver
/// assigned. Both handles, and any handle already fused with either of
/// them, point to the new record afterwards. The surface of the first
/// portal is kept.
pub struct FusePortals {
    first: PortalId,
    second: PortalId,
}

impl FusePortals {
    /// Creates a new `FusePortals` operation.
    #[must_use]
    pub fn new(first: PortalId, second: PortalId) -> Self {
        Self { first, second }
    }

    /// Executes the operation and returns the shared record.
    ///
    /// Fusing a portal with itself, or with a portal it is already fused
    /// with, returns the existing record unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::FusionConflict`] if both portals assign a
    /// resolver for the same direction with different attached volumes. The
    /// detector is left untouched in that case. Also fails if either portal
    /// is not found.
    pub fn execute(&self, detector: &mut Detector) -> Result<PortalLinkId> {
        let la = detector.portal_link_id(self.first)?;
        let lb = detector.portal_link_id(self.second)?;
        if la == lb {
            return Ok(la);
        }

        let (a, b) = (detector.link(la)?, detector.link(lb)?);
        let mut merged = PortalLink::new(a.surface);
        for direction in Direction::ALL {
            let (sa, sb) = (a.slot(direction), b.slot(direction));
            if sa.is_assigned() && sb.is_assigned() && !sa.same_volumes(sb) {
                warn!(?direction, "portals disagree on attached volumes");
                return Err(PortalError::FusionConflict { direction }.into());
            }
            *merged.slot_mut(direction) = if sa.is_assigned() {
                sa.clone()
            } else {
                sb.clone()
            };
        }

        let fused = detector.replace_links([la, lb], merged);
        debug!(first = ?self.first, second = ?self.second, "fused portals");
        Ok(fused)
    }
}
