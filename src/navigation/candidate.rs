use std::cmp::Ordering;

use crate::detector::{Detector, PortalId, SurfaceData, SurfaceId};
use crate::error::Result;
use crate::geometry::{BoundaryCheck, GeometryContext, Intersection, IntersectionStatus, Surface};
use crate::math::{Point3, Vector3};

/// What a candidate points at: a plain surface or a portal, whose surface
/// is used for the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateTarget {
    Surface(SurfaceId),
    Portal(PortalId),
}

impl CandidateTarget {
    /// Looks up the surface to intersect.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface or portal is not found.
    pub fn surface<'d>(&self, detector: &'d Detector) -> Result<&'d SurfaceData> {
        match *self {
            Self::Surface(id) => detector.surface(id),
            Self::Portal(id) => detector.portal_surface(id),
        }
    }
}

/// A surface the track may cross next, with its cached intersection.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceCandidate {
    pub target: CandidateTarget,
    pub intersection: Intersection,
    pub boundary_check: BoundaryCheck,
}

impl SurfaceCandidate {
    /// Creates a candidate that has not been intersected yet.
    #[must_use]
    pub fn new(target: CandidateTarget, boundary_check: BoundaryCheck) -> Self {
        Self {
            target,
            intersection: Intersection::unreachable(),
            boundary_check,
        }
    }

    /// Recomputes the intersection for the given position and direction.
    /// A target missing from the detector becomes unreachable.
    pub fn update(
        &mut self,
        ctx: &GeometryContext,
        detector: &Detector,
        position: &Point3,
        direction: &Vector3,
    ) {
        self.intersection = match self.target.surface(detector) {
            Ok(surface) => surface
                .shape
                .intersect(ctx, position, direction, self.boundary_check),
            Err(_) => Intersection::unreachable(),
        };
    }

    /// Returns the ordering tier of this candidate.
    #[must_use]
    pub fn tier(&self) -> CandidateTier {
        CandidateTier::of(&self.intersection)
    }
}

/// Coarse rank of a candidate. Lower tiers sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CandidateTier {
    /// Reachable or on-surface with positive path length.
    Ahead,
    /// Reachable or on-surface, at or behind the current position.
    Behind,
    /// Missed or unreachable.
    Invalid,
}

impl CandidateTier {
    #[must_use]
    pub fn of(intersection: &Intersection) -> Self {
        match intersection.status {
            IntersectionStatus::Reachable | IntersectionStatus::OnSurface
                if intersection.path_length > 0.0 =>
            {
                Self::Ahead
            }
            IntersectionStatus::Reachable | IntersectionStatus::OnSurface => Self::Behind,
            IntersectionStatus::Missed | IntersectionStatus::Unreachable => Self::Invalid,
        }
    }
}

/// Orders candidates by tier, then by path length inside the tier.
///
/// `Behind` candidates compare by absolute path length so the surface the
/// track just left comes first. Every comparison goes through
/// [`f64::total_cmp`], so this is a total order even with NaN paths.
#[must_use]
pub fn compare_candidates(a: &SurfaceCandidate, b: &SurfaceCandidate) -> Ordering {
    let (ta, tb) = (a.tier(), b.tier());
    ta.cmp(&tb).then_with(|| {
        let (pa, pb) = (a.intersection.path_length, b.intersection.path_length);
        match ta {
            CandidateTier::Behind => pa.abs().total_cmp(&pb.abs()),
            CandidateTier::Ahead | CandidateTier::Invalid => pa.total_cmp(&pb),
        }
    })
}

/// Sorts candidates in place (stable) and returns the index of the one to
/// select: the first candidate if it is ahead of the track, otherwise none.
pub fn sort_candidates(candidates: &mut [SurfaceCandidate]) -> Option<usize> {
    candidates.sort_by(compare_candidates);
    candidates
        .first()
        .filter(|c| c.tier() == CandidateTier::Ahead)
        .map(|_| 0)
}
