use crate::error::{PortalError, Result};
use crate::math::Point3;

use super::volume::VolumeId;

/// Global coordinate a [`BinnedVolumes`] table is binned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinningValue {
    X,
    Y,
    Z,
    /// Transverse radius `sqrt(x^2 + y^2)`.
    R,
}

impl BinningValue {
    /// Extracts the binned coordinate from a global position.
    #[must_use]
    pub fn value(self, position: &Point3) -> f64 {
        match self {
            Self::X => position.x,
            Self::Y => position.y,
            Self::Z => position.z,
            Self::R => position.x.hypot(position.y),
        }
    }
}

/// Lookup table from a binned coordinate to the volume behind a portal.
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedVolumes {
    binning: BinningValue,
    edges: Vec<f64>,
    volumes: Vec<VolumeId>,
}

impl BinnedVolumes {
    /// Creates a table where bin `i` spans `[edges[i], edges[i + 1])` and
    /// resolves to `volumes[i]`. The last bin is closed on both sides.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::InvalidBinning`] if there is not exactly one
    /// more edge than volumes, no volume at all, or the edges are not finite
    /// and strictly increasing.
    pub fn new(binning: BinningValue, edges: Vec<f64>, volumes: Vec<VolumeId>) -> Result<Self> {
        if volumes.is_empty() || edges.len() != volumes.len() + 1 {
            return Err(PortalError::InvalidBinning(format!(
                "{} edges cannot bound {} volumes",
                edges.len(),
                volumes.len()
            ))
            .into());
        }
        if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PortalError::InvalidBinning(
                "edges must be finite and strictly increasing".into(),
            )
            .into());
        }
        Ok(Self {
            binning,
            edges,
            volumes,
        })
    }

    /// Returns the volumes in bin order.
    #[must_use]
    pub fn volumes(&self) -> &[VolumeId] {
        &self.volumes
    }

    /// Returns the volume whose bin contains `position`, or `None` outside
    /// the binned range.
    #[must_use]
    pub fn lookup(&self, position: &Point3) -> Option<VolumeId> {
        let value = self.binning.value(position);
        let (first, last) = (self.edges[0], self.edges[self.edges.len() - 1]);
        if !(first..=last).contains(&value) {
            return None;
        }
        let bin = self
            .edges
            .partition_point(|&e| e <= value)
            .saturating_sub(1)
            .min(self.volumes.len() - 1);
        Some(self.volumes[bin])
    }
}

/// Strategy a portal uses to pick the volume behind it for one direction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VolumeUpdator {
    /// Nothing lies behind the portal in this direction.
    #[default]
    EndOfWorld,
    /// Always the same volume.
    Single(VolumeId),
    /// A volume looked up by position.
    Binned(BinnedVolumes),
}

impl VolumeUpdator {
    /// Resolves the next volume for a track crossing at `position`.
    #[must_use]
    pub fn resolve(&self, position: &Point3) -> Option<VolumeId> {
        match self {
            Self::EndOfWorld => None,
            Self::Single(volume) => Some(*volume),
            Self::Binned(table) => table.lookup(position),
        }
    }

    /// Returns `true` unless this is [`VolumeUpdator::EndOfWorld`].
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        !matches!(self, Self::EndOfWorld)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<VolumeId> {
        let mut map = SlotMap::<VolumeId, ()>::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn end_of_world_resolves_to_none() {
        let u = VolumeUpdator::default();
        assert!(!u.is_assigned());
        assert_eq!(u.resolve(&Point3::origin()), None);
    }

    #[test]
    fn single_ignores_position() {
        let v = ids(1)[0];
        let u = VolumeUpdator::Single(v);
        assert_eq!(u.resolve(&Point3::new(1e6, -3.0, 2.0)), Some(v));
    }

    #[test]
    fn binned_lookup_by_z() {
        let v = ids(3);
        let edges = vec![0.0, 1.0, 5.0, 6.0];
        let table = BinnedVolumes::new(BinningValue::Z, edges, v.clone()).unwrap();
        let u = VolumeUpdator::Binned(table);
        assert_eq!(u.resolve(&Point3::new(0.0, 0.0, 0.5)), Some(v[0]));
        assert_eq!(u.resolve(&Point3::new(0.0, 0.0, 1.0)), Some(v[1]));
        assert_eq!(u.resolve(&Point3::new(0.0, 0.0, 6.0)), Some(v[2]));
        assert_eq!(u.resolve(&Point3::new(0.0, 0.0, 6.5)), None);
        assert_eq!(u.resolve(&Point3::new(0.0, 0.0, -0.1)), None);
    }

    #[test]
    fn binned_lookup_by_radius() {
        let v = ids(2);
        let table = BinnedVolumes::new(BinningValue::R, vec![0.0, 10.0, 20.0], v.clone()).unwrap();
        assert_eq!(table.lookup(&Point3::new(3.0, 4.0, -100.0)), Some(v[0]));
        assert_eq!(table.lookup(&Point3::new(0.0, 15.0, 0.0)), Some(v[1]));
    }

    #[test]
    fn binned_rejects_bad_edges() {
        let v = ids(2);
        assert!(BinnedVolumes::new(BinningValue::X, vec![0.0, 1.0], v.clone()).is_err());
        assert!(BinnedVolumes::new(BinningValue::X, vec![0.0, 2.0, 1.0], v.clone()).is_err());
        assert!(BinnedVolumes::new(BinningValue::X, vec![0.0, f64::NAN, 1.0], v).is_err());
        assert!(BinnedVolumes::new(BinningValue::X, vec![0.0], Vec::new()).is_err());
    }
}
