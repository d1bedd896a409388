use crate::geometry::{GeometryId, SurfaceShape};

slotmap::new_key_type! {
    /// Unique identifier for a surface in the detector store.
    pub struct SurfaceId;
}

/// A surface owned by the detector, either a portal surface or an internal
/// surface of a volume.
#[derive(Debug, Clone)]
pub struct SurfaceData {
    /// The surface geometry.
    pub shape: SurfaceShape,
    /// Identifier assigned during assembly.
    pub geometry_id: Option<GeometryId>,
}

impl SurfaceData {
    /// Wraps a shape without a geometry identifier.
    #[must_use]
    pub fn new(shape: impl Into<SurfaceShape>) -> Self {
        Self {
            shape: shape.into(),
            geometry_id: None,
        }
    }
}
