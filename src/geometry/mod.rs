pub mod surface;

pub use surface::{
    BoundaryCheck, CylinderSurface, Intersection, IntersectionStatus, PlaneSurface, Surface,
    SurfaceShape,
};

/// Opaque token identifying the geometry conditions a call is evaluated in.
///
/// Passed through every navigation call unchanged; the frozen geometry of
/// this crate does not vary with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometryContext;

/// Identifier assigned to a surface during geometry assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub u64);
