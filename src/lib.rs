pub mod detector;
pub mod error;
pub mod geometry;
pub mod math;
pub mod navigation;
pub mod spatial;

pub use error::{PortalNavError, Result};
