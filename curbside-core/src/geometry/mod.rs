//! Geometry utilities over WGS84 polylines
//!
//! Planar work (projection, offsets, intersections) happens in a local
//! equirectangular frame measured in metres; reported lengths use haversine.
//! Degenerate input produces `None` or an empty result, never a panic.

mod clip;
mod frame;
mod measure;
mod nearest;
mod offset;
pub(crate) mod planar;
mod slice;

pub use clip::clip_line_to_polygon;
pub use frame::{EARTH_RADIUS_M, LocalFrame};
pub use measure::{distance_m, line_length};
pub use nearest::{NearestPoint, nearest_point_on_line};
pub use offset::offset_line;
pub use slice::slice_line_between;
