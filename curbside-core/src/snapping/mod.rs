//! Interactive snapping of freehand line drawing onto guides

mod index;
mod session;

pub use index::{SnapHit, SnapIndex};
pub use session::{DrawOutcome, DrawSession, DrawState, GuideTouch, VertexOutcome};
