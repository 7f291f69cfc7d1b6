//! Session layer between the drawing surface and the survey core.
//!
//! An [`AnnotationSession`] turns [`SurfaceEvent`]s into [`SurfaceCommand`]s,
//! keeps the layers it created in a [`LayerRegistry`], coordinates road
//! downloads for the active study area and persists the dataset through a
//! [`KeyValueStore`].

mod error;
pub mod events;
pub mod loader;
pub mod registry;
pub mod session;
pub mod store;

pub use error::SessionError;
pub use events::{EventDispatcher, MapId, ShapeKind, Subscription, SurfaceCommand, SurfaceEvent};
pub use loader::{FetchTicket, Resolution, RoadLoader, drive_road_fetches};
pub use registry::{LayerId, LayerKind, LayerRegistry};
pub use session::AnnotationSession;
pub use store::{DATASET_KEY, FileStore, KeyValueStore, MemoryStore};
