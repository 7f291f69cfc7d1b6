//! Street centreline download for a study-area bounding box.
//!
//! Queries a list of interchangeable Overpass endpoints in order, retrying
//! each with backoff and a per-attempt timeout, and normalises the first
//! successful answer into [`RoadFeature`](curbside_core::RoadFeature)s.

pub mod config;
mod error;
pub mod fetcher;
pub mod overpass;
pub mod retry;
pub mod transport;

pub use config::FetchConfig;
pub use error::{AttemptError, FetchError};
pub use fetcher::{RoadFetcher, RoadResponse, RoadSource};
pub use retry::{Progress, RetryPolicy, retry_with_timeout};
pub use transport::{HttpTransport, Transport};
