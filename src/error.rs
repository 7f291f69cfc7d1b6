use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] curbside_core::Error),
    #[error("Road data unavailable: {0}")]
    Fetch(#[from] curbside_roads::FetchError),
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Unknown layer: {0}")]
    UnknownLayer(crate::LayerId),
}
