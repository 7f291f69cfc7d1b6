use async_trait::async_trait;
use curbside_core::{BoundingBox, RoadFeature};
use tracing::info;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::overpass::{build_query, parse_response};
use crate::retry::{Progress, retry_with_timeout};
use crate::transport::{HttpTransport, Transport};

/// Roads answering a request, tagged with the box they were fetched for
#[derive(Debug, Clone, PartialEq)]
pub struct RoadResponse {
    pub bbox: BoundingBox,
    pub roads: Vec<RoadFeature>,
}

/// Anything that can answer a bounding-box road query
#[async_trait]
pub trait RoadSource: Send + Sync {
    async fn fetch_roads(
        &self,
        bbox: BoundingBox,
        progress: Progress<'_>,
    ) -> Result<RoadResponse, FetchError>;
}

#[derive(Debug)]
pub struct RoadFetcher<T = HttpTransport> {
    transport: T,
    config: FetchConfig,
}

impl RoadFetcher<HttpTransport> {
    pub fn from_config(config: FetchConfig) -> Result<Self, FetchError> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self { transport, config })
    }
}

impl<T: Transport> RoadFetcher<T> {
    pub fn new(transport: T, config: FetchConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches street centrelines inside `bbox`, falling back across endpoints
    pub async fn fetch_roads(
        &self,
        bbox: BoundingBox,
        progress: Progress<'_>,
    ) -> Result<RoadResponse, FetchError> {
        if self.config.endpoints.is_empty() {
            return Err(FetchError::NoEndpoints);
        }
        let query = build_query(
            &bbox,
            &self.config.highway_classes,
            self.config.timeout_ms.div_ceil(1000),
        );
        let transport = &self.transport;
        let query = query.as_str();

        let roads = retry_with_timeout(
            &self.config.endpoints,
            &self.config.retry_policy(),
            |endpoint| async move {
                let body = transport.post_query(&endpoint, query).await?;
                parse_response(&body)
            },
            progress,
        )
        .await?;

        info!(roads = roads.len(), "Fetched road network");
        Ok(RoadResponse { bbox, roads })
    }
}

#[async_trait]
impl<T: Transport> RoadSource for RoadFetcher<T> {
    async fn fetch_roads(
        &self,
        bbox: BoundingBox,
        progress: Progress<'_>,
    ) -> Result<RoadResponse, FetchError> {
        RoadFetcher::fetch_roads(self, bbox, progress).await
    }
}
