use async_trait::async_trait;
use reqwest::Client;

use crate::config::FetchConfig;
use crate::error::{AttemptError, FetchError};

/// Sends one query to one endpoint and returns the raw response body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_query(&self, endpoint: &str, query: &str) -> Result<String, AttemptError>;
}

/// Form-encoded HTTP POST, as Overpass expects
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_query(&self, endpoint: &str, query: &str) -> Result<String, AttemptError> {
        let response = self
            .client
            .post(endpoint)
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))
    }
}
