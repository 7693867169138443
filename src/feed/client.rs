use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

use super::error::FeedError;
use crate::geo::ObserverPoint;

/// Anything that can produce one raw feed body per call.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<u8>, FeedError>;
}

/// Fills `{lat}`, `{lon}` and `{radius}` in a URL template.
pub fn build_feed_url(template: &str, observer: &ObserverPoint, radius_km: f64) -> String {
    template
        .replace("{lat}", &observer.latitude_deg.to_string())
        .replace("{lon}", &observer.longitude_deg.to_string())
        .replace("{radius}", &format!("{:.6}", radius_km))
}

/// Point query against an airplanes.live style HTTP API.
#[derive(Clone)]
pub struct HttpFeed {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpFeed {
    pub fn new(client: Client, url: String, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self) -> Result<Vec<u8>, FeedError> {
        debug!("Fetching {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FeedError::Status(status.as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
