use std::time::Duration;

use async_trait::async_trait;
use http_protocol::header::{CONTENT_TYPE, TEXT_PLAIN};
use http_protocol::status_code;
use line_protocol::Line;
use trace::{debug, error};

/// Destination for extracted records. Writes are best-effort and
/// fire-and-forget from the extractor's perspective: implementations log
/// failures and never surface them to the caller.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn send(&self, event_type: &str, record: &Line);
}

pub struct InfluxSink {
    client: reqwest::Client,
    url: String,
}

impl InfluxSink {
    pub fn new(config: &config::SinkConfig) -> Self {
        let client = reqwest::ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            url: config.write_url(),
        }
    }
}

#[async_trait]
impl RecordSink for InfluxSink {
    async fn send(&self, event_type: &str, record: &Line) {
        let body = record.to_string();
        debug!("send {} to {}: {}", event_type, self.url, body);

        let request = match self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, TEXT_PLAIN)
            .body(body)
            .build()
        {
            Ok(request) => request,
            Err(e) => {
                error!("time series request construct fail: {}", e);
                return;
            }
        };
        match self.client.execute(request).await {
            Ok(resp) if resp.status() == status_code::NO_CONTENT => {}
            Ok(resp) => {
                error!(
                    "time series save for {} failed, return code {}",
                    event_type,
                    resp.status()
                );
            }
            Err(e) => {
                error!("time series save for {} failed: {}", event_type, e);
            }
        }
    }
}
