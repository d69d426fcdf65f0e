//! Kafka producer over the Confluent REST Proxy (v2 JSON embedded format).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{error_body, MessageSink};
use crate::error::SinkError;
use crate::message::OutboundMessage;

const CONTENT_TYPE: &str = "application/vnd.kafka.json.v2+json";
const ACCEPT: &str = "application/vnd.kafka.v2+json";

#[derive(Serialize)]
struct ProduceRequest<'a> {
    records: [Record<'a>; 1],
}

#[derive(Serialize)]
struct Record<'a> {
    key: &'a str,
    value: &'a OutboundMessage,
}

#[derive(Debug, Deserialize)]
struct ProduceResponse {
    #[serde(default)]
    offsets: Vec<Offset>,
}

#[derive(Debug, Deserialize)]
struct Offset {
    #[serde(default)]
    partition: Option<i32>,
    #[serde(default)]
    offset: Option<i64>,
    #[serde(default)]
    error_code: Option<i32>,
    #[serde(default)]
    error: Option<String>,
}

/// Publishes each message as one keyed record on a topic.
#[derive(Debug, Clone)]
pub struct KafkaRestSink {
    client: reqwest::Client,
    url: String,
    topic: String,
}

impl KafkaRestSink {
    /// `base_url` is the REST proxy root, e.g. `http://localhost:8082`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, topic: &str, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}/topics/{topic}", base_url.trim_end_matches('/')),
            topic: topic.to_string(),
        })
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl MessageSink for KafkaRestSink {
    async fn publish(&self, message: &OutboundMessage) -> Result<(), SinkError> {
        let body = serde_json::to_vec(&ProduceRequest {
            records: [Record {
                key: message.key(),
                value: message,
            }],
        })?;

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.clone(),
                body: error_body(response).await,
            });
        }

        let text = response.text().await?;
        let produced: ProduceResponse = serde_json::from_str(&text)?;
        // The proxy answers 200 even when an individual record fails.
        if let Some(failed) = produced.offsets.iter().find(|o| o.error_code.is_some()) {
            return Err(SinkError::Rejected(format!(
                "error_code {}: {}",
                failed.error_code.unwrap_or_default(),
                failed.error.as_deref().unwrap_or("unknown error")
            )));
        }

        if let Some(first) = produced.offsets.first() {
            tracing::debug!(
                post_id = %message.id,
                topic = %self.topic,
                partition = ?first.partition,
                offset = ?first.offset,
                "record produced"
            );
        }
        Ok(())
    }
}
