//! Message sinks.

mod json_lines;
mod kafka_rest;
mod supabase;

pub use json_lines::JsonLinesSink;
pub use kafka_rest::KafkaRestSink;
pub use supabase::{SupabaseClient, SupabaseSink};

use async_trait::async_trait;

use crate::error::SinkError;
use crate::message::OutboundMessage;

/// Delivers one outbound message, keyed by its post id.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn publish(&self, message: &OutboundMessage) -> Result<(), SinkError>;

    /// Flush anything buffered. Called once at the end of a run.
    async fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Read a response body for an error message, capped so logs stay readable.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    const MAX_LEN: usize = 512;
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_LEN {
        let mut cut = MAX_LEN;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}
