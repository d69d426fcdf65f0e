use std::io::Write;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::MessageSink;
use crate::error::SinkError;
use crate::message::OutboundMessage;

/// Writes one JSON object per line. Used for dry runs.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl JsonLinesSink<std::io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<W: Write + Send> MessageSink for JsonLinesSink<W> {
    async fn publish(&self, message: &OutboundMessage) -> Result<(), SinkError> {
        let line = serde_json::to_string(message)?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{line}")?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.flush()?;
        Ok(())
    }
}
