//! LogSink - logs outgoing frames via tracing

use contracts::{BusFrame, ContractError, FrameSink};
use tracing::{info, instrument};

/// Sink that logs every request frame for debugging
pub struct LogSink {
    name: String,
    written: u64,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            written: 0,
        }
    }
}

impl FrameSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, frame),
        fields(sink = %self.name, address = frame.address)
    )]
    async fn write(&mut self, frame: &BusFrame) -> Result<(), ContractError> {
        self.written += 1;
        info!(
            sink = %self.name,
            bus = frame.bus,
            frame = %frame,
            "Request frame"
        );
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, frames = self.written, "LogSink closed");
        Ok(())
    }
}
