//! FileSink - appends frames to a candump-style log

use chrono::{DateTime, Utc};
use contracts::{BusFrame, ContractError, FrameSink};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output file, appended to
    pub path: PathBuf,
    /// Interface name written on each line
    pub interface: String,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./bsm_frames.log"));
        let interface = params
            .get("interface")
            .cloned()
            .unwrap_or_else(|| "can0".to_string());

        Self { path, interface }
    }
}

/// Format one frame as `(<secs>.<micros>) <iface> <ADDR>#<HEX>`
pub(crate) fn candump_line(at: DateTime<Utc>, interface: &str, frame: &BusFrame) -> String {
    format!(
        "({}.{:06}) {} {}",
        at.timestamp(),
        at.timestamp_subsec_micros(),
        interface,
        frame
    )
}

/// Sink that records frames to a text file
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create a new FileSink, creating parent directories as needed
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;

        Ok(Self {
            name: name.into(),
            config,
            writer: BufWriter::new(file),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = FileSinkConfig::from_params(params);
        Self::new(name, config)
    }

    fn persist_frame(&mut self, frame: &BusFrame) -> Result<(), ContractError> {
        let line = candump_line(Utc::now(), &self.config.interface, frame);
        writeln!(self.writer, "{line}").map_err(|e| {
            error!(sink = %self.name, frame = %frame, error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })
    }
}

impl FrameSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, frame),
        fields(sink = %self.name, address = frame.address)
    )]
    async fn write(&mut self, frame: &BusFrame) -> Result<(), ContractError> {
        self.persist_frame(frame)
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        self.writer
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.flush().await?;
        debug!(sink = %self.name, path = %self.config.path.display(), "FileSink closed");
        Ok(())
    }
}
