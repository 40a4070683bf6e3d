//! JSON-lines replay source
//!
//! One object per control cycle:
//!
//! ```text
//! {"vego": 12.0, "distance_1": 14.0, "distance_2": 3.0, "side": 65}
//! {"vego": 12.0}
//! ```
//!
//! Missing signal fields mean no new message arrived that cycle.

use std::io::BufRead;
use std::path::Path;

use contracts::{CycleInput, SignalUpdate};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{IngestionError, Result};
use crate::scripted::ScriptedSource;
use crate::source::SnapshotSource;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReplayRecord {
    #[serde(default)]
    vego: f64,
    #[serde(default)]
    distance_1: Option<f64>,
    #[serde(default)]
    distance_2: Option<f64>,
    #[serde(default, alias = "side_indicator")]
    side: Option<u8>,
}

impl ReplayRecord {
    fn update(&self) -> SignalUpdate {
        SignalUpdate {
            distance_1: self.distance_1,
            distance_2: self.distance_2,
            side_indicator: self.side,
        }
    }
}

/// Replays a recorded drive cycle by cycle
#[derive(Debug, Clone)]
pub struct ReplaySource {
    inner: ScriptedSource,
    total: usize,
}

impl ReplaySource {
    /// Load a replay file
    #[instrument(name = "replay_source_open", skip_all, fields(path = %path.display()))]
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "replay".to_string());
        Self::from_reader(name, std::io::BufReader::new(file))
    }

    /// Parse replay lines from any buffered reader
    pub fn from_reader(name: impl Into<String>, reader: impl BufRead) -> Result<Self> {
        let mut script = ScriptedSource::new(name);
        let mut total = 0;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let record: ReplayRecord =
                serde_json::from_str(trimmed).map_err(|e| IngestionError::Parse {
                    line: idx + 1,
                    message: e.to_string(),
                })?;
            script = script.step(record.update(), record.vego);
            total += 1;
        }

        debug!(cycles = total, "replay loaded");
        metrics::gauge!("bsm_replay_cycles_loaded").set(total as f64);

        Ok(Self {
            inner: script,
            total,
        })
    }

    /// Number of cycles in the recording
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl SnapshotSource for ReplaySource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn next_input(&mut self) -> Option<CycleInput> {
        self.inner.next_input()
    }
}
