//! SinkHandle - one sink behind its own bounded queue and tokio task
//!
//! The control loop never waits on a sink: `offer` either queues the frame
//! or drops it, and a dropped request is not retried. The next poll of the
//! same side supersedes it.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{BusFrame, CommandKind, FrameSink};

use crate::encoder::decode;
use crate::metrics::{Delivery, MetricsSnapshot, SinkMetrics};

/// Result of handing one frame to a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handoff {
    Queued,
    /// Queue full, frame discarded
    Dropped,
    /// Worker gone, frame discarded
    Closed,
}

/// Handle to a running sink worker
pub struct SinkHandle {
    name: String,
    tx: mpsc::Sender<BusFrame>,
    metrics: Arc<SinkMetrics>,
    worker: JoinHandle<()>,
}

impl SinkHandle {
    /// Spawn the worker task for `sink` with room for `queue_capacity` frames
    pub fn spawn<S: FrameSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity);
        let metrics = Arc::new(SinkMetrics::new());
        let worker = tokio::spawn(drain(sink, rx, Arc::clone(&metrics)));

        Self {
            name,
            tx,
            metrics,
            worker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Queue a frame without waiting
    pub fn offer(&self, frame: BusFrame) -> Handoff {
        let (handoff, frame) = match self.tx.try_send(frame) {
            Ok(()) => return Handoff::Queued,
            Err(mpsc::error::TrySendError::Full(frame)) => (Handoff::Dropped, frame),
            Err(mpsc::error::TrySendError::Closed(frame)) => (Handoff::Closed, frame),
        };

        let command = decode(&frame);
        self.metrics
            .record(Delivery::Dropped, command.map(|c| c.kind()));
        match command {
            Some(command) => warn!(
                sink = %self.name,
                channel = %command.channel(),
                kind = %command.kind(),
                reason = ?handoff,
                "request dropped"
            ),
            None => warn!(sink = %self.name, frame = %frame, reason = ?handoff, "frame dropped"),
        }
        handoff
    }

    /// Close the queue, wait for the worker to flush, and return the final
    /// counters
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) -> MetricsSnapshot {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            error!(sink = %self.name, error = ?e, "sink worker panicked");
        }
        self.metrics.snapshot()
    }
}

/// Worker: write queued frames until the queue closes, then flush and close
async fn drain<S: FrameSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<BusFrame>,
    metrics: Arc<SinkMetrics>,
) {
    debug!(sink = %sink.name(), "sink worker started");

    while let Some(frame) = rx.recv().await {
        let kind: Option<CommandKind> = decode(&frame).map(|c| c.kind());
        match sink.write(&frame).await {
            Ok(()) => metrics.record(Delivery::Written, kind),
            Err(e) => {
                // A failed request is not retried; keep serving the queue.
                metrics.record(Delivery::Failed, kind);
                error!(sink = %sink.name(), frame = %frame, error = %e, "write failed");
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %sink.name(), error = %e, "flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %sink.name(), error = %e, "close failed on shutdown");
    }
    debug!(sink = %sink.name(), "sink worker stopped");
}
