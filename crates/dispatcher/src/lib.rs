//! # Dispatcher
//!
//! Request frame output.
//!
//! Responsibilities:
//! - encode monitor commands into diagnostic bus frames
//! - fan frames out to multiple sinks
//! - isolate slow sinks so the control loop never blocks

pub mod dispatcher;
pub mod encoder;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{BusFrame, FrameSink};
pub use dispatcher::{create_dispatcher, Dispatcher};
pub use encoder::{decode, encode, encode_all, BSM_REQUEST_ADDRESS, BSM_REQUEST_BUS};
pub use error::DispatcherError;
pub use handle::{Handoff, SinkHandle};
pub use metrics::{Delivery, KindCounts, MetricsSnapshot, SinkMetrics};
pub use sinks::{FileSink, FileSinkConfig, LogSink};
