//! # Dispatcher
//!
//! 导航帧分发模块。
//!
//! 负责：
//! - 消费 `NavigationFrame`
//! - Fan-out 到多个 sinks
//! - 隔离慢 sink，不阻塞主链路

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{NavigationFrame, SnapshotSink};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::{Lane, SinkHandle};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{FileSink, FileSinkConfig, LogSink};
