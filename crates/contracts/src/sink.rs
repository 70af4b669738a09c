//! SnapshotSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for Sinks.

use crate::{ContractError, NavigationFrame};

/// Navigation frame output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(SnapshotSink: Send)]
pub trait LocalSnapshotSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one navigation frame
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, frame: &NavigationFrame) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
