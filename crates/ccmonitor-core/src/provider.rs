//! Usage data source trait
//!
//! The monitor never knows where a snapshot comes from. The binary plugs
//! in a source that shells out to the usage tool or reads a file; tests
//! plug in an in-memory one.

use crate::error::Result;
use crate::types::Snapshot;
use async_trait::async_trait;

/// Supplier of usage snapshots
#[async_trait]
pub trait UsageDataSource: Send + Sync {
    /// Fetch the current snapshot
    ///
    /// Any error is treated by the monitor as a transient fetch failure.
    async fn fetch(&self) -> Result<Snapshot>;

    /// Short human readable description for logs
    fn describe(&self) -> String;
}
