//! Common test utilities for ccmonitor integration tests
//!
//! Builders for usage blocks and helpers that write snapshot files in the
//! same JSON shape the usage tool prints.

use ccmonitor::types::{Snapshot, UsageBlock};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::PathBuf;
use tempfile::TempDir;

/// Reference instant shared by the integration tests (12:00 UTC)
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
}

/// Builder for creating test UsageBlock instances
pub struct BlockBuilder {
    block: UsageBlock,
    now: DateTime<Utc>,
}

impl BlockBuilder {
    /// Closed, non-gap block with no times relative to `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            block: UsageBlock::default(),
            now,
        }
    }

    pub fn started_minutes_ago(mut self, minutes: i64) -> Self {
        self.block.start_time = Some(self.now - Duration::minutes(minutes));
        self
    }

    pub fn ended_minutes_ago(mut self, minutes: i64) -> Self {
        self.block.actual_end_time = Some(self.now - Duration::minutes(minutes));
        self
    }

    pub fn tokens(mut self, tokens: u64) -> Self {
        self.block.total_tokens = tokens;
        self
    }

    pub fn active(mut self) -> Self {
        self.block.is_active = true;
        self
    }

    #[allow(dead_code)]
    pub fn gap(mut self) -> Self {
        self.block.is_gap = true;
        self
    }

    pub fn build(self) -> UsageBlock {
        self.block
    }
}

/// A typical day: two finished sessions, an idle gap and an open session
#[allow(dead_code)]
pub fn typical_snapshot(now: DateTime<Utc>) -> Snapshot {
    Snapshot::new(vec![
        BlockBuilder::new(now)
            .started_minutes_ago(600)
            .ended_minutes_ago(420)
            .tokens(18_000)
            .build(),
        BlockBuilder::new(now)
            .started_minutes_ago(400)
            .ended_minutes_ago(250)
            .tokens(26_500)
            .build(),
        BlockBuilder::new(now)
            .started_minutes_ago(250)
            .ended_minutes_ago(45)
            .gap()
            .build(),
        BlockBuilder::new(now)
            .started_minutes_ago(45)
            .tokens(9_000)
            .active()
            .build(),
    ])
}

/// Write `snapshot` to a temp file and return its path
#[allow(dead_code)]
pub fn write_snapshot(dir: &TempDir, snapshot: &Snapshot) -> PathBuf {
    let path = dir.path().join("blocks.json");
    std::fs::write(&path, serde_json::to_string_pretty(snapshot).unwrap()).unwrap();
    path
}
