//! Polling loop state and the per-tick step function
//!
//! [`MonitorState`] is threaded through every tick by the driver. A tick
//! takes the latest snapshot and the current instant and either produces a
//! [`MonitorReport`] for the presenter or a [`SkipReason`]. The only state
//! that survives between ticks is the token limit (raised by the pro
//! ratchet) and the bounded burn rate history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::burn_rate::compute_hourly_burn_rate;
use crate::error::Result;
use crate::limits::resolve_limit;
use crate::prediction::predict_depletion;
use crate::provider::UsageDataSource;
use crate::reset::ResetSchedule;
use crate::timezone::TimezoneConfig;
use crate::types::{Plan, Snapshot, VelocityCategory};

/// Maximum number of burn rate samples kept for display
pub const BURN_RATE_HISTORY_LEN: usize = 120;

/// Default delay between ticks
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3);

/// Settings collected once at startup
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub plan: Plan,
    pub reset_schedule: ResetSchedule,
    pub timezone: TimezoneConfig,
    pub refresh_interval: Duration,
}

impl MonitorConfig {
    pub fn new(plan: Plan, reset_schedule: ResetSchedule, timezone: TimezoneConfig) -> Self {
        Self {
            plan,
            reset_schedule,
            timezone,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }
}

/// Everything the presenter needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorReport {
    pub generated_at: DateTime<Utc>,
    /// Plan the monitor was started with
    pub plan: Plan,
    pub usage_percentage: f64,
    pub tokens_used: u64,
    pub token_limit: u64,
    /// Negative once the limit is exceeded
    pub tokens_left: i64,
    pub burn_rate_tokens_per_minute: f64,
    pub predicted_end_time: DateTime<Utc>,
    pub reset_time: DateTime<Utc>,
    pub velocity_category: VelocityCategory,
    pub session_start: Option<DateTime<Utc>>,
    pub limit_exceeded: bool,
    /// The pro limit was raised to the custom maximum during this run
    pub plan_switched: bool,
    pub depletes_before_reset: bool,
    /// Oldest sample first
    pub burn_rate_history: Vec<f64>,
}

/// Why a tick produced nothing to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The data source failed or returned something unusable
    FetchFailed(String),
    /// The snapshot has no active block
    NoActiveSession,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::FetchFailed(_) => write!(f, "Failed to get usage data"),
            SkipReason::NoActiveSession => write!(f, "No active session found"),
        }
    }
}

/// Result of a single tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Render(Box<MonitorReport>),
    Skip(SkipReason),
}

/// Loop-local state threaded through every tick
#[derive(Debug, Clone)]
pub struct MonitorState {
    config: MonitorConfig,
    token_limit: u64,
    plan_switched: bool,
    burn_rate_history: VecDeque<f64>,
}

impl MonitorState {
    pub fn new(config: MonitorConfig) -> Self {
        let token_limit = resolve_limit(config.plan, None);
        Self {
            config,
            token_limit,
            plan_switched: false,
            burn_rate_history: VecDeque::with_capacity(BURN_RATE_HISTORY_LEN),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Limit currently in effect
    pub fn token_limit(&self) -> u64 {
        self.token_limit
    }

    pub fn plan_switched(&self) -> bool {
        self.plan_switched
    }

    pub fn burn_rate_history(&self) -> impl Iterator<Item = f64> + '_ {
        self.burn_rate_history.iter().copied()
    }

    /// Fetch from `source` and run one tick
    ///
    /// Transient fetch errors become [`SkipReason::FetchFailed`]; any other
    /// error is returned and ends the loop.
    pub async fn poll<S>(&mut self, source: &S, now: DateTime<Utc>) -> Result<TickOutcome>
    where
        S: UsageDataSource + ?Sized,
    {
        match source.fetch().await {
            Ok(snapshot) => Ok(self.tick(&snapshot, now)),
            Err(e) if e.is_transient() => {
                warn!("Failed to fetch usage from {}: {}", source.describe(), e);
                Ok(TickOutcome::Skip(SkipReason::FetchFailed(e.to_string())))
            }
            Err(e) => Err(e),
        }
    }

    /// Derive all metrics for one snapshot
    pub fn tick(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) -> TickOutcome {
        let Some(active) = snapshot.active_block() else {
            debug!("No active block among {} blocks", snapshot.blocks.len());
            return TickOutcome::Skip(SkipReason::NoActiveSession);
        };
        let tokens_used = active.countable_tokens();

        self.update_limit(snapshot, tokens_used);

        let burn_rate = compute_hourly_burn_rate(&snapshot.blocks, now);
        self.record_burn_rate(burn_rate);

        let tokens_left = self.token_limit as i64 - tokens_used as i64;
        let usage_percentage = if self.token_limit > 0 {
            tokens_used as f64 / self.token_limit as f64 * 100.0
        } else {
            0.0
        };

        let reset_time = self
            .config
            .reset_schedule
            .next_reset(self.config.timezone.localize(now))
            .with_timezone(&Utc);
        let predicted_end_time = predict_depletion(now, burn_rate, tokens_left, reset_time);

        TickOutcome::Render(Box::new(MonitorReport {
            generated_at: now,
            plan: self.config.plan,
            usage_percentage,
            tokens_used,
            token_limit: self.token_limit,
            tokens_left,
            burn_rate_tokens_per_minute: burn_rate,
            predicted_end_time,
            reset_time,
            velocity_category: VelocityCategory::from_burn_rate(burn_rate),
            session_start: active.start_time,
            limit_exceeded: tokens_used > self.token_limit,
            plan_switched: self.plan_switched,
            depletes_before_reset: predicted_end_time < reset_time,
            burn_rate_history: self.burn_rate_history.iter().copied().collect(),
        }))
    }

    fn update_limit(&mut self, snapshot: &Snapshot, tokens_used: u64) {
        match self.config.plan {
            Plan::CustomMax => {
                self.token_limit = resolve_limit(Plan::CustomMax, Some(&snapshot.blocks));
            }
            // One-way latch: the pro limit only ever goes up
            Plan::Pro if tokens_used > self.token_limit => {
                let custom = resolve_limit(Plan::CustomMax, Some(&snapshot.blocks));
                if custom > self.token_limit {
                    info!(
                        "Usage {} exceeded limit {}, raising limit to custom maximum {}",
                        tokens_used, self.token_limit, custom
                    );
                    self.token_limit = custom;
                    self.plan_switched = true;
                }
            }
            _ => {}
        }
    }

    fn record_burn_rate(&mut self, burn_rate: f64) {
        self.burn_rate_history.push_back(burn_rate);
        while self.burn_rate_history.len() > BURN_RATE_HISTORY_LEN {
            self.burn_rate_history.pop_front();
        }
    }
}
