//! Live monitoring driver for ccmonitor
//!
//! Owns everything the core deliberately leaves out: the clock, the
//! refresh timer, the terminal and Ctrl+C. Each tick fetches a snapshot,
//! runs [`MonitorState::poll`] and prints whatever the formatter makes of
//! the outcome, then sleeps for the refresh interval. A tick always
//! completes before the next one starts.

use ccmonitor_core::error::Result;
use ccmonitor_core::monitor::{MonitorState, TickOutcome};
use ccmonitor_core::provider::UsageDataSource;
use ccmonitor_terminal::output::ReportFormatter;
use chrono::{DateTime, Utc};
use std::io::Write;
use tokio::time::sleep;
use tracing::{debug, info};

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";
const HIDE_CURSOR: &str = "\x1B[?25l";
const SHOW_CURSOR: &str = "\x1B[?25h";

/// Polling loop over a data source
pub struct LiveMonitor<S> {
    source: S,
    state: MonitorState,
    formatter: Box<dyn ReportFormatter>,
    once: bool,
    max_ticks: Option<usize>,
}

impl<S: UsageDataSource> LiveMonitor<S> {
    pub fn new(source: S, state: MonitorState, formatter: Box<dyn ReportFormatter>) -> Self {
        Self {
            source,
            state,
            formatter,
            once: false,
            max_ticks: None,
        }
    }

    /// Stop after the first tick
    pub fn with_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    /// Stop the loop after `ticks` frames instead of waiting for Ctrl+C
    pub fn with_max_ticks(mut self, ticks: usize) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Run one tick at `now` and format its outcome
    ///
    /// Only non-transient source errors are returned.
    pub async fn step(&mut self, now: DateTime<Utc>) -> Result<(TickOutcome, String)> {
        let outcome = self.state.poll(&self.source, now).await?;
        let text = match &outcome {
            TickOutcome::Render(report) => self.formatter.format_report(report),
            TickOutcome::Skip(reason) => {
                debug!("Skipping tick: {}", reason);
                self.formatter.format_skip(reason, now)
            }
        };
        Ok((outcome, text))
    }

    /// Start the live monitoring loop
    ///
    /// Returns after Ctrl+C, after one tick when running once, or on the
    /// first non-transient error.
    pub async fn run(mut self) -> Result<()> {
        let interactive = self.formatter.clears_screen();
        let pause = self.state.config().refresh_interval;
        info!(
            "Monitoring {} every {:?} on plan {}",
            self.source.describe(),
            pause,
            self.state.config().plan
        );

        if self.once {
            let (_, text) = self.step(Utc::now()).await?;
            write_frame(&text, false)?;
            return Ok(());
        }

        if interactive {
            print!("{HIDE_CURSOR}");
        }

        let mut ticks = 0usize;
        let result = loop {
            let frame = tokio::select! {
                frame = self.step(Utc::now()) => frame,
                _ = tokio::signal::ctrl_c() => break Ok(()),
            };
            let text = match frame {
                Ok((_, text)) => text,
                Err(e) => break Err(e),
            };
            if let Err(e) = write_frame(&text, interactive) {
                break Err(e);
            }

            ticks += 1;
            if self.max_ticks.is_some_and(|max| ticks >= max) {
                break Ok(());
            }

            // The pause starts once the frame is out, however long the fetch took
            tokio::select! {
                _ = sleep(pause) => {}
                _ = tokio::signal::ctrl_c() => break Ok(()),
            }
        };

        if interactive {
            print!("{SHOW_CURSOR}");
            println!("\nMonitoring stopped.");
        }
        result
    }
}

fn write_frame(text: &str, clear: bool) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    if clear {
        write!(stdout, "{CLEAR_SCREEN}")?;
    }
    writeln!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ccmonitor_core::error::CcmonitorError;
    use ccmonitor_core::monitor::{MonitorConfig, SkipReason};
    use ccmonitor_core::reset::ResetSchedule;
    use ccmonitor_core::timezone::TimezoneConfig;
    use ccmonitor_core::types::{Plan, Snapshot, UsageBlock};
    use ccmonitor_terminal::output::JsonFormatter;
    use chrono::{Duration, TimeZone};
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    /// Hands out queued results in order, then keeps failing
    struct ScriptedSource(Mutex<Vec<Result<Snapshot>>>);

    #[async_trait]
    impl UsageDataSource for ScriptedSource {
        async fn fetch(&self) -> Result<Snapshot> {
            let mut queue = self.0.lock().unwrap();
            if queue.is_empty() {
                Err(CcmonitorError::InvalidSnapshot("exhausted".into()))
            } else {
                queue.remove(0)
            }
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    /// Takes `delay` per fetch and records when each fetch started
    struct SlowSource {
        delay: std::time::Duration,
        started: Arc<Mutex<Vec<Instant>>>,
    }

    #[async_trait]
    impl UsageDataSource for SlowSource {
        async fn fetch(&self) -> Result<Snapshot> {
            self.started.lock().unwrap().push(Instant::now());
            tokio::time::sleep(self.delay).await;
            Ok(Snapshot::new(vec![]))
        }

        fn describe(&self) -> String {
            "slow".to_string()
        }
    }

    fn monitor(results: Vec<Result<Snapshot>>) -> LiveMonitor<ScriptedSource> {
        let config = MonitorConfig::new(
            Plan::Pro,
            ResetSchedule::Default,
            TimezoneConfig::new(chrono_tz::Tz::UTC),
        );
        LiveMonitor::new(
            ScriptedSource(Mutex::new(results)),
            MonitorState::new(config),
            Box::new(JsonFormatter),
        )
    }

    #[tokio::test]
    async fn test_failed_fetch_then_recovery() {
        let now = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();
        let active = UsageBlock {
            start_time: Some(now - Duration::minutes(30)),
            total_tokens: 3_000,
            is_active: true,
            ..UsageBlock::default()
        };
        let mut monitor = monitor(vec![
            Err(CcmonitorError::Timeout(std::time::Duration::from_secs(30))),
            Ok(Snapshot::new(vec![])),
            Ok(Snapshot::new(vec![active])),
        ]);

        let (outcome, text) = monitor.step(now).await.unwrap();
        assert!(matches!(outcome, TickOutcome::Skip(SkipReason::FetchFailed(_))));
        assert!(text.contains("Failed to get usage data"));

        let (outcome, text) = monitor.step(now).await.unwrap();
        assert_eq!(outcome, TickOutcome::Skip(SkipReason::NoActiveSession));
        assert!(text.contains("No active session found"));

        let (outcome, text) = monitor.step(now).await.unwrap();
        assert!(matches!(outcome, TickOutcome::Render(_)));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["tokensUsed"], 3_000);
        assert_eq!(value["burnRateTokensPerMinute"], 50.0);
        assert_eq!(monitor.state().burn_rate_history().count(), 1);
    }

    #[tokio::test]
    async fn test_pause_follows_slow_fetch() {
        let refresh = std::time::Duration::from_millis(100);
        let delay = std::time::Duration::from_millis(150);
        let started = Arc::new(Mutex::new(Vec::new()));
        let config = MonitorConfig::new(
            Plan::Pro,
            ResetSchedule::Default,
            TimezoneConfig::new(chrono_tz::Tz::UTC),
        )
        .with_refresh_interval(refresh);
        let source = SlowSource {
            delay,
            started: Arc::clone(&started),
        };

        LiveMonitor::new(source, MonitorState::new(config), Box::new(JsonFormatter))
            .with_max_ticks(3)
            .run()
            .await
            .unwrap();

        let started = started.lock().unwrap();
        assert_eq!(started.len(), 3);
        for pair in started.windows(2) {
            // Whole fetch plus the full refresh interval between fetch starts
            assert!(pair[1] - pair[0] >= delay + refresh);
        }
    }

    #[tokio::test]
    async fn test_run_stops_on_fatal_error() {
        let config = MonitorConfig::new(
            Plan::Pro,
            ResetSchedule::Default,
            TimezoneConfig::new(chrono_tz::Tz::UTC),
        )
        .with_refresh_interval(std::time::Duration::from_millis(10));
        let source = ScriptedSource(Mutex::new(vec![
            Err(CcmonitorError::Timeout(std::time::Duration::from_secs(30))),
            Err(CcmonitorError::InvalidArgument("empty usage command".into())),
        ]));
        let monitor = LiveMonitor::new(source, MonitorState::new(config), Box::new(JsonFormatter));

        // The timeout is skipped, the bad argument ends the loop
        let err = monitor.run().await.unwrap_err();
        assert!(matches!(err, CcmonitorError::InvalidArgument(_)));
    }
}
