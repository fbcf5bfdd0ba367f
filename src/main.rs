//! ccmonitor - Live terminal monitor for Claude Code token usage

use ccmonitor::{
    cli::Cli,
    data_source::{CcusageCommand, JsonFileSource},
    error::Result,
    live_monitor::LiveMonitor,
};
use ccmonitor_core::monitor::MonitorState;
use ccmonitor_terminal::output::get_formatter;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never tear the dashboard. --verbose honors RUST_LOG.
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("ccmonitor=info,ccmonitor_core=info")
        })
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.monitor_config()?;
    info!(
        "Plan: {}, timezone: {}, reset schedule: {:?}",
        config.plan,
        config.timezone.display_name(),
        config.reset_schedule.hours()
    );

    if !is_terminal::is_terminal(std::io::stdout()) {
        colored::control::set_override(false);
    }
    let formatter = get_formatter(cli.json, config.timezone.tz, cli.interval);
    let state = MonitorState::new(config);

    match &cli.input {
        Some(path) => {
            LiveMonitor::new(JsonFileSource::new(path), state, formatter)
                .with_once(cli.once)
                .run()
                .await
        }
        None => {
            LiveMonitor::new(CcusageCommand::new(&cli.command), state, formatter)
                .with_once(cli.once)
                .run()
                .await
        }
    }
}
