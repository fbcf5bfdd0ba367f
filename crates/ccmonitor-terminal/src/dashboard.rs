//! Live token usage dashboard
//!
//! Renders a [`MonitorReport`] as a box-drawn terminal frame with progress
//! bars for token usage and time to reset, the burn rate with its recent
//! history, and the depletion prediction.

use ccmonitor_core::monitor::{MonitorReport, SkipReason};
use ccmonitor_core::types::{Plan, VelocityCategory};
use chrono::{DateTime, Duration, Utc};
use colored::*;
use std::fmt;

/// Box drawing characters for UI (ASCII)
const BOX_TOP_LEFT: &str = "+";
const BOX_TOP_RIGHT: &str = "+";
const BOX_BOTTOM_LEFT: &str = "+";
const BOX_BOTTOM_RIGHT: &str = "+";
const BOX_HORIZONTAL: &str = "-";
const BOX_VERTICAL: &str = "|";
const BOX_T_LEFT: &str = "+";
const BOX_T_RIGHT: &str = "+";

/// Progress bar characters (ASCII)
const PROGRESS_FULL: &str = "#";
const PROGRESS_EMPTY: &str = ".";

/// Sparkline levels, lowest first
const SPARK_LEVELS: &[char] = &['_', '.', '-', '=', '*', '#'];

/// Width of the burn rate sparkline in samples
const SPARK_WIDTH: usize = 30;

const BAR_WIDTH: usize = 40;

/// Length of a billing window; the reset bar fills across it
const RESET_WINDOW_MINUTES: f64 = 300.0;

/// Usage percentage at which the token bar turns red
const USAGE_DANGER_THRESHOLD: f64 = 90.0;

/// Usage percentage at which the token bar turns yellow
const USAGE_WARNING_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Good,
    Warn,
    Bad,
}

/// Terminal dashboard renderer
pub struct Dashboard {
    width: usize,
    timezone: chrono_tz::Tz,
    refresh_secs: u64,
    /// Whether to use colored output (respects NO_COLOR environment variable)
    colored_output: bool,
}

impl Dashboard {
    /// Create a dashboard sized to the current terminal
    pub fn new(timezone: chrono_tz::Tz, refresh_secs: u64) -> Self {
        let raw_width = terminal_width().unwrap_or(100);
        let width = if raw_width < 60 {
            raw_width.max(20)
        } else {
            raw_width.clamp(60, 120)
        };
        Self {
            width,
            timezone,
            refresh_secs,
            colored_output: std::env::var("NO_COLOR").is_err(),
        }
    }

    /// Override the detected width
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(20);
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.colored_output = enabled;
        self
    }

    /// Render a full frame for one report
    pub fn render_report(&self, report: &MonitorReport) -> String {
        let mut output = String::new();

        output.push_str(&self.draw_box_top());
        output.push_str(&self.draw_centered_line("CCMONITOR - LIVE TOKEN USAGE MONITOR"));
        output.push_str(&self.draw_separator());
        output.push('\n');

        output.push_str(&self.draw_token_section(report));
        output.push('\n');
        output.push_str(&self.draw_reset_section(report));
        output.push('\n');
        output.push_str(&self.draw_burn_section(report));
        output.push('\n');
        output.push_str(&self.draw_prediction_section(report));

        let notices = self.notifications(report);
        if !notices.is_empty() {
            output.push('\n');
            for notice in notices {
                output.push_str(&self.draw_line(&notice));
            }
        }

        output.push_str(&self.draw_separator());
        output.push_str(&self.draw_footer());
        output.push_str(&self.draw_box_bottom());

        output
    }

    /// One-line message for a skipped tick
    pub fn render_notice(&self, reason: &SkipReason, now: DateTime<Utc>) -> String {
        let time = now.with_timezone(&self.timezone).format("%H:%M:%S");
        let text = reason.to_string();
        let text = match reason {
            SkipReason::FetchFailed(_) => self.paint(&text, Tone::Bad),
            SkipReason::NoActiveSession => self.paint(&text, Tone::Warn),
        };
        format!(
            "{} [{}] - retrying in {}s (Ctrl+C to exit)",
            text, time, self.refresh_secs
        )
    }

    fn draw_box_top(&self) -> String {
        format!(
            "{}{}{}",
            BOX_TOP_LEFT,
            BOX_HORIZONTAL.repeat(self.width - 2),
            BOX_TOP_RIGHT
        )
    }

    fn draw_box_bottom(&self) -> String {
        format!(
            "\n{}{}{}",
            BOX_BOTTOM_LEFT,
            BOX_HORIZONTAL.repeat(self.width - 2),
            BOX_BOTTOM_RIGHT
        )
    }

    fn draw_separator(&self) -> String {
        format!(
            "\n{}{}{}",
            BOX_T_LEFT,
            BOX_HORIZONTAL.repeat(self.width - 2),
            BOX_T_RIGHT
        )
    }

    fn draw_footer(&self) -> String {
        let footer = format!(
            "Refreshing every {}s - Press Ctrl+C to stop",
            self.refresh_secs
        );
        self.draw_centered_line(&footer)
    }

    fn draw_centered_line(&self, text: &str) -> String {
        let text_width = console::measure_text_width(text);
        let available_width = self.width.saturating_sub(2);
        if text_width >= available_width {
            return format!("\n{} {} {}", BOX_VERTICAL, text, BOX_VERTICAL);
        }
        let padding = (available_width - text_width) / 2;
        let left_pad = " ".repeat(padding);
        let right_pad = " ".repeat(available_width - padding - text_width);
        format!(
            "\n{}{}{}{}{}",
            BOX_VERTICAL, left_pad, text, right_pad, BOX_VERTICAL
        )
    }

    /// Left-aligned line, truncated to fit the box
    fn draw_line(&self, content: &str) -> String {
        let available_width = self.width.saturating_sub(4);
        let truncated_content = console::truncate_str(content, available_width, "...");
        let final_width = console::measure_text_width(&truncated_content);

        let padding = available_width.saturating_sub(final_width);
        format!(
            "\n{} {}{} {}",
            BOX_VERTICAL,
            truncated_content,
            " ".repeat(padding),
            BOX_VERTICAL
        )
    }

    fn draw_token_section(&self, report: &MonitorReport) -> String {
        let mut output = String::new();
        let tone = usage_tone(report.usage_percentage);

        let bar = self.create_colored_progress_bar(report.usage_percentage, BAR_WIDTH, tone);
        let usage_line = format!(
            "TOKENS       {}  {:5.1}% ({}/{})",
            bar,
            report.usage_percentage.min(999.9),
            format_number(report.tokens_used),
            format_number(report.token_limit)
        );
        output.push_str(&self.draw_line(&usage_line));

        let left = if report.tokens_left < 0 {
            format!("-{}", format_number(report.tokens_left.unsigned_abs()))
        } else {
            format_number(report.tokens_left.unsigned_abs())
        };
        let detail_line = format!(
            "   Left: {}  Plan: {}{}",
            left,
            report.plan,
            if report.plan_switched {
                " (raised to custom maximum)"
            } else {
                ""
            }
        );
        output.push_str(&self.draw_line(&detail_line));

        output
    }

    fn draw_reset_section(&self, report: &MonitorReport) -> String {
        let mut output = String::new();

        let remaining = report.reset_time - report.generated_at;
        let remaining_minutes = remaining.num_minutes().max(0) as f64;
        let elapsed_pct =
            ((RESET_WINDOW_MINUTES - remaining_minutes) / RESET_WINDOW_MINUTES * 100.0).max(0.0);

        let bar = self.create_progress_bar(elapsed_pct, BAR_WIDTH);
        let reset_line = format!("RESET        {}  {:5.1}%", bar, elapsed_pct.min(100.0));
        output.push_str(&self.draw_line(&reset_line));

        let session = match report.session_start {
            Some(start) => format!(
                "  Session started: {}",
                start.with_timezone(&self.timezone).format("%H:%M")
            ),
            None => String::new(),
        };
        let time_line = format!(
            "   Time to reset: {} ({}){}",
            format_duration(remaining),
            self.format_clock(report.reset_time),
            session
        );
        output.push_str(&self.draw_line(&time_line));

        output
    }

    fn draw_burn_section(&self, report: &MonitorReport) -> String {
        let mut output = String::new();

        let burn_line = format!(
            "BURN RATE    {:.1} tokens/min  {}",
            report.burn_rate_tokens_per_minute.min(999_999.9),
            self.velocity_label(report.velocity_category)
        );
        output.push_str(&self.draw_line(&burn_line));

        if !report.burn_rate_history.is_empty() {
            let history_line = format!(
                "   History: [{}]",
                sparkline(&report.burn_rate_history, SPARK_WIDTH)
            );
            output.push_str(&self.draw_line(&history_line));
        }

        output
    }

    fn draw_prediction_section(&self, report: &MonitorReport) -> String {
        let mut output = String::new();

        let (status_text, tone) = if report.limit_exceeded {
            ("LIMIT EXCEEDED", Tone::Bad)
        } else if report.depletes_before_reset {
            ("WILL RUN OUT BEFORE RESET", Tone::Warn)
        } else {
            ("WITHIN LIMITS", Tone::Good)
        };

        let prediction_line = format!(
            "PREDICTION   Tokens run out: {}  Reset: {}",
            self.format_clock(report.predicted_end_time),
            self.format_clock(report.reset_time)
        );
        output.push_str(&self.draw_line(&prediction_line));

        let status_line = format!("   Status: {}", self.paint(status_text, tone));
        output.push_str(&self.draw_line(&status_line));

        output
    }

    fn notifications(&self, report: &MonitorReport) -> Vec<String> {
        let mut notices = Vec::new();
        if report.plan_switched && report.plan == Plan::Pro {
            notices.push(self.paint(
                &format!(
                    "Tokens exceeded the pro limit - switched to custom_max ({})",
                    format_number(report.token_limit)
                ),
                Tone::Warn,
            ));
        }
        if report.limit_exceeded {
            notices.push(self.paint(
                &format!(
                    "Usage is {} tokens over the limit",
                    format_number(report.tokens_left.unsigned_abs())
                ),
                Tone::Bad,
            ));
        }
        if report.depletes_before_reset && !report.limit_exceeded {
            notices.push(self.paint("Tokens will run out BEFORE reset", Tone::Bad));
        }
        notices
    }

    fn create_progress_bar(&self, percentage: f64, width: usize) -> String {
        let clamped_percentage = percentage.clamp(0.0, 100.0);
        let filled = ((clamped_percentage / 100.0) * width as f64) as usize;
        let filled = filled.min(width);
        let empty = width.saturating_sub(filled);
        format!(
            "[{}{}]",
            PROGRESS_FULL.repeat(filled),
            PROGRESS_EMPTY.repeat(empty)
        )
    }

    fn create_colored_progress_bar(&self, percentage: f64, width: usize, tone: Tone) -> String {
        let bar = self.create_progress_bar(percentage, width);
        self.paint(&bar, tone)
    }

    fn velocity_label(&self, velocity: VelocityCategory) -> String {
        let tone = match velocity {
            VelocityCategory::Slow | VelocityCategory::Moderate => Tone::Good,
            VelocityCategory::Fast => Tone::Warn,
            VelocityCategory::VeryFast => Tone::Bad,
        };
        self.paint(&velocity.to_string().to_uppercase(), tone)
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.colored_output {
            return text.to_string();
        }
        match tone {
            Tone::Good => text.green().to_string(),
            Tone::Warn => text.yellow().to_string(),
            Tone::Bad => text.red().to_string(),
        }
    }

    fn format_clock(&self, dt: DateTime<Utc>) -> String {
        dt.with_timezone(&self.timezone).format("%H:%M").to_string()
    }
}

fn usage_tone(percentage: f64) -> Tone {
    if percentage >= USAGE_DANGER_THRESHOLD {
        Tone::Bad
    } else if percentage >= USAGE_WARNING_THRESHOLD {
        Tone::Warn
    } else {
        Tone::Good
    }
}

/// Most recent `width` samples scaled to the largest of them
fn sparkline(samples: &[f64], width: usize) -> String {
    let recent = &samples[samples.len().saturating_sub(width)..];
    let peak = recent.iter().copied().fold(0.0_f64, f64::max);
    recent
        .iter()
        .map(|&v| {
            if peak <= 0.0 {
                return SPARK_LEVELS[0];
            }
            let idx = ((v / peak) * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
            SPARK_LEVELS[idx.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

fn format_duration(duration: Duration) -> String {
    if duration.num_seconds() <= 0 {
        return "now".to_string();
    }
    let hours = duration.num_hours();
    let minutes = duration.num_minutes() % 60;
    format!("{}h {}m", hours, minutes)
}

/// Format a number with thousands separator
fn format_number(num: u64) -> String {
    let s = num.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

fn terminal_width() -> Option<usize> {
    terminal_size::terminal_size().map(|(width, _)| width.0 as usize)
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dashboard(width: {})", self.width)
    }
}
