//! Core domain types for ccmonitor
//!
//! A [`Snapshot`] is what the usage tool reports at one polling instant: an
//! ordered list of [`UsageBlock`]s. Snapshots are replaced wholesale every
//! tick; nothing in them is mutated in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CcmonitorError, Result};

/// One recorded (or currently open) usage session
///
/// Deserializes from the usage tool's `blocks --json` output. Keys are
/// camelCase and unknown keys are ignored.
///
/// # Examples
/// ```
/// use ccmonitor_core::types::UsageBlock;
///
/// let block: UsageBlock = serde_json::from_str(
///     r#"{"startTime":"2024-07-15T10:00:00Z","totalTokens":1200,"isActive":true}"#,
/// ).unwrap();
/// assert!(block.is_active);
/// assert!(!block.is_gap);
/// assert_eq!(block.total_tokens, 1200);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageBlock {
    /// Block identifier as reported by the usage tool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Start of the block; blocks without one are ignored by all calculations
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// Scheduled end of the billing window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Last recorded activity, meaningful for closed blocks only
    #[serde(default)]
    pub actual_end_time: Option<DateTime<Utc>>,
    /// Tokens consumed in the block
    #[serde(default)]
    pub total_tokens: u64,
    /// Cost of the block in USD, when the usage tool reports it
    #[serde(default, rename = "costUSD", skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
    /// Models seen in the block
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,
    /// Synthetic "no activity" placeholder
    #[serde(default)]
    pub is_gap: bool,
    /// The currently open session
    #[serde(default)]
    pub is_active: bool,
}

impl UsageBlock {
    /// End of the block for overlap purposes
    ///
    /// Active blocks end at `now`. Closed blocks end at their recorded end,
    /// and are treated as still open when none was recorded.
    pub fn effective_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if self.is_active {
            now
        } else {
            self.actual_end_time.unwrap_or(now)
        }
    }

    /// Tokens this block may contribute to any metric
    pub fn countable_tokens(&self) -> u64 {
        if self.is_gap { 0 } else { self.total_tokens }
    }
}

/// Usage blocks at one polling instant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Blocks in the order the usage tool reported them
    pub blocks: Vec<UsageBlock>,
}

impl Snapshot {
    /// Create a snapshot from blocks
    pub fn new(blocks: Vec<UsageBlock>) -> Self {
        Self { blocks }
    }

    /// Parse the usage tool's JSON output
    ///
    /// A payload without a `blocks` array is rejected as
    /// [`CcmonitorError::InvalidSnapshot`]; malformed timestamps surface as
    /// [`CcmonitorError::Json`].
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let problem = match value.get("blocks") {
            Some(serde_json::Value::Array(_)) => None,
            Some(_) => Some("'blocks' is not an array"),
            None => Some("missing 'blocks' field"),
        };
        if let Some(problem) = problem {
            return Err(CcmonitorError::InvalidSnapshot(problem.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// First block flagged active; ties are ignored
    pub fn active_block(&self) -> Option<&UsageBlock> {
        self.blocks.iter().find(|b| b.is_active)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Token budget tier
///
/// # Examples
/// ```
/// use ccmonitor_core::types::Plan;
/// use std::str::FromStr;
///
/// assert_eq!(Plan::from_str("max5").unwrap(), Plan::Max5);
/// assert_eq!(Plan::CustomMax.to_string(), "custom_max");
/// assert_eq!(Plan::parse_lenient("enterprise"), Plan::Pro);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Pro,
    Max5,
    Max20,
    /// Budget derived from the largest completed block
    CustomMax,
}

impl Plan {
    pub const ALL: [Plan; 4] = [Plan::Pro, Plan::Max5, Plan::Max20, Plan::CustomMax];

    /// Parse a plan name, treating unknown names as `pro`
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown plan '{}', falling back to pro", s);
            Plan::Pro
        })
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pro => write!(f, "pro"),
            Self::Max5 => write!(f, "max5"),
            Self::Max20 => write!(f, "max20"),
            Self::CustomMax => write!(f, "custom_max"),
        }
    }
}

impl std::str::FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pro" => Ok(Self::Pro),
            "max5" => Ok(Self::Max5),
            "max20" => Ok(Self::Max20),
            "custom_max" | "custom-max" => Ok(Self::CustomMax),
            _ => Err(format!(
                "Invalid plan: {s} (expected pro, max5, max20 or custom_max)"
            )),
        }
    }
}

/// Coarse label for a burn rate in tokens per minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityCategory {
    /// Below 50 tokens/min
    Slow,
    /// Below 150 tokens/min
    Moderate,
    /// Below 300 tokens/min
    Fast,
    VeryFast,
}

impl VelocityCategory {
    pub fn from_burn_rate(tokens_per_minute: f64) -> Self {
        if tokens_per_minute < 50.0 {
            Self::Slow
        } else if tokens_per_minute < 150.0 {
            Self::Moderate
        } else if tokens_per_minute < 300.0 {
            Self::Fast
        } else {
            Self::VeryFast
        }
    }
}

impl fmt::Display for VelocityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slow => write!(f, "slow"),
            Self::Moderate => write!(f, "moderate"),
            Self::Fast => write!(f, "fast"),
            Self::VeryFast => write!(f, "very fast"),
        }
    }
}
