//! Token budget resolution per plan

use crate::types::{Plan, UsageBlock};

/// Budget of the `pro` plan, also the fallback for unknown plans
pub const PRO_TOKEN_LIMIT: u64 = 7_000;
pub const MAX5_TOKEN_LIMIT: u64 = 35_000;
pub const MAX20_TOKEN_LIMIT: u64 = 140_000;

/// Largest token count among completed, non-gap blocks
pub fn max_completed_block_tokens(history: &[UsageBlock]) -> Option<u64> {
    history
        .iter()
        .filter(|b| !b.is_gap && !b.is_active)
        .map(|b| b.total_tokens)
        .max()
}

/// Token budget for a plan
///
/// `custom_max` uses the largest completed block in `history`, falling
/// back to the pro budget when there is none or it is zero.
///
/// # Examples
/// ```
/// use ccmonitor_core::limits::resolve_limit;
/// use ccmonitor_core::types::Plan;
///
/// assert_eq!(resolve_limit(Plan::Max5, None), 35_000);
/// assert_eq!(resolve_limit(Plan::CustomMax, None), 7_000);
/// ```
pub fn resolve_limit(plan: Plan, history: Option<&[UsageBlock]>) -> u64 {
    match plan {
        Plan::Pro => PRO_TOKEN_LIMIT,
        Plan::Max5 => MAX5_TOKEN_LIMIT,
        Plan::Max20 => MAX20_TOKEN_LIMIT,
        Plan::CustomMax => history
            .and_then(max_completed_block_tokens)
            .filter(|&max| max > 0)
            .unwrap_or(PRO_TOKEN_LIMIT),
    }
}

/// Token budget for a plan given by name; unknown names resolve as `pro`
pub fn resolve_limit_by_name(plan: &str, history: Option<&[UsageBlock]>) -> u64 {
    resolve_limit(Plan::parse_lenient(plan), history)
}
