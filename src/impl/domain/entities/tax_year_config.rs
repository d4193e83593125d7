use serde_derive::{Deserialize, Serialize};

use super::election::StrategyMode;

/// Immutable configuration for one evaluation pass. Constructed once per
/// user-initiated configuration change (see `statutory::config_for_year` for
/// the year-keyed statutory lookup); every classification/allocation call
/// receives it read-only and it is never mutated mid-pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxYearConfig {
    pub tax_year: i32,
    /// 1 = calendar year. A fiscal year labeled Y ends the day before
    /// Y-`fy_start_month`-01 when this is > 1.
    pub fy_start_month: u32,
    pub audited_financials: bool,
    /// De minimis safe harbor per-item threshold (inclusive).
    pub safe_harbor_threshold: f64,
    /// Annual §179 dollar cap for the year.
    pub section179_cap: f64,
    /// Total-additions threshold above which the §179 cap phases out
    /// dollar-for-dollar.
    pub section179_phaseout_threshold: f64,
    /// Statutory bonus percentage for the year, in `[0.0, 1.0]`.
    pub bonus_rate: f64,
    pub strategy: StrategyMode,
    /// Records classified below this confidence require human approval
    /// before export.
    pub review_confidence_threshold: f64,
}

impl TaxYearConfig {
    /// Effective §179 cap after the phase-out: dollar-for-dollar reduction
    /// for eligible additions above the phase-out threshold, floored at zero.
    pub fn effective_section179_cap(&self, eligible_additions_total: f64) -> f64 {
        let excess = (eligible_additions_total - self.section179_phaseout_threshold).max(0.0);
        (self.section179_cap - excess).max(0.0)
    }
}
