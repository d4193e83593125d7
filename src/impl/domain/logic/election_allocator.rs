use tracing::{debug, warn};

use super::round_cents;
use crate::entities::{
    AssetRecord, Election, IssueKind, Severity, StrategyMode, TaxYearConfig, ValidationIssue,
};

/// De minimis safe harbor test. Cost exactly at the threshold qualifies;
/// one unit over does not. Shared with the convention resolver so both
/// passes agree on which assets are out of the depreciation system.
pub(crate) fn qualifies_safe_harbor(record: &AssetRecord, config: &TaxYearConfig) -> bool {
    !record.must_capitalize && record.cost <= config.safe_harbor_threshold
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AllocationSummary {
    pub safe_harbor_total: f64,
    pub section179_total: f64,
    pub bonus_total: f64,
    /// Annual cap after the phase-out reduction, as applied to this batch.
    pub effective_section179_cap: f64,
}

/// Allocates a depreciation election to every current-year addition under
/// the shared annual caps.
///
/// The cap is batch-scoped: allocation is one pass over the whole batch in
/// ascending `unique_id` order (the documented deterministic order), with a
/// running total. Allocating per record independently would over-allocate
/// the shared cap.
pub(crate) struct ElectionAllocator<'a> {
    config: &'a TaxYearConfig,
}

impl<'a> ElectionAllocator<'a> {
    pub(crate) fn new(config: &'a TaxYearConfig) -> Self {
        Self { config }
    }

    pub(crate) fn allocate(&self, records: &mut [AssetRecord]) -> AllocationSummary {
        let mut order: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_current_year_addition())
            .map(|(i, _)| i)
            .collect();
        order.sort_by(|&a, &b| records[a].unique_id.cmp(&records[b].unique_id));

        // Phase-out basis: cost of all §179-eligible additions, computed up
        // front so the effective cap is fixed before any allocation.
        let eligible_total: f64 = order
            .iter()
            .map(|&i| &records[i])
            .filter(|r| !qualifies_safe_harbor(r, self.config) && self.section179_eligible(r))
            .map(|r| r.cost)
            .sum();
        let effective_cap = self.config.effective_section179_cap(eligible_total);

        let mut summary = AllocationSummary {
            safe_harbor_total: 0.0,
            section179_total: 0.0,
            bonus_total: 0.0,
            effective_section179_cap: effective_cap,
        };
        let mut cap_remaining = effective_cap;

        for index in order {
            let record = &mut records[index];
            // Reset before allocating so re-runs are idempotent.
            record.section179_taken = 0.0;
            record.bonus_taken = 0.0;

            if qualifies_safe_harbor(record, self.config) {
                record.election = Election::ExpenseSafeHarbor;
                summary.safe_harbor_total = round_cents(summary.safe_harbor_total + record.cost);
                continue;
            }

            let mut basis = record.cost;

            if self.config.strategy == StrategyMode::Aggressive
                && self.section179_eligible(record)
                && basis > 0.0
            {
                let take = round_cents(basis.min(cap_remaining));
                if take > 0.0 {
                    record.section179_taken = take;
                    cap_remaining = round_cents(cap_remaining - take);
                    summary.section179_total = round_cents(summary.section179_total + take);
                    basis = round_cents(basis - take);
                }
                if basis > 0.0 && cap_remaining <= 0.0 {
                    warn!(unique_id = %record.unique_id, "§179 cap exhausted");
                    record.push_issue(ValidationIssue::record(
                        Severity::Warning,
                        IssueKind::CapNearlyExhausted,
                        record.unique_id.clone(),
                        "annual §179 cap exhausted; remaining basis allocated to bonus/regular",
                    ));
                }
            }

            if self.bonus_allowed(record) && basis > 0.0 {
                let bonus = round_cents(basis * self.config.bonus_rate);
                record.bonus_taken = bonus;
                summary.bonus_total = round_cents(summary.bonus_total + bonus);
                basis = round_cents(basis - bonus);
            }

            record.election = if record.section179_taken > 0.0 {
                Election::Section179
            } else if record.bonus_taken > 0.0 {
                Election::Bonus
            } else {
                Election::RegularSchedule
            };
            debug!(
                unique_id = %record.unique_id,
                election = ?record.election,
                section179 = record.section179_taken,
                bonus = record.bonus_taken,
                regular = basis,
                "allocated election"
            );
        }

        summary
    }

    /// Real property never takes §179, except the designated
    /// qualified-improvement exception.
    fn section179_eligible(&self, record: &AssetRecord) -> bool {
        record
            .category
            .map(|c| !c.is_real_property() || c.is_qualified_improvement())
            .unwrap_or(false)
    }

    fn bonus_allowed(&self, record: &AssetRecord) -> bool {
        let strategy_permits = matches!(
            self.config.strategy,
            StrategyMode::Aggressive | StrategyMode::BalancedBonusOnly
        );
        strategy_permits
            && self.config.bonus_rate > 0.0
            && self.section179_eligible(record)
            && record.passes_used_property_check()
    }
}
