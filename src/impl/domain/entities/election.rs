use serde_derive::{Deserialize, Serialize};

/// Primary depreciation treatment for a current-year addition. Where §179
/// and bonus each cover part of the basis, the variant reflects the dominant
/// treatment and the dollar split lives in the record's `section179_taken` /
/// `bonus_taken` bookkeeping fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Election {
    /// Not yet allocated, or not a current-year addition.
    Pending,
    /// Expensed in full under the de minimis safe harbor; excluded from all
    /// depreciation bookkeeping and from the mid-quarter test basis.
    ExpenseSafeHarbor,
    /// Immediate expensing under the annual §179 cap.
    Section179,
    /// First-year bonus percentage on qualifying property.
    Bonus,
    RegularSchedule,
}

/// How aggressively the allocator uses the statutory elections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyMode {
    /// Safe harbor, then §179 up to the shared cap, then bonus, then regular.
    Aggressive,
    /// Safe harbor and bonus only; no §179.
    BalancedBonusOnly,
    /// Safe harbor, then regular schedule for everything.
    Conservative,
}
