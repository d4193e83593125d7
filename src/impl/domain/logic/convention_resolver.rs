use tracing::debug;

use super::{election_allocator::qualifies_safe_harbor, FiscalCalendar};
use crate::entities::{
    AssetRecord, Convention, IssueKind, Severity, TaxYearConfig, ValidationIssue,
};

/// Strictly-greater-than threshold of the mid-quarter test.
const MID_QUARTER_THRESHOLD: f64 = 0.40;

/// Resolves the single timing convention for the year from the 40% test:
/// if fourth-fiscal-quarter additions exceed 40% of total addition cost
/// (tangible personal property only), every eligible personal-property
/// addition takes Mid-Quarter, otherwise Half-Year. Real property is always
/// Mid-Month.
///
/// This is one aggregate pass over a consistent snapshot: it runs after all
/// records are classified and before election allocation, and writes its
/// result back to every affected record. Computing it per record would let
/// two records in the same year disagree.
pub(crate) struct ConventionResolver<'a> {
    config: &'a TaxYearConfig,
    calendar: FiscalCalendar,
}

impl<'a> ConventionResolver<'a> {
    pub(crate) fn new(config: &'a TaxYearConfig, calendar: FiscalCalendar) -> Self {
        Self { config, calendar }
    }

    pub(crate) fn resolve(&self, records: &mut [AssetRecord]) -> Convention {
        let mut total_cost = 0.0;
        let mut q4_cost = 0.0;

        for record in records.iter() {
            if !self.in_test_basis(record) {
                continue;
            }
            total_cost += record.cost;
            if record
                .in_service_date
                .and_then(|date| self.calendar.quarter_of(date))
                == Some(4)
            {
                q4_cost += record.cost;
            }
        }

        let convention = if total_cost > 0.0 && q4_cost / total_cost > MID_QUARTER_THRESHOLD {
            Convention::MidQuarter
        } else {
            Convention::HalfYear
        };
        debug!(
            q4_cost,
            total_cost,
            ?convention,
            "resolved personal-property convention"
        );

        for record in records.iter_mut() {
            if !record.is_current_year_addition() {
                self.flag_same_year_disposal(record);
                continue;
            }
            let Some(category) = record.category else {
                continue;
            };
            if category.is_real_property() {
                record.convention = Some(Convention::MidMonth);
            } else if !qualifies_safe_harbor(record, self.config) {
                record.convention = Some(convention);
            }
        }

        convention
    }

    /// Test basis: tangible personal property current-year additions,
    /// excluding assets that will be fully expensed under the safe harbor.
    /// The safe-harbor exclusion is a documented policy decision; the
    /// threshold test is pure, so it is stable across the later allocation
    /// pass.
    fn in_test_basis(&self, record: &AssetRecord) -> bool {
        record.is_current_year_addition()
            && record
                .category
                .map(|c| c.is_tangible_personal_property())
                .unwrap_or(false)
            && !qualifies_safe_harbor(record, self.config)
    }

    /// Disposed-same-year additions are out of scope for this pass; flag
    /// them rather than guessing a convention.
    fn flag_same_year_disposal(&self, record: &mut AssetRecord) {
        let same_year = record
            .in_service_date
            .map(|d| self.calendar.contains(d))
            .unwrap_or(false)
            && record
                .disposal_date
                .map(|d| self.calendar.contains(d))
                .unwrap_or(false);
        if same_year {
            record.push_issue(ValidationIssue::record(
                Severity::Warning,
                IssueKind::SameYearDisposal,
                &record.unique_id,
                "placed in service and disposed in the same tax year; review convention manually",
            ));
        }
    }
}
