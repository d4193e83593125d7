use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::{approval_ledger::ApprovalLedger, election_allocator::qualifies_safe_harbor, FiscalCalendar};
use crate::entities::{
    AssetRecord, Convention, Election, IssueKind, Severity, TaxYearConfig, TransactionType,
    ValidationIssue, ValidationReport,
};

/// Runs the integrity/compliance checks over the fully classified batch and
/// decides export readiness. Fails closed: any Critical or Error issue
/// blocks export with no override path, and low-confidence records block
/// until a human approval is on the ledger.
pub(crate) struct ValidationEngine<'a> {
    config: &'a TaxYearConfig,
    calendar: FiscalCalendar,
}

impl<'a> ValidationEngine<'a> {
    pub(crate) fn new(config: &'a TaxYearConfig, calendar: FiscalCalendar) -> Self {
        Self { config, calendar }
    }

    pub(crate) fn validate(
        &self,
        records: &[AssetRecord],
        ledger: &ApprovalLedger,
    ) -> ValidationReport {
        let mut issues: Vec<ValidationIssue> = Vec::new();

        // Issues already attached to records during earlier passes.
        for record in records {
            issues.extend(record.issues.iter().cloned());
        }

        self.check_duplicate_ids(records, &mut issues);
        for record in records {
            self.check_amounts(record, &mut issues);
            self.check_elections(record, &mut issues);
            self.check_dates(record, &mut issues);
        }
        self.check_convention_consistency(records, &mut issues);

        let pending_review = self.pending_review(records, ledger, &mut issues);
        let export_ready =
            !issues.iter().any(ValidationIssue::blocks_export) && pending_review.is_empty();
        debug!(
            issues = issues.len(),
            pending = pending_review.len(),
            export_ready,
            "validation pass complete"
        );

        ValidationReport {
            issues,
            export_ready,
            pending_review,
        }
    }

    fn check_duplicate_ids(&self, records: &[AssetRecord], issues: &mut Vec<ValidationIssue>) {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for record in records {
            *seen.entry(record.unique_id.as_str()).or_default() += 1;
        }
        let mut duplicates: Vec<_> = seen.into_iter().filter(|(_, n)| *n > 1).collect();
        duplicates.sort();
        for (unique_id, count) in duplicates {
            issues.push(ValidationIssue::record(
                Severity::Critical,
                IssueKind::DuplicateUniqueId,
                unique_id,
                format!("unique id appears {count} times; records cannot be joined safely"),
            ));
        }
    }

    fn check_amounts(&self, record: &AssetRecord, issues: &mut Vec<ValidationIssue>) {
        if record.cost < 0.0 {
            issues.push(ValidationIssue::record(
                Severity::Error,
                IssueKind::NegativeCost,
                &record.unique_id,
                format!("negative cost {:.2}", record.cost),
            ));
        }
        if let Some(accumulated) = record.accumulated_depreciation {
            if accumulated > record.cost {
                issues.push(ValidationIssue::record(
                    Severity::Critical,
                    IssueKind::AccumulatedExceedsCost,
                    &record.unique_id,
                    format!(
                        "accumulated depreciation {:.2} exceeds cost {:.2}",
                        accumulated, record.cost
                    ),
                ));
            }
        }
        if record.section179_taken + record.bonus_taken > record.cost + 1e-6 {
            issues.push(ValidationIssue::record(
                Severity::Critical,
                IssueKind::ElectionsExceedCost,
                &record.unique_id,
                format!(
                    "§179 {:.2} + bonus {:.2} exceed cost {:.2}",
                    record.section179_taken, record.bonus_taken, record.cost
                ),
            ));
        }
    }

    fn check_elections(&self, record: &AssetRecord, issues: &mut Vec<ValidationIssue>) {
        if let Some(category) = record.category {
            let has_statutory_election = record.section179_taken > 0.0
                || record.bonus_taken > 0.0
                || matches!(record.election, Election::Section179 | Election::Bonus);
            if category.is_real_property()
                && !category.is_qualified_improvement()
                && has_statutory_election
            {
                issues.push(ValidationIssue::record(
                    Severity::Critical,
                    IssueKind::RealPropertyElection,
                    &record.unique_id,
                    format!(
                        "{}-year real property carries a §179/bonus election",
                        category.life_years
                    ),
                ));
            }
        }
        if record.election == Election::ExpenseSafeHarbor
            && !qualifies_safe_harbor(record, self.config)
        {
            issues.push(ValidationIssue::record(
                Severity::Error,
                IssueKind::SafeHarborOverThreshold,
                &record.unique_id,
                format!(
                    "safe harbor election at cost {:.2} over threshold {:.2}",
                    record.cost, self.config.safe_harbor_threshold
                ),
            ));
        }
    }

    fn check_dates(&self, record: &AssetRecord, issues: &mut Vec<ValidationIssue>) {
        if let Some(date) = record.in_service_date {
            if date > self.calendar.end() {
                issues.push(ValidationIssue::record(
                    Severity::Warning,
                    IssueKind::FutureInServiceDate,
                    &record.unique_id,
                    format!("in-service date {date} is after the tax year end"),
                ));
            }
        }
    }

    /// Every eligible personal-property addition must share one convention.
    fn check_convention_consistency(
        &self,
        records: &[AssetRecord],
        issues: &mut Vec<ValidationIssue>,
    ) {
        let conventions: HashSet<Convention> = records
            .iter()
            .filter(|r| r.is_current_year_addition())
            .filter(|r| {
                r.category.map(|c| !c.is_real_property()).unwrap_or(false)
                    && r.election != Election::ExpenseSafeHarbor
            })
            .filter_map(|r| r.convention)
            .collect();
        if conventions.len() > 1 {
            issues.push(ValidationIssue::batch(
                Severity::Error,
                IssueKind::ConventionMismatch,
                "personal-property additions carry more than one convention for the year",
            ));
        }
    }

    /// Low-confidence current-year activity needs a human approval before
    /// export. Additions, disposals, and transfers in the configured year
    /// are all actionable; a misclassified disposal is as exportable-wrong
    /// as a misclassified addition. Approved records pass; the rest land in
    /// `pending_review`.
    fn pending_review(
        &self,
        records: &[AssetRecord],
        ledger: &ApprovalLedger,
        issues: &mut Vec<ValidationIssue>,
    ) -> Vec<String> {
        let mut pending = Vec::new();
        for record in records {
            let actionable = matches!(
                record.transaction_type,
                Some(TransactionType::CurrentYearAddition)
                    | Some(TransactionType::CurrentYearDisposal)
                    | Some(TransactionType::CurrentYearTransfer)
            );
            if !actionable {
                continue;
            }
            if record.confidence >= self.config.review_confidence_threshold {
                continue;
            }
            issues.push(ValidationIssue::record(
                Severity::Info,
                IssueKind::LowConfidence,
                &record.unique_id,
                format!(
                    "classification confidence {:.2} below review threshold {:.2}",
                    record.confidence, self.config.review_confidence_threshold
                ),
            ));
            if !ledger.is_approved(&record.unique_id) {
                pending.push(record.unique_id.clone());
            }
        }
        pending.sort();
        pending
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::entities::{
        AssetClass, ClassificationResult, ClassificationSource, DepreciationCategory, StrategyMode,
    };

    fn config() -> TaxYearConfig {
        TaxYearConfig {
            tax_year: 2024,
            fy_start_month: 1,
            audited_financials: false,
            safe_harbor_threshold: 2500.0,
            section179_cap: 1_220_000.0,
            section179_phaseout_threshold: 3_050_000.0,
            bonus_rate: 0.6,
            strategy: StrategyMode::Aggressive,
            review_confidence_threshold: 0.8,
        }
    }

    fn validate(records: &[AssetRecord], ledger: &ApprovalLedger) -> ValidationReport {
        let config = config();
        let calendar = FiscalCalendar::new(&config).unwrap();
        ValidationEngine::new(&config, calendar).validate(records, ledger)
    }

    fn classified_addition(unique_id: &str, cost: f64, confidence: f64) -> AssetRecord {
        let mut record = AssetRecord::new(unique_id, unique_id, "Dell Laptop", cost);
        record.in_service_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        record.transaction_type = Some(TransactionType::CurrentYearAddition);
        record.apply_classification(ClassificationResult::new(
            DepreciationCategory::standard(AssetClass::ComputerEquipment),
            confidence,
            ClassificationSource::RuleMatch,
        ));
        record.convention = Some(Convention::HalfYear);
        record.election = Election::RegularSchedule;
        record
    }

    #[test]
    fn clean_batch_is_export_ready() {
        let records = vec![classified_addition("u1", 5_000.0, 0.9)];
        let report = validate(&records, &ApprovalLedger::new());
        assert!(report.export_ready);
        assert!(!report.has_blocking_issues());
    }

    #[test]
    fn duplicate_unique_ids_are_critical_regardless_of_approval() {
        let records = vec![
            classified_addition("u1", 5_000.0, 0.9),
            classified_addition("u1", 6_000.0, 0.9),
        ];
        let ledger = ApprovalLedger::new();
        ledger.approve("u1", Some("reviewer"));
        let report = validate(&records, &ledger);
        assert!(!report.export_ready);
        assert!(report
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::DuplicateUniqueId && i.severity == Severity::Critical));
    }

    #[test]
    fn accumulated_over_cost_is_critical() {
        let mut record = classified_addition("u1", 5_000.0, 0.9);
        record.accumulated_depreciation = Some(6_000.0);
        let report = validate(&[record], &ApprovalLedger::new());
        assert!(!report.export_ready);
        assert_eq!(report.count(Severity::Critical), 1);
    }

    #[test]
    fn real_property_with_bonus_is_critical() {
        let mut record = classified_addition("u1", 500_000.0, 0.9);
        record.apply_classification(ClassificationResult::new(
            DepreciationCategory::standard(AssetClass::NonresidentialReal),
            0.9,
            ClassificationSource::RuleMatch,
        ));
        record.election = Election::Bonus;
        record.bonus_taken = 300_000.0;
        let report = validate(&[record], &ApprovalLedger::new());
        assert!(report
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::RealPropertyElection && i.severity == Severity::Critical));
    }

    #[test]
    fn convention_mismatch_across_additions_is_an_error() {
        let mut a = classified_addition("u1", 5_000.0, 0.9);
        let mut b = classified_addition("u2", 5_000.0, 0.9);
        a.convention = Some(Convention::HalfYear);
        b.convention = Some(Convention::MidQuarter);
        let report = validate(&[a, b], &ApprovalLedger::new());
        assert!(report
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::ConventionMismatch));
        assert!(!report.export_ready);
    }

    #[test]
    fn low_confidence_blocks_until_approved() {
        let records = vec![classified_addition("u1", 5_000.0, 0.5)];
        let ledger = ApprovalLedger::new();

        let report = validate(&records, &ledger);
        assert!(!report.export_ready);
        assert_eq!(report.pending_review, vec!["u1".to_string()]);

        ledger.approve("u1", Some("reviewer"));
        let report = validate(&records, &ledger);
        assert!(report.export_ready);
        assert!(report.pending_review.is_empty());
    }

    #[test]
    fn low_confidence_disposal_also_blocks_until_approved() {
        let mut record = classified_addition("u1", 10_000.0, 0.3);
        record.transaction_type = Some(TransactionType::CurrentYearDisposal);
        record.disposal_date = NaiveDate::from_ymd_opt(2024, 8, 20);
        record.proceeds = Some(3_000.0);
        record.accumulated_depreciation = Some(6_000.0);
        let records = vec![record];
        let ledger = ApprovalLedger::new();

        let report = validate(&records, &ledger);
        assert!(!report.export_ready);
        assert_eq!(report.pending_review, vec!["u1".to_string()]);

        ledger.approve("u1", Some("reviewer"));
        let report = validate(&records, &ledger);
        assert!(report.export_ready);
    }

    #[test]
    fn approval_cannot_override_critical_issues() {
        let mut record = classified_addition("u1", 5_000.0, 0.5);
        record.accumulated_depreciation = Some(9_000.0);
        let ledger = ApprovalLedger::new();
        ledger.approve("u1", Some("reviewer"));
        let report = validate(&[record], &ledger);
        assert!(!report.export_ready);
    }
}
