use tracing::warn;

use super::FiscalCalendar;
use crate::entities::{
    AssetRecord, IssueKind, Severity, TaxYearConfig, TransactionType, ValidationIssue,
};

/// Assigns each record's transaction type from its dates and the active
/// tax-year window. Never fails: unusable dates degrade to the needs-date
/// variants or to ExistingAsset with a warning attached to the record.
pub(crate) struct TransactionClassifier {
    calendar: FiscalCalendar,
    tax_year: i32,
}

impl TransactionClassifier {
    pub(crate) fn new(config: &TaxYearConfig, calendar: FiscalCalendar) -> Self {
        Self {
            calendar,
            tax_year: config.tax_year,
        }
    }

    pub(crate) fn classify(&self, record: &mut AssetRecord) {
        let transaction_type = self.resolve(record);
        record.transaction_type = Some(transaction_type);
    }

    fn resolve(&self, record: &mut AssetRecord) -> TransactionType {
        // Disposal takes precedence over transfer and addition logic: a
        // disposed asset's in-service year no longer matters for this pass.
        if let Some(date) = record.disposal_date {
            return if self.calendar.year_of(date) == self.tax_year {
                TransactionType::CurrentYearDisposal
            } else {
                TransactionType::PriorYearDisposal
            };
        }
        if record.disposed_flag {
            record.push_issue(ValidationIssue::record(
                Severity::Error,
                IssueKind::DisposalMissingDate,
                &record.unique_id,
                format!(
                    "'{}' is marked disposed but has no usable disposal date",
                    record.description
                ),
            ));
            return TransactionType::DisposalNeedsDate;
        }

        if let Some(date) = record.transfer_date {
            return if self.calendar.year_of(date) == self.tax_year {
                TransactionType::CurrentYearTransfer
            } else {
                TransactionType::PriorYearTransfer
            };
        }
        if record.transferred_flag {
            record.push_issue(ValidationIssue::record(
                Severity::Error,
                IssueKind::TransferMissingDate,
                &record.unique_id,
                format!(
                    "'{}' is marked transferred but has no usable transfer date",
                    record.description
                ),
            ));
            return TransactionType::TransferNeedsDate;
        }

        match record.in_service_date {
            Some(date) if self.calendar.contains(date) => TransactionType::CurrentYearAddition,
            Some(_) => TransactionType::ExistingAsset,
            None => {
                warn!(
                    unique_id = %record.unique_id,
                    "missing in-service date; treating as existing asset"
                );
                record.push_issue(ValidationIssue::record(
                    Severity::Warning,
                    IssueKind::MissingInServiceDate,
                    &record.unique_id,
                    "no in-service date; treated as existing asset pending review",
                ));
                TransactionType::ExistingAsset
            }
        }
    }
}
