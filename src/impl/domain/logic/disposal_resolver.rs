use chrono::NaiveDate;

use super::{round_cents, FiscalCalendar};
use crate::entities::{
    AssetRecord, Convention, IssueKind, Severity, TaxYearConfig, ValidationIssue,
};

/// Financial outcome of one disposal or transfer. The gross accumulated
/// figure and the itemized election amounts are surfaced side by side:
/// `accumulated_depreciation` is the single source of truth for recapture
/// and is taken to already embed prior §179/bonus amounts, so the itemized
/// fields are reporting detail only and are never added on top.
///
/// Transfers move the asset at carryover basis: `proceeds`, `gain_loss`,
/// and `recapture` are zero, and proration runs from the transfer date.
#[derive(Debug, Clone, PartialEq)]
pub struct DisposalOutcome {
    pub unique_id: String,
    pub cost: f64,
    pub accumulated_depreciation: f64,
    pub section179_taken: f64,
    pub bonus_taken: f64,
    pub proceeds: f64,
    /// Net book value: cost less accumulated depreciation.
    pub net_book_value: f64,
    pub gain_loss: f64,
    /// Ordinary-income recapture: gain up to depreciation taken, never
    /// negative.
    pub recapture: f64,
    /// Fraction of the disposal year's depreciation allowed under the
    /// record's convention.
    pub disposal_year_fraction: f64,
    pub warnings: Vec<ValidationIssue>,
}

/// Computes book value, gain/loss, and recapture for disposed assets.
/// Missing inputs produce a populated outcome with warnings, never a crash.
pub struct DisposalResolver {
    calendar: FiscalCalendar,
}

impl DisposalResolver {
    pub(crate) fn new(calendar: FiscalCalendar) -> Self {
        Self { calendar }
    }

    pub fn for_config(config: &TaxYearConfig) -> Result<Self, crate::errors::EngineError> {
        Ok(Self {
            calendar: FiscalCalendar::new(config)?,
        })
    }

    pub fn resolve(&self, record: &AssetRecord) -> DisposalOutcome {
        let mut warnings = Vec::new();

        let is_transfer = record
            .transaction_type
            .map(|t| t.is_transfer())
            .unwrap_or_else(|| record.disposal_date.is_none() && record.transfer_date.is_some());
        let event_date = if is_transfer {
            record.transfer_date
        } else {
            record.disposal_date
        };

        let accumulated = match record.accumulated_depreciation {
            Some(amount) => amount,
            None => {
                warnings.push(ValidationIssue::record(
                    Severity::Warning,
                    IssueKind::MissingAccumulatedDepreciation,
                    &record.unique_id,
                    "no accumulated depreciation observed; assuming zero",
                ));
                0.0
            }
        };
        // Transfers realize nothing; proceeds only matter on a disposal.
        let proceeds = if is_transfer {
            0.0
        } else {
            match record.proceeds {
                Some(amount) => amount,
                None => {
                    warnings.push(ValidationIssue::record(
                        Severity::Warning,
                        IssueKind::DisposalMissingProceeds,
                        &record.unique_id,
                        "no proceeds recorded; gain/loss computed against zero",
                    ));
                    0.0
                }
            }
        };
        if event_date.is_none() {
            let (kind, message) = if is_transfer {
                (
                    IssueKind::TransferMissingDate,
                    "no transfer date; transfer-year proration defaulted",
                )
            } else {
                (
                    IssueKind::DisposalMissingDate,
                    "no disposal date; disposal-year proration defaulted",
                )
            };
            warnings.push(ValidationIssue::record(
                Severity::Warning,
                kind,
                &record.unique_id,
                message,
            ));
        }

        let net_book_value = round_cents(record.cost - accumulated);
        let (gain_loss, recapture) = if is_transfer {
            (0.0, 0.0)
        } else {
            let gain_loss = round_cents(proceeds - net_book_value);
            (gain_loss, round_cents(gain_loss.min(accumulated).max(0.0)))
        };

        DisposalOutcome {
            unique_id: record.unique_id.clone(),
            cost: record.cost,
            accumulated_depreciation: accumulated,
            section179_taken: record.section179_taken,
            bonus_taken: record.bonus_taken,
            proceeds,
            net_book_value,
            gain_loss,
            recapture,
            disposal_year_fraction: self.event_year_fraction(record, event_date),
            warnings,
        }
    }

    /// Event-year depreciation is prorated by the convention, never assumed
    /// full-year: half a year under Half-Year, quarter-midpoint fractions
    /// under Mid-Quarter, month-midpoint under Mid-Month. The fraction runs
    /// from the disposal or transfer date, whichever the record carries.
    fn event_year_fraction(&self, record: &AssetRecord, event_date: Option<NaiveDate>) -> f64 {
        let convention = record.convention.unwrap_or_else(|| {
            if record.category.map(|c| c.is_real_property()).unwrap_or(false) {
                Convention::MidMonth
            } else {
                Convention::HalfYear
            }
        });
        match convention {
            Convention::HalfYear => 0.5,
            Convention::MidQuarter => {
                let quarter = self.quarter_or_default(event_date);
                (quarter as f64 - 0.5) / 4.0
            }
            Convention::MidMonth => match event_date {
                Some(date) => (self.calendar.month_index(date) as f64 - 0.5) / 12.0,
                None => 0.5,
            },
        }
    }

    fn quarter_or_default(&self, date: Option<NaiveDate>) -> u32 {
        date.and_then(|d| self.calendar.quarter_of(d)).unwrap_or(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AssetClass, DepreciationCategory, StrategyMode};

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

    fn resolver() -> DisposalResolver {
        DisposalResolver::for_config(&config()).unwrap()
    }

    fn disposal(cost: f64, accumulated: f64, proceeds: f64) -> AssetRecord {
        let mut record = AssetRecord::new("u1", "A-1", "Press", cost);
        record.accumulated_depreciation = Some(accumulated);
        record.proceeds = Some(proceeds);
        record.disposal_date = NaiveDate::from_ymd_opt(2024, 8, 20);
        record
    }

    #[test]
    fn loss_disposal_has_no_recapture() {
        let outcome = resolver().resolve(&disposal(10_000.0, 6_000.0, 3_000.0));
        assert_eq!(outcome.net_book_value, 4_000.0);
        assert_eq!(outcome.gain_loss, -1_000.0);
        assert_eq!(outcome.recapture, 0.0);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn gain_recaptured_up_to_depreciation_taken() {
        let outcome = resolver().resolve(&disposal(10_000.0, 6_000.0, 12_000.0));
        assert_eq!(outcome.gain_loss, 8_000.0);
        assert_eq!(outcome.recapture, 6_000.0);
    }

    #[test]
    fn gain_below_depreciation_fully_recaptured() {
        let outcome = resolver().resolve(&disposal(10_000.0, 6_000.0, 7_000.0));
        assert_eq!(outcome.gain_loss, 3_000.0);
        assert_eq!(outcome.recapture, 3_000.0);
    }

    #[test]
    fn missing_proceeds_warns_instead_of_crashing() {
        let mut record = disposal(10_000.0, 6_000.0, 0.0);
        record.proceeds = None;
        let outcome = resolver().resolve(&record);
        assert_eq!(outcome.proceeds, 0.0);
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.kind == IssueKind::DisposalMissingProceeds));
    }

    #[test]
    fn half_year_convention_prorates_half() {
        let mut record = disposal(10_000.0, 6_000.0, 3_000.0);
        record.convention = Some(Convention::HalfYear);
        assert_eq!(resolver().resolve(&record).disposal_year_fraction, 0.5);
    }

    #[test]
    fn mid_quarter_august_disposal_is_q3_midpoint() {
        let mut record = disposal(10_000.0, 6_000.0, 3_000.0);
        record.convention = Some(Convention::MidQuarter);
        // Q3 midpoint: (3 - 0.5) / 4.
        assert_eq!(resolver().resolve(&record).disposal_year_fraction, 0.625);
    }

    #[test]
    fn transfer_prorates_from_transfer_date_without_disposal_warnings() {
        let mut record = AssetRecord::new("u1", "A-1", "Press", 10_000.0);
        record.transaction_type = Some(crate::entities::TransactionType::CurrentYearTransfer);
        record.transfer_date = NaiveDate::from_ymd_opt(2024, 8, 20);
        record.accumulated_depreciation = Some(6_000.0);
        record.convention = Some(Convention::MidQuarter);
        let outcome = resolver().resolve(&record);

        // Carryover basis: nothing realized.
        assert_eq!(outcome.proceeds, 0.0);
        assert_eq!(outcome.gain_loss, 0.0);
        assert_eq!(outcome.recapture, 0.0);
        assert_eq!(outcome.net_book_value, 4_000.0);
        // Q3 midpoint from the transfer date, not the Q2 default.
        assert_eq!(outcome.disposal_year_fraction, 0.625);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn undated_transfer_warns_with_the_transfer_kind() {
        let mut record = AssetRecord::new("u1", "A-1", "Press", 10_000.0);
        record.transaction_type = Some(crate::entities::TransactionType::TransferNeedsDate);
        record.accumulated_depreciation = Some(6_000.0);
        let outcome = resolver().resolve(&record);
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.kind == IssueKind::TransferMissingDate));
        assert!(!outcome
            .warnings
            .iter()
            .any(|w| w.kind == IssueKind::DisposalMissingDate
                || w.kind == IssueKind::DisposalMissingProceeds));
    }

    #[test]
    fn mid_month_august_disposal() {
        let mut record = disposal(10_000.0, 6_000.0, 3_000.0);
        record.category = Some(DepreciationCategory::standard(AssetClass::NonresidentialReal));
        record.convention = Some(Convention::MidMonth);
        // August midpoint: (8 - 0.5) / 12.
        assert_eq!(resolver().resolve(&record).disposal_year_fraction, 7.5 / 12.0);
    }
}
