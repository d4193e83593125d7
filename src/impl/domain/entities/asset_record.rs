use chrono::NaiveDate;
use serde_derive::{Deserialize, Serialize};

use super::{
    category::{Convention, DepreciationCategory},
    classification::{ClassificationResult, ClassificationSource, TransactionType},
    election::Election,
    validation::ValidationIssue,
};

/// One tabular asset row after ingestion, carrying classification state as
/// the pipeline fills it in.
///
/// `unique_id` is the only safe join key: it is session-scoped, immutable,
/// and unique across all sheets. `asset_id` is the client's own label and is
/// not guaranteed unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub unique_id: String,
    pub asset_id: String,
    pub description: String,
    /// Non-negative dollars. Negative input survives ingestion so validation
    /// can report it against the right record.
    pub cost: f64,
    pub acquisition_date: Option<NaiveDate>,
    pub in_service_date: Option<NaiveDate>,
    pub disposal_date: Option<NaiveDate>,
    pub transfer_date: Option<NaiveDate>,
    pub proceeds: Option<f64>,
    pub accumulated_depreciation: Option<f64>,
    /// Client-supplied category hint, if any.
    pub client_category: Option<String>,
    /// Required to be capitalized regardless of cost (e.g. part of a larger
    /// project); blocks the de minimis safe harbor.
    pub must_capitalize: bool,
    /// Row came from the disposals sheet (or was marked disposed) even if no
    /// disposal date parsed.
    pub disposed_flag: bool,
    pub transferred_flag: bool,
    /// Used-property / related-party / carryover-basis markers for the bonus
    /// eligibility check.
    pub previously_used: bool,
    pub related_party: bool,
    pub carryover_basis: bool,

    // Filled in by the pipeline.
    pub transaction_type: Option<TransactionType>,
    pub category: Option<DepreciationCategory>,
    pub confidence: f64,
    pub source: Option<ClassificationSource>,
    pub convention: Option<Convention>,
    pub election: Election,
    pub section179_taken: f64,
    pub bonus_taken: f64,
    pub issues: Vec<ValidationIssue>,
}

impl AssetRecord {
    pub fn new(
        unique_id: impl Into<String>,
        asset_id: impl Into<String>,
        description: impl Into<String>,
        cost: f64,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            asset_id: asset_id.into(),
            description: description.into(),
            cost,
            acquisition_date: None,
            in_service_date: None,
            disposal_date: None,
            transfer_date: None,
            proceeds: None,
            accumulated_depreciation: None,
            client_category: None,
            must_capitalize: false,
            disposed_flag: false,
            transferred_flag: false,
            previously_used: false,
            related_party: false,
            carryover_basis: false,
            transaction_type: None,
            category: None,
            confidence: 0.0,
            source: None,
            convention: None,
            election: Election::Pending,
            section179_taken: 0.0,
            bonus_taken: 0.0,
            issues: Vec::new(),
        }
    }

    /// Replace the classification wholesale (never merged field-by-field).
    pub fn apply_classification(&mut self, result: ClassificationResult) {
        self.category = Some(result.category);
        self.confidence = result.confidence;
        self.source = Some(result.source);
    }

    pub fn is_current_year_addition(&self) -> bool {
        self.transaction_type == Some(TransactionType::CurrentYearAddition)
    }

    /// Bonus eligibility per the used/new-property check: not previously used
    /// by the taxpayer, not acquired from a related party, not a
    /// carryover-basis transaction.
    pub fn passes_used_property_check(&self) -> bool {
        !self.previously_used && !self.related_party && !self.carryover_basis
    }

    pub fn push_issue(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }
}
