use serde_derive::{Deserialize, Serialize};

use super::category::DepreciationCategory;

/// Which stage of the classification pipeline produced the category.
/// Precedence is fixed: MemoryOverride > RuleMatch > ClientHint >
/// KeywordMatch > AIFallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationSource {
    MemoryOverride,
    RuleMatch,
    ClientHint,
    KeywordMatch,
    AIFallback,
    /// Nothing matched and the AI collaborator was unavailable.
    Unclassified,
}

/// Outcome of one classification attempt. Attached to the record wholesale;
/// reclassification replaces it, never merges field-by-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: DepreciationCategory,
    /// In `[0.0, 1.0]`.
    pub confidence: f64,
    pub source: ClassificationSource,
}

impl ClassificationResult {
    pub fn new(
        category: DepreciationCategory,
        confidence: f64,
        source: ClassificationSource,
    ) -> Self {
        Self {
            category,
            confidence: confidence.clamp(0.0, 1.0),
            source,
        }
    }

    pub fn unclassified() -> Self {
        Self {
            category: DepreciationCategory::unclassified(),
            confidence: 0.0,
            source: ClassificationSource::Unclassified,
        }
    }
}

/// Transaction type for the configured tax year. The `NeedsDate` variants
/// carry records flagged as disposed/transferred without a usable date; they
/// are surfaced for review, never silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    CurrentYearAddition,
    ExistingAsset,
    CurrentYearDisposal,
    PriorYearDisposal,
    DisposalNeedsDate,
    CurrentYearTransfer,
    PriorYearTransfer,
    TransferNeedsDate,
}

impl TransactionType {
    pub fn is_disposal(&self) -> bool {
        matches!(
            self,
            TransactionType::CurrentYearDisposal
                | TransactionType::PriorYearDisposal
                | TransactionType::DisposalNeedsDate
        )
    }

    pub fn is_transfer(&self) -> bool {
        matches!(
            self,
            TransactionType::CurrentYearTransfer
                | TransactionType::PriorYearTransfer
                | TransactionType::TransferNeedsDate
        )
    }
}
