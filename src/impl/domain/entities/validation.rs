use serde_derive::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

/// Stable machine-readable issue codes. One code per compliance check so the
/// report can aggregate by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    DuplicateUniqueId,
    NegativeCost,
    MissingCost,
    AccumulatedExceedsCost,
    ElectionsExceedCost,
    RealPropertyElection,
    SafeHarborOverThreshold,
    ConventionMismatch,
    FutureInServiceDate,
    MissingInServiceDate,
    DisposalMissingDate,
    DisposalMissingProceeds,
    MissingAccumulatedDepreciation,
    TransferMissingDate,
    UnparseableDate,
    UnparseableAmount,
    LowConfidence,
    CapNearlyExhausted,
    SameYearDisposal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub kind: IssueKind,
    /// `None` for batch-level issues (e.g. convention mismatch summary).
    pub unique_id: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn record(
        severity: Severity,
        kind: IssueKind,
        unique_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            unique_id: Some(unique_id.into()),
            message: message.into(),
        }
    }

    pub fn batch(severity: Severity, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            unique_id: None,
            message: message.into(),
        }
    }

    pub fn blocks_export(&self) -> bool {
        self.severity >= Severity::Error
    }
}

/// Result of one full validation pass over the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    pub export_ready: bool,
    /// Unique ids of records awaiting human review (low confidence, not yet
    /// approved). Populated even when other issues already block export.
    pub pending_review: Vec<String>,
}

impl ValidationReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has_blocking_issues(&self) -> bool {
        self.issues.iter().any(ValidationIssue::blocks_export)
    }
}
