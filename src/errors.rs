use thiserror::Error;

/// Batch-fatal failures. Anything record-scoped (bad date, missing cost,
/// low confidence) degrades into a `ValidationIssue` on the record instead;
/// these variants are reserved for problems where proceeding would mean
/// guessing.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no statutory table entry for tax year {year}; refusing to reuse another year's caps")]
    UnsupportedTaxYear { year: i32 },

    #[error("invalid fiscal year start month: {month} (expected 1-12)")]
    InvalidFiscalStartMonth { month: u32 },

    #[error("error reading input file: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid CSV input: {0}")]
    InvalidCsv(#[from] csv::Error),

    #[error("input row {row} is missing required column '{column}'")]
    MissingColumn { row: usize, column: &'static str },

    #[error("invalid category rule table: {0}")]
    InvalidRuleTable(#[from] ron::error::SpannedError),

    #[error("AI classification collaborator unavailable: {reason}")]
    AiUnavailable { reason: String },

    #[error("AI classification timed out after {timeout_ms}ms")]
    AiTimeout { timeout_ms: u64 },
}
