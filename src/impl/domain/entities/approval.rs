use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    Approved,
    Unapproved,
    /// Edit to category/life/method; counts as implicit re-approval by the
    /// editor (the edit itself is the attestation).
    ClassificationEdited,
    /// Edit to description/cost/dates; clears approval and re-enters the
    /// record into the classification pipeline.
    DataEdited,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub action: AuditAction,
    pub actor: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Per-record human approval state. Created on first approval action,
/// mutated only through ledger operations, never deleted — history is
/// append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub unique_id: String,
    pub approved: bool,
    pub approver: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub history: Vec<AuditEntry>,
}

impl ApprovalRecord {
    pub fn new(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            approved: false,
            approver: None,
            timestamp: Utc::now(),
            history: Vec::new(),
        }
    }
}
