use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use tracing::debug;

use crate::entities::{ApprovalRecord, AuditAction, AuditEntry};

/// Per-record human approval state plus an append-only audit trail.
///
/// Mutations are serialized through the interior mutex so concurrent
/// approve/unapprove requests from the UI cannot lose updates. Records are
/// created on first approval action and only ever superseded, never deleted.
#[derive(Debug, Default)]
pub struct ApprovalLedger {
    records: Mutex<HashMap<String, ApprovalRecord>>,
}

impl ApprovalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn approve(&self, unique_id: &str, approver: Option<&str>) {
        self.mutate(unique_id, AuditAction::Approved, approver);
    }

    pub fn unapprove(&self, unique_id: &str, approver: Option<&str>) {
        self.mutate(unique_id, AuditAction::Unapproved, approver);
    }

    /// Category/life/method edit: the edit itself is the attestation, so the
    /// record becomes approved by the editor.
    pub fn record_classification_edit(&self, unique_id: &str, editor: Option<&str>) {
        self.mutate(unique_id, AuditAction::ClassificationEdited, editor);
    }

    /// Description/cost/date edit: approval no longer attests to the current
    /// data, so it is cleared and the record re-enters the pipeline.
    pub fn record_data_edit(&self, unique_id: &str, editor: Option<&str>) {
        self.mutate(unique_id, AuditAction::DataEdited, editor);
    }

    pub fn is_approved(&self, unique_id: &str) -> bool {
        self.records
            .lock()
            .map(|records| {
                records
                    .get(unique_id)
                    .map(|record| record.approved)
                    .unwrap_or(false)
            })
            .unwrap_or(false)
    }

    pub fn history(&self, unique_id: &str) -> Vec<AuditEntry> {
        self.records
            .lock()
            .map(|records| {
                records
                    .get(unique_id)
                    .map(|record| record.history.clone())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    fn mutate(&self, unique_id: &str, action: AuditAction, actor: Option<&str>) {
        let Ok(mut records) = self.records.lock() else {
            return;
        };
        let record = records
            .entry(unique_id.to_string())
            .or_insert_with(|| ApprovalRecord::new(unique_id));
        let now = Utc::now();
        record.approved = matches!(
            action,
            AuditAction::Approved | AuditAction::ClassificationEdited
        );
        record.approver = if record.approved {
            actor.map(str::to_string)
        } else {
            None
        };
        record.timestamp = now;
        record.history.push(AuditEntry {
            action,
            actor: actor.map(str::to_string),
            timestamp: now,
        });
        debug!(unique_id, ?action, "approval ledger updated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approve_then_unapprove() {
        let ledger = ApprovalLedger::new();
        assert!(!ledger.is_approved("u1"));

        ledger.approve("u1", Some("reviewer@firm"));
        assert!(ledger.is_approved("u1"));

        ledger.unapprove("u1", Some("reviewer@firm"));
        assert!(!ledger.is_approved("u1"));

        let history = ledger.history("u1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, AuditAction::Approved);
        assert_eq!(history[1].action, AuditAction::Unapproved);
    }

    #[test]
    fn classification_edit_is_implicit_approval() {
        let ledger = ApprovalLedger::new();
        ledger.record_classification_edit("u1", Some("editor"));
        assert!(ledger.is_approved("u1"));
    }

    #[test]
    fn data_edit_clears_approval() {
        let ledger = ApprovalLedger::new();
        ledger.approve("u1", Some("reviewer"));
        ledger.record_data_edit("u1", Some("editor"));
        assert!(!ledger.is_approved("u1"));
        assert_eq!(ledger.history("u1").len(), 2);
    }

    #[test]
    fn history_of_unknown_record_is_empty() {
        let ledger = ApprovalLedger::new();
        assert!(ledger.history("missing").is_empty());
    }
}
