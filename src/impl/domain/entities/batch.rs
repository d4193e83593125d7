use std::collections::HashMap;

use serde_derive::{Deserialize, Serialize};

use super::{
    asset_record::AssetRecord,
    category::DepreciationCategory,
    classification::{ClassificationResult, ClassificationSource},
    election::Election,
    tax_year_config::TaxYearConfig,
    validation::IssueKind,
};
use crate::domain::logic::{approval_ledger::ApprovalLedger, disposal_resolver::DisposalOutcome};

/// Session-scoped memory of human-approved classifications. Recall is by
/// normalized description (lowercased, punctuation stripped, whitespace
/// collapsed), which is what "near-exact match" means here. Torn down with
/// the session on a new import; never a process-wide singleton.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMemory {
    overrides: HashMap<String, DepreciationCategory>,
}

impl SessionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(description: &str) -> String {
        description
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn remember(&mut self, description: &str, category: DepreciationCategory) {
        self.overrides
            .insert(Self::normalize(description), category);
    }

    pub fn recall(&self, description: &str) -> Option<DepreciationCategory> {
        self.overrides.get(&Self::normalize(description)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// The session arena: one import's records, override memory, and approval
/// ledger, owned together so teardown and reconfiguration are atomic. A
/// tax-year change never mutates a session in place; the usecase consumes
/// the old session and hands back a freshly classified one, so readers can
/// never observe a partially reclassified batch.
#[derive(Debug)]
pub struct BatchSession {
    pub session_id: String,
    pub config: TaxYearConfig,
    pub records: Vec<AssetRecord>,
    pub memory: SessionMemory,
    pub ledger: ApprovalLedger,
    /// Financial outcomes for disposal/transfer records, refreshed on every
    /// pipeline run.
    pub disposal_outcomes: Vec<DisposalOutcome>,
}

impl BatchSession {
    pub fn new(session_id: impl Into<String>, config: TaxYearConfig, records: Vec<AssetRecord>) -> Self {
        Self {
            session_id: session_id.into(),
            config,
            records,
            memory: SessionMemory::new(),
            ledger: ApprovalLedger::new(),
            disposal_outcomes: Vec::new(),
        }
    }

    pub fn record(&self, unique_id: &str) -> Option<&AssetRecord> {
        self.records.iter().find(|r| r.unique_id == unique_id)
    }

    /// Human correction of category/life/method. The edit is the
    /// attestation: the record is re-approved by the editor, the corrected
    /// category enters session memory for recall on matching descriptions,
    /// and the classification is replaced wholesale at confidence 1.0.
    pub fn apply_human_category(
        &mut self,
        unique_id: &str,
        category: DepreciationCategory,
        editor: Option<&str>,
    ) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.unique_id == unique_id) else {
            return false;
        };
        record.apply_classification(ClassificationResult::new(
            category,
            1.0,
            ClassificationSource::MemoryOverride,
        ));
        self.memory.remember(&record.description, category);
        self.ledger.record_classification_edit(unique_id, editor);
        true
    }

    /// Non-classification edit (description, cost, date). Approval no
    /// longer attests to the data, so it is cleared and the record's
    /// pipeline state is reset for re-entry on the next processing pass.
    pub fn mark_data_edited(&mut self, unique_id: &str, editor: Option<&str>) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.unique_id == unique_id) else {
            return false;
        };
        reset_pipeline_state(record);
        self.ledger.record_data_edit(unique_id, editor);
        true
    }
}

/// Clear everything the pipeline computed, keeping only ingestion-time
/// issues (which describe the raw data, not the classification).
pub(crate) fn reset_pipeline_state(record: &mut AssetRecord) {
    record.transaction_type = None;
    record.category = None;
    record.confidence = 0.0;
    record.source = None;
    record.convention = None;
    record.election = Election::Pending;
    record.section179_taken = 0.0;
    record.bonus_taken = 0.0;
    record.issues.retain(|issue| {
        matches!(
            issue.kind,
            IssueKind::UnparseableDate | IssueKind::UnparseableAmount | IssueKind::MissingCost
        )
    });
}
