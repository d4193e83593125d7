use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use super::category_rules::RuleTable;
use crate::{
    entities::{
        AssetRecord, ClassificationResult, ClassificationSource, DepreciationCategory,
        DepreciationMethod, SessionMemory,
    },
    collaborators::{AiClassificationRequest, AiClassifier},
    errors::EngineError,
};

/// Minimum confidence at which the fuzzy keyword stage is a confident hit.
/// Below it the chain continues to the AI collaborator and the weak keyword
/// result is kept only as the degradation fallback.
const KEYWORD_ACCEPT_THRESHOLD: f64 = 0.75;

/// Confidence assigned when every stage misses and the AI collaborator is
/// unavailable. Low enough to always require human review.
const UNCLASSIFIED_CONFIDENCE: f64 = 0.3;

/// The synchronous stages of the pipeline, in their fixed, documented
/// precedence. The async AI fallback runs only after all of these miss.
const SYNC_CHAIN: &[SyncStage] = &[
    SyncStage::MemoryOverride,
    SyncStage::RuleMatch,
    SyncStage::ClientHint,
    SyncStage::KeywordMatch,
];

#[derive(Debug, Clone, Copy)]
enum SyncStage {
    MemoryOverride,
    RuleMatch,
    ClientHint,
    KeywordMatch,
}

/// Hybrid rule/memory/AI category classifier. Chain-of-responsibility:
/// first confident hit wins; a single record's failure never blocks the
/// rest of the batch.
pub(crate) struct CategoryClassifier<'a, AI: AiClassifier> {
    rules: &'a RuleTable,
    ai: &'a AI,
    ai_timeout: Duration,
}

impl<'a, AI: AiClassifier> CategoryClassifier<'a, AI> {
    pub(crate) fn new(rules: &'a RuleTable, ai: &'a AI, ai_timeout: Duration) -> Self {
        Self {
            rules,
            ai,
            ai_timeout,
        }
    }

    pub(crate) async fn classify(
        &self,
        record: &AssetRecord,
        memory: &SessionMemory,
    ) -> ClassificationResult {
        for stage in SYNC_CHAIN {
            if let Some(result) = self.attempt(*stage, record, memory) {
                debug!(
                    unique_id = %record.unique_id,
                    source = ?result.source,
                    confidence = result.confidence,
                    "classified without AI"
                );
                return result;
            }
        }

        // Weak keyword hit kept aside as the degradation target if the AI
        // collaborator fails.
        let weak_keyword = self.keyword_result(record, 0.0);
        match self.ai_fallback(record).await {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    unique_id = %record.unique_id,
                    error = %err,
                    "AI classification failed; degrading"
                );
                weak_keyword.unwrap_or_else(|| {
                    ClassificationResult::new(
                        DepreciationCategory::unclassified(),
                        UNCLASSIFIED_CONFIDENCE,
                        ClassificationSource::Unclassified,
                    )
                })
            }
        }
    }

    fn attempt(
        &self,
        stage: SyncStage,
        record: &AssetRecord,
        memory: &SessionMemory,
    ) -> Option<ClassificationResult> {
        match stage {
            SyncStage::MemoryOverride => memory.recall(&record.description).map(|category| {
                ClassificationResult::new(category, 1.0, ClassificationSource::MemoryOverride)
            }),
            SyncStage::RuleMatch => self.rules.best_match(&record.description).map(|outcome| {
                ClassificationResult::new(
                    outcome.category,
                    outcome.confidence,
                    ClassificationSource::RuleMatch,
                )
            }),
            SyncStage::ClientHint => record
                .client_category
                .as_deref()
                .and_then(RuleTable::class_for_hint)
                .map(|class| {
                    ClassificationResult::new(
                        DepreciationCategory::standard(class),
                        0.85,
                        ClassificationSource::ClientHint,
                    )
                }),
            SyncStage::KeywordMatch => self.keyword_result(record, KEYWORD_ACCEPT_THRESHOLD),
        }
    }

    fn keyword_result(
        &self,
        record: &AssetRecord,
        min_confidence: f64,
    ) -> Option<ClassificationResult> {
        self.rules
            .fuzzy_match(&record.description)
            .filter(|outcome| outcome.confidence >= min_confidence)
            .map(|outcome| {
                ClassificationResult::new(
                    outcome.category,
                    outcome.confidence,
                    ClassificationSource::KeywordMatch,
                )
            })
    }

    async fn ai_fallback(&self, record: &AssetRecord) -> Result<ClassificationResult, EngineError> {
        let request = AiClassificationRequest {
            description: record.description.clone(),
            cost: record.cost,
            context: record.client_category.clone(),
        };
        let timeout_ms = self.ai_timeout.as_millis() as u64;
        let response = timeout(self.ai_timeout, self.ai.classify(&request))
            .await
            .map_err(|_| EngineError::AiTimeout { timeout_ms })??;

        let mut category =
            DepreciationCategory::new(response.class, response.life_years, response.method);
        // Real property is straight-line regardless of what the model said.
        if category.is_real_property() {
            category.method = DepreciationMethod::StraightLine;
        }
        Ok(ClassificationResult::new(
            category,
            response.confidence,
            ClassificationSource::AIFallback,
        ))
    }
}
