use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info};

use crate::{
    collaborators::AiClassifier,
    data::repositories::asset_records_repository_impl::AssetRecordsRepositoryImpl,
    domain::{
        entities::batch::reset_pipeline_state,
        logic::{
            category_classifier::CategoryClassifier, category_rules::RuleTable,
            convention_resolver::ConventionResolver, disposal_resolver::DisposalResolver,
            election_allocator::ElectionAllocator, transaction_classifier::TransactionClassifier,
            validation_engine::ValidationEngine, FiscalCalendar,
        },
        repositories::asset_records_repository::AssetRecordsRepository,
    },
    entities::{BatchSession, TaxYearConfig, TransactionType, ValidationReport},
    errors::EngineError,
};

const DEFAULT_AI_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub(crate) trait ProcessUsecase: Send + Sync {
    async fn from_string(
        &self,
        assets_csv: &str,
        config: TaxYearConfig,
    ) -> Result<(BatchSession, ValidationReport), EngineError>;

    async fn from_file<P>(
        &self,
        assets_csv: P,
        config: TaxYearConfig,
    ) -> Result<(BatchSession, ValidationReport), EngineError>
    where
        P: AsRef<std::path::Path> + Send;

    /// Re-run the whole pipeline over an existing session, e.g. after a
    /// record edit re-entered records into classification.
    async fn reprocess(
        &self,
        session: &mut BatchSession,
    ) -> Result<ValidationReport, EngineError>;

    /// Tax-year reconfiguration: consumes the session and returns a freshly
    /// classified one under the new config. Classification, election, and
    /// approval state are invalidated together; on error the old session is
    /// simply dropped by the caller's `?`, never half-updated.
    async fn reconfigure(
        &self,
        session: BatchSession,
        config: TaxYearConfig,
    ) -> Result<(BatchSession, ValidationReport), EngineError>;
}

pub(crate) struct ProcessUsecaseImpl<AI, R1 = AssetRecordsRepositoryImpl>
where
    AI: AiClassifier,
    R1: AssetRecordsRepository,
{
    records_repository: R1,
    ai: AI,
    rules: RuleTable,
    ai_timeout: Duration,
}

#[async_trait]
impl<AI, R1> ProcessUsecase for ProcessUsecaseImpl<AI, R1>
where
    AI: AiClassifier,
    R1: AssetRecordsRepository,
{
    async fn from_string(
        &self,
        assets_csv: &str,
        config: TaxYearConfig,
    ) -> Result<(BatchSession, ValidationReport), EngineError> {
        let records = self.records_repository.from_string(assets_csv)?;
        let mut session = BatchSession::new(new_session_id(), config, records);
        let report = self.run_pipeline(&mut session).await?;
        Ok((session, report))
    }

    async fn from_file<P>(
        &self,
        assets_csv: P,
        config: TaxYearConfig,
    ) -> Result<(BatchSession, ValidationReport), EngineError>
    where
        P: AsRef<std::path::Path> + Send,
    {
        let records = self.records_repository.from_file(assets_csv).await?;
        let mut session = BatchSession::new(new_session_id(), config, records);
        let report = self.run_pipeline(&mut session).await?;
        Ok((session, report))
    }

    async fn reprocess(
        &self,
        session: &mut BatchSession,
    ) -> Result<ValidationReport, EngineError> {
        self.run_pipeline(session).await
    }

    async fn reconfigure(
        &self,
        session: BatchSession,
        config: TaxYearConfig,
    ) -> Result<(BatchSession, ValidationReport), EngineError> {
        let BatchSession {
            session_id,
            records,
            memory,
            ..
        } = session;
        let mut fresh = BatchSession::new(session_id, config, records);
        // Override memory survives a reconfiguration; approvals do not.
        fresh.memory = memory;
        let report = self.run_pipeline(&mut fresh).await?;
        Ok((fresh, report))
    }
}

impl<AI, R1> ProcessUsecaseImpl<AI, R1>
where
    AI: AiClassifier,
    R1: AssetRecordsRepository,
{
    /// Phase 1 classifies records independently (parallel fanout); phases
    /// 2-4 are aggregate passes over the finished snapshot. The `&mut`
    /// handoff between the two blocks is the read/compute barrier.
    async fn run_pipeline(
        &self,
        session: &mut BatchSession,
    ) -> Result<ValidationReport, EngineError> {
        let config = session.config.clone();
        let calendar = FiscalCalendar::new(&config)?;

        // Phase 1a: drop any prior pipeline output (re-runs must be
        // idempotent, not additive), then assign transaction types.
        let transaction_classifier = TransactionClassifier::new(&config, calendar);
        for record in &mut session.records {
            reset_pipeline_state(record);
            transaction_classifier.classify(record);
        }

        // Phase 1b: category classification, fanned out per record. No
        // shared mutable state: results come back by index and are applied
        // after the join.
        let category_classifier =
            CategoryClassifier::new(&self.rules, &self.ai, self.ai_timeout);
        let memory = &session.memory;
        let classifications = join_all(
            session
                .records
                .iter()
                .map(|record| category_classifier.classify(record, memory)),
        )
        .await;
        for (record, result) in session.records.iter_mut().zip(classifications) {
            record.apply_classification(result);
        }
        debug!(records = session.records.len(), "phase 1 classification complete");

        // Barrier: aggregate passes only see the fully classified batch.
        let convention =
            ConventionResolver::new(&config, calendar).resolve(&mut session.records);
        let summary = ElectionAllocator::new(&config).allocate(&mut session.records);

        // Outcomes only exist for events in the configured year; undated
        // (`NeedsDate`) records already carry their own error.
        let disposal_resolver = DisposalResolver::new(calendar);
        session.disposal_outcomes = session
            .records
            .iter_mut()
            .filter(|record| {
                matches!(
                    record.transaction_type,
                    Some(TransactionType::CurrentYearDisposal)
                        | Some(TransactionType::CurrentYearTransfer)
                )
            })
            .map(|record| {
                let outcome = disposal_resolver.resolve(record);
                record.issues.extend(outcome.warnings.iter().cloned());
                outcome
            })
            .collect();

        let report =
            ValidationEngine::new(&config, calendar).validate(&session.records, &session.ledger);

        info!(
            session_id = %session.session_id,
            ?convention,
            section179_total = summary.section179_total,
            bonus_total = summary.bonus_total,
            export_ready = report.export_ready,
            "pipeline run complete"
        );
        Ok(report)
    }
}

impl<AI: AiClassifier> ProcessUsecaseImpl<AI> {
    pub(crate) fn new(ai: AI) -> Result<Self, EngineError> {
        Ok(ProcessUsecaseImpl {
            records_repository: AssetRecordsRepositoryImpl::new(),
            ai,
            rules: RuleTable::built_in()?,
            ai_timeout: DEFAULT_AI_TIMEOUT,
        })
    }
}

fn new_session_id() -> String {
    format!("session-{}", Utc::now().timestamp_millis())
}
