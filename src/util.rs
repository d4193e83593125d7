use crate::{
    collaborators::AiClassifier,
    domain::usecases::process_usecase::{ProcessUsecase as _, ProcessUsecaseImpl},
    entities::{BatchSession, TaxYearConfig, ValidationReport},
    errors::EngineError,
    presentation::issue_report::IssueReportPrinter,
};

/// Rendered, human-readable issue report.
pub type IssueReport = String;

/// Facade over the whole engine: ingest a column-resolved asset sheet, run
/// the classification/election/validation pipeline, and hand back the
/// session together with the validation verdict and its printed report.
pub struct FixedAssetTaxUtil<AI: AiClassifier> {
    process_usecase: ProcessUsecaseImpl<AI>,
    printer: IssueReportPrinter,
}

impl<AI: AiClassifier> FixedAssetTaxUtil<AI> {
    pub fn new(ai: AI) -> Result<Self, EngineError> {
        Ok(Self {
            process_usecase: ProcessUsecaseImpl::new(ai)?,
            printer: IssueReportPrinter::new(),
        })
    }

    pub async fn from_string(
        &self,
        assets_csv: &str,
        config: TaxYearConfig,
    ) -> Result<(BatchSession, ValidationReport, IssueReport), EngineError> {
        let (session, report) = self.process_usecase.from_string(assets_csv, config).await?;
        let printed = self.printer.print(&report, session.records.len());
        Ok((session, report, printed))
    }

    pub async fn from_file<P>(
        &self,
        assets_csv: P,
        config: TaxYearConfig,
    ) -> Result<(BatchSession, ValidationReport, IssueReport), EngineError>
    where
        P: AsRef<std::path::Path> + Send,
    {
        let (session, report) = self.process_usecase.from_file(assets_csv, config).await?;
        let printed = self.printer.print(&report, session.records.len());
        Ok((session, report, printed))
    }

    /// Re-run the pipeline over an edited session.
    pub async fn reprocess(
        &self,
        session: &mut BatchSession,
    ) -> Result<(ValidationReport, IssueReport), EngineError> {
        let report = self.process_usecase.reprocess(session).await?;
        let printed = self.printer.print(&report, session.records.len());
        Ok((report, printed))
    }

    /// Swap the session to a new tax-year configuration. Consumes the old
    /// session: classification, elections, and approvals are rebuilt from
    /// scratch so no reader ever sees a partially reclassified batch.
    pub async fn reconfigure(
        &self,
        session: BatchSession,
        config: TaxYearConfig,
    ) -> Result<(BatchSession, ValidationReport, IssueReport), EngineError> {
        let (session, report) = self.process_usecase.reconfigure(session, config).await?;
        let printed = self.printer.print(&report, session.records.len());
        Ok((session, report, printed))
    }
}
