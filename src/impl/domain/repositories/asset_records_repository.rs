use async_trait::async_trait;

use crate::{entities::AssetRecord, errors::EngineError};

/// Seam for the tabular ingestion collaborator. Implementations hand back
/// raw, unclassified records; everything downstream is the pipeline's job.
#[async_trait]
pub(crate) trait AssetRecordsRepository: Send + Sync {
    fn from_string(&self, assets_csv: &str) -> Result<Vec<AssetRecord>, EngineError>;

    async fn from_file<P>(&self, assets_csv: P) -> Result<Vec<AssetRecord>, EngineError>
    where
        P: AsRef<std::path::Path> + Send;
}
