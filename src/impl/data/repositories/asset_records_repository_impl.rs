use async_trait::async_trait;

use crate::{
    data::datasources::assets_csv_datasource::{AssetsCsvDatasource, AssetsCsvDatasourceImpl},
    domain::repositories::asset_records_repository::AssetRecordsRepository,
    entities::AssetRecord,
    errors::EngineError,
};

pub(crate) struct AssetRecordsRepositoryImpl<DS = AssetsCsvDatasourceImpl>
where
    DS: AssetsCsvDatasource,
{
    datasource: DS,
}

#[async_trait]
impl<DS> AssetRecordsRepository for AssetRecordsRepositoryImpl<DS>
where
    DS: AssetsCsvDatasource + Send + Sync,
{
    fn from_string(&self, assets_csv: &str) -> Result<Vec<AssetRecord>, EngineError> {
        self.datasource.from_string(assets_csv)
    }

    async fn from_file<P>(&self, assets_csv: P) -> Result<Vec<AssetRecord>, EngineError>
    where
        P: AsRef<std::path::Path> + Send,
    {
        let contents = tokio::fs::read_to_string(assets_csv).await?;
        self.datasource.from_string(&contents)
    }
}

impl AssetRecordsRepositoryImpl {
    pub(crate) fn new() -> Self {
        Self {
            datasource: AssetsCsvDatasourceImpl::new(),
        }
    }
}
