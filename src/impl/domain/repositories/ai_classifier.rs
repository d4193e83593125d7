use async_trait::async_trait;
use serde_derive::{Deserialize, Serialize};

use crate::{
    entities::{AssetClass, DepreciationMethod},
    errors::EngineError,
};

/// Wire request to the external AI classification collaborator. Idempotent
/// per (description, cost), which is what makes response caching safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiClassificationRequest {
    pub description: String,
    pub cost: f64,
    /// Free-form context (e.g. client industry) forwarded verbatim.
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiClassificationResponse {
    pub class: AssetClass,
    pub life_years: f64,
    pub method: DepreciationMethod,
    pub confidence: f64,
}

/// Seam for the external AI collaborator. The engine always wraps calls in a
/// timeout and degrades on failure; implementations should just surface
/// transport errors as `EngineError::AiUnavailable`.
#[async_trait]
pub trait AiClassifier: Send + Sync {
    async fn classify(
        &self,
        request: &AiClassificationRequest,
    ) -> Result<AiClassificationResponse, EngineError>;
}
