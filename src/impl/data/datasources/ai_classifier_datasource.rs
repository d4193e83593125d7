use std::collections::HashMap;

use async_trait::async_trait;
use serde_derive::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    collaborators::{AiClassificationRequest, AiClassificationResponse, AiClassifier},
    entities::SessionMemory,
    errors::EngineError,
};

/// Stand-in when no AI collaborator is configured: every call fails and the
/// classification chain degrades to its keyword/unclassified fallback.
pub struct UnavailableAiClassifier;

#[async_trait]
impl AiClassifier for UnavailableAiClassifier {
    async fn classify(
        &self,
        _request: &AiClassificationRequest,
    ) -> Result<AiClassificationResponse, EngineError> {
        Err(EngineError::AiUnavailable {
            reason: "no AI collaborator configured".into(),
        })
    }
}

#[derive(Serialize)]
struct CacheKey<'a> {
    description: &'a str,
    cents: i64,
}

/// Response cache around a real collaborator. The collaborator is idempotent
/// per (description, cost), so re-imports of the same sheet never pay the
/// call twice. Keyed on the normalized description and cost in cents.
pub struct CachingAiClassifier<AI> {
    inner: AI,
    cache: Mutex<HashMap<String, AiClassificationResponse>>,
}

impl<AI: AiClassifier> CachingAiClassifier<AI> {
    pub fn new(inner: AI) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn key(request: &AiClassificationRequest) -> String {
        let normalized = SessionMemory::normalize(&request.description);
        let key = CacheKey {
            description: &normalized,
            cents: (request.cost * 100.0).round() as i64,
        };
        serde_json::to_string(&key).unwrap_or(normalized)
    }
}

#[async_trait]
impl<AI: AiClassifier> AiClassifier for CachingAiClassifier<AI> {
    async fn classify(
        &self,
        request: &AiClassificationRequest,
    ) -> Result<AiClassificationResponse, EngineError> {
        let key = Self::key(request);
        if let Some(cached) = self.cache.lock().await.get(&key) {
            debug!(description = %request.description, "AI cache hit");
            return Ok(cached.clone());
        }
        let response = self.inner.classify(request).await?;
        self.cache.lock().await.insert(key, response.clone());
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::entities::{AssetClass, DepreciationMethod};

    struct CountingAi {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AiClassifier for CountingAi {
        async fn classify(
            &self,
            _request: &AiClassificationRequest,
        ) -> Result<AiClassificationResponse, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AiClassificationResponse {
                class: AssetClass::MachineryEquipment,
                life_years: 7.0,
                method: DepreciationMethod::DecliningBalance200,
                confidence: 0.88,
            })
        }
    }

    #[tokio::test]
    async fn identical_requests_hit_the_cache() {
        let ai = CachingAiClassifier::new(CountingAi {
            calls: AtomicUsize::new(0),
        });
        let request = AiClassificationRequest {
            description: "ZG-9 Frobnicator".into(),
            cost: 1234.56,
            context: None,
        };
        ai.classify(&request).await.unwrap();
        // Same asset, different surface formatting.
        let again = AiClassificationRequest {
            description: "zg-9 frobnicator".into(),
            cost: 1234.56,
            context: None,
        };
        ai.classify(&again).await.unwrap();
        assert_eq!(ai.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unavailable_classifier_always_errors() {
        let request = AiClassificationRequest {
            description: "anything".into(),
            cost: 1.0,
            context: None,
        };
        assert!(matches!(
            UnavailableAiClassifier.classify(&request).await,
            Err(EngineError::AiUnavailable { .. })
        ));
    }
}
