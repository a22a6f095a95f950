use super::ExportArtifact;
use crate::error::ExportError;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Immutable blob storage for export artifacts.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores a new object. Fails if `key` already exists.
    async fn put(
        &self,
        key: &str,
        payload: Vec<u8>,
        content_type: &str,
        metadata: Map<String, Value>,
    ) -> Result<ExportArtifact, ExportError>;

    async fn get(&self, key: &str) -> Result<(ExportArtifact, Vec<u8>), ExportError>;

    /// Returns whether the object existed.
    async fn delete(&self, key: &str) -> Result<bool, ExportError>;

    /// Artifacts whose key starts with `prefix`, ordered by key. An empty
    /// prefix lists everything.
    async fn list(&self, prefix: &str) -> Result<Vec<ExportArtifact>, ExportError>;
}

#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, (ExportArtifact, Vec<u8>)>>,
}

impl MemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        payload: Vec<u8>,
        content_type: &str,
        metadata: Map<String, Value>,
    ) -> Result<ExportArtifact, ExportError> {
        let mut objects = self.objects.write().await;
        if objects.contains_key(key) {
            return Err(ExportError::ObjectExists(key.to_string()));
        }
        let artifact = ExportArtifact {
            id: key.to_string(),
            format: None,
            content_type: content_type.to_string(),
            size_bytes: payload.len() as u64,
            url: format!("memory://objects/{key}"),
            metadata,
            created_at: Utc::now(),
        };
        objects.insert(key.to_string(), (artifact.clone(), payload));
        Ok(artifact)
    }

    async fn get(&self, key: &str) -> Result<(ExportArtifact, Vec<u8>), ExportError> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| ExportError::ObjectNotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<bool, ExportError> {
        Ok(self.objects.write().await.remove(key).is_some())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ExportArtifact>, ExportError> {
        Ok(self
            .objects
            .read()
            .await
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(_, (artifact, _))| artifact.clone())
            .collect())
    }
}
