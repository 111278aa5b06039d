//! Consumer-side cache of user events

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use crate::domain::EventHandler;
use crate::shared::InfraError;

/// Stores the last payload seen for each user under `user:{id}`
#[derive(Default)]
pub struct UserEventCache {
    entries: DashMap<String, Value>,
}

impl UserEventCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_for(id: &str) -> String {
        format!("user:{}", id)
    }

    pub fn get(&self, id: &str) -> Option<Value> {
        self.entries.get(&Self::key_for(id)).map(|v| v.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl EventHandler for UserEventCache {
    async fn handle(&self, payload: &[u8]) -> Result<(), InfraError> {
        let event: Value = serde_json::from_slice(payload)?;

        let id = event
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| InfraError::InvalidPayload("missing string field 'id'".into()))?
            .to_string();

        let key = Self::key_for(&id);
        debug!(key = %key, "Caching user event");
        self.entries.insert(key, event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn stores_payload_under_user_key() {
        let cache = UserEventCache::new();
        let payload = json!({"id": "user-1", "name": "John Doe"});

        cache
            .handle(&serde_json::to_vec(&payload).unwrap())
            .await
            .unwrap();

        assert_eq!(cache.get("user-1"), Some(payload));
        assert_eq!(UserEventCache::key_for("user-1"), "user:user-1");
    }

    #[tokio::test]
    async fn later_event_replaces_earlier_one() {
        let cache = UserEventCache::new();
        cache.handle(br#"{"id":"user-1","name":"Old"}"#).await.unwrap();
        cache.handle(br#"{"id":"user-1","name":"New"}"#).await.unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("user-1").unwrap()["name"], "New");
    }

    #[tokio::test]
    async fn rejects_payload_without_string_id() {
        let cache = UserEventCache::new();

        assert!(matches!(
            cache.handle(br#"{"id": 42}"#).await.unwrap_err(),
            InfraError::InvalidPayload(_)
        ));
        assert!(matches!(
            cache.handle(b"not json").await.unwrap_err(),
            InfraError::Serialization(_)
        ));
        assert!(cache.is_empty());
    }
}
