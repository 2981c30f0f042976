//! Broadcaster implementations: a recording in-memory one for tests and
//! embedded hosts, and a discard-everything default.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use tokio::sync::RwLock;

use archipelago_core::broadcast::Broadcaster;

/// One delivered payload: the ok-shaped props plus the version tag, routed by
/// stream identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub stream: String,
    pub props: Map<String, JsonValue>,
    pub version: i64,
}

/// In-memory broadcaster that records every delivery, for testing
#[derive(Debug, Clone, Default)]
pub struct MemoryBroadcaster {
    deliveries: Arc<RwLock<Vec<Delivery>>>,
}

impl MemoryBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn deliveries(&self) -> Vec<Delivery> {
        let deliveries = self.deliveries.read().await;
        deliveries.clone()
    }

    pub async fn deliveries_for(&self, stream: &str) -> Vec<Delivery> {
        let deliveries = self.deliveries.read().await;
        deliveries.iter().filter(|delivery| delivery.stream == stream).cloned().collect()
    }

    pub async fn clear(&self) {
        let mut deliveries = self.deliveries.write().await;
        deliveries.clear();
    }
}

#[async_trait]
impl Broadcaster for MemoryBroadcaster {
    async fn broadcast(
        &self,
        stream: &str,
        props: &Map<String, JsonValue>,
        version: i64,
    ) -> anyhow::Result<()> {
        let mut deliveries = self.deliveries.write().await;
        deliveries.push(Delivery {
            stream: stream.to_string(),
            props: props.clone(),
            version,
        });
        Ok(())
    }
}

/// Broadcaster for hosts without a pub/sub transport wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBroadcaster;

#[async_trait]
impl Broadcaster for NullBroadcaster {
    async fn broadcast(
        &self,
        _stream: &str,
        _props: &Map<String, JsonValue>,
        _version: i64,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn records_deliveries_in_order() {
        let broadcaster = MemoryBroadcaster::new();
        let props = json!({"n": 1}).as_object().cloned().unwrap();

        broadcaster.broadcast("teams:1", &props, 10).await.unwrap();
        broadcaster.broadcast("teams:2", &props, 11).await.unwrap();

        let deliveries = broadcaster.deliveries().await;
        assert_eq!(deliveries.len(), 2);
        assert_eq!(deliveries[0].stream, "teams:1");
        assert_eq!(deliveries[1].version, 11);

        assert_eq!(broadcaster.deliveries_for("teams:2").await.len(), 1);
    }

    #[tokio::test]
    async fn clear_resets_the_log() {
        let broadcaster = MemoryBroadcaster::new();
        let props = Map::new();
        broadcaster.broadcast("teams:1", &props, 1).await.unwrap();
        broadcaster.clear().await;
        assert!(broadcaster.deliveries().await.is_empty());
    }
}
