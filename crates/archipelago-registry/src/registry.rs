//! Handler tables: explicit overrides plus the startup-installed convention
//! table that replaces runtime constant lookup.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::handler::Handler;

/// Process-wide handler mapping. Cheap to clone and share; writes happen at
/// startup wiring (or explicit test resets), reads happen per request and
/// never observe a partially-written entry.
///
/// Two tables live here:
/// - overrides, keyed `"Component#operation"`, consulted first by the
///   resolver;
/// - the convention table, keyed by fully-qualified handler name
///   (e.g. `Islands::Admin::Users::Create`), populated when the application
///   installs its handlers at boot.
#[derive(Clone, Default)]
pub struct Registry {
    overrides: Arc<RwLock<HashMap<String, Arc<dyn Handler>>>>,
    conventions: Arc<RwLock<HashMap<String, Arc<dyn Handler>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an explicit `"Component#operation"` override.
    pub async fn map(&self, key: impl Into<String>, handler: Arc<dyn Handler>) {
        let mut overrides = self.overrides.write().await;
        overrides.insert(key.into(), handler);
    }

    /// Pure override lookup by exact key.
    pub async fn resolve(&self, key: &str) -> Option<Arc<dyn Handler>> {
        let overrides = self.overrides.read().await;
        overrides.get(key).cloned()
    }

    /// Install a handler under its fully-qualified convention name.
    pub async fn install(&self, qualified_name: impl Into<String>, handler: Arc<dyn Handler>) {
        let mut conventions = self.conventions.write().await;
        conventions.insert(qualified_name.into(), handler);
    }

    pub async fn lookup_convention(&self, qualified_name: &str) -> Option<Arc<dyn Handler>> {
        let conventions = self.conventions.read().await;
        conventions.get(qualified_name).cloned()
    }

    /// Snapshot of the override table for introspection. No ordering
    /// guarantee; callers sort if they need an order.
    pub async fn entries(&self) -> Vec<(String, Arc<dyn Handler>)> {
        let overrides = self.overrides.read().await;
        overrides.iter().map(|(key, handler)| (key.clone(), handler.clone())).collect()
    }

    /// Snapshot of the convention table for introspection.
    pub async fn conventions(&self) -> Vec<(String, Arc<dyn Handler>)> {
        let conventions = self.conventions.read().await;
        conventions.iter().map(|(key, handler)| (key.clone(), handler.clone())).collect()
    }

    /// Empty the override table. Installed convention handlers represent
    /// code, not wiring, and are left in place; rebuild the registry for a
    /// full reset.
    pub async fn clear(&self) {
        let mut overrides = self.overrides.write().await;
        overrides.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use archipelago_core::params::ParamSchema;

    use crate::handler::ActionFailure;
    use crate::invocation::Invocation;

    struct StubHandler {
        name: &'static str,
        schema: ParamSchema,
    }

    impl StubHandler {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self { name, schema: ParamSchema::new() })
        }
    }

    #[async_trait]
    impl Handler for StubHandler {
        fn name(&self) -> &str {
            self.name
        }

        fn schema(&self) -> &ParamSchema {
            &self.schema
        }

        async fn perform(&self, _invocation: &mut Invocation) -> Result<(), ActionFailure> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn map_inserts_and_overwrites() {
        let registry = Registry::new();
        registry.map("TeamMembers#add_member", StubHandler::new("first")).await;
        registry.map("TeamMembers#add_member", StubHandler::new("second")).await;

        let resolved = registry.resolve("TeamMembers#add_member").await.unwrap();
        assert_eq!(resolved.name(), "second");
    }

    #[tokio::test]
    async fn resolve_misses_return_none_without_mutating() {
        let registry = Registry::new();
        assert!(registry.resolve("Nope#missing").await.is_none());
        assert!(registry.entries().await.is_empty());
    }

    #[tokio::test]
    async fn clear_empties_overrides_but_keeps_conventions() {
        let registry = Registry::new();
        registry.map("TeamMembers#add_member", StubHandler::new("override")).await;
        registry
            .install("Islands::TeamMembers::AddMember", StubHandler::new("convention"))
            .await;

        registry.clear().await;

        assert!(registry.resolve("TeamMembers#add_member").await.is_none());
        assert!(registry.lookup_convention("Islands::TeamMembers::AddMember").await.is_some());
    }

    #[tokio::test]
    async fn snapshots_expose_both_tables() {
        let registry = Registry::new();
        registry.map("A#run", StubHandler::new("a")).await;
        registry.install("Islands::B::Run", StubHandler::new("b")).await;

        assert_eq!(registry.entries().await.len(), 1);
        assert_eq!(registry.conventions().await.len(), 1);
    }
}
