//! The opaque request bundle handed in by the hosting layer.

use serde_json::{Map, Value as JsonValue};

/// Transport metadata the origin validator needs: the scheme/host/port the
/// request was served on, plus the Origin header when the transport carried one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub origin: Option<String>,
}

impl RequestMeta {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self { scheme: scheme.into(), host: host.into(), port, origin: None }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// Resolved principal for the request, as supplied by the host's authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub id: String,
    pub attributes: Map<String, JsonValue>,
}

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), attributes: Map::new() }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// Per-request context built by the hosting layer and passed through the
/// lifecycle untouched. The core reads it (authorization predicates usually
/// inspect `user`) and never mutates it.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub request: RequestMeta,
    pub session: Map<String, JsonValue>,
    pub user: Option<Principal>,
}

impl ActionContext {
    pub fn new(request: RequestMeta) -> Self {
        Self { request, session: Map::new(), user: None }
    }

    pub fn with_session(mut self, session: Map<String, JsonValue>) -> Self {
        self.session = session;
        self
    }

    pub fn with_user(mut self, user: Principal) -> Self {
        self.user = Some(user);
        self
    }
}
