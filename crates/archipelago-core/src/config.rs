//! Process-wide settings, explicitly constructed and passed down by the host.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;

/// Produces the freshness tag stamped on `ok` responses and broadcasts.
/// Must be safe to call from concurrent requests; strict monotonicity is not
/// required.
pub type VersionSource = Arc<dyn Fn() -> i64 + Send + Sync>;

#[derive(Clone)]
pub struct Config {
    /// Root namespace for convention-based resolution, e.g. `Islands`.
    pub root_namespace: String,
    /// When true, a handler with no declared authorization predicate is denied.
    pub authorize_by_default: bool,
    /// When true, requests carrying an Origin header must match scheme/host/port.
    pub strict_origin_check: bool,
    /// Hosts an absolute redirect target may point at.
    pub allowed_redirect_hosts: HashSet<String>,
    pub version_source: VersionSource,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_namespace: "Islands".to_string(),
            authorize_by_default: true,
            strict_origin_check: false,
            allowed_redirect_hosts: HashSet::new(),
            version_source: Arc::new(|| Utc::now().timestamp_millis()),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_version(&self) -> i64 {
        (self.version_source)()
    }

    pub fn with_root_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.root_namespace = namespace.into();
        self
    }

    pub fn with_authorize_by_default(mut self, value: bool) -> Self {
        self.authorize_by_default = value;
        self
    }

    pub fn with_strict_origin_check(mut self, value: bool) -> Self {
        self.strict_origin_check = value;
        self
    }

    pub fn allow_redirect_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_redirect_hosts.insert(host.into());
        self
    }

    pub fn with_version_source<F>(mut self, source: F) -> Self
    where
        F: Fn() -> i64 + Send + Sync + 'static,
    {
        self.version_source = Arc::new(source);
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("root_namespace", &self.root_namespace)
            .field("authorize_by_default", &self.authorize_by_default)
            .field("strict_origin_check", &self.strict_origin_check)
            .field("allowed_redirect_hosts", &self.allowed_redirect_hosts)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[test]
    fn defaults_match_the_documented_policy() {
        let config = Config::default();
        assert_eq!(config.root_namespace, "Islands");
        assert!(config.authorize_by_default);
        assert!(!config.strict_origin_check);
        assert!(config.allowed_redirect_hosts.is_empty());
    }

    #[test]
    fn default_version_source_reads_wall_clock_millis() {
        let config = Config::default();
        let before = Utc::now().timestamp_millis();
        let version = config.next_version();
        let after = Utc::now().timestamp_millis();
        assert!(version >= before && version <= after);
    }

    #[test]
    fn custom_version_source_is_used() {
        let counter = Arc::new(AtomicI64::new(7));
        let source = counter.clone();
        let config =
            Config::default().with_version_source(move || source.fetch_add(1, Ordering::SeqCst));
        assert_eq!(config.next_version(), 7);
        assert_eq!(config.next_version(), 8);
    }
}
