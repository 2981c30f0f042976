//! Turns a component/operation pair into a concrete handler: name-shape
//! validation, override lookup, then the convention table.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use archipelago_core::config::Config;

use crate::error::ResolutionError;
use crate::handler::Handler;
use crate::registry::Registry;

static COMPONENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9_]*$").expect("component pattern is valid"));
static OPERATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("operation pattern is valid"));

pub struct Resolver {
    config: Config,
    registry: Registry,
}

impl Resolver {
    pub fn new(config: Config, registry: Registry) -> Self {
        Self { config, registry }
    }

    /// Resolve a handler. Overrides always win over convention; a miss on
    /// both is `ResolutionError`, as is a name-shape violation.
    pub async fn resolve(
        &self,
        component: &str,
        operation: &str,
    ) -> Result<Arc<dyn Handler>, ResolutionError> {
        // Emitted before the outcome is known, for tracing.
        tracing::debug!(component, operation, "resolving island action");

        if !COMPONENT_PATTERN.is_match(component) {
            return Err(ResolutionError::InvalidComponent(component.to_string()));
        }
        if !OPERATION_PATTERN.is_match(operation) {
            return Err(ResolutionError::InvalidOperation(operation.to_string()));
        }

        let key = format!("{component}#{operation}");
        if let Some(handler) = self.registry.resolve(&key).await {
            return Ok(handler);
        }

        let qualified = self.qualified_name(component, operation);
        self.registry.lookup_convention(&qualified).await.ok_or_else(|| {
            ResolutionError::UnknownAction {
                component: component.to_string(),
                operation: operation.to_string(),
            }
        })
    }

    /// Derive the conventional handler name: component split on `__` into
    /// namespace segments, each normalized to UpperCamelCase, joined with the
    /// root namespace and the camelized operation.
    /// `Admin__Users` / `create` under root `Islands` gives
    /// `Islands::Admin::Users::Create`.
    pub fn qualified_name(&self, component: &str, operation: &str) -> String {
        let mut parts = vec![self.config.root_namespace.clone()];
        parts.extend(component.split("__").map(normalize_segment));
        parts.push(normalize_segment(operation));
        parts.join("::")
    }
}

/// UpperCamelCase a segment regardless of its inbound casing, mirroring an
/// underscore-then-camelize round trip: `TeamMembers` and `team_members` both
/// normalize to `TeamMembers`.
fn normalize_segment(segment: &str) -> String {
    camelize(&underscore(segment))
}

fn underscore(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = if i == 0 { None } else { Some(chars[i - 1]) };
            let boundary = match prev {
                None | Some('_') => false,
                Some(p) if p.is_ascii_uppercase() => {
                    // Acronym run ends where a lowercase letter follows.
                    chars.get(i + 1).is_some_and(|next| next.is_ascii_lowercase())
                }
                Some(_) => true,
            };
            if boundary {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn camelize(input: &str) -> String {
    input
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
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

    fn resolver_with(registry: Registry) -> Resolver {
        Resolver::new(Config::default(), registry)
    }

    #[tokio::test]
    async fn resolves_by_convention() {
        let registry = Registry::new();
        registry
            .install(
                "Islands::TeamMembers::AddMember",
                StubHandler::new("Islands::TeamMembers::AddMember"),
            )
            .await;

        let resolved =
            resolver_with(registry).resolve("TeamMembers", "add_member").await.unwrap();
        assert_eq!(resolved.name(), "Islands::TeamMembers::AddMember");
    }

    #[tokio::test]
    async fn resolves_namespaced_component() {
        let registry = Registry::new();
        registry
            .install(
                "Islands::Admin::Users::Create",
                StubHandler::new("Islands::Admin::Users::Create"),
            )
            .await;

        let resolved = resolver_with(registry).resolve("Admin__Users", "create").await.unwrap();
        assert_eq!(resolved.name(), "Islands::Admin::Users::Create");
    }

    #[tokio::test]
    async fn override_takes_precedence_over_convention() {
        let registry = Registry::new();
        registry
            .install("Islands::TeamMembers::AddMember", StubHandler::new("convention"))
            .await;
        registry.map("TeamMembers#add_member", StubHandler::new("override")).await;

        let resolved =
            resolver_with(registry).resolve("TeamMembers", "add_member").await.unwrap();
        assert_eq!(resolved.name(), "override");
    }

    #[tokio::test]
    async fn unknown_action_fails_resolution() {
        let result = resolver_with(Registry::new()).resolve("TeamMembers", "add_member").await;
        assert!(matches!(result, Err(ResolutionError::UnknownAction { .. })));
    }

    #[tokio::test]
    async fn malformed_component_names_are_rejected() {
        let resolver = resolver_with(Registry::new());

        for component in ["teamMembers", "1Team", "Team-Members", "Team Members", ""] {
            let result = resolver.resolve(component, "add_member").await;
            assert!(
                matches!(result, Err(ResolutionError::InvalidComponent(_))),
                "expected {component:?} to be rejected"
            );
        }
    }

    #[tokio::test]
    async fn malformed_operation_names_are_rejected() {
        let resolver = resolver_with(Registry::new());

        for operation in ["AddMember", "add-member", "9lives", ""] {
            let result = resolver.resolve("TeamMembers", operation).await;
            assert!(
                matches!(result, Err(ResolutionError::InvalidOperation(_))),
                "expected {operation:?} to be rejected"
            );
        }
    }

    #[tokio::test]
    async fn custom_root_namespace_feeds_the_qualified_name() {
        let registry = Registry::new();
        registry.install("Atolls::Teams::Create", StubHandler::new("Atolls::Teams::Create")).await;

        let config = Config::default().with_root_namespace("Atolls");
        let resolver = Resolver::new(config, registry);

        assert!(resolver.resolve("Teams", "create").await.is_ok());
    }

    #[test]
    fn qualified_name_normalizes_segments() {
        let resolver = resolver_with(Registry::new());

        assert_eq!(
            resolver.qualified_name("TeamMembers", "add_member"),
            "Islands::TeamMembers::AddMember"
        );
        assert_eq!(
            resolver.qualified_name("Admin__Users", "create"),
            "Islands::Admin::Users::Create"
        );
        assert_eq!(
            resolver.qualified_name("Admin__TeamMembers", "bulk_add"),
            "Islands::Admin::TeamMembers::BulkAdd"
        );
    }

    #[test]
    fn underscore_handles_acronym_runs() {
        assert_eq!(underscore("HTMLParser"), "html_parser");
        assert_eq!(underscore("TeamMembers"), "team_members");
        assert_eq!(underscore("already_snake"), "already_snake");
    }
}
