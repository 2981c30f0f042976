//! Conveniences for host-application test suites exercising island actions.

use serde_json::{Map, Value as JsonValue};

use archipelago_core::config::Config;
use archipelago_core::context::{ActionContext, RequestMeta};
use archipelago_core::response::Response;
use archipelago_registry::{Handler, Invocation};

use crate::broadcast::NullBroadcaster;
use crate::error::DispatchResult;

/// A localhost request context with no session or principal.
pub fn test_context() -> ActionContext {
    ActionContext::new(RequestMeta::new("http", "localhost", 3000))
}

/// A permissive configuration for handler-level tests: authorization is not
/// deny-by-default and the version tag is a constant.
pub fn test_config() -> Config {
    Config::default().with_authorize_by_default(false).with_version_source(|| 1)
}

/// Run a single handler through the full lifecycle with test defaults,
/// skipping resolution and origin checking. Handy for asserting on one
/// action's coercion, authorization, and response shape.
pub async fn perform_island(
    handler: &dyn Handler,
    raw_params: Map<String, JsonValue>,
) -> DispatchResult<Response> {
    perform_island_with(handler, raw_params, test_context(), test_config()).await
}

/// Like [`perform_island`] but with an explicit context and configuration.
pub async fn perform_island_with(
    handler: &dyn Handler,
    raw_params: Map<String, JsonValue>,
    ctx: ActionContext,
    config: Config,
) -> DispatchResult<Response> {
    let invocation = Invocation::new(ctx, raw_params);
    let response = invocation.run(handler, &config, &NullBroadcaster).await?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use archipelago_core::params::{ParamDefinition, ParamSchema, ParamType};
    use archipelago_registry::handler::{ActionFailure, AuthDecision};

    struct Echo {
        schema: ParamSchema,
    }

    #[async_trait]
    impl Handler for Echo {
        fn name(&self) -> &str {
            "Islands::Echo::Say"
        }

        fn schema(&self) -> &ParamSchema {
            &self.schema
        }

        fn authorize(&self, _invocation: &Invocation) -> AuthDecision {
            AuthDecision::Authorized
        }

        async fn perform(&self, invocation: &mut Invocation) -> Result<(), ActionFailure> {
            let text = invocation.params().string("text").unwrap_or_default().to_string();
            let mut props = Map::new();
            props.insert("text".to_string(), json!(text));
            invocation.props(props);
            Ok(())
        }
    }

    #[tokio::test]
    async fn perform_island_runs_the_lifecycle_with_test_defaults() {
        let handler = Echo {
            schema: ParamSchema::new()
                .param(ParamDefinition::new("text", ParamType::String).strip()),
        };
        let raw = json!({"text": " hello "}).as_object().cloned().unwrap();

        let response = perform_island(&handler, raw).await.unwrap();

        match response {
            Response::Ok { props, version } => {
                assert_eq!(props.get("text"), Some(&json!("hello")));
                assert_eq!(version, 1);
            }
            other => panic!("expected ok, got {other:?}"),
        }
    }
}
