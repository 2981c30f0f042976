//! The inbound dispatch surface: origin gate, resolution, lifecycle.

use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use archipelago_core::broadcast::Broadcaster;
use archipelago_core::config::Config;
use archipelago_core::context::ActionContext;
use archipelago_core::response::Response;
use archipelago_core::security::validate_origin;
use archipelago_registry::{Invocation, Registry, Resolver};

use crate::error::{DispatchError, DispatchResult};

/// Turns an untrusted `(component, operation, raw_params)` triple into an
/// executed action result. Construct one per process with the wired
/// configuration, registry, and broadcast collaborator; dispatching is
/// side-effect-free on the dispatcher itself and safe to share.
#[derive(Clone)]
pub struct Dispatcher {
    config: Config,
    resolver: Arc<Resolver>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl Dispatcher {
    pub fn new(config: Config, registry: Registry, broadcaster: Arc<dyn Broadcaster>) -> Self {
        let resolver = Arc::new(Resolver::new(config.clone(), registry));
        Self { config, resolver, broadcaster }
    }

    /// Run one invocation end to end. Authorization failures come back as
    /// the `forbidden` response; resolution, origin, redirect, and unexpected
    /// failures surface as [`DispatchError`] for the host to map.
    pub async fn dispatch(
        &self,
        component: &str,
        operation: &str,
        raw_params: Map<String, JsonValue>,
        ctx: ActionContext,
    ) -> DispatchResult<Response> {
        tracing::debug!(component, operation, "dispatching island action");

        validate_origin(&ctx.request, &self.config)
            .map_err(|err| DispatchError::InvalidOrigin(err.to_string()))?;

        let handler = self.resolver.resolve(component, operation).await?;

        let invocation = Invocation::new(ctx, raw_params);
        let response = invocation
            .run(handler.as_ref(), &self.config, self.broadcaster.as_ref())
            .await?;
        Ok(response)
    }
}
