//! Per-call lifecycle container: coercion, authorization, domain logic, and
//! response assembly. One invocation per dispatch; discarded after producing
//! its response.

use serde_json::{Map, Value as JsonValue};
use tracing::Instrument;

use archipelago_core::broadcast::{valid_stream_name, Broadcaster};
use archipelago_core::config::Config;
use archipelago_core::context::ActionContext;
use archipelago_core::params::CoercedParams;
use archipelago_core::response::{FieldErrors, Response};
use archipelago_core::security::validate_redirect;

use crate::error::{LifecycleError, LifecycleResult};
use crate::handler::{ActionFailure, AuthDecision, Handler};

/// Raw-param key carrying the optional broadcast stream identifier.
pub const STREAM_PARAM: &str = "__stream";

pub struct Invocation {
    ctx: ActionContext,
    raw_params: Map<String, JsonValue>,
    errors: FieldErrors,
    params: CoercedParams,
    props: Map<String, JsonValue>,
    redirect_location: Option<String>,
}

impl Invocation {
    pub fn new(ctx: ActionContext, raw_params: Map<String, JsonValue>) -> Self {
        Self {
            ctx,
            raw_params,
            errors: FieldErrors::new(),
            params: CoercedParams::default(),
            props: Map::new(),
            redirect_location: None,
        }
    }

    pub fn ctx(&self) -> &ActionContext {
        &self.ctx
    }

    pub fn raw_params(&self) -> &Map<String, JsonValue> {
        &self.raw_params
    }

    /// Coerced parameters, populated once the coercion step has run.
    pub fn params(&self) -> &CoercedParams {
        &self.params
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Append a domain-level field error. First-write order is preserved and
    /// a field may accumulate several messages.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
    }

    /// Replace the response props wholesale.
    pub fn props(&mut self, props: Map<String, JsonValue>) {
        self.props = props;
    }

    /// Request a redirect. Validated against the host allowlist after the
    /// domain logic finishes.
    pub fn redirect_to(&mut self, location: impl Into<String>) {
        self.redirect_location = Some(location.into());
    }

    fn merge_errors(&mut self, incoming: FieldErrors) {
        for (field, messages) in incoming {
            self.errors.entry(field).or_default().extend(messages);
        }
    }

    /// Run the full lifecycle against `handler`:
    /// coercion -> authorization -> domain logic -> response assembly.
    /// Authorization failures become the `forbidden` response here; an unsafe
    /// redirect target or an unexpected domain failure propagates instead.
    pub async fn run(
        self,
        handler: &dyn Handler,
        config: &Config,
        broadcaster: &dyn Broadcaster,
    ) -> LifecycleResult<Response> {
        let span = tracing::info_span!("island.perform", action = handler.name());
        self.run_inner(handler, config, broadcaster).instrument(span).await
    }

    async fn run_inner(
        mut self,
        handler: &dyn Handler,
        config: &Config,
        broadcaster: &dyn Broadcaster,
    ) -> LifecycleResult<Response> {
        let (coerced, coercion_errors) = handler.schema().coerce(&self.raw_params);
        self.params = coerced;
        self.merge_errors(coercion_errors);
        if !self.errors.is_empty() {
            // Domain logic never runs on invalid input.
            tracing::warn!(action = handler.name(), reason = "validation", "island action failed");
            return Ok(Response::error(self.errors));
        }

        match handler.authorize(&self) {
            AuthDecision::Authorized => {}
            AuthDecision::Denied => {
                tracing::warn!(
                    action = handler.name(),
                    reason = "forbidden",
                    "island action failed"
                );
                return Ok(Response::forbidden());
            }
            AuthDecision::NotDeclared => {
                if config.authorize_by_default {
                    tracing::warn!(
                        action = handler.name(),
                        reason = "missing_authorization",
                        "island action failed"
                    );
                    return Ok(Response::forbidden());
                }
            }
        }

        match handler.perform(&mut self).await {
            Ok(()) => {}
            Err(ActionFailure::RecordInvalid(record_errors)) => {
                self.merge_errors(record_errors);
                tracing::warn!(
                    action = handler.name(),
                    reason = "record_invalid",
                    "island action failed"
                );
                return Ok(Response::error(self.errors));
            }
            Err(ActionFailure::Fatal(err)) => return Err(LifecycleError::Internal(err)),
        }

        if !self.errors.is_empty() {
            tracing::warn!(action = handler.name(), reason = "validation", "island action failed");
            return Ok(Response::error(self.errors));
        }

        if let Some(location) = self.redirect_location.take() {
            let location = validate_redirect(&location, config)
                .map_err(|err| LifecycleError::InvalidRedirect(err.to_string()))?;
            return Ok(Response::redirect(location));
        }

        let version = config.next_version();
        let response = Response::ok(self.props.clone(), version);
        self.maybe_broadcast(broadcaster, version).await?;
        Ok(response)
    }

    /// Best-effort fan-out once the ok payload is finalized; only fires for a
    /// non-blank, well-formed `__stream` identifier.
    async fn maybe_broadcast(
        &self,
        broadcaster: &dyn Broadcaster,
        version: i64,
    ) -> LifecycleResult<()> {
        let stream = match self.raw_params.get(STREAM_PARAM) {
            Some(JsonValue::String(stream)) if !stream.is_empty() => stream,
            _ => return Ok(()),
        };
        if !valid_stream_name(stream) {
            tracing::debug!(stream = %stream, "ignoring malformed stream name");
            return Ok(());
        }

        broadcaster
            .broadcast(stream, &self.props, version)
            .await
            .map_err(|err| LifecycleError::Broadcast(err.to_string()))
    }
}
