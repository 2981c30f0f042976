//! The two request-gating validators: strict-origin checking and redirect
//! target allowlisting.

use url::Url;

use crate::config::Config;
use crate::context::RequestMeta;
use crate::error::{CoreError, CoreResult};

/// Gate a request by the configured strict-origin policy. A missing or empty
/// Origin header passes: absence is not itself suspicious (non-browser client
/// or same-document navigation). A present header must parse and exactly
/// match the request's scheme, host, and port.
pub fn validate_origin(request: &RequestMeta, config: &Config) -> CoreResult<()> {
    if !config.strict_origin_check {
        return Ok(());
    }

    let origin = match request.origin.as_deref() {
        None | Some("") => return Ok(()),
        Some(origin) => origin,
    };

    let parsed = Url::parse(origin)
        .map_err(|_| CoreError::InvalidOrigin("invalid origin URI".to_string()))?;

    let matches = parsed.scheme() == request.scheme
        && parsed.host_str() == Some(request.host.as_str())
        && parsed.port_or_known_default() == Some(request.port);

    if matches {
        Ok(())
    } else {
        Err(CoreError::InvalidOrigin("origin mismatch".to_string()))
    }
}

/// Gate a redirect target. A path starting with a single `/` is accepted
/// unmodified; `//` is protocol-relative and treated as absolute. Anything
/// else must parse as an http(s) URL whose host is in the allowlist.
pub fn validate_redirect(location: &str, config: &Config) -> CoreResult<String> {
    if location.starts_with('/') && !location.starts_with("//") {
        return Ok(location.to_string());
    }

    let parsed = Url::parse(location)
        .map_err(|_| CoreError::InvalidRedirect("invalid redirect URI".to_string()))?;

    let http = matches!(parsed.scheme(), "http" | "https");
    let allowed = parsed
        .host_str()
        .map(|host| config.allowed_redirect_hosts.contains(host))
        .unwrap_or(false);

    if http && allowed {
        Ok(location.to_string())
    } else {
        Err(CoreError::InvalidRedirect("unsafe redirect host".to_string()))
    }
}
