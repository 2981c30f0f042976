//! The four canonical payload shapes every dispatch ultimately produces.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Field name to ordered list of messages, first-write order preserved.
pub type FieldErrors = IndexMap<String, Vec<String>>;

/// The sole output contract of the action lifecycle. Serializes to the wire
/// shapes the controller collaborator forwards verbatim:
/// `{"status":"ok","props":{…},"version":N}`, `{"status":"redirect","location":"…"}`,
/// `{"status":"error","errors":{field:[…]}}`, `{"status":"forbidden"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    Ok { props: Map<String, JsonValue>, version: i64 },
    Redirect { location: String },
    Error { errors: FieldErrors },
    Forbidden,
}

impl Response {
    pub fn ok(props: Map<String, JsonValue>, version: i64) -> Self {
        Self::Ok { props, version }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect { location: location.into() }
    }

    pub fn error(errors: FieldErrors) -> Self {
        Self::Error { errors }
    }

    pub fn forbidden() -> Self {
        Self::Forbidden
    }

    /// The wire-visible status tag.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Ok { .. } => "ok",
            Self::Redirect { .. } => "redirect",
            Self::Error { .. } => "error",
            Self::Forbidden => "forbidden",
        }
    }
}
