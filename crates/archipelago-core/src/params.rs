//! Declarative per-handler parameter schemas and raw-input coercion.
//!
//! Coercion never errs for validation-shaped problems: malformed input turns
//! into field errors, and the unsupported-type-tag case is unrepresentable
//! because [`ParamType`] is a closed enum.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};

use crate::response::FieldErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    String,
    Integer,
    Boolean,
    Float,
    Date,
    DateTime,
    Array,
    Json,
}

/// Default for an absent or blank field: none, a literal, or a zero-argument
/// producer invoked at coercion time.
#[derive(Clone, Default)]
pub enum ParamDefault {
    #[default]
    None,
    Value(JsonValue),
    Producer(Arc<dyn Fn() -> JsonValue + Send + Sync>),
}

impl ParamDefault {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Materialize the default, invoking the producer form.
    pub fn produce(&self) -> Option<JsonValue> {
        match self {
            Self::None => None,
            Self::Value(value) => Some(value.clone()),
            Self::Producer(producer) => Some(producer()),
        }
    }
}

impl fmt::Debug for ParamDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Producer(_) => write!(f, "Producer(..)"),
        }
    }
}

/// Immutable descriptor for one declared field. Built with the chainable
/// constructors and handed to [`ParamSchema::param`].
#[derive(Debug, Clone)]
pub struct ParamDefinition {
    pub name: String,
    pub ty: ParamType,
    pub required: bool,
    pub default: ParamDefault,
    pub strip: bool,
    pub downcase: bool,
    pub upcase: bool,
}

impl ParamDefinition {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            default: ParamDefault::None,
            strip: false,
            downcase: false,
            upcase: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<JsonValue>) -> Self {
        self.default = ParamDefault::Value(value.into());
        self
    }

    pub fn default_producer<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> JsonValue + Send + Sync + 'static,
    {
        self.default = ParamDefault::Producer(Arc::new(producer));
        self
    }

    pub fn strip(mut self) -> Self {
        self.strip = true;
        self
    }

    pub fn downcase(mut self) -> Self {
        self.downcase = true;
        self
    }

    pub fn upcase(mut self) -> Self {
        self.upcase = true;
        self
    }
}

/// Ordered field-name to definition mapping, owned by a handler type and
/// shared read-only across its invocations.
#[derive(Debug, Clone, Default)]
pub struct ParamSchema {
    definitions: IndexMap<String, ParamDefinition>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field declaration. Re-declaring a name overwrites the earlier
    /// definition, as the last declaration wins.
    pub fn param(mut self, definition: ParamDefinition) -> Self {
        if definition.required && !definition.default.is_none() {
            // Default always wins over required, so the required flag is dead
            // configuration here.
            tracing::debug!(
                field = %definition.name,
                "param declared both required and defaulted; the default makes required unreachable"
            );
        }
        self.definitions.insert(definition.name.clone(), definition);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamDefinition> {
        self.definitions.get(name)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ParamDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Coerce raw untyped input against this schema. Each field is handled
    /// independently: blank input falls back to the default, then to an
    /// `is required` error; present input is cast to the declared type, with
    /// cast failures recorded as `is invalid`. Pure given its inputs.
    pub fn coerce(&self, raw: &Map<String, JsonValue>) -> (CoercedParams, FieldErrors) {
        let mut coerced = CoercedParams::default();
        let mut errors = FieldErrors::new();

        for definition in self.definitions.values() {
            let raw_value = raw.get(&definition.name);

            if is_blank(raw_value) {
                if let Some(default) = definition.default.produce() {
                    coerced.insert(definition.name.clone(), ParamValue::from_json(&default));
                } else if definition.required {
                    errors
                        .entry(definition.name.clone())
                        .or_default()
                        .push("is required".to_string());
                }
                continue;
            }

            // is_blank returned false, so the value is present
            let raw_value = match raw_value {
                Some(value) => value,
                None => continue,
            };

            match cast(raw_value, definition.ty) {
                Ok(value) => {
                    coerced.insert(definition.name.clone(), apply_transforms(value, definition));
                }
                Err(CastError) => {
                    errors
                        .entry(definition.name.clone())
                        .or_default()
                        .push("is invalid".to_string());
                }
            }
        }

        (coerced, errors)
    }
}

/// A coerced value carrying its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Array(Vec<JsonValue>),
    Json(JsonValue),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            Self::Array(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Serialize back to JSON. Dates render as ISO 8601 text, so feeding the
    /// result through the same schema coerces to the identical value.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Str(value) => JsonValue::String(value.clone()),
            Self::Int(value) => JsonValue::from(*value),
            Self::Float(value) => JsonValue::from(*value),
            Self::Bool(value) => JsonValue::Bool(*value),
            Self::Date(value) => JsonValue::String(value.format("%Y-%m-%d").to_string()),
            Self::DateTime(value) => JsonValue::String(value.to_rfc3339()),
            Self::Array(value) => JsonValue::Array(value.clone()),
            Self::Json(value) => value.clone(),
        }
    }

    /// Lossless mapping from a literal JSON value, used for defaults, which
    /// are taken as declared rather than run through the cast.
    fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::String(s) => Self::Str(s.clone()),
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(0.0)),
            },
            JsonValue::Array(items) => Self::Array(items.clone()),
            other => Self::Json(other.clone()),
        }
    }
}

/// Typed map of coerced parameters with schema-checked accessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoercedParams {
    values: IndexMap<String, ParamValue>,
}

impl CoercedParams {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_int)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParamValue::as_float)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ParamValue::as_bool)
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.get(name).and_then(ParamValue::as_date)
    }

    pub fn datetime(&self, name: &str) -> Option<DateTime<Utc>> {
        self.get(name).and_then(ParamValue::as_datetime)
    }

    pub fn array(&self, name: &str) -> Option<&[JsonValue]> {
        self.get(name).and_then(ParamValue::as_array)
    }

    pub fn json(&self, name: &str) -> Option<&JsonValue> {
        self.get(name).and_then(ParamValue::as_json)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Re-serialize to a raw-params map, e.g. to feed broadcasts or re-coerce.
    pub fn to_json_map(&self) -> Map<String, JsonValue> {
        self.values.iter().map(|(name, value)| (name.clone(), value.to_json())).collect()
    }

    fn insert(&mut self, name: String, value: ParamValue) {
        self.values.insert(name, value);
    }
}

struct CastError;

/// Absent, null, empty string, and empty sequences all count as blank.
fn is_blank(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => true,
        Some(JsonValue::String(s)) => s.is_empty(),
        Some(JsonValue::Array(items)) => items.is_empty(),
        Some(JsonValue::Object(entries)) => entries.is_empty(),
        Some(_) => false,
    }
}

fn cast(raw: &JsonValue, ty: ParamType) -> Result<ParamValue, CastError> {
    match ty {
        ParamType::String => cast_string(raw),
        ParamType::Integer => cast_integer(raw),
        ParamType::Boolean => cast_boolean(raw),
        ParamType::Float => cast_float(raw),
        ParamType::Date => cast_date(raw),
        ParamType::DateTime => cast_datetime(raw),
        ParamType::Array => cast_array(raw),
        ParamType::Json => cast_json(raw),
    }
}

fn cast_string(raw: &JsonValue) -> Result<ParamValue, CastError> {
    match raw {
        JsonValue::String(s) => Ok(ParamValue::Str(s.clone())),
        JsonValue::Number(n) => Ok(ParamValue::Str(n.to_string())),
        JsonValue::Bool(b) => Ok(ParamValue::Str(b.to_string())),
        _ => Err(CastError),
    }
}

fn cast_integer(raw: &JsonValue) -> Result<ParamValue, CastError> {
    match raw {
        JsonValue::Number(n) => n.as_i64().map(ParamValue::Int).ok_or(CastError),
        JsonValue::String(s) => s.trim().parse::<i64>().map(ParamValue::Int).map_err(|_| CastError),
        _ => Err(CastError),
    }
}

fn cast_float(raw: &JsonValue) -> Result<ParamValue, CastError> {
    match raw {
        JsonValue::Number(n) => n.as_f64().map(ParamValue::Float).ok_or(CastError),
        JsonValue::String(s) => match s.trim().parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => Ok(ParamValue::Float(parsed)),
            _ => Err(CastError),
        },
        _ => Err(CastError),
    }
}

/// Only the enumerated literal forms coerce; everything else is a cast failure.
fn cast_boolean(raw: &JsonValue) -> Result<ParamValue, CastError> {
    match raw {
        JsonValue::Bool(b) => Ok(ParamValue::Bool(*b)),
        JsonValue::Number(n) => match n.as_i64() {
            Some(1) => Ok(ParamValue::Bool(true)),
            Some(0) => Ok(ParamValue::Bool(false)),
            _ => Err(CastError),
        },
        JsonValue::String(s) => match s.as_str() {
            "1" | "true" | "on" | "yes" => Ok(ParamValue::Bool(true)),
            "0" | "false" | "off" | "no" => Ok(ParamValue::Bool(false)),
            _ => Err(CastError),
        },
        _ => Err(CastError),
    }
}

fn cast_date(raw: &JsonValue) -> Result<ParamValue, CastError> {
    match raw {
        JsonValue::String(s) => s.parse::<NaiveDate>().map(ParamValue::Date).map_err(|_| CastError),
        _ => Err(CastError),
    }
}

fn cast_datetime(raw: &JsonValue) -> Result<ParamValue, CastError> {
    let JsonValue::String(s) = raw else { return Err(CastError) };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
        return Ok(ParamValue::DateTime(parsed.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| ParamValue::DateTime(naive.and_utc()))
        .map_err(|_| CastError)
}

fn cast_array(raw: &JsonValue) -> Result<ParamValue, CastError> {
    match raw {
        JsonValue::Array(items) => Ok(ParamValue::Array(items.clone())),
        JsonValue::String(s) => match serde_json::from_str::<JsonValue>(s) {
            Ok(JsonValue::Array(items)) => Ok(ParamValue::Array(items)),
            _ => Err(CastError),
        },
        _ => Err(CastError),
    }
}

fn cast_json(raw: &JsonValue) -> Result<ParamValue, CastError> {
    match raw {
        JsonValue::String(s) => {
            serde_json::from_str::<JsonValue>(s).map(ParamValue::Json).map_err(|_| CastError)
        }
        other => Ok(ParamValue::Json(other.clone())),
    }
}

/// strip, then downcase, then upcase, in that fixed order. The flags are not
/// mutually exclusive; with both case flags set, upcase runs last and wins.
fn apply_transforms(value: ParamValue, definition: &ParamDefinition) -> ParamValue {
    match value {
        ParamValue::Str(mut text) => {
            if definition.strip {
                text = text.trim().to_string();
            }
            if definition.downcase {
                text = text.to_lowercase();
            }
            if definition.upcase {
                text = text.to_uppercase();
            }
            ParamValue::Str(text)
        }
        other => other,
    }
}
