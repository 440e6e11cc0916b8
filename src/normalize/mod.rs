//! Result normalizer: raw inference payload -> canonical epoch records.
//!
//! ```text
//!   raw JSON ──► error field? ──yes──► UpstreamError
//!                    │ no
//!                    ▼
//!            domain-selected decoder ──shape broken──► DecodeFailure
//!                    │
//!                    ▼
//!           PredictionResult (payload order, NaN for bad fields)
//! ```
//!
//! The payloads carry no discriminant. The caller picks the decoder by
//! [`Domain`]. Errors are returned as [`ErrorState`] values; nothing in here
//! panics on untrusted input.

pub mod geo;
pub mod meo;
pub mod timefmt;

use serde_json::Value;
use std::fmt;

use crate::domain::Domain;
use crate::records::{CanonicalEpochRecord, ErrorState, PredictionResult};

pub use timefmt::DisplayZone;

/// Why a payload could not be decoded at the top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    NotAnObject,
    MissingField(&'static str),
    NotAnArray(&'static str),
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::NotAnObject => write!(f, "payload is not a JSON object"),
            ShapeError::MissingField(field) => write!(f, "missing field `{}`", field),
            ShapeError::NotAnArray(field) => write!(f, "field `{}` is not an array", field),
        }
    }
}

/// Why a payload yielded no records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The service reported an error.
    Upstream(String),
    /// Slot text is not JSON.
    Syntax(String),
    Shape(ShapeError),
}

impl Rejection {
    pub fn into_error_state(self, domain: Domain) -> ErrorState {
        match self {
            Rejection::Upstream(message) => ErrorState::upstream(message),
            Rejection::Syntax(_) | Rejection::Shape(_) => ErrorState::decode(domain),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Upstream(message) => write!(f, "upstream error: {}", message),
            Rejection::Syntax(reason) => write!(f, "not valid JSON: {}", reason),
            Rejection::Shape(shape) => write!(f, "{}", shape),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    zone: DisplayZone,
}

impl Normalizer {
    pub fn new(zone: DisplayZone) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> DisplayZone {
        self.zone
    }

    /// Decode an already-parsed payload for `domain`.
    pub fn normalize(&self, raw: &Value, domain: Domain) -> Result<PredictionResult, ErrorState> {
        self.classify(raw, domain).map_err(|r| r.into_error_state(domain))
    }

    /// Decode the serialized text found in a handoff slot.
    pub fn normalize_text(&self, text: &str, domain: Domain) -> Result<PredictionResult, ErrorState> {
        self.classify_text(text, domain).map_err(|r| r.into_error_state(domain))
    }

    /// Like [`Normalizer::normalize`], but keeps the reason a payload
    /// produced no records.
    pub fn classify(&self, raw: &Value, domain: Domain) -> Result<PredictionResult, Rejection> {
        if let Some(message) = upstream_error(raw) {
            return Err(Rejection::Upstream(message));
        }
        self.decode(raw, domain)
            .map(|records| PredictionResult::new(domain, records))
            .map_err(Rejection::Shape)
    }

    pub fn classify_text(&self, text: &str, domain: Domain) -> Result<PredictionResult, Rejection> {
        let raw: Value = serde_json::from_str(text).map_err(|e| Rejection::Syntax(e.to_string()))?;
        self.classify(&raw, domain)
    }

    /// Shape-level decode without the error-field check. Exposes the
    /// structural reason a payload was rejected.
    pub fn decode(&self, raw: &Value, domain: Domain) -> Result<Vec<CanonicalEpochRecord>, ShapeError> {
        match domain {
            Domain::Geo => geo::decode(raw),
            Domain::Meo => meo::decode(raw, &self.zone),
        }
    }
}

/// The service's error message, if the payload carries a truthy `error`.
///
/// `null`, `false`, `0` and `""` do not count as errors. Non-string
/// messages are passed on as their JSON text.
pub fn upstream_error(raw: &Value) -> Option<String> {
    let err = raw.as_object()?.get("error").filter(|e| is_truthy(e))?;
    Some(match err {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// Truthiness as the service's browser client sees it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn container<'a>(raw: &'a Value, field: &'static str) -> Result<&'a Vec<Value>, ShapeError> {
    let obj = raw.as_object().ok_or(ShapeError::NotAnObject)?;
    let value = obj.get(field).ok_or(ShapeError::MissingField(field))?;
    value.as_array().ok_or(ShapeError::NotAnArray(field))
}

/// Numeric field or NaN. Only JSON numbers count; `"3.5"` is NaN.
/// Literals beyond the f64 range become ±infinity.
pub(crate) fn number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n
            .as_f64()
            .or_else(|| n.to_string().parse::<f64>().ok())
            .unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}
