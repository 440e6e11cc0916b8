//! Canonical output of the normalizer.
//!
//! Every backend shape ends up as an ordered list of [`CanonicalEpochRecord`]
//! tagged with its [`Domain`]. Numbers are carried as raw `f64`: a missing
//! or non-numeric source field is `NaN`, and non-finite values serialize as
//! JSON `null`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Domain;

/// One epoch of predicted error components, in meters.
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalEpochRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub x_error: f64,
    pub y_error: f64,
    pub z_error: f64,
    pub satclockerror: f64,
    /// Euclidean norm of the positional components. GEO only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drift: Option<f64>,
}

impl CanonicalEpochRecord {
    /// True when the record has a timestamp and every numeric field is finite.
    pub fn is_complete(&self) -> bool {
        self.timestamp.is_some()
            && self.x_error.is_finite()
            && self.y_error.is_finite()
            && self.z_error.is_finite()
            && self.satclockerror.is_finite()
    }
}

/// Positional drift: `sqrt(x² + y² + z²)`, NaN if any component is NaN.
pub fn drift(x: f64, y: f64, z: f64) -> f64 {
    (x * x + y * y + z * z).sqrt()
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub domain: Domain,
    pub records: Vec<CanonicalEpochRecord>,
}

/// Aggregate drift figures shown next to the GEO charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DriftSummary {
    pub mean: f64,
    pub peak: f64,
    pub epochs: usize,
}

impl PredictionResult {
    pub fn new(domain: Domain, records: Vec<CanonicalEpochRecord>) -> Self {
        Self { domain, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records with a NaN field or no timestamp.
    pub fn incomplete_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_complete()).count()
    }

    /// Mean and peak drift over all records. `None` when no record carries
    /// drift (MEO results, or an empty prediction). A single NaN drift makes
    /// both figures NaN.
    pub fn drift_summary(&self) -> Option<DriftSummary> {
        let drifts: Vec<f64> = self.records.iter().filter_map(|r| r.drift).collect();
        if drifts.is_empty() {
            return None;
        }
        let sum: f64 = drifts.iter().sum();
        let peak = drifts.iter().copied().fold(f64::NEG_INFINITY, |acc, d| {
            if acc.is_nan() || d.is_nan() {
                f64::NAN
            } else {
                acc.max(d)
            }
        });
        Some(DriftSummary {
            mean: sum / drifts.len() as f64,
            peak,
            epochs: drifts.len(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Nothing in the handoff slot.
    MissingData,
    /// The inference service reported an error; message passed through.
    UpstreamError,
    /// Payload present but structurally unusable.
    DecodeFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingData => "missing_data",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::DecodeFailure => "decode_failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorState {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorState {
    pub fn missing(domain: Domain) -> Self {
        Self {
            kind: ErrorKind::MissingData,
            message: domain.missing_data_message().to_string(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::UpstreamError,
            message: message.into(),
        }
    }

    pub fn decode(domain: Domain) -> Self {
        Self {
            kind: ErrorKind::DecodeFailure,
            message: domain.decode_failure_message().to_string(),
        }
    }
}

impl fmt::Display for ErrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}
