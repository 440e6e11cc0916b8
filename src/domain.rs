use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Orbit regime a prediction belongs to. Selects the payload shape,
/// the handoff slot and the submission route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Domain {
    Geo,
    Meo,
}

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::Geo, Domain::Meo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Geo => "geo",
            Domain::Meo => "meo",
        }
    }

    /// Handoff slot written by the submission step and read by the result page.
    pub fn store_key(&self) -> &'static str {
        match self {
            Domain::Geo => "geo_prediction",
            Domain::Meo => "meo_prediction",
        }
    }

    /// Inference endpoint path, relative to the service base.
    pub fn route(&self) -> &'static str {
        match self {
            Domain::Geo => "predict/geo",
            Domain::Meo => "predict/meo",
        }
    }

    pub fn missing_data_message(&self) -> &'static str {
        match self {
            Domain::Geo => "No prediction data found.",
            Domain::Meo => "No prediction found locally.",
        }
    }

    pub fn decode_failure_message(&self) -> &'static str {
        match self {
            Domain::Geo => "Failed to parse GEO prediction data.",
            Domain::Meo => "Failed to parse prediction data.",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Domain::Geo => "GEO",
            Domain::Meo => "MEO",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "geo" => Ok(Domain::Geo),
            "meo" => Ok(Domain::Meo),
            other => Err(format!("unknown domain: {} (expected geo or meo)", other)),
        }
    }
}
