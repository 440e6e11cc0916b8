//! Prediction result normalization and handoff for orbit error forecasts.
//!
//! ```text
//! submit ──► HandoffStore ──► ResultPage (reducer) ──► Normalizer ──► records
//! ```

pub mod config;
pub mod display_id;
pub mod domain;
pub mod logging;
pub mod normalize;
pub mod page;
pub mod records;
pub mod store;
pub mod submit;

pub use domain::Domain;
pub use normalize::{DisplayZone, Normalizer, Rejection};
pub use page::{PageState, ResultPage};
pub use records::{CanonicalEpochRecord, DriftSummary, ErrorKind, ErrorState, PredictionResult};
pub use store::{HandoffStore, MemoryStore, SqliteStore};
