use serde::Serialize;

use crate::logging::{Component, Level};
use crate::records::{DriftSummary, ErrorState, PredictionResult};

/// Result page state. `Ready` and `Error` are terminal for a page instance;
/// only [`PageEvent::Leave`] brings the page back to `Loading`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageState {
    #[default]
    Loading,
    Ready(PredictionResult),
    Error(ErrorState),
}

impl PageState {
    pub fn name(&self) -> &'static str {
        match self {
            PageState::Loading => "LOADING",
            PageState::Ready(_) => "READY",
            PageState::Error(_) => "ERROR",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PageState::Loading)
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            PageState::Ready(r) => Some(r),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorState> {
        match self {
            PageState::Error(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PageEvent {
    /// Contents of the domain's handoff slot at mount time.
    SlotRead(Option<String>),
    /// The store itself could not be read.
    StoreFailed { reason: String },
    /// Page unmounted; the next visit starts over.
    Leave,
}

/// Side effects requested by the reducer, executed by the page driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Log { level: Level, component: Component, msg: String },
    Ready {
        records: usize,
        incomplete: usize,
        drift: Option<DriftSummary>,
    },
    Failed(ErrorState),
}
