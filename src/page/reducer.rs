//! Pure reducer: (PageState, PageEvent) -> (PageState, Vec<Effect>)
//!
//! All result page transitions happen here. The reducer never touches the
//! store or the logger; it receives what the driver read and hands back
//! the effects to perform.
//!
//! ```text
//!            SlotRead(None) / StoreFailed ──► ERROR{MissingData}
//!  LOADING ─ SlotRead(error payload) ───────► ERROR{UpstreamError}
//!            SlotRead(malformed) ───────────► ERROR{DecodeFailure}
//!            SlotRead(ok) ──────────────────► READY
//!  any ───── Leave ─────────────────────────► LOADING
//! ```

use super::state::{Effect, PageEvent, PageState};
use crate::domain::Domain;
use crate::logging::{Component, Level};
use crate::normalize::{Normalizer, Rejection};
use crate::records::ErrorState;

/// Context the reducer decodes against.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub domain: Domain,
    pub normalizer: Normalizer,
}

/// Result of processing an event
#[derive(Debug, Default)]
pub struct ReducerOutput {
    pub effects: Vec<Effect>,
    pub changed: bool,
}

pub fn reduce(state: &mut PageState, event: PageEvent, ctx: &PageContext) -> ReducerOutput {
    let mut effects = Vec::new();

    // Terminal for this page instance until it is left.
    if state.is_terminal() && !matches!(event, PageEvent::Leave) {
        effects.push(Effect::Log {
            level: Level::Debug,
            component: Component::Page,
            msg: format!("ignoring slot read in {} state", state.name()),
        });
        return ReducerOutput { effects, changed: false };
    }

    let next = match event {
        PageEvent::Leave => PageState::Loading,
        PageEvent::SlotRead(None) => PageState::Error(ErrorState::missing(ctx.domain)),
        PageEvent::StoreFailed { reason } => {
            effects.push(Effect::Log {
                level: Level::Warn,
                component: Component::Store,
                msg: format!("handoff store unreadable: {}", reason),
            });
            PageState::Error(ErrorState::missing(ctx.domain))
        }
        PageEvent::SlotRead(Some(text)) => decode_slot(&text, ctx, &mut effects),
    };

    match &next {
        PageState::Ready(result) => effects.push(Effect::Ready {
            records: result.len(),
            incomplete: result.incomplete_count(),
            drift: result.drift_summary(),
        }),
        PageState::Error(err) => effects.push(Effect::Failed(err.clone())),
        PageState::Loading => {}
    }

    let changed = !(matches!(state, PageState::Loading) && matches!(next, PageState::Loading));
    *state = next;
    ReducerOutput { effects, changed }
}

fn decode_slot(text: &str, ctx: &PageContext, effects: &mut Vec<Effect>) -> PageState {
    match ctx.normalizer.classify_text(text, ctx.domain) {
        Ok(result) => PageState::Ready(result),
        Err(rejection) => {
            if !matches!(rejection, Rejection::Upstream(_)) {
                effects.push(Effect::Log {
                    level: Level::Debug,
                    component: Component::Normalize,
                    msg: format!("malformed {} payload: {}", ctx.domain, rejection),
                });
            }
            PageState::Error(rejection.into_error_state(ctx.domain))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::DisplayZone;
    use crate::records::{DriftSummary, ErrorKind};

    fn ctx(domain: Domain) -> PageContext {
        PageContext {
            domain,
            normalizer: Normalizer::new(DisplayZone::utc()),
        }
    }

    fn read(text: &str) -> PageEvent {
        PageEvent::SlotRead(Some(text.to_string()))
    }

    #[test]
    fn test_absent_slot_is_missing_data() {
        for domain in Domain::ALL {
            let mut state = PageState::Loading;
            let out = reduce(&mut state, PageEvent::SlotRead(None), &ctx(domain));
            assert!(out.changed);
            let err = state.error().unwrap();
            assert_eq!(err.kind, ErrorKind::MissingData);
            assert_eq!(err.message, domain.missing_data_message());
            assert_eq!(out.effects, vec![Effect::Failed(err.clone())]);
        }
    }

    #[test]
    fn test_store_failure_is_missing_data() {
        let mut state = PageState::Loading;
        let out = reduce(
            &mut state,
            PageEvent::StoreFailed { reason: "disk I/O error".into() },
            &ctx(Domain::Geo),
        );
        assert_eq!(state.error().unwrap().kind, ErrorKind::MissingData);
        assert!(matches!(
            &out.effects[0],
            Effect::Log { level: Level::Warn, component: Component::Store, .. }
        ));
    }

    #[test]
    fn test_upstream_error() {
        let mut state = PageState::Loading;
        reduce(&mut state, read(r#"{"error":"Need at least 96 rows"}"#), &ctx(Domain::Meo));
        let err = state.error().unwrap();
        assert_eq!(err.kind, ErrorKind::UpstreamError);
        assert_eq!(err.message, "Need at least 96 rows");
    }

    #[test]
    fn test_malformed_is_decode_failure() {
        for text in ["not json", r#"{"prediction": 5}"#, r#"{"timestamps": []}"#] {
            let mut state = PageState::Loading;
            let out = reduce(&mut state, read(text), &ctx(Domain::Meo));
            let err = state.error().unwrap();
            assert_eq!(err.kind, ErrorKind::DecodeFailure);
            assert_eq!(err.message, "Failed to parse prediction data.");
            assert_eq!(out.effects.len(), 2);
            assert!(matches!(
                &out.effects[0],
                Effect::Log { level: Level::Debug, component: Component::Normalize, .. }
            ));
        }
    }

    #[test]
    fn test_ready() {
        let mut state = PageState::Loading;
        let out = reduce(
            &mut state,
            read(r#"{"prediction":[{"utc_time":"t0","x_error (m)":3,"y_error (m)":4,"z_error (m)":0,"satclockerror (m)":1}]}"#),
            &ctx(Domain::Geo),
        );
        assert_eq!(state.name(), "READY");
        assert_eq!(state.result().unwrap().records[0].drift, Some(5.0));
        assert_eq!(
            out.effects,
            vec![Effect::Ready {
                records: 1,
                incomplete: 0,
                drift: Some(DriftSummary { mean: 5.0, peak: 5.0, epochs: 1 }),
            }]
        );
    }

    #[test]
    fn test_terminal_ignores_reads() {
        let mut state = PageState::Loading;
        let c = ctx(Domain::Geo);
        reduce(&mut state, PageEvent::SlotRead(None), &c);
        let out = reduce(&mut state, read(r#"{"prediction":[]}"#), &c);
        assert!(!out.changed);
        assert_eq!(state.error().unwrap().kind, ErrorKind::MissingData);
        assert!(matches!(
            &out.effects[..],
            [Effect::Log { level: Level::Debug, component: Component::Page, .. }]
        ));
    }

    #[test]
    fn test_upstream_error_logs_no_shape_note() {
        let mut state = PageState::Loading;
        let out = reduce(&mut state, read(r#"{"error":"down"}"#), &ctx(Domain::Geo));
        assert_eq!(out.effects.len(), 1);
        assert!(matches!(&out.effects[0], Effect::Failed(_)));
    }

    #[test]
    fn test_meo_ready_has_no_drift() {
        let mut state = PageState::Loading;
        let out = reduce(
            &mut state,
            read(r#"{"prediction":[[1,2,3,4]],"timestamps":["2024-01-01T00:00:00Z"]}"#),
            &ctx(Domain::Meo),
        );
        assert_eq!(out.effects, vec![Effect::Ready { records: 1, incomplete: 0, drift: None }]);
    }

    #[test]
    fn test_leave_resets() {
        let mut state = PageState::Loading;
        let c = ctx(Domain::Geo);
        reduce(&mut state, PageEvent::SlotRead(None), &c);
        let out = reduce(&mut state, PageEvent::Leave, &c);
        assert!(out.changed);
        assert!(out.effects.is_empty());
        assert!(matches!(state, PageState::Loading));
        reduce(&mut state, read(r#"{"prediction":[]}"#), &c);
        assert!(state.result().unwrap().is_empty());
        assert!(!reduce(&mut PageState::Loading, PageEvent::Leave, &c).changed);
    }
}
