//! Result page controller.
//!
//! [`ResultPage`] is the page-level driver: on mount it reads the domain's
//! handoff slot from an injected store, feeds the read into the pure
//! [`reducer`], and performs the effects it returns. No retry: recovering
//! from an error means leaving the page and submitting again.

pub mod reducer;
pub mod state;

pub use reducer::{reduce, PageContext, ReducerOutput};
pub use state::{Effect, PageEvent, PageState};

use crate::display_id::{display_id, IdSource, RandomIdSource};
use crate::domain::Domain;
use crate::logging::{log, log_page_error, log_page_ready, obj, v_str};
use crate::normalize::Normalizer;
use crate::store::HandoffStore;

pub struct ResultPage {
    ctx: PageContext,
    state: PageState,
    ids: Box<dyn IdSource>,
    display_id: Option<String>,
}

impl ResultPage {
    pub fn new(domain: Domain, normalizer: Normalizer) -> Self {
        Self::with_id_source(domain, normalizer, Box::new(RandomIdSource::new()))
    }

    pub fn with_id_source(domain: Domain, normalizer: Normalizer, ids: Box<dyn IdSource>) -> Self {
        Self {
            ctx: PageContext { domain, normalizer },
            state: PageState::Loading,
            ids,
            display_id: None,
        }
    }

    pub fn domain(&self) -> Domain {
        self.ctx.domain
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// Cosmetic label for the current visit, assigned on mount.
    pub fn display_id(&self) -> Option<&str> {
        self.display_id.as_deref()
    }

    /// Read the handoff slot and settle into `Ready` or `Error`.
    pub fn mount(&mut self, store: &dyn HandoffStore) -> &PageState {
        if self.display_id.is_none() {
            self.display_id = Some(display_id(self.ctx.domain, self.ids.as_mut()));
        }
        let event = match store.get(self.ctx.domain.store_key()) {
            Ok(slot) => PageEvent::SlotRead(slot),
            Err(e) => PageEvent::StoreFailed { reason: format!("{:#}", e) },
        };
        self.dispatch(event)
    }

    /// Unmount. The next `mount` starts from `Loading` with a fresh label.
    pub fn leave(&mut self) {
        self.display_id = None;
        self.dispatch(PageEvent::Leave);
    }

    pub fn dispatch(&mut self, event: PageEvent) -> &PageState {
        let out = reduce(&mut self.state, event, &self.ctx);
        for effect in out.effects {
            self.perform(effect);
        }
        &self.state
    }

    fn perform(&self, effect: Effect) {
        let domain = self.ctx.domain;
        match effect {
            Effect::Log { level, component, msg } => log(
                level,
                component,
                "note",
                obj(&[("domain", v_str(domain.as_str())), ("msg", v_str(&msg))]),
            ),
            Effect::Ready { records, incomplete, drift } => {
                log_page_ready(domain, records, incomplete, drift.as_ref())
            }
            Effect::Failed(err) => log_page_error(domain, &err),
        }
    }
}
