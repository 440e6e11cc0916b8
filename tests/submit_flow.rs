//! Submission step against a stub inference client: every outcome leaves
//! a value in the slot, and the result page classifies it.

use async_trait::async_trait;
use ephemra::display_id::FixedIdSource;
use ephemra::store::{HandoffStore, MemoryStore};
use ephemra::submit::{submit, InferenceClient, SubmitOutcome};
use ephemra::{Domain, DisplayZone, ErrorKind, Normalizer, ResultPage};
use serde_json::json;
use std::sync::Mutex;

struct StubClient {
    outcome: SubmitOutcome,
    seen: Mutex<Vec<(Domain, String, usize)>>,
}

impl StubClient {
    fn new(outcome: SubmitOutcome) -> Self {
        Self {
            outcome,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl InferenceClient for StubClient {
    async fn predict(&self, domain: Domain, file_name: &str, bytes: Vec<u8>) -> SubmitOutcome {
        self.seen
            .lock()
            .unwrap()
            .push((domain, file_name.to_string(), bytes.len()));
        self.outcome.clone()
    }
}

fn mount(domain: Domain, store: &MemoryStore) -> ephemra::PageState {
    let mut page =
        ResultPage::with_id_source(domain, Normalizer::new(DisplayZone::utc()), Box::new(FixedIdSource(1000)));
    page.mount(store).clone()
}

#[tokio::test]
async fn success_is_stored_verbatim() {
    let body = json!({"prediction": [[1, 2, 3, 4]], "timestamps": ["2024-01-01T00:00:00Z"]});
    let client = StubClient::new(SubmitOutcome::Response { ok: true, body: Ok(body.clone()) });
    let mut store = MemoryStore::new();

    let written = submit(&client, &mut store, Domain::Meo, "week.csv", b"a,b\n1,2\n".to_vec())
        .await
        .unwrap();
    assert_eq!(written, body);
    assert_eq!(
        client.seen.lock().unwrap().as_slice(),
        &[(Domain::Meo, "week.csv".to_string(), 8)]
    );
    assert_eq!(mount(Domain::Meo, &store).result().unwrap().len(), 1);
}

#[tokio::test]
async fn rejection_becomes_upstream_error() {
    let client = StubClient::new(SubmitOutcome::Response {
        ok: false,
        body: Ok(json!({"detail": "Need at least 96 rows of data (found 10)"})),
    });
    let mut store = MemoryStore::new();
    submit(&client, &mut store, Domain::Geo, "geo.csv", Vec::new()).await.unwrap();

    let state = mount(Domain::Geo, &store);
    let err = state.error().unwrap();
    assert_eq!(err.kind, ErrorKind::UpstreamError);
    assert_eq!(err.message, "Need at least 96 rows of data (found 10)");
}

#[tokio::test]
async fn transport_failure_still_writes_slot() {
    let client = StubClient::new(SubmitOutcome::Transport("connection refused".into()));
    let mut store = MemoryStore::new();
    submit(&client, &mut store, Domain::Meo, "x.csv", Vec::new()).await.unwrap();

    assert_eq!(
        store.get("meo_prediction").unwrap().as_deref(),
        Some("{\"error\":\"connection refused\"}")
    );
    assert_eq!(mount(Domain::Meo, &store).error().unwrap().message, "connection refused");
}

#[tokio::test]
async fn new_submission_overwrites_previous() {
    let mut store = MemoryStore::new();
    let failing = StubClient::new(SubmitOutcome::Response { ok: false, body: Ok(json!({})) });
    submit(&failing, &mut store, Domain::Geo, "a.csv", Vec::new()).await.unwrap();
    assert_eq!(mount(Domain::Geo, &store).error().unwrap().message, "Prediction failed");

    let good = StubClient::new(SubmitOutcome::Response { ok: true, body: Ok(json!({"prediction": []})) });
    submit(&good, &mut store, Domain::Geo, "b.csv", Vec::new()).await.unwrap();
    assert_eq!(mount(Domain::Geo, &store).name(), "READY");

    // other domain untouched
    assert_eq!(mount(Domain::Meo, &store).error().unwrap().kind, ErrorKind::MissingData);
}
