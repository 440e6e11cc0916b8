//! Submission step: send a telemetry file to the inference service and
//! leave the response in the domain's handoff slot.
//!
//! Whatever happens on the wire, a value is written before [`submit`]
//! returns, so the result page always finds something to show.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;

use crate::domain::Domain;
use crate::logging::{log, log_submit, obj, v_str, Component, Level};
use crate::normalize::is_truthy;
use crate::store::HandoffStore;

const GENERIC_FAILURE: &str = "Prediction failed";

/// What came back from one prediction request.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The service answered. `body` is the parsed JSON, or why parsing failed.
    Response { ok: bool, body: Result<Value, String> },
    /// No answer at all (connect, TLS, timeout).
    Transport(String),
}

#[async_trait]
pub trait InferenceClient {
    async fn predict(&self, domain: Domain, file_name: &str, bytes: Vec<u8>) -> SubmitOutcome;
}

pub struct HttpInferenceClient {
    client: Client,
    base: Url,
}

impl HttpInferenceClient {
    pub fn new(base: Url) -> Self {
        Self {
            client: Client::new(),
            base,
        }
    }

    pub fn endpoint(&self, domain: Domain) -> Result<Url> {
        Ok(self.base.join(domain.route())?)
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn predict(&self, domain: Domain, file_name: &str, bytes: Vec<u8>) -> SubmitOutcome {
        let url = match self.endpoint(domain) {
            Ok(u) => u,
            Err(e) => return SubmitOutcome::Transport(e.to_string()),
        };
        log_submit(domain, url.as_str(), file_name, bytes.len());

        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        let resp = match self.client.post(url).multipart(form).send().await {
            Ok(r) => r,
            Err(e) => return SubmitOutcome::Transport(e.to_string()),
        };
        let ok = resp.status().is_success();
        let body = resp.json::<Value>().await.map_err(|e| e.to_string());
        SubmitOutcome::Response { ok, body }
    }
}

/// Value to hand off for an outcome.
///
/// - success: the body verbatim
/// - HTTP failure: `{error: body.detail}` or the generic message
/// - unreadable body or transport failure: `{error: <reason>}`
pub fn envelope(outcome: SubmitOutcome) -> Value {
    match outcome {
        SubmitOutcome::Response { ok: true, body: Ok(body) } => body,
        SubmitOutcome::Response { ok: false, body: Ok(body) } => {
            let detail = body
                .get("detail")
                .filter(|d| is_truthy(d))
                .cloned()
                .unwrap_or_else(|| Value::String(GENERIC_FAILURE.to_string()));
            json!({ "error": detail })
        }
        SubmitOutcome::Response { body: Err(reason), .. } | SubmitOutcome::Transport(reason) => {
            json!({ "error": reason })
        }
    }
}

/// Run one submission and write its envelope into `domain`'s slot.
pub async fn submit<C>(
    client: &C,
    store: &mut dyn HandoffStore,
    domain: Domain,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<Value>
where
    C: InferenceClient + ?Sized,
{
    let outcome = client.predict(domain, file_name, bytes).await;
    let (level, status) = match &outcome {
        SubmitOutcome::Response { ok: true, body: Ok(_) } => (Level::Info, "ok"),
        SubmitOutcome::Response { ok: false, .. } => (Level::Warn, "rejected"),
        SubmitOutcome::Response { body: Err(_), .. } => (Level::Warn, "bad_body"),
        SubmitOutcome::Transport(_) => (Level::Error, "transport"),
    };
    log(
        level,
        Component::Submit,
        "response",
        obj(&[("domain", v_str(domain.as_str())), ("status", v_str(status))]),
    );

    let value = envelope(outcome);
    store.put(domain.store_key(), &value)?;
    Ok(value)
}
