//! ephemra: hand a prediction from the inference service to the result view.
//!
//! Usage:
//!   ephemra <command> <geo|meo> [args]
//!
//! Commands:
//!   submit <domain> <file.csv>     - Post telemetry, store the response, show the result
//!   put <domain> <payload.json>    - Store a saved service response as-is
//!   show <domain>                  - Load the stored response and print the result view
//!   clear <domain>                 - Empty the domain's handoff slot
//!
//! Environment:
//!   HANDOFF_DB               SQLite file for handoff slots (./handoff.sqlite)
//!   PREDICT_BASE             Inference service base URL (http://localhost:8000)
//!   DISPLAY_UTC_OFFSET_MIN   Fixed display zone instead of the host's local zone
//!   LOG_LEVEL, LOG_COMPONENTS, LOG_DIR, RUN_ID  see logging

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{json, Value};
use std::path::Path;

use ephemra::config::Config;
use ephemra::logging::{log, obj, v_str, Component, Level};
use ephemra::store::{HandoffStore, SqliteStore};
use ephemra::submit::{submit, HttpInferenceClient};
use ephemra::{Domain, Normalizer, PageState, ResultPage};

fn usage() -> ! {
    eprintln!("usage: ephemra <submit|put|show|clear> <geo|meo> [file]");
    std::process::exit(64);
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        usage();
    }
    let command = args[0].as_str();
    let domain: Domain = args[1].parse().map_err(|e: String| anyhow!(e))?;
    let file = args.get(2).map(String::as_str);

    let cfg = Config::from_env()?;
    let mut store = SqliteStore::open(&cfg.store_path)?;
    log(
        Level::Debug,
        Component::System,
        "start",
        obj(&[
            ("command", v_str(command)),
            ("domain", v_str(domain.as_str())),
            ("store", v_str(&cfg.store_path)),
        ]),
    );

    match (command, file) {
        ("submit", Some(path)) => {
            let bytes = std::fs::read(path).with_context(|| format!("read {}", path))?;
            let file_name = Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload.csv".to_string());
            let client = HttpInferenceClient::new(cfg.predict_base.clone());
            submit(&client, &mut store, domain, &file_name, bytes).await?;
            show(&cfg, &store, domain)
        }
        ("put", Some(path)) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path))?;
            let value: Value =
                serde_json::from_str(&text).with_context(|| format!("{} is not JSON", path))?;
            store.put(domain.store_key(), &value)
        }
        ("show", None) => show(&cfg, &store, domain),
        ("clear", None) => store.clear(domain.store_key()),
        ("submit", None) | ("put", None) => bail!("{} needs a file argument", command),
        _ => usage(),
    }
}

fn show(cfg: &Config, store: &dyn HandoffStore, domain: Domain) -> Result<()> {
    let mut page = ResultPage::new(domain, Normalizer::new(cfg.display_zone));
    let state = page.mount(store).clone();

    let mut view = serde_json::to_value(&state)?;
    if let Some(map) = view.as_object_mut() {
        map.insert("display_id".to_string(), json!(page.display_id()));
        if let Some(summary) = state.result().and_then(|r| r.drift_summary()) {
            map.insert("drift_summary".to_string(), serde_json::to_value(summary)?);
        }
    }
    println!("{}", serde_json::to_string_pretty(&view)?);

    if let PageState::Error(_) = state {
        std::process::exit(2);
    }
    Ok(())
}
