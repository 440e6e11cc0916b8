//! Structured logging for the prediction handoff.
//!
//! Every record is a single JSON line on stderr:
//! `{ts, run_id, seq, lvl, component, event, msg, data}`.
//! When `LOG_DIR` is set the same lines are appended to
//! `<LOG_DIR>/<run_id>/events.jsonl`.
//!
//! Filtering:
//! - `LOG_LEVEL`: minimum level (trace, debug, info, warn, error, fatal)
//! - `LOG_COMPONENTS`: comma-separated components, or `all`

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

use crate::domain::Domain;
use crate::records::{DriftSummary, ErrorState};

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| Level::parse(&v))
            .unwrap_or(Level::Info)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "fatal" => Some(Level::Fatal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Components (categories for filtering)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Store,     // Handoff slot reads and writes
    Normalize, // Payload decoding
    Page,      // Result page transitions
    Submit,    // Inference service calls
    System,    // Startup, config
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Store => "store",
            Component::Normalize => "normalize",
            Component::Page => "page",
            Component::Submit => "submit",
            Component::System => "system",
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled_in(std::env::var("LOG_COMPONENTS").ok().as_deref())
    }

    /// `filter` is a comma-separated component list or `all`; no filter
    /// enables everything.
    pub fn enabled_in(&self, filter: Option<&str>) -> bool {
        match filter {
            None | Some("all") => true,
            Some(list) => list.split(',').any(|c| c.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    events: Option<Mutex<BufWriter<File>>>,
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let events = std::env::var("LOG_DIR")
            .ok()
            .and_then(|base| open_events_log(Path::new(&base), &run_id));
        RunContext { run_id, events }
    })
}

/// `<base>/<run_id>/events.jsonl`, created fresh.
fn open_events_log(base: &Path, run_id: &str) -> Option<Mutex<BufWriter<File>>> {
    let run_dir = base.join(run_id);
    if let Err(err) = create_dir_all(&run_dir) {
        eprintln!("[log] failed to create run dir: {}", err);
        return None;
    }
    match File::create(run_dir.join("events.jsonl")) {
        Ok(f) => Some(Mutex::new(BufWriter::new(f))),
        Err(err) => {
            eprintln!("[log] failed to create events log: {}", err);
            None
        }
    }
}

fn write_line(writer: &Mutex<BufWriter<File>>, line: &str) {
    if let Ok(mut w) = writer.lock() {
        let _ = writeln!(w, "{}", line);
        let _ = w.flush();
    }
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, component: Component, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !component.is_enabled() {
        return;
    }
    emit_record(level, component, event, fields);
}

fn build_record(
    run_id: &str,
    level: Level,
    component: Component,
    event: &str,
    mut fields: Map<String, Value>,
) -> Value {
    let msg = fields.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(run_id));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(component.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    if let Some(domain) = fields.remove("domain") {
        entry.insert("domain".to_string(), domain);
    }
    entry.insert("data".to_string(), Value::Object(fields));
    Value::Object(entry)
}

fn emit_record(level: Level, component: Component, event: &str, fields: Map<String, Value>) {
    let ctx = ensure_run_context();
    let line = build_record(&ctx.run_id, level, component, event, fields).to_string();
    if let Some(events) = &ctx.events {
        write_line(events, &line);
    }
    eprintln!("{}", line);
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_slot_write(key: &str, payload: &str) {
    log(
        Level::Debug,
        Component::Store,
        "slot_write",
        obj(&[
            ("key", v_str(key)),
            ("bytes", json!(payload.len())),
            ("digest", v_str(&payload_digest(payload))),
        ]),
    );
}

pub fn log_slot_read(key: &str, payload: Option<&str>) {
    let mut fields = obj(&[("key", v_str(key)), ("present", json!(payload.is_some()))]);
    if let Some(p) = payload {
        fields.insert("bytes".to_string(), json!(p.len()));
        fields.insert("digest".to_string(), v_str(&payload_digest(p)));
    }
    log(Level::Debug, Component::Store, "slot_read", fields);
}

pub fn log_slot_clear(key: &str) {
    log(Level::Info, Component::Store, "slot_clear", obj(&[("key", v_str(key))]));
}

pub fn log_page_ready(domain: Domain, records: usize, incomplete: usize, drift: Option<&DriftSummary>) {
    let mut data = obj(&[
        ("domain", v_str(domain.as_str())),
        ("records", json!(records)),
        ("incomplete", json!(incomplete)),
    ]);
    if let Some(summary) = drift {
        data.insert("drift_mean".to_string(), v_num(summary.mean));
        data.insert("drift_peak".to_string(), v_num(summary.peak));
    }
    log(
        if incomplete > 0 { Level::Warn } else { Level::Info },
        Component::Page,
        "ready",
        data,
    );
}

pub fn log_page_error(domain: Domain, error: &ErrorState) {
    log(
        Level::Warn,
        Component::Page,
        "error",
        obj(&[
            ("domain", v_str(domain.as_str())),
            ("kind", v_str(error.kind.as_str())),
            ("msg", v_str(&error.message)),
        ]),
    );
}

pub fn log_submit(domain: Domain, url: &str, file_name: &str, bytes: usize) {
    log(
        Level::Info,
        Component::Submit,
        "request",
        obj(&[
            ("domain", v_str(domain.as_str())),
            ("url", v_str(url)),
            ("file", v_str(file_name)),
            ("bytes", json!(bytes)),
        ]),
    );
}

// =============================================================================
// Utility Functions
// =============================================================================

/// SHA-256 of a serialized payload, hex encoded.
pub fn payload_digest(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Tests
// =============================================================================
