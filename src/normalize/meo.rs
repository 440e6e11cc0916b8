//! MEO payloads: parallel `prediction` rows and `timestamps`.
//!
//! Rows drive the output: record `i` pairs `prediction[i]` with
//! `timestamps[i]`. Rows past the end of `timestamps` get no timestamp;
//! surplus timestamps are ignored.

use serde_json::Value;

use super::timefmt::DisplayZone;
use super::{container, number, ShapeError};
use crate::records::CanonicalEpochRecord;

pub fn decode(raw: &Value, zone: &DisplayZone) -> Result<Vec<CanonicalEpochRecord>, ShapeError> {
    let rows = container(raw, "prediction")?;
    let timestamps = container(raw, "timestamps")?;

    let records = rows
        .iter()
        .enumerate()
        .map(|(i, row)| CanonicalEpochRecord {
            timestamp: timestamps
                .get(i)
                .and_then(Value::as_str)
                .map(|ts| zone.format(ts)),
            x_error: number(row.get(0)),
            y_error: number(row.get(1)),
            z_error: number(row.get(2)),
            satclockerror: number(row.get(3)),
            drift: None,
        })
        .collect();
    Ok(records)
}
