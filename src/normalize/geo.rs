//! GEO payloads: `{prediction: [{utc_time, "x_error (m)", ...}, ...]}`.

use serde_json::Value;

use super::{container, number, ShapeError};
use crate::records::{drift, CanonicalEpochRecord};

pub const TIME_KEY: &str = "utc_time";
pub const X_KEY: &str = "x_error (m)";
pub const Y_KEY: &str = "y_error (m)";
pub const Z_KEY: &str = "z_error (m)";
pub const CLOCK_KEY: &str = "satclockerror (m)";

/// One record per row, in row order. Rows are never dropped.
pub fn decode(raw: &Value) -> Result<Vec<CanonicalEpochRecord>, ShapeError> {
    let rows = container(raw, "prediction")?;
    Ok(rows.iter().map(decode_row).collect())
}

fn decode_row(row: &Value) -> CanonicalEpochRecord {
    let x = number(row.get(X_KEY));
    let y = number(row.get(Y_KEY));
    let z = number(row.get(Z_KEY));
    CanonicalEpochRecord {
        timestamp: row.get(TIME_KEY).and_then(Value::as_str).map(str::to_string),
        x_error: x,
        y_error: y,
        z_error: z,
        satclockerror: number(row.get(CLOCK_KEY)),
        drift: Some(drift(x, y, z)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_mapping() {
        let raw = json!({"prediction": [{
            "utc_time": "t0",
            "x_error (m)": 3,
            "y_error (m)": 4,
            "z_error (m)": 0,
            "satclockerror (m)": 1
        }]});
        let recs = decode(&raw).unwrap();
        assert_eq!(recs.len(), 1);
        let r = &recs[0];
        assert_eq!(r.timestamp.as_deref(), Some("t0"));
        assert_eq!((r.x_error, r.y_error, r.z_error, r.satclockerror), (3.0, 4.0, 0.0, 1.0));
        assert_eq!(r.drift, Some(5.0));
    }

    #[test]
    fn test_bad_fields_become_nan() {
        let raw = json!({"prediction": [
            {"utc_time": "t0", "x_error (m)": "3", "y_error (m)": 4, "z_error (m)": 0},
            42,
            {"utc_time": 17}
        ]});
        let recs = decode(&raw).unwrap();
        assert_eq!(recs.len(), 3);

        assert!(recs[0].x_error.is_nan());
        assert_eq!(recs[0].y_error, 4.0);
        assert!(recs[0].satclockerror.is_nan());
        assert!(recs[0].drift.unwrap().is_nan());

        assert!(recs[1].timestamp.is_none());
        assert!(recs[1].z_error.is_nan());

        assert!(recs[2].timestamp.is_none());
    }

    #[test]
    fn test_empty_prediction() {
        assert!(decode(&json!({"prediction": []})).unwrap().is_empty());
    }

    #[test]
    fn test_missing_container() {
        assert_eq!(
            decode(&json!({"predictions": []})).unwrap_err(),
            ShapeError::MissingField("prediction")
        );
    }
}
