use anyhow::{anyhow, Context, Result};
use url::Url;

use crate::normalize::DisplayZone;

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite file holding the handoff slots.
    pub store_path: String,
    /// Inference service base, always with a trailing slash.
    pub predict_base: Url,
    pub display_zone: DisplayZone,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_path = var("HANDOFF_DB").unwrap_or_else(|| "./handoff.sqlite".to_string());
        let base = var("PREDICT_BASE").unwrap_or_else(|| "http://localhost:8000".to_string());
        let predict_base = parse_base(&base)?;
        let display_zone = match var("DISPLAY_UTC_OFFSET_MIN") {
            Some(raw) => {
                let minutes: i32 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("DISPLAY_UTC_OFFSET_MIN not an integer: {}", raw))?;
                DisplayZone::from_offset_minutes(minutes)
                    .ok_or_else(|| anyhow!("DISPLAY_UTC_OFFSET_MIN out of range: {}", minutes))?
            }
            None => DisplayZone::Local,
        };
        Ok(Self {
            store_path,
            predict_base,
            display_zone,
        })
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).with_context(|| format!("PREDICT_BASE is not a URL: {}", raw))?;
    if url.cannot_be_a_base() {
        return Err(anyhow!("PREDICT_BASE cannot be a base URL: {}", raw));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = cfg(&[]).unwrap();
        assert_eq!(c.store_path, "./handoff.sqlite");
        assert_eq!(c.predict_base.as_str(), "http://localhost:8000/");
        assert_eq!(c.display_zone, DisplayZone::Local);
    }

    #[test]
    fn test_base_gets_trailing_slash() {
        let c = cfg(&[("PREDICT_BASE", "https://infer.example.org/api")]).unwrap();
        assert_eq!(
            c.predict_base.join("predict/geo").unwrap().as_str(),
            "https://infer.example.org/api/predict/geo"
        );
    }

    #[test]
    fn test_fixed_zone() {
        let c = cfg(&[("DISPLAY_UTC_OFFSET_MIN", "0")]).unwrap();
        assert_eq!(c.display_zone, DisplayZone::utc());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(cfg(&[("PREDICT_BASE", "not a url")]).is_err());
        assert!(cfg(&[("DISPLAY_UTC_OFFSET_MIN", "abc")]).is_err());
        assert!(cfg(&[("DISPLAY_UTC_OFFSET_MIN", "2000")]).is_err());
    }
}
