//! Non-secret settings for the collaborators around the core.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{read_bool_at, read_str_at, read_u64_at};

pub const DEFAULT_HOLDED_BASE_URL: &str = "https://api.holded.com/api/invoicing/v1";
pub const DEFAULT_PAGE_LIMIT: u64 = 200;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_STATE_PATH: &str = ".state/salesorder_status.json";

/// Order source (Holded invoicing API) settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    pub base_url: String,
    /// Send the key as `Authorization: Bearer` instead of the `key` header.
    pub use_bearer: bool,
    pub page_limit: u64,
    pub timeout_secs: u64,
    /// Fetch `/products/{id}` for lines that reference a product, to pick up
    /// power attributes the line itself does not carry.
    pub product_lookup: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_HOLDED_BASE_URL.to_string(),
            use_bearer: false,
            page_limit: DEFAULT_PAGE_LIMIT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            product_lookup: true,
        }
    }
}

impl SourceSettings {
    pub fn from_config_json(config: &Value) -> Result<Self> {
        let mut s = Self::default();
        if let Some(url) = read_str_at(config, "/holded/base_url") {
            s.base_url = url;
        }
        if let Some(b) = read_bool_at(config, "/holded/use_bearer")? {
            s.use_bearer = b;
        }
        if let Some(n) = read_u64_at(config, "/holded/page_limit")? {
            if n == 0 {
                bail!("CONFIG_INVALID /holded/page_limit: must be > 0");
            }
            s.page_limit = n;
        }
        if let Some(n) = read_u64_at(config, "/holded/timeout_secs")? {
            s.timeout_secs = n;
        }
        if let Some(b) = read_bool_at(config, "/holded/product_lookup")? {
            s.product_lookup = b;
        }
        Ok(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSettings {
    pub path: String,
}

impl Default for StateSettings {
    fn default() -> Self {
        Self {
            path: DEFAULT_STATE_PATH.to_string(),
        }
    }
}

impl StateSettings {
    pub fn from_config_json(config: &Value) -> Self {
        Self {
            path: read_str_at(config, "/state/path").unwrap_or_else(|| DEFAULT_STATE_PATH.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn source_defaults() {
        let s = SourceSettings::from_config_json(&json!({})).unwrap();
        assert_eq!(s, SourceSettings::default());
        assert_eq!(s.page_limit, 200);
    }

    #[test]
    fn source_overrides() {
        let s = SourceSettings::from_config_json(&json!({
            "holded": {"base_url": "http://localhost:9", "use_bearer": true, "page_limit": "50"}
        }))
        .unwrap();
        assert_eq!(s.base_url, "http://localhost:9");
        assert!(s.use_bearer);
        assert_eq!(s.page_limit, 50);
    }

    #[test]
    fn zero_page_limit_rejected() {
        assert!(SourceSettings::from_config_json(&json!({"holded": {"page_limit": 0}})).is_err());
    }

    #[test]
    fn state_path_default_and_override() {
        assert_eq!(StateSettings::from_config_json(&json!({})).path, DEFAULT_STATE_PATH);
        assert_eq!(
            StateSettings::from_config_json(&json!({"state": {"path": "/tmp/s.json"}})).path,
            "/tmp/s.json"
        );
    }
}
