//! Typed core configuration.
//!
//! [`WatchConfig`] is built once per run from the merged config JSON and then
//! passed by reference into the line interpreter, the aggregator and the
//! status differ. Every key is optional; defaults are the canonical values.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sow_schemas::StatusVocabulary;
use std::collections::BTreeMap;

use crate::{read_bool_at, read_str_at, read_str_list_at, read_u64_at};

/// 36 modules of 605 W per pallet.
pub const DEFAULT_WATTS_PER_PALLET: u64 = 21_780;

pub const DEFAULT_SALESPERSON: &str = "Juan";

pub const DEFAULT_SHIPPING_NAMES: &[&str] = &[
    "Transporte",
    "Shipping cost",
    "Shipping",
    "Transport",
    "Flete",
    "Portes",
    "Envío",
];

pub const DEFAULT_SALESPERSON_TAGS: &[(&str, &str)] = &[
    ("tomi", "Tomás"),
    ("canet", "Jorge"),
    ("supa", "Susana"),
    ("juanv", "Juan"),
];

pub const DEFAULT_POWER_ATTRIBUTE_KEYS: &[&str] =
    &["power_w", "Potencia", "potencia_w", "power", "watt", "W"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    pub watts_per_pallet: u64,
    /// Line names (or name prefixes) that mark a shipping charge.
    pub shipping_names: Vec<String>,
    /// Lowercased tag -> salesperson display name.
    pub salesperson_tags: BTreeMap<String, String>,
    pub default_salesperson: String,
    /// Attribute keys searched, in order, for an explicit power value.
    pub power_attribute_keys: Vec<String>,
    pub status_vocabulary: StatusVocabulary,
    /// Whether an order seen for the first time already cancelled notifies.
    pub notify_first_seen_cancelled: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            watts_per_pallet: DEFAULT_WATTS_PER_PALLET,
            shipping_names: DEFAULT_SHIPPING_NAMES.iter().map(|s| s.to_string()).collect(),
            salesperson_tags: DEFAULT_SALESPERSON_TAGS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            default_salesperson: DEFAULT_SALESPERSON.to_string(),
            power_attribute_keys: DEFAULT_POWER_ATTRIBUTE_KEYS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            status_vocabulary: StatusVocabulary::default(),
            notify_first_seen_cancelled: true,
        }
    }
}

impl WatchConfig {
    /// Read the core sections of a merged config document.
    pub fn from_config_json(config: &Value) -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(w) = read_u64_at(config, "/pallets/watts_per_pallet")? {
            cfg.watts_per_pallet = w;
        }
        if let Some(names) = read_str_list_at(config, "/shipping/names")? {
            cfg.shipping_names = names;
        }
        if let Some(name) = read_str_at(config, "/salesperson/default") {
            cfg.default_salesperson = name;
        }
        match config.pointer("/salesperson/tags") {
            None | Some(Value::Null) => {}
            Some(Value::Object(map)) => {
                let mut tags = BTreeMap::new();
                for (tag, name) in map {
                    let Some(name) = name.as_str() else {
                        bail!("CONFIG_INVALID /salesperson/tags/{tag}: expected a string");
                    };
                    tags.insert(tag.trim().to_lowercase(), name.trim().to_string());
                }
                cfg.salesperson_tags = tags;
            }
            Some(other) => bail!("CONFIG_INVALID /salesperson/tags: expected a mapping, got {other}"),
        }
        if let Some(keys) = read_str_list_at(config, "/power/attribute_keys")? {
            cfg.power_attribute_keys = keys;
        }
        if let Some(values) = read_str_list_at(config, "/status/accepted")? {
            cfg.status_vocabulary.accepted = values;
        }
        if let Some(values) = read_str_list_at(config, "/status/cancelled")? {
            cfg.status_vocabulary.cancelled = values;
        }
        if let Some(b) = read_bool_at(config, "/status/notify_first_seen_cancelled")? {
            cfg.notify_first_seen_cancelled = b;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.watts_per_pallet == 0 {
            bail!("CONFIG_INVALID /pallets/watts_per_pallet: must be > 0");
        }
        if self.shipping_names.iter().all(|n| n.trim().is_empty()) {
            bail!("CONFIG_INVALID /shipping/names: vocabulary must not be empty");
        }
        if self.default_salesperson.trim().is_empty() {
            bail!("CONFIG_INVALID /salesperson/default: must not be empty");
        }
        let overlap = self
            .status_vocabulary
            .accepted
            .iter()
            .find(|a| {
                self.status_vocabulary
                    .cancelled
                    .iter()
                    .any(|c| c.trim().eq_ignore_ascii_case(a.trim()))
            });
        if let Some(v) = overlap {
            bail!("CONFIG_INVALID /status: value {v:?} is listed as both accepted and cancelled");
        }
        Ok(())
    }
}
