//! sow-schemas
//!
//! Shared raw data model for sales orders as handed over by an order source.
//! Everything here is plain data: no IO, no inference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One product or charge entry of an order, exactly as read from the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    /// Product reference code, when the source carries one.
    #[serde(default)]
    pub sku: Option<String>,
    /// Remote product id, used only for attribute lookups.
    #[serde(default)]
    pub product_id: Option<String>,
    pub quantity: f64,
    /// Price per unit. `None` when the source left it out.
    #[serde(default)]
    pub unit_price: Option<f64>,
    /// Attribute name -> value (custom fields, product attributes).
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl OrderLine {
    pub fn new(name: impl Into<String>, quantity: f64, unit_price: Option<f64>) -> Self {
        Self {
            name: name.into(),
            sku: None,
            product_id: None,
            quantity,
            unit_price,
            attributes: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// `quantity * unit_price`, or `None` when the price is missing.
    pub fn line_total(&self) -> Option<f64> {
        self.unit_price.map(|p| p * self.quantity)
    }
}

/// A sales order document, normalized from whatever shape the source uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOrder {
    pub order_id: String,
    /// Human document number (e.g. `SO-2025-0142`), display only.
    #[serde(default)]
    pub number: Option<String>,
    pub customer_name: String,
    /// Literal status value as reported by the remote service.
    pub status: String,
    /// Document date, UTC epoch seconds.
    #[serde(default)]
    pub date: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub lines: Vec<OrderLine>,
}

impl RawOrder {
    pub fn display_number(&self) -> &str {
        self.number.as_deref().unwrap_or(&self.order_id)
    }
}

/// Persisted dedup memory: order id -> last seen literal status.
pub type StatusMap = BTreeMap<String, String>;

/// Three-way classification of a remote status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Pending,
    Accepted,
    Cancelled,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "PENDING",
            Status::Accepted => "ACCEPTED",
            Status::Cancelled => "CANCELLED",
        }
    }

    /// Pending and Accepted are the same class for transition purposes.
    pub fn is_active(&self) -> bool {
        !matches!(self, Status::Cancelled)
    }
}

/// Maps the remote service's status vocabulary onto [`Status`].
///
/// Matching is case-insensitive on trimmed values. Anything that is neither a
/// cancelled nor an accepted value classifies as `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusVocabulary {
    pub accepted: Vec<String>,
    pub cancelled: Vec<String>,
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        Self {
            accepted: vec!["1".to_string(), "accepted".to_string()],
            cancelled: vec![
                "2".to_string(),
                "cancelled".to_string(),
                "canceled".to_string(),
            ],
        }
    }
}

impl StatusVocabulary {
    pub fn classify(&self, raw: &str) -> Status {
        let needle = raw.trim();
        let hit = |values: &[String]| values.iter().any(|v| v.trim().eq_ignore_ascii_case(needle));
        if hit(&self.cancelled) {
            Status::Cancelled
        } else if hit(&self.accepted) {
            Status::Accepted
        } else {
            Status::Pending
        }
    }
}
