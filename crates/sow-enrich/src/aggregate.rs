//! Order aggregator: interpreted lines -> one order-level record.

use serde::{Deserialize, Serialize};
use sow_config::WatchConfig;
use sow_schemas::{RawOrder, Status};

use crate::line::{interpret_line, EnrichedLine};

/// Everything the differ and the composer need to know about one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedOrder {
    pub order_id: String,
    pub number: Option<String>,
    pub customer_name: String,
    pub date: Option<i64>,
    /// Literal remote status; this is what gets persisted.
    pub status: String,
    pub status_class: Status,
    pub lines: Vec<EnrichedLine>,
    /// Whole watts: `power × quantity` summed over lines with a known power.
    pub total_power: u64,
    /// Present iff `total_power > 0`.
    pub pallet_count: Option<u64>,
    /// Basis `pallet_count` was computed with.
    pub watts_per_pallet: u64,
    pub has_shipping: bool,
    pub salesperson: String,
}

impl AggregatedOrder {
    pub fn display_number(&self) -> &str {
        self.number.as_deref().unwrap_or(&self.order_id)
    }

    /// Non-shipping lines, in original order.
    pub fn material_lines(&self) -> impl Iterator<Item = &EnrichedLine> {
        self.lines.iter().filter(|l| !l.is_shipping_line)
    }

    /// Lines that get a table row: every material line plus the first shipping line.
    pub fn displayed_lines(&self) -> impl Iterator<Item = &EnrichedLine> {
        self.lines.iter().filter(|l| l.is_displayed())
    }

    /// Pallets one line would fill on its own, for per-row display.
    pub fn line_pallets(&self, line: &EnrichedLine) -> Option<u64> {
        let watts = line.watts()?;
        pallet_count(watts.round() as u64, self.watts_per_pallet)
    }

    /// Sum of all shipping line totals, hidden lines included.
    pub fn shipping_total(&self) -> f64 {
        self.lines
            .iter()
            .filter(|l| l.is_shipping_line)
            .filter_map(|l| l.line.line_total())
            .sum()
    }

    /// Units across material lines.
    pub fn units_total(&self) -> f64 {
        self.material_lines().map(|l| l.line.quantity.max(0.0)).sum()
    }

    /// Distinct material names, first occurrence order.
    pub fn distinct_materials(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for l in self.material_lines() {
            let name = l.line.name.trim();
            if !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }
}

/// `ceil(total_power / watts_per_pallet)`, absent when there is no power.
pub fn pallet_count(total_power: u64, watts_per_pallet: u64) -> Option<u64> {
    if total_power == 0 || watts_per_pallet == 0 {
        return None;
    }
    Some(total_power.div_ceil(watts_per_pallet))
}

/// First order tag, then line tags in line order, that maps to a known
/// salesperson. Falls back to the configured default.
pub fn assign_salesperson(order: &RawOrder, cfg: &WatchConfig) -> String {
    order
        .tags
        .iter()
        .chain(order.lines.iter().flat_map(|l| l.tags.iter()))
        .find_map(|tag| cfg.salesperson_tags.get(&tag.trim().to_lowercase()))
        .cloned()
        .unwrap_or_else(|| cfg.default_salesperson.clone())
}

pub fn aggregate_order(order: &RawOrder, cfg: &WatchConfig) -> AggregatedOrder {
    let mut lines: Vec<EnrichedLine> = order.lines.iter().map(|l| interpret_line(l, cfg)).collect();

    if let Some(first) = lines.iter_mut().find(|l| l.is_shipping_line) {
        first.show_shipping_in_row = true;
    }
    let has_shipping = lines.iter().any(|l| l.is_shipping_line);

    let watts: f64 = lines.iter().filter_map(EnrichedLine::watts).sum();
    let total_power = if watts.is_finite() && watts > 0.0 {
        watts.round() as u64
    } else {
        0
    };

    AggregatedOrder {
        order_id: order.order_id.clone(),
        number: order.number.clone(),
        customer_name: order.customer_name.clone(),
        date: order.date,
        status: order.status.clone(),
        status_class: cfg.status_vocabulary.classify(&order.status),
        lines,
        total_power,
        pallet_count: pallet_count(total_power, cfg.watts_per_pallet),
        watts_per_pallet: cfg.watts_per_pallet,
        has_shipping,
        salesperson: assign_salesperson(order, cfg),
    }
}
