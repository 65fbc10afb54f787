//! Diagnostic view of one raw order: how each line was read.

use serde::Serialize;
use sow_config::WatchConfig;
use sow_enrich::interpret_line;
use sow_holded::FetchedOrder;
use sow_notify::format::{date_label, fmt_quantity};

#[derive(Debug, Clone, Serialize)]
pub struct InspectLine {
    pub index: usize,
    pub is_shipping: bool,
    pub name: String,
    pub units: f64,
    pub unit_price: Option<f64>,
    pub tags: Vec<String>,
    pub power: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub order_id: String,
    pub number: String,
    pub customer_name: String,
    pub status: String,
    pub date: Option<i64>,
    /// Top-level keys present in the raw document, sorted.
    pub raw_keys: Vec<String>,
    pub lines: Vec<InspectLine>,
}

impl InspectReport {
    pub fn material_count(&self) -> usize {
        self.lines.iter().filter(|l| !l.is_shipping).count()
    }

    pub fn conclusion(&self) -> String {
        let materials = self.material_count();
        if self.lines.is_empty() {
            "no lines found: empty order, header only, or an unexpected document shape".to_string()
        } else if materials == 0 {
            "every line is shipping: notifications will show no material rows".to_string()
        } else {
            format!("{materials} material lines out of {} total", self.lines.len())
        }
    }

    /// Human-readable listing.
    pub fn render(&self) -> String {
        let mut out = format!(
            "ID: {} | Nº: {} | Cliente: {} | Status: {} | Fecha: {}\n",
            self.order_id,
            self.number,
            self.customer_name,
            self.status,
            date_label(self.date)
        );
        out.push_str(&format!(
            "root keys ({}): {}\n",
            self.raw_keys.len(),
            self.raw_keys.join(", ")
        ));
        out.push_str(&format!("lines: {}\n", self.lines.len()));
        if !self.lines.is_empty() {
            out.push_str("idx | shipping | power | units | price     | name                                 | tags\n");
            for l in &self.lines {
                let name: String = l.name.chars().take(36).collect();
                out.push_str(&format!(
                    "{:>3} | {:<8} | {:>5} | {:>5} | {:>9} | {:<36} | {}\n",
                    l.index,
                    if l.is_shipping { "YES" } else { "no" },
                    l.power.map_or_else(|| "-".to_string(), |p| p.to_string()),
                    fmt_quantity(l.units),
                    l.unit_price.map_or_else(|| "-".to_string(), |p| p.to_string()),
                    name,
                    l.tags.join(","),
                ));
            }
        }
        out.push_str(&format!("conclusion: {}\n", self.conclusion()));
        out
    }
}

pub fn inspect_order(fetched: &FetchedOrder, cfg: &WatchConfig) -> InspectReport {
    let o = &fetched.order;
    let mut raw_keys: Vec<String> = fetched
        .raw
        .as_object()
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default();
    raw_keys.sort();

    InspectReport {
        order_id: o.order_id.clone(),
        number: o.display_number().to_string(),
        customer_name: o.customer_name.clone(),
        status: o.status.clone(),
        date: o.date,
        raw_keys,
        lines: o
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let e = interpret_line(line, cfg);
                InspectLine {
                    index: i + 1,
                    is_shipping: e.is_shipping_line,
                    name: line.name.clone(),
                    units: line.quantity,
                    unit_price: line.unit_price,
                    tags: line.tags.clone(),
                    power: e.power,
                }
            })
            .collect(),
    }
}
