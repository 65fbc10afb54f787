//! Line interpreter: one raw [`OrderLine`] -> one [`EnrichedLine`].

use serde::{Deserialize, Serialize};
use sow_config::WatchConfig;
use sow_schemas::OrderLine;

use crate::power::infer_power;

/// How the unit value of a line is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingBasis {
    PerWatt,
    PerUnit,
}

impl PricingBasis {
    /// Determined solely by power presence.
    pub fn for_power(power: Option<u32>) -> Self {
        if power.is_some() {
            PricingBasis::PerWatt
        } else {
            PricingBasis::PerUnit
        }
    }

    pub fn unit_label(&self) -> &'static str {
        match self {
            PricingBasis::PerWatt => "€/W",
            PricingBasis::PerUnit => "€/ud",
        }
    }

    /// Display precision for values of this basis.
    pub fn decimals(&self) -> usize {
        match self {
            PricingBasis::PerWatt => 4,
            PricingBasis::PerUnit => 2,
        }
    }
}

/// An order line plus everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedLine {
    pub line: OrderLine,
    pub power: Option<u32>,
    pub pricing_basis: PricingBasis,
    /// €/W or €/ud depending on `pricing_basis`. `None` when the line has no
    /// usable quantity or no price.
    pub derived_unit_value: Option<f64>,
    pub is_shipping_line: bool,
    /// Set by the aggregator: true only for the first shipping line of an order.
    pub show_shipping_in_row: bool,
}

impl EnrichedLine {
    /// Wattage this line contributes to the order (`power * quantity`).
    pub fn watts(&self) -> Option<f64> {
        let p = self.power?;
        (self.line.quantity > 0.0).then(|| f64::from(p) * self.line.quantity)
    }

    /// Whether the line gets a row in the notification table.
    pub fn is_displayed(&self) -> bool {
        !self.is_shipping_line || self.show_shipping_in_row
    }
}

/// Case-insensitive exact-or-prefix match of a line name against the
/// shipping vocabulary.
pub fn is_shipping_name(name: &str, vocabulary: &[String]) -> bool {
    let n = name.trim().to_lowercase();
    if n.is_empty() {
        return false;
    }
    vocabulary
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .any(|v| n.starts_with(&v))
}

fn derived_unit_value(line: &OrderLine, power: Option<u32>) -> Option<f64> {
    let qty = line.quantity;
    if !qty.is_finite() || qty <= 0.0 {
        return None;
    }
    let total = line.line_total()?;
    let divisor = match power {
        Some(p) => f64::from(p) * qty,
        None => qty,
    };
    let v = total / divisor;
    v.is_finite().then_some(v)
}

/// Interpret one line. `show_shipping_in_row` is left false; only the
/// aggregator, which sees the whole order, can decide it.
pub fn interpret_line(line: &OrderLine, cfg: &WatchConfig) -> EnrichedLine {
    let power = infer_power(line, &cfg.power_attribute_keys);
    EnrichedLine {
        line: line.clone(),
        power,
        pricing_basis: PricingBasis::for_power(power),
        derived_unit_value: derived_unit_value(line, power),
        is_shipping_line: is_shipping_name(&line.name, &cfg.shipping_names),
        show_shipping_in_row: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> WatchConfig {
        WatchConfig::default()
    }

    #[test]
    fn powered_line_is_priced_per_watt() {
        let e = interpret_line(&OrderLine::new("AIKO 605W", 720.0, Some(60.5)), &cfg());
        assert_eq!(e.power, Some(605));
        assert_eq!(e.pricing_basis, PricingBasis::PerWatt);
        let v = e.derived_unit_value.unwrap();
        assert!((v - 0.1).abs() < 1e-12, "got {v}");
        assert_eq!(e.watts(), Some(435_600.0));
    }

    #[test]
    fn unpowered_line_is_priced_per_unit() {
        let e = interpret_line(&OrderLine::new("Panel Model X", 4.0, Some(25.0)), &cfg());
        assert_eq!(e.power, None);
        assert_eq!(e.pricing_basis, PricingBasis::PerUnit);
        assert_eq!(e.derived_unit_value, Some(25.0));
        assert_eq!(e.watts(), None);
    }

    #[test]
    fn zero_quantity_leaves_value_unset() {
        let e = interpret_line(&OrderLine::new("Panel A605", 0.0, Some(60.0)), &cfg());
        assert_eq!(e.power, Some(605));
        assert_eq!(e.derived_unit_value, None);
        assert_eq!(e.watts(), None);
    }

    #[test]
    fn missing_price_leaves_value_unset() {
        let e = interpret_line(&OrderLine::new("Panel A605", 10.0, None), &cfg());
        assert_eq!(e.derived_unit_value, None);
    }

    #[test]
    fn zero_price_is_a_real_value() {
        let e = interpret_line(&OrderLine::new("Muestra gratuita", 2.0, Some(0.0)), &cfg());
        assert_eq!(e.derived_unit_value, Some(0.0));
    }

    #[test]
    fn shipping_vocabulary_matches_exact_and_prefix_case_insensitive() {
        let vocab = cfg().shipping_names;
        assert!(is_shipping_name("Transporte", &vocab));
        assert!(is_shipping_name("  TRANSPORTE  ", &vocab));
        assert!(is_shipping_name("Shipping cost", &vocab));
        assert!(is_shipping_name("shipping costs", &vocab));
        assert!(is_shipping_name("Portes Valencia", &vocab));
        assert!(is_shipping_name("ENVÍO urgente", &vocab));
        assert!(!is_shipping_name("Panel A605", &vocab));
        assert!(!is_shipping_name("Coste de transporte", &vocab));
        assert!(!is_shipping_name("", &vocab));
    }

    #[test]
    fn shipping_line_is_flagged_but_not_displayed_by_default() {
        let e = interpret_line(&OrderLine::new("Transporte", 1.0, Some(350.0)), &cfg());
        assert!(e.is_shipping_line);
        assert!(!e.show_shipping_in_row);
        assert!(!e.is_displayed());
    }

    #[test]
    fn basis_labels() {
        assert_eq!(PricingBasis::PerWatt.unit_label(), "€/W");
        assert_eq!(PricingBasis::PerUnit.decimals(), 2);
    }
}
