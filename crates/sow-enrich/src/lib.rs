//! sow-enrich
//!
//! Line interpretation and order aggregation.
//!
//! Turns loosely structured order lines into derived commercial facts:
//! - module power (explicit attribute, else lexical heuristics over free text)
//! - pricing basis (per watt vs per unit) and the derived unit value
//! - shipping-line detection and first-row-only shipping display
//! - total wattage, pallet count, salesperson attribution
//!
//! Deterministic, pure logic. No IO.

pub mod aggregate;
pub mod line;
pub mod power;

pub use aggregate::{aggregate_order, assign_salesperson, pallet_count, AggregatedOrder};
pub use line::{interpret_line, is_shipping_name, EnrichedLine, PricingBasis};
pub use power::{infer_power, infer_power_from_text, parse_power_attribute, power_rules, PowerRule};
