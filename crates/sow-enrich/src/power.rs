//! Power (watts) inference.
//!
//! Order of precedence for one line:
//! 1. an explicit attribute (configured keys, in order) holding a positive number;
//! 2. the ordered [`power_rules`] applied to the line name, then to its SKU.
//!
//! Absence is reported as `None`, never as zero.

use regex::Regex;
use sow_schemas::OrderLine;
use std::sync::LazyLock;

/// One lexical rule: capture group 1 holds the wattage digits.
#[derive(Debug)]
pub struct PowerRule {
    pub name: &'static str,
    pattern: Regex,
}

impl PowerRule {
    /// Leftmost positive match of this rule in `text`.
    pub fn find(&self, text: &str) -> Option<u32> {
        self.pattern
            .captures_iter(text)
            .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
            .find(|w| *w > 0)
    }
}

static POWER_RULES: LazyLock<Vec<PowerRule>> = LazyLock::new(|| {
    vec![
        // `605W`, `Panel 450W bifacial`: 1-4 digits glued to an upper-case W.
        PowerRule {
            name: "watts-suffix",
            pattern: Regex::new(r"(?:^|[^0-9])([0-9]{1,4})W").expect("static pattern"),
        },
        // `A605`: model code starting a word, the digits being the wattage.
        // An `A` inside a word (`XA605`) is not a model prefix.
        PowerRule {
            name: "a-model-code",
            pattern: Regex::new(r"(?:^|[^0-9A-Za-z])A([0-9]{1,4})(?:[^0-9]|$)")
                .expect("static pattern"),
        },
    ]
});

/// The ordered rule list used by [`infer_power_from_text`].
pub fn power_rules() -> &'static [PowerRule] {
    &POWER_RULES
}

/// Best-effort wattage from free text. The first rule that matches wins;
/// within a rule the leftmost occurrence wins.
pub fn infer_power_from_text(text: &str) -> Option<u32> {
    power_rules().iter().find_map(|rule| rule.find(text))
}

/// Parse an attribute value such as `605`, `"605 W"`, `"605,0"`.
/// Non-positive or unparsable values yield `None`.
pub fn parse_power_attribute(raw: &str) -> Option<u32> {
    let t = raw.trim();
    let t = t
        .strip_suffix(|c: char| c == 'W' || c == 'w')
        .map(str::trim_end)
        .unwrap_or(t)
        .replace(',', ".");
    let v: f64 = t.parse().ok()?;
    if !v.is_finite() || v < 0.5 || v > f64::from(u32::MAX) {
        return None;
    }
    Some(v.round() as u32)
}

/// Power for one line: explicit attribute first, then name, then SKU.
pub fn infer_power(line: &OrderLine, attribute_keys: &[String]) -> Option<u32> {
    let from_attribute = attribute_keys.iter().find_map(|key| {
        line.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .and_then(|(_, v)| parse_power_attribute(v))
    });
    if from_attribute.is_some() {
        return from_attribute;
    }

    infer_power_from_text(&line.name)
        .or_else(|| line.sku.as_deref().and_then(infer_power_from_text))
}
