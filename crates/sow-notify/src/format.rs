//! Spanish-locale display helpers.

use chrono::DateTime;
use chrono_tz::Europe::Madrid;
use sow_enrich::PricingBasis;

/// `1234.56, 4` -> `1.234,5600 €`.
pub fn fmt_eur(value: f64, decimals: usize) -> String {
    format!("{} €", fmt_number(value, decimals))
}

/// Thousands separated by `.`, decimals by `,`.
pub fn fmt_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let negative = value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push(',');
        out.push_str(f);
    }
    out
}

/// Unit value with its basis label, e.g. `0,1000 €/W` or `25,00 €/ud`.
pub fn fmt_price(value: Option<f64>, basis: PricingBasis) -> String {
    match value {
        Some(v) => format!("{} {}", fmt_number(v, basis.decimals()), basis.unit_label()),
        None => "-".to_string(),
    }
}

/// Whole quantities without decimals, fractional ones with up to two.
pub fn fmt_quantity(q: f64) -> String {
    if q.fract() == 0.0 {
        fmt_number(q, 0)
    } else {
        let s = fmt_number(q, 2);
        s.trim_end_matches('0').trim_end_matches(',').to_string()
    }
}

/// Epoch seconds as a Europe/Madrid wall-clock label.
pub fn date_label(epoch_secs: Option<i64>) -> String {
    epoch_secs
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map(|dt| dt.with_timezone(&Madrid).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
