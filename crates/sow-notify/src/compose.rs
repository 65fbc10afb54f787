//! Notification composer: aggregated order + action -> subject and bodies.

use serde::{Deserialize, Serialize};
use sow_diff::Action;
use sow_enrich::AggregatedOrder;

use crate::format::{date_label, escape_html, fmt_eur, fmt_price, fmt_quantity};

/// Table columns, in display order.
pub const COLUMNS: [&str; 9] = [
    "Fecha reserva",
    "Material",
    "Potencia (W)",
    "Cantidad uds",
    "Nº Pallets",
    "Cliente",
    "Precio",
    "Transporte",
    "Comercial",
];

/// A composed, transport-agnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub order_id: String,
    pub action: Action,
    pub subject: String,
    pub html: String,
    /// Plain-text rendition of the same table.
    pub text: String,
}

fn action_label(action: Action) -> &'static str {
    match action {
        Action::Sold => "VENDIDO",
        Action::Cancelled => "CANCELADO",
        Action::Reopened => "REABIERTO",
        Action::NoAction => "-",
    }
}

/// First material name, with `(+N más)` when there are other materials.
pub fn material_label(order: &AggregatedOrder) -> String {
    let distinct = order.distinct_materials();
    match distinct.split_first() {
        Some((first, [])) => first.to_string(),
        Some((first, rest)) => format!("{first} (+{} más)", rest.len()),
        None if order.has_shipping => "Transporte".to_string(),
        None => "Sin líneas".to_string(),
    }
}

fn sold_text(order: &AggregatedOrder) -> String {
    let (count, word) = match order.pallet_count {
        Some(n) => (n.to_string(), if n == 1 { "pallet" } else { "pallets" }),
        None => {
            let units = order.units_total();
            (fmt_quantity(units), if units == 1.0 { "ud" } else { "uds" })
        }
    };
    format!(
        "VENDIDO {count} {word} {} a {}",
        material_label(order),
        order.customer_name
    )
}

/// Subject line for `action`, `None` for [`Action::NoAction`].
pub fn subject_for(order: &AggregatedOrder, action: Action) -> Option<String> {
    let sold = sold_text(order);
    match action {
        Action::NoAction => None,
        Action::Sold => Some(sold),
        Action::Cancelled => Some(format!("[CANCELADO] {sold}")),
        Action::Reopened => Some(format!("{sold} (REABIERTO)")),
    }
}

/// One display row per displayed line, cells in [`COLUMNS`] order.
fn rows(order: &AggregatedOrder) -> Vec<[String; 9]> {
    let date = date_label(order.date);
    let shipping_total = fmt_eur(order.shipping_total(), 2);
    order
        .displayed_lines()
        .map(|l| {
            [
                date.clone(),
                l.line.name.clone(),
                l.power.map_or_else(|| "-".to_string(), |p| p.to_string()),
                fmt_quantity(l.line.quantity),
                order
                    .line_pallets(l)
                    .map_or_else(|| "-".to_string(), |p| p.to_string()),
                order.customer_name.clone(),
                fmt_price(l.derived_unit_value, l.pricing_basis),
                if l.is_shipping_line {
                    shipping_total.clone()
                } else {
                    "-".to_string()
                },
                order.salesperson.clone(),
            ]
        })
        .collect()
}

fn render_html(order: &AggregatedOrder, action: Action, rows: &[[String; 9]]) -> String {
    let mut html = String::new();
    html.push_str("<div style='font-family:system-ui,Segoe UI,Roboto,Arial,sans-serif'>");
    html.push_str(&format!(
        "<h3 style='margin:0 0 8px'>Reserva de material — Pedido {}</h3>",
        escape_html(order.display_number())
    ));
    html.push_str(&format!(
        "<p style='margin:0 0 10px'>Cliente: <b>{}</b> &nbsp;|&nbsp; Fecha: <b>{}</b> \
         &nbsp;|&nbsp; Transporte: <b>{}</b> &nbsp;|&nbsp; Estado: <b>{}</b></p>",
        escape_html(&order.customer_name),
        date_label(order.date),
        fmt_eur(order.shipping_total(), 2),
        action_label(action),
    ));
    html.push_str(
        "<table border='1' cellspacing='0' cellpadding='6' style='border-collapse:collapse'><thead><tr>",
    );
    for h in COLUMNS {
        html.push_str(&format!("<th>{h}</th>"));
    }
    html.push_str("</tr></thead><tbody>");
    if rows.is_empty() {
        html.push_str("<tr><td colspan=9>Sin líneas</td></tr>");
    }
    for row in rows {
        html.push_str("<tr>");
        for (i, cell) in row.iter().enumerate() {
            // Numeric columns are right-aligned.
            if matches!(i, 2 | 3 | 4 | 6 | 7) {
                html.push_str(&format!("<td style='text-align:right'>{}</td>", escape_html(cell)));
            } else {
                html.push_str(&format!("<td>{}</td>", escape_html(cell)));
            }
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table></div>");
    html
}

fn pad_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths.iter())
        .map(|(c, &w)| format!("{c:<w$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

fn render_text(order: &AggregatedOrder, action: Action, rows: &[[String; 9]]) -> String {
    let mut out = format!(
        "Pedido {} | Cliente: {} | Fecha: {} | Transporte: {} | Estado: {}\n",
        order.display_number(),
        order.customer_name,
        date_label(order.date),
        fmt_eur(order.shipping_total(), 2),
        action_label(action),
    );
    if rows.is_empty() {
        out.push_str("No hay líneas que mostrar.\n");
        return out;
    }

    let mut widths = COLUMNS.map(|h| h.chars().count());
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }
    out.push_str(&pad_row(COLUMNS.iter().copied(), &widths));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in rows {
        out.push_str(&pad_row(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

/// Compose the notification for `action`. Returns `None` for
/// [`Action::NoAction`]; the caller never has to special-case it.
pub fn compose(order: &AggregatedOrder, action: Action) -> Option<Notification> {
    let subject = subject_for(order, action)?;
    let rows = rows(order);
    Some(Notification {
        order_id: order.order_id.clone(),
        action,
        subject,
        html: render_html(order, action, &rows),
        text: render_text(order, action, &rows),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sow_config::WatchConfig;
    use sow_enrich::aggregate_order;
    use sow_schemas::{OrderLine, RawOrder};

    fn order(lines: Vec<OrderLine>) -> AggregatedOrder {
        let raw = RawOrder {
            order_id: "65a1".to_string(),
            number: Some("SO-0142".to_string()),
            customer_name: "Solar Levante SL".to_string(),
            status: "1".to_string(),
            date: Some(1_735_689_600),
            tags: vec!["tomi".to_string()],
            lines,
        };
        aggregate_order(&raw, &WatchConfig::default())
    }

    #[test]
    fn sold_subject_with_pallets() {
        let o = order(vec![OrderLine::new("Panel A605", 720.0, Some(60.5))]);
        assert_eq!(
            subject_for(&o, Action::Sold).unwrap(),
            "VENDIDO 20 pallets Panel A605 a Solar Levante SL"
        );
    }

    #[test]
    fn singular_words() {
        let o = order(vec![OrderLine::new("Panel A605", 36.0, Some(60.5))]);
        assert_eq!(
            subject_for(&o, Action::Sold).unwrap(),
            "VENDIDO 1 pallet Panel A605 a Solar Levante SL"
        );
        let o = order(vec![OrderLine::new("Inversor", 1.0, Some(900.0))]);
        assert_eq!(
            subject_for(&o, Action::Sold).unwrap(),
            "VENDIDO 1 ud Inversor a Solar Levante SL"
        );
    }

    #[test]
    fn cancelled_and_reopened_wrap_the_sold_text() {
        let o = order(vec![OrderLine::new("Panel Model X", 4.0, Some(25.0))]);
        assert_eq!(
            subject_for(&o, Action::Cancelled).unwrap(),
            "[CANCELADO] VENDIDO 4 uds Panel Model X a Solar Levante SL"
        );
        assert_eq!(
            subject_for(&o, Action::Reopened).unwrap(),
            "VENDIDO 4 uds Panel Model X a Solar Levante SL (REABIERTO)"
        );
        assert_eq!(subject_for(&o, Action::NoAction), None);
        assert!(compose(&o, Action::NoAction).is_none());
    }

    #[test]
    fn material_label_variants() {
        let o = order(vec![
            OrderLine::new("Panel A605", 10.0, None),
            OrderLine::new("Inversor", 1.0, None),
            OrderLine::new("Estructura", 1.0, None),
        ]);
        assert_eq!(material_label(&o), "Panel A605 (+2 más)");
        assert_eq!(material_label(&order(vec![OrderLine::new("Transporte", 1.0, None)])), "Transporte");
        assert_eq!(material_label(&order(Vec::new())), "Sin líneas");
    }

    #[test]
    fn table_rows_and_shipping_column() {
        let o = order(vec![
            OrderLine::new("Shipping cost", 1.0, Some(100.0)),
            OrderLine::new("Panel A605", 36.0, Some(60.5)),
            OrderLine::new("Shipping cost", 1.0, Some(50.0)),
        ]);
        let n = compose(&o, Action::Sold).unwrap();
        assert_eq!(n.order_id, "65a1");
        assert_eq!(n.html.matches("<tr>").count(), 1 + 2);
        assert!(n.html.contains("Pedido SO-0142"));
        assert!(n.html.contains("150,00 €"));
        assert!(n.html.contains("0,1000 €/W"));
        assert!(n.html.contains("Tomás"));

        let lines: Vec<&str> = n.text.lines().collect();
        // header paragraph, column header, separator, two rows
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("Fecha reserva"));
        assert!(lines[3].contains("Shipping cost"));
        assert!(lines[3].contains("150,00 €"));
        assert!(lines[4].contains("Panel A605"));
        assert!(lines[4].contains("605"));
    }

    #[test]
    fn html_escapes_customer_text() {
        let mut o = order(vec![OrderLine::new("Panel <b>", 1.0, None)]);
        o.customer_name = "A&B".to_string();
        let n = compose(&o, Action::Sold).unwrap();
        assert!(n.html.contains("A&amp;B"));
        assert!(n.html.contains("Panel &lt;b&gt;"));
    }
}
