use sow_config::WatchConfig;
use sow_diff::{decide, Action};
use sow_enrich::aggregate_order;
use sow_notify::{compose, ConsoleNotifier};
use sow_schemas::{OrderLine, RawOrder};

fn raw(status: &str, tags: &[&str], lines: Vec<OrderLine>) -> RawOrder {
    RawOrder {
        order_id: "65b2".to_string(),
        number: Some("SO-0200".to_string()),
        customer_name: "Solar Levante SL".to_string(),
        status: status.to_string(),
        date: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        lines,
    }
}

#[test]
fn scenario_first_seen_accepted_without_power_is_sold_in_units() {
    let cfg = WatchConfig::default();
    let order = aggregate_order(
        &raw("1", &[], vec![OrderLine::new("Inversor Huawei", 2.0, Some(900.0))]),
        &cfg,
    );
    let verdict = decide(None, &order.status, &cfg);
    assert_eq!(verdict.action, Action::Sold);

    let n = compose(&order, verdict.action).unwrap();
    assert_eq!(n.subject, "VENDIDO 2 uds Inversor Huawei a Solar Levante SL");
    assert!(n.html.contains("900,00 €/ud"));
    assert!(n.html.contains(&cfg.default_salesperson));
    assert!(n.text.starts_with("Pedido SO-0200 | Cliente: Solar Levante SL"));
}

#[test]
fn scenario_cancellation_renders_on_console_with_action_prefix() {
    let cfg = WatchConfig::default();
    let order = aggregate_order(
        &raw(
            "2",
            &["tomi"],
            vec![
                OrderLine::new("Panel A605", 72.0, Some(60.5)),
                OrderLine::new("Shipping cost", 1.0, Some(100.0)),
                OrderLine::new("Shipping cost", 1.0, Some(50.0)),
            ],
        ),
        &cfg,
    );
    let verdict = decide(Some("1"), &order.status, &cfg);
    assert_eq!(verdict.action, Action::Cancelled);

    let n = compose(&order, verdict.action).unwrap();
    let printed = ConsoleNotifier::render(&n);
    assert!(printed.starts_with("[cancelled] [CANCELADO] VENDIDO 2 pallets Panel A605 a Solar Levante SL"));
    assert!(printed.contains("Estado: CANCELADO"));
    assert!(printed.contains("Tomás"));
    // one material row and one shipping row carrying the order total
    assert_eq!(printed.matches("Shipping cost").count(), 1);
    assert!(printed.contains("150,00 €"));
}

#[test]
fn scenario_unchanged_status_composes_nothing() {
    let cfg = WatchConfig::default();
    let order = aggregate_order(&raw("1", &[], vec![OrderLine::new("Panel A605", 1.0, None)]), &cfg);
    let verdict = decide(Some("1"), &order.status, &cfg);
    assert_eq!(verdict.action, Action::NoAction);
    assert!(compose(&order, verdict.action).is_none());
}
