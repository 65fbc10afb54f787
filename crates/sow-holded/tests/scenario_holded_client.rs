use httpmock::prelude::*;
use serde_json::json;
use sow_config::SourceSettings;
use sow_holded::*;

fn client(server: &MockServer, page_limit: u64, product_lookup: bool) -> HoldedClient {
    let settings = SourceSettings {
        base_url: server.base_url(),
        use_bearer: false,
        page_limit,
        timeout_secs: 5,
        product_lookup,
    };
    HoldedClient::new(settings, "test-key", vec!["power_w".to_string()]).unwrap()
}

#[test]
fn scenario_fetch_order_sends_key_header() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/documents/salesorder/so1")
            .header("key", "test-key");
        then.status(200).json_body(json!({
            "id": "so1", "contactName": "ACME", "status": 1,
            "products": [{"name": "Panel A605", "units": 36, "price": 60.5}]
        }));
    });

    let f = client(&server, 200, false).fetch_order("so1").unwrap();
    m.assert();
    assert_eq!(f.order.order_id, "so1");
    assert_eq!(f.order.lines.len(), 1);
    assert_eq!(f.raw["contactName"], "ACME");
}

#[test]
fn scenario_fetch_order_falls_back_to_generic_documents_on_404() {
    let server = MockServer::start();
    let primary = server.mock(|when, then| {
        when.method(GET).path("/documents/salesorder/so2");
        then.status(404).body("not found");
    });
    let fallback = server.mock(|when, then| {
        when.method(GET).path("/documents/so2");
        then.status(200).json_body(json!({"_id": "so2", "status": "0"}));
    });

    let f = client(&server, 200, false).fetch_order("so2").unwrap();
    primary.assert();
    fallback.assert();
    assert_eq!(f.order.status, "0");
}

#[test]
fn scenario_unauthorized_is_distinct() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/documents/salesorder");
        then.status(401).body("{\"info\":\"invalid key\"}");
    });

    let err = client(&server, 200, false)
        .list_orders(&TimeWindow::new(100, 200))
        .unwrap_err();
    assert!(matches!(err, OrderSourceError::Unauthorized(ref m) if m.contains("invalid key")));
}

#[test]
fn scenario_listing_paginates_until_short_page() {
    let server = MockServer::start();
    let p1 = server.mock(|when, then| {
        when.method(GET)
            .path("/documents/salesorder")
            .query_param("page", "1")
            .query_param("limit", "2")
            .query_param("starttmp", "100")
            .query_param("endtmp", "200");
        then.status(200)
            .json_body(json!([{"id": "a", "status": 1}, {"id": "b", "status": 1}]));
    });
    let p2 = server.mock(|when, then| {
        when.method(GET)
            .path("/documents/salesorder")
            .query_param("page", "2");
        then.status(200).json_body(json!([{"id": "c", "status": 2}]));
    });

    let orders = client(&server, 2, false)
        .list_orders(&TimeWindow::new(100, 200))
        .unwrap();
    p1.assert();
    p2.assert();
    let ids: Vec<_> = orders.iter().map(|f| f.order.order_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn scenario_non_array_listing_is_a_decode_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/documents/salesorder");
        then.status(200).json_body(json!({"error": "weird"}));
    });
    let err = client(&server, 200, false)
        .list_orders(&TimeWindow::new(0, 1))
        .unwrap_err();
    assert!(matches!(err, OrderSourceError::Decode(_)));
}

#[test]
fn scenario_server_error_carries_code() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/documents/salesorder/so9");
        then.status(503).body("maintenance");
    });
    let err = client(&server, 200, false).fetch_order("so9").unwrap_err();
    assert!(matches!(err, OrderSourceError::Api { code: 503, .. }));
}

#[test]
fn scenario_product_lookup_is_cached_and_fills_power() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/documents/salesorder");
        then.status(200).json_body(json!([{
            "id": "a", "status": 1,
            "products": [
                {"name": "Panel", "units": 10, "price": 50, "productId": "p1"},
                {"name": "Panel", "units": 5, "price": 50, "productId": "p1"},
                {"name": "Panel", "units": 1, "price": 50, "productId": "p1", "power_w": 410}
            ]
        }]));
    });
    let product = server.mock(|when, then| {
        when.method(GET).path("/products/p1");
        then.status(200)
            .json_body(json!({"id": "p1", "sku": "JAM-455W", "customFields": {"power_w": "455"}}));
    });

    let orders = client(&server, 200, true)
        .list_orders(&TimeWindow::new(0, 1))
        .unwrap();
    product.assert_hits(1);
    let lines = &orders[0].order.lines;
    assert_eq!(lines[0].attributes.get("power_w").map(String::as_str), Some("455"));
    assert_eq!(lines[0].sku.as_deref(), Some("JAM-455W"));
    assert_eq!(lines[2].attributes.get("power_w").map(String::as_str), Some("410"));
}

#[test]
fn scenario_failed_product_lookup_is_not_fatal() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/documents/salesorder/so1");
        then.status(200).json_body(json!({
            "id": "so1", "status": 1,
            "products": [{"name": "Panel A605", "units": 1, "productId": "gone"}]
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/products/gone");
        then.status(404);
    });

    let f = client(&server, 200, true).fetch_order("so1").unwrap();
    assert!(f.order.lines[0].attributes.is_empty());
}

#[test]
fn scenario_bearer_mode_sends_authorization_header() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(GET)
            .path("/documents/salesorder/so1")
            .header("authorization", "Bearer test-key");
        then.status(200).json_body(json!({"id": "so1", "status": 1}));
    });
    let settings = SourceSettings {
        base_url: server.base_url(),
        use_bearer: true,
        ..SourceSettings::default()
    };
    HoldedClient::new(settings, "test-key", Vec::new())
        .unwrap()
        .fetch_order("so1")
        .unwrap();
    m.assert();
}
