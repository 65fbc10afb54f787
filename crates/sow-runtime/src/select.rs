use std::collections::HashSet;

use sow_holded::FetchedOrder;

/// Dedupe by order id (first occurrence wins), newest first, at most `limit`.
///
/// Orders without a date sort after dated ones; ties keep fetch order.
pub fn select_orders(orders: Vec<FetchedOrder>, limit: usize) -> Vec<FetchedOrder> {
    let mut seen = HashSet::new();
    let mut out: Vec<FetchedOrder> = orders
        .into_iter()
        .filter(|f| seen.insert(f.order.order_id.clone()))
        .collect();
    out.sort_by(|a, b| b.order.date.cmp(&a.order.date));
    out.truncate(limit);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sow_schemas::RawOrder;

    fn fetched(id: &str, date: Option<i64>, status: &str) -> FetchedOrder {
        FetchedOrder {
            raw: json!({"id": id}),
            order: RawOrder {
                order_id: id.to_string(),
                number: None,
                customer_name: "-".to_string(),
                status: status.to_string(),
                date,
                tags: Vec::new(),
                lines: Vec::new(),
            },
        }
    }

    #[test]
    fn dedupes_first_wins_and_sorts_desc() {
        let got = select_orders(
            vec![
                fetched("a", Some(10), "1"),
                fetched("b", Some(30), "1"),
                fetched("a", Some(99), "2"),
                fetched("c", None, "1"),
                fetched("d", Some(20), "1"),
            ],
            10,
        );
        let ids: Vec<_> = got.iter().map(|f| f.order.order_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
        assert_eq!(got[2].order.status, "1");
    }

    #[test]
    fn truncates_to_limit() {
        let got = select_orders(
            (0..5).map(|i| fetched(&i.to_string(), Some(i), "1")).collect(),
            2,
        );
        let ids: Vec<_> = got.iter().map(|f| f.order.order_id.as_str()).collect();
        assert_eq!(ids, vec!["4", "3"]);
    }
}
