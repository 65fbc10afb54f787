use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::Value;
use sow_config::SourceSettings;
use sow_schemas::RawOrder;
use tracing::{debug, warn};

use crate::normalize::collect_attributes;
use crate::{normalize_document, FetchedOrder, OrderSource, OrderSourceError, TimeWindow};

/// Longest error body echoed back in an error message.
const MAX_ERROR_BODY: usize = 300;

/// Blocking client for the Holded invoicing API.
pub struct HoldedClient {
    http: Client,
    settings: SourceSettings,
    /// Attribute keys that may carry a power value; used both to pick up
    /// top-level line fields and to skip product lookups that are not needed.
    attribute_keys: Vec<String>,
    /// Product id -> product payload (`None` when the lookup failed). One run.
    products: Mutex<HashMap<String, Option<Value>>>,
}

impl HoldedClient {
    pub fn new(
        settings: SourceSettings,
        api_key: &str,
        attribute_keys: Vec<String>,
    ) -> Result<Self, OrderSourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let (name, value) = if settings.use_bearer {
            (AUTHORIZATION, format!("Bearer {api_key}"))
        } else {
            (reqwest::header::HeaderName::from_static("key"), api_key.to_string())
        };
        let mut value = HeaderValue::from_str(&value)
            .map_err(|_| OrderSourceError::Config("api key is not a valid header value".to_string()))?;
        value.set_sensitive(true);
        headers.insert(name, value);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| OrderSourceError::Config(format!("http client: {e}")))?;

        Ok(Self {
            http,
            settings,
            attribute_keys,
            products: Mutex::new(HashMap::new()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, OrderSourceError> {
        let url = self.url(path);
        debug!(%url, ?query, "GET");
        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| OrderSourceError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| OrderSourceError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(match status {
                StatusCode::UNAUTHORIZED => OrderSourceError::Unauthorized(message),
                StatusCode::NOT_FOUND => OrderSourceError::NotFound(path.to_string()),
                _ => OrderSourceError::Api {
                    code: status.as_u16(),
                    message,
                },
            });
        }

        serde_json::from_str(&body).map_err(|e| OrderSourceError::Decode(format!("{path}: {e}")))
    }

    /// Product payload, fetched at most once per id.
    fn product(&self, product_id: &str) -> Option<Value> {
        let mut cache = self.products.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = cache.get(product_id) {
            return hit.clone();
        }
        let fetched = match self.get_json(&format!("products/{product_id}"), &[]) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(product_id, error = %e, "product lookup failed, continuing without it");
                None
            }
        };
        cache.insert(product_id.to_string(), fetched.clone());
        fetched
    }

    fn has_power_attribute(&self, attrs: &std::collections::BTreeMap<String, String>) -> bool {
        attrs
            .keys()
            .any(|k| self.attribute_keys.iter().any(|a| a.eq_ignore_ascii_case(k)))
    }

    /// Fill in attributes and SKU from the product catalogue for lines that
    /// reference a product but carry no power attribute of their own.
    fn enrich_from_products(&self, order: &mut RawOrder) {
        if !self.settings.product_lookup {
            return;
        }
        for line in &mut order.lines {
            let Some(pid) = line.product_id.clone() else {
                continue;
            };
            if self.has_power_attribute(&line.attributes) {
                continue;
            }
            let Some(product) = self.product(&pid) else {
                continue;
            };
            let Some(obj) = product.as_object() else {
                continue;
            };
            for (k, v) in collect_attributes(obj, &self.attribute_keys) {
                line.attributes.entry(k).or_insert(v);
            }
            if line.sku.is_none() {
                line.sku = obj.get("sku").and_then(crate::normalize::as_text);
            }
        }
    }

    fn fetched(&self, raw: Value) -> Result<FetchedOrder, OrderSourceError> {
        let mut order = normalize_document(&raw, &self.attribute_keys)?;
        self.enrich_from_products(&mut order);
        Ok(FetchedOrder { raw, order })
    }
}

impl OrderSource for HoldedClient {
    fn fetch_order(&self, order_id: &str) -> Result<FetchedOrder, OrderSourceError> {
        let raw = match self.get_json(&format!("documents/salesorder/{order_id}"), &[]) {
            Err(OrderSourceError::NotFound(_)) => {
                debug!(order_id, "not found as salesorder, trying generic documents endpoint");
                self.get_json(&format!("documents/{order_id}"), &[])?
            }
            other => other?,
        };
        self.fetched(raw)
    }

    fn list_orders(&self, window: &TimeWindow) -> Result<Vec<FetchedOrder>, OrderSourceError> {
        let limit = self.settings.page_limit;
        let mut out = Vec::new();
        let mut page: u64 = 1;
        loop {
            let query = [
                ("page", page.to_string()),
                ("limit", limit.to_string()),
                ("starttmp", window.start.to_string()),
                ("endtmp", window.end.to_string()),
            ];
            let batch = match self.get_json("documents/salesorder", &query)? {
                Value::Array(items) => items,
                other => {
                    return Err(OrderSourceError::Decode(format!(
                        "listing page {page}: expected an array, got {}",
                        type_name(&other)
                    )))
                }
            };
            let n = batch.len() as u64;
            debug!(page, n, "listing page");
            for raw in batch {
                out.push(self.fetched(raw)?);
            }
            if n < limit {
                break;
            }
            page += 1;
        }
        Ok(out)
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
