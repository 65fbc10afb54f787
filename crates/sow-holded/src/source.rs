//! Order source boundary.

use serde_json::Value;
use sow_schemas::RawOrder;

use crate::TimeWindow;

/// Errors an [`OrderSource`] may return. None of them is retried.
#[derive(Debug, thiserror::Error)]
pub enum OrderSourceError {
    /// Network or transport failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Credentials rejected (HTTP 401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// Any other non-success response.
    #[error("source api error code={code}: {message}")]
    Api { code: u16, message: String },
    /// A response payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
    #[error("config error: {0}")]
    Config(String),
}

/// One document as fetched: the raw payload (for dumps and diagnostics) and
/// its normalized form.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedOrder {
    pub raw: Value,
    pub order: RawOrder,
}

/// Remote order-management service.
pub trait OrderSource {
    /// One sales order by id.
    fn fetch_order(&self, order_id: &str) -> Result<FetchedOrder, OrderSourceError>;

    /// Every sales order dated inside `window`, in the order the service
    /// returns them. Callers dedupe and sort.
    fn list_orders(&self, window: &TimeWindow) -> Result<Vec<FetchedOrder>, OrderSourceError>;
}
