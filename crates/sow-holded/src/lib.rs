//! sow-holded
//!
//! Order source over the Holded invoicing API.
//!
//! - `source`: the [`OrderSource`] trait and its error type
//! - `client`: blocking HTTP implementation with a per-run product cache
//! - `normalize`: tolerant raw JSON -> `RawOrder`
//! - `window`: listing windows with Europe/Madrid calendar days

mod client;
mod normalize;
mod source;
mod window;

pub use client::HoldedClient;
pub use normalize::normalize_document;
pub use source::{FetchedOrder, OrderSource, OrderSourceError};
pub use window::TimeWindow;
