//! sow-diff
//!
//! Status differ: previously recorded status + current status -> action.
//!
//! - First sighting of an active order notifies "sold"
//! - Active -> Cancelled notifies "cancelled"; Cancelled -> Active notifies "reopened"
//! - Same class on both sides is silent, whatever the literal values
//! - Every verdict carries the current literal status to persist
//!
//! Deterministic, pure logic. No IO.

mod engine;
mod ledger;

pub use engine::{decide, Action, Verdict};
pub use ledger::StatusLedger;
