//! sow-runtime
//!
//! One watcher run, start to finish:
//! load store -> fetch -> select -> aggregate -> diff -> notify -> save.
//!
//! Single-threaded and run-to-completion. Any fatal error aborts the run
//! before the store is written, so the next run decides from the last
//! known-good mapping.

mod fetch;
mod inspect;
mod select;
mod watcher;

pub use fetch::{fetch_orders, FetchMode};
pub use inspect::{inspect_order, InspectLine, InspectReport};
pub use select::select_orders;
pub use watcher::{dump_raw_documents, run_once, RunOptions, RunReport};
