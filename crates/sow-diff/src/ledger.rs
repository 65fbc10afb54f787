use sow_config::WatchConfig;
use sow_schemas::StatusMap;

use crate::engine::{decide, Verdict};

/// In-memory copy of the dedup memory for one run.
///
/// Loaded once, updated once per order via [`StatusLedger::observe`], handed
/// back to the store once at the end.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusLedger {
    statuses: StatusMap,
    changed: bool,
}

impl StatusLedger {
    pub fn new(statuses: StatusMap) -> Self {
        Self {
            statuses,
            changed: false,
        }
    }

    pub fn previous(&self, order_id: &str) -> Option<&str> {
        self.statuses.get(order_id).map(String::as_str)
    }

    /// Decide and record in one step.
    pub fn observe(&mut self, order_id: &str, current: &str, cfg: &WatchConfig) -> Verdict {
        let verdict = decide(self.previous(order_id), current, cfg);
        self.record(order_id, &verdict);
        verdict
    }

    pub fn record(&mut self, order_id: &str, verdict: &Verdict) {
        if self.previous(order_id) != Some(verdict.next_status.as_str()) {
            self.statuses
                .insert(order_id.to_string(), verdict.next_status.clone());
            self.changed = true;
        }
    }

    /// True when any recorded value differs from what was loaded.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn statuses(&self) -> &StatusMap {
        &self.statuses
    }

    pub fn into_statuses(self) -> StatusMap {
        self.statuses
    }
}
