use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sow_holded::{FetchedOrder, OrderSource, TimeWindow};
use tracing::info;

/// Which documents a run looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchMode {
    /// One document by id.
    DocId(String),
    /// Documents dated in the last N minutes.
    Minutes(u32),
    /// Today plus N previous Madrid calendar days, one listing per day.
    Days(u32),
    /// 1 January (Madrid) until now.
    YearToDate,
}

impl FetchMode {
    /// Listing windows for this mode; empty for [`FetchMode::DocId`].
    pub fn windows(&self, now: DateTime<Utc>) -> Vec<TimeWindow> {
        match self {
            FetchMode::DocId(_) => Vec::new(),
            FetchMode::Minutes(m) => vec![TimeWindow::last_minutes(now, *m)],
            FetchMode::Days(n) => TimeWindow::recent_days(now, *n),
            FetchMode::YearToDate => TimeWindow::year_to_date(now).into_iter().collect(),
        }
    }
}

pub fn fetch_orders(source: &dyn OrderSource, mode: &FetchMode, now: DateTime<Utc>) -> Result<Vec<FetchedOrder>> {
    if let FetchMode::DocId(id) = mode {
        let f = source
            .fetch_order(id)
            .with_context(|| format!("ORDER_FETCH_FAILED: document {id}"))?;
        return Ok(vec![f]);
    }

    let mut out = Vec::new();
    for w in mode.windows(now) {
        let batch = source
            .list_orders(&w)
            .with_context(|| format!("ORDER_LIST_FAILED: window {}..{}", w.start, w.end))?;
        info!(start = w.start, end = w.end, orders = batch.len(), "listed orders");
        out.extend(batch);
    }
    Ok(out)
}
