use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sow_config::WatchConfig;
use sow_diff::{Action, StatusLedger};
use sow_enrich::aggregate_order;
use sow_holded::{FetchedOrder, OrderSource};
use sow_notify::{compose, Notifier};
use sow_state::StateStore;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{fetch_orders, select_orders, FetchMode};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub mode: FetchMode,
    /// Upper bound on orders processed, applied after dedupe and sort.
    pub limit: usize,
    /// Compose and deliver, but never write the store.
    pub dry_run: bool,
    /// When set, each selected raw document is written to `{base}_{id}.json`.
    pub dump_json: Option<PathBuf>,
}

/// What one run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub fetched: usize,
    pub selected: usize,
    /// Action label -> count, `none` included.
    pub actions: BTreeMap<&'static str, usize>,
    pub notifications_sent: usize,
    pub state_saved: bool,
    pub dumped: Vec<PathBuf>,
}

impl RunReport {
    pub fn count(&self, action: Action) -> usize {
        self.actions.get(action.as_str()).copied().unwrap_or(0)
    }
}

/// `{base}_{order_id}.json`, keeping `base`'s directory.
fn dump_path(base: &Path, order_id: &str) -> PathBuf {
    let stem = base
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = stem.strip_suffix(".json").unwrap_or(&stem).to_string();
    base.with_file_name(format!("{stem}_{order_id}.json"))
}

/// Pretty-print every raw document next to `base`.
pub fn dump_raw_documents(base: &Path, orders: &[FetchedOrder]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(orders.len());
    for f in orders {
        let path = dump_path(base, &f.order.order_id);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("create dump dir failed: {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(&f.raw).context("serialize raw document failed")?;
        fs::write(&path, json).with_context(|| format!("write dump failed: {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// Execute one run.
///
/// Store read failures and source failures are fatal before anything is
/// sent. A delivery failure aborts the run without saving, so every order
/// of this run is decided again next time.
pub fn run_once(
    cfg: &WatchConfig,
    source: &dyn OrderSource,
    store: &dyn StateStore,
    notifier: &dyn Notifier,
    opts: &RunOptions,
    now: DateTime<Utc>,
) -> Result<RunReport> {
    let run_id = Uuid::new_v4();
    info!(%run_id, mode = ?opts.mode, dry_run = opts.dry_run, "run started");

    let previous = store.load().context("STATE_STORE_LOAD_FAILED")?;
    debug!(known_orders = previous.len(), "state loaded");
    let mut ledger = StatusLedger::new(previous);

    let fetched = fetch_orders(source, &opts.mode, now)?;
    let fetched_count = fetched.len();
    let selected = select_orders(fetched, opts.limit);

    let dumped = match &opts.dump_json {
        Some(base) => dump_raw_documents(base, &selected)?,
        None => Vec::new(),
    };

    let mut actions: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut sent = 0usize;
    for f in &selected {
        let order = aggregate_order(&f.order, cfg);
        let verdict = ledger.observe(&order.order_id, &order.status, cfg);
        *actions.entry(verdict.action.as_str()).or_default() += 1;

        let Some(notification) = compose(&order, verdict.action) else {
            continue;
        };
        notifier.send(&notification).with_context(|| {
            format!(
                "NOTIFY_FAILED: order {} action {}",
                order.order_id,
                verdict.action.as_str()
            )
        })?;
        sent += 1;
        info!(
            order_id = %order.order_id,
            action = verdict.action.as_str(),
            total_power = order.total_power,
            pallets = ?order.pallet_count,
            "notified"
        );
    }

    let state_saved = if opts.dry_run {
        if ledger.is_changed() {
            warn!("dry run: state changes not saved");
        }
        false
    } else {
        store
            .save(ledger.statuses())
            .context("STATE_STORE_SAVE_FAILED")?;
        true
    };

    info!(%run_id, fetched = fetched_count, selected = selected.len(), sent, state_saved, "run finished");
    Ok(RunReport {
        run_id,
        fetched: fetched_count,
        selected: selected.len(),
        actions,
        notifications_sent: sent,
        state_saved,
        dumped,
    })
}
