//! Command handlers for `sow poll` and `sow inspect`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use sow_config::{
    load_layered_yaml, report_unused_keys, resolve_secrets, LoadedConfig, SourceSettings,
    StateSettings, UnusedKeyPolicy, WatchConfig,
};
use sow_diff::Action;
use sow_holded::{HoldedClient, OrderSource};
use sow_notify::{ConsoleNotifier, Notifier, SmtpNotifier};
use sow_runtime::{inspect_order, run_once, RunOptions};
use sow_state::JsonFileStateStore;

use crate::ConfigArgs;

pub struct PollArgs {
    pub opts: RunOptions,
    pub send_email: bool,
    pub state_file: Option<PathBuf>,
    pub config: ConfigArgs,
    pub now: DateTime<Utc>,
}

/// Merge the config layers (built-in defaults when none) and run the
/// unused-key guard.
fn load_config(args: &ConfigArgs) -> Result<LoadedConfig> {
    let loaded = if args.config_paths.is_empty() {
        LoadedConfig::empty()?
    } else {
        let refs: Vec<&str> = args.config_paths.iter().map(|s| s.as_str()).collect();
        load_layered_yaml(&refs)?
    };

    let policy = if args.strict_config {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = report_unused_keys(&loaded.config_json, policy)?;
    for p in &report.unused_leaf_pointers {
        warn!(pointer = %p, "config key is not read by anything");
    }
    Ok(loaded)
}

fn holded_client(loaded: &LoadedConfig, cfg: &WatchConfig, send_email: bool) -> Result<(HoldedClient, sow_config::ResolvedSecrets)> {
    let secrets = resolve_secrets(&loaded.config_json, send_email)?;
    let settings = SourceSettings::from_config_json(&loaded.config_json)?;
    let client = HoldedClient::new(settings, &secrets.holded_api_key, cfg.power_attribute_keys.clone())
        .context("HOLDED_CLIENT_INIT_FAILED")?;
    Ok((client, secrets))
}

pub fn poll(args: PollArgs) -> Result<()> {
    let loaded = load_config(&args.config)?;
    let cfg = WatchConfig::from_config_json(&loaded.config_json)?;
    let (client, secrets) = holded_client(&loaded, &cfg, args.send_email)?;

    let notifier: Box<dyn Notifier> = match &secrets.smtp {
        // Dry runs never deliver by SMTP.
        Some(smtp) if args.send_email && !args.opts.dry_run => Box::new(SmtpNotifier::new(smtp).context("SMTP_INIT_FAILED")?),
        _ => Box::new(ConsoleNotifier),
    };

    let state_path = args
        .state_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(StateSettings::from_config_json(&loaded.config_json).path));
    let store = JsonFileStateStore::new(&state_path);
    info!(state = %state_path.display(), config_hash = %loaded.config_hash, "poll");

    let report = run_once(&cfg, &client, &store, notifier.as_ref(), &args.opts, args.now)?;

    println!("run_id={}", report.run_id);
    println!("config_hash={}", loaded.config_hash);
    println!("orders_fetched={}", report.fetched);
    println!("orders_selected={}", report.selected);
    for action in [Action::Sold, Action::Cancelled, Action::Reopened, Action::NoAction] {
        println!("action_{}={}", action.as_str(), report.count(action));
    }
    println!("notifications_sent={}", report.notifications_sent);
    println!("state_saved={} path={}", report.state_saved, state_path.display());
    for p in &report.dumped {
        println!("dumped={}", p.display());
    }
    Ok(())
}

pub fn inspect(doc_id: &str, dump_json: Option<&Path>, config: &ConfigArgs) -> Result<()> {
    let loaded = load_config(config)?;
    let cfg = WatchConfig::from_config_json(&loaded.config_json)?;
    let (client, _) = holded_client(&loaded, &cfg, false)?;

    let fetched = client
        .fetch_order(doc_id)
        .with_context(|| format!("ORDER_FETCH_FAILED: document {doc_id}"))?;
    print!("{}", inspect_order(&fetched, &cfg).render());

    if let Some(path) = dump_json {
        let json = serde_json::to_string_pretty(&fetched.raw).context("serialize raw document failed")?;
        fs::write(path, json).with_context(|| format!("write dump failed: {}", path.display()))?;
        println!("dumped={}", path.display());
    }
    Ok(())
}
