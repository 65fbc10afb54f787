use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;

mod commands;

#[derive(Parser)]
#[command(name = "sow")]
#[command(about = "Sales-order watcher: notify on new, cancelled and reopened orders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args, Clone)]
pub struct ConfigArgs {
    /// Layered config paths in merge order (base -> site -> local)
    #[arg(long = "config")]
    pub config_paths: Vec<String>,

    /// Fail instead of warn when the config holds keys nothing reads
    #[arg(long, default_value_t = false)]
    pub strict_config: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch sales orders, notify on status changes, record what was seen
    #[command(group(ArgGroup::new("fetch_mode").args(["doc_id", "minutes", "days", "ytd"])))]
    Poll {
        /// Process a single document
        #[arg(long)]
        doc_id: Option<String>,

        /// Orders dated in the last N minutes (default mode, N = 10)
        #[arg(long)]
        minutes: Option<u32>,

        /// Today plus N previous days (Europe/Madrid calendar)
        #[arg(long)]
        days: Option<u32>,

        /// From 1 January (Europe/Madrid) until now
        #[arg(long, default_value_t = false)]
        ytd: bool,

        /// Process at most N orders, newest first
        #[arg(long, default_value_t = 200)]
        limit: usize,

        /// Write each raw document to BASE_{id}.json
        #[arg(long = "dump-json", value_name = "BASE")]
        dump_json: Option<PathBuf>,

        /// Deliver by SMTP instead of printing to the console
        #[arg(long, default_value_t = false)]
        send_email: bool,

        /// Never write the state file; notifications only print to the console
        #[arg(long, default_value_t = false, conflicts_with = "send_email")]
        dry_run: bool,

        /// State file (overrides state.path from config)
        #[arg(long)]
        state_file: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Show how each line of one document is read
    Inspect {
        #[arg(long, required = true)]
        doc_id: String,

        /// Write the raw document to this path
        #[arg(long = "dump-json", value_name = "PATH")]
        dump_json: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Silent if the files do not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Poll {
            doc_id,
            minutes,
            days,
            ytd,
            limit,
            dump_json,
            send_email,
            dry_run,
            state_file,
            config,
        } => {
            let mode = match (doc_id, minutes, days, ytd) {
                (Some(id), _, _, _) => sow_runtime::FetchMode::DocId(id),
                (_, Some(m), _, _) => sow_runtime::FetchMode::Minutes(m),
                (_, _, Some(d), _) => sow_runtime::FetchMode::Days(d),
                (_, _, _, true) => sow_runtime::FetchMode::YearToDate,
                _ => sow_runtime::FetchMode::Minutes(10),
            };
            if limit == 0 {
                bail!("--limit must be at least 1");
            }
            commands::poll(commands::PollArgs {
                opts: sow_runtime::RunOptions {
                    mode,
                    limit,
                    dry_run,
                    dump_json,
                },
                send_email,
                state_file,
                config,
                now: Utc::now(),
            })?;
        }

        Commands::Inspect {
            doc_id,
            dump_json,
            config,
        } => {
            commands::inspect(&doc_id, dump_json.as_deref(), &config)?;
        }

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = sow_config::load_layered_yaml(&path_refs)?;
            let report = sow_config::report_unused_keys(&loaded.config_json, sow_config::UnusedKeyPolicy::Warn)
                .context("unused-key analysis failed")?;
            for p in &report.unused_leaf_pointers {
                warn!(pointer = %p, "config key is not read by anything");
            }
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
