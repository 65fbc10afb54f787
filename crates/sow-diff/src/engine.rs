use serde::{Deserialize, Serialize};
use sow_config::WatchConfig;

/// What, if anything, to notify about an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    NoAction,
    Sold,
    Reopened,
    Cancelled,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::NoAction => "none",
            Action::Sold => "sold",
            Action::Reopened => "reopened",
            Action::Cancelled => "cancelled",
        }
    }

    pub fn notifies(&self) -> bool {
        !matches!(self, Action::NoAction)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub action: Action,
    /// Literal status to record for the order, set even for `NoAction`.
    pub next_status: String,
}

/// Decide the action for one order.
///
/// `previous` is the literal status recorded on an earlier run, `None` when
/// the order has never been seen. Both sides are classified with the
/// configured vocabulary; only the Active/Cancelled class matters.
pub fn decide(previous: Option<&str>, current: &str, cfg: &WatchConfig) -> Verdict {
    let vocab = &cfg.status_vocabulary;
    let now_active = vocab.classify(current).is_active();

    let action = match previous.map(|p| vocab.classify(p)) {
        None if now_active => Action::Sold,
        None if cfg.notify_first_seen_cancelled => Action::Cancelled,
        None => Action::NoAction,
        Some(prev) => match (prev.is_active(), now_active) {
            (true, false) => Action::Cancelled,
            (false, true) => Action::Reopened,
            _ => Action::NoAction,
        },
    };

    Verdict {
        action,
        next_status: current.to_string(),
    }
}
