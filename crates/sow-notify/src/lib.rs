//! sow-notify
//!
//! Notification composer (pure) plus the transports that deliver what it
//! produces: SMTP for production, console for manual and dry runs.

mod compose;
pub mod format;
mod transport;

pub use compose::{compose, material_label, subject_for, Notification, COLUMNS};
pub use transport::{ConsoleNotifier, Notifier, NotifyError, SmtpNotifier};
