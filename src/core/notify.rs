use crate::core::quote::QuoteRecord;
use tracing::{info, warn};

/// User facing events raised by the quote store and the sync agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    QuoteAdded(QuoteRecord),
    Imported { added: usize },
    Synced { added: usize },
    SyncFailed { reason: String },
    SyncSkipped,
}

/// Render/notify port. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Notifier that only writes to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        match notification {
            Notification::QuoteAdded(record) => {
                info!(text = %record.text, category = %record.category, "Quote added")
            }
            Notification::Imported { added } => info!(added, "Quotes imported"),
            Notification::Synced { added } => info!(added, "Quotes synced with server"),
            Notification::SyncFailed { reason } => warn!(%reason, "Sync failed"),
            Notification::SyncSkipped => info!("Sync already in progress"),
        }
    }
}
