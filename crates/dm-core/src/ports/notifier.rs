use crate::export::ExportNotification;

/// Caller-facing notification channel.
pub trait NotifierPort: Send + Sync {
    fn notify(&self, notification: &ExportNotification);
}
