use std::io::Write;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::json;
use tracing::{error, info};

use dm_core::ports::NotifierPort;
use dm_core::ExportNotification;

/// Caller-facing notifications for the command line.
///
/// Each notification is logged and written to the sink as one JSON line.
pub struct LogNotifier<W: Write + Send> {
    sink: Mutex<W>,
}

impl LogNotifier<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> LogNotifier<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    pub fn into_inner(self) -> W {
        self.sink.into_inner().unwrap_or_else(|p| p.into_inner())
    }
}

impl<W: Write + Send> NotifierPort for LogNotifier<W> {
    fn notify(&self, notification: &ExportNotification) {
        match notification {
            ExportNotification::Succeeded {
                filename, location, ..
            } => info!(filename = %filename, location = %location.display(), "Export succeeded"),
            ExportNotification::Failed { message, cause, .. } => {
                error!(cause = %cause, "{message}")
            }
        }

        let line = json!({
            "at": Utc::now().to_rfc3339(),
            "notification": notification,
        });
        let mut sink = self.sink.lock().unwrap_or_else(|p| p.into_inner());
        if let Err(err) = writeln!(sink, "{line}").and_then(|_| sink.flush()) {
            error!(error = %err, "Failed to write notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dm_core::JobId;

    #[test]
    fn test_failure_is_written_as_json_line() {
        let notifier = LogNotifier::new(Vec::new());
        notifier.notify(&ExportNotification::failed(JobId::from("job-1"), "boom"));

        let out = String::from_utf8(notifier.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();

        assert_eq!(value["notification"]["status"], "failed");
        assert_eq!(value["notification"]["fallback"], "native_print");
        assert_eq!(
            value["notification"]["message"],
            "PDF download failed. Please use the Print button instead."
        );
        assert!(value["at"].is_string());
    }
}
