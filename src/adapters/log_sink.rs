//! Log-based notification sink adapter.
//!
//! Implements [`NotificationSink`] by writing every notification to the
//! log.  Used in dry-run mode (no bot token configured) so the watcher can
//! be exercised against a real printer without a chat.

use log::info;

use crate::app::events::ImageSource;
use crate::app::ports::{NotificationError, NotificationSink};
use crate::config::MonitorConfig;

/// Adapter that logs every notification to the console.
pub struct LogNotifier {
    snapshot_url: String,
    job_image_url: String,
    sent: u64,
}

impl LogNotifier {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            snapshot_url: config.snapshot_url(),
            job_image_url: config.job_image_url(),
            sent: 0,
        }
    }

    /// Notifications written so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl NotificationSink for LogNotifier {
    fn send_text(&mut self, message: &str) -> Result<(), NotificationError> {
        self.sent += 1;
        info!("NOTIFY | text | {}", message.replace('\n', " | "));
        Ok(())
    }

    fn send_photo(&mut self, image: ImageSource, caption: &str) -> Result<(), NotificationError> {
        self.sent += 1;
        let url = match image {
            ImageSource::Snapshot => &self.snapshot_url,
            ImageSource::JobThumbnail => &self.job_image_url,
        };
        info!("NOTIFY | photo {} | {}", url, caption.replace('\n', " | "));
        Ok(())
    }
}
