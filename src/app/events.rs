//! Outbound application events.
//!
//! The job state machine produces [`Notification`]s; the service hands them
//! to the [`NotificationSink`](super::ports::NotificationSink) port.
//! Adapters on the other side decide how they are delivered (chat API,
//! log output).

use super::ports::{NotificationError, NotificationSink};

/// Where a photo comes from.  Adapters resolve these to URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Live camera frame, fetched on demand.
    Snapshot,
    /// Preview image of the file being printed.
    JobThumbnail,
}

/// A message for the allow-listed recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Text(String),
    Photo { image: ImageSource, caption: String },
}

impl Notification {
    pub fn text(message: impl Into<String>) -> Self {
        Self::Text(message.into())
    }

    pub fn photo(image: ImageSource, caption: impl Into<String>) -> Self {
        Self::Photo {
            image,
            caption: caption.into(),
        }
    }

    /// Hand this notification to `sink`.
    pub fn deliver(&self, sink: &mut impl NotificationSink) -> Result<(), NotificationError> {
        match self {
            Self::Text(message) => sink.send_text(message),
            Self::Photo { image, caption } => sink.send_photo(*image, caption),
        }
    }
}
