//! Telegram Bot API adapters.
//!
//! | Type               | Role                                            |
//! |--------------------|-------------------------------------------------|
//! | [`TelegramApi`]    | blocking HTTP client for the three API methods  |
//! | [`TelegramNotifier`] | [`NotificationSink`]: bounded outbox + worker |
//! | [`CommandPoller`]  | `getUpdates` long-poll → [`Inbound::Command`]   |
//!
//! The chat service cannot reach the printer, so photos are fetched from
//! the printer's LAN URL by the worker and uploaded as multipart.
//!
//! ```text
//!  control loop ──try_send──▶ OUTBOX (16) ──▶ tg-notify thread ──▶ api.telegram.org
//!                                                 │
//!                                    GET snapshot / thumbnail (LAN)
//! ```

use core::time::Duration;
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::Context as _;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::app::commands::AppCommand;
use crate::app::events::ImageSource;
use crate::app::ports::{NotificationError, NotificationSink};
use crate::config::MonitorConfig;
use crate::runtime::channels::{Inbound, InboxHandle};

const API_BASE: &str = "https://api.telegram.org";

/// Outbound queue depth.
const OUTBOX_DEPTH: usize = 16;

/// Back-off after a failed `getUpdates`.
const POLL_RETRY: Duration = Duration::from_secs(5);

// ───────────────────────────────────────────────────────────────
// Wire types
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<T, NotificationError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(NotificationError::Delivery(
                self.description.unwrap_or_else(|| "no result".to_owned()),
            )),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// API client
// ───────────────────────────────────────────────────────────────

/// Blocking Bot API client bound to one token and one chat.
#[derive(Clone)]
pub struct TelegramApi {
    client: reqwest::blocking::Client,
    poll_client: reqwest::blocking::Client,
    base: String,
    chat_id: i64,
    poll_timeout: Duration,
}

impl TelegramApi {
    pub fn new(config: &MonitorConfig) -> anyhow::Result<Self> {
        let token = config
            .telegram_bot_token
            .as_deref()
            .context("telegram bot token not configured")?;
        let chat_id = config
            .telegram_chat_id
            .context("telegram chat id not configured")?;
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout() * 4)
            .build()
            .context("building HTTP client")?;
        // Long polls hold the request open for `poll_timeout`.
        let poll_client = reqwest::blocking::Client::builder()
            .timeout(config.poll_timeout() + config.request_timeout())
            .build()
            .context("building polling HTTP client")?;
        Ok(Self {
            client,
            poll_client,
            base: format!("{}/bot{}", API_BASE, token),
            chat_id,
            poll_timeout: config.poll_timeout(),
        })
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    fn method(&self, name: &str) -> String {
        format!("{}/{}", self.base, name)
    }

    pub fn send_message(&self, text: &str) -> Result<(), NotificationError> {
        let body = serde_json::json!({ "chat_id": self.chat_id, "text": text });
        let reply: ApiResponse<serde_json::Value> = self
            .client
            .post(self.method("sendMessage"))
            .json(&body)
            .send()
            .and_then(reqwest::blocking::Response::json)
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;
        reply.into_result().map(|_| ())
    }

    pub fn send_photo(
        &self,
        image: Vec<u8>,
        file_name: &str,
        caption: &str,
    ) -> Result<(), NotificationError> {
        let photo = reqwest::blocking::multipart::Part::bytes(image).file_name(file_name.to_owned());
        let form = reqwest::blocking::multipart::Form::new()
            .text("chat_id", self.chat_id.to_string())
            .text("caption", caption.to_owned())
            .part("photo", photo);
        let reply: ApiResponse<serde_json::Value> = self
            .client
            .post(self.method("sendPhoto"))
            .multipart(form)
            .send()
            .and_then(reqwest::blocking::Response::json)
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;
        reply.into_result().map(|_| ())
    }

    fn get_updates(&self, offset: i64) -> Result<Vec<Update>, NotificationError> {
        let reply: ApiResponse<Vec<Update>> = self
            .poll_client
            .get(self.method("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", self.poll_timeout.as_secs().to_string()),
                ("allowed_updates", r#"["message"]"#.to_owned()),
            ])
            .send()
            .and_then(reqwest::blocking::Response::json)
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;
        reply.into_result()
    }
}

// ───────────────────────────────────────────────────────────────
// Notification sink
// ───────────────────────────────────────────────────────────────

enum Outgoing {
    Text(String),
    Photo { image: ImageSource, caption: String },
    Stop,
}

type Outbox = Channel<CriticalSectionRawMutex, Outgoing, OUTBOX_DEPTH>;

/// [`NotificationSink`] that never blocks the control loop.
pub struct TelegramNotifier {
    outbox: Arc<Outbox>,
    worker: Option<JoinHandle<()>>,
}

impl TelegramNotifier {
    /// Spawn the delivery worker.
    pub fn spawn(api: TelegramApi, config: &MonitorConfig) -> anyhow::Result<Self> {
        let outbox: Arc<Outbox> = Arc::new(Channel::new());
        let images = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("building image HTTP client")?;
        let worker = Worker {
            api,
            images,
            snapshot_url: config.snapshot_url(),
            job_image_url: config.job_image_url(),
            outbox: outbox.clone(),
        };
        let handle = std::thread::Builder::new()
            .name("tg-notify".into())
            .spawn(move || worker.run())
            .context("spawning notification worker")?;
        Ok(Self {
            outbox,
            worker: Some(handle),
        })
    }

    fn enqueue(&mut self, msg: Outgoing) -> Result<(), NotificationError> {
        if self.worker.as_ref().is_some_and(JoinHandle::is_finished) {
            return Err(NotificationError::Closed);
        }
        self.outbox.try_send(msg).map_err(|_| NotificationError::QueueFull)
    }

    /// Deliver everything queued, then stop the worker.
    pub fn flush(mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        futures_lite::future::block_on(self.outbox.send(Outgoing::Stop));
        if worker.join().is_err() {
            warn!("TG: notification worker panicked");
        }
    }
}

impl NotificationSink for TelegramNotifier {
    fn send_text(&mut self, message: &str) -> Result<(), NotificationError> {
        self.enqueue(Outgoing::Text(message.to_owned()))
    }

    fn send_photo(&mut self, image: ImageSource, caption: &str) -> Result<(), NotificationError> {
        self.enqueue(Outgoing::Photo {
            image,
            caption: caption.to_owned(),
        })
    }
}

struct Worker {
    api: TelegramApi,
    images: reqwest::blocking::Client,
    snapshot_url: String,
    job_image_url: String,
    outbox: Arc<Outbox>,
}

impl Worker {
    fn run(self) {
        info!("TG: notification worker started");
        loop {
            let result = match futures_lite::future::block_on(self.outbox.receive()) {
                Outgoing::Text(text) => self.api.send_message(&text),
                Outgoing::Photo { image, caption } => self.photo(image, &caption),
                Outgoing::Stop => break,
            };
            if let Err(e) = result {
                warn!("TG: {}", e);
            }
        }
        info!("TG: notification worker stopped");
    }

    fn photo(&self, image: ImageSource, caption: &str) -> Result<(), NotificationError> {
        let (url, file_name) = match image {
            ImageSource::Snapshot => (&self.snapshot_url, "snapshot.jpg"),
            ImageSource::JobThumbnail => (&self.job_image_url, "current_print_image.png"),
        };
        match self.fetch(url) {
            Ok(bytes) => self.api.send_photo(bytes, file_name, caption),
            Err(e) => {
                // No picture is better than no message.
                warn!("TG: image {} unavailable ({}), sending text", url, e);
                self.api.send_message(caption)
            }
        }
    }

    fn fetch(&self, url: &str) -> reqwest::Result<Vec<u8>> {
        let response = self.images.get(url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}

// ───────────────────────────────────────────────────────────────
// Command source
// ───────────────────────────────────────────────────────────────

/// Long-polls `getUpdates` and posts allow-listed commands to the inbox.
pub struct CommandPoller {
    api: TelegramApi,
    inbox: InboxHandle,
    offset: i64,
}

impl CommandPoller {
    pub fn new(api: TelegramApi, inbox: InboxHandle) -> Self {
        Self {
            api,
            inbox,
            offset: 0,
        }
    }

    /// Run on a dedicated thread; returns only if the thread is torn down.
    pub fn spawn(self) -> anyhow::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("tg-poll".into())
            .spawn(move || self.run())
            .context("spawning command poller")
    }

    fn run(mut self) {
        info!("TG: polling for commands from chat {}", self.api.chat_id());
        loop {
            match self.api.get_updates(self.offset) {
                Ok(updates) => {
                    let (commands, next) = accept_updates(&updates, self.api.chat_id());
                    self.offset = next.max(self.offset);
                    for cmd in commands {
                        self.inbox.post(Inbound::Command(cmd));
                    }
                }
                Err(e) => {
                    warn!("TG: getUpdates failed: {}", e);
                    std::thread::sleep(POLL_RETRY);
                }
            }
        }
    }
}

/// Commands from the allow-listed chat, and the offset acknowledging
/// every update seen.
fn accept_updates(updates: &[Update], chat_id: i64) -> (Vec<AppCommand>, i64) {
    let next = updates.iter().map(|u| u.update_id + 1).max().unwrap_or(0);
    let commands = updates
        .iter()
        .filter_map(|u| u.message.as_ref())
        .filter(|m| {
            let allowed = m.chat.id == chat_id;
            if !allowed {
                debug!("TG: ignoring message from chat {}", m.chat.id);
            }
            allowed
        })
        .filter_map(|m| m.text.as_deref())
        .filter_map(AppCommand::parse)
        .collect();
    (commands, next)
}
