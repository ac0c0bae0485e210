//! Monitor configuration parameters
//!
//! All tunable parameters for the print watcher.
//! Values come from an optional JSON file and the environment, see
//! [`EnvConfig`](crate::adapters::env_config::EnvConfig).

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core monitor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    // --- Printer ---
    /// Printer hostname or IP on the LAN
    pub printer_host: String,
    /// Status WebSocket port
    pub telemetry_port: u16,
    /// Camera stream port (snapshot endpoint)
    pub snapshot_port: u16,
    /// Job thumbnail URL; derived from the host when unset
    pub job_image_url: Option<String>,

    // --- Chat ---
    /// Telegram bot token; dry-run (log only) when unset
    pub telegram_bot_token: Option<String>,
    /// The one chat allowed to issue commands and receive notifications
    pub telegram_chat_id: Option<i64>,
    /// getUpdates long-poll timeout (seconds)
    pub poll_timeout_secs: u16,

    // --- Relay ---
    /// Tasmota relay hostname; simulated relay when unset
    pub relay_host: Option<String>,
    /// Delay between the `on` command and energising the relay (milliseconds)
    pub power_on_delay_ms: u32,

    // --- Timing ---
    /// Timeout for relay and image HTTP requests (milliseconds)
    pub request_timeout_ms: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            // Printer
            printer_host: String::new(),
            telemetry_port: 9999,
            snapshot_port: 8080,
            job_image_url: None,

            // Chat
            telegram_bot_token: None,
            telegram_chat_id: None,
            poll_timeout_secs: 30,

            // Relay
            relay_host: None,
            power_on_delay_ms: 10_000,

            // Timing
            request_timeout_ms: 5_000,
        }
    }
}

impl MonitorConfig {
    /// Reject out-of-range values.  Nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.printer_host.trim().is_empty() {
            return Err(ConfigError::Missing("PRINTER_HOSTNAME"));
        }
        if self.printer_host.contains(['/', ' ']) {
            return Err(ConfigError::ValidationFailed(
                "printer_host must be a bare hostname or IP",
            ));
        }
        if self.telemetry_port == 0 || self.snapshot_port == 0 {
            return Err(ConfigError::ValidationFailed("ports must be non-zero"));
        }
        if self.telegram_bot_token.is_some() && self.telegram_chat_id.is_none() {
            return Err(ConfigError::Missing("TELEGRAM_CHAT_ID"));
        }
        if !(1..=50).contains(&self.poll_timeout_secs) {
            return Err(ConfigError::ValidationFailed(
                "poll_timeout_secs must be 1–50",
            ));
        }
        if self.power_on_delay_ms > 600_000 {
            return Err(ConfigError::ValidationFailed(
                "power_on_delay_ms must be 0–600000",
            ));
        }
        if !(500..=60_000).contains(&self.request_timeout_ms) {
            return Err(ConfigError::ValidationFailed(
                "request_timeout_ms must be 500–60000",
            ));
        }
        Ok(())
    }

    pub fn power_on_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.power_on_delay_ms))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.request_timeout_ms))
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.poll_timeout_secs))
    }

    /// `ws://<host>:<telemetry_port>`
    pub fn telemetry_url(&self) -> String {
        format!("ws://{}:{}", self.printer_host, self.telemetry_port)
    }

    /// Live camera frame.
    pub fn snapshot_url(&self) -> String {
        format!("http://{}:{}/?action=snapshot", self.printer_host, self.snapshot_port)
    }

    /// Preview image of the file being printed.
    pub fn job_image_url(&self) -> String {
        match &self.job_image_url {
            Some(url) => url.clone(),
            None => format!(
                "http://{}/downloads/original/current_print_image.png",
                self.printer_host
            ),
        }
    }
}
