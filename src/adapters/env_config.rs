//! Environment configuration adapter.
//!
//! Implements [`ConfigPort`] in three layers, later ones winning:
//!
//! 1. [`MonitorConfig::default`]
//! 2. JSON file named by `PRINTWATCH_CONFIG` (optional, partial is fine)
//! 3. individual environment variables
//!
//! | Variable             | Field                |
//! |----------------------|----------------------|
//! | `PRINTER_HOSTNAME`   | `printer_host`       |
//! | `TELEGRAM_BOT_TOKEN` | `telegram_bot_token` |
//! | `TELEGRAM_CHAT_ID`   | `telegram_chat_id`   |
//! | `RELAY_HOSTNAME`     | `relay_host`         |
//! | `POWER_ON_DELAY`     | `power_on_delay_ms` (`10s`, `1m 30s`, ...) |
//!
//! The merged result is validated before it is returned.

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::MonitorConfig;

pub const CONFIG_FILE_VAR: &str = "PRINTWATCH_CONFIG";

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

pub struct EnvConfig {
    lookup: Lookup,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvConfig {
    /// Read from the process environment.
    pub fn new() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read variables through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    fn base(&self) -> Result<MonitorConfig, ConfigError> {
        let Some(path) = self.var(CONFIG_FILE_VAR) else {
            return Ok(MonitorConfig::default());
        };
        let text = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path, e)))?;
        info!("EnvConfig: loaded {}", path);
        serde_json::from_str(&text).map_err(|e| ConfigError::Malformed(format!("{}: {}", path, e)))
    }

    fn apply_overrides(&self, cfg: &mut MonitorConfig) -> Result<(), ConfigError> {
        if let Some(host) = self.var("PRINTER_HOSTNAME") {
            cfg.printer_host = host;
        }
        if let Some(token) = self.var("TELEGRAM_BOT_TOKEN") {
            cfg.telegram_bot_token = Some(token);
        }
        if let Some(chat) = self.var("TELEGRAM_CHAT_ID") {
            let id = chat
                .parse::<i64>()
                .map_err(|_| ConfigError::Malformed(format!("TELEGRAM_CHAT_ID={}", chat)))?;
            cfg.telegram_chat_id = Some(id);
        }
        if let Some(relay) = self.var("RELAY_HOSTNAME") {
            cfg.relay_host = Some(relay);
        }
        if let Some(delay) = self.var("POWER_ON_DELAY") {
            let delay = humantime::parse_duration(&delay).map_err(|_| {
                ConfigError::ValidationFailed("POWER_ON_DELAY must be a duration like 10s")
            })?;
            cfg.power_on_delay_ms = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        }
        Ok(())
    }
}

impl ConfigPort for EnvConfig {
    fn load(&self) -> Result<MonitorConfig, ConfigError> {
        let mut cfg = self.base()?;
        self.apply_overrides(&mut cfg)?;
        cfg.validate()?;
        info!(
            "EnvConfig: printer {} | chat {} | relay {} | on-delay {}",
            cfg.printer_host,
            if cfg.telegram_bot_token.is_some() { "telegram" } else { "dry-run" },
            cfg.relay_host.as_deref().unwrap_or("simulated"),
            humantime::format_duration(cfg.power_on_delay()),
        );
        Ok(cfg)
    }
}
