//! printwatch: Main Entry Point
//!
//! Hexagonal architecture around one serialized control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  TasmotaRelay      TelegramNotifier   WsTelemetryLink          │
//! │  (ActuatorPort)    (NotificationSink) (TelemetryLink)          │
//! │  CommandPoller     EnvConfig          ctrlc handler            │
//! │  (→ inbox)         (ConfigPort)       (→ inbox)                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            MonitorService (pure logic)                 │    │
//! │  │  PowerSequencer · ConnectionSession · FSM              │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  runtime::run (inbox + power-on timer, block_on)               │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::{info, warn};

use printwatch::adapters::console;
use printwatch::adapters::env_config::EnvConfig;
use printwatch::adapters::log_sink::LogNotifier;
use printwatch::adapters::relay::{SimulatedRelay, TasmotaRelay};
use printwatch::adapters::telegram::{CommandPoller, TelegramApi, TelegramNotifier};
use printwatch::adapters::websocket::WsTelemetryLink;
use printwatch::app::events::ImageSource;
use printwatch::app::ports::{ActuatorError, ActuatorPort, ConfigPort, NotificationError, NotificationSink};
use printwatch::app::service::MonitorService;
use printwatch::config::MonitorConfig;
use printwatch::runtime::channels::InboxHandle;
use printwatch::runtime::{self, Ports};

// ── Adapter selection ─────────────────────────────────────────
//
// Real relay and chat when configured, log-only stand-ins otherwise.

enum Relay {
    Tasmota(TasmotaRelay),
    Simulated(SimulatedRelay),
}

impl ActuatorPort for Relay {
    fn get(&mut self) -> Result<bool, ActuatorError> {
        match self {
            Self::Tasmota(r) => r.get(),
            Self::Simulated(r) => r.get(),
        }
    }

    fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        match self {
            Self::Tasmota(r) => r.set(on),
            Self::Simulated(r) => r.set(on),
        }
    }

    fn release(&mut self) {
        match self {
            Self::Tasmota(r) => r.release(),
            Self::Simulated(r) => r.release(),
        }
    }
}

enum Notifier {
    Telegram(TelegramNotifier),
    Log(LogNotifier),
}

impl Notifier {
    fn flush(self) {
        match self {
            Self::Telegram(n) => n.flush(),
            Self::Log(n) => info!("{} notifications logged", n.sent()),
        }
    }
}

impl NotificationSink for Notifier {
    fn send_text(&mut self, message: &str) -> Result<(), NotificationError> {
        match self {
            Self::Telegram(n) => n.send_text(message),
            Self::Log(n) => n.send_text(message),
        }
    }

    fn send_photo(&mut self, image: ImageSource, caption: &str) -> Result<(), NotificationError> {
        match self {
            Self::Telegram(n) => n.send_photo(image, caption),
            Self::Log(n) => n.send_photo(image, caption),
        }
    }
}

fn build_relay(config: &MonitorConfig) -> Result<Relay> {
    match &config.relay_host {
        Some(host) => {
            let relay = TasmotaRelay::new(host, config.request_timeout())
                .with_context(|| format!("relay {}", host))?;
            Ok(Relay::Tasmota(relay))
        }
        None => {
            warn!("No RELAY_HOSTNAME, using a simulated relay");
            Ok(Relay::Simulated(SimulatedRelay::new(false)))
        }
    }
}

/// Chat adapters, or the log/stdin pair in dry-run mode.
fn build_chat(config: &MonitorConfig, inbox: &InboxHandle) -> Result<Notifier> {
    if config.telegram_bot_token.is_none() {
        warn!("No TELEGRAM_BOT_TOKEN, dry-run: notifications go to the log, commands come from stdin");
        console::spawn(inbox.clone())?;
        return Ok(Notifier::Log(LogNotifier::new(config)));
    }
    let api = TelegramApi::new(config)?;
    CommandPoller::new(api.clone(), inbox.clone()).spawn()?;
    Ok(Notifier::Telegram(TelegramNotifier::spawn(api, config)?))
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("printwatch v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration (the only fatal failure) ─────────────
    let config = EnvConfig::new().load().context("loading configuration")?;

    // ── 3. Inbox + signal handler ─────────────────────────────
    let inbox = InboxHandle::new();
    {
        let inbox = inbox.clone();
        ctrlc::set_handler(move || {
            info!("Signal received");
            inbox.request_shutdown();
        })
        .context("installing signal handler")?;
    }

    // ── 4. Adapters ───────────────────────────────────────────
    let relay = build_relay(&config)?;
    let link = WsTelemetryLink::new(&config, inbox.clone());
    let sink = build_chat(&config, &inbox)?;
    let mut ports = Ports { relay, link, sink };

    // ── 5. Control loop ───────────────────────────────────────
    let mut service = MonitorService::new(&config);
    futures_lite::future::block_on(runtime::run(&mut service, &inbox, &mut ports));

    // ── 6. Drain outbound notifications ───────────────────────
    ports.sink.flush();
    info!("Bye");
    Ok(())
}
