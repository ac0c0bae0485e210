//! Relay adapters: the printer's mains power behind [`ActuatorPort`].
//!
//! [`TasmotaRelay`] drives a Tasmota smart plug over its HTTP command API:
//!
//! ```text
//!   GET http://<relay>/cm?cmnd=Power        → {"POWER":"ON"}
//!   GET http://<relay>/cm?cmnd=Power%20On   → {"POWER":"ON"}
//!   GET http://<relay>/cm?cmnd=Power%20Off  → {"POWER":"OFF"}
//! ```
//!
//! [`SimulatedRelay`] keeps the output in memory for dry runs.

use core::time::Duration;

use log::{info, warn};
use serde::Deserialize;

use crate::app::ports::{ActuatorError, ActuatorPort};

// ── Tasmota ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PowerReply {
    #[serde(rename = "POWER", alias = "POWER1")]
    power: String,
}

impl PowerReply {
    fn is_on(&self) -> Result<bool, ActuatorError> {
        match self.power.as_str() {
            "ON" | "1" => Ok(true),
            "OFF" | "0" => Ok(false),
            other => Err(ActuatorError::BadResponse(format!("POWER={}", other))),
        }
    }
}

/// Parse a Tasmota `Power` reply body.
fn parse_reply(body: &str) -> Result<bool, ActuatorError> {
    let reply: PowerReply =
        serde_json::from_str(body).map_err(|e| ActuatorError::BadResponse(e.to_string()))?;
    reply.is_on()
}

/// Relay reached over HTTP on the LAN.
pub struct TasmotaRelay {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl TasmotaRelay {
    pub fn new(host: &str, timeout: Duration) -> Result<Self, ActuatorError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ActuatorError::Unreachable(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("http://{}/cm", host),
        })
    }

    fn command(&self, cmnd: &str) -> Result<bool, ActuatorError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("cmnd", cmnd)])
            .send()
            .map_err(|e| ActuatorError::Unreachable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ActuatorError::BadResponse(format!("HTTP {}", response.status())));
        }
        let body = response
            .text()
            .map_err(|e| ActuatorError::BadResponse(e.to_string()))?;
        parse_reply(&body)
    }
}

impl ActuatorPort for TasmotaRelay {
    fn get(&mut self) -> Result<bool, ActuatorError> {
        self.command("Power")
    }

    fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let now = self.command(if on { "Power On" } else { "Power Off" })?;
        if now != on {
            warn!("RELAY: commanded {} but reports {}", on, now);
            return Err(ActuatorError::NotApplied { requested: on });
        }
        info!("RELAY: {}", if on { "on" } else { "off" });
        Ok(())
    }

    fn release(&mut self) {
        info!("RELAY: released {}", self.endpoint);
    }
}

// ── Simulation ───────────────────────────────────────────────

/// In-memory relay.
#[derive(Debug, Default)]
pub struct SimulatedRelay {
    on: bool,
}

impl SimulatedRelay {
    pub fn new(initially_on: bool) -> Self {
        Self { on: initially_on }
    }
}

impl ActuatorPort for SimulatedRelay {
    fn get(&mut self) -> Result<bool, ActuatorError> {
        Ok(self.on)
    }

    fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        info!("RELAY(sim): {}", if on { "on" } else { "off" });
        self.on = on;
        Ok(())
    }
}
