//! printwatch library.
//!
//! Watches a networked 3D printer's status stream, tracks the print job's
//! lifecycle and switches the printer's power relay on command.  The pure
//! logic (telemetry, FSM, power sequencing) is exposed for integration
//! testing; the binary wires it to real adapters.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod power;
pub mod report;
pub mod runtime;
pub mod session;
pub mod telemetry;

pub use error::{Error, Result};
