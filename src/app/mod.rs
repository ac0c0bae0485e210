//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the print watcher: command
//! handling, power sequencing and notification dispatch.  All interaction
//! with the relay, the printer stream and the chat happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable without
//! a printer on the network.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
