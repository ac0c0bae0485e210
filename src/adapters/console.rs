//! Console command source for dry runs.
//!
//! Reads commands (`status`, `/on`, `off`, ...) from stdin, one per line,
//! and posts them to the inbox.  Used when no bot token is configured.

use std::io::BufRead;
use std::thread::JoinHandle;

use anyhow::Context as _;
use log::{info, warn};

use crate::app::commands::AppCommand;
use crate::runtime::channels::{Inbound, InboxHandle};

/// Post every recognised command line from `input`.  Returns the number
/// of commands posted once `input` is exhausted.
pub fn forward_commands(input: impl BufRead, inbox: &InboxHandle) -> usize {
    let mut posted = 0;
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("CONSOLE: read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match AppCommand::parse(&line) {
            Some(cmd) => {
                inbox.post(Inbound::Command(cmd));
                posted += 1;
            }
            None => warn!("CONSOLE: unknown command {:?} (try status, on, off)", line.trim()),
        }
    }
    posted
}

/// Spawn the stdin reader thread.
pub fn spawn(inbox: InboxHandle) -> anyhow::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            info!("CONSOLE: reading commands from stdin");
            let posted = forward_commands(std::io::stdin().lock(), &inbox);
            info!("CONSOLE: stdin closed after {} commands", posted);
        })
        .context("spawning console reader")
}
