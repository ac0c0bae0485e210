//! Inbound commands to the monitor service.
//!
//! These come from the allow-listed chat (or the console in dry-run mode)
//! and are interpreted by the [`MonitorService`](super::service::MonitorService).

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Report the printer state, with a snapshot when it is on.
    Status,
    /// Switch the printer on after the configured delay.
    PowerOn,
    /// Switch the printer off immediately.
    PowerOff,
}

impl AppCommand {
    /// Parse a chat command such as `/status`, `/on@printwatch_bot` or a
    /// bare `off`.  Trailing arguments are ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let word = word.strip_prefix('/').unwrap_or(word);
        let name = word.split_once('@').map_or(word, |(name, _bot)| name);
        match name.to_ascii_lowercase().as_str() {
            "status" => Some(Self::Status),
            "on" => Some(Self::PowerOn),
            "off" => Some(Self::PowerOff),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::PowerOn => "on",
            Self::PowerOff => "off",
        }
    }
}

impl core::fmt::Display for AppCommand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "/{}", self.name())
    }
}
