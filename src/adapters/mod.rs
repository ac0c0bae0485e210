//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements        | Connects to                          |
//! |--------------|-------------------|--------------------------------------|
//! | `telegram`   | NotificationSink  | Telegram Bot API (send)              |
//! |              | command source    | Telegram getUpdates long-poll        |
//! | `log_sink`   | NotificationSink  | Log output (dry-run)                 |
//! | `console`    | command source    | stdin (dry-run)                      |
//! | `relay`      | ActuatorPort      | Tasmota HTTP plug / in-memory        |
//! | `websocket`  | TelemetryLink     | Printer status WebSocket             |
//! | `env_config` | ConfigPort        | JSON file + environment              |

pub mod console;
pub mod env_config;
pub mod log_sink;
pub mod relay;
pub mod telegram;
pub mod websocket;
