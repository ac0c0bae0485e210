//! Printer status stream over WebSocket.
//!
//! Each [`TelemetryLink::open`] spawns a reader thread for that session.
//! The thread connects, then forwards every frame into the inbox tagged
//! with its session id.  When the stream ends for any reason other than a
//! requested close, it posts [`Inbound::LinkClosed`].
//!
//! ```text
//!  ┌────────────────────────────────────────────┐
//!  │  ws-reader thread (one per session)        │
//!  │  connect ─▶ read ─▶ inbox.post(Telemetry)  │
//!  │     │        ▲  │                          │
//!  │     │        └──┘ every READ_POLL: stop?   │
//!  │     └────────────▶ inbox.post(LinkClosed)  │
//!  └────────────────────────────────────────────┘
//! ```

use core::time::Duration;
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use tungstenite::{Message, WebSocket};

use crate::app::ports::{ConnectionError, SessionId, TelemetryLink};
use crate::config::MonitorConfig;
use crate::runtime::channels::{Inbound, InboxHandle};

/// How often a blocked read wakes up to check the stop flag.
const READ_POLL: Duration = Duration::from_millis(250);

struct Reader {
    session: SessionId,
    stop: Arc<AtomicBool>,
}

/// [`TelemetryLink`] backed by a per-session reader thread.
pub struct WsTelemetryLink {
    url: String,
    addr: String,
    connect_timeout: Duration,
    inbox: InboxHandle,
    active: Option<Reader>,
}

impl WsTelemetryLink {
    pub fn new(config: &MonitorConfig, inbox: InboxHandle) -> Self {
        Self {
            url: config.telemetry_url(),
            addr: format!("{}:{}", config.printer_host, config.telemetry_port),
            connect_timeout: config.request_timeout(),
            inbox,
            active: None,
        }
    }

    fn stop_active(&mut self) {
        if let Some(reader) = self.active.take() {
            reader.stop.store(true, Ordering::Release);
            debug!("WS[{}]: stop requested", reader.session);
        }
    }
}

impl TelemetryLink for WsTelemetryLink {
    fn open(&mut self, session: SessionId) -> Result<(), ConnectionError> {
        self.stop_active();
        let stop = Arc::new(AtomicBool::new(false));
        let job = ReaderJob {
            session,
            url: self.url.clone(),
            addr: self.addr.clone(),
            connect_timeout: self.connect_timeout,
            inbox: self.inbox.clone(),
            stop: stop.clone(),
        };
        std::thread::Builder::new()
            .name(format!("ws-reader-{}", session))
            .spawn(move || job.run())
            .map_err(|e| ConnectionError::OpenFailed(e.to_string()))?;
        self.active = Some(Reader { session, stop });
        Ok(())
    }

    fn close(&mut self, session: SessionId) {
        if self.active.as_ref().is_some_and(|r| r.session == session) {
            self.stop_active();
        }
    }
}

// ── Reader thread ────────────────────────────────────────────

struct ReaderJob {
    session: SessionId,
    url: String,
    addr: String,
    connect_timeout: Duration,
    inbox: InboxHandle,
    stop: Arc<AtomicBool>,
}

impl ReaderJob {
    fn run(self) {
        let outcome = match self.connect() {
            Ok(socket) => self.pump(socket),
            Err(e) => Some(e),
        };
        match outcome {
            Some(reason) if !self.stopped() => {
                warn!("WS[{}]: {}", self.session, reason);
                self.inbox.post(Inbound::LinkClosed {
                    session: self.session,
                    reason,
                });
            }
            _ => info!("WS[{}]: reader finished", self.session),
        }
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn connect(&self) -> Result<WebSocket<TcpStream>, ConnectionError> {
        let open_failed = |e: &dyn core::fmt::Display| ConnectionError::OpenFailed(e.to_string());

        let addrs: Vec<SocketAddr> = self
            .addr
            .to_socket_addrs()
            .map_err(|e| open_failed(&e))?
            .collect();
        let mut last = ConnectionError::OpenFailed(format!("{} did not resolve", self.addr));
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(Some(self.connect_timeout))
                        .map_err(|e| open_failed(&e))?;
                    let (socket, _response) =
                        tungstenite::client(self.url.as_str(), stream).map_err(|e| open_failed(&e))?;
                    socket
                        .get_ref()
                        .set_read_timeout(Some(READ_POLL))
                        .map_err(|e| open_failed(&e))?;
                    info!("WS[{}]: connected to {}", self.session, self.url);
                    return Ok(socket);
                }
                Err(e) => last = open_failed(&e),
            }
        }
        Err(last)
    }

    /// Forward frames until the stream ends.  `None` means a requested stop.
    fn pump(&self, mut socket: WebSocket<TcpStream>) -> Option<ConnectionError> {
        loop {
            if self.stopped() {
                let _ = socket.close(None);
                let _ = socket.flush();
                return None;
            }
            let payload = match socket.read() {
                Ok(Message::Text(text)) => text.into_bytes(),
                Ok(Message::Binary(bytes)) => bytes,
                Ok(Message::Close(frame)) => {
                    let why = frame.map_or_else(|| "no reason".to_owned(), |f| f.reason.into_owned());
                    return Some(ConnectionError::Closed(format!("closed by printer: {}", why)));
                }
                Ok(_) => continue,
                Err(tungstenite::Error::Io(e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    continue;
                }
                Err(e) => return Some(ConnectionError::Closed(e.to_string())),
            };
            if self.stopped() {
                continue;
            }
            self.inbox.post(Inbound::Telemetry {
                session: self.session,
                payload,
            });
        }
    }
}
