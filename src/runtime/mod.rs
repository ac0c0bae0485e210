//! The serialized control loop.
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────┐
//!  │  futures_lite::future::block_on                          │
//!  │  ┌───────────────────────┐   ┌────────────────────────┐  │
//!  │  │ inbox.next()          │ or│ power-on Timer (gen N) │  │
//!  │  └───────────┬───────────┘   └───────────┬────────────┘  │
//!  │              ▼                           ▼               │
//!  │        handle_command /            handle_power_on_due   │
//!  │        handle_telemetry / ...                            │
//!  │              └──────────┬────────────────┘               │
//!  │                         ▼                                │
//!  │           re-arm or drop the timer to match              │
//!  │           MonitorService::pending()                      │
//!  └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The timer is the only suspension point besides the inbox.  It is a
//! plain `async_io_mini::Timer`; cancelling means dropping it.

pub mod channels;

use core::pin::Pin;

use async_io_mini::Timer;
use futures_lite::future;
use log::{debug, info};

use crate::app::ports::{ActuatorPort, NotificationSink, TelemetryLink};
use crate::app::service::MonitorService;
use crate::power::PendingActuation;

use channels::{Inbound, InboxHandle};

/// The driven adapters the loop hands to the service.
pub struct Ports<H, L, S> {
    pub relay: H,
    pub link: L,
    pub sink: S,
}

struct ArmedTimer {
    generation: u64,
    timer: Pin<Box<Timer>>,
}

enum Wake {
    Inbound(Inbound),
    PowerOnDue(u64),
}

/// Run the control loop until [`Inbound::Shutdown`] arrives.
pub async fn run<H, L, S>(
    service: &mut MonitorService,
    inbox: &InboxHandle,
    ports: &mut Ports<H, L, S>,
) where
    H: ActuatorPort,
    L: TelemetryLink,
    S: NotificationSink,
{
    service.start(&mut ports.relay, &mut ports.link, &mut ports.sink);
    let mut armed: Option<ArmedTimer> = None;
    sync_timer(service.pending(), &mut armed);

    loop {
        let wake = match armed.as_mut() {
            Some(t) => {
                let generation = t.generation;
                let timer = t.timer.as_mut();
                future::or(async { Wake::Inbound(inbox.next().await) }, async move {
                    timer.await;
                    Wake::PowerOnDue(generation)
                })
                .await
            }
            None => Wake::Inbound(inbox.next().await),
        };

        match wake {
            Wake::PowerOnDue(generation) => {
                armed = None;
                service.handle_power_on_due(
                    generation,
                    &mut ports.relay,
                    &mut ports.link,
                    &mut ports.sink,
                );
            }
            Wake::Inbound(Inbound::Command(cmd)) => {
                service.handle_command(cmd, &mut ports.relay, &mut ports.link, &mut ports.sink);
            }
            Wake::Inbound(Inbound::Telemetry { session, payload }) => {
                service.handle_telemetry(session, &payload, &mut ports.sink);
            }
            Wake::Inbound(Inbound::LinkClosed { session, reason }) => {
                service.handle_link_closed(session, &reason, &mut ports.sink);
            }
            Wake::Inbound(Inbound::Shutdown) => {
                info!("RUNTIME: shutdown requested");
                service.shutdown(&mut ports.relay, &mut ports.link, &mut ports.sink);
                break;
            }
        }

        sync_timer(service.pending(), &mut armed);
    }
}

/// Make the armed timer match the sequencer's pending actuation.
fn sync_timer(pending: Option<PendingActuation>, armed: &mut Option<ArmedTimer>) {
    match (pending, armed.as_ref()) {
        (None, None) => {}
        (None, Some(t)) => {
            debug!("RUNTIME: power-on timer dropped (gen {})", t.generation);
            *armed = None;
        }
        (Some(p), Some(t)) if t.generation == p.generation => {}
        (Some(p), _) => {
            debug!("RUNTIME: power-on timer armed (gen {})", p.generation);
            *armed = Some(ArmedTimer {
                generation: p.generation,
                timer: Box::pin(Timer::after(p.delay)),
            });
        }
    }
}
