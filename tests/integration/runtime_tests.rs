//! Control-loop tests: the real inbox and power-on timer with mock ports.

use core::time::Duration;
use std::thread;

use futures_lite::future::block_on;

use printwatch::app::commands::AppCommand;
use printwatch::app::service::{MSG_READY, MSG_SHUTTING_DOWN, MSG_TURNING_ON, MonitorService};
use printwatch::fsm::JobState;
use printwatch::power::MSG_PRINTER_ON;
use printwatch::runtime::channels::{Inbound, InboxHandle};
use printwatch::runtime::{self, Ports};

use crate::mock_ports::{MockLink, MockRelay, RecordingSink, RelayCall};

fn ports() -> Ports<MockRelay, MockLink, RecordingSink> {
    Ports {
        relay: MockRelay::new(),
        link: MockLink::new(),
        sink: RecordingSink::new(),
    }
}

/// Post `Shutdown` after `after`.
fn shutdown_later(inbox: &InboxHandle, after: Duration) -> thread::JoinHandle<()> {
    let inbox = inbox.clone();
    thread::spawn(move || {
        thread::sleep(after);
        inbox.post(Inbound::Shutdown);
    })
}

#[test]
fn shutdown_stops_the_loop() {
    let inbox = InboxHandle::new();
    let mut ports = ports();
    let mut service = MonitorService::with_delay(Duration::ZERO);
    inbox.post(Inbound::Shutdown);

    block_on(runtime::run(&mut service, &inbox, &mut ports));

    assert_eq!(ports.sink.texts(), vec![MSG_READY, MSG_SHUTTING_DOWN]);
    assert_eq!(ports.relay.calls, vec![RelayCall::Get, RelayCall::Release]);
    assert!(service.is_stopping());
}

#[test]
fn timer_fires_power_on() {
    let inbox = InboxHandle::new();
    let mut ports = ports();
    let mut service = MonitorService::with_delay(Duration::from_millis(20));
    inbox.post(Inbound::Command(AppCommand::PowerOn));
    let stopper = shutdown_later(&inbox, Duration::from_millis(500));

    block_on(runtime::run(&mut service, &inbox, &mut ports));
    stopper.join().unwrap();

    assert_eq!(ports.relay.sets(), vec![true]);
    assert_eq!(ports.link.opens(), 1);
    assert_eq!(
        ports.sink.texts(),
        vec![MSG_READY, MSG_TURNING_ON, MSG_PRINTER_ON, MSG_SHUTTING_DOWN]
    );
}

#[test]
fn off_cancels_the_armed_timer() {
    let inbox = InboxHandle::new();
    let mut ports = ports();
    let mut service = MonitorService::with_delay(Duration::from_millis(200));
    inbox.post(Inbound::Command(AppCommand::PowerOn));
    inbox.post(Inbound::Command(AppCommand::PowerOff));
    let stopper = shutdown_later(&inbox, Duration::from_millis(600));

    block_on(runtime::run(&mut service, &inbox, &mut ports));
    stopper.join().unwrap();

    assert!(ports.relay.sets().is_empty());
    assert_eq!(ports.link.opens(), 0);
    assert_eq!(service.state(), JobState::Off);
}

#[test]
fn telemetry_flows_through_the_inbox() {
    let inbox = InboxHandle::new();
    let mut ports = ports();
    ports.relay = MockRelay::starting(true);
    let mut service = MonitorService::with_delay(Duration::ZERO);

    // Adoption at start opens session 1.
    for frame in [
        r#"{"connect":1}"#,
        r#"{"printStartTime":5,"printFileName":"cube.gcode"}"#,
        r#"{"withSelfTest":100}"#,
    ] {
        inbox.post(Inbound::Telemetry {
            session: 1,
            payload: frame.as_bytes().to_vec(),
        });
    }
    inbox.post(Inbound::Command(AppCommand::Status));
    inbox.post(Inbound::Shutdown);

    block_on(runtime::run(&mut service, &inbox, &mut ports));

    assert_eq!(ports.link.last_opened(), Some(1));
    assert_eq!(service.state(), JobState::Printing);
    let photos = ports.sink.photos();
    assert_eq!(photos.len(), 2);
    assert_eq!(photos[0].1, "Started printing cube.gcode");
    assert!(photos[1].1.contains("File: cube.gcode"));
}
