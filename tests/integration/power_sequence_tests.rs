//! Integration tests for the command → power sequencer → relay/link chain.
//!
//! Drive [`MonitorService`] the way the control loop does, firing the
//! power-on timer by hand.

use core::time::Duration;

use printwatch::app::commands::AppCommand;
use printwatch::app::ports::ConnectionError;
use printwatch::app::service::{MSG_READY, MSG_TURNING_OFF, MSG_TURNING_ON, MonitorService};
use printwatch::fsm::JobState;
use printwatch::power::{MSG_CONNECTION_LOST, MSG_PRINTER_ON};

use crate::mock_ports::{LinkCall, MockLink, MockRelay, RecordingSink, RelayCall};

const DELAY: Duration = Duration::from_secs(10);

struct Rig {
    app: MonitorService,
    relay: MockRelay,
    link: MockLink,
    sink: RecordingSink,
}

impl Rig {
    fn start_with(relay: MockRelay) -> Self {
        let mut rig = Self {
            app: MonitorService::with_delay(DELAY),
            relay,
            link: MockLink::new(),
            sink: RecordingSink::new(),
        };
        rig.app.start(&mut rig.relay, &mut rig.link, &mut rig.sink);
        rig
    }

    fn start() -> Self {
        Self::start_with(MockRelay::new())
    }

    fn command(&mut self, cmd: AppCommand) {
        self.app
            .handle_command(cmd, &mut self.relay, &mut self.link, &mut self.sink);
    }

    /// Fire whatever timer the loop would have armed.
    fn fire_timer(&mut self) {
        if let Some(p) = self.app.pending() {
            self.fire(p.generation);
        }
    }

    fn fire(&mut self, generation: u64) {
        self.app
            .handle_power_on_due(generation, &mut self.relay, &mut self.link, &mut self.sink);
    }

    fn frame(&mut self, json: &str) {
        let session = self.link.last_opened().expect("no open session");
        self.app
            .handle_telemetry(session, json.as_bytes(), &mut self.sink);
    }
}

// ── Start-up ─────────────────────────────────────────────────

#[test]
fn start_announces_and_queries_relay_once() {
    let rig = Rig::start();
    assert_eq!(rig.sink.texts(), vec![MSG_READY]);
    assert_eq!(rig.relay.calls, vec![RelayCall::Get]);
    assert_eq!(rig.app.state(), JobState::Off);
    assert_eq!(rig.link.opens(), 0);
}

#[test]
fn start_adopts_a_relay_that_is_already_on() {
    let mut rig = Rig::start_with(MockRelay::starting(true));
    assert_eq!(rig.relay.sets(), Vec::<bool>::new());
    assert_eq!(rig.link.opens(), 1);
    assert_eq!(rig.sink.texts(), vec![MSG_READY, MSG_PRINTER_ON]);
    assert_eq!(rig.app.state(), JobState::Pending);

    rig.frame(r#"{"connect":1}"#);
    assert_eq!(rig.app.state(), JobState::Idle);
}

#[test]
fn unreachable_relay_at_start_assumes_off() {
    let mut relay = MockRelay::new();
    relay.fail = true;
    let rig = Rig::start_with(relay);
    assert_eq!(rig.app.state(), JobState::Off);
    assert_eq!(rig.sink.texts(), vec![MSG_READY]);
}

// ── Power on ─────────────────────────────────────────────────

#[test]
fn on_then_timer_energises_and_opens() {
    let mut rig = Rig::start();
    rig.sink.clear();

    rig.command(AppCommand::PowerOn);
    assert_eq!(rig.app.state(), JobState::Pending);
    assert_eq!(rig.relay.sets(), Vec::<bool>::new());

    rig.fire_timer();
    assert_eq!(rig.relay.sets(), vec![true]);
    assert_eq!(rig.link.opens(), 1);
    assert_eq!(rig.sink.texts(), vec![MSG_TURNING_ON, MSG_PRINTER_ON]);
}

#[test]
fn double_on_actuates_once() {
    let mut rig = Rig::start();
    rig.command(AppCommand::PowerOn);
    rig.command(AppCommand::PowerOn);
    rig.fire_timer();
    rig.fire_timer();
    rig.command(AppCommand::PowerOn);
    assert_eq!(rig.relay.sets(), vec![true]);
    assert_eq!(rig.link.opens(), 1);
}

#[test]
fn off_before_expiry_means_no_actuation() {
    let mut rig = Rig::start();
    rig.command(AppCommand::PowerOn);
    let stale = rig.app.pending().unwrap().generation;
    rig.command(AppCommand::PowerOff);
    rig.fire(stale);

    assert_eq!(rig.relay.sets(), Vec::<bool>::new());
    assert_eq!(rig.link.opens(), 0);
    assert_eq!(rig.app.state(), JobState::Off);
    assert!(rig.app.pending().is_none());
}

#[test]
fn stale_timer_does_not_fire_the_next_cycle() {
    let mut rig = Rig::start();
    rig.command(AppCommand::PowerOn);
    let first = rig.app.pending().unwrap().generation;
    rig.command(AppCommand::PowerOff);
    rig.command(AppCommand::PowerOn);

    rig.fire(first);
    assert!(rig.relay.sets().is_empty());
    assert_eq!(rig.app.state(), JobState::Pending);

    rig.fire_timer();
    assert_eq!(rig.relay.sets(), vec![true]);
}

// ── Power off ────────────────────────────────────────────────

#[test]
fn off_closes_session_and_switches_relay() {
    let mut rig = Rig::start();
    rig.command(AppCommand::PowerOn);
    rig.fire_timer();
    let session = rig.link.last_opened().unwrap();
    rig.frame(r#"{"connect":1}"#);

    rig.command(AppCommand::PowerOff);
    assert_eq!(rig.relay.sets(), vec![true, false]);
    assert!(rig.link.calls.contains(&LinkCall::Close(session)));
    assert_eq!(rig.app.state(), JobState::Off);
    assert_eq!(rig.sink.texts().last(), Some(&MSG_TURNING_OFF));
}

#[test]
fn failed_off_keeps_state_for_retry() {
    let mut rig = Rig::start();
    rig.command(AppCommand::PowerOn);
    rig.fire_timer();
    rig.frame(r#"{"connect":1}"#);

    rig.relay.fail = true;
    rig.command(AppCommand::PowerOff);
    assert_eq!(rig.app.state(), JobState::Idle);
    assert!(rig.sink.texts().last().unwrap().starts_with("Could not switch the printer off"));

    rig.relay.fail = false;
    rig.command(AppCommand::PowerOff);
    assert_eq!(rig.app.state(), JobState::Off);
    assert_eq!(rig.relay.sets(), vec![true, false]);
}

// ── Connection loss ──────────────────────────────────────────

#[test]
fn lost_stream_forces_off_and_later_off_still_switches_relay() {
    let mut rig = Rig::start();
    rig.command(AppCommand::PowerOn);
    rig.fire_timer();
    let session = rig.link.last_opened().unwrap();
    rig.frame(r#"{"connect":1}"#);

    rig.app.handle_link_closed(
        session,
        &ConnectionError::Closed("reset by peer".into()),
        &mut rig.sink,
    );
    assert_eq!(rig.app.state(), JobState::Off);
    assert_eq!(rig.sink.texts().last(), Some(&MSG_CONNECTION_LOST));

    // Frames still queued from the dead stream are ignored.
    rig.app
        .handle_telemetry(session, br#"{"printStartTime":1}"#, &mut rig.sink);
    assert_eq!(rig.app.state(), JobState::Off);

    rig.command(AppCommand::PowerOff);
    assert_eq!(rig.relay.sets(), vec![true, false]);
}

#[test]
fn refused_stream_is_reported_as_lost() {
    let mut rig = Rig::start();
    rig.link.refuse = true;
    rig.command(AppCommand::PowerOn);
    rig.fire_timer();
    assert_eq!(rig.app.state(), JobState::Off);
    assert_eq!(rig.sink.texts().last(), Some(&MSG_CONNECTION_LOST));

    rig.link.refuse = false;
    rig.command(AppCommand::PowerOn);
    rig.fire_timer();
    assert_eq!(rig.link.opens(), 1);
    assert_eq!(rig.app.state(), JobState::Pending);
}
