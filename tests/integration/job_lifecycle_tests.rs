//! End-to-end job lifecycle over one power cycle.
//!
//! Frames go in as raw JSON exactly as the printer sends them; the tests
//! assert on the resulting state, scoreboard and notifications.

use core::time::Duration;

use printwatch::app::commands::AppCommand;
use printwatch::app::events::ImageSource;
use printwatch::app::service::MonitorService;
use printwatch::fsm::JobState;
use printwatch::telemetry::Field;

use crate::mock_ports::{MockLink, MockRelay, RecordingSink};

struct Printer {
    app: MonitorService,
    relay: MockRelay,
    link: MockLink,
    sink: RecordingSink,
}

impl Printer {
    /// Powered on, connected and idle, with the sink cleared.
    fn idle() -> Self {
        let mut p = Self {
            app: MonitorService::with_delay(Duration::ZERO),
            relay: MockRelay::new(),
            link: MockLink::new(),
            sink: RecordingSink::new(),
        };
        p.app.start(&mut p.relay, &mut p.link, &mut p.sink);
        p.app
            .handle_command(AppCommand::PowerOn, &mut p.relay, &mut p.link, &mut p.sink);
        let generation = p.app.pending().expect("power-on pending").generation;
        p.app
            .handle_power_on_due(generation, &mut p.relay, &mut p.link, &mut p.sink);
        p.frame(r#"{"connect":1,"nozzleTemp":"24.500000","bedTemp0":"23.1"}"#);
        assert_eq!(p.app.state(), JobState::Idle);
        p.sink.clear();
        p
    }

    fn frame(&mut self, json: &str) {
        let session = self.link.last_opened().expect("no open session");
        self.app
            .handle_telemetry(session, json.as_bytes(), &mut self.sink);
    }

    fn status(&mut self) {
        self.app
            .handle_command(AppCommand::Status, &mut self.relay, &mut self.link, &mut self.sink);
    }
}

#[test]
fn full_print_job() {
    let mut p = Printer::idle();

    p.frame(r#"{"printStartTime":1700000000,"printFileName":"benchy.gcode","withSelfTest":0}"#);
    assert_eq!(p.app.state(), JobState::Setup);
    assert_eq!(
        p.sink.photos(),
        vec![(ImageSource::JobThumbnail, "Started printing benchy.gcode")]
    );

    p.frame(r#"{"withSelfTest":50,"nozzleTemp":"180.0"}"#);
    assert_eq!(p.app.state(), JobState::Setup);
    p.frame(r#"{"withSelfTest":100}"#);
    assert_eq!(p.app.state(), JobState::Printing);

    p.frame(r#"{"printJobTime":600,"printLeftTime":600,"curPosition":"X:10.00 Y:20.00 Z:1.20"}"#);
    p.status();
    let (image, caption) = p.sink.photos()[1];
    assert_eq!(image, ImageSource::Snapshot);
    assert!(caption.contains("State: printing"), "{caption}");
    assert!(caption.contains("File: benchy.gcode"), "{caption}");
    assert!(caption.contains("Progress: 50%"), "{caption}");
    assert!(caption.contains("Time left: 10m"), "{caption}");

    p.frame(r#"{"printJobTime":1200,"printLeftTime":0,"fan":255}"#);
    assert_eq!(p.app.state(), JobState::Complete);
    let (image, caption) = p.sink.photos()[2];
    assert_eq!(image, ImageSource::Snapshot);
    assert!(caption.starts_with("Printing complete!\n\nState: printing"));
    assert!(caption.contains("Progress: 100%"));
    for field in Field::JOB {
        assert_eq!(p.app.scoreboard().get(field), None, "{field} not cleared");
    }

    p.frame(r#"{"fan":128}"#);
    assert_eq!(p.app.state(), JobState::Complete);
    p.frame(r#"{"fan":0}"#);
    assert_eq!(p.app.state(), JobState::Idle);
    assert_eq!(p.sink.sent.len(), 3);
}

#[test]
fn aborted_job_then_a_new_one_without_power_cycle() {
    let mut p = Printer::idle();
    p.frame(r#"{"printStartTime":1,"printFileName":"a.gcode"}"#);
    p.frame(r#"{"withSelfTest":100}"#);
    p.frame(r#"{"state":4,"printLeftTime":0}"#);
    assert_eq!(p.app.state(), JobState::Aborted);
    assert!(p.sink.photos()[1].1.starts_with("Printing aborted!"));

    p.frame(r#"{"fan":0}"#);
    p.frame(r#"{"printStartTime":2,"printFileName":"b.gcode"}"#);
    assert_eq!(p.app.state(), JobState::Setup);
    assert_eq!(p.sink.photos()[2].1, "Started printing b.gcode");
}

#[test]
fn sentinels_and_garbage_do_not_disturb_the_job() {
    let mut p = Printer::idle();
    p.frame(r#"{"printStartTime":1,"printFileName":"a.gcode"}"#);
    p.frame(r#"{"withSelfTest":100}"#);
    p.frame(r#"{"printJobTime":60,"printLeftTime":30}"#);

    p.frame("not json at all");
    p.frame(r#"["array"]"#);
    p.frame(r#"{"printLeftTime":null,"printFileName":null}"#);
    assert_eq!(p.app.state(), JobState::Printing);
    assert_eq!(p.app.scoreboard().number(Field::PrintLeftTime), Some(30.0));
    assert_eq!(
        p.app.scoreboard().get(Field::PrintFileName).map(ToString::to_string),
        Some("a.gcode".to_owned())
    );
    assert_eq!(p.sink.sent.len(), 1);
}

#[test]
fn handshake_never_starts_a_job() {
    let mut p = Printer::idle();
    p.frame(r#"{"connect":1,"printStartTime":1700000000,"printFileName":"old.gcode"}"#);
    assert_eq!(p.app.state(), JobState::Idle);
    assert!(p.sink.sent.is_empty());
    assert_eq!(
        p.app.scoreboard().get(Field::PrintFileName).map(ToString::to_string),
        Some("old.gcode".to_owned())
    );
}

#[test]
fn status_when_idle_omits_job_lines() {
    let mut p = Printer::idle();
    p.status();
    let (_, caption) = p.sink.photos()[0];
    assert!(caption.starts_with("State: idle"));
    assert!(caption.contains("Nozzle temperature: 25°C"), "{caption}");
    assert!(caption.contains("Bed temperature: 23°C"), "{caption}");
    assert!(caption.contains("Box temperature: unknown"), "{caption}");
    assert!(!caption.contains("Progress"));
}
