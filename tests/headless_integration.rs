use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use murph::clock::ManualClock;
use murph::runtime::{AppEvent, Runner};
use murph::session::Phase;
use murph::workout::{Preset, WorkoutDraft};
use murph::{Stage, Tracker};

// Headless integration using the runtime plumbing and a manual clock, no TTY.
// Each runner tick stands for `per_tick` of wall-clock time.

fn tracker(draft: WorkoutDraft) -> (Tracker<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    (Tracker::with_clock(draft, clock.clone()), clock)
}

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

/// Drives the tracker the way the binary does: `d` completes the current step,
/// space toggles the clock, ticks poll the timer
fn drive(
    t: &mut Tracker<ManualClock>,
    clock: &ManualClock,
    runner: &Runner,
    per_tick: Duration,
    steps: u32,
) {
    for _ in 0..steps {
        match runner.step() {
            AppEvent::Tick => {
                clock.advance(per_tick);
                t.poll_clock();
            }
            AppEvent::Resize => {}
            AppEvent::Closed => break,
            AppEvent::Key(k) => match k.code {
                KeyCode::Char('d') => {
                    let phase = t.session().map(|s| s.phase());
                    let _ = match phase {
                        Some(Phase::Bodyweight) => t.complete_movement_set(),
                        Some(_) => t.complete_run_leg(),
                        None => continue,
                    };
                }
                KeyCode::Char(' ') => {
                    let _ = t.toggle_running();
                }
                _ => {}
            },
        }
        if matches!(t.stage(), Stage::Complete { .. }) {
            break;
        }
    }
}

#[test]
fn headless_bodyweight_flow_completes() {
    let mut draft = WorkoutDraft::new();
    draft.include_run(false);
    draft.select_custom();
    draft.set_rounds(2);
    draft.wear_vest(false);
    let (mut t, clock) = tracker(draft);
    t.start().unwrap();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::from_channel(rx, Duration::from_millis(5));
    for _ in 0..6 {
        tx.send(key('d')).unwrap();
    }

    drive(&mut t, &clock, &runner, Duration::from_secs(1), 100);

    assert!(matches!(t.stage(), Stage::Complete { .. }));
    assert_eq!(t.history().len(), 1);
    assert!(!t.has_pending_timer());
}

#[test]
fn headless_ticks_count_whole_seconds() {
    let mut draft = WorkoutDraft::new();
    draft.include_run(true);
    draft.select_preset(Preset::Official);
    draft.wear_vest(true);
    let (mut t, clock) = tracker(draft);
    t.start().unwrap();

    let (_tx, rx) = mpsc::channel::<AppEvent>();
    let runner = Runner::from_channel(rx, Duration::from_millis(1));

    drive(&mut t, &clock, &runner, Duration::from_millis(250), 22);

    let session = t.session().unwrap();
    assert_eq!(session.elapsed_secs(), 5);
    assert_eq!(session.phase(), Phase::OpeningRun);
}

#[test]
fn headless_pause_key_freezes_the_clock() {
    let mut draft = WorkoutDraft::new();
    draft.include_run(false);
    draft.select_preset(Preset::Small);
    draft.wear_vest(false);
    let (mut t, clock) = tracker(draft);
    t.start().unwrap();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::from_channel(rx, Duration::from_millis(1));

    tx.send(key(' ')).unwrap();
    drive(&mut t, &clock, &runner, Duration::from_secs(1), 10);
    assert_eq!(t.session().unwrap().elapsed_secs(), 0);
    assert!(!t.session().unwrap().is_running());

    tx.send(key(' ')).unwrap();
    drive(&mut t, &clock, &runner, Duration::from_secs(1), 4);
    assert_eq!(t.session().unwrap().elapsed_secs(), 3);
}
