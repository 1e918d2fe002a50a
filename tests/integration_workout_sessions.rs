use assert_matches::assert_matches;

use murph::clock::ManualClock;
use murph::confirm::Confirmed;
use murph::history::RecordId;
use murph::session::{Phase, RunLeg, SessionEvent};
use murph::tracker::{Destructive, Requested};
use murph::workout::{Movement, Preset, RepCounts, RunDistance, WorkoutDraft};
use murph::{Stage, Tracker, TrackerError};

// End-to-end workout flows through the tracker: configuration, session,
// history and the confirmation gate together.

fn tracker(draft: WorkoutDraft) -> Tracker<ManualClock> {
    Tracker::with_clock(draft, ManualClock::new())
}

fn official_without_runs() -> WorkoutDraft {
    let mut draft = WorkoutDraft::new();
    draft.include_run(false);
    draft.select_preset(Preset::Official);
    draft.wear_vest(false);
    draft
}

fn finish(t: &mut Tracker<ManualClock>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while t.is_active() {
        let phase = t.session().map(|s| s.phase());
        let step = match phase {
            Some(Phase::Bodyweight) => t.complete_movement_set(),
            _ => t.complete_run_leg(),
        };
        events.extend(step.unwrap());
    }
    events
}

#[test]
fn official_preset_sixty_sets_without_runs() {
    let mut t = tracker(official_without_runs());
    t.start().unwrap();

    let mut phases = Vec::new();
    for _ in 0..60 {
        phases.push(t.session().unwrap().phase());
        t.complete_movement_set().unwrap();
    }

    assert!(phases.iter().all(|p| *p == Phase::Bodyweight));
    assert_matches!(t.stage(), Stage::Complete { .. });
    let session = t.session().unwrap();
    assert_eq!(session.completed_reps(), RepCounts::new(100, 200, 300));
    assert_eq!(session.progress(), 1.0);
    assert_eq!(t.history().len(), 1);
}

#[test]
fn zero_rep_single_round_with_runs() {
    let mut draft = WorkoutDraft::new();
    draft.include_run(true);
    draft.set_run_distance(RunDistance::from_miles(1.0));
    draft.select_custom();
    draft.set_rounds(1);
    for m in Movement::ALL {
        draft.set_reps(m, 0);
    }
    draft.wear_vest(false);

    let mut t = tracker(draft);
    t.start().unwrap();
    assert_eq!(t.session().unwrap().phase(), Phase::OpeningRun);

    assert_eq!(
        t.complete_run_leg().unwrap(),
        vec![SessionEvent::RunLegCompleted(RunLeg::Opening)]
    );
    assert_eq!(t.session().unwrap().phase(), Phase::Bodyweight);

    for _ in 0..3 {
        t.complete_movement_set().unwrap();
    }
    assert_eq!(t.session().unwrap().phase(), Phase::ClosingRun);
    assert!(t.history().is_empty());

    assert_eq!(
        t.complete_run_leg().unwrap(),
        vec![
            SessionEvent::RunLegCompleted(RunLeg::Closing),
            SessionEvent::WorkoutCompleted
        ]
    );
    assert_eq!(t.history().len(), 1);
    let record = t.history().get(0).unwrap();
    assert_eq!(record.completed_reps, RepCounts::default());
    assert_eq!(record.config.run_distance(), Some(RunDistance::from_tenths(10)));
}

#[test]
fn sets_are_illegal_during_runs() {
    let mut draft = official_without_runs();
    draft.include_run(true);
    let mut t = tracker(draft);
    t.start().unwrap();

    assert_matches!(
        t.complete_movement_set(),
        Err(TrackerError::IllegalTransition { .. })
    );
    assert_eq!(t.session().unwrap().completed_reps(), RepCounts::default());
}

#[test]
fn run_legs_are_illegal_without_runs() {
    let mut t = tracker(official_without_runs());
    t.start().unwrap();
    assert_matches!(
        t.complete_run_leg(),
        Err(TrackerError::IllegalTransition { .. })
    );
}

#[test]
fn paused_ticks_are_not_counted() {
    let mut t = tracker(official_without_runs());
    t.start().unwrap();
    for _ in 0..7 {
        t.tick();
    }

    t.toggle_running().unwrap();
    for _ in 0..50 {
        t.tick();
    }
    assert_eq!(t.session().unwrap().elapsed_secs(), 7);

    t.toggle_running().unwrap();
    for _ in 0..50 {
        t.tick();
    }
    assert_eq!(t.session().unwrap().elapsed_secs(), 57);
}

#[test]
fn reset_then_start_begins_at_zero() {
    let mut t = tracker(official_without_runs());
    t.start().unwrap();
    for _ in 0..30 {
        t.tick();
    }
    t.complete_movement_set().unwrap();

    t.reset();
    assert_eq!(t.stage(), &Stage::Idle);
    assert!(!t.has_pending_timer());
    assert!(t.session().is_none());

    t.start().unwrap();
    let session = t.session().unwrap();
    assert_eq!(session.elapsed_secs(), 0);
    assert_eq!(session.completed_reps(), RepCounts::default());
    assert_eq!(session.current_round(), 1);
}

#[test]
fn incomplete_draft_cannot_start() {
    let mut draft = WorkoutDraft::new();
    draft.include_run(true);
    let mut t = tracker(draft);

    let err = t.start().unwrap_err();
    assert_eq!(
        err.to_string(),
        "workout configuration is incomplete: missing bodyweight, vest"
    );
    assert_eq!(t.stage(), &Stage::Idle);
}

#[test]
fn progress_never_goes_backwards() {
    let mut draft = official_without_runs();
    draft.include_run(true);
    draft.select_preset(Preset::Big);
    let mut t = tracker(draft);
    t.start().unwrap();

    let mut last = t.session().unwrap().progress();
    while t.is_active() {
        let phase = t.session().unwrap().phase();
        match phase {
            Phase::Bodyweight => t.complete_movement_set().unwrap(),
            _ => t.complete_run_leg().unwrap(),
        };
        let now = t.session().unwrap().progress();
        assert!(now >= last);
        if t.is_active() {
            assert!(now < 1.0);
        }
        last = now;
    }
    assert_eq!(last, 1.0);
}

#[test]
fn delete_keeps_order_of_the_rest() {
    let mut t = tracker(official_without_runs());
    for _ in 0..3 {
        t.start().unwrap();
        finish(&mut t);
        t.reset();
    }
    let ids: Vec<RecordId> = t.history().list().map(|r| r.id).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids[0] > ids[1] && ids[1] > ids[2]);

    t.request_delete(ids[1]).unwrap();
    assert_eq!(
        t.confirm().unwrap(),
        Confirmed::Again(Destructive::DeleteRecord(ids[1]))
    );
    assert_eq!(
        t.confirm().unwrap(),
        Confirmed::Proceed(Destructive::DeleteRecord(ids[1]))
    );

    let left: Vec<RecordId> = t.history().list().map(|r| r.id).collect();
    assert_eq!(left, vec![ids[0], ids[2]]);

    assert_matches!(
        t.request_delete(ids[1]),
        Err(TrackerError::NotFound(id)) if id == ids[1]
    );
    assert_eq!(t.pending(), None);
}

#[test]
fn any_action_between_confirmations_cancels() {
    let mut t = tracker(official_without_runs());
    t.start().unwrap();
    finish(&mut t);
    let id = t.history().get(0).unwrap().id;

    t.request_delete(id).unwrap();
    t.confirm().unwrap();
    t.configure(|d| d.set_rounds(3)).unwrap();
    assert_eq!(t.pending(), None);
    assert_eq!(t.confirm().unwrap(), Confirmed::Nothing);
    assert_eq!(t.history().len(), 1);
}

#[test]
fn finishing_emits_the_distinct_completion_event_once() {
    let mut t = tracker(official_without_runs());
    t.start().unwrap();
    let events = finish(&mut t);

    assert_eq!(events.len(), 61);
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == SessionEvent::WorkoutCompleted)
            .count(),
        1
    );
    assert_eq!(events.last(), Some(&SessionEvent::WorkoutCompleted));
}

#[test]
fn reset_outside_a_session_needs_no_confirmation() {
    let mut t = tracker(official_without_runs());
    assert_eq!(t.request_reset(), Requested::Applied);

    t.start().unwrap();
    assert_eq!(t.request_reset(), Requested::AwaitingConfirmation);
    assert!(t.is_active());
}
