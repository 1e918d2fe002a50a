use chrono::Local;
use tracing::{info, warn};

use crate::clock::{Clock, IntervalTimer, SystemClock};
use crate::confirm::{ConfirmGate, Confirmed};
use crate::error::{Result, TrackerError};
use crate::history::{CompletedWorkoutRecord, HistoryStore, RecordId};
use crate::session::{SessionEvent, SessionState};
use crate::workout::WorkoutDraft;

/// Where the tracker is in the workout lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Idle,
    Active(SessionState),
    /// Terminal until an explicit reset; `record` is the history entry it produced
    Complete {
        session: SessionState,
        record: RecordId,
    },
}

/// Actions that discard user data and therefore go through the confirm gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destructive {
    ResetSession,
    DeleteRecord(RecordId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requested {
    /// Held until confirmed twice
    AwaitingConfirmation,
    /// Nothing to lose, so it was applied right away
    Applied,
}

/// Owns the draft, the current session, its one-second timer and the history.
///
/// All user actions go through here. Every action other than a confirmation
/// cancels a pending destructive request.
#[derive(Debug)]
pub struct Tracker<C: Clock = SystemClock> {
    clock: C,
    draft: WorkoutDraft,
    stage: Stage,
    history: HistoryStore,
    timer: IntervalTimer,
    gate: ConfirmGate<Destructive>,
}

impl Tracker<SystemClock> {
    pub fn new(draft: WorkoutDraft) -> Self {
        Self::with_clock(draft, SystemClock)
    }
}

impl<C: Clock> Tracker<C> {
    pub fn with_clock(draft: WorkoutDraft, clock: C) -> Self {
        Self {
            clock,
            draft,
            stage: Stage::Idle,
            history: HistoryStore::new(),
            timer: IntervalTimer::default(),
            gate: ConfirmGate::default(),
        }
    }

    pub fn draft(&self) -> &WorkoutDraft {
        &self.draft
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// The active or just-finished session
    pub fn session(&self) -> Option<&SessionState> {
        match &self.stage {
            Stage::Idle => None,
            Stage::Active(s) | Stage::Complete { session: s, .. } => Some(s),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.stage, Stage::Active(_))
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn has_pending_timer(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn pending(&self) -> Option<Destructive> {
        self.gate.pending()
    }

    /// Whether the pending action needs only one more confirmation
    pub fn is_final_confirmation(&self) -> bool {
        self.gate.is_final_step()
    }

    /// Edit the draft; refused while a session is active
    pub fn configure<F: FnOnce(&mut WorkoutDraft)>(&mut self, edit: F) -> Result<()> {
        self.gate.cancel();
        if self.is_active() {
            return Err(TrackerError::ConfigurationLocked);
        }
        edit(&mut self.draft);
        Ok(())
    }

    pub fn start(&mut self) -> Result<()> {
        self.gate.cancel();
        if !matches!(self.stage, Stage::Idle) {
            return Err(illegal(&self.stage, "start a workout"));
        }

        let config = self.draft.finalize().inspect_err(|e| {
            warn!(error = %e, "refusing to start");
        })?;
        info!(plan = %config.summary(), "workout started");

        self.stage = Stage::Active(SessionState::start(config));
        self.timer.arm(self.clock.now());
        Ok(())
    }

    /// One second of wall-clock time; ignored unless a session is running
    pub fn tick(&mut self) -> bool {
        match &mut self.stage {
            Stage::Active(s) => s.tick(),
            _ => false,
        }
    }

    /// Deliver every tick the timer owes since the last poll
    pub fn poll_clock(&mut self) -> u32 {
        let fired = self.timer.poll(self.clock.now());
        (0..fired).filter(|_| self.tick()).count() as u32
    }

    pub fn toggle_running(&mut self) -> Result<bool> {
        self.gate.cancel();
        // seconds that came due before a pause still count
        self.poll_clock();
        let now = self.clock.now();
        let running = self.active_mut("pause or resume")?.toggle_running()?;
        if running {
            self.timer.arm(now);
        } else {
            self.timer.suspend(now);
        }
        Ok(running)
    }

    pub fn complete_run_leg(&mut self) -> Result<Vec<SessionEvent>> {
        self.gate.cancel();
        let events = self
            .active_mut("complete a run")?
            .complete_run_leg()
            .inspect_err(|e| warn!(error = %e, "rejected"))?;
        self.absorb(&events);
        Ok(events)
    }

    pub fn complete_movement_set(&mut self) -> Result<Vec<SessionEvent>> {
        self.gate.cancel();
        let events = self
            .active_mut("complete a set")?
            .complete_movement_set()
            .inspect_err(|e| warn!(error = %e, "rejected"))?;
        self.absorb(&events);
        Ok(events)
    }

    /// Back to idle from anywhere; history is untouched
    pub fn reset(&mut self) {
        self.timer.disarm();
        self.gate.cancel();
        if !matches!(self.stage, Stage::Idle) {
            info!("session reset");
        }
        self.stage = Stage::Idle;
    }

    /// Reset, asking for confirmation when it would discard an active session
    pub fn request_reset(&mut self) -> Requested {
        if self.is_active() {
            self.gate.request(Destructive::ResetSession);
            Requested::AwaitingConfirmation
        } else {
            self.reset();
            Requested::Applied
        }
    }

    pub fn request_delete(&mut self, id: RecordId) -> Result<()> {
        self.gate.cancel();
        if self.history.find(id).is_none() {
            return Err(TrackerError::NotFound(id));
        }
        self.gate.request(Destructive::DeleteRecord(id));
        Ok(())
    }

    /// Advance the pending destructive action, running it on the second confirmation
    pub fn confirm(&mut self) -> Result<Confirmed<Destructive>> {
        let outcome = self.gate.confirm();
        if let Confirmed::Proceed(action) = outcome {
            match action {
                Destructive::ResetSession => self.reset(),
                Destructive::DeleteRecord(id) => {
                    self.history.delete(id)?;
                }
            }
        }
        Ok(outcome)
    }

    pub fn cancel_pending(&mut self) -> Option<Destructive> {
        self.gate.cancel()
    }

    fn absorb(&mut self, events: &[SessionEvent]) {
        if events.contains(&SessionEvent::WorkoutCompleted) {
            self.finalize();
        }
    }

    fn finalize(&mut self) {
        self.timer.disarm();
        let Stage::Active(session) = std::mem::replace(&mut self.stage, Stage::Idle) else {
            return;
        };

        let completed_at = Local::now();
        let id = self.history.next_id(completed_at);
        self.history.append(CompletedWorkoutRecord {
            id,
            completed_at,
            total_elapsed_secs: session.elapsed_secs(),
            config: session.config().clone(),
            completed_reps: session.completed_reps(),
        });
        self.stage = Stage::Complete {
            session,
            record: id,
        };
    }

    fn active_mut(&mut self, action: &'static str) -> Result<&mut SessionState> {
        match &mut self.stage {
            Stage::Active(s) => Ok(s),
            other => Err(illegal(other, action)),
        }
    }
}

fn illegal(stage: &Stage, action: &'static str) -> TrackerError {
    let state = match stage {
        Stage::Idle => "no workout is in progress",
        Stage::Active(_) => "a workout is already in progress",
        Stage::Complete { .. } => "the workout is complete",
    };
    TrackerError::IllegalTransition {
        action,
        state: state.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::session::Phase;
    use crate::workout::{Movement, Preset, RepCounts};
    use assert_matches::assert_matches;
    use std::time::Duration;

    fn tracker(include_run: bool, rounds: u32) -> (Tracker<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let mut draft = WorkoutDraft::new();
        draft.include_run(include_run);
        draft.select_custom();
        draft.set_rounds(rounds);
        draft.wear_vest(false);
        (Tracker::with_clock(draft, clock.clone()), clock)
    }

    fn finish_bodyweight<C: Clock>(t: &mut Tracker<C>) {
        while t.session().map(|s| s.phase()) == Some(Phase::Bodyweight) && t.is_active() {
            t.complete_movement_set().unwrap();
        }
    }

    #[test]
    fn start_requires_complete_draft() {
        let mut t = Tracker::with_clock(WorkoutDraft::new(), ManualClock::new());
        assert_matches!(t.start(), Err(TrackerError::InvalidConfiguration(_)));
        assert_eq!(t.stage(), &Stage::Idle);
        assert!(!t.has_pending_timer());
    }

    #[test]
    fn start_arms_timer_and_clock_drives_ticks() {
        let (mut t, clock) = tracker(false, 2);
        t.start().unwrap();
        assert!(t.has_pending_timer());

        clock.advance(Duration::from_millis(3200));
        assert_eq!(t.poll_clock(), 3);
        assert_eq!(t.session().unwrap().elapsed_secs(), 3);
    }

    #[test]
    fn pause_stops_timer_and_resume_restarts_it() {
        let (mut t, clock) = tracker(false, 2);
        t.start().unwrap();
        clock.advance(Duration::from_secs(4));
        t.poll_clock();

        assert!(!t.toggle_running().unwrap());
        assert!(!t.has_pending_timer());
        clock.advance(Duration::from_secs(60));
        assert_eq!(t.poll_clock(), 0);
        for _ in 0..10 {
            t.tick();
        }
        assert_eq!(t.session().unwrap().elapsed_secs(), 4);

        assert!(t.toggle_running().unwrap());
        clock.advance(Duration::from_secs(5));
        t.poll_clock();
        assert_eq!(t.session().unwrap().elapsed_secs(), 9);
    }

    #[test]
    fn partial_seconds_survive_a_pause() {
        let (mut t, clock) = tracker(false, 2);
        t.start().unwrap();

        clock.advance(Duration::from_millis(999));
        t.toggle_running().unwrap();
        clock.advance(Duration::from_secs(20));
        t.toggle_running().unwrap();
        clock.advance(Duration::from_millis(10));
        t.poll_clock();
        assert_eq!(t.session().unwrap().elapsed_secs(), 1);

        // four short bursts of running add up to one more second
        for _ in 0..4 {
            clock.advance(Duration::from_millis(250));
            t.toggle_running().unwrap();
            clock.advance(Duration::from_secs(3));
            t.toggle_running().unwrap();
        }
        t.poll_clock();
        assert_eq!(t.session().unwrap().elapsed_secs(), 2);
    }

    #[test]
    fn pausing_counts_seconds_already_due() {
        let (mut t, clock) = tracker(false, 2);
        t.start().unwrap();
        clock.advance(Duration::from_millis(2500));

        t.toggle_running().unwrap();
        assert_eq!(t.session().unwrap().elapsed_secs(), 2);

        t.toggle_running().unwrap();
        clock.advance(Duration::from_millis(500));
        t.poll_clock();
        assert_eq!(t.session().unwrap().elapsed_secs(), 3);
    }

    #[test]
    fn configuration_is_locked_while_active() {
        let (mut t, _) = tracker(false, 2);
        t.start().unwrap();
        assert_matches!(
            t.configure(|d| d.set_rounds(9)),
            Err(TrackerError::ConfigurationLocked)
        );
        assert_eq!(t.session().unwrap().config().rounds(), 2);

        t.reset();
        t.configure(|d| d.set_rounds(9)).unwrap();
        assert_eq!(t.draft().rounds(), 9);
    }

    #[test]
    fn completion_without_runs_records_history() {
        let (mut t, clock) = tracker(false, 2);
        t.start().unwrap();
        clock.advance(Duration::from_secs(90));
        t.poll_clock();
        finish_bodyweight(&mut t);

        assert_matches!(t.stage(), Stage::Complete { .. });
        assert!(!t.has_pending_timer());
        assert_eq!(t.history().len(), 1);

        let record = t.history().get(0).unwrap();
        assert_eq!(record.total_elapsed_secs, 90);
        assert_eq!(record.completed_reps, RepCounts::new(10, 20, 30));
        assert_eq!(record.config.rounds(), 2);
    }

    #[test]
    fn runs_need_two_legs() {
        let (mut t, _) = tracker(true, 1);
        t.start().unwrap();
        assert_matches!(
            t.complete_movement_set(),
            Err(TrackerError::IllegalTransition { .. })
        );

        t.complete_run_leg().unwrap();
        finish_bodyweight(&mut t);
        assert_eq!(t.session().unwrap().phase(), Phase::ClosingRun);
        assert!(t.history().is_empty());

        let events = t.complete_run_leg().unwrap();
        assert_eq!(events.last(), Some(&SessionEvent::WorkoutCompleted));
        assert_eq!(t.history().len(), 1);
    }

    #[test]
    fn complete_stage_is_terminal() {
        let (mut t, _) = tracker(false, 1);
        t.start().unwrap();
        finish_bodyweight(&mut t);

        assert!(t.start().is_err());
        assert!(t.toggle_running().is_err());
        assert!(t.complete_movement_set().is_err());
        assert!(!t.tick());

        t.reset();
        t.start().unwrap();
        assert_eq!(t.session().unwrap().elapsed_secs(), 0);
        assert_eq!(t.history().len(), 1);
    }

    #[test]
    fn actions_while_idle_are_illegal() {
        let (mut t, _) = tracker(true, 1);
        assert_matches!(
            t.complete_run_leg(),
            Err(TrackerError::IllegalTransition { state, .. }) if state == "no workout is in progress"
        );
        assert!(t.toggle_running().is_err());
    }

    #[test]
    fn reset_stops_the_timer_before_clearing() {
        let (mut t, clock) = tracker(false, 3);
        t.start().unwrap();
        t.complete_movement_set().unwrap();
        t.reset();

        assert_eq!(t.stage(), &Stage::Idle);
        assert!(!t.has_pending_timer());
        clock.advance(Duration::from_secs(30));
        assert_eq!(t.poll_clock(), 0);
        assert!(t.session().is_none());
    }

    #[test]
    fn reset_of_active_session_needs_two_confirmations() {
        let (mut t, _) = tracker(false, 3);
        t.start().unwrap();

        assert_eq!(t.request_reset(), Requested::AwaitingConfirmation);
        assert_eq!(
            t.confirm().unwrap(),
            Confirmed::Again(Destructive::ResetSession)
        );
        assert!(t.is_active());
        assert_eq!(
            t.confirm().unwrap(),
            Confirmed::Proceed(Destructive::ResetSession)
        );
        assert_eq!(t.stage(), &Stage::Idle);
    }

    #[test]
    fn other_action_cancels_pending_reset() {
        let (mut t, _) = tracker(false, 3);
        t.start().unwrap();
        t.request_reset();
        t.confirm().unwrap();
        t.complete_movement_set().unwrap();

        assert_eq!(t.pending(), None);
        assert_eq!(t.confirm().unwrap(), Confirmed::Nothing);
        assert!(t.is_active());
        assert_eq!(t.session().unwrap().current_movement(), Movement::Pushups);
    }

    #[test]
    fn reset_from_complete_is_immediate() {
        let (mut t, _) = tracker(false, 1);
        t.start().unwrap();
        finish_bodyweight(&mut t);
        assert_eq!(t.request_reset(), Requested::Applied);
        assert_eq!(t.stage(), &Stage::Idle);
    }

    #[test]
    fn delete_goes_through_the_gate() {
        let clock = ManualClock::new();
        let mut draft = WorkoutDraft::new();
        draft.include_run(false);
        draft.select_preset(Preset::Big);
        draft.wear_vest(true);
        let mut t = Tracker::with_clock(draft, clock);

        for _ in 0..2 {
            t.start().unwrap();
            finish_bodyweight(&mut t);
            t.reset();
        }
        let newest = t.history().get(0).unwrap().id;
        let oldest = t.history().get(1).unwrap().id;

        t.request_delete(newest).unwrap();
        assert_eq!(
            t.confirm().unwrap(),
            Confirmed::Again(Destructive::DeleteRecord(newest))
        );
        assert_eq!(t.history().len(), 2);
        t.confirm().unwrap();

        let ids: Vec<RecordId> = t.history().list().map(|r| r.id).collect();
        assert_eq!(ids, vec![oldest]);
    }

    #[test]
    fn request_delete_of_unknown_record() {
        let (mut t, _) = tracker(false, 1);
        assert_matches!(
            t.request_delete(RecordId(1)),
            Err(TrackerError::NotFound(RecordId(1)))
        );
        assert_eq!(t.pending(), None);
    }
}
