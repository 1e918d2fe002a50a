use tracing::debug;

use crate::error::{Result, TrackerError};
use crate::workout::{Movement, RepCounts, WorkoutConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    #[strum(serialize = "opening run")]
    OpeningRun,
    #[strum(serialize = "bodyweight rounds")]
    Bodyweight,
    #[strum(serialize = "closing run")]
    ClosingRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLeg {
    Opening,
    Closing,
}

/// Notifications for the feedback collaborator (sound, bell, animation)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SetCompleted {
        movement: Movement,
        round: u32,
        reps: u32,
    },
    RunLegCompleted(RunLeg),
    /// Always the last event of the step that finished the workout
    WorkoutCompleted,
}

/// Progress through a single workout.
///
/// Created from a finalized [`WorkoutConfig`]; the caller delivers one
/// [`tick`](SessionState::tick) per wall-clock second and user actions in
/// between. Reps are credited a whole set at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    config: WorkoutConfig,
    phase: Phase,
    running: bool,
    elapsed_secs: u64,
    current_round: u32,
    current_movement: Movement,
    completed: RepCounts,
    finished: bool,
}

impl SessionState {
    /// Begin a session with the clock running
    pub fn start(config: WorkoutConfig) -> Self {
        let phase = if config.includes_run() {
            Phase::OpeningRun
        } else {
            Phase::Bodyweight
        };
        debug!(?phase, rounds = config.rounds(), "session started");

        Self {
            config,
            phase,
            running: true,
            elapsed_secs: 0,
            current_round: 1,
            current_movement: Movement::Pullups,
            completed: RepCounts::default(),
            finished: false,
        }
    }

    pub fn config(&self) -> &WorkoutConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn current_movement(&self) -> Movement {
        self.current_movement
    }

    pub fn completed_reps(&self) -> RepCounts {
        self.completed
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Reps the current set asks for
    pub fn current_target(&self) -> u32 {
        self.config.per_round(self.current_movement)
    }

    /// Advance the clock by one second; a no-op while paused or finished.
    /// Returns whether time was counted.
    pub fn tick(&mut self) -> bool {
        if !self.running || self.finished {
            return false;
        }
        self.elapsed_secs += 1;
        true
    }

    /// Pause or resume. Returns the new running state.
    pub fn toggle_running(&mut self) -> Result<bool> {
        if self.finished {
            return Err(self.illegal("pause or resume"));
        }
        self.running = !self.running;
        debug!(running = self.running, elapsed = self.elapsed_secs, "clock toggled");
        Ok(self.running)
    }

    pub fn complete_run_leg(&mut self) -> Result<Vec<SessionEvent>> {
        match (self.finished, self.phase) {
            (false, Phase::OpeningRun) => {
                self.phase = Phase::Bodyweight;
                debug!(elapsed = self.elapsed_secs, "opening run done");
                Ok(vec![SessionEvent::RunLegCompleted(RunLeg::Opening)])
            }
            (false, Phase::ClosingRun) => {
                self.finish();
                Ok(vec![
                    SessionEvent::RunLegCompleted(RunLeg::Closing),
                    SessionEvent::WorkoutCompleted,
                ])
            }
            _ => Err(self.illegal("complete a run")),
        }
    }

    pub fn complete_movement_set(&mut self) -> Result<Vec<SessionEvent>> {
        if self.finished || self.phase != Phase::Bodyweight {
            return Err(self.illegal("complete a set"));
        }

        let movement = self.current_movement;
        let reps = self.config.per_round(movement);
        self.completed.add(movement, reps);

        let mut events = vec![SessionEvent::SetCompleted {
            movement,
            round: self.current_round,
            reps,
        }];

        match movement.next() {
            Some(next) => self.current_movement = next,
            None if self.current_round < self.config.rounds() => {
                self.current_round += 1;
                self.current_movement = Movement::Pullups;
                debug!(round = self.current_round, "next round");
            }
            None if self.config.includes_run() => {
                self.phase = Phase::ClosingRun;
                debug!(elapsed = self.elapsed_secs, "bodyweight rounds done");
            }
            None => {
                self.finish();
                events.push(SessionEvent::WorkoutCompleted);
            }
        }

        Ok(events)
    }

    /// Fraction of the workout done, in `[0, 1]`.
    ///
    /// Each run leg and each set counts as one unit, so the value never
    /// decreases and only reaches 1 once the session is finished.
    pub fn progress(&self) -> f64 {
        if self.finished {
            return 1.0;
        }

        let legs = if self.config.includes_run() { 2 } else { 0 };
        let sets = self.config.rounds() as u64 * 3;
        let total = legs + sets;

        let done = match self.phase {
            Phase::OpeningRun => 0,
            Phase::Bodyweight => {
                let legs_done = legs / 2;
                let movement_idx = Movement::ALL
                    .iter()
                    .position(|m| *m == self.current_movement)
                    .unwrap_or(0) as u64;
                legs_done + (self.current_round as u64 - 1) * 3 + movement_idx
            }
            Phase::ClosingRun => 1 + sets,
        };

        done as f64 / total as f64
    }

    fn finish(&mut self) {
        self.running = false;
        self.finished = true;
        debug!(
            elapsed = self.elapsed_secs,
            completed = ?self.completed,
            "session finished"
        );
    }

    fn illegal(&self, action: &'static str) -> TrackerError {
        let state = if self.finished {
            "the workout is complete".to_string()
        } else {
            format!("in the {} phase", self.phase)
        };
        TrackerError::IllegalTransition { action, state }
    }
}
