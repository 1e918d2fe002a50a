use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

pub const DEFAULT_RUN_TENTHS: u32 = 10;
pub const DEFAULT_VEST_LBS: u32 = 20;

/// Bodyweight movements, in the order they are performed within a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Movement {
    #[strum(serialize = "pull-ups")]
    Pullups,
    #[strum(serialize = "push-ups")]
    Pushups,
    #[strum(serialize = "squats")]
    Squats,
}

impl Movement {
    pub const ALL: [Movement; 3] = [Movement::Pullups, Movement::Pushups, Movement::Squats];

    /// The movement that follows within the same round, `None` after squats
    pub fn next(self) -> Option<Movement> {
        match self {
            Movement::Pullups => Some(Movement::Pushups),
            Movement::Pushups => Some(Movement::Squats),
            Movement::Squats => None,
        }
    }
}

/// A count per movement; used both for per-round targets and cumulative totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepCounts {
    pub pullups: u32,
    pub pushups: u32,
    pub squats: u32,
}

impl RepCounts {
    pub fn new(pullups: u32, pushups: u32, squats: u32) -> Self {
        Self {
            pullups,
            pushups,
            squats,
        }
    }

    pub fn get(&self, movement: Movement) -> u32 {
        match movement {
            Movement::Pullups => self.pullups,
            Movement::Pushups => self.pushups,
            Movement::Squats => self.squats,
        }
    }

    pub fn set(&mut self, movement: Movement, value: u32) {
        match movement {
            Movement::Pullups => self.pullups = value,
            Movement::Pushups => self.pushups = value,
            Movement::Squats => self.squats = value,
        }
    }

    pub fn add(&mut self, movement: Movement, value: u32) {
        self.set(movement, self.get(movement).saturating_add(value));
    }

    /// Each count multiplied by `rounds`
    pub fn scaled(&self, rounds: u32) -> RepCounts {
        RepCounts::new(
            self.pullups.saturating_mul(rounds),
            self.pushups.saturating_mul(rounds),
            self.squats.saturating_mul(rounds),
        )
    }
}

/// A setup decision that starts out unanswered.
///
/// `Yes` carries the parameter that only matters when the option is taken
/// (run distance, vest weight).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice<T> {
    Unset,
    Yes(T),
    No,
}

impl<T> Choice<T> {
    pub fn is_set(&self) -> bool {
        !matches!(self, Choice::Unset)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Choice::Yes(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::Unset
    }
}

/// Named bodyweight partitions
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Preset {
    Official,
    Big,
    Small,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Official, Preset::Big, Preset::Small];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Official => "Cindy Style",
            Preset::Big => "Big Sets",
            Preset::Small => "Small & Steady",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::Official => {
                "Breaks things up to keep you fresh. The most popular and manageable pacing."
            }
            Preset::Big => "Fewer rounds, bigger sets. For strong athletes who want it done faster.",
            Preset::Small => "More rounds, smaller sets. Great for beginners or an even pace.",
        }
    }

    pub fn rounds(&self) -> u32 {
        match self {
            Preset::Official => 20,
            Preset::Big => 10,
            Preset::Small => 25,
        }
    }

    pub fn reps(&self) -> RepCounts {
        match self {
            Preset::Official => RepCounts::new(5, 10, 15),
            Preset::Big => RepCounts::new(10, 20, 30),
            Preset::Small => RepCounts::new(4, 8, 12),
        }
    }
}

/// Where the bodyweight counts came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bodyweight {
    Preset(Preset),
    Custom,
}

impl Bodyweight {
    pub fn label(&self, rounds: u32, reps: &RepCounts) -> String {
        match self {
            Bodyweight::Preset(p) => p.name().to_string(),
            Bodyweight::Custom => format!(
                "Custom: {} rounds of {}-{}-{}",
                rounds, reps.pullups, reps.pushups, reps.squats
            ),
        }
    }
}

/// Run distance in tenths of a mile, never below 0.1 mi
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunDistance(u32);

impl RunDistance {
    pub fn from_tenths(tenths: u32) -> Self {
        Self(tenths.max(1))
    }

    /// Rounds to the nearest tenth; anything below 0.1 clamps to 0.1
    pub fn from_miles(miles: f64) -> Self {
        if !miles.is_finite() || miles <= 0.0 {
            return Self(1);
        }
        Self::from_tenths((miles * 10.0).round().min(u32::MAX as f64) as u32)
    }

    pub fn tenths(&self) -> u32 {
        self.0
    }

    pub fn miles(&self) -> f64 {
        self.0 as f64 / 10.0
    }

    fn stepped(self, delta: i64) -> Self {
        Self(step(self.0, delta, 1))
    }
}

impl Default for RunDistance {
    fn default() -> Self {
        Self(DEFAULT_RUN_TENTHS)
    }
}

impl fmt::Display for RunDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

/// Steps of the guided setup, also used to name what a draft is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SetupStep {
    Run,
    Bodyweight,
    Vest,
}

impl SetupStep {
    pub fn number(&self) -> u8 {
        match self {
            SetupStep::Run => 1,
            SetupStep::Bodyweight => 2,
            SetupStep::Vest => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SetupStep::Run => "Choose Your Running Option",
            SetupStep::Bodyweight => "Choose Your Reps & Sets",
            SetupStep::Vest => "Choose Your Vest Option",
        }
    }

    pub fn next(&self) -> Option<SetupStep> {
        match self {
            SetupStep::Run => Some(SetupStep::Bodyweight),
            SetupStep::Bodyweight => Some(SetupStep::Vest),
            SetupStep::Vest => None,
        }
    }

    pub fn previous(&self) -> Option<SetupStep> {
        match self {
            SetupStep::Run => None,
            SetupStep::Bodyweight => Some(SetupStep::Run),
            SetupStep::Vest => Some(SetupStep::Bodyweight),
        }
    }

    /// Whether the decision this step asks for has been made
    pub fn can_proceed(&self, draft: &WorkoutDraft) -> bool {
        match self {
            SetupStep::Run => draft.run.is_set(),
            SetupStep::Bodyweight => draft.bodyweight.is_set(),
            SetupStep::Vest => draft.vest.is_set(),
        }
    }
}

fn step(value: u32, delta: i64, min: u32) -> u32 {
    (value as i64)
        .saturating_add(delta)
        .clamp(min as i64, u32::MAX as i64) as u32
}

/// Workout parameters as the user is choosing them.
///
/// Run distance and vest weight are remembered while their option is off so
/// toggling back restores the last value.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutDraft {
    run: Choice<RunDistance>,
    run_distance: RunDistance,
    bodyweight: Choice<Bodyweight>,
    rounds: u32,
    reps: RepCounts,
    vest: Choice<u32>,
    vest_weight: u32,
}

impl Default for WorkoutDraft {
    fn default() -> Self {
        Self {
            run: Choice::Unset,
            run_distance: RunDistance::default(),
            bodyweight: Choice::Unset,
            rounds: Preset::Official.rounds(),
            reps: Preset::Official.reps(),
            vest: Choice::Unset,
            vest_weight: DEFAULT_VEST_LBS,
        }
    }
}

impl WorkoutDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&self) -> Choice<RunDistance> {
        self.run
    }

    pub fn run_distance(&self) -> RunDistance {
        self.run_distance
    }

    pub fn bodyweight(&self) -> Choice<Bodyweight> {
        self.bodyweight
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn reps(&self) -> RepCounts {
        self.reps
    }

    pub fn vest(&self) -> Choice<u32> {
        self.vest
    }

    pub fn vest_weight(&self) -> u32 {
        self.vest_weight
    }

    pub fn include_run(&mut self, include: bool) {
        self.run = if include {
            Choice::Yes(self.run_distance)
        } else {
            Choice::No
        };
    }

    pub fn set_run_distance(&mut self, distance: RunDistance) {
        self.run_distance = distance;
        if let Choice::Yes(_) = self.run {
            self.run = Choice::Yes(distance);
        }
    }

    /// Moves the distance by `delta` tenths of a mile
    pub fn adjust_run_distance(&mut self, delta: i64) {
        self.set_run_distance(self.run_distance.stepped(delta));
    }

    /// Applies a preset's rounds and reps together with the tag
    pub fn select_preset(&mut self, preset: Preset) {
        self.bodyweight = Choice::Yes(Bodyweight::Preset(preset));
        self.rounds = preset.rounds();
        self.reps = preset.reps();
    }

    pub fn select_custom(&mut self) {
        self.bodyweight = Choice::Yes(Bodyweight::Custom);
    }

    pub fn set_rounds(&mut self, rounds: u32) {
        self.rounds = rounds.max(1);
    }

    pub fn adjust_rounds(&mut self, delta: i64) {
        self.rounds = step(self.rounds, delta, 1);
    }

    pub fn set_reps(&mut self, movement: Movement, reps: u32) {
        self.reps.set(movement, reps);
    }

    pub fn adjust_reps(&mut self, movement: Movement, delta: i64) {
        self.reps.set(movement, step(self.reps.get(movement), delta, 0));
    }

    pub fn wear_vest(&mut self, wear: bool) {
        self.vest = if wear {
            Choice::Yes(self.vest_weight)
        } else {
            Choice::No
        };
    }

    pub fn set_vest_weight(&mut self, lbs: u32) {
        self.vest_weight = lbs;
        if let Choice::Yes(_) = self.vest {
            self.vest = Choice::Yes(lbs);
        }
    }

    pub fn adjust_vest_weight(&mut self, delta: i64) {
        self.set_vest_weight(step(self.vest_weight, delta, 0));
    }

    /// Setup decisions that are still unanswered, in setup order
    pub fn missing(&self) -> Vec<SetupStep> {
        [SetupStep::Run, SetupStep::Bodyweight, SetupStep::Vest]
            .into_iter()
            .filter(|s| !s.can_proceed(self))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Freeze the draft into the configuration a session runs against
    pub fn finalize(&self) -> Result<WorkoutConfig> {
        match (self.run, self.bodyweight, self.vest) {
            (Choice::Unset, _, _) | (_, Choice::Unset, _) | (_, _, Choice::Unset) => {
                Err(TrackerError::InvalidConfiguration(self.missing()))
            }
            (run, Choice::Yes(bodyweight), vest) => Ok(WorkoutConfig {
                run: run.value().copied(),
                rounds: self.rounds.max(1),
                reps: self.reps,
                vest: vest.value().copied(),
                bodyweight,
            }),
            (_, Choice::No, _) => Err(TrackerError::InvalidConfiguration(vec![
                SetupStep::Bodyweight,
            ])),
        }
    }
}

/// A finalized plan; immutable once a session starts
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutConfig {
    run: Option<RunDistance>,
    rounds: u32,
    reps: RepCounts,
    vest: Option<u32>,
    bodyweight: Bodyweight,
}

impl WorkoutConfig {
    pub fn includes_run(&self) -> bool {
        self.run.is_some()
    }

    pub fn run_distance(&self) -> Option<RunDistance> {
        self.run
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Reps of `movement` credited per round
    pub fn per_round(&self, movement: Movement) -> u32 {
        self.reps.get(movement)
    }

    pub fn reps(&self) -> RepCounts {
        self.reps
    }

    pub fn totals(&self) -> RepCounts {
        self.reps.scaled(self.rounds)
    }

    pub fn vest(&self) -> Option<u32> {
        self.vest
    }

    pub fn bodyweight(&self) -> Bodyweight {
        self.bodyweight
    }

    pub fn label(&self) -> String {
        self.bodyweight.label(self.rounds, &self.reps)
    }

    /// Plan label with vest and run annotations, e.g. "Big Sets • 20lb vest • 1.0 mile runs"
    pub fn summary(&self) -> String {
        let mut out = self.label();
        if let Some(lbs) = self.vest {
            out.push_str(&format!(" • {lbs}lb vest"));
        }
        if let Some(distance) = self.run {
            out.push_str(&format!(" • {distance} mile runs"));
        }
        out
    }
}
