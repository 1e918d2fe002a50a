mod ui;

use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    sync::Mutex,
    time::Duration,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use murph::{
    app_dirs::AppDirs,
    celebration::Celebration,
    config::{FileSettingsStore, Settings, SettingsStore},
    confirm::Confirmed,
    feedback::{Feedback, Muted, TerminalBell},
    runtime::{AppEvent, Runner},
    session::{Phase, SessionEvent},
    tracker::{Destructive, Requested},
    workout::{Bodyweight, Choice, Movement, Preset, RunDistance, SetupStep, WorkoutDraft},
    Tracker, TrackerError,
};

use crate::ui::screen::current_screen;

const TICK_RATE_MS: u64 = 100;

/// guided MURPH workout tracker for the terminal
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Walks you through setting up a MURPH (runs, pull-ups, push-ups, squats, optional vest), then times the workout set by set and keeps a history of this session's finished workouts."
)]
pub struct Cli {
    /// distance of each run in miles, e.g. 1.0
    #[clap(short = 'd', long)]
    run_distance: Option<f64>,

    /// vest weight in pounds
    #[clap(short = 'v', long)]
    vest_weight: Option<u32>,

    /// preselect a rep scheme
    #[clap(short = 'p', long, value_enum)]
    preset: Option<Preset>,

    /// do not ring the terminal bell on completed sets and runs
    #[clap(long)]
    no_sound: bool,

    /// skip the animation on the completion screen
    #[clap(long)]
    no_celebration: bool,

    /// store the resulting settings as the new defaults
    #[clap(long)]
    save_settings: bool,
}

impl Cli {
    /// Command-line flags win over stored settings
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(miles) = self.run_distance {
            settings.run_distance_tenths = RunDistance::from_miles(miles).tenths();
        }
        if let Some(lbs) = self.vest_weight {
            settings.vest_weight_lbs = lbs;
        }
        if self.preset.is_some() {
            settings.preset = self.preset;
        }
        if self.no_sound {
            settings.sound = false;
        }
        if self.no_celebration {
            settings.celebration = false;
        }
        settings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Setup(SetupStep),
    Ready,
    Workout,
    Complete,
    History,
}

/// Value being edited on the custom bodyweight form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomField {
    Rounds,
    Reps(Movement),
}

impl CustomField {
    pub const ALL: [CustomField; 4] = [
        CustomField::Rounds,
        CustomField::Reps(Movement::Pullups),
        CustomField::Reps(Movement::Pushups),
        CustomField::Reps(Movement::Squats),
    ];

    fn adjust(self, draft: &mut WorkoutDraft, delta: i64) {
        match self {
            CustomField::Rounds => draft.adjust_rounds(delta),
            CustomField::Reps(m) => draft.adjust_reps(m, delta),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub tracker: Tracker,
    pub state: AppState,
    pub settings: Settings,
    pub celebration: Celebration,
    pub feedback: Box<dyn Feedback>,
    pub history_cursor: usize,
    pub custom_field: usize,
    /// One-shot message shown in the footer until the next key
    pub status: Option<String>,
    return_to: AppState,
    viewport: (u16, u16),
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let feedback: Box<dyn Feedback> = if settings.sound {
            Box::new(TerminalBell::stdout())
        } else {
            Box::new(Muted)
        };
        Self::with_feedback(settings, feedback)
    }

    pub fn with_feedback(settings: Settings, feedback: Box<dyn Feedback>) -> Self {
        Self {
            tracker: Tracker::new(settings.draft()),
            state: AppState::Setup(SetupStep::Run),
            settings,
            celebration: Celebration::new(),
            feedback,
            history_cursor: 0,
            custom_field: 0,
            status: None,
            return_to: AppState::Setup(SetupStep::Run),
            viewport: (80, 24),
        }
    }

    pub fn custom_field(&self) -> CustomField {
        CustomField::ALL[self.custom_field % CustomField::ALL.len()]
    }

    /// Seconds elapsed and animation frames; true when a redraw is due
    pub fn on_tick(&mut self) -> bool {
        let counted = self.tracker.poll_clock();
        self.celebration.update();
        counted > 0 || self.celebration.is_active()
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }
        self.status = None;

        if self.tracker.pending().is_some() {
            self.on_confirm_key(key);
            return Flow::Continue;
        }

        match self.state {
            AppState::Setup(step) => self.on_setup_key(step, key),
            AppState::Ready => self.on_ready_key(key),
            AppState::Workout => self.on_workout_key(key),
            AppState::Complete => self.on_complete_key(key),
            AppState::History => self.on_history_key(key),
        }
    }

    fn on_confirm_key(&mut self, key: KeyEvent) {
        if key.code != KeyCode::Char('y') {
            if let Some(action) = self.tracker.cancel_pending() {
                debug!(?action, "confirmation cancelled");
            }
            self.status = Some("Cancelled".to_string());
            return;
        }

        match self.tracker.confirm() {
            Ok(Confirmed::Proceed(Destructive::ResetSession)) => {
                self.celebration.stop();
                self.state = AppState::Setup(SetupStep::Run);
                self.status = Some("Workout reset".to_string());
            }
            Ok(Confirmed::Proceed(Destructive::DeleteRecord(_))) => {
                self.clamp_history_cursor();
                self.status = Some("Workout deleted".to_string());
            }
            Ok(_) => {}
            Err(e) => self.report(e),
        }
    }

    fn on_setup_key(&mut self, step: SetupStep, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Char('h') => self.open_history(),
            KeyCode::Enter => self.advance_setup(step),
            KeyCode::Backspace | KeyCode::Char('b') => {
                if let Some(previous) = step.previous() {
                    self.state = AppState::Setup(previous);
                }
            }
            code => self.edit_draft(step, code),
        }
        Flow::Continue
    }

    fn edit_draft(&mut self, step: SetupStep, code: KeyCode) {
        let field = self.custom_field();
        let custom = self.tracker.draft().bodyweight() == Choice::Yes(Bodyweight::Custom);

        let result = match (step, code) {
            (SetupStep::Run, KeyCode::Char('y')) => self.tracker.configure(|d| d.include_run(true)),
            (SetupStep::Run, KeyCode::Char('n')) => {
                self.tracker.configure(|d| d.include_run(false))
            }
            (SetupStep::Run, KeyCode::Right | KeyCode::Char('+')) => {
                self.tracker.configure(|d| d.adjust_run_distance(1))
            }
            (SetupStep::Run, KeyCode::Left | KeyCode::Char('-')) => {
                self.tracker.configure(|d| d.adjust_run_distance(-1))
            }
            (SetupStep::Bodyweight, KeyCode::Char(c @ '1'..='3')) => {
                let preset = Preset::ALL[(c as u8 - b'1') as usize];
                self.tracker.configure(|d| d.select_preset(preset))
            }
            (SetupStep::Bodyweight, KeyCode::Char('c')) => {
                self.tracker.configure(|d| d.select_custom())
            }
            (SetupStep::Bodyweight, KeyCode::Up) if custom => {
                self.custom_field = (self.custom_field + CustomField::ALL.len() - 1)
                    % CustomField::ALL.len();
                Ok(())
            }
            (SetupStep::Bodyweight, KeyCode::Down) if custom => {
                self.custom_field = (self.custom_field + 1) % CustomField::ALL.len();
                Ok(())
            }
            (SetupStep::Bodyweight, KeyCode::Right | KeyCode::Char('+')) if custom => {
                self.tracker.configure(|d| field.adjust(d, 1))
            }
            (SetupStep::Bodyweight, KeyCode::Left | KeyCode::Char('-')) if custom => {
                self.tracker.configure(|d| field.adjust(d, -1))
            }
            (SetupStep::Vest, KeyCode::Char('y')) => self.tracker.configure(|d| d.wear_vest(true)),
            (SetupStep::Vest, KeyCode::Char('n')) => self.tracker.configure(|d| d.wear_vest(false)),
            (SetupStep::Vest, KeyCode::Right | KeyCode::Char('+')) => {
                self.tracker.configure(|d| d.adjust_vest_weight(1))
            }
            (SetupStep::Vest, KeyCode::Left | KeyCode::Char('-')) => {
                self.tracker.configure(|d| d.adjust_vest_weight(-1))
            }
            _ => Ok(()),
        };

        if let Err(e) = result {
            self.report(e);
        }
    }

    fn advance_setup(&mut self, step: SetupStep) {
        if !step.can_proceed(self.tracker.draft()) {
            self.status = Some(format!("Pick a {step} option to continue"));
            return;
        }
        self.state = match step.next() {
            Some(next) => AppState::Setup(next),
            None => AppState::Ready,
        };
    }

    fn on_ready_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Enter | KeyCode::Char('s') => self.start_workout(),
            KeyCode::Backspace | KeyCode::Char('b') => {
                self.state = AppState::Setup(SetupStep::Vest);
            }
            KeyCode::Char('h') => self.open_history(),
            _ => {}
        }
        Flow::Continue
    }

    fn start_workout(&mut self) {
        match self.tracker.start() {
            Ok(()) => self.state = AppState::Workout,
            Err(TrackerError::InvalidConfiguration(missing)) => {
                if let Some(step) = missing.first() {
                    self.state = AppState::Setup(*step);
                    self.status = Some(format!("Pick a {step} option to continue"));
                }
            }
            Err(e) => self.report(e),
        }
    }

    fn on_workout_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Enter | KeyCode::Char('d') => self.complete_step(),
            KeyCode::Char(' ') | KeyCode::Char('p') => {
                if let Err(e) = self.tracker.toggle_running() {
                    self.report(e);
                }
            }
            KeyCode::Char('r') => {
                if self.tracker.request_reset() == Requested::Applied {
                    self.state = AppState::Setup(SetupStep::Run);
                }
            }
            KeyCode::Char('h') => self.open_history(),
            _ => {}
        }
        Flow::Continue
    }

    /// Credits whatever the current phase asks for: a run leg or one set
    fn complete_step(&mut self) {
        let Some(phase) = self.tracker.session().map(|s| s.phase()) else {
            return;
        };
        let result = match phase {
            Phase::Bodyweight => self.tracker.complete_movement_set(),
            Phase::OpeningRun | Phase::ClosingRun => self.tracker.complete_run_leg(),
        };
        match result {
            Ok(events) => self.dispatch(&events),
            Err(e) => self.report(e),
        }
    }

    fn dispatch(&mut self, events: &[SessionEvent]) {
        for event in events {
            self.feedback.on_event(event);
        }
        if events.contains(&SessionEvent::WorkoutCompleted) {
            self.state = AppState::Complete;
            if self.settings.celebration {
                self.celebration.start(self.viewport.0, self.viewport.1);
            }
        }
    }

    fn on_complete_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Enter | KeyCode::Char('n') => self.new_workout(),
            KeyCode::Char('h') => self.open_history(),
            KeyCode::Char('c') => self.celebration_off(),
            _ => {}
        }
        Flow::Continue
    }

    /// Stops the animation and keeps it off for the rest of this run
    fn celebration_off(&mut self) {
        self.celebration.stop();
        if self.settings.celebration {
            self.settings.celebration = false;
            info!("celebration effects turned off");
        }
    }

    fn new_workout(&mut self) {
        self.celebration.stop();
        self.tracker.request_reset();
        self.state = AppState::Setup(SetupStep::Run);
    }

    fn on_history_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                self.state = self.return_to;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.history_cursor = self.history_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.history_cursor += 1;
                self.clamp_history_cursor();
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let selected = self.tracker.history().get(self.history_cursor).map(|r| r.id);
                if let Some(id) = selected {
                    if let Err(e) = self.tracker.request_delete(id) {
                        self.report(e);
                    }
                }
            }
            _ => {}
        }
        Flow::Continue
    }

    fn open_history(&mut self) {
        if self.state != AppState::History {
            self.return_to = self.state;
            self.state = AppState::History;
        }
        self.clamp_history_cursor();
    }

    fn clamp_history_cursor(&mut self) {
        let len = self.tracker.history().len();
        self.history_cursor = self.history_cursor.min(len.saturating_sub(1));
    }

    fn report(&mut self, error: TrackerError) {
        self.status = Some(error.to_string());
    }
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(dir) = path.parent() {
        if fs::create_dir_all(dir).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("murph=info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let store = FileSettingsStore::new();
    let settings = cli.apply(store.load());
    if cli.save_settings {
        store.save(&settings)?;
        info!(path = %store.path().display(), "settings saved");
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::terminal(Duration::from_millis(TICK_RATE_MS));

    terminal.draw(|f| ui(app, f))?;

    loop {
        let redraw = match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => true,
            AppEvent::Closed => break,
            AppEvent::Key(key) => {
                if app.on_key(key) == Flow::Quit {
                    break;
                }
                true
            }
        };

        if redraw {
            terminal.draw(|f| ui(app, f))?;
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    let area = f.area();
    app.viewport = (area.width, area.height);
    current_screen(&app.state).render(app, f);
}
