pub mod history;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget, Wrap},
};

use murph::{
    celebration::Celebration,
    session::{Phase, SessionState},
    tracker::Destructive,
    util::{format_clock, format_percent},
    workout::{Bodyweight, Choice, Movement, Preset, RepCounts, SetupStep, WorkoutDraft},
};

use crate::{App, AppState, CustomField};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

/// Header, body, status and key hints, in that order
pub(crate) fn frame_chunks(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = frame_chunks(area);

        header(self).render(chunks[0], buf);

        match self.state {
            AppState::Setup(step) => render_setup(self, step, chunks[1], buf),
            AppState::Ready => render_ready(self.tracker.draft(), chunks[1], buf),
            AppState::Workout => {
                if let Some(session) = self.tracker.session() {
                    render_workout(session, chunks[1], buf);
                }
            }
            AppState::Complete => {
                if let Some(session) = self.tracker.session() {
                    render_complete(session, chunks[1], buf);
                }
            }
            // drawn as a table by ui::history
            AppState::History => {}
        }

        status_line(self).render(chunks[2], buf);
        key_hints(self).render(chunks[3], buf);

        if self.celebration.is_active() {
            render_celebration(&self.celebration, area, buf);
        }
    }
}

fn header(app: &App) -> Paragraph<'static> {
    let subtitle = match app.state {
        AppState::Setup(step) => format!("Step {} of 3", step.number()),
        AppState::Ready => "Ready to go".to_string(),
        AppState::Workout => app
            .tracker
            .session()
            .map(|s| s.phase().to_string().to_uppercase())
            .unwrap_or_default(),
        AppState::Complete => "In honor of Lt. Michael Murphy".to_string(),
        AppState::History => "Workout history".to_string(),
    };

    Paragraph::new(vec![
        Line::from(Span::styled("MURPH", bold().fg(Color::Yellow))),
        Line::from(Span::styled(subtitle, dim())),
    ])
    .alignment(Alignment::Center)
}

/// Confirmation prompt while a destructive action is pending, else the status message
pub(crate) fn status_line(app: &App) -> Paragraph<'static> {
    let warn = bold().fg(Color::Red);
    let final_step = app.tracker.is_final_confirmation();

    let line = match app.tracker.pending() {
        Some(Destructive::ResetSession) if final_step => Line::from(Span::styled(
            "Are you sure? Press (y) again to throw this workout away",
            warn,
        )),
        Some(Destructive::ResetSession) => Line::from(Span::styled(
            "Reset this workout? Progress will be lost. (y) confirm, any other key cancels",
            warn,
        )),
        Some(Destructive::DeleteRecord(_)) if final_step => Line::from(Span::styled(
            "Are you sure? This cannot be undone. Press (y) again to delete",
            warn,
        )),
        Some(Destructive::DeleteRecord(_)) => Line::from(Span::styled(
            "Delete this workout? (y) confirm, any other key cancels",
            warn,
        )),
        None => match &app.status {
            Some(msg) => Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Yellow))),
            None => Line::default(),
        },
    };

    Paragraph::new(line).alignment(Alignment::Center)
}

pub(crate) fn key_hints(app: &App) -> Paragraph<'static> {
    let hints = match app.state {
        AppState::Setup(SetupStep::Run) => "(y)es (n)o  ←/→ distance  (enter) next  (h)istory  (q)uit",
        AppState::Setup(SetupStep::Bodyweight) => {
            "(1)(2)(3) preset (c)ustom  ↑/↓ ←/→ edit  (enter) next  (b)ack"
        }
        AppState::Setup(SetupStep::Vest) => "(y)es (n)o  ←/→ weight  (enter) next  (b)ack",
        AppState::Ready => "(enter) start timer  (b)ack  (h)istory  (q)uit",
        AppState::Workout => "(enter) done  (space) pause/resume  (r)eset  (h)istory",
        AppState::Complete => "(n)ew workout  (c)elebration off  (h)istory  (q)uit",
        AppState::History => "↑/↓ select  (d)elete  (b)ack  (q)uit",
    };

    Paragraph::new(Span::styled(hints, dim().add_modifier(Modifier::ITALIC)))
        .alignment(Alignment::Center)
}

fn option_line(key: char, label: String, selected: bool) -> Line<'static> {
    let (marker, style) = if selected {
        ("▶ ", bold().fg(Color::Green))
    } else {
        ("  ", Style::default())
    };
    Line::from(vec![
        Span::styled(marker, style),
        Span::styled(format!("[{key}] "), dim()),
        Span::styled(label, style),
    ])
}

fn totals_line(totals: RepCounts) -> Line<'static> {
    let parts: Vec<String> = Movement::ALL
        .iter()
        .map(|m| format!("{} {m}", totals.get(*m)))
        .collect();
    Line::from(Span::styled(
        format!("Totals: {}", parts.join(" • ")),
        dim(),
    ))
}

fn render_setup(app: &App, step: SetupStep, area: Rect, buf: &mut Buffer) {
    let draft = app.tracker.draft();
    let mut lines = vec![Line::from(Span::styled(step.title(), bold())), Line::default()];

    match step {
        SetupStep::Run => {
            lines.push(option_line(
                'y',
                format!("Include {} mile runs before and after", draft.run_distance()),
                matches!(draft.run(), Choice::Yes(_)),
            ));
            lines.push(option_line(
                'n',
                "Skip the runs, bodyweight only".to_string(),
                draft.run() == Choice::No,
            ));
            if let Choice::Yes(distance) = draft.run() {
                lines.push(Line::default());
                lines.push(Line::from(format!("Distance per run: ◀ {distance} mi ▶")));
            }
        }
        SetupStep::Bodyweight => {
            for (i, preset) in Preset::ALL.iter().enumerate() {
                let reps = preset.reps();
                lines.push(option_line(
                    char::from(b'1' + i as u8),
                    format!(
                        "{}: {} rounds of {}-{}-{}",
                        preset.name(),
                        preset.rounds(),
                        reps.pullups,
                        reps.pushups,
                        reps.squats
                    ),
                    draft.bodyweight() == Choice::Yes(Bodyweight::Preset(*preset)),
                ));
                lines.push(Line::from(Span::styled(
                    format!("      {}", preset.description()),
                    dim().add_modifier(Modifier::ITALIC),
                )));
            }

            let custom = draft.bodyweight() == Choice::Yes(Bodyweight::Custom);
            lines.push(option_line('c', "Custom rounds and reps".to_string(), custom));
            if custom {
                lines.extend(custom_form(app, draft));
            }
            if draft.bodyweight().is_set() {
                lines.push(Line::default());
                lines.push(totals_line(draft.reps().scaled(draft.rounds())));
            }
        }
        SetupStep::Vest => {
            lines.push(option_line(
                'y',
                format!("Wear a {} lb vest", draft.vest_weight()),
                matches!(draft.vest(), Choice::Yes(_)),
            ));
            lines.push(option_line(
                'n',
                "No vest today".to_string(),
                draft.vest() == Choice::No,
            ));
            if let Choice::Yes(lbs) = draft.vest() {
                lines.push(Line::default());
                lines.push(Line::from(format!("Vest weight: ◀ {lbs} lb ▶")));
            }
        }
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .render(area, buf);
}

fn custom_form(app: &App, draft: &WorkoutDraft) -> Vec<Line<'static>> {
    CustomField::ALL
        .iter()
        .map(|field| {
            let (label, value) = match field {
                CustomField::Rounds => ("rounds".to_string(), draft.rounds()),
                CustomField::Reps(m) => (format!("{m} per round"), draft.reps().get(*m)),
            };
            let style = if app.custom_field() == *field {
                bold().fg(Color::Cyan)
            } else {
                Style::default()
            };
            Line::from(Span::styled(format!("      {label:<20} ◀ {value:>3} ▶"), style))
        })
        .collect()
}

fn render_ready(draft: &WorkoutDraft, area: Rect, buf: &mut Buffer) {
    let Ok(config) = draft.finalize() else {
        return;
    };
    let mut lines = vec![
        Line::from(Span::styled(config.summary(), bold())),
        Line::default(),
    ];

    lines.push(Line::from(match config.run_distance() {
        Some(d) => format!("Runs: {d} mile before and after"),
        None => "Runs: none".to_string(),
    }));
    for m in Movement::ALL {
        lines.push(Line::from(format!(
            "{:<10} {} × {} = {}",
            m.to_string(),
            config.rounds(),
            config.per_round(m),
            config.totals().get(m)
        )));
    }
    lines.push(Line::from(match config.vest() {
        Some(lbs) => format!("Vest: {lbs} lb"),
        None => "Vest: none".to_string(),
    }));

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Before you start:", bold())));
    let mut reminders = Vec::new();
    if config.vest().is_some() {
        reminders.push("Put on your weight vest");
    }
    if config.includes_run() {
        reminders.push("Start your running app");
    }
    reminders.extend(["Set up your workout space", "Get water nearby"]);
    lines.extend(
        reminders
            .into_iter()
            .map(|r| Line::from(Span::styled(format!("  • {r}"), dim()))),
    );

    Paragraph::new(lines).render(area, buf);
}

fn render_workout(session: &SessionState, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);

    let clock_style = if session.is_running() {
        bold().fg(Color::Cyan)
    } else {
        bold().fg(Color::DarkGray)
    };
    let mut clock = vec![Span::styled(format_clock(session.elapsed_secs()), clock_style)];
    if !session.is_running() {
        clock.push(Span::styled("  PAUSED", bold().fg(Color::Yellow)));
    }
    Paragraph::new(Line::from(clock))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let config = session.config();
    let task = match session.phase() {
        Phase::OpeningRun | Phase::ClosingRun => vec![
            Line::from(Span::styled(
                format!(
                    "Run {} miles",
                    config.run_distance().map(|d| d.to_string()).unwrap_or_default()
                ),
                bold(),
            )),
            Line::from(Span::styled("press enter when you're back", dim())),
        ],
        Phase::Bodyweight => vec![
            Line::from(Span::styled(
                format!("Round {} of {}", session.current_round(), config.rounds()),
                dim(),
            )),
            Line::from(Span::styled(
                format!("{} {}", session.current_target(), session.current_movement()),
                bold().fg(Color::Green),
            )),
        ],
    };
    Paragraph::new(task)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(session.progress().clamp(0.0, 1.0))
        .label(format_percent(session.progress()))
        .render(chunks[2], buf);

    let done = session.completed_reps();
    let totals = config.totals();
    let counts: Vec<String> = Movement::ALL
        .iter()
        .map(|m| format!("{m} {}/{}", done.get(*m), totals.get(*m)))
        .collect();
    Paragraph::new(Line::from(Span::styled(counts.join(" • "), dim())))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
}

fn render_complete(session: &SessionState, area: Rect, buf: &mut Buffer) {
    let reps = session.completed_reps();
    let lines = vec![
        Line::from(Span::styled(
            "MURPH COMPLETE!",
            bold().fg(Color::Yellow),
        )),
        Line::default(),
        Line::from(Span::styled(
            format_clock(session.elapsed_secs()),
            bold().fg(Color::Cyan),
        )),
        Line::from(Span::styled("Total Time", dim())),
        Line::default(),
        Line::from(format!(
            "{} pull-ups   {} push-ups   {} squats",
            reps.pullups, reps.pushups, reps.squats
        )),
        Line::from(Span::styled(session.config().summary(), dim())),
    ];

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buf);
}

/// Draw sparks on top of whatever the screen already shows
fn render_celebration(celebration: &Celebration, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Yellow,
        Color::Red,
        Color::Cyan,
        Color::Green,
        Color::Magenta,
        Color::LightBlue,
    ];

    for spark in &celebration.sparks {
        if spark.x < 0.0 || spark.y < 0.0 {
            continue;
        }
        let (x, y) = (spark.x as u16, spark.y as u16);
        if x >= area.width || y >= area.height {
            continue;
        }

        let color = colors[spark.color_index % colors.len()];
        let fade = 1.0 - spark.age / spark.max_age;
        let style = if spark.is_banner() || fade > 0.6 {
            bold().fg(color)
        } else if fade > 0.25 {
            Style::default().fg(color)
        } else {
            dim().fg(color)
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(&spark.symbol.to_string());
            cell.set_style(style);
        }
    }
}
