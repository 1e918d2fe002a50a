use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use murph::{history::HistorySummary, util::format_clock};

use super::{frame_chunks, header, key_hints, status_line};
use crate::App;

fn summary_text(summary: &HistorySummary) -> String {
    let noun = if summary.count == 1 {
        "workout"
    } else {
        "workouts"
    };
    let mut text = format!("{} {noun}", summary.count);
    if let Some(fastest) = summary.fastest_secs {
        text.push_str(&format!(" • fastest {}", format_clock(fastest)));
    }
    if let Some(average) = summary.average_secs {
        text.push_str(&format!(" • average {}", format_clock(average.round() as u64)));
    }
    text
}

pub fn render_history(app: &mut App, f: &mut Frame) {
    let chunks = frame_chunks(f.area());
    f.render_widget(header(app), chunks[0]);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(chunks[1]);

    let history = app.tracker.history();

    if history.is_empty() {
        let empty = Paragraph::new("No workouts yet. Finished workouts show up here.")
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        f.render_widget(empty, body[1]);
    } else {
        let summary = Paragraph::new(Span::styled(
            summary_text(&history.summary()),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        f.render_widget(summary, body[0]);

        let header_row = Row::new(vec!["Finished", "Time", "Reps", "Plan"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = history
            .list()
            .map(|record| {
                let reps = record.completed_reps;
                Row::new(vec![
                    Cell::from(
                        record
                            .completed_at
                            .format("%b %-d, %Y at %-I:%M %p")
                            .to_string(),
                    ),
                    Cell::from(format_clock(record.total_elapsed_secs))
                        .style(Style::default().fg(Color::Cyan)),
                    Cell::from(format!("{}/{}/{}", reps.pullups, reps.pushups, reps.squats)),
                    Cell::from(record.config.summary()),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(24),
                Constraint::Length(8),
                Constraint::Length(12),
                Constraint::Min(10),
            ],
        )
        .header(header_row)
        .block(Block::default().borders(Borders::ALL))
        .row_highlight_style(Style::default().bg(Color::DarkGray));

        let mut state = TableState::default().with_selected(Some(app.history_cursor));
        f.render_stateful_widget(table, body[1], &mut state);
    }

    f.render_widget(status_line(app), chunks[2]);
    f.render_widget(key_hints(app), chunks[3]);
}
