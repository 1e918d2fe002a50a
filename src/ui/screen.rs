use ratatui::Frame;

use crate::{ui::history::render_history, App, AppState};

/// A UI screen boundary: knows how to draw one `AppState`
pub trait Screen {
    fn render(&self, app: &mut App, f: &mut Frame);
}

/// Setup wizard, ready check, running workout and completion share the App widget
pub struct WorkoutScreen;

impl Screen for WorkoutScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        f.render_widget(&*app, f.area());
    }
}

pub struct HistoryScreen;

impl Screen for HistoryScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_history(app, f);
    }
}

pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::History => Box::new(HistoryScreen),
        AppState::Setup(_) | AppState::Ready | AppState::Workout | AppState::Complete => {
            Box::new(WorkoutScreen)
        }
    }
}
