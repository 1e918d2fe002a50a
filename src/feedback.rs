use std::io::{self, Write};

use tracing::trace;

use crate::session::SessionEvent;

/// Audible cue for a session event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Short three-note chime after a set or a run leg
    Chime,
    /// Four-note fanfare when the workout is done
    Fanfare,
}

impl Cue {
    pub fn for_event(event: &SessionEvent) -> Cue {
        match event {
            SessionEvent::SetCompleted { .. } | SessionEvent::RunLegCompleted(_) => Cue::Chime,
            SessionEvent::WorkoutCompleted => Cue::Fanfare,
        }
    }

    pub fn notes(&self) -> usize {
        match self {
            Cue::Chime => 3,
            Cue::Fanfare => 4,
        }
    }
}

/// Reacts to session events; implementations must not block for long
pub trait Feedback {
    fn on_event(&mut self, event: &SessionEvent);
}

/// Rings the terminal bell once per note of the event's cue
pub struct TerminalBell<W: Write> {
    out: W,
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn ring(&mut self, cue: Cue) -> io::Result<()> {
        self.out.write_all(&b"\x07".repeat(cue.notes()))?;
        self.out.flush()
    }
}

impl<W: Write> Feedback for TerminalBell<W> {
    fn on_event(&mut self, event: &SessionEvent) {
        let cue = Cue::for_event(event);
        trace!(?cue, "ring");
        // bell failures are ignored
        let _ = self.ring(cue);
    }
}

/// Swallows every event
#[derive(Debug, Default, Clone, Copy)]
pub struct Muted;

impl Feedback for Muted {
    fn on_event(&mut self, _event: &SessionEvent) {}
}
