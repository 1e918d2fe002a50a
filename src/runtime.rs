use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tracing::debug;

/// What the UI loop reacts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// Redraw/animation heartbeat; session seconds are counted by the tracker's timer
    Tick,
    /// The event source hung up and nothing more will arrive
    Closed,
}

impl AppEvent {
    /// Key presses, repeats and resizes; releases, mouse, focus and paste are dropped
    pub fn from_terminal(event: Event) -> Option<AppEvent> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Some(AppEvent::Key(key)),
            Event::Resize(_, _) => Some(AppEvent::Resize),
            _ => None,
        }
    }
}

fn forward_terminal(tx: Sender<AppEvent>) {
    loop {
        let event = match event::read() {
            Ok(event) => event,
            Err(e) => {
                debug!(error = %e, "terminal reader stopped");
                return;
            }
        };
        if let Some(event) = AppEvent::from_terminal(event) {
            if tx.send(event).is_err() {
                return;
            }
        }
    }
}

/// Hands the UI loop one event per step, or `Tick` when none arrives in time
pub struct Runner {
    events: Receiver<AppEvent>,
    tick_rate: Duration,
}

impl Runner {
    /// Reads the real terminal on a background thread
    pub fn terminal(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || forward_terminal(tx));
        Self::from_channel(rx, tick_rate)
    }

    /// Fed by whoever holds the sender
    pub fn from_channel(events: Receiver<AppEvent>, tick_rate: Duration) -> Self {
        Self { events, tick_rate }
    }

    /// Blocks up to one tick for the next event
    pub fn step(&self) -> AppEvent {
        match self.events.recv_timeout(self.tick_rate) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => AppEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => AppEvent::Closed,
        }
    }
}
