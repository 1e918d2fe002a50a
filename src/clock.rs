use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic time for the session timer
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Production clock backed by `Instant::now`
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for tests; clones share the same time
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// A repeating timer that is polled rather than called back.
///
/// `suspend` keeps the unfinished part of the current period and the next
/// `arm` resumes from it; `disarm` forgets it.
#[derive(Clone, Copy, Debug)]
pub struct IntervalTimer {
    period: Duration,
    next_due: Option<Instant>,
    remaining: Option<Duration>,
}

impl IntervalTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            next_due: None,
            remaining: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        let wait = self.remaining.take().unwrap_or(self.period);
        self.next_due = Some(now + wait);
    }

    /// Stop firing but remember how much of the current period is left.
    /// Periods already due and not yet polled are dropped.
    pub fn suspend(&mut self, now: Instant) {
        if let Some(due) = self.next_due.take() {
            let left = due.saturating_duration_since(now);
            self.remaining = Some(if left.is_zero() { self.period } else { left });
        }
    }

    pub fn disarm(&mut self) {
        self.next_due = None;
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Number of whole periods that elapsed since the last poll
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };

        let mut fired = 0;
        while due <= now {
            fired += 1;
            due += self.period;
        }
        self.next_due = Some(due);
        fired
    }
}

impl Default for IntervalTimer {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
