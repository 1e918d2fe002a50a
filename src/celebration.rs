use rand::seq::SliceRandom;
use rand::Rng;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthChar;

const SPARK_SYMBOLS: [char; 6] = ['★', '✦', '✧', '✶', '•', '✹'];
const BANNERS: [&str; 4] = [
    "MURPH COMPLETE!",
    "OUTSTANDING WORK!",
    "WELL EARNED!",
    "HOOYAH!",
];
const GRAVITY: f64 = 12.0;

/// One glyph of the completion animation.
///
/// Banner sparks glide to a fixed slot and hold there; loose sparks are
/// thrown upward and fall.
#[derive(Debug, Clone)]
pub struct Spark {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
    pub slot: Option<(f64, f64)>,
}

impl Spark {
    fn loose<R: Rng>(x: f64, y: f64, rng: &mut R) -> Self {
        Self {
            x,
            y,
            vel_x: rng.gen_range(-4.0..4.0),
            vel_y: rng.gen_range(-6.0..-2.0),
            symbol: *SPARK_SYMBOLS.choose(rng).unwrap_or(&'★'),
            color_index: rng.gen_range(0..6),
            age: 0.0,
            max_age: rng.gen_range(2.5..4.5),
            slot: None,
        }
    }

    fn banner<R: Rng>(from: (f64, f64), slot: (f64, f64), symbol: char, rng: &mut R) -> Self {
        Self {
            x: from.0,
            y: from.1,
            vel_x: slot.0 - from.0,
            vel_y: slot.1 - from.1,
            symbol,
            color_index: 0,
            age: 0.0,
            max_age: rng.gen_range(4.0..6.0),
            slot: Some(slot),
        }
    }

    pub fn is_banner(&self) -> bool {
        self.slot.is_some()
    }

    /// Advance by `dt` seconds; false once the spark has burned out
    fn step(&mut self, dt: f64) -> bool {
        match self.slot {
            Some((sx, sy)) => {
                let remaining = ((sx - self.x).powi(2) + (sy - self.y).powi(2)).sqrt();
                if remaining > 0.5 {
                    self.x += self.vel_x * dt;
                    self.y += self.vel_y * dt;
                } else {
                    self.x = sx;
                    self.y = sy;
                    self.vel_x = 0.0;
                    self.vel_y = 0.0;
                }
            }
            None => {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                self.vel_y += GRAVITY * dt;
            }
        }

        self.age += dt;
        self.age < self.max_age
    }
}

/// Completion-screen fireworks. Purely presentational: turning it off never
/// touches the session or history.
#[derive(Debug)]
pub struct Celebration {
    pub sparks: Vec<Spark>,
    pub banner: &'static str,
    started: Instant,
    duration: Duration,
    active: bool,
    width: f64,
    height: f64,
}

impl Celebration {
    pub fn new() -> Self {
        Self {
            sparks: Vec::new(),
            banner: BANNERS[0],
            started: Instant::now(),
            duration: Duration::from_secs(5),
            active: false,
            width: 80.0,
            height: 24.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&mut self, width: u16, height: u16) {
        let mut rng = rand::thread_rng();

        self.sparks.clear();
        self.started = Instant::now();
        self.active = true;
        self.width = width as f64;
        self.height = height as f64;
        self.banner = BANNERS.choose(&mut rng).copied().unwrap_or(BANNERS[0]);

        let cx = self.width / 2.0;
        let cy = self.height / 3.0;
        self.spell_banner(cx, cy, &mut rng);

        for _ in 0..30 {
            let x = cx + rng.gen_range(-18.0..18.0);
            let y = cy + rng.gen_range(-4.0..6.0);
            self.sparks.push(Spark::loose(x, y, &mut rng));
        }
    }

    fn spell_banner<R: Rng>(&mut self, cx: f64, cy: f64, rng: &mut R) {
        let total: usize = self.banner.chars().map(|c| c.width().unwrap_or(1)).sum();
        let mut col = cx - total as f64 / 2.0;

        for (i, ch) in self.banner.chars().enumerate() {
            let w = ch.width().unwrap_or(1) as f64;
            if ch != ' ' {
                let from = (cx + rng.gen_range(-12.0..12.0), cy + rng.gen_range(-4.0..4.0));
                let mut spark = Spark::banner(from, (col, cy), ch, rng);
                spark.color_index = i % 6;
                self.sparks.push(spark);
            }
            col += w;
        }
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.sparks.clear();
    }

    pub fn update(&mut self) {
        if !self.active {
            return;
        }
        if self.started.elapsed() >= self.duration {
            self.stop();
            return;
        }

        let (w, h) = (self.width, self.height);
        self.sparks.retain_mut(|spark| {
            let alive = spark.step(0.1);
            let on_screen = spark.is_banner()
                || (spark.y < h + 3.0 && spark.x > -3.0 && spark.x < w + 3.0);
            alive && on_screen
        });
    }
}

impl Default for Celebration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_spark_falls() {
        let mut rng = rand::thread_rng();
        let mut spark = Spark::loose(10.0, 10.0, &mut rng);
        let vy = spark.vel_y;
        assert!(spark.step(0.1));
        assert!(spark.vel_y > vy);
        assert_ne!(spark.y, 10.0);
    }

    #[test]
    fn banner_spark_settles_on_slot() {
        let mut rng = rand::thread_rng();
        let mut spark = Spark::banner((0.0, 0.0), (8.0, 4.0), 'M', &mut rng);
        for _ in 0..40 {
            spark.step(0.1);
        }
        assert_eq!((spark.x, spark.y), (8.0, 4.0));
        assert_eq!(spark.symbol, 'M');
    }

    #[test]
    fn starts_inactive() {
        let c = Celebration::new();
        assert!(!c.is_active());
        assert!(c.sparks.is_empty());
    }

    #[test]
    fn start_spells_banner_and_scatters_sparks() {
        let mut c = Celebration::new();
        c.start(80, 24);
        assert!(c.is_active());

        let letters = c.banner.chars().filter(|ch| *ch != ' ').count();
        assert_eq!(c.sparks.iter().filter(|s| s.is_banner()).count(), letters);
        assert!(c.sparks.iter().any(|s| !s.is_banner()));

        for _ in 0..5 {
            c.update();
        }
        assert!(c.is_active());
    }

    #[test]
    fn stop_clears_everything() {
        let mut c = Celebration::new();
        c.start(40, 12);
        c.stop();
        assert!(!c.is_active());
        assert!(c.sparks.is_empty());
        c.update();
        assert!(c.sparks.is_empty());
    }

    #[test]
    fn off_screen_sparks_are_dropped() {
        let mut c = Celebration::new();
        c.start(20, 10);
        let mut rng = rand::thread_rng();
        c.sparks.push(Spark::loose(500.0, 500.0, &mut rng));
        c.update();
        assert!(c
            .sparks
            .iter()
            .all(|s| s.is_banner() || (s.x < 23.0 && s.y < 13.0)));
    }
}
