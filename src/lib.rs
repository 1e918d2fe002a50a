// Library surface for the binary and for headless integration tests.
// Rendering and the CLI stay in main.rs.
pub mod app_dirs;
pub mod celebration;
pub mod clock;
pub mod config;
pub mod confirm;
pub mod error;
pub mod feedback;
pub mod history;
pub mod runtime;
pub mod session;
pub mod tracker;
pub mod util;
pub mod workout;

pub use error::{Result, TrackerError};
pub use tracker::{Stage, Tracker};
