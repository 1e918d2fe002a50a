use itertools::Itertools;
use thiserror::Error;

use crate::history::RecordId;
use crate::workout::SetupStep;

/// Errors raised by the workout core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// `start` was called before every setup choice was made
    #[error("workout configuration is incomplete: missing {}", .0.iter().join(", "))]
    InvalidConfiguration(Vec<SetupStep>),

    /// A phase-specific action was invoked in the wrong phase or stage
    #[error("cannot {action} while {state}")]
    IllegalTransition {
        action: &'static str,
        state: String,
    },

    #[error("no workout with id {0} in history")]
    NotFound(RecordId),

    /// Configuration setters are only accepted while no session is active
    #[error("configuration cannot change while a session is active")]
    ConfigurationLocked,
}

pub type Result<T> = std::result::Result<T, TrackerError>;
