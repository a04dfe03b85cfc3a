//! Error types for session driving.

use crate::error::{CombatError, ErrorContext, ErrorSeverity};
use crate::state::{CharacterId, RosterError};

/// Errors surfaced when the scheduler API is driven out of order or fed
/// inconsistent roster data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("session has not been started")]
    SessionNotStarted,

    #[error("no turn is active in round {}", context.round)]
    NoActiveTurn { context: ErrorContext },

    #[error("character {id} is already present or queued")]
    DuplicateCharacter { id: CharacterId, context: ErrorContext },

    #[error("character {id} is not in the roster")]
    UnknownCharacter { id: CharacterId, context: ErrorContext },
}

impl SchedulerError {
    pub fn no_active_turn(round: u32) -> Self {
        Self::NoActiveTurn {
            context: ErrorContext::new(round),
        }
    }

    pub fn duplicate(id: CharacterId, round: u32) -> Self {
        Self::DuplicateCharacter {
            id,
            context: ErrorContext::new(round)
                .with_actor(id)
                .with_message("queue_add rejected"),
        }
    }

    pub fn unknown(id: CharacterId, round: u32) -> Self {
        Self::UnknownCharacter {
            id,
            context: ErrorContext::new(round).with_actor(id),
        }
    }
}

impl From<RosterError> for SchedulerError {
    fn from(error: RosterError) -> Self {
        match error {
            RosterError::DuplicateCharacter { id, context } => {
                Self::DuplicateCharacter { id, context }
            }
            RosterError::UnknownCharacter { id, context } => Self::UnknownCharacter { id, context },
        }
    }
}

impl CombatError for SchedulerError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SessionNotStarted | Self::NoActiveTurn { .. } => ErrorSeverity::Recoverable,
            Self::DuplicateCharacter { .. } => ErrorSeverity::Validation,
            Self::UnknownCharacter { .. } => ErrorSeverity::Internal,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::SessionNotStarted => None,
            Self::NoActiveTurn { context }
            | Self::DuplicateCharacter { context, .. }
            | Self::UnknownCharacter { context, .. } => Some(context),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::SessionNotStarted => "SCHEDULER_SESSION_NOT_STARTED",
            Self::NoActiveTurn { .. } => "SCHEDULER_NO_ACTIVE_TURN",
            Self::DuplicateCharacter { .. } => "SCHEDULER_DUPLICATE_CHARACTER",
            Self::UnknownCharacter { .. } => "SCHEDULER_UNKNOWN_CHARACTER",
        }
    }
}
