//! Tagged error type shared by ports, adapters and use cases.
//!
//! Every failure that can reach a user is one of these variants.
//! Boundaries convert them into a static message with
//! [`DeskError::user_message`] instead of propagating further.

use thiserror::Error;

/// Failure kinds surfaced by the ledger, live-position and chat flows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeskError {
    /// Tabular source unreachable, malformed, or missing required columns.
    #[error("data unavailable from {source_name}: {reason}")]
    DataUnavailable {
        /// URL or path that was being loaded.
        source_name: String,
        /// What went wrong.
        reason: String,
    },

    /// Completion service returned an error of any kind.
    #[error("remote call failed: {0}")]
    RemoteCallFailed(String),

    /// Completion service did not answer within the configured timeout.
    #[error("remote call timed out after {0}s")]
    RemoteTimeout(u64),

    /// Username unknown or password mismatch. Deliberately carries no detail.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Handler reached without an authenticated session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Attempt to append a turn with no text.
    #[error("chat turn text must not be empty")]
    EmptyTurn,
}

impl DeskError {
    /// Shorthand for a `DataUnavailable` error.
    pub fn data_unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Static, user-facing message for this failure kind.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::DataUnavailable { .. } => "Error loading trade data",
            Self::RemoteCallFailed(_) | Self::RemoteTimeout(_) => {
                "The analysis service is unavailable right now"
            }
            Self::InvalidCredentials => "Invalid credentials",
            Self::NotAuthenticated => "Please login to access the dashboard",
            Self::EmptyTurn => "Message must not be empty",
        }
    }

    /// Whether this failure came from the completion service.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteCallFailed(_) | Self::RemoteTimeout(_))
    }
}
